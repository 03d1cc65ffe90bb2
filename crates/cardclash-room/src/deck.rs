//! Per-player profiles and saved decks.

use std::collections::HashMap;
use std::sync::RwLock;

use cardclash_protocol::{CardId, PlayerId};
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Deck written for a player who has never saved one. Zero ids are empty
/// slots the client fills in.
pub const DEFAULT_DECK: [CardId; 5] = [CardId(0); 5];

/// A player's profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub deck: Vec<CardId>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
}

impl UserProfile {
    pub fn new(deck: Vec<CardId>, now: u64) -> Self {
        Self { deck, created_at: now, updated_at: now }
    }
}

/// Storage for player profiles.
///
/// Each method is atomic on its own: a profile is never created twice.
pub trait DeckStore: Send + Sync + 'static {
    /// Creates the profile with [`DEFAULT_DECK`] unless it exists.
    /// Returns `true` if it was created.
    fn ensure_user(&self, player: &PlayerId, now: u64) -> Result<bool, StoreError>;

    /// Replaces the saved deck, creating the profile if needed.
    fn save_deck(
        &self,
        player: &PlayerId,
        deck: Vec<CardId>,
        now: u64,
    ) -> Result<UserProfile, StoreError>;

    fn get_user(&self, player: &PlayerId) -> Result<Option<UserProfile>, StoreError>;
}

/// A [`DeckStore`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryDecks {
    users: RwLock<HashMap<PlayerId, UserProfile>>,
}

impl MemoryDecks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("deck store lock poisoned".into())
}

impl DeckStore for MemoryDecks {
    fn ensure_user(&self, player: &PlayerId, now: u64) -> Result<bool, StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users.contains_key(player) {
            return Ok(false);
        }
        users.insert(player.clone(), UserProfile::new(DEFAULT_DECK.to_vec(), now));
        Ok(true)
    }

    fn save_deck(
        &self,
        player: &PlayerId,
        deck: Vec<CardId>,
        now: u64,
    ) -> Result<UserProfile, StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        let profile = users
            .entry(player.clone())
            .and_modify(|p| {
                p.deck = deck.clone();
                p.updated_at = now;
            })
            .or_insert_with(|| UserProfile::new(deck, now));
        Ok(profile.clone())
    }

    fn get_user(&self, player: &PlayerId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users.read().map_err(poisoned)?.get(player).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<CardId> {
        raw.iter().copied().map(CardId).collect()
    }

    #[test]
    fn test_ensure_user_creates_once() {
        let decks = MemoryDecks::new();
        let alice = PlayerId::new("alice");

        assert!(decks.ensure_user(&alice, 10).unwrap());
        assert!(!decks.ensure_user(&alice, 20).unwrap());

        let profile = decks.get_user(&alice).unwrap().unwrap();
        assert_eq!(profile.deck, DEFAULT_DECK.to_vec());
        assert_eq!(profile.created_at, 10);
        assert_eq!(decks.len(), 1);
    }

    #[test]
    fn test_ensure_user_keeps_saved_deck() {
        let decks = MemoryDecks::new();
        let alice = PlayerId::new("alice");
        decks.save_deck(&alice, ids(&[4, 5]), 10).unwrap();

        assert!(!decks.ensure_user(&alice, 20).unwrap());
        assert_eq!(decks.get_user(&alice).unwrap().unwrap().deck, ids(&[4, 5]));
    }

    #[test]
    fn test_save_deck_creates_then_updates() {
        let decks = MemoryDecks::new();
        let bob = PlayerId::new("bob");

        let first = decks.save_deck(&bob, ids(&[1, 2, 2]), 5).unwrap();
        assert_eq!(first, UserProfile { deck: ids(&[1, 2, 2]), created_at: 5, updated_at: 5 });

        let second = decks.save_deck(&bob, ids(&[9]), 8).unwrap();
        assert_eq!(second.deck, ids(&[9]));
        assert_eq!(second.created_at, 5);
        assert_eq!(second.updated_at, 8);
    }

    #[test]
    fn test_profile_reads_missing_fields_as_defaults() {
        let profile: UserProfile = serde_json::from_str(r#"{"deck":[3,0]}"#).unwrap();
        assert_eq!(profile.deck, ids(&[3, 0]));
        assert_eq!(profile.created_at, 0);
        assert!(MemoryDecks::new().get_user(&PlayerId::new("x")).unwrap().is_none());
    }
}
