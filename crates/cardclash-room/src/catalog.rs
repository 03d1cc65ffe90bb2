//! The card catalog: read-mostly card definitions keyed by id.

use std::collections::HashMap;
use std::sync::RwLock;

use cardclash_protocol::{Card, CardId};

use crate::StoreError;

/// Lookup and bulk upsert of card definitions.
///
/// Lookups are synchronous so they can run inside a room transaction.
pub trait CardCatalog: Send + Sync + 'static {
    /// Returns the cards that exist among `ids`, in the order given.
    /// Unknown ids are skipped, not reported.
    fn get_cards_by_ids(&self, ids: &[CardId]) -> Result<Vec<Card>, StoreError>;

    /// Inserts or replaces each card by id. Returns how many were written.
    fn upsert(&self, cards: Vec<Card>) -> Result<usize, StoreError>;

    /// Whether the catalog holds at least one card.
    fn has_any(&self) -> Result<bool, StoreError>;

    fn get(&self, id: CardId) -> Result<Option<Card>, StoreError> {
        Ok(self.get_cards_by_ids(&[id])?.into_iter().next())
    }
}

/// A [`CardCatalog`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    cards: RwLock<HashMap<CardId, Card>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let cards = cards.into_iter().map(|c| (c.id, c)).collect();
        Self { cards: RwLock::new(cards) }
    }

    pub fn len(&self) -> usize {
        self.cards.read().map(|c| c.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("card catalog lock poisoned".into())
}

impl CardCatalog for MemoryCatalog {
    fn get_cards_by_ids(&self, ids: &[CardId]) -> Result<Vec<Card>, StoreError> {
        let cards = self.cards.read().map_err(poisoned)?;
        Ok(ids.iter().filter_map(|id| cards.get(id).cloned()).collect())
    }

    fn upsert(&self, incoming: Vec<Card>) -> Result<usize, StoreError> {
        let mut cards = self.cards.write().map_err(poisoned)?;
        let written = incoming.len();
        for card in incoming {
            tracing::debug!(card_id = %card.id, name = %card.name, "card upserted");
            cards.insert(card.id, card);
        }
        Ok(written)
    }

    fn has_any(&self) -> Result<bool, StoreError> {
        Ok(!self.cards.read().map_err(poisoned)?.is_empty())
    }
}
