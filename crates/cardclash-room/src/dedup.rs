//! The idempotency guard: a bounded window of applied action ids.
//!
//! Clients tag every end-turn call with an action id and resend the same id
//! when they retry. The room remembers the most recent ids; a call whose id
//! is still in the window is a replay and must not be applied again.
//!
//! The window is a recency window, not a history. Once an id has been
//! evicted it is forgotten, and resubmitting it counts as a new action.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default number of action ids a room remembers.
pub const DEFAULT_ACTION_WINDOW: usize = 50;

/// Ordered, capacity-bounded list of applied action ids (oldest first).
///
/// Serializes as a plain JSON array so it sits directly in the room
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionWindow(VecDeque<String>);

impl ActionWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` means "definitely applied". `false` only means "not applied
    /// recently".
    pub fn contains(&self, action_id: &str) -> bool {
        self.0.iter().any(|id| id == action_id)
    }

    /// Appends `action_id`, evicting from the front until at most
    /// `capacity` ids remain. Returns the evicted ids, oldest first.
    pub fn record(&mut self, action_id: impl Into<String>, capacity: usize) -> Vec<String> {
        self.0.push_back(action_id.into());
        let mut evicted = Vec::new();
        while self.0.len() > capacity.max(1) {
            if let Some(old) = self.0.pop_front() {
                evicted.push(old);
            }
        }
        evicted
    }

    /// The most recently applied action id.
    pub fn last(&self) -> Option<&str> {
        self.0.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
