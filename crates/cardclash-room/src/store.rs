//! Persistence port for rooms, plus an in-memory implementation.
//!
//! Every mutation goes through [`RoomStore::run_atomic`]. The caller hands
//! in a closure that sees a [`Snapshot`] of one room and returns a
//! [`Commit`] describing what to write. The store applies the commit only
//! if the room has not been written since the snapshot was taken;
//! otherwise the whole transaction fails with [`StoreError::Conflict`] and
//! nothing is written.
//!
//! [`RoomWrite::Select`] is the one exception: it touches a single
//! player's selection field, so it merges into whatever the document holds
//! at commit time instead of comparing revisions. It still bumps the
//! revision, so a turn resolution that read the old selection conflicts.
//!
//! The closure is synchronous and may run again on a retrying backend, so
//! it must not have side effects outside its return value.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use cardclash_protocol::{CardId, PlayerId, Role, RoomId};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::{Room, RoomError, StoreError, TurnRecord};

/// Length of generated room ids.
const ROOM_ID_LEN: usize = 20;

// ---------------------------------------------------------------------------
// Transaction types
// ---------------------------------------------------------------------------

/// What a transaction sees: the room (if it exists) and its turn log.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    room: Option<&'a Room>,
    records: &'a [TurnRecord],
}

impl<'a> Snapshot<'a> {
    pub fn new(room: Option<&'a Room>, records: &'a [TurnRecord]) -> Self {
        Self { room, records }
    }

    pub fn room(&self) -> Option<&'a Room> {
        self.room
    }

    /// The audit record written for `action_id`, if this room has one.
    pub fn turn_record(&self, action_id: &str) -> Option<&'a TurnRecord> {
        self.records.iter().rev().find(|r| r.action_id == action_id)
    }

    /// The audit record of the most recently applied turn.
    pub fn last_turn_record(&self) -> Option<&'a TurnRecord> {
        self.records.last()
    }
}

/// The room-document half of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomWrite {
    /// Leave the document as it is.
    Keep,
    /// Create or replace the document.
    Put(Room),
    /// Remove the document.
    Delete,
    /// Set `role`'s card for the current turn, provided `player` still
    /// holds that slot. Ignored once the match is finished.
    Select {
        role: Role,
        player: PlayerId,
        card: CardId,
        at: u64,
    },
}

impl RoomWrite {
    /// Whether the write merges into the current document rather than
    /// replacing the snapshot it was computed from.
    pub fn is_merge(&self) -> bool {
        matches!(self, Self::Select { .. })
    }
}

/// The result of a transaction closure: a write, an optional audit record
/// to append in the same commit, and the value returned to the caller.
#[derive(Debug)]
pub struct Commit<R> {
    pub write: RoomWrite,
    pub audit: Option<TurnRecord>,
    pub value: R,
}

impl<R> Commit<R> {
    /// Writes nothing. Never conflicts.
    pub fn read_only(value: R) -> Self {
        Self { write: RoomWrite::Keep, audit: None, value }
    }

    pub fn put(room: Room, value: R) -> Self {
        Self { write: RoomWrite::Put(room), audit: None, value }
    }

    pub fn delete(value: R) -> Self {
        Self { write: RoomWrite::Delete, audit: None, value }
    }

    pub fn select(role: Role, player: PlayerId, card: CardId, at: u64, value: R) -> Self {
        Self {
            write: RoomWrite::Select { role, player, card, at },
            audit: None,
            value,
        }
    }

    pub fn with_audit(mut self, record: TurnRecord) -> Self {
        self.audit = Some(record);
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.write == RoomWrite::Keep && self.audit.is_none()
    }
}

// ---------------------------------------------------------------------------
// RoomStore trait
// ---------------------------------------------------------------------------

/// Transactional document storage for rooms.
///
/// Implementations must guarantee that a commit is all-or-nothing and that
/// two transactions which read the same room cannot both commit writes,
/// unless the write is a merge ([`RoomWrite::is_merge`]).
pub trait RoomStore: Send + Sync + 'static {
    /// Runs `tx` against a snapshot of `room_id` and applies its commit
    /// atomically.
    ///
    /// Errors returned by `tx` abort the transaction unchanged. A commit
    /// that loses a race yields `StoreError::Conflict`.
    fn run_atomic<R, F>(
        &self,
        room_id: &RoomId,
        tx: F,
    ) -> impl Future<Output = Result<R, RoomError>> + Send
    where
        R: Send,
        F: FnOnce(Snapshot<'_>) -> Result<Commit<R>, RoomError> + Send;

    /// Reads a room outside any transaction.
    fn get(&self, room_id: &RoomId) -> impl Future<Output = Result<Option<Room>, StoreError>> + Send;

    /// Waiting rooms with an open second slot, oldest first, at most `limit`.
    fn find_waiting(&self, limit: usize) -> impl Future<Output = Result<Vec<Room>, StoreError>> + Send;

    /// The audit log of a room, oldest first.
    fn turn_records(
        &self,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<Vec<TurnRecord>, StoreError>> + Send;

    /// A fresh, unused room id.
    fn new_room_id(&self) -> RoomId {
        let id: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(ROOM_ID_LEN)
            .map(char::from)
            .collect();
        RoomId::new(id)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Document {
    room: Option<Room>,
    /// Bumped on every write, including deletes.
    revision: u64,
    records: Vec<TurnRecord>,
}

/// A [`RoomStore`] kept in process memory.
///
/// Reads take a copy of the document and release the lock before the
/// transaction body runs, and the commit yields to the scheduler first.
/// Transactions on the same room therefore really interleave, and the
/// revision check decides which one wins.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<RoomId, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a room directly, bypassing transactions.
    pub fn insert(&self, room: Room) -> Result<(), StoreError> {
        let mut docs = self.lock()?;
        let doc = docs.entry(room.id.clone()).or_default();
        doc.room = Some(room);
        doc.revision += 1;
        Ok(())
    }

    /// Number of rooms currently stored.
    pub fn room_count(&self) -> usize {
        self.lock()
            .map(|docs| docs.values().filter(|d| d.room.is_some()).count())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<RoomId, Document>>, StoreError> {
        self.docs
            .lock()
            .map_err(|_| StoreError::Unavailable("room store lock poisoned".into()))
    }

    fn read(&self, room_id: &RoomId) -> Result<(Option<Room>, Vec<TurnRecord>, u64), StoreError> {
        let docs = self.lock()?;
        Ok(match docs.get(room_id) {
            Some(doc) => (doc.room.clone(), doc.records.clone(), doc.revision),
            None => (None, Vec::new(), 0),
        })
    }

    fn apply<R>(&self, room_id: &RoomId, read_revision: u64, commit: Commit<R>) -> Result<R, StoreError> {
        let mut docs = self.lock()?;
        let doc = docs.entry(room_id.clone()).or_default();
        if !commit.write.is_merge() && doc.revision != read_revision {
            tracing::warn!(
                %room_id,
                read_revision,
                current_revision = doc.revision,
                "transaction conflict"
            );
            return Err(StoreError::Conflict(room_id.clone()));
        }

        match commit.write {
            RoomWrite::Keep => {}
            RoomWrite::Put(room) => doc.room = Some(room),
            RoomWrite::Delete => doc.room = None,
            RoomWrite::Select { role, player, card, at } => {
                let Some(room) = doc.room.as_mut().filter(|r| r.participant(role) == Some(&player))
                else {
                    tracing::warn!(%room_id, %player, %role, "selection lost its slot");
                    return Err(StoreError::Conflict(room_id.clone()));
                };
                if room.status.is_finished() {
                    return Ok(commit.value);
                }
                room.game_state.select(role, card);
                room.updated_at = at;
            }
        }
        if let Some(record) = commit.audit {
            doc.records.push(record);
        }
        doc.revision += 1;
        Ok(commit.value)
    }
}

impl RoomStore for MemoryStore {
    async fn run_atomic<R, F>(&self, room_id: &RoomId, tx: F) -> Result<R, RoomError>
    where
        R: Send,
        F: FnOnce(Snapshot<'_>) -> Result<Commit<R>, RoomError> + Send,
    {
        let (room, records, revision) = self.read(room_id)?;
        let commit = tx(Snapshot::new(room.as_ref(), &records))?;
        if commit.is_read_only() {
            return Ok(commit.value);
        }

        tokio::task::yield_now().await;
        Ok(self.apply(room_id, revision, commit)?)
    }

    async fn get(&self, room_id: &RoomId) -> Result<Option<Room>, StoreError> {
        Ok(self.read(room_id)?.0)
    }

    async fn find_waiting(&self, limit: usize) -> Result<Vec<Room>, StoreError> {
        let docs = self.lock()?;
        let mut rooms: Vec<Room> = docs
            .values()
            .filter_map(|d| d.room.as_ref())
            .filter(|r| r.is_open_for_matching())
            .cloned()
            .collect();
        drop(docs);

        rooms.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        rooms.truncate(limit);
        Ok(rooms)
    }

    async fn turn_records(&self, room_id: &RoomId) -> Result<Vec<TurnRecord>, StoreError> {
        Ok(self.read(room_id)?.1)
    }
}
