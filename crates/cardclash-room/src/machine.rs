//! The room state machine.
//!
//! Each public method is exactly one [`RoomStore::run_atomic`] call. The
//! transaction closures are synchronous: they read the snapshot (and the
//! card catalog), decide, and return a [`Commit`]. Logging happens after
//! the store has answered, so a conflicted attempt logs nothing but the
//! store's own warning.

use std::sync::Arc;

use cardclash_protocol::{Card, CardId, PlayerId, Role, RoomId};
use serde::{Deserialize, Serialize};

use crate::battle::{self, RoundOutcome};
use crate::{
    BattleRules, CardCatalog, Commit, GameState, Room, RoomError, RoomStatus, RoomStore,
    StoreError, TurnRecord, TurnSummary, now_ms,
};

/// What `end_turn` reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndTurnOutcome {
    /// `true` when nothing was applied: a replayed action id or a finished
    /// room.
    pub deduplicated: bool,
    pub version: u64,
    pub finished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<TurnSummary>,
}

/// What `leave_room` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// No such room; nothing to do.
    Missing,
    /// The match is over; the room stays as it is.
    Unchanged,
    /// The sole occupant of a waiting room left and the room is gone.
    Deleted,
    /// The caller's slot was cleared.
    Vacated(Role),
}

/// Runs every room operation as a single store transaction.
pub struct RoomMachine<S, C> {
    store: Arc<S>,
    catalog: Arc<C>,
    rules: BattleRules,
}

impl<S, C> Clone for RoomMachine<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
            rules: self.rules.clone(),
        }
    }
}

impl<S: RoomStore, C: CardCatalog> RoomMachine<S, C> {
    pub fn new(store: Arc<S>, catalog: Arc<C>, rules: BattleRules) -> Self {
        Self { store, catalog, rules }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<C> {
        &self.catalog
    }

    pub fn rules(&self) -> &BattleRules {
        &self.rules
    }

    /// Creates a waiting room with `caller` in slot 1.
    pub async fn create_room(&self, caller: &PlayerId) -> Result<RoomId, RoomError> {
        let room_id = self.store.new_room_id();
        let created = room_id.clone();
        self.store
            .run_atomic(&room_id, move |snap| {
                if snap.room().is_some() {
                    return Err(StoreError::Conflict(created).into());
                }
                Ok(Commit::put(Room::new(created, caller.clone(), now_ms()), ()))
            })
            .await?;

        tracing::info!(%room_id, player = %caller, "room created");
        Ok(room_id)
    }

    /// Puts `caller` into a free slot of `room_id`.
    ///
    /// Rejoining a room the caller already sits in returns the existing
    /// role and writes nothing.
    pub async fn join(&self, caller: &PlayerId, room_id: &RoomId) -> Result<Role, RoomError> {
        let (role, rejoined) = self
            .store
            .run_atomic(room_id, |snap| {
                let room = snap.room().ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
                if let Some(role) = room.role_of(caller) {
                    return Ok(Commit::read_only((role, true)));
                }
                if room.status.is_finished() {
                    return Err(RoomError::Finished(room_id.clone()));
                }

                let mut next = room.clone();
                let role = if room.is_empty() {
                    next.player1_id = Some(caller.clone());
                    next.status = RoomStatus::Waiting;
                    Role::Player1
                } else if room.player2_id.is_none() {
                    next.player2_id = Some(caller.clone());
                    next.status = RoomStatus::Matched;
                    Role::Player2
                } else {
                    return Err(RoomError::RoomFull(room_id.clone()));
                };
                next.updated_at = now_ms();
                Ok(Commit::put(next, (role, false)))
            })
            .await?;

        if rejoined {
            tracing::debug!(%room_id, player = %caller, %role, "player rejoined");
        } else {
            tracing::info!(%room_id, player = %caller, %role, "player joined");
        }
        Ok(role)
    }

    /// Records `card_id` as the caller's pick for the current turn.
    ///
    /// Last write wins. The write touches only the caller's own field, so
    /// both players may pick at the same time without conflicting. On a
    /// finished room the call is accepted and ignored.
    pub async fn select_card(
        &self,
        caller: &PlayerId,
        room_id: &RoomId,
        card_id: CardId,
    ) -> Result<(), RoomError> {
        self.store
            .run_atomic(room_id, |snap| {
                let room = snap.room().ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
                let role = room
                    .role_of(caller)
                    .ok_or_else(|| RoomError::NotParticipant(caller.clone(), room_id.clone()))?;
                if room.status.is_finished() {
                    return Ok(Commit::read_only(()));
                }

                Ok(Commit::select(role, caller.clone(), card_id, now_ms(), ()))
            })
            .await?;

        tracing::debug!(%room_id, player = %caller, %card_id, "card selected");
        Ok(())
    }

    /// Resolves the current turn, at most once per `action_id`.
    pub async fn end_turn(
        &self,
        caller: &PlayerId,
        room_id: &RoomId,
        action_id: &str,
        expect_version: Option<u64>,
    ) -> Result<EndTurnOutcome, RoomError> {
        if action_id.trim().is_empty() {
            return Err(RoomError::InvalidArgument("clientActionId must not be empty".into()));
        }

        let catalog = &self.catalog;
        let rules = &self.rules;
        let outcome = self
            .store
            .run_atomic(room_id, |snap| {
                let room = snap.room().ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
                if !room.is_participant(caller) {
                    return Err(RoomError::NotParticipant(caller.clone(), room_id.clone()));
                }

                if room.status.is_finished() {
                    let summary = snap.last_turn_record().map(|record| record.summary.clone());
                    return Ok(Commit::read_only(EndTurnOutcome {
                        deduplicated: true,
                        version: room.version,
                        finished: true,
                        winner_id: room.winner_id.clone(),
                        summary,
                    }));
                }

                match expect_version {
                    Some(expected) if expected != room.version => {
                        return Err(RoomError::VersionMismatch {
                            room: room_id.clone(),
                            expected,
                            current: room.version,
                        });
                    }
                    _ => {}
                }

                if room.processed_action_ids.contains(action_id) {
                    return Ok(Commit::read_only(EndTurnOutcome {
                        deduplicated: true,
                        version: room.version,
                        finished: false,
                        winner_id: None,
                        summary: snap.turn_record(action_id).map(|r| r.summary.clone()),
                    }));
                }

                if room.player1_id.is_none() || room.player2_id.is_none() {
                    return Err(RoomError::OpponentMissing(room_id.clone()));
                }
                let (Some(p1_card), Some(p2_card)) = (
                    room.game_state.selected(Role::Player1),
                    room.game_state.selected(Role::Player2),
                ) else {
                    return Err(RoomError::CardsNotSelected(room_id.clone()));
                };

                let cards = catalog.get_cards_by_ids(&[p1_card, p2_card])?;
                let p1 = find_card(&cards, p1_card)?;
                let p2 = find_card(&cards, p2_card)?;

                let (next, record) = apply_turn(room, p1, p2, rules, caller, action_id, now_ms());
                let outcome = EndTurnOutcome {
                    deduplicated: false,
                    version: next.version,
                    finished: next.status.is_finished(),
                    winner_id: next.winner_id.clone(),
                    summary: Some(record.summary.clone()),
                };
                Ok(Commit::put(next, outcome).with_audit(record))
            })
            .await?;

        if outcome.deduplicated {
            tracing::debug!(%room_id, action_id, version = outcome.version, "end turn replayed");
        } else {
            tracing::info!(%room_id, action_id, version = outcome.version, "turn resolved");
            if let Some(winner) = &outcome.winner_id {
                tracing::info!(%room_id, %winner, "match finished");
            }
        }
        Ok(outcome)
    }

    /// Takes `caller` out of `room_id`.
    pub async fn leave_room(
        &self,
        caller: &PlayerId,
        room_id: &RoomId,
    ) -> Result<LeaveOutcome, RoomError> {
        let outcome = self
            .store
            .run_atomic(room_id, |snap| {
                let Some(room) = snap.room() else {
                    return Ok(Commit::read_only(LeaveOutcome::Missing));
                };
                if room.status.is_finished() {
                    return Ok(Commit::read_only(LeaveOutcome::Unchanged));
                }
                let role = room
                    .role_of(caller)
                    .ok_or_else(|| RoomError::NotParticipant(caller.clone(), room_id.clone()))?;

                let mut next = room.clone();
                match role {
                    Role::Player1
                        if room.player2_id.is_none() && room.status == RoomStatus::Waiting =>
                    {
                        return Ok(Commit::delete(LeaveOutcome::Deleted));
                    }
                    Role::Player1 => {
                        next.player1_id = None;
                        next.status = RoomStatus::Player1Left;
                    }
                    Role::Player2 => {
                        next.player2_id = None;
                        next.status = RoomStatus::Waiting;
                    }
                }
                next.updated_at = now_ms();
                Ok(Commit::put(next, LeaveOutcome::Vacated(role)))
            })
            .await?;

        match outcome {
            LeaveOutcome::Deleted => tracing::info!(%room_id, player = %caller, "room deleted"),
            LeaveOutcome::Vacated(role) => {
                tracing::info!(%room_id, player = %caller, %role, "player left")
            }
            LeaveOutcome::Missing | LeaveOutcome::Unchanged => {
                tracing::debug!(%room_id, player = %caller, ?outcome, "leave ignored")
            }
        }
        Ok(outcome)
    }

    /// The current room document, visible to its participants only.
    pub async fn get_room(&self, caller: &PlayerId, room_id: &RoomId) -> Result<Room, RoomError> {
        let room = self
            .store
            .get(room_id)
            .await?
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        if !room.is_participant(caller) {
            return Err(RoomError::NotParticipant(caller.clone(), room_id.clone()));
        }
        Ok(room)
    }
}

fn find_card(cards: &[Card], id: CardId) -> Result<&Card, RoomError> {
    cards
        .iter()
        .find(|c| c.id == id)
        .ok_or(RoomError::CardNotFound(id))
}

/// The room after one resolved round, plus its audit record.
fn apply_turn(
    room: &Room,
    p1: &Card,
    p2: &Card,
    rules: &BattleRules,
    caller: &PlayerId,
    action_id: &str,
    now: u64,
) -> (Room, TurnRecord) {
    let outcome = battle::resolve(p1, p2);
    let mut next = room.clone();

    apply_deltas(&mut next.game_state, &outcome);
    if let Some(role) = match_winner(&next.game_state, rules) {
        next.status = RoomStatus::Finished;
        next.winner_id = next.participant(role).cloned();
        next.finished_at = Some(now);
    }

    let turn_from = next.game_state.turn_number;
    next.version += 1;
    next.processed_action_ids.record(action_id, rules.action_window);
    next.game_state.clear_selections();
    next.game_state.turn_number = turn_from.saturating_add(1);
    next.updated_at = now;

    let state = &next.game_state;
    let summary = TurnSummary {
        result: outcome.result,
        p1_power: outcome.player1.power,
        p2_power: outcome.player2.power,
        p1_advantaged: outcome.player1.advantaged,
        p2_advantaged: outcome.player2.advantaged,
        p1_points: state.p1_points,
        p2_points: state.p2_points,
        p1_overmount: state.p1_overmount,
        p2_overmount: state.p2_overmount,
        next_turn: state.turn_number,
    };
    let record = TurnRecord {
        room_id: room.id.clone(),
        action_id: action_id.to_string(),
        caller: caller.clone(),
        p1_card_id: p1.id,
        p2_card_id: p2.id,
        p1_base: p1.power,
        p2_base: p2.power,
        turn_from,
        turn_to: state.turn_number,
        version: next.version,
        summary,
        created_at: now,
    };
    (next, record)
}

/// Winner gets a point; loser's overmount grows by the power gap.
fn apply_deltas(state: &mut GameState, outcome: &RoundOutcome) {
    let margin = outcome.margin();
    match outcome.result.winner() {
        Some(Role::Player1) => {
            state.p1_points += 1;
            state.p2_overmount = state.p2_overmount.saturating_add(margin);
        }
        Some(Role::Player2) => {
            state.p2_points += 1;
            state.p1_overmount = state.p1_overmount.saturating_add(margin);
        }
        None => {}
    }
}

/// Player 1 wins on reaching the point threshold or pushing player 2 over
/// the overmount limit; player 2 likewise. Player 1's conditions are
/// checked first.
fn match_winner(state: &GameState, rules: &BattleRules) -> Option<Role> {
    if state.p1_points >= rules.points_to_win || state.p2_overmount > rules.overmount_limit {
        Some(Role::Player1)
    } else if state.p2_points >= rules.points_to_win || state.p1_overmount > rules.overmount_limit {
        Some(Role::Player2)
    } else {
        None
    }
}
