//! Matchmaking: route a player to a room.

use cardclash_protocol::{PlayerId, Role, RoomId};
use serde::{Deserialize, Serialize};

use crate::{CardCatalog, RoomError, RoomMachine, RoomStore};

/// Where a player ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub room_id: RoomId,
    pub assigned_role: Role,
}

/// Finds a waiting opponent or opens a new room.
///
/// Every claim is one store transaction (see [`RoomMachine::join`]). The
/// matchmaker never retries: losing a race surfaces as `Aborted` or
/// `FailedPrecondition` and the client searches again.
pub struct Matchmaker<S, C> {
    machine: RoomMachine<S, C>,
}

impl<S, C> Clone for Matchmaker<S, C> {
    fn clone(&self) -> Self {
        Self { machine: self.machine.clone() }
    }
}

impl<S: RoomStore, C: CardCatalog> Matchmaker<S, C> {
    pub fn new(machine: RoomMachine<S, C>) -> Self {
        Self { machine }
    }

    pub fn machine(&self) -> &RoomMachine<S, C> {
        &self.machine
    }

    /// Joins `room_id` when given; otherwise claims the oldest waiting room
    /// created by someone else, or creates one.
    pub async fn find_or_create_room(
        &self,
        caller: &PlayerId,
        room_id: Option<RoomId>,
    ) -> Result<Assignment, RoomError> {
        if let Some(room_id) = room_id {
            let assigned_role = self.machine.join(caller, &room_id).await?;
            return Ok(Assignment { room_id, assigned_role });
        }

        let limit = self.machine.rules().matchmaking_scan_limit;
        let candidate = self
            .machine
            .store()
            .find_waiting(limit)
            .await?
            .into_iter()
            .find(|room| room.player1_id.as_ref() != Some(caller));

        match candidate {
            Some(room) => {
                tracing::debug!(room_id = %room.id, player = %caller, "claiming waiting room");
                let assigned_role = self.machine.join(caller, &room.id).await?;
                Ok(Assignment { room_id: room.id, assigned_role })
            }
            None => {
                let room_id = self.machine.create_room(caller).await?;
                Ok(Assignment { room_id, assigned_role: Role::Player1 })
            }
        }
    }
}
