//! Request dispatch: frame in, reply out.
//!
//! The flow for every frame is:
//!   1. Decode the envelope (failure → `invalid-argument` with id 0)
//!   2. Authenticate the token → `PlayerId`
//!   3. Validate the payload → typed [`Request`]
//!   4. Run the operation (one store transaction)
//!   5. Encode the result or the error code into a [`ReplyFrame`]

use std::sync::Arc;

use cardclash_auth::Authenticator;
use cardclash_protocol::{
    Codec, ErrorCode, JsonCodec, PlayerId, ProtocolError, ReplyFrame, Request, RequestFrame,
};
use cardclash_room::{CardCatalog, DeckStore, Matchmaker, RoomMachine, RoomStore, now_ms};
use serde::Serialize;
use serde_json::{Value, json};

use crate::CardclashError;

/// Everything a connection needs to serve calls.
///
/// Built once at startup and shared by `Arc` with every connection task.
pub struct CardclashService<A, S, C, D, K = JsonCodec> {
    matchmaker: Matchmaker<S, C>,
    decks: Arc<D>,
    auth: A,
    codec: K,
}

impl<A, S, C, D> CardclashService<A, S, C, D, JsonCodec>
where
    A: Authenticator,
    S: RoomStore,
    C: CardCatalog,
    D: DeckStore,
{
    pub fn new(machine: RoomMachine<S, C>, decks: Arc<D>, auth: A) -> Self {
        Self::with_codec(machine, decks, auth, JsonCodec)
    }
}

impl<A, S, C, D, K> CardclashService<A, S, C, D, K>
where
    A: Authenticator,
    S: RoomStore,
    C: CardCatalog,
    D: DeckStore,
    K: Codec,
{
    pub fn with_codec(machine: RoomMachine<S, C>, decks: Arc<D>, auth: A, codec: K) -> Self {
        Self {
            matchmaker: Matchmaker::new(machine),
            decks,
            auth,
            codec,
        }
    }

    pub fn machine(&self) -> &RoomMachine<S, C> {
        self.matchmaker.machine()
    }

    pub fn store(&self) -> &Arc<S> {
        self.machine().store()
    }

    pub fn catalog(&self) -> &Arc<C> {
        self.machine().catalog()
    }

    pub fn decks(&self) -> &Arc<D> {
        &self.decks
    }

    /// Decodes one inbound frame, serves it and returns the encoded reply.
    pub async fn handle_bytes(&self, data: &[u8]) -> Result<Vec<u8>, CardclashError> {
        let reply = match self.codec.decode_request(data) {
            Ok(frame) => self.dispatch(frame).await,
            Err(e) => {
                tracing::debug!(error = %e, "undecodable frame");
                ReplyFrame::error(0, e.code(), e.to_string())
            }
        };
        Ok(self.codec.encode_reply(&reply)?)
    }

    /// Serves one decoded frame. Never fails: every error becomes an error
    /// reply carrying the frame's id.
    pub async fn dispatch(&self, frame: RequestFrame) -> ReplyFrame {
        let id = frame.id;
        match self.execute(&frame).await {
            Ok(value) => ReplyFrame::ok(id, value),
            Err(err) => {
                let code = err.code();
                if code == ErrorCode::Internal {
                    tracing::error!(id, call = %frame.call, error = %err, "call failed");
                } else {
                    tracing::debug!(id, call = %frame.call, %code, error = %err, "call rejected");
                }
                ReplyFrame::error(id, code, err.to_string())
            }
        }
    }

    async fn execute(&self, frame: &RequestFrame) -> Result<Value, CardclashError> {
        let caller = self.auth.identify(frame.token.as_deref()).await?;
        let request = Request::parse(&frame.call, &frame.data)?;
        let value = self.call(&caller, request).await?;
        tracing::debug!(id = frame.id, call = %frame.call, player = %caller, "call ok");
        Ok(value)
    }

    /// Runs an authenticated, validated request.
    pub async fn call(&self, caller: &PlayerId, request: Request) -> Result<Value, CardclashError> {
        let machine = self.machine();
        match request {
            Request::FindOrCreateRoom { room_id } => {
                to_value(&self.matchmaker.find_or_create_room(caller, room_id).await?)
            }
            Request::SelectCard { room_id, card_id } => {
                machine.select_card(caller, &room_id, card_id).await?;
                Ok(json!({ "ok": true }))
            }
            Request::EndTurn { room_id, client_action_id, expect_version } => to_value(
                &machine
                    .end_turn(caller, &room_id, &client_action_id, expect_version)
                    .await?,
            ),
            Request::LeaveRoom { room_id } => {
                machine.leave_room(caller, &room_id).await?;
                Ok(json!({ "ok": true }))
            }
            Request::GetRoom { room_id } => to_value(&machine.get_room(caller, &room_id).await?),
            Request::FetchCardsByIds { ids } => {
                let cards = self.catalog().get_cards_by_ids(&ids)?;
                Ok(json!({ "cards": to_value(&cards)? }))
            }
            Request::AdminUpsertCards { cards } => {
                let total = cards.len();
                let upserted = self.catalog().upsert(cards)?;
                tracing::info!(player = %caller, upserted, total, "cards upserted");
                Ok(json!({ "upserted": upserted }))
            }
            Request::GetCardsCount => {
                let has_any = self.catalog().has_any()?;
                Ok(json!({ "ok": true, "hasAny": has_any }))
            }
            Request::EnsureUserInitialized => {
                if self.decks.ensure_user(caller, now_ms())? {
                    tracing::info!(player = %caller, "user initialized");
                }
                Ok(json!({ "ok": true }))
            }
            Request::SaveDeck { deck } => {
                let profile = self.decks.save_deck(caller, deck, now_ms())?;
                tracing::info!(player = %caller, deck_size = profile.deck.len(), "deck saved");
                Ok(json!({ "ok": true, "savedDeck": to_value(&profile.deck)? }))
            }
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, CardclashError> {
    Ok(serde_json::to_value(value).map_err(ProtocolError::Encode)?)
}
