//! Integration tests for the Cardclash server over real WebSocket
//! connections.

use std::sync::Arc;
use std::time::Duration;

use cardclash::prelude::*;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

fn seed_cards() -> MemoryCatalog {
    let card = |id: u32, elemental_type: ElementalType, power: u32| Card {
        id: CardId(id),
        name: format!("card {id}"),
        elemental_type,
        power,
        rank: Rank::B,
    };
    MemoryCatalog::with_cards([
        card(1, ElementalType::It, 50),
        card(2, ElementalType::It, 10),
        card(3, ElementalType::Language, 30),
    ])
}

fn tokens() -> StaticTokens {
    StaticTokens::parse("ta=alice,tb=bob,tc=carol")
}

async fn start_server_with(builder: CardclashServerBuilder) -> String {
    let server = builder
        .bind("127.0.0.1:0")
        .build(
            tokens(),
            Arc::new(MemoryStore::new()),
            Arc::new(seed_cards()),
            Arc::new(MemoryDecks::new()),
        )
        .await
        .expect("server should build");

    let addr = server.local_addr().expect("should have local addr").to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

async fn start_server() -> String {
    start_server_with(CardclashServerBuilder::new()).await
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send_raw(ws: &mut ClientWs, text: String) -> ReplyFrame {
    ws.send(Message::text(text)).await.expect("send");
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("reply in time")
        .expect("stream open")
        .expect("frame");
    serde_json::from_slice(&msg.into_data()).expect("decode reply")
}

async fn call(ws: &mut ClientWs, id: u64, token: Option<&str>, call: &str, data: Value) -> ReplyFrame {
    let frame = json!({ "id": id, "token": token, "call": call, "data": data });
    send_raw(ws, frame.to_string()).await
}

fn ok(reply: ReplyFrame) -> Value {
    match reply.body {
        ReplyBody::Ok(value) => value,
        ReplyBody::Error(e) => panic!("expected ok, got {:?}: {}", e.code, e.message),
    }
}

fn err(reply: &ReplyFrame) -> ErrorCode {
    reply.error_code().expect("expected an error reply")
}

/// alice and bob connected and matched into one room.
async fn matched(addr: &str) -> (ClientWs, ClientWs, String) {
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    let first = ok(call(&mut a, 1, Some("ta"), "findOrCreateRoom", json!({})).await);
    assert_eq!(first["assignedRole"], "player1");
    let room_id = first["roomId"].as_str().unwrap().to_string();

    let second = ok(call(&mut b, 1, Some("tb"), "findOrCreateRoom", json!({})).await);
    assert_eq!(second["assignedRole"], "player2");
    assert_eq!(second["roomId"], room_id.as_str());

    (a, b, room_id)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_full_turn_and_replay() {
    let addr = start_server().await;
    let (mut a, mut b, room) = matched(&addr).await;

    let sel = call(&mut a, 2, Some("ta"), "selectCard", json!({ "roomId": room, "cardId": 1 })).await;
    assert_eq!(sel.id, 2);
    assert_eq!(ok(sel), json!({ "ok": true }));
    ok(call(&mut b, 2, Some("tb"), "selectCard", json!({ "roomId": room, "cardId": 2 })).await);

    let data = json!({ "roomId": room, "clientActionId": "turn-1", "expectVersion": 0 });
    let first = ok(call(&mut a, 3, Some("ta"), "endTurn", data).await);
    assert_eq!(first["deduplicated"], false);
    assert_eq!(first["version"], 1);
    assert_eq!(first["finished"], false);
    assert_eq!(first["summary"]["result"], "player1");
    assert_eq!(first["summary"]["p2Overmount"], 40);
    assert_eq!(first["summary"]["nextTurn"], 2);
    assert!(first.get("winnerId").is_none());

    // bob retries the same action: nothing is applied twice.
    let data = json!({ "roomId": room, "clientActionId": "turn-1" });
    let replay = ok(call(&mut b, 3, Some("tb"), "endTurn", data).await);
    assert_eq!(replay["deduplicated"], true);
    assert_eq!(replay["version"], 1);
    assert_eq!(replay["summary"], first["summary"]);
}

#[tokio::test]
async fn test_stale_version_is_aborted() {
    let addr = start_server().await;
    let (mut a, mut b, room) = matched(&addr).await;
    ok(call(&mut a, 2, Some("ta"), "selectCard", json!({ "roomId": room, "cardId": 3 })).await);
    ok(call(&mut b, 2, Some("tb"), "selectCard", json!({ "roomId": room, "cardId": 3 })).await);

    let data = json!({ "roomId": room, "clientActionId": "x", "expectVersion": 7 });
    let reply = call(&mut a, 3, Some("ta"), "endTurn", data).await;
    assert_eq!(err(&reply), ErrorCode::Aborted);

    // refetch shows nothing changed
    let snapshot = ok(call(&mut a, 4, Some("ta"), "getRoom", json!({ "roomId": room })).await);
    assert_eq!(snapshot["version"], 0);
    assert_eq!(snapshot["status"], "matched");
    assert_eq!(snapshot["gameState"]["p1SelectedCard"], 3);
}

#[tokio::test]
async fn test_missing_and_unknown_tokens() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let reply = call(&mut ws, 5, None, "findOrCreateRoom", json!({})).await;
    assert_eq!(reply.id, 5);
    assert_eq!(err(&reply), ErrorCode::Unauthenticated);

    let reply = call(&mut ws, 6, Some("forged"), "findOrCreateRoom", json!({})).await;
    assert_eq!(err(&reply), ErrorCode::Unauthenticated);
}

#[tokio::test]
async fn test_validation_errors() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let reply = call(&mut ws, 1, Some("ta"), "castSpell", json!({})).await;
    assert_eq!(err(&reply), ErrorCode::InvalidArgument);

    let reply = call(&mut ws, 2, Some("ta"), "selectCard", json!({ "roomId": "  ", "cardId": 1 })).await;
    assert_eq!(err(&reply), ErrorCode::InvalidArgument);

    let reply = call(&mut ws, 3, Some("ta"), "selectCard", json!({ "roomId": "r", "cardId": -4 })).await;
    assert_eq!(err(&reply), ErrorCode::InvalidArgument);

    let reply = send_raw(&mut ws, "definitely not json".to_string()).await;
    assert_eq!(reply.id, 0);
    assert_eq!(err(&reply), ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn test_outsider_and_missing_room() {
    let addr = start_server().await;
    let (_a, _b, room) = matched(&addr).await;
    let mut c = connect(&addr).await;

    let reply = call(&mut c, 1, Some("tc"), "getRoom", json!({ "roomId": room })).await;
    assert_eq!(err(&reply), ErrorCode::PermissionDenied);

    let reply = call(&mut c, 2, Some("tc"), "findOrCreateRoom", json!({ "roomId": room })).await;
    assert_eq!(err(&reply), ErrorCode::FailedPrecondition);

    let reply = call(&mut c, 3, Some("tc"), "getRoom", json!({ "roomId": "nope" })).await;
    assert_eq!(err(&reply), ErrorCode::NotFound);

    // leaving a room that does not exist is a no-op
    let reply = call(&mut c, 4, Some("tc"), "leaveRoom", json!({ "roomId": "nope" })).await;
    assert_eq!(ok(reply), json!({ "ok": true }));
}

#[tokio::test]
async fn test_card_catalog_calls() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let upsert = json!({ "cards": [
        { "id": 10, "name": "Compiler", "type": "IT", "power": 40, "rank": "A" },
        { "id": 0, "name": "broken", "type": "It", "power": 1, "rank": "C" },
    ]});
    let reply = ok(call(&mut ws, 1, Some("ta"), "adminUpsertCards", upsert).await);
    assert_eq!(reply["upserted"], 1);

    let reply = ok(call(&mut ws, 2, Some("ta"), "fetchCardsByIds", json!({ "ids": [10, 1, 10, 999] })).await);
    let cards = reply["cards"].as_array().unwrap();
    let ids: Vec<_> = cards.iter().map(|c| c["id"].as_u64().unwrap()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&1) && ids.contains(&10));
    let compiler = cards.iter().find(|c| c["id"] == 10).unwrap();
    assert_eq!(compiler["type"], "it");

    let reply = call(&mut ws, 3, Some("ta"), "fetchCardsByIds", json!({ "ids": [] })).await;
    assert_eq!(err(&reply), ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn test_cards_count_reports_catalog() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let reply = ok(call(&mut ws, 1, Some("ta"), "getCardsCount", json!({})).await);
    assert_eq!(reply, json!({ "ok": true, "hasAny": true }));

    let reply = call(&mut ws, 2, None, "getCardsCount", json!({})).await;
    assert_eq!(err(&reply), ErrorCode::Unauthenticated);
}

#[tokio::test]
async fn test_user_initialization_and_deck_save() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let reply = ok(call(&mut ws, 1, Some("ta"), "ensureUserInitialized", json!({})).await);
    assert_eq!(reply, json!({ "ok": true }));
    // a second call is a no-op, not an error
    ok(call(&mut ws, 2, Some("ta"), "ensureUserInitialized", json!({})).await);

    let data = json!({ "deck": [3, "1", 0, -2, 3] });
    let reply = ok(call(&mut ws, 3, Some("ta"), "saveDeck", data).await);
    assert_eq!(reply, json!({ "ok": true, "savedDeck": [3, 1, 3] }));

    // bob never initialized; saving creates the profile
    let reply = ok(call(&mut ws, 4, Some("tb"), "saveDeck", json!({ "deck": [2] })).await);
    assert_eq!(reply["savedDeck"], json!([2]));

    let reply = call(&mut ws, 5, Some("ta"), "saveDeck", json!({ "deck": [0, "x"] })).await;
    assert_eq!(err(&reply), ErrorCode::InvalidArgument);
    let too_many: Vec<u32> = (1..=26).collect();
    let reply = call(&mut ws, 6, Some("ta"), "saveDeck", json!({ "deck": too_many })).await;
    assert_eq!(err(&reply), ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn test_leave_then_rematch() {
    let addr = start_server().await;
    let (_a, mut b, room) = matched(&addr).await;

    ok(call(&mut b, 2, Some("tb"), "leaveRoom", json!({ "roomId": room })).await);

    let mut c = connect(&addr).await;
    let assignment = ok(call(&mut c, 1, Some("tc"), "findOrCreateRoom", json!({})).await);
    assert_eq!(assignment["roomId"], room.as_str());
    assert_eq!(assignment["assignedRole"], "player2");
}

#[tokio::test]
async fn test_idle_connection_is_closed() {
    let addr = start_server_with(CardclashServerBuilder::new().idle_timeout(Duration::from_millis(100))).await;
    let mut ws = connect(&addr).await;

    let next = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("server should close the idle connection");
    match next {
        None | Some(Ok(Message::Close(_))) | Some(Err(_)) => {}
        Some(Ok(other)) => panic!("expected close, got {other:?}"),
    }
}
