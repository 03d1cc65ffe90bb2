//! Per-connection loop.
//!
//! Each accepted peer gets its own Tokio task running [`handle_connection`].
//! Frames are served one at a time, so replies leave in request order.

use std::sync::Arc;
use std::time::Duration;

use cardclash_auth::Authenticator;
use cardclash_protocol::Codec;
use cardclash_room::{CardCatalog, DeckStore, RoomStore};
use cardclash_transport::{Connection, WsPeer};

use crate::{CardclashError, CardclashService};

/// Serves one peer from accept to close.
pub(crate) async fn handle_connection<A, S, C, D, K>(
    conn: WsPeer,
    service: Arc<CardclashService<A, S, C, D, K>>,
    idle_timeout: Duration,
) -> Result<(), CardclashError>
where
    A: Authenticator,
    S: RoomStore,
    C: CardCatalog,
    D: DeckStore,
    K: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "connection opened");

    let mut served: u64 = 0;
    loop {
        let data = match tokio::time::timeout(idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, served, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, served, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
        };

        let reply = service.handle_bytes(&data).await?;
        conn.send(&reply).await?;
        served += 1;
    }

    Ok(())
}
