//! Connection layer for Cardclash.
//!
//! [`Listener`] accepts peers, [`Connection`] moves whole frames in both
//! directions. Nothing here knows about requests or rooms: a frame is just
//! bytes, and the server decides what they mean.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket listener via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WsListener, WsPeer};

use std::fmt;
use std::net::SocketAddr;

/// Process-unique identifier of an accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts incoming peers.
pub trait Listener: Send + Sync + 'static {
    type Connection: Connection;

    /// Waits for the next peer and completes its handshake.
    async fn accept(&mut self) -> Result<Self::Connection, TransportError>;

    /// The address actually bound (useful after binding port 0).
    fn local_addr(&self) -> Result<SocketAddr, TransportError>;
}

/// One accepted peer.
///
/// `send` and `recv` may be used from different tasks at the same time.
pub trait Connection: Send + Sync + 'static {
    /// Sends one frame.
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError>;

    /// Receives the next frame. `Ok(None)` means the peer closed cleanly.
    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError>;

    async fn close(&self) -> Result<(), TransportError>;

    fn id(&self) -> ConnectionId;

    fn peer_addr(&self) -> SocketAddr;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
        assert_eq!(ConnectionId::new(7).into_inner(), 7);
    }

    #[test]
    fn test_connection_id_orders_by_value() {
        let mut ids = vec![ConnectionId::new(3), ConnectionId::new(1), ConnectionId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![ConnectionId::new(1), ConnectionId::new(2), ConnectionId::new(3)]);
    }
}
