//! WebSocket listener built on `tokio-tungstenite`.
//!
//! Each peer's stream is split into a sink and a stream half behind their
//! own locks, so a task waiting in `recv` never blocks a `send`.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Listener, TransportError};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<TcpStream>;

/// Accepts WebSocket peers on a TCP socket.
pub struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| TransportError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        tracing::info!(addr, "websocket listener bound");
        Ok(Self { listener })
    }
}

impl Listener for WsListener {
    type Connection = WsPeer;

    async fn accept(&mut self) -> Result<WsPeer, TransportError> {
        let (stream, peer_addr) = self.listener.accept().await.map_err(TransportError::Accept)?;

        let ws = tokio_tungstenite::accept_async(stream).await.map_err(|e| {
            TransportError::Accept(TransportError::io(ErrorKind::ConnectionRefused, e))
        })?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer_addr, "websocket peer accepted");

        let (sink, stream) = ws.split();
        Ok(WsPeer {
            id,
            peer_addr,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(TransportError::Accept)
    }
}

/// One accepted WebSocket peer.
///
/// Frames that are valid UTF-8 go out as text messages, anything else as
/// binary. Incoming text and binary messages are both delivered as bytes.
pub struct WsPeer {
    id: ConnectionId,
    peer_addr: SocketAddr,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl Connection for WsPeer {
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let msg = match std::str::from_utf8(frame) {
            Ok(text) => Message::text(text.to_string()),
            Err(_) => Message::binary(frame.to_vec()),
        };
        self.sink
            .lock()
            .await
            .send(msg)
            .await
            .map_err(|e| TransportError::Send(TransportError::io(ErrorKind::BrokenPipe, e)))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_bytes().to_vec())),
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.to_vec())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // ping, pong and raw frames
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    return Err(TransportError::Receive(TransportError::io(
                        ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| TransportError::Send(TransportError::io(ErrorKind::BrokenPipe, e)))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}
