use std::io;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listening socket could not be bound.
    #[error("bind {addr} failed: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Accepting a TCP connection or upgrading it to WebSocket failed.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),

    /// The peer went away while we were still talking to it.
    #[error("connection closed")]
    Closed,
}

impl TransportError {
    /// Wraps a non-IO failure so it still carries its source.
    #[cfg_attr(not(feature = "websocket"), allow(dead_code))]
    pub(crate) fn io<E>(kind: io::ErrorKind, err: E) -> io::Error
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_names_address() {
        let err = TransportError::Bind {
            addr: "127.0.0.1:1".into(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "taken"),
        };
        let text = err.to_string();
        assert!(text.contains("127.0.0.1:1"));
        assert!(text.contains("taken"));
    }
}
