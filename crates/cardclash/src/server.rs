//! `CardclashServer` builder and accept loop.
//!
//! This is the entry point for running a battle server. It ties the
//! layers together: transport → protocol → auth → rooms.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use cardclash_auth::Authenticator;
use cardclash_protocol::{Codec, JsonCodec};
use cardclash_room::{BattleRules, CardCatalog, DeckStore, RoomMachine, RoomStore};
use cardclash_transport::{Listener, WsListener};

use crate::handler::handle_connection;
use crate::{CardclashError, CardclashService, ServerConfig};

/// Builder for configuring and starting a Cardclash server.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use cardclash::prelude::*;
///
/// # async fn run() -> Result<(), CardclashError> {
/// let server = CardclashServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(
///         StaticTokens::new().with("dev-token", "alice"),
///         Arc::new(MemoryStore::new()),
///         Arc::new(MemoryCatalog::new()),
///         Arc::new(MemoryDecks::new()),
///     )
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CardclashServerBuilder {
    config: ServerConfig,
}

impl CardclashServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an already loaded configuration.
    pub fn from_config(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn rules(mut self, rules: BattleRules) -> Self {
        self.config.rules = rules;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Binds the listener and assembles the shared service.
    ///
    /// Uses [`JsonCodec`] on the wire.
    pub async fn build<A, S, C, D>(
        self,
        auth: A,
        store: Arc<S>,
        catalog: Arc<C>,
        decks: Arc<D>,
    ) -> Result<CardclashServer<A, S, C, D, JsonCodec>, CardclashError>
    where
        A: Authenticator,
        S: RoomStore,
        C: CardCatalog,
        D: DeckStore,
    {
        let listener = WsListener::bind(&self.config.bind_addr).await?;
        let machine = RoomMachine::new(store, catalog, self.config.rules.clone());
        let service = Arc::new(CardclashService::new(machine, decks, auth));

        Ok(CardclashServer {
            listener,
            service,
            idle_timeout: self.config.idle_timeout,
        })
    }
}

/// A bound Cardclash server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CardclashServer<A, S, C, D, K = JsonCodec> {
    listener: WsListener,
    service: Arc<CardclashService<A, S, C, D, K>>,
    idle_timeout: Duration,
}

impl<A, S, C, D, K> CardclashServer<A, S, C, D, K>
where
    A: Authenticator,
    S: RoomStore,
    C: CardCatalog,
    D: DeckStore,
    K: Codec,
{
    pub fn local_addr(&self) -> Result<SocketAddr, CardclashError> {
        Ok(self.listener.local_addr()?)
    }

    /// The shared service, e.g. to seed rooms before serving.
    pub fn service(&self) -> &Arc<CardclashService<A, S, C, D, K>> {
        &self.service
    }

    /// Runs the accept loop, one task per connection, until the process
    /// is terminated.
    pub async fn run(mut self) -> Result<(), CardclashError> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "cardclash server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let service = Arc::clone(&self.service);
                    let idle_timeout = self.idle_timeout;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, service, idle_timeout).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
