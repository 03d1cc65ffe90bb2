//! Demo battle server: in-memory rooms and decks, a small seeded card
//! catalog and static tokens.
//!
//! ```text
//! CARDCLASH_BIND=0.0.0.0:8080 CARDCLASH_TOKENS=t1=alice,t2=bob cargo run -p battle-server
//! ```

use std::sync::Arc;

use cardclash::prelude::*;

const ENV_TOKENS: &str = "CARDCLASH_TOKENS";

fn starter_deck() -> Vec<Card> {
    let card = |id: u32, name: &str, elemental_type: ElementalType, power: u32, rank: Rank| Card {
        id: CardId(id),
        name: name.to_string(),
        elemental_type,
        power,
        rank,
    };
    vec![
        card(1, "Segfault", ElementalType::It, 45, Rank::B),
        card(2, "Cloud Bill", ElementalType::It, 70, Rank::A),
        card(3, "Kernel Panic", ElementalType::It, 95, Rank::S),
        card(4, "Grammar Drill", ElementalType::Language, 40, Rank::C),
        card(5, "Polyglot", ElementalType::Language, 75, Rank::A),
        card(6, "False Friend", ElementalType::Language, 20, Rank::D),
        card(7, "Quarterly Report", ElementalType::Business, 50, Rank::B),
        card(8, "Hostile Takeover", ElementalType::Business, 90, Rank::S),
        card(9, "Cold Call", ElementalType::Business, 25, Rank::D),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let tokens = StaticTokens::parse(&std::env::var(ENV_TOKENS).unwrap_or_default());
    if tokens.is_empty() {
        tracing::warn!("{ENV_TOKENS} is empty; every call will be rejected");
    }

    let catalog = MemoryCatalog::with_cards(starter_deck());
    tracing::info!(
        bind = %config.bind_addr,
        cards = catalog.len(),
        players = tokens.len(),
        "starting battle server"
    );

    let server = CardclashServerBuilder::from_config(config)
        .build(
            tokens,
            Arc::new(MemoryStore::new()),
            Arc::new(catalog),
            Arc::new(MemoryDecks::new()),
        )
        .await?;
    server.run().await?;
    Ok(())
}
