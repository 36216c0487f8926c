//! Bubble Brawl game server.

use bubblebrawl::{BubbleBrawlServer, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Bubble Brawl server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::load()?;
    info!(
        bind = %config.bind,
        rooms = config.room_count,
        capacity = config.room.capacity,
        "loaded configuration"
    );

    let server = BubbleBrawlServer::builder().config(config).build().await?;
    server.run().await?;

    Ok(())
}
