use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use seqlink::app::create_app;
use seqlink::config::Config;
use seqlink::registry::Registry;
use seqlink::storage;
use seqlink::validator::{DnsResolver, Validator};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let storage = storage::open(&config.database, &config.cache).await?;
    info!("Storage initialized successfully");

    let registry = Arc::new(Registry::new(storage));
    let last_id = registry.last_id().await?;
    info!("Next identifier will be {}", last_id + 1);

    let validator = Arc::new(Validator::new(
        Arc::new(DnsResolver),
        Duration::from_millis(config.validation.dns_timeout_ms),
    ));

    let app = create_app(registry, validator, config.redirect_status);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
