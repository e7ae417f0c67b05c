use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use wayfarer::api::AppState;
use wayfarer::{OsmPlaceSource, TtlCache, WayfarerConfig, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = WayfarerConfig::load().context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        "Starting wayfarer {} (cache TTL {} s)",
        wayfarer::VERSION,
        config.cache.ttl_seconds
    );

    let cache =
        TtlCache::open(&config.cache.location).context("Failed to open cache database")?;
    let place_source =
        OsmPlaceSource::new(&config, cache).context("Failed to build place source")?;

    let state = AppState {
        place_source: Arc::new(place_source),
    };

    web::run(&config, state).await
}
