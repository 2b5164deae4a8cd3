use tracing_subscriber::EnvFilter;

use bus_feed_server::cache::BusFeedCache;
use bus_feed_server::config::AppConfig;
use bus_feed_server::feed::HttpFeedSource;
use bus_feed_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Create upstream client and the cache in front of it
    let source = HttpFeedSource::new(config.feed.clone())?;
    tracing::info!(url = source.url(), "using upstream bus feed");
    let cache = BusFeedCache::new(source, config.cache.clone());
    tracing::info!(
        live_ttl = ?cache.config().live_ttl,
        mock_ttl = ?cache.config().mock_ttl,
        fetch_timeout = ?cache.config().fetch_timeout,
        "bus feed cache ready"
    );

    let app = create_router(AppState::new(cache));

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "bus feed proxy listening");
    println!("API Endpoints:");
    println!("  GET  /health          - Health check");
    println!("  GET  /api/bus         - Live bus arrivals");
    println!("  GET  /api/bus/status  - Cache status");

    axum::serve(listener, app).await?;
    Ok(())
}
