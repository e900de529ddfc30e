use std::sync::Arc;

use screener::{api, config::Config, sources::YahooFinanceClient, AppState};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screener=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!(
        "Starting screener on {}:{} (universe: {}, batch size: {}, min bars: {})",
        config.host,
        config.port,
        config.universe.name(),
        config.scan.batch_size,
        config.scan.min_bars
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, Arc::new(YahooFinanceClient::new()));

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = api::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Screener listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
