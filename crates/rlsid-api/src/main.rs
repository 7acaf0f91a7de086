//! # rlsid-api — Binary Entry Point
//!
//! Reads configuration from the environment, loads the report catalog and
//! serves the API. Binds to `PORT` (default 8080).

use rlsid_api::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    init_tracing(config.as_ref().map(|c| c.log_json).unwrap_or(false));

    let config = config.map_err(|e| {
        tracing::error!("Configuration error: {e}");
        e
    })?;
    tracing::info!(?config, "configuration loaded");
    let port = config.port;

    let state = rlsid_api::bootstrap::bootstrap(config).map_err(|e| {
        tracing::error!("Bootstrap failed: {e}");
        e
    })?;

    let app = rlsid_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("rlsid API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
