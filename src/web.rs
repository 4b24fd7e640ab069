use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::WeatherAggregator;
use crate::api::{self, AppState};
use crate::client::OwmClient;
use crate::config::AppConfig;

pub async fn run(config: AppConfig) -> Result<()> {
    let client = OwmClient::new(config.owm.clone())?;
    let state = AppState::new(WeatherAggregator::new(client));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new().nest("/api", api::router(state)).layer(cors);

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("WeatherHub listening on http://{}", addr);
    axum::serve(listener, app)
        .await
        .with_context(|| "Server error")?;
    Ok(())
}
