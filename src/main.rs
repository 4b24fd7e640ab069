use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use weatherhub::config::AppConfig;
use weatherhub::web;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().with_context(|| "Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    tracing::info!(
        "Starting WeatherHub v{} (API key {})",
        weatherhub::VERSION,
        config.owm.masked_api_key()
    );

    web::run(config).await
}
