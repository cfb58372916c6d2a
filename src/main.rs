// src/main.rs

use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use mentor_relay::config::Config;
use mentor_relay::relay;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env();

    info!("Starting DevBoard mentor relay");
    info!("Provider: {}", config.provider_label);
    info!("Model: {}", config.model);
    // Presence only - the key value itself is never logged
    info!(
        "GEMINI_API_KEY configured: {}",
        config.gemini_api_key.is_some()
    );

    relay::run(config).await
}
