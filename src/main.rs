use anyhow::Result;
use iris_api::{config, logging, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (before logging setup)
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let log_level = logging::resolve_level(&config.server.logs.level);
    if let Err(e) = logging::init(&log_level) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    info!("Starting Iris classifier API with log level: {}", log_level);
    info!("Configuration loaded successfully");

    server::run(config).await?;

    Ok(())
}
