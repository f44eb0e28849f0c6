use anyhow::{Context, Result};
use iris_api::{config, logging, training};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load().await.context("failed to load configuration")?;
    logging::init(&logging::resolve_level(&config.server.logs.level))?;

    info!("Loading Iris dataset");
    let (artifact, report) = training::train_iris(&config.training)?;

    println!("\nModel Accuracy: {:.4}", report.accuracy);
    println!("\nClassification Report:");
    println!("{}", report.classification);

    artifact
        .save(&config.model.path)
        .with_context(|| format!("failed to write model to {}", config.model.path))?;
    println!("\nModel saved to {}", config.model.path);

    Ok(())
}
