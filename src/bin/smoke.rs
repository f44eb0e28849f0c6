use anyhow::{Context, Result, bail};
use iris_api::{logging, smoke::SmokeClient};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(&logging::resolve_level("info"))?;

    let Some(base_url) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SMOKE_BASE_URL").ok())
    else {
        bail!("usage: smoke <base-url> (or set SMOKE_BASE_URL)");
    };

    let timeout = match std::env::var("SMOKE_TIMEOUT_SECS") {
        Ok(secs) => secs
            .parse()
            .with_context(|| format!("SMOKE_TIMEOUT_SECS must be a number, got '{}'", secs))?,
        Err(_) => DEFAULT_TIMEOUT_SECS,
    };

    let client = SmokeClient::new(base_url, Duration::from_secs(timeout))?;
    let report = client
        .run()
        .await
        .with_context(|| format!("smoke check against {} failed", client.base_url()))?;

    println!(
        "OK: {} healthy (model {}), predicted {} for the sample",
        client.base_url(),
        report
            .health
            .model_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        report.prediction.class_name
    );
    Ok(())
}
