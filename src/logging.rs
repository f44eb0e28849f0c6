use crate::{Error, Result};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Validates that a log level string is valid
pub fn validate_log_level(level: &str) -> Result<()> {
    level.parse::<LevelFilter>().map_err(|_| {
        Error::config(format!(
            "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
            level
        ))
    })?;
    Ok(())
}

/// Picks the effective level (`RUST_LOG` wins over the configured value).
pub fn resolve_level(configured: &str) -> String {
    resolve_level_from(configured, |key| std::env::var(key).ok())
}

pub fn resolve_level_from<F>(configured: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("RUST_LOG").unwrap_or_else(|| configured.to_string())
}

/// Installs the JSON tracing subscriber used by every binary.
pub fn init(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            validate_log_level(level)?;
            EnvFilter::new(level)
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init()
        .map_err(|e| Error::internal(format!("failed to install tracing subscriber: {}", e)))
}
