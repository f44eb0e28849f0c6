mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::path::Path;
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads configuration from `CONFIG_PATH` (default `config.yaml`) and applies
/// `HOST`, `PORT` and `MODEL_PATH` overrides from the environment.
///
/// A missing default file falls back to built-in defaults so the binaries run
/// in a bare container; an explicit `CONFIG_PATH` must exist.
pub async fn load() -> Result<Config> {
    let explicit = env::var("CONFIG_PATH").ok();
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if explicit.is_none() && !Path::new(&config_path).exists() {
        debug!("No {} found, using built-in defaults", config_path);
        Config::default()
    } else {
        debug!("Loading configuration from: {}", config_path);
        let config_str = tokio::fs::read_to_string(&config_path)
            .await
            .map_err(|e| Error::config(format!("cannot read {}: {}", config_path, e)))?;
        parse(&config_str)?
    };

    apply_env_overrides(&mut config, |key| env::var(key).ok())?;
    config.validate()?;

    Ok(config)
}

pub fn parse(config_str: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(config_str)?)
}

pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("PORT must be a port number, got '{}'", port)))?;
    }
    if let Some(path) = lookup("MODEL_PATH") {
        config.model.path = path;
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let training = &self.training;
        if training.n_estimators == 0 {
            return Err(Error::config("training.n_estimators must be at least 1"));
        }
        if !(training.test_size > 0.0 && training.test_size < 1.0) {
            return Err(Error::config(format!(
                "training.test_size must be between 0 and 1, got {}",
                training.test_size
            )));
        }
        if training.min_samples_split < 2 {
            return Err(Error::config("training.min_samples_split must be at least 2"));
        }
        if training.min_samples_leaf < 1 {
            return Err(Error::config("training.min_samples_leaf must be at least 1"));
        }
        if training.max_features == MaxFeatures::Count(0) {
            return Err(Error::config("training.max_features must be at least 1"));
        }
        if self.model.path.trim().is_empty() {
            return Err(Error::config("model.path must not be empty"));
        }
        Ok(())
    }
}
