//! Post-deploy checks: the same `GET /health` and `POST /predict` an operator
//! would run with curl after a release.

use crate::model::Species;
use crate::server::types::{HealthResponse, PredictionRequest, PredictionResponse};
use crate::{Error, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::info;

/// A setosa sample; any healthy deployment classifies it.
pub const SAMPLE_FEATURES: [f64; 4] = [5.1, 3.5, 1.4, 0.2];

#[derive(Debug, Clone)]
pub struct SmokeReport {
    pub health: HealthResponse,
    pub prediction: PredictionResponse,
}

pub struct SmokeClient {
    client: Client,
    base_url: String,
}

impl SmokeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::config(format!(
                "base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn check_health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        info!("Checking {}", url);

        let response = self.client.get(&url).send().await?;
        expect_ok(response.status(), "GET /health")?;

        let health: HealthResponse = response.json().await?;
        if health.status != "healthy" {
            return Err(Error::smoke(format!(
                "service reports '{}': {}",
                health.status,
                health.error.as_deref().unwrap_or("no detail")
            )));
        }
        Ok(health)
    }

    pub async fn check_prediction(&self, features: &[f64]) -> Result<PredictionResponse> {
        let url = format!("{}/predict", self.base_url);
        info!("Requesting prediction from {}", url);

        let response = self
            .client
            .post(&url)
            .json(&PredictionRequest {
                features: features.to_vec(),
            })
            .send()
            .await?;
        expect_ok(response.status(), "POST /predict")?;

        let prediction: PredictionResponse = response.json().await?;
        validate_prediction(&prediction)?;
        Ok(prediction)
    }

    /// Health first, then one prediction; stops at the first failure.
    pub async fn run(&self) -> Result<SmokeReport> {
        let health = self.check_health().await?;
        let prediction = self.check_prediction(&SAMPLE_FEATURES).await?;
        info!(
            class = %prediction.class_name,
            "Smoke check passed against {}", self.base_url
        );
        Ok(SmokeReport { health, prediction })
    }
}

fn expect_ok(status: StatusCode, what: &str) -> Result<()> {
    if status != StatusCode::OK {
        return Err(Error::smoke(format!("{} returned {}", what, status)));
    }
    Ok(())
}

pub fn validate_prediction(prediction: &PredictionResponse) -> Result<()> {
    let species = Species::from_index(prediction.prediction)
        .ok_or_else(|| Error::smoke(format!("class index {} out of range", prediction.prediction)))?;
    if prediction.class_name != species.name() {
        return Err(Error::smoke(format!(
            "class name '{}' does not match index {}",
            prediction.class_name, prediction.prediction
        )));
    }
    if prediction.prediction_proba.len() != Species::COUNT {
        return Err(Error::smoke(format!(
            "expected {} probabilities, got {}",
            Species::COUNT,
            prediction.prediction_proba.len()
        )));
    }
    let total: f64 = prediction.prediction_proba.iter().sum();
    if (total - 1.0).abs() >= 0.01 {
        return Err(Error::smoke(format!("probabilities sum to {}", total)));
    }
    Ok(())
}
