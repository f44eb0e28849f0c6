use super::{RandomForest, Species};
use crate::dataset::{FEATURE_NAMES, N_FEATURES};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// The trained model as written to disk by `train` and served by `iris-api`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
    /// Accuracy on the held-out split, if one was used.
    #[serde(default)]
    pub accuracy: Option<f64>,
    pub forest: RandomForest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub species: Species,
    pub probabilities: Vec<f64>,
}

impl ModelArtifact {
    pub fn new(forest: RandomForest, accuracy: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            trained_at: Utc::now(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            class_names: Species::names(),
            accuracy,
            forest,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Writes the artifact, creating the parent directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        info!("Model saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::ModelNotFound {
                path: path.display().to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.forest.n_features() != N_FEATURES || self.feature_names.len() != N_FEATURES {
            return Err(Error::invalid_model(format!(
                "model expects {} features, this service sends {}",
                self.forest.n_features(),
                N_FEATURES
            )));
        }
        if self.forest.n_classes() != Species::COUNT || self.class_names != Species::names() {
            return Err(Error::invalid_model(format!(
                "model classes {:?} do not match {:?}",
                self.class_names,
                Species::names()
            )));
        }
        self.forest.validate()
    }

    pub fn predict(&self, features: &[f64]) -> Result<Prediction> {
        let probabilities = self.forest.predict_proba(features)?;
        let index = super::forest::argmax(&probabilities);
        let species = Species::from_index(index)
            .ok_or_else(|| Error::internal(format!("class index {} has no species", index)))?;
        Ok(Prediction {
            species,
            probabilities,
        })
    }
}
