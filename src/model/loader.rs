use super::ModelArtifact;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Loads the model artifact on first use and hands out shared references.
///
/// Failed loads are not cached, so a model written after startup is picked up
/// by the next request.
pub struct ModelLoader {
    path: PathBuf,
    model: RwLock<Option<Arc<ModelArtifact>>>,
}

impl ModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            model: RwLock::new(None),
        }
    }

    /// A loader that already holds `model`; nothing is read from disk.
    pub fn with_model(path: impl Into<PathBuf>, model: ModelArtifact) -> Self {
        Self {
            path: path.into(),
            model: RwLock::new(Some(Arc::new(model))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn is_loaded(&self) -> bool {
        self.model.read().await.is_some()
    }

    /// Reads the artifact from disk, replacing whatever was cached.
    pub async fn load(&self) -> Result<Arc<ModelArtifact>> {
        let mut slot = self.model.write().await;
        let model = Arc::new(self.read_artifact().await?);
        *slot = Some(model.clone());
        Ok(model)
    }

    pub async fn get(&self) -> Result<Arc<ModelArtifact>> {
        if let Some(model) = self.model.read().await.as_ref() {
            return Ok(model.clone());
        }

        let mut slot = self.model.write().await;
        // Another request may have loaded it while we waited for the lock.
        if let Some(model) = slot.as_ref() {
            return Ok(model.clone());
        }
        let model = Arc::new(self.read_artifact().await?);
        *slot = Some(model.clone());
        Ok(model)
    }

    async fn read_artifact(&self) -> Result<ModelArtifact> {
        debug!("Reading model from {}", self.path.display());
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ModelNotFound {
                    path: self.path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let model = ModelArtifact::from_json(&json)?;
        info!(model_id = %model.id, "Model loaded successfully from {}", self.path.display());
        Ok(model)
    }
}
