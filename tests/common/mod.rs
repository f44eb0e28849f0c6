#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use iris_api::{
    config::{ServerConfig, TrainingConfig},
    model::{ModelArtifact, ModelLoader},
    server::{self, AppState},
    training,
};
use serde_json::Value;
use std::sync::OnceLock;
use tempfile::TempDir;

pub const SETOSA: [f64; 4] = [5.1, 3.5, 1.4, 0.2];
pub const VERSICOLOR: [f64; 4] = [7.0, 3.2, 4.7, 1.4];
pub const VIRGINICA: [f64; 4] = [6.3, 3.3, 6.0, 2.5];

/// Training config small enough for tests but with the default split and seed.
pub fn test_training_config() -> TrainingConfig {
    TrainingConfig {
        n_estimators: 25,
        ..TrainingConfig::default()
    }
}

/// A model trained once per test binary.
pub fn trained_artifact() -> ModelArtifact {
    static ARTIFACT: OnceLock<ModelArtifact> = OnceLock::new();
    ARTIFACT
        .get_or_init(|| {
            training::train_iris(&test_training_config())
                .expect("training on the bundled dataset")
                .0
        })
        .clone()
}

pub fn app_with_loader(loader: ModelLoader) -> Router {
    server::router(AppState::new(loader), &ServerConfig::default()).unwrap()
}

/// Router whose model is already in memory.
pub fn app_with_model() -> Router {
    app_with_loader(ModelLoader::with_model("unused.json", trained_artifact()))
}

/// Router pointing at a model path that does not exist.
pub fn app_without_model() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let loader = ModelLoader::new(temp_dir.path().join("missing.json"));
    (app_with_loader(loader), temp_dir)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
