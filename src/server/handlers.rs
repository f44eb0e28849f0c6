use super::types::{
    Endpoints, ErrorResponse, HealthResponse, PredictionRequest, PredictionResponse, RootResponse,
};
use crate::{Error, dataset::N_FEATURES, model::ModelLoader};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::HOST},
    response::Json,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const FEATURE_COUNT_DETAIL: &str =
    "Exactly 4 features are required: [sepal_length, sepal_width, petal_length, petal_width]";

pub type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<ModelLoader>,
}

impl AppState {
    pub fn new(loader: ModelLoader) -> Self {
        Self {
            loader: Arc::new(loader),
        }
    }
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Iris classifier API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: Endpoints {
            predict: "/predict".to_string(),
            health: "/health".to_string(),
        },
    })
}

/// Always 200; the body says whether a model could be loaded.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    match state.loader.get().await {
        Ok(model) => Json(HealthResponse {
            status: "healthy".to_string(),
            model_loaded: true,
            model_id: Some(model.id),
            error: None,
        }),
        Err(e) => {
            warn!("Health check without a usable model: {}", e);
            Json(HealthResponse {
                status: "unhealthy".to_string(),
                model_loaded: false,
                model_id: None,
                error: Some(e.to_string()),
            })
        }
    }
}

/// The curl example points at the host the client reached us on.
pub async fn predict_usage(headers: HeaderMap) -> Json<Value> {
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost:8080");
    let example_curl = format!(
        "curl -X POST 'http://{}/predict' -H 'Content-Type: application/json' -d '{{\"features\": [5.1, 3.5, 1.4, 0.2]}}'",
        host
    );

    Json(json!({
        "message": "This endpoint requires POST method",
        "usage": {
            "method": "POST",
            "url": "/predict",
            "headers": {
                "Content-Type": "application/json"
            },
            "body": {
                "features": [5.1, 3.5, 1.4, 0.2]
            },
            "example_curl": example_curl
        }
    }))
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected prediction request body: {}", rejection.body_text());
        api_error(rejection.status(), rejection.body_text())
    })?;

    if request.features.len() != N_FEATURES {
        warn!(
            "Rejected prediction request with {} features",
            request.features.len()
        );
        return Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, FEATURE_COUNT_DETAIL));
    }

    let model = state.loader.get().await.map_err(|e| {
        if e.is_model_unavailable() {
            error!("Prediction requested but no model is available: {}", e);
            api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Model not found. Please ensure the model has been trained: {}", e),
            )
        } else {
            error!("Failed to load model: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Prediction error: {}", e),
            )
        }
    })?;

    match model.predict(&request.features) {
        Ok(prediction) => {
            info!(
                class = prediction.species.name(),
                "Prediction served for features {:?}", request.features
            );
            Ok(Json(PredictionResponse {
                prediction: prediction.species.index(),
                prediction_proba: prediction.probabilities,
                class_name: prediction.species.name().to_string(),
            }))
        }
        Err(e @ Error::InvalidInput(_)) => Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            e.to_string(),
        )),
        Err(e) => {
            error!("Prediction failed: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Prediction error: {}", e),
            ))
        }
    }
}
