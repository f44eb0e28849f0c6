use iris_api::Error;
use iris_api::smoke::{SAMPLE_FEATURES, SmokeClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::app_with_model;

fn client_for(server: &MockServer) -> SmokeClient {
    SmokeClient::new(server.uri(), Duration::from_secs(5)).unwrap()
}

fn healthy() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "healthy",
        "model_loaded": true,
        "model_id": "7b0f6c8e-3c5e-4a71-9a55-2c0b7e1c9f10"
    }))
}

fn setosa_prediction() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "prediction": 0,
        "prediction_proba": [0.98, 0.02, 0.0],
        "class_name": "setosa"
    }))
}

#[test_log::test(tokio::test)]
async fn test_smoke_run_passes_against_healthy_service() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(healthy())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_json(json!({ "features": SAMPLE_FEATURES })))
        .respond_with(setosa_prediction())
        .expect(1)
        .mount(&server)
        .await;

    let report = client_for(&server).run().await.unwrap();
    assert_eq!(report.health.status, "healthy");
    assert_eq!(report.prediction.class_name, "setosa");
}

#[tokio::test]
async fn test_smoke_stops_when_unhealthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "unhealthy",
            "model_loaded": false,
            "error": "Model file not found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(setosa_prediction())
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server).run().await.unwrap_err();
    assert!(matches!(err, Error::Smoke(_)));
    assert!(err.to_string().contains("Model file not found"));
}

#[tokio::test]
async fn test_smoke_fails_on_non_200_health() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client_for(&server).check_health().await.unwrap_err();
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn test_smoke_fails_on_service_unavailable_prediction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "error": "Model not found" })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .check_prediction(&SAMPLE_FEATURES)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_smoke_rejects_inconsistent_prediction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prediction": 1,
            "prediction_proba": [0.2, 0.3, 0.1],
            "class_name": "versicolor"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .check_prediction(&SAMPLE_FEATURES)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("sum"));
}

#[tokio::test]
async fn test_smoke_rejects_bad_base_url() {
    let err = SmokeClient::new("example.com", Duration::from_secs(1)).err().unwrap();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn test_smoke_trims_trailing_slash() {
    let client = SmokeClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");
}

#[tokio::test]
async fn test_smoke_against_running_service() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app_with_model()).await.unwrap();
    });

    let client = SmokeClient::new(format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let report = client.run().await.unwrap();
    assert_eq!(report.prediction.class_name, "setosa");
    assert!(report.health.model_loaded);

    server.abort();
}
