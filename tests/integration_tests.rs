// Integration tests for HCV Predict

use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{test, web, App};
use hcv_predict::routes::{self, AppState, HOME_MESSAGE};
use hcv_predict::services::ArtifactLoader;
use hcv_predict::{Classifier, ErrorStatusPolicy, FeatureVector, ModelInfo, PredictError};
use serde_json::{json, Value};
use std::sync::Arc;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/hcv_forest.json");

/// Routine blood panel, well inside the fixture forest's healthy leaves
const HEALTHY: [f64; 12] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];

/// Elevated AST, bilirubin and GGT with low cholinesterase
const ELEVATED: [f64; 12] = [45.0, 1.0, 30.0, 100.0, 90.0, 120.0, 45.0, 3.0, 4.0, 100.0, 200.0, 70.0];

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(routes::json_config())
                .configure(routes::configure_routes),
        )
        .await
    };
}

async fn fixture_state(policy: ErrorStatusPolicy) -> AppState {
    let forest = ArtifactLoader::new(FIXTURE)
        .load()
        .await
        .expect("fixture artifact should load");
    AppState::new(Arc::new(forest), policy)
}

fn predict_request(body: Value) -> actix_web::test::TestRequest {
    test::TestRequest::post().uri("/predict").set_json(body)
}

/// Classifier whose inference always fails
struct Broken;

impl Classifier for Broken {
    fn n_features(&self) -> usize {
        12
    }

    fn predict(&self, _features: &FeatureVector) -> Result<i64, PredictError> {
        Err(PredictError::Inference("tree walk failed".to_string()))
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            estimator: "Broken".to_string(),
            n_features: 12,
            n_classes: 2,
            n_trees: 0,
            feature_names: None,
        }
    }
}

#[actix_web::test]
async fn test_home_returns_static_message() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::Typed).await);

    for _ in 0..2 {
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        assert_eq!(body, HOME_MESSAGE.as_bytes());
    }
}

#[actix_web::test]
async fn test_predict_returns_integer_label() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::Typed).await);

    let req = predict_request(json!({ "features": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12] })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let prediction = body["prediction"].as_i64().expect("prediction should be an integer");
    assert!(prediction == 0 || prediction == 1);
    assert!(body.get("error").is_none());
}

#[actix_web::test]
async fn test_predict_distinguishes_classes() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::Typed).await);

    let req = predict_request(json!({ "features": HEALTHY })).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "prediction": 0 }));

    let req = predict_request(json!({ "features": ELEVATED })).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "prediction": 1 }));
}

#[actix_web::test]
async fn test_identical_requests_yield_identical_responses() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::Typed).await);

    let first: Value = test::call_and_read_body_json(&app, predict_request(json!({ "features": ELEVATED })).to_request()).await;
    let second: Value = test::call_and_read_body_json(&app, predict_request(json!({ "features": ELEVATED })).to_request()).await;
    assert_eq!(first, second);
}

#[actix_web::test]
async fn test_missing_features_is_validation_error() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::Typed).await);

    let req = predict_request(json!({ "values": HEALTHY })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
    assert_eq!(body["kind"], "validation_error");
    assert!(body.get("prediction").is_none());
}

#[actix_web::test]
async fn test_non_object_body_is_validation_error() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::Typed).await);

    for body in [json!([HEALTHY]), json!(HEALTHY), json!(42), json!("features")] {
        let req = predict_request(body.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {}", body);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "validation_error");
        assert!(body.get("prediction").is_none());
    }
}

#[actix_web::test]
async fn test_non_numeric_features_are_rejected() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::Typed).await);

    let req = predict_request(json!({ "features": [1, 2, "three", 4, 5, 6, 7, 8, 9, 10, 11, 12] })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "features[2] must be a number, got string");
}

#[actix_web::test]
async fn test_wrong_length_is_shape_mismatch() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::Typed).await);

    let req = predict_request(json!({ "features": [1, 2, 3] })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "X has 3 features, but RandomForestClassifier is expecting 12 features as input."
    );
    assert_eq!(body["kind"], "shape_mismatch");
    assert!(body.get("prediction").is_none());
}

#[actix_web::test]
async fn test_malformed_json_is_validation_error() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::Typed).await);

    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(ContentType::json())
        .set_payload("{\"features\": [1, 2,")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
    assert_eq!(body["kind"], "validation_error");
}

#[actix_web::test]
async fn test_wrong_content_type_is_validation_error() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::Typed).await);

    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(ContentType::plaintext())
        .set_payload("{\"features\": [1]}")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_always_ok_policy_keeps_error_body() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::AlwaysOk).await);

    let req = predict_request(json!({ "features": [1, 2, 3] })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
    assert!(body.get("prediction").is_none());

    let req = test::TestRequest::post()
        .uri("/predict")
        .insert_header(ContentType::json())
        .set_payload("not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_inference_failure_is_server_error() {
    let app = test_app!(AppState::new(Arc::new(Broken), ErrorStatusPolicy::Typed));

    let req = predict_request(json!({ "features": HEALTHY })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "tree walk failed", "kind": "inference_error" }));
}

#[actix_web::test]
async fn test_health_reports_model() {
    let app = test_app!(fixture_state(ErrorStatusPolicy::Typed).await);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"]["n_features"], 12);
    assert_eq!(body["model"]["n_trees"], 3);
    assert_eq!(body["model"]["feature_names"][5], "AST");
}
