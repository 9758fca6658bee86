use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use crate::core::{extract_features, Classifier};
use crate::error::{ErrorStatusPolicy, PredictError};
use crate::models::{HealthResponse, PredictRequest, PredictResponse};

/// Body returned by `GET /`
pub const HOME_MESSAGE: &str = "🚀 Hepatitis C Random Forest API is running!";

/// Application state shared across all handlers
///
/// Built once after the model has loaded; nothing in it changes afterwards.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn Classifier>,
    pub error_status: ErrorStatusPolicy,
}

impl AppState {
    pub fn new(model: Arc<dyn Classifier>, error_status: ErrorStatusPolicy) -> Self {
        Self { model, error_status }
    }
}

/// Configure prediction routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/", web::get().to(home))
        .route("/predict", web::post().to(predict))
        .route("/health", web::get().to(health_check));
}

/// Static liveness message
async fn home() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(HOME_MESSAGE)
}

/// Health check endpoint with a summary of the loaded model
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        model: state.model.info(),
    })
}

/// Predict endpoint
///
/// POST /predict
///
/// Request body:
/// ```json
/// {
///   "features": [45, 1, 38.5, 52.5, 7.7, 22.1, 7.5, 6.93, 3.23, 106, 12.1, 69]
/// }
/// ```
///
/// Responds with `{"prediction": <int>}` or `{"error": "...", "kind": "..."}`.
async fn predict(
    state: web::Data<AppState>,
    req: web::Json<PredictRequest>,
) -> impl Responder {
    let result = extract_features(&req).and_then(|features| state.model.predict(&features));

    match result {
        Ok(prediction) => HttpResponse::Ok().json(PredictResponse { prediction }),
        Err(e) => {
            // Feature values are not logged
            match &e {
                PredictError::Inference(_) => tracing::error!("Prediction failed: {}", e),
                _ => tracing::debug!("Rejected prediction request ({}): {}", e.kind(), e),
            }
            state.error_status.respond(&e)
        }
    }
}
