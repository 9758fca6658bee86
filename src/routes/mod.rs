// Route exports
pub mod predict;

use actix_web::{error, web, HttpRequest};
use crate::error::{ErrorStatusPolicy, PredictError};

pub use predict::{AppState, HOME_MESSAGE};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(predict::configure);
}

/// JSON extractor configuration that reports payload errors like any other
/// validation failure
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}

/// Handle JSON payload errors (bad content type, malformed body, wrong shape)
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!("JSON payload error on {}: {}", req.path(), err);

    let policy: ErrorStatusPolicy = req
        .app_data::<web::Data<AppState>>()
        .map(|state| state.error_status)
        .unwrap_or_default();
    let response = policy.respond(&PredictError::Validation(format!("Invalid JSON: {}", err)));

    error::InternalError::from_response(err, response).into()
}
