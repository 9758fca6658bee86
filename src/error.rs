use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use crate::models::ErrorResponse;

/// Errors that can occur while serving a prediction request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// The request body does not describe a numeric feature list
    #[error("{0}")]
    Validation(String),

    /// The feature list does not have the length the model was fitted on
    #[error("X has {actual} features, but {estimator} is expecting {expected} features as input.")]
    ShapeMismatch {
        expected: usize,
        actual: usize,
        estimator: String,
    },

    /// The model itself failed to produce a label
    #[error("{0}")]
    Inference(String),
}

impl PredictError {
    /// Stable identifier reported as `kind` in error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::Validation(_) => "validation_error",
            PredictError::ShapeMismatch { .. } => "shape_mismatch",
            PredictError::Inference(_) => "inference_error",
        }
    }

    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            kind: self.kind().to_string(),
        }
    }
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictError::Validation(_) => StatusCode::BAD_REQUEST,
            PredictError::ShapeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PredictError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_body())
    }
}

/// How prediction errors are reflected in the HTTP status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStatusPolicy {
    /// 400 / 422 / 500 depending on the error variant
    #[default]
    Typed,
    /// Every error is answered with 200; the body still carries `error`
    AlwaysOk,
}

impl ErrorStatusPolicy {
    pub fn status_for(&self, err: &PredictError) -> StatusCode {
        match self {
            ErrorStatusPolicy::Typed => err.status_code(),
            ErrorStatusPolicy::AlwaysOk => StatusCode::OK,
        }
    }

    pub fn respond(&self, err: &PredictError) -> HttpResponse {
        HttpResponse::build(self.status_for(err)).json(err.to_body())
    }
}

/// Errors that can occur while loading the model artifact at startup
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Incompatible model artifact: {0}")]
    Incompatible(String),
}
