//! HCV Predict - prediction service for the Hepatitis C random forest
//!
//! This library loads a fitted random forest exported to JSON and serves
//! single-row predictions over HTTP.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Classifier, RandomForest, ForestArtifact, extract_features};
pub use error::{PredictError, ArtifactError, ErrorStatusPolicy};
pub use models::{FeatureVector, ClassLabel, ModelInfo, PredictRequest, PredictResponse, ErrorResponse};
pub use routes::AppState;
pub use services::ArtifactLoader;
