// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{FeatureVector, ClassLabel, ModelInfo};
pub use requests::PredictRequest;
pub use responses::{PredictResponse, HealthResponse, ErrorResponse};
