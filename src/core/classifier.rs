use crate::error::PredictError;
use crate::models::{FeatureVector, ModelInfo};

/// A fitted model that maps one feature row to one integer class label
///
/// Implementations are immutable once constructed so they can be shared
/// across workers behind an `Arc` without locking.
pub trait Classifier: Send + Sync {
    /// Number of features each input row must carry
    fn n_features(&self) -> usize;

    /// Predict the label for a single row
    ///
    /// Implementations must reject rows whose length differs from
    /// [`Classifier::n_features`] with [`PredictError::ShapeMismatch`].
    fn predict(&self, features: &FeatureVector) -> Result<i64, PredictError>;

    fn info(&self) -> ModelInfo;
}
