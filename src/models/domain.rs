use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::PredictError;

/// A single row of model input, validated to hold only finite numbers
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Values are expected to come from the validation step in
    /// `core::features`; use `TryFrom<Vec<f64>>` for anything else.
    pub(crate) fn new_unchecked(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = PredictError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        if values.is_empty() {
            return Err(PredictError::Validation(
                "features must contain at least one value".to_string(),
            ));
        }
        if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
            return Err(PredictError::Validation(format!(
                "features[{}] is not a finite number",
                idx
            )));
        }
        Ok(Self(values))
    }
}

/// 2^63; every float strictly below it in magnitude truncates into `i64`
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Class label as stored in the artifact's `classes` array
///
/// The fitted estimator may carry integer, float or string labels. Responses
/// always report an integer, see [`ClassLabel::to_integer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ClassLabel {
    /// Coerce the label to an integer the way `int(label)` would
    ///
    /// Floats outside the `i64` range are rejected rather than saturated.
    pub fn to_integer(&self) -> Result<i64, PredictError> {
        match self {
            ClassLabel::Int(v) => Ok(*v),
            ClassLabel::Float(v) if v.is_finite() && v.abs() < I64_BOUND => Ok(v.trunc() as i64),
            ClassLabel::Float(v) => Err(PredictError::Inference(format!(
                "cannot convert float {} to integer",
                v
            ))),
            ClassLabel::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                PredictError::Inference(format!("invalid literal for int() with base 10: '{}'", s))
            }),
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Int(v) => write!(f, "{}", v),
            ClassLabel::Float(v) => write!(f, "{}", v),
            ClassLabel::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Summary of the loaded model, reported by the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub estimator: String,
    pub n_features: usize,
    pub n_classes: usize,
    pub n_trees: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}
