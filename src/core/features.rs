use serde_json::Value;
use crate::error::PredictError;
use crate::models::{FeatureVector, PredictRequest};

/// Validate a predict request into a typed feature vector
///
/// Accepts only a non-empty array of JSON numbers. Length is not checked
/// here since it depends on the loaded model.
pub fn extract_features(request: &PredictRequest) -> Result<FeatureVector, PredictError> {
    let raw = request
        .features
        .as_ref()
        .ok_or_else(|| PredictError::Validation("missing required field 'features'".to_string()))?;

    parse_feature_array(raw)
}

/// Convert a JSON value holding the feature list into a feature vector
pub fn parse_feature_array(raw: &Value) -> Result<FeatureVector, PredictError> {
    let items = match raw {
        Value::Array(items) => items,
        other => {
            return Err(PredictError::Validation(format!(
                "'features' must be an array of numbers, got {}",
                json_type_name(other)
            )))
        }
    };

    if items.is_empty() {
        return Err(PredictError::Validation(
            "'features' must contain at least one value".to_string(),
        ));
    }

    let values = items
        .iter()
        .enumerate()
        .map(|(idx, item)| match item.as_f64() {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(PredictError::Validation(format!(
                "features[{}] must be a number, got {}",
                idx,
                json_type_name(item)
            ))),
        })
        .collect::<Result<Vec<f64>, _>>()?;

    Ok(FeatureVector::new_unchecked(values))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
