use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for the predict endpoint
///
/// `features` is kept as raw JSON so the validation step can report exactly
/// what is wrong with it instead of a generic deserializer message. Only JSON
/// objects are accepted; arrays and scalars fail to deserialize.
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    pub features: Option<serde_json::Value>,
}

impl<'de> Deserialize<'de> for PredictRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RequestVisitor;

        impl<'de> Visitor<'de> for RequestVisitor {
            type Value = PredictRequest;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<PredictRequest, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut features = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == "features" {
                        if features.is_some() {
                            return Err(de::Error::duplicate_field("features"));
                        }
                        features = Some(map.next_value::<serde_json::Value>()?);
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(PredictRequest { features })
            }
        }

        deserializer.deserialize_map(RequestVisitor)
    }
}
