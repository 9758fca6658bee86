// Core inference exports
pub mod classifier;
pub mod features;
pub mod forest;

pub use classifier::Classifier;
pub use features::{extract_features, parse_feature_array};
pub use forest::{RandomForest, ForestArtifact, TreeArtifact, ARTIFACT_FORMAT_VERSION};
