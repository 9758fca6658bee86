// Service exports
pub mod artifact;

pub use artifact::{ArtifactLoader, parse_artifact};
