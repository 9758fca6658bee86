use std::path::{Path, PathBuf};
use crate::core::{ForestArtifact, RandomForest};
use crate::error::ArtifactError;

/// Loads the serialized forest from local disk
///
/// Relative paths resolve against the process working directory. Loading
/// happens once at startup; any error here should stop the process.
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    path: PathBuf,
}

impl ArtifactLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute location of the artifact, for diagnostics
    pub fn resolved_path(&self) -> PathBuf {
        if self.path.is_absolute() {
            return self.path.clone();
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(&self.path),
            Err(_) => self.path.clone(),
        }
    }

    /// Read, parse and validate the artifact
    pub async fn load(&self) -> Result<RandomForest, ArtifactError> {
        if let Ok(cwd) = std::env::current_dir() {
            tracing::info!("Working directory: {}", cwd.display());
        }
        tracing::info!("Loading model from: {}", self.resolved_path().display());

        let bytes = tokio::fs::read(&self.path).await.map_err(|source| ArtifactError::Io {
            path: self.path.clone(),
            source,
        })?;

        let forest = parse_artifact(&bytes)?;

        tracing::info!(
            "Model loaded ({} bytes, {} features)",
            bytes.len(),
            crate::core::Classifier::n_features(&forest)
        );

        Ok(forest)
    }
}

/// Parse and validate an artifact held in memory
pub fn parse_artifact(bytes: &[u8]) -> Result<RandomForest, ArtifactError> {
    let artifact: ForestArtifact = serde_json::from_slice(bytes)?;
    RandomForest::from_artifact(artifact)
}
