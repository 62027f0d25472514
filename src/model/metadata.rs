use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::error::DetectionError;

pub const DEFAULT_OUTPUT: &str = "probabilities";

/// Sidecar written next to the `.onnx` export (`<stem>.meta.json`).
///
/// Every field is optional; a bare ONNX file loads with the defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelMetadata {
    pub name: Option<String>,
    /// Input columns in the order the model was trained on.
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    pub output: Option<String>,
}

fn default_threshold() -> f32 {
    0.5
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            name: None,
            features: Vec::new(),
            threshold: default_threshold(),
            output: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file {0} does not exist")]
    Missing(PathBuf),
    #[error("failed to read model metadata {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode model metadata: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("onnx runtime error: {0}")]
    Runtime(String),
    #[error(transparent)]
    Schema(#[from] DetectionError),
    #[error("feature {position} is {found:?} in the model but {expected:?} in the extractor")]
    FeatureOrder {
        position: usize,
        expected: String,
        found: String,
    },
    #[error("invalid model: {0}")]
    Invalid(String),
}

impl ModelError {
    pub fn runtime(err: impl std::fmt::Display) -> Self {
        ModelError::Runtime(err.to_string())
    }
}

impl ModelMetadata {
    pub fn sidecar_path(model_path: &Path) -> PathBuf {
        model_path.with_extension("meta.json")
    }

    /// Reads the sidecar if present; a missing sidecar is not an error.
    pub fn load_for(model_path: &Path) -> Result<Self, ModelError> {
        let path = Self::sidecar_path(model_path);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ModelError::Io { path, source }),
        };
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let metadata: ModelMetadata = serde_json::from_str(text)?;
        if !(0.0..=1.0).contains(&metadata.threshold) {
            return Err(ModelError::Invalid(format!(
                "threshold {} is outside [0, 1]",
                metadata.threshold
            )));
        }
        Ok(metadata)
    }

    /// Declared columns, when present, must match the extractor layout exactly.
    pub fn check_layout(&self, layout: &[&str]) -> Result<(), ModelError> {
        if self.features.is_empty() {
            return Ok(());
        }
        if self.features.len() != layout.len() {
            return Err(DetectionError::SchemaMismatch {
                expected: layout.len(),
                actual: self.features.len(),
            }
            .into());
        }
        for (position, (found, expected)) in self.features.iter().zip(layout).enumerate() {
            if found != expected {
                return Err(ModelError::FeatureOrder {
                    position,
                    expected: expected.to_string(),
                    found: found.clone(),
                });
            }
        }
        Ok(())
    }
}
