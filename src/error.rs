use thiserror::Error;

/// Errors that cross the detection service boundary.
///
/// Registration lookup failures never show up here; they are absorbed by the
/// registration signal and turned into an indeterminate result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("feature schema mismatch: classifier expects {expected} features, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),
}

impl DetectionError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, DetectionError::InvalidInput(_))
    }
}
