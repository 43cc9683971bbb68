use std::error::Error;
use std::fmt;

/// Failures raised by the diagnosis pipeline.
///
/// Every variant is fatal to the operation that produced it. Retrying with the
/// same input gives the same error, since loading, training and prediction are
/// all deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosisError {
    /// Dataset file missing, unreadable, or lacking required columns.
    DataUnavailable(String),
    /// Degenerate training set (fewer than two classes, mismatched rows, no rows).
    TrainingError(String),
    /// Feature vector with the wrong length or a non-finite value.
    InvalidFeatureVector(String),
    /// Uploaded parameter/value file that cannot be turned into a feature vector.
    InvalidUpload(String),
    /// Report could not be assembled.
    Report(String),
}

impl fmt::Display for DiagnosisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DiagnosisError::DataUnavailable(msg) => write!(f, "Dataset unavailable: {}", msg),
            DiagnosisError::TrainingError(msg) => write!(f, "Training failed: {}", msg),
            DiagnosisError::InvalidFeatureVector(msg) => {
                write!(f, "Invalid feature vector: {}", msg)
            }
            DiagnosisError::InvalidUpload(msg) => write!(f, "Invalid upload: {}", msg),
            DiagnosisError::Report(msg) => write!(f, "Report error: {}", msg),
        }
    }
}

impl Error for DiagnosisError {}

pub type Result<T> = std::result::Result<T, DiagnosisError>;
