#[cfg(feature = "python")]
use pyo3::exceptions::PyRuntimeError;
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown {kind} category: '{label}'")]
    UnknownCategory { kind: &'static str, label: String },

    #[error("Invalid {kind} level: {value} (expected 1-5)")]
    InvalidLevel { kind: &'static str, value: i64 },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Model artifact '{path}' could not be loaded: {reason}")]
    ModelUnavailable { path: String, reason: String },

    #[error("Unrecognized model artifact: {0}")]
    UnrecognizedArtifact(String),

    #[error("Unknown or missing feature: {0}")]
    MissingFeature(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[cfg(feature = "python")]
    #[error("Python error: {0}")]
    Python(String),
}

#[cfg(feature = "python")]
impl From<PulseError> for PyErr {
    fn from(err: PulseError) -> PyErr {
        PyRuntimeError::new_err(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<PyErr> for PulseError {
    fn from(err: PyErr) -> Self {
        PulseError::Python(err.to_string())
    }
}
