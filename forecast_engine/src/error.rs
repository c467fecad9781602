//! Error types for the forecast_engine crate

use price_math::MathError;
use thiserror::Error;

/// Custom error types for the forecast_engine crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The series cannot produce a single training window.
    ///
    /// `series_len` is `None` when only an empty window set was seen and the
    /// length of the series behind it is unknown.
    #[error("Insufficient data: {} cannot build a window of {forecast_days} days", describe_len(.series_len))]
    InsufficientData {
        series_len: Option<usize>,
        forecast_days: usize,
    },

    /// Every historical close is identical, so min-max scaling is undefined
    #[error("Degenerate scale: every close equals {value}")]
    DegenerateScale { value: f64 },

    /// A model returned a forecast of the wrong length
    #[error("Shape mismatch for {model}: expected {expected} predictions, got {actual}")]
    ShapeMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    /// A single model failed to fit or predict
    #[error("Model error in {model}: {message}")]
    ModelError { model: String, message: String },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error while reading configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from numeric primitives
    #[error("Math error: {0}")]
    MathError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from JSON encoding or decoding
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl ForecastError {
    pub(crate) fn model(model: &str, message: impl std::fmt::Display) -> Self {
        ForecastError::ModelError {
            model: model.to_string(),
            message: message.to_string(),
        }
    }
}

fn describe_len(series_len: &Option<usize>) -> String {
    match series_len {
        Some(n) => format!("{} closes", n),
        None => "an empty window set".to_string(),
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::DegenerateRange { value } => ForecastError::DegenerateScale { value },
            MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
            other => ForecastError::MathError(other.to_string()),
        }
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::JsonError(err.to_string())
    }
}
