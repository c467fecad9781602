//! # Price Math
//!
//! Numeric building blocks for closing-price forecasting.
//! This crate provides min-max scaling, sliding training windows and the
//! rolling indicators (moving average, RSI) used when summarising a series.

use thiserror::Error;

pub mod moving_averages;
pub mod oscillators;
pub mod scaling;
pub mod windows;

pub use scaling::MinMaxScaler;
pub use windows::WindowSet;

/// Errors that can occur in price calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Degenerate range: every value equals {value}")]
    DegenerateRange { value: f64 },

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for price math operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_range_message_names_value() {
        let err = MathError::DegenerateRange { value: 100.0 };
        assert_eq!(err.to_string(), "Degenerate range: every value equals 100");
    }
}
