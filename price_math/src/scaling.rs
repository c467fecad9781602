//! Min-max normalisation of price series
//!
//! A [`MinMaxScaler`] maps the observed range of a series onto `[0, 1]` and
//! back. It is fitted once on the full history and shared by every consumer
//! of that history.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Fitted min-max scaler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    /// Fit the scaler on the observed minimum and maximum of `values`.
    ///
    /// Fails on an empty slice, on non-finite values, and when every value is
    /// identical (the range would be zero).
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a scaler on an empty series".to_string(),
            ));
        }

        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "Series contains a non-finite value: {}",
                bad
            )));
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max == min {
            return Err(MathError::DegenerateRange { value: min });
        }

        Ok(Self { min, max })
    }

    /// Observed minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Observed maximum
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Width of the fitted range
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Scale a single value into the fitted range
    pub fn transform_value(&self, value: f64) -> f64 {
        (value - self.min) / self.range()
    }

    /// Map a scaled value back to price units
    pub fn inverse_value(&self, scaled: f64) -> f64 {
        scaled * self.range() + self.min
    }

    /// Scale every value of a series
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform_value(v)).collect()
    }

    /// Map every scaled value back to price units
    pub fn inverse_transform(&self, scaled: &[f64]) -> Vec<f64> {
        scaled.iter().map(|&s| self.inverse_value(s)).collect()
    }
}
