//! Moving average calculations
//!
//! Contains a streaming Simple Moving Average and a rolling helper that
//! mirrors a trailing-window mean over a whole series.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push a new value, evicting the oldest once the window is full
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Current average, or `None` until `period` values have been seen
    pub fn value(&self) -> Option<f64> {
        if self.values.len() < self.period {
            return None;
        }
        Some(self.sum / self.period as f64)
    }

}

/// Trailing mean over `window` points for every position of `values`.
///
/// The first `window - 1` positions have no value.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(window)?;
    Ok(values
        .iter()
        .map(|&v| {
            sma.update(v);
            sma.value()
        })
        .collect())
}
