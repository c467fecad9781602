//! Sliding training windows over a scaled series

use crate::{MathError, Result};

/// Input windows paired with the value that follows each of them.
///
/// Window `i` covers `series[i..i + window]` and its target is
/// `series[i + window]`, so a series of length `L` yields `L - window`
/// samples (none when `L <= window`).
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSet {
    window: usize,
    inputs: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl WindowSet {
    /// Slide a window of length `window` across `series`.
    pub fn from_series(series: &[f64], window: usize) -> Result<Self> {
        if window == 0 {
            return Err(MathError::InvalidInput(
                "Window length must be greater than zero".to_string(),
            ));
        }

        let count = series.len().saturating_sub(window);
        let mut inputs = Vec::with_capacity(count);
        let mut targets = Vec::with_capacity(count);

        for i in 0..count {
            inputs.push(series[i..i + window].to_vec());
            targets.push(series[i + window]);
        }

        Ok(Self {
            window,
            inputs,
            targets,
        })
    }

    /// Build a window set from already prepared samples.
    pub fn from_samples(window: usize, inputs: Vec<Vec<f64>>, targets: Vec<f64>) -> Result<Self> {
        if window == 0 {
            return Err(MathError::InvalidInput(
                "Window length must be greater than zero".to_string(),
            ));
        }
        if inputs.len() != targets.len() {
            return Err(MathError::InvalidInput(format!(
                "Got {} input windows but {} targets",
                inputs.len(),
                targets.len()
            )));
        }
        if let Some(bad) = inputs.iter().find(|w| w.len() != window) {
            return Err(MathError::InvalidInput(format!(
                "Input window of length {} does not match window length {}",
                bad.len(),
                window
            )));
        }

        Ok(Self {
            window,
            inputs,
            targets,
        })
    }

    /// Window length
    pub fn window(&self) -> usize {
        self.window
    }

    /// Input windows, one row per sample
    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    /// Target following each window
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// True when no sample could be built
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Inputs flattened row-major into a single buffer of `len * window` values
    pub fn flat_inputs(&self) -> Vec<f64> {
        self.inputs.iter().flatten().copied().collect()
    }
}
