//! Ordinary least squares on the input window

use crate::error::{ForecastError, Result};
use crate::models::{check_prediction_count, FittedRegressor, Regressor};
use linfa::prelude::*;
use linfa_linear::FittedLinearRegression;
use ndarray::{Array1, Array2, Ix1};
use price_math::WindowSet;

const NAME: &str = "Linear Regression";

/// Linear regression with intercept
#[derive(Debug, Clone, Default)]
pub struct LinearRegression;

/// Fitted linear regression
pub struct TrainedLinearRegression {
    model: FittedLinearRegression<f64>,
    window: usize,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self
    }
}

impl Regressor for LinearRegression {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&self, windows: &WindowSet) -> Result<Box<dyn FittedRegressor>> {
        let dataset = to_dataset(windows)?;
        let model = linfa_linear::LinearRegression::default()
            .fit(&dataset)
            .map_err(|e| ForecastError::model(NAME, e))?;

        Ok(Box::new(TrainedLinearRegression {
            model,
            window: windows.window(),
        }))
    }
}

impl TrainedLinearRegression {
    /// Fitted coefficients, one per window position
    pub fn coefficients(&self) -> Vec<f64> {
        self.model.params().to_vec()
    }

    pub fn intercept(&self) -> f64 {
        self.model.intercept()
    }
}

impl std::fmt::Debug for TrainedLinearRegression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedLinearRegression")
            .field("coefficients", &self.coefficients())
            .field("intercept", &self.intercept())
            .finish()
    }
}

impl FittedRegressor for TrainedLinearRegression {
    fn predict(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        let x = to_matrix(windows, self.window)?;
        let predictions: Array1<f64> = self.model.predict(&x);
        let predictions = predictions.to_vec();
        check_prediction_count(NAME, windows.len(), predictions.len())?;
        Ok(predictions)
    }
}

/// Window rows as an `n_samples x window` matrix
pub(crate) fn to_matrix(windows: &[Vec<f64>], window: usize) -> Result<Array2<f64>> {
    if let Some(bad) = windows.iter().find(|w| w.len() != window) {
        return Err(ForecastError::ValidationError(format!(
            "Input window of length {} does not match window length {}",
            bad.len(),
            window
        )));
    }
    let flat: Vec<f64> = windows.iter().flatten().copied().collect();
    Array2::from_shape_vec((windows.len(), window), flat)
        .map_err(|e| ForecastError::ValidationError(e.to_string()))
}

/// Window set as a linfa dataset
pub(crate) fn to_dataset(windows: &WindowSet) -> Result<Dataset<f64, f64, Ix1>> {
    let x = to_matrix(windows.inputs(), windows.window())?;
    let y = Array1::from_vec(windows.targets().to_vec());
    Ok(Dataset::new(x, y))
}
