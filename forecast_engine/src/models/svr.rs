//! Epsilon support vector regression with an RBF kernel

use crate::config::SvrConfig;
use crate::error::{ForecastError, Result};
use crate::models::linear::{to_dataset, to_matrix};
use crate::models::{check_prediction_count, FittedRegressor, Regressor};
use linfa::prelude::*;
use linfa_svm::Svm;
use ndarray::Array1;
use price_math::WindowSet;
use statrs::statistics::Statistics;

const NAME: &str = "SVM";

/// RBF support vector regression
#[derive(Debug, Clone)]
pub struct SupportVectorRegression {
    config: SvrConfig,
}

/// Fitted support vector regression
pub struct TrainedSupportVectorRegression {
    model: Svm<f64, f64>,
    window: usize,
    gamma: f64,
}

impl SupportVectorRegression {
    pub fn new(config: SvrConfig) -> Self {
        Self { config }
    }
}

/// Kernel coefficient `1 / (n_features * Var(X))`, or 1.0 when the inputs
/// have no spread.
pub fn scale_gamma(windows: &WindowSet) -> f64 {
    let variance = windows.flat_inputs().population_variance();
    if variance.is_finite() && variance > 0.0 {
        1.0 / (windows.window() as f64 * variance)
    } else {
        1.0
    }
}

impl Regressor for SupportVectorRegression {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&self, windows: &WindowSet) -> Result<Box<dyn FittedRegressor>> {
        let dataset = to_dataset(windows)?;
        let gamma = scale_gamma(windows);

        // The gaussian kernel is exp(-|x - y|^2 / eps), so eps is 1 / gamma
        let model = Svm::<f64, f64>::params()
            .c_svr(self.config.c, Some(self.config.epsilon))
            .gaussian_kernel(1.0 / gamma)
            .fit(&dataset)
            .map_err(|e| ForecastError::model(NAME, e))?;

        Ok(Box::new(TrainedSupportVectorRegression {
            model,
            window: windows.window(),
            gamma,
        }))
    }
}

impl std::fmt::Debug for TrainedSupportVectorRegression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedSupportVectorRegression")
            .field("window", &self.window)
            .field("gamma", &self.gamma)
            .finish()
    }
}

impl FittedRegressor for TrainedSupportVectorRegression {
    fn predict(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        let x = to_matrix(windows, self.window)?;
        let predictions: Array1<f64> = self.model.predict(&x);
        let predictions = predictions.to_vec();
        check_prediction_count(NAME, windows.len(), predictions.len())?;
        Ok(predictions)
    }
}
