//! Random forest regression on the input window

use crate::config::ForestConfig;
use crate::error::{ForecastError, Result};
use crate::models::{check_prediction_count, FittedRegressor, Regressor};
use price_math::WindowSet;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

const NAME: &str = "Random Forest";

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Bagged regression trees, every feature considered at each split
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
}

/// Fitted random forest
pub struct TrainedRandomForest {
    model: Forest,
    window: usize,
    n_trees: usize,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }
}

impl Regressor for RandomForest {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&self, windows: &WindowSet) -> Result<Box<dyn FittedRegressor>> {
        let x = to_dense(windows.inputs())?;
        let y = windows.targets().to_vec();

        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.config.n_trees.try_into().unwrap_or(100))
            .with_m(windows.window())
            .with_seed(self.config.seed);

        let model = Forest::fit(&x, &y, params).map_err(|e| ForecastError::model(NAME, e))?;

        Ok(Box::new(TrainedRandomForest {
            model,
            window: windows.window(),
            n_trees: self.config.n_trees,
        }))
    }
}

impl std::fmt::Debug for TrainedRandomForest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedRandomForest")
            .field("window", &self.window)
            .field("n_trees", &self.n_trees)
            .finish()
    }
}

impl FittedRegressor for TrainedRandomForest {
    fn predict(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
        if let Some(bad) = windows.iter().find(|w| w.len() != self.window) {
            return Err(ForecastError::ValidationError(format!(
                "Input window of length {} does not match window length {}",
                bad.len(),
                self.window
            )));
        }
        let x = to_dense(windows)?;
        let predictions = self
            .model
            .predict(&x)
            .map_err(|e| ForecastError::model(NAME, e))?;
        check_prediction_count(NAME, windows.len(), predictions.len())?;
        Ok(predictions)
    }
}

fn to_dense(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>> {
    let rows: Vec<&[f64]> = rows.iter().map(|row| row.as_slice()).collect();
    DenseMatrix::from_2d_array(&rows).map_err(|e| ForecastError::model(NAME, e))
}
