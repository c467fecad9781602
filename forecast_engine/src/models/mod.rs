//! Sliding-window regressors
//!
//! Every model maps a window of `forecast_days` scaled closes to the next
//! scaled close. A [`Regressor`] is an unfitted specification; fitting it on a
//! [`WindowSet`] produces a [`FittedRegressor`] that the engine rolls forward.

use crate::config::EngineConfig;
use crate::error::{ForecastError, Result};
use price_math::WindowSet;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt::Debug;

pub mod forest;
pub mod linear;
pub mod lstm;
pub mod svr;

pub use forest::RandomForest;
pub use linear::LinearRegression;
pub use lstm::Lstm;
pub use svr::SupportVectorRegression;

/// A model that has been fitted on a window set
pub trait FittedRegressor: Debug {
    /// Predict the value following each input window
    fn predict(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Predict the value following a single window
    fn predict_next(&self, window: &[f64]) -> Result<f64> {
        self.predict(&[window.to_vec()])?
            .first()
            .copied()
            .ok_or_else(|| ForecastError::ValidationError("Model returned no prediction".to_string()))
    }

    /// Closed-loop rollout: each prediction is pushed onto the window and the
    /// oldest value dropped before predicting the next step.
    fn rollout(&self, initial_window: &[f64], steps: usize) -> Result<Vec<f64>> {
        let mut window = initial_window.to_vec();
        let mut predictions = Vec::with_capacity(steps);

        for _ in 0..steps {
            let next = self.predict_next(&window)?;
            predictions.push(next);
            if !window.is_empty() {
                window.remove(0);
                window.push(next);
            }
        }

        Ok(predictions)
    }
}

/// An unfitted model specification
pub trait Regressor: Debug {
    /// Display name used as the key in results
    fn name(&self) -> &str;

    /// Fit on the window set
    fn fit(&self, windows: &WindowSet) -> Result<Box<dyn FittedRegressor>>;
}

/// The four model families of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegressorKind {
    LinearRegression,
    RandomForest,
    Svm,
    Lstm,
}

impl RegressorKind {
    pub const ALL: [RegressorKind; 4] = [
        RegressorKind::LinearRegression,
        RegressorKind::RandomForest,
        RegressorKind::Svm,
        RegressorKind::Lstm,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RegressorKind::LinearRegression => "Linear Regression",
            RegressorKind::RandomForest => "Random Forest",
            RegressorKind::Svm => "SVM",
            RegressorKind::Lstm => "LSTM",
        }
    }

    /// Build the unfitted model with the configured hyper-parameters
    pub fn build(&self, config: &EngineConfig) -> Box<dyn Regressor> {
        match self {
            RegressorKind::LinearRegression => Box::new(LinearRegression::new()),
            RegressorKind::RandomForest => Box::new(RandomForest::new(config.random_forest.clone())),
            RegressorKind::Svm => Box::new(SupportVectorRegression::new(config.svr.clone())),
            RegressorKind::Lstm => Box::new(Lstm::new(config.lstm.clone())),
        }
    }
}

/// Build the default set of regressors
pub fn default_regressors(config: &EngineConfig) -> Vec<Box<dyn Regressor>> {
    RegressorKind::ALL.iter().map(|kind| kind.build(config)).collect()
}

/// A model whose fit or predict failed
#[derive(Debug)]
pub struct ModelFailure {
    pub model: String,
    pub error: ForecastError,
}

impl ModelFailure {
    pub fn new(model: &str, error: ForecastError) -> Self {
        Self {
            model: model.to_string(),
            error,
        }
    }
}

impl Serialize for ModelFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ModelFailure", 2)?;
        state.serialize_field("model", &self.model)?;
        state.serialize_field("error", &self.error.to_string())?;
        state.end()
    }
}

#[derive(Debug)]
struct RegistryEntry {
    name: String,
    model: Box<dyn FittedRegressor>,
}

/// Fitted models of one forecasting run, in training order
#[derive(Debug, Default)]
pub struct ModelRegistry {
    entries: Vec<RegistryEntry>,
    failures: Vec<ModelFailure>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fitted model, replacing any model with the same name
    pub fn insert(&mut self, name: &str, model: Box<dyn FittedRegressor>) {
        self.entries.retain(|e| e.name != name);
        self.entries.push(RegistryEntry {
            name: name.to_string(),
            model,
        });
    }

    /// Record a model that could not be fitted
    pub fn record_failure(&mut self, name: &str, error: ForecastError) {
        self.failures.push(ModelFailure::new(name, error));
    }

    pub fn get(&self, name: &str) -> Option<&dyn FittedRegressor> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.model.as_ref())
    }

    /// Fitted models as (name, model) pairs in training order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn FittedRegressor)> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.model.as_ref()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn failures(&self) -> &[ModelFailure] {
        &self.failures
    }

    /// Move the recorded fit failures out of the registry
    pub fn take_failures(&mut self) -> Vec<ModelFailure> {
        std::mem::take(&mut self.failures)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Check a fitted model returned one prediction per window
pub(crate) fn check_prediction_count(model: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ForecastError::ShapeMismatch {
            model: model.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct LastValue;

    impl FittedRegressor for LastValue {
        fn predict(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>> {
            Ok(windows.iter().map(|w| w[w.len() - 1] + 1.0).collect())
        }
    }

    #[test]
    fn test_rollout_feeds_predictions_back() {
        let preds = LastValue.rollout(&[0.0, 1.0, 2.0], 3).unwrap();
        assert_eq!(preds, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_registry_keeps_order_and_replaces() {
        let mut registry = ModelRegistry::new();
        registry.insert("a", Box::new(LastValue));
        registry.insert("b", Box::new(LastValue));
        registry.insert("a", Box::new(LastValue));

        assert_eq!(registry.names(), vec!["b", "a"]);
        assert!(registry.get("a").is_some());
        assert!(registry.get("c").is_none());
    }

    #[test]
    fn test_kind_names() {
        let names: Vec<&str> = RegressorKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["Linear Regression", "Random Forest", "SVM", "LSTM"]);
    }
}
