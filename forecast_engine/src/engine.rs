//! Iterative multi-model forecasting
//!
//! A run goes through four phases in order:
//!
//! 1. **preprocess** - min-max scale the closes and cut sliding windows of
//!    `forecast_days` values, each labelled with the value that follows it;
//! 2. **train** - fit every configured regressor on the same windows;
//! 3. **forecast** - roll each fitted model forward `forecast_days` steps from
//!    the last window, feeding predictions back in, and unscale the result;
//! 4. **evaluate** - score each model on its own training windows.
//!
//! A model that fails to fit, predict or return the right number of values is
//! reported and skipped; the other models carry on.

use crate::config::{DegeneratePolicy, EngineConfig};
use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use crate::metrics::{EvaluationMetrics, EvaluationReport};
use crate::models::{check_prediction_count, default_regressors, ModelFailure, ModelRegistry, Regressor};
use chrono::NaiveDate;
use price_math::{MinMaxScaler, WindowSet};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A scaled series and its training windows
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub scaler: MinMaxScaler,
    pub scaled: Vec<f64>,
    pub windows: WindowSet,
    pub forecast_days: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub last_close: f64,
}

impl Preprocessed {
    /// The last `forecast_days` scaled values, where every rollout starts
    pub fn initial_window(&self) -> &[f64] {
        let start = self.scaled.len().saturating_sub(self.forecast_days);
        &self.scaled[start..]
    }
}

/// One model's forecast in price units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelForecast {
    pub model: String,
    pub prices: Vec<f64>,
}

/// Forecasts of every model that completed its rollout
#[derive(Debug, Default, Serialize)]
pub struct ForecastResult {
    pub forecast_days: usize,
    forecasts: Vec<ModelForecast>,
    failures: Vec<ModelFailure>,
}

impl ForecastResult {
    pub fn new(forecast_days: usize) -> Self {
        Self {
            forecast_days,
            ..Self::default()
        }
    }

    pub fn push(&mut self, model: &str, prices: Vec<f64>) {
        self.forecasts.push(ModelForecast {
            model: model.to_string(),
            prices,
        });
    }

    pub fn record_failure(&mut self, model: &str, error: ForecastError) {
        self.failures.push(ModelFailure::new(model, error));
    }

    pub fn forecasts(&self) -> &[ModelForecast] {
        &self.forecasts
    }

    pub fn get(&self, model: &str) -> Option<&[f64]> {
        self.forecasts
            .iter()
            .find(|f| f.model == model)
            .map(|f| f.prices.as_slice())
    }

    pub fn failures(&self) -> &[ModelFailure] {
        &self.failures
    }

    pub fn failure(&self, model: &str) -> Option<&ForecastError> {
        self.failures
            .iter()
            .find(|f| f.model == model)
            .map(|f| &f.error)
    }

    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Facts about the analysed series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub series_len: usize,
    pub window_count: usize,
    pub forecast_days: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub last_close: f64,
}

/// Output of a complete run
#[derive(Debug, Serialize)]
pub struct ForecastRun {
    pub summary: RunSummary,
    /// Models that could not be fitted
    pub training_failures: Vec<ModelFailure>,
    pub forecast: ForecastResult,
    pub evaluation: EvaluationReport,
}

impl ForecastRun {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the forecasting phases over a set of regressors.
///
/// The engine holds no fitted state; every call to [`ForecastEngine::run`]
/// builds its own scaler and model registry.
#[derive(Debug)]
pub struct ForecastEngine {
    config: EngineConfig,
    regressors: Vec<Box<dyn Regressor>>,
}

impl ForecastEngine {
    /// Engine with the four default model families
    pub fn new(config: EngineConfig) -> Result<Self> {
        let regressors = default_regressors(&config);
        Self::with_regressors(config, regressors)
    }

    /// Engine over a caller-supplied set of regressors
    pub fn with_regressors(config: EngineConfig, regressors: Vec<Box<dyn Regressor>>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, regressors })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.regressors.iter().map(|r| r.name()).collect()
    }

    /// Scale the series and build the training windows
    pub fn preprocess(&self, series: &PriceSeries) -> Result<Preprocessed> {
        let forecast_days = self.config.forecast_days;
        if series.len() <= forecast_days {
            return Err(ForecastError::InsufficientData {
                series_len: Some(series.len()),
                forecast_days,
            });
        }

        let closes = series.closes();
        let scaler = MinMaxScaler::fit(&closes)?;
        let scaled = scaler.transform(&closes);
        let windows = WindowSet::from_series(&scaled, forecast_days)?;

        info!(
            series_len = series.len(),
            windows = windows.len(),
            forecast_days,
            min = scaler.min(),
            max = scaler.max(),
            "preprocessed series"
        );

        Ok(Preprocessed {
            scaler,
            scaled,
            windows,
            forecast_days,
            first_date: series.first().date,
            last_date: series.last().date,
            last_close: series.last().close,
        })
    }

    /// Fit every regressor on the same windows
    pub fn train(&self, windows: &WindowSet) -> Result<ModelRegistry> {
        if windows.is_empty() {
            return Err(ForecastError::InsufficientData {
                series_len: None,
                forecast_days: windows.window(),
            });
        }

        let mut registry = ModelRegistry::new();
        for regressor in &self.regressors {
            let name = regressor.name();
            match regressor.fit(windows) {
                Ok(model) => {
                    debug!(model = name, "fitted");
                    registry.insert(name, model);
                }
                Err(e) => {
                    warn!(model = name, error = %e, "fit failed, skipping model");
                    registry.record_failure(name, e);
                }
            }
        }

        info!(
            fitted = registry.len(),
            failed = registry.failures().len(),
            samples = windows.len(),
            "trained models"
        );
        Ok(registry)
    }

    /// Roll every fitted model forward and unscale its predictions
    pub fn forecast(&self, preprocessed: &Preprocessed, registry: &ModelRegistry) -> ForecastResult {
        let steps = preprocessed.forecast_days;
        let initial = preprocessed.initial_window();
        let mut result = ForecastResult::new(steps);

        for (name, model) in registry.iter() {
            let rolled = model
                .rollout(initial, steps)
                .and_then(|scaled| check_prediction_count(name, steps, scaled.len()).map(|_| scaled));

            match rolled {
                Ok(scaled) => {
                    let prices = preprocessed.scaler.inverse_transform(&scaled);
                    debug!(model = name, ?prices, "forecast");
                    result.push(name, prices);
                }
                Err(e) => {
                    warn!(model = name, error = %e, "forecast failed, skipping model");
                    result.record_failure(name, e);
                }
            }
        }

        info!(models = result.len(), steps, "forecast complete");
        result
    }

    /// Score every fitted model on its training windows.
    ///
    /// Truth and predictions stay in scaled units for every model; nothing is
    /// inverse-transformed before scoring.
    pub fn evaluate(&self, preprocessed: &Preprocessed, registry: &ModelRegistry) -> EvaluationReport {
        let windows = &preprocessed.windows;
        let mut report = EvaluationReport::new();

        for (name, model) in registry.iter() {
            let scored = model.predict(windows.inputs()).and_then(|predicted| {
                check_prediction_count(name, windows.len(), predicted.len())?;
                EvaluationMetrics::compute(windows.targets(), &predicted)
            });

            match scored {
                Ok(metrics) => {
                    debug!(model = name, mse = metrics.mse, r2 = metrics.r2, "evaluated");
                    report.push(name, metrics);
                }
                Err(e) => {
                    warn!(model = name, error = %e, "evaluation failed, skipping model");
                    report.record_failure(name, e);
                }
            }
        }

        info!(models = report.len(), "evaluation complete");
        report
    }

    /// Preprocess, train, forecast and evaluate in order
    pub fn run(&self, series: &PriceSeries) -> Result<ForecastRun> {
        let preprocessed = match self.preprocess(series) {
            Ok(p) => p,
            Err(ForecastError::DegenerateScale { value })
                if self.config.degenerate_policy == DegeneratePolicy::ConstantForecast =>
            {
                warn!(value, "every close is identical, forecasting a constant price");
                return Ok(self.constant_run(series, value));
            }
            Err(e) => return Err(e),
        };

        let mut registry = self.train(&preprocessed.windows)?;
        let forecast = self.forecast(&preprocessed, &registry);
        let evaluation = self.evaluate(&preprocessed, &registry);

        Ok(ForecastRun {
            summary: RunSummary {
                series_len: series.len(),
                window_count: preprocessed.windows.len(),
                forecast_days: preprocessed.forecast_days,
                first_date: preprocessed.first_date,
                last_date: preprocessed.last_date,
                last_close: preprocessed.last_close,
            },
            training_failures: registry.take_failures(),
            forecast,
            evaluation,
        })
    }

    fn constant_run(&self, series: &PriceSeries, value: f64) -> ForecastRun {
        let forecast_days = self.config.forecast_days;
        let mut forecast = ForecastResult::new(forecast_days);
        for name in self.model_names() {
            forecast.push(name, vec![value; forecast_days]);
        }

        ForecastRun {
            summary: RunSummary {
                series_len: series.len(),
                window_count: series.len().saturating_sub(forecast_days),
                forecast_days,
                first_date: series.first().date,
                last_date: series.last().date,
                last_close: series.last().close,
            },
            training_failures: Vec::new(),
            forecast,
            evaluation: EvaluationReport::new(),
        }
    }
}
