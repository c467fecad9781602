//! # Forecast Engine
//!
//! Multi-model closing-price forecasting over a sliding window.
//!
//! ## Features
//!
//! - Price series loading from CSV (date and close columns detected from the header)
//! - Min-max scaling and sliding training windows
//! - Four regressors: Linear Regression, Random Forest, SVM (RBF SVR) and an LSTM
//! - Closed-loop multi-step forecasting
//! - Evaluation with MSE, R2, precision, recall and F1
//! - Movement alerts, outlook against the last close and CSV exports
//!
//! ## Quick Start
//!
//! ```no_run
//! use forecast_engine::config::EngineConfig;
//! use forecast_engine::data::DataLoader;
//! use forecast_engine::engine::ForecastEngine;
//!
//! # fn main() -> forecast_engine::error::Result<()> {
//! // Load data
//! let series = DataLoader::from_csv("Preprocessed_AAPL_Dataset.csv")?.trailing_days(60)?;
//!
//! // Forecast five trading days with every model
//! let engine = ForecastEngine::new(EngineConfig::with_forecast_days(5))?;
//! let run = engine.run(&series)?;
//!
//! for forecast in run.forecast.forecasts() {
//!     println!("{}: {:?}", forecast.model, forecast.prices);
//! }
//! println!("{}", run.evaluation);
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod export;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use crate::config::{AppConfig, DegeneratePolicy, EngineConfig};
pub use crate::data::{DataLoader, PricePoint, PriceSeries};
pub use crate::engine::{ForecastEngine, ForecastResult, ForecastRun, Preprocessed};
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::{EvaluationMetrics, EvaluationReport, MetricWarning};
pub use crate::models::{FittedRegressor, ModelRegistry, Regressor, RegressorKind};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
