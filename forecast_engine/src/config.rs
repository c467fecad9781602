//! Engine and application configuration
//!
//! Everything that used to be a module-level constant in the dashboards
//! (ticker list, dataset locations, model hyper-parameters) is carried here
//! and injected into the engine or the CLI.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// What to do when every historical close is identical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Abort the run with `ForecastError::DegenerateScale`
    #[default]
    Fail,
    /// Skip training and forecast the constant price for every model
    ConstantForecast,
}

/// Random forest hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
        }
    }
}

/// Support vector regression hyper-parameters (RBF kernel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvrConfig {
    pub c: f64,
    pub epsilon: f64,
}

impl Default for SvrConfig {
    fn default() -> Self {
        Self { c: 1.0, epsilon: 0.1 }
    }
}

/// Recurrent model hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LstmConfig {
    pub hidden_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub seed: u64,
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self {
            hidden_size: 50,
            epochs: 100,
            learning_rate: 0.01,
            seed: 42,
        }
    }
}

/// Settings for one forecasting run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window length and forecast horizon, in trading days
    pub forecast_days: usize,
    pub random_forest: ForestConfig,
    pub svr: SvrConfig,
    pub lstm: LstmConfig,
    pub degenerate_policy: DegeneratePolicy,
    /// Percent change between first and last forecast day that raises an alert
    pub alert_threshold_pct: f64,
    /// Price band around the last close inside which the outlook is "stable"
    pub outlook_band: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            forecast_days: 5,
            random_forest: ForestConfig::default(),
            svr: SvrConfig::default(),
            lstm: LstmConfig::default(),
            degenerate_policy: DegeneratePolicy::default(),
            alert_threshold_pct: 2.0,
            outlook_band: 1.0,
        }
    }
}

impl EngineConfig {
    /// Default settings with a different horizon
    pub fn with_forecast_days(forecast_days: usize) -> Self {
        Self {
            forecast_days,
            ..Self::default()
        }
    }

    /// Check every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if self.forecast_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "forecast_days must be at least 1".to_string(),
            ));
        }
        if self.random_forest.n_trees == 0 {
            return Err(ForecastError::InvalidParameter(
                "random_forest.n_trees must be at least 1".to_string(),
            ));
        }
        if !(self.svr.c > 0.0) || !(self.svr.epsilon >= 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "svr requires c > 0 and epsilon >= 0 (got c={}, epsilon={})",
                self.svr.c, self.svr.epsilon
            )));
        }
        if self.lstm.hidden_size == 0 || self.lstm.epochs == 0 {
            return Err(ForecastError::InvalidParameter(
                "lstm.hidden_size and lstm.epochs must be at least 1".to_string(),
            ));
        }
        if !(self.lstm.learning_rate > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "lstm.learning_rate must be positive (got {})",
                self.lstm.learning_rate
            )));
        }
        if !(self.alert_threshold_pct >= 0.0) || !(self.outlook_band >= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "alert_threshold_pct and outlook_band must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where a ticker's data lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSource {
    pub company: String,
    pub dataset: PathBuf,
    #[serde(default)]
    pub model: Option<PathBuf>,
}

/// Companies tracked by the dashboards, as (company, ticker)
pub const DEFAULT_TICKERS: [(&str, &str); 8] = [
    ("Apple", "AAPL"),
    ("Amazon", "AMZN"),
    ("Meta Platforms", "META"),
    ("Google", "GOOG"),
    ("Microsoft", "MSFT"),
    ("Netflix", "NFLX"),
    ("Nvidia", "NVDA"),
    ("Tata Consultancy Services (TCS)", "TCS"),
];

/// Top-level settings for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    /// Calendar days of history fed to the engine
    pub lookback_days: i64,
    pub dataset_dir: PathBuf,
    pub tickers: BTreeMap<String, TickerSource>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_dataset_dir("Preprocessed_Dataset")
    }
}

impl AppConfig {
    /// Default ticker registry rooted at `dataset_dir`
    pub fn for_dataset_dir<P: AsRef<Path>>(dataset_dir: P) -> Self {
        let dataset_dir = dataset_dir.as_ref().to_path_buf();
        let tickers = DEFAULT_TICKERS
            .iter()
            .map(|(company, ticker)| {
                let source = TickerSource {
                    company: company.to_string(),
                    dataset: dataset_dir.join(format!("Preprocessed_{}_Dataset.csv", ticker)),
                    model: Some(
                        dataset_dir
                            .join("Models")
                            .join(format!("{}_Ensemble_Model.pkl", ticker)),
                    ),
                };
                (ticker.to_string(), source)
            })
            .collect();

        Self {
            engine: EngineConfig::default(),
            lookback_days: 60,
            dataset_dir,
            tickers,
        }
    }

    /// Load from a JSON file; omitted fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ForecastError::ConfigError(format!("Cannot open {}: {}", path.display(), e))
        })?;
        let config: AppConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ForecastError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)
            .map_err(|e| ForecastError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookback_days <= 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "lookback_days must be positive (got {})",
                self.lookback_days
            )));
        }
        self.engine.validate()
    }

    /// Look up a ticker, case-insensitively
    pub fn ticker(&self, symbol: &str) -> Result<&TickerSource> {
        let key = symbol.trim().to_uppercase();
        self.tickers.get(&key).ok_or_else(|| {
            ForecastError::ConfigError(format!("No dataset configured for ticker {}", key))
        })
    }
}
