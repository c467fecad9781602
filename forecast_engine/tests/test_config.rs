use forecast_engine::config::{AppConfig, DegeneratePolicy, EngineConfig};
use forecast_engine::error::ForecastError;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.forecast_days, 5);
    assert_eq!(config.random_forest.n_trees, 100);
    assert_eq!(config.svr.c, 1.0);
    assert_eq!(config.svr.epsilon, 0.1);
    assert_eq!(config.lstm.hidden_size, 50);
    assert_eq!(config.lstm.epochs, 100);
    assert_eq!(config.lstm.learning_rate, 0.01);
    assert_eq!(config.degenerate_policy, DegeneratePolicy::Fail);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_json_keeps_defaults() {
    let json = r#"{
        "engine": { "forecast_days": 10, "degenerate_policy": "constant_forecast" },
        "lookback_days": 90
    }"#;
    let config = AppConfig::from_json_str(json).unwrap();

    assert_eq!(config.engine.forecast_days, 10);
    assert_eq!(config.engine.degenerate_policy, DegeneratePolicy::ConstantForecast);
    assert_eq!(config.engine.lstm.hidden_size, 50);
    assert_eq!(config.lookback_days, 90);
    assert_eq!(config.tickers.len(), 8);
}

#[test]
fn test_custom_ticker_registry() {
    let json = r#"{
        "tickers": {
            "IBM": { "company": "IBM", "dataset": "/data/ibm.csv" }
        }
    }"#;
    let config = AppConfig::from_json_str(json).unwrap();

    let ibm = config.ticker("ibm").unwrap();
    assert_eq!(ibm.dataset, PathBuf::from("/data/ibm.csv"));
    assert_eq!(ibm.model, None);
    assert!(matches!(config.ticker("AAPL"), Err(ForecastError::ConfigError(_))));
}

#[test]
fn test_invalid_values_rejected() {
    let json = r#"{ "engine": { "lstm": { "learning_rate": 0.0 } } }"#;
    assert!(matches!(
        AppConfig::from_json_str(json),
        Err(ForecastError::InvalidParameter(_))
    ));

    let json = r#"{ "lookback_days": -1 }"#;
    assert!(AppConfig::from_json_str(json).is_err());

    assert!(matches!(
        AppConfig::from_json_str("not json"),
        Err(ForecastError::ConfigError(_))
    ));
}

#[test]
fn test_from_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{ "dataset_dir": "/srv/prices" }}"#).unwrap();

    let config = AppConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.dataset_dir, PathBuf::from("/srv/prices"));
    assert_eq!(config.lookback_days, 60);
}
