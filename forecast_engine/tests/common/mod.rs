#![allow(dead_code)]

use chrono::NaiveDate;
use forecast_engine::config::{EngineConfig, LstmConfig};
use forecast_engine::data::PriceSeries;

/// Thirty irregular closes with an upward drift
pub const CLOSES: [f64; 30] = [
    101.2, 102.8, 101.9, 103.5, 104.1, 103.0, 105.6, 106.2, 105.1, 107.4, 108.0, 106.7, 108.9,
    110.3, 109.2, 111.5, 110.8, 112.6, 113.9, 112.1, 114.4, 115.0, 113.7, 116.2, 117.5, 116.1,
    118.3, 119.6, 118.4, 120.9,
];

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

pub fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(start_date(), closes).unwrap()
}

pub fn fixture_series() -> PriceSeries {
    series(&CLOSES)
}

/// Default settings with a smaller LSTM to keep test runs short
pub fn quick_config(forecast_days: usize) -> EngineConfig {
    EngineConfig {
        lstm: LstmConfig {
            hidden_size: 8,
            epochs: 20,
            ..LstmConfig::default()
        },
        ..EngineConfig::with_forecast_days(forecast_days)
    }
}
