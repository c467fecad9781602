//! Movement alerts and outlook over a forecast

use crate::engine::ForecastResult;
use serde::Serialize;
use std::fmt;

/// A model predicting a large move across the forecast horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementAlert {
    pub model: String,
    pub first: f64,
    pub last: f64,
    /// Percent change from the first to the last forecast day
    pub change_pct: f64,
}

impl fmt::Display for MovementAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ALERT: {} predicts a change of {:.2}% over the forecast horizon",
            self.model, self.change_pct
        )
    }
}

/// Flag every model whose forecast moves more than `threshold_pct` percent
/// between its first and last day
pub fn movement_alerts(result: &ForecastResult, threshold_pct: f64) -> Vec<MovementAlert> {
    result
        .forecasts()
        .iter()
        .filter_map(|forecast| {
            let first = *forecast.prices.first()?;
            let last = *forecast.prices.last()?;
            if first == 0.0 {
                return None;
            }
            let change_pct = (last - first) / first * 100.0;
            (change_pct.abs() > threshold_pct).then(|| MovementAlert {
                model: forecast.model.clone(),
                first,
                last,
                change_pct,
            })
        })
        .collect()
}

/// Expected direction relative to the last actual close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Rise,
    Drop,
    Stable,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rise => f.write_str("Rise Expected"),
            Direction::Drop => f.write_str("Drop Expected"),
            Direction::Stable => f.write_str("Stable"),
        }
    }
}

/// One model's outlook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outlook {
    pub model: String,
    pub direction: Direction,
    /// Last predicted price minus the last actual close
    pub change: f64,
}

/// Compare each model's final predicted price with the last close.
///
/// A difference beyond `band` (in price units) either way is a rise or drop.
pub fn outlook(result: &ForecastResult, last_close: f64, band: f64) -> Vec<Outlook> {
    result
        .forecasts()
        .iter()
        .filter_map(|forecast| {
            let change = forecast.prices.last()? - last_close;
            let direction = if change > band {
                Direction::Rise
            } else if change < -band {
                Direction::Drop
            } else {
                Direction::Stable
            };
            Some(Outlook {
                model: forecast.model.clone(),
                direction,
                change,
            })
        })
        .collect()
}
