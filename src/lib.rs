//! # StockTeller
//!
//! Closing-price forecasting with several regressors over a sliding window.
//!
//! - [`price_math`]: min-max scaling, training windows, moving average and RSI
//! - [`forecast_engine`]: the forecasting engine, models, metrics, exports and CLI
//!
//! ## Example
//!
//! ```
//! use stockteller_workspace::price_math::{MinMaxScaler, WindowSet};
//!
//! let closes = [10.0, 12.0, 11.0, 14.0];
//! let scaler = MinMaxScaler::fit(&closes).unwrap();
//! let windows = WindowSet::from_series(&scaler.transform(&closes), 2).unwrap();
//! assert_eq!(windows.len(), 2);
//! assert_eq!(windows.targets(), &[0.25, 1.0]);
//! ```

pub use forecast_engine;
pub use price_math;
