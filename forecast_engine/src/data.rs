//! Closing-price history handling

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One observed close
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Ordered closing-price history, ascending by date with no duplicates
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting by date.
    ///
    /// Rejects an empty input, non-finite closes and repeated dates.
    pub fn new(mut points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::DataError(
                "Empty price series".to_string(),
            ));
        }

        if let Some(bad) = points.iter().find(|p| !p.close.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Non-finite close {} on {}",
                bad.close, bad.date
            )));
        }

        points.sort_by_key(|p| p.date);

        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(ForecastError::DataError(format!(
                "Duplicate date {} in price series",
                pair[0].date
            )));
        }

        Ok(Self { points })
    }

    /// Build a series of consecutive calendar days starting at `start`
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(start + Duration::days(i as i64), close))
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed series; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Keep only the points within `days` calendar days of the last date
    pub fn trailing_days(&self, days: i64) -> Result<Self> {
        if days <= 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Look-back must be positive (got {} days)",
                days
            )));
        }

        let cutoff = self.last().date - Duration::days(days);
        let points: Vec<PricePoint> = self
            .points
            .iter()
            .filter(|p| p.date >= cutoff)
            .copied()
            .collect();

        Self::new(points)
    }
}

/// Loader for closing-price CSV files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a price series from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<PriceSeries> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a price series from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<PriceSeries> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let names: Vec<&str> = headers.iter().collect();
        let date_idx = Self::detect_time_column(&names)?;
        let close_idx = Self::detect_close_column(&names)?;

        let mut points = Vec::new();
        let mut skipped = 0usize;
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let line = i + 2;

            let raw_date = record.get(date_idx).unwrap_or_default();
            let raw_close = record.get(close_idx).unwrap_or_default();

            // Rows with a missing close are dropped, as the dashboards do
            if raw_close.is_empty() || raw_close.eq_ignore_ascii_case("nan") {
                skipped += 1;
                continue;
            }

            let date = parse_date(raw_date).ok_or_else(|| {
                ForecastError::DataError(format!("Invalid date '{}' at line {}", raw_date, line))
            })?;
            let close = raw_close.parse::<f64>().map_err(|e| {
                ForecastError::DataError(format!(
                    "Invalid close '{}' at line {}: {}",
                    raw_close, line, e
                ))
            })?;

            points.push(PricePoint::new(date, close));
        }

        debug!(rows = points.len(), skipped, "loaded price rows");
        PriceSeries::new(points)
    }

    /// Detect the time column among the CSV headers
    fn detect_time_column(names: &[&str]) -> Result<usize> {
        names
            .iter()
            .position(|name| {
                let lower = name.to_lowercase();
                lower.contains("date") || lower.contains("time")
            })
            .ok_or_else(|| ForecastError::DataError("No time column found in data".to_string()))
    }

    /// Detect the closing-price column, falling back to a generic price column
    fn detect_close_column(names: &[&str]) -> Result<usize> {
        let find = |needle: &str| {
            names
                .iter()
                .position(|name| name.to_lowercase().contains(needle))
        };

        find("close").or_else(|| find("price")).ok_or_else(|| {
            ForecastError::DataError("No close price column found in data".to_string())
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
        .or_else(|| {
            DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z")
                .ok()
                .map(|dt| dt.date_naive())
        })
}
