//! CSV exports of forecasts, metrics and indicators

use crate::data::PriceSeries;
use crate::engine::ForecastResult;
use crate::error::Result;
use crate::metrics::EvaluationReport;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use price_math::moving_averages::rolling_mean;
use price_math::oscillators::rolling_rsi;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

const FILE_DATE_FORMAT: &str = "%d-%m-%y";

/// The next `count` weekdays after `date`
pub fn business_days_after(date: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut current = date;
    while days.len() < count {
        current += Duration::days(1);
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(current);
        }
    }
    days
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Write `Date,Ticker,<model...>` rows, one per forecast business day.
///
/// A model whose forecast length differs from the horizon is left out.
pub fn write_predictions<W: Write>(
    writer: W,
    ticker: &str,
    last_date: NaiveDate,
    result: &ForecastResult,
) -> Result<()> {
    let dates = business_days_after(last_date, result.forecast_days);
    let columns: Vec<_> = result
        .forecasts()
        .iter()
        .filter(|f| {
            let ok = f.prices.len() == dates.len();
            if !ok {
                warn!(
                    model = %f.model,
                    got = f.prices.len(),
                    expected = dates.len(),
                    "prediction length mismatch, column skipped"
                );
            }
            ok
        })
        .collect();

    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["Date".to_string(), "Ticker".to_string()];
    header.extend(columns.iter().map(|f| f.model.clone()));
    wtr.write_record(&header)?;

    let ticker = ticker.to_uppercase();
    for (i, date) in dates.iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string(), ticker.clone()];
        record.extend(columns.iter().map(|f| round4(f.prices[i]).to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `Model,MSE,R2,Precision,Recall,F1` rows
pub fn write_metrics<W: Write>(writer: W, report: &EvaluationReport) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Model", "MSE", "R2", "Precision", "Recall", "F1"])?;
    for row in report.rows() {
        let m = &row.metrics;
        wtr.write_record([
            row.model.clone(),
            m.mse.to_string(),
            m.r2.to_string(),
            m.precision.to_string(),
            m.recall.to_string(),
            m.f1.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `date,close,rsi,moving_average` rows; undefined indicator values are empty
pub fn write_indicators<W: Write>(
    writer: W,
    series: &PriceSeries,
    rsi_window: usize,
    ma_window: usize,
) -> Result<()> {
    let closes = series.closes();
    let rsi = rolling_rsi(&closes, rsi_window)?;
    let ma = rolling_mean(&closes, ma_window)?;
    let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "close", "rsi", "moving_average"])?;
    for (i, point) in series.points().iter().enumerate() {
        wtr.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            point.close.to_string(),
            cell(rsi[i]),
            cell(ma[i]),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Last date covered by an export: `last_date + forecast_days - 1`
fn range_end(last_date: NaiveDate, forecast_days: usize) -> NaiveDate {
    last_date + Duration::days(forecast_days as i64 - 1)
}

/// `<TICKER>_Predictions__<start>_to_<end>.csv`
pub fn prediction_file_name(ticker: &str, first_date: NaiveDate, last_date: NaiveDate, forecast_days: usize) -> String {
    format!(
        "{}_Predictions__{}_to_{}.csv",
        ticker.to_uppercase(),
        first_date.format(FILE_DATE_FORMAT),
        range_end(last_date, forecast_days).format(FILE_DATE_FORMAT)
    )
}

/// `<TICKER>_Metrics_<start>_to_<end>.csv`
pub fn metrics_file_name(ticker: &str, first_date: NaiveDate, last_date: NaiveDate, forecast_days: usize) -> String {
    format!(
        "{}_Metrics_{}_to_{}.csv",
        ticker.to_uppercase(),
        first_date.format(FILE_DATE_FORMAT),
        range_end(last_date, forecast_days).format(FILE_DATE_FORMAT)
    )
}

/// Write the predictions and metrics CSVs of a run into `dir`, returning
/// both paths
pub fn export_run<P: AsRef<Path>>(
    dir: P,
    ticker: &str,
    first_date: NaiveDate,
    last_date: NaiveDate,
    result: &ForecastResult,
    report: &EvaluationReport,
) -> Result<(std::path::PathBuf, std::path::PathBuf)> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let predictions = dir.join(prediction_file_name(ticker, first_date, last_date, result.forecast_days));
    write_predictions(File::create(&predictions)?, ticker, last_date, result)?;

    let metrics = dir.join(metrics_file_name(ticker, first_date, last_date, result.forecast_days));
    write_metrics(File::create(&metrics)?, report)?;

    info!(predictions = %predictions.display(), metrics = %metrics.display(), "exported run");
    Ok((predictions, metrics))
}
