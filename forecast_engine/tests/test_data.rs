use chrono::NaiveDate;
use forecast_engine::data::{DataLoader, PricePoint, PriceSeries};
use forecast_engine::error::ForecastError;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_data_loader_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,open,high,low,close,volume").unwrap();
    writeln!(file, "2023-01-03,106.0,110.0,104.0,108.0,1500").unwrap();
    writeln!(file, "2023-01-01,100.0,105.0,98.0,103.0,1000").unwrap();
    writeln!(file, "2023-01-02,103.0,107.0,101.0,106.0,1200").unwrap();

    let series = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.closes(), vec![103.0, 106.0, 108.0]);
    assert_eq!(series.first().date, date(2023, 1, 1));
    assert_eq!(series.last().date, date(2023, 1, 3));
}

#[test]
fn test_preprocessed_dataset_layout() {
    let csv = "Date,Close,RSI,Moving_Average\n\
               2024-03-01 00:00:00,180.5,,\n\
               2024-03-04 00:00:00,nan,,\n\
               2024-03-05 00:00:00,182.25,55.1,181.0\n";
    let series = DataLoader::from_reader(csv.as_bytes()).unwrap();

    assert_eq!(series.len(), 2);
    let dates: Vec<NaiveDate> = series.points().iter().map(|p| p.date).collect();
    assert_eq!(dates, vec![date(2024, 3, 1), date(2024, 3, 5)]);
}

#[test]
fn test_price_column_fallback() {
    let csv = "timestamp,price\n2024-01-01T00:00:00+00:00,10.5\n";
    let series = DataLoader::from_reader(csv.as_bytes()).unwrap();
    assert_eq!(series.closes(), vec![10.5]);
}

#[test]
fn test_missing_close_column() {
    let csv = "date,volume\n2024-01-01,100\n";
    let err = DataLoader::from_reader(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, ForecastError::DataError(_)));
}

#[test]
fn test_invalid_close_reports_line() {
    let csv = "date,close\n2024-01-01,10.0\n2024-01-02,abc\n";
    let err = DataLoader::from_reader(csv.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn test_missing_file() {
    let err = DataLoader::from_csv("/nonexistent/prices.csv").unwrap_err();
    assert!(matches!(err, ForecastError::IoError(_)));
}

#[test]
fn test_duplicate_dates_rejected() {
    let points = vec![
        PricePoint::new(date(2024, 1, 1), 1.0),
        PricePoint::new(date(2024, 1, 1), 2.0),
    ];
    assert!(matches!(PriceSeries::new(points), Err(ForecastError::DataError(_))));
}

#[test]
fn test_non_finite_rejected() {
    let points = vec![PricePoint::new(date(2024, 1, 1), f64::NAN)];
    assert!(PriceSeries::new(points).is_err());
    assert!(PriceSeries::new(Vec::new()).is_err());
}

#[test]
fn test_trailing_days() {
    let closes: Vec<f64> = (0..90).map(|i| 100.0 + i as f64).collect();
    let series = PriceSeries::from_closes(date(2024, 1, 1), &closes).unwrap();

    let recent = series.trailing_days(60).unwrap();
    assert_eq!(recent.len(), 61);
    assert_eq!(recent.last(), series.last());
    assert_eq!(recent.first().close, 129.0);

    assert!(series.trailing_days(0).is_err());
}
