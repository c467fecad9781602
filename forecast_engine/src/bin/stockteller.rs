//! StockTeller CLI - forecast closing prices with several models and export the results.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use forecast_engine::alerts::{movement_alerts, outlook};
use forecast_engine::config::AppConfig;
use forecast_engine::data::DataLoader;
use forecast_engine::engine::ForecastEngine;
use forecast_engine::export::{export_run, write_indicators};
use std::fs::File;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "stockteller")]
#[command(about = "Multi-model stock price forecasting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast the next trading days for a ticker or CSV file
    Predict {
        /// Ticker symbol resolved through the configured datasets
        #[arg(short, long, conflicts_with = "input")]
        ticker: Option<String>,

        /// CSV file with a date and a close column
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of trading days to forecast (also the window length)
        #[arg(short, long)]
        days: Option<usize>,

        /// Calendar days of history to analyse
        #[arg(short, long)]
        lookback: Option<i64>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory for the predictions and metrics CSVs
        #[arg(short, long)]
        export_dir: Option<PathBuf>,
    },

    /// Compute RSI and moving average columns for a price CSV
    Indicators {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// RSI window
        #[arg(long, default_value = "14")]
        rsi_window: usize,

        /// Moving average window
        #[arg(long, default_value = "20")]
        ma_window: usize,
    },

    /// List configured tickers
    Tickers {
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

fn predict(
    ticker: Option<String>,
    input: Option<PathBuf>,
    days: Option<usize>,
    lookback: Option<i64>,
    config: Option<PathBuf>,
    export_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config.as_ref())?;
    if let Some(days) = days {
        config.engine.forecast_days = days;
    }
    if let Some(lookback) = lookback {
        config.lookback_days = lookback;
    }
    config.validate()?;

    let (label, path) = match (ticker, input) {
        (Some(ticker), _) => {
            let source = config.ticker(&ticker)?;
            info!(ticker = %ticker, company = %source.company, "resolved ticker");
            (ticker.to_uppercase(), source.dataset.clone())
        }
        (None, Some(input)) => {
            let label = input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "SERIES".to_string());
            (label, input)
        }
        (None, None) => bail!("either --ticker or --input is required"),
    };

    let series = DataLoader::from_csv(&path)
        .with_context(|| format!("loading prices from {}", path.display()))?
        .trailing_days(config.lookback_days)?;

    let engine = ForecastEngine::new(config.engine.clone())?;
    let run = engine.run(&series)?;

    println!(
        "{}: {} closes from {} to {}, last close {:.2}",
        label,
        run.summary.series_len,
        run.summary.first_date,
        run.summary.last_date,
        run.summary.last_close
    );

    println!("\nForecast ({} days):", run.forecast.forecast_days);
    for forecast in run.forecast.forecasts() {
        let prices: Vec<String> = forecast.prices.iter().map(|p| format!("{:.2}", p)).collect();
        println!("  {:<20} {}", forecast.model, prices.join(", "));
    }
    for failure in run.training_failures.iter().chain(run.forecast.failures()) {
        println!("  {:<20} skipped: {}", failure.model, failure.error);
    }

    if !run.evaluation.is_empty() {
        println!("\nMetrics (training windows):\n{}", run.evaluation);
    }

    let alerts = movement_alerts(&run.forecast, config.engine.alert_threshold_pct);
    if !alerts.is_empty() {
        println!("Alerts:");
        for alert in &alerts {
            println!("  {}", alert);
        }
    }

    println!("\nOutlook vs last close:");
    for o in outlook(&run.forecast, run.summary.last_close, config.engine.outlook_band) {
        println!("  {:<20} {} ({:+.2})", o.model, o.direction, o.change);
    }

    if let Some(dir) = export_dir {
        let (predictions, metrics) = export_run(
            &dir,
            &label,
            run.summary.first_date,
            run.summary.last_date,
            &run.forecast,
            &run.evaluation,
        )?;
        println!("\nWrote {}", predictions.display());
        println!("Wrote {}", metrics.display());
    }

    Ok(())
}

fn indicators(input: PathBuf, output: PathBuf, rsi_window: usize, ma_window: usize) -> Result<()> {
    let series = DataLoader::from_csv(&input)
        .with_context(|| format!("loading prices from {}", input.display()))?;
    let file = File::create(&output).with_context(|| format!("creating {}", output.display()))?;
    write_indicators(file, &series, rsi_window, ma_window)?;
    println!("Wrote {} rows to {}", series.len(), output.display());
    Ok(())
}

fn tickers(config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_ref())?;
    for (ticker, source) in &config.tickers {
        let model = source
            .model
            .as_ref()
            .map(|m| m.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<32} {} {}",
            ticker,
            source.company,
            source.dataset.display(),
            model
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stockteller=info,forecast_engine=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            ticker,
            input,
            days,
            lookback,
            config,
            export_dir,
        } => predict(ticker, input, days, lookback, config, export_dir)?,
        Commands::Indicators {
            input,
            output,
            rsi_window,
            ma_window,
        } => indicators(input, output, rsi_window, ma_window)?,
        Commands::Tickers { config } => tickers(config)?,
    }

    Ok(())
}
