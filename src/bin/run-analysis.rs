//! Analysis entry point.
//!
//! Loads the price table, computes monthly returns, the realized-price
//! family, and the chart payloads, and writes each payload as JSON for the
//! renderer. When FORECAST_URL is set, also fits the external seasonal model
//! and writes the forecast band. Run with:
//! `cargo run --bin run-analysis`
//!
//! Configuration via environment variables:
//!   DATABASE_PATH  SQLite file (default: prices.db)
//!   ASSET_ID       asset to analyze (default: 1)
//!   ASSET_LABEL    label used in chart titles (default: BTC)
//!   START_DATE     analysis window start, YYYY-MM-DD (default: 2015-01-01)
//!   SHORT_WINDOW   trailing window rows for the short leg (default: 155)
//!   OUTPUT_DIR     where chart JSON files land (default: charts)
//!   FORECAST_URL   base URL of the forecast service (optional)

use chrono::NaiveDate;
use price_analytics::{
    forecast_chart, load_price_rows, long_realized_price_chart, monthly_average,
    monthly_average_bars, monthly_return_heatmap, monthly_returns, realized_price,
    realized_price_chart, short_realized_price_chart, sort_chronological, AnalysisConfig,
    AssetId, CalendarEvent, ForecastServiceClient, ForecastServiceConfig, SqlitePriceStore,
};
use serde::Serialize;
use std::fs;
use std::path::Path;

fn write_json<T: Serialize>(dir: &Path, name: &str, payload: &T) -> std::io::Result<()> {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(payload)?;
    fs::write(&path, json)?;
    println!("  • {}", path.display());
    Ok(())
}

/// Supply-halving dates handed to the forecaster as anomalous windows.
fn halving_events() -> Vec<CalendarEvent> {
    ["2016-07-09", "2020-05-11", "2024-04-20"]
        .iter()
        .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|date| CalendarEvent::symmetric("halving", date, 60))
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "prices.db".to_string());
    let asset_id = AssetId::new(
        std::env::var("ASSET_ID")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<i64>()?,
    );
    let asset_label = std::env::var("ASSET_LABEL").unwrap_or_else(|_| "BTC".to_string());
    let output_dir = std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "charts".to_string());

    let mut config = AnalysisConfig::with_events(halving_events());
    if let Ok(start) = std::env::var("START_DATE") {
        config.start_date = NaiveDate::parse_from_str(&start, "%Y-%m-%d")?;
    }
    if let Ok(window) = std::env::var("SHORT_WINDOW") {
        config.short_window = window.parse::<usize>()?;
    }

    println!("📊 Running price analysis...");
    println!("   Database: {}", database_path);
    println!("   Asset: {} ({})", asset_label, asset_id);
    println!("   Start date: {}", config.start_date);
    println!("   Short window: {} rows", config.short_window);
    println!();

    let store = SqlitePriceStore::new(&database_path)?;
    let mut rows = load_price_rows(&store, "prices", Some(asset_id), config.start_date)?;
    sort_chronological(&mut rows);
    println!("Loaded {} rows", rows.len());

    let returns = monthly_returns(&rows, asset_id);
    let averages = monthly_average(&returns);
    let realized = realized_price(&rows, config.short_window);

    let dir = Path::new(&output_dir);
    fs::create_dir_all(dir)?;
    println!();
    println!("Writing chart payloads:");
    write_json(dir, "realized_price.json", &realized_price_chart(&realized, &asset_label))?;
    write_json(
        dir,
        "short_realized_price.json",
        &short_realized_price_chart(&realized, &asset_label),
    )?;
    write_json(
        dir,
        "long_realized_price.json",
        &long_realized_price_chart(&realized, &asset_label),
    )?;
    write_json(
        dir,
        "monthly_average.json",
        &monthly_average_bars(&averages, &asset_label),
    )?;
    write_json(
        dir,
        "monthly_heatmap.json",
        &monthly_return_heatmap(&returns, &asset_label),
    )?;

    if let Ok(forecast_url) = std::env::var("FORECAST_URL") {
        println!();
        println!("Fitting seasonal model at {}...", forecast_url);
        let client = ForecastServiceClient::new(ForecastServiceConfig::new(forecast_url))?;
        let observations = price_analytics::close_observations(&rows, asset_id);
        let points = client
            .fit_predict(&observations, &config.events, config.forecast_horizon_days)
            .await?;
        write_json(
            dir,
            "forecast.json",
            &forecast_chart(&observations, &points, &asset_label),
        )?;
    }

    println!();
    println!("✨ Analysis complete! Payloads are in '{}'", output_dir);

    Ok(())
}
