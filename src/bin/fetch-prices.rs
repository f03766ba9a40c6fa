//! Price ingestion entry point.
//!
//! Downloads (or reads from a local CSV) one asset's daily OHLCV history and
//! replaces the price table wholesale. Run with:
//! `cargo run --bin fetch-prices`
//!
//! Configuration via environment variables:
//!   DATABASE_PATH  SQLite file (default: prices.db)
//!   SYMBOL         download symbol (default: BTC-USD)
//!   ASSET_ID       integer id attached to the rows (default: 1)
//!   START_DATE     first date to fetch, YYYY-MM-DD (default: 2015-01-01)
//!   CSV_PATH       when set, ingest this local file instead of downloading

use chrono::NaiveDate;
use price_analytics::{
    read_ohlcv_csv_path, AssetId, PriceDownloader, PriceStore, SqlitePriceStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "prices.db".to_string());
    let symbol = std::env::var("SYMBOL").unwrap_or_else(|_| "BTC-USD".to_string());
    let asset_id = AssetId::new(
        std::env::var("ASSET_ID")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<i64>()?,
    );
    let start_date = NaiveDate::parse_from_str(
        &std::env::var("START_DATE").unwrap_or_else(|_| "2015-01-01".to_string()),
        "%Y-%m-%d",
    )?;

    println!("📥 Fetching price history...");
    println!("   Symbol: {}", symbol);
    println!("   Asset id: {}", asset_id);
    println!("   Start date: {}", start_date);
    println!("   Database: {}", database_path);
    println!();

    let bars = match std::env::var("CSV_PATH") {
        Ok(csv_path) => {
            println!("Reading local CSV: {}", csv_path);
            read_ohlcv_csv_path(&csv_path, asset_id)?
        }
        Err(_) => {
            let downloader = PriceDownloader::new()?;
            downloader
                .download_bars_to_now(&symbol, asset_id, start_date)
                .await?
        }
    };

    let mut store = SqlitePriceStore::new(&database_path)?;
    store.replace_all("prices", &bars)?;

    println!("✅ Load complete!");
    println!("   {} rows written to '{}'", bars.len(), database_path);
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!("   Date span: {} .. {}", first.date, last.date);
    }
    println!();
    println!("Next: cargo run --bin run-analysis");

    Ok(())
}
