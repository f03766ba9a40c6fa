use crate::asset::AssetId;
use crate::ingest::{read_ohlcv_csv, IngestError};
use crate::price_row::OhlcvBar;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use std::time::Duration;

/// Configuration for the daily price downloader.
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Maximum number of attempts per request (default: 3)
    pub max_retries: u32,
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        DownloaderConfig {
            max_retries: 3,
            timeout_seconds: 30,
        }
    }
}

/// Downloads daily OHLCV history as CSV from the Yahoo Finance export
/// endpoint.
///
/// This is the producer side of the ingestion pipeline: fetched text feeds
/// the CSV adapter and the resulting bars replace the price table wholesale.
#[derive(Debug)]
pub struct PriceDownloader {
    client: Client,
    config: DownloaderConfig,
}

impl PriceDownloader {
    /// Creates a downloader with default configuration.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_config(DownloaderConfig::default())
    }

    /// Creates a downloader with custom configuration.
    pub fn with_config(config: DownloaderConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DownloadError::ClientCreation(e.to_string()))?;
        Ok(PriceDownloader { client, config })
    }

    /// Fetches the raw daily CSV for `symbol` over the inclusive date range.
    ///
    /// Network failures are retried up to `max_retries` times with a short
    /// linear backoff; API-level errors (non-2xx) are not retried.
    pub async fn fetch_daily_csv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<String, DownloadError> {
        let start_ts = start_date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DownloadError::InvalidDate("invalid start date".to_string()))?
            .and_utc()
            .timestamp();
        let end_ts = end_date
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| DownloadError::InvalidDate("invalid end date".to_string()))?
            .and_utc()
            .timestamp();

        let url = format!(
            "https://query1.finance.yahoo.com/v7/finance/download/{}?period1={}&period2={}&interval=1d&events=history",
            symbol, start_ts, end_ts
        );

        let mut last_error = String::new();
        for attempt in 1..=self.config.max_retries.max(1) {
            match self.client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        return Err(DownloadError::Api(format!(
                            "HTTP {}: {}",
                            status.as_u16(),
                            status.canonical_reason().unwrap_or("Unknown error")
                        )));
                    }
                    return response
                        .text()
                        .await
                        .map_err(|e| DownloadError::Parse(e.to_string()));
                }
                Err(e) => {
                    last_error = e.to_string();
                    log::warn!(
                        "Download attempt {}/{} for {} failed: {}",
                        attempt,
                        self.config.max_retries.max(1),
                        symbol,
                        last_error
                    );
                    if attempt < self.config.max_retries.max(1) {
                        tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
                    }
                }
            }
        }

        Err(DownloadError::Network(last_error))
    }

    /// Downloads and parses daily bars, attaching `asset_id` post-parse.
    pub async fn download_bars(
        &self,
        symbol: &str,
        asset_id: AssetId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, DownloadError> {
        let csv_text = self.fetch_daily_csv(symbol, start_date, end_date).await?;
        read_ohlcv_csv(csv_text.as_bytes(), asset_id).map_err(DownloadError::from)
    }

    /// Fetches history up to today.
    pub async fn download_bars_to_now(
        &self,
        symbol: &str,
        asset_id: AssetId,
        start_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, DownloadError> {
        self.download_bars(symbol, asset_id, start_date, Utc::now().date_naive())
            .await
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }
}

/// Errors that can occur while downloading price history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    /// HTTP client creation failed
    ClientCreation(String),
    /// Network error after exhausting retries
    Network(String),
    /// API returned an error response
    Api(String),
    /// Response body could not be read or parsed
    Parse(String),
    /// Invalid date provided
    InvalidDate(String),
}

impl std::fmt::Display for DownloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadError::ClientCreation(msg) => write!(f, "Client creation error: {}", msg),
            DownloadError::Network(msg) => write!(f, "Network error: {}", msg),
            DownloadError::Api(msg) => write!(f, "API error: {}", msg),
            DownloadError::Parse(msg) => write!(f, "Parse error: {}", msg),
            DownloadError::InvalidDate(msg) => write!(f, "Invalid date: {}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

impl From<IngestError> for DownloadError {
    fn from(err: IngestError) -> Self {
        DownloadError::Parse(err.to_string())
    }
}
