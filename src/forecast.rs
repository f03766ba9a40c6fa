//! Adapter around an external seasonal forecasting model.
//!
//! The model is a black box: it consumes a two-column (ds, y) series plus
//! optional named calendar events and returns point predictions with a
//! confidence interval. This module owns only the reshaping on both sides
//! of that boundary.

use crate::asset::AssetId;
use crate::chart::{ChartSeries, SeriesPoint};
use crate::price_row::PriceRow;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One observation in the model's input schema.
///
/// The wire names `ds`/`y` are the model's contract, not ours; the adapter
/// renames (date, close) into this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastObservation {
    pub ds: NaiveDate,
    pub y: f64,
}

/// A named one-off calendar event with a window of affected days around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub name: String,
    pub date: NaiveDate,
    /// Days before `date` treated as anomalous.
    pub days_before: i64,
    /// Days after `date` treated as anomalous.
    pub days_after: i64,
}

impl CalendarEvent {
    /// Creates an event with a symmetric window of `window_days` on each side.
    pub fn symmetric(name: impl Into<String>, date: NaiveDate, window_days: i64) -> Self {
        CalendarEvent {
            name: name.into(),
            date,
            days_before: window_days,
            days_after: window_days,
        }
    }

    /// The inclusive date span this event affects.
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        (
            self.date - Duration::days(self.days_before),
            self.date + Duration::days(self.days_after),
        )
    }
}

/// One predicted point with its confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ds: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Errors crossing the forecasting boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastError {
    /// No observations to fit on.
    EmptyInput,
    /// The model failed to fit or converge.
    ModelFailed(String),
    /// The model service could not be reached.
    ServiceUnavailable(String),
    /// The model's response did not match the expected schema.
    InvalidResponse(String),
}

impl std::fmt::Display for ForecastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastError::EmptyInput => write!(f, "No observations to forecast from"),
            ForecastError::ModelFailed(msg) => write!(f, "Model failed: {}", msg),
            ForecastError::ServiceUnavailable(msg) => {
                write!(f, "Forecast service unavailable: {}", msg)
            }
            ForecastError::InvalidResponse(msg) => {
                write!(f, "Invalid forecast response: {}", msg)
            }
        }
    }
}

impl std::error::Error for ForecastError {}

/// Trait for the external seasonal model.
///
/// `fit_predict` is a blocking call with no timeout or cancellation of its
/// own; callers wanting responsiveness impose their own. The returned points
/// cover the observed dates plus `horizon_days` beyond the last observation.
pub trait SeasonalModel {
    fn fit_predict(
        &self,
        observations: &[ForecastObservation],
        events: &[CalendarEvent],
        horizon_days: u32,
    ) -> Result<Vec<ForecastPoint>, ForecastError>;
}

/// Reshapes one asset's rows into the model's (ds, y) input.
pub fn close_observations(rows: &[PriceRow], asset_id: AssetId) -> Vec<ForecastObservation> {
    rows.iter()
        .filter(|row| row.asset_id == asset_id)
        .map(|row| ForecastObservation {
            ds: row.date,
            y: row.close,
        })
        .collect()
}

/// One point of the plotted confidence band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub date: NaiveDate,
    pub lower: f64,
    pub upper: f64,
}

/// Forecast payload for the chart renderer: observed series, point
/// predictions, and the confidence band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastChart {
    pub title: String,
    pub actual: ChartSeries,
    pub forecast: ChartSeries,
    pub band: Vec<BandPoint>,
}

/// Reshapes model output back into a chart payload.
pub fn forecast_chart(
    observations: &[ForecastObservation],
    forecast: &[ForecastPoint],
    asset_label: &str,
) -> ForecastChart {
    let actual = ChartSeries::new(
        "Real data",
        observations
            .iter()
            .map(|obs| SeriesPoint {
                date: obs.ds,
                value: Some(obs.y),
            })
            .collect(),
    );
    let predicted = ChartSeries::new(
        "Forecast",
        forecast
            .iter()
            .map(|point| SeriesPoint {
                date: point.ds,
                value: Some(point.predicted),
            })
            .collect(),
    );
    let band = forecast
        .iter()
        .map(|point| BandPoint {
            date: point.ds,
            lower: point.lower,
            upper: point.upper,
        })
        .collect();

    ForecastChart {
        title: format!("Price forecast for {}", asset_label),
        actual,
        forecast: predicted,
        band,
    }
}

/// Fits the model on one asset's close prices and packages the result.
pub fn forecast_close(
    rows: &[PriceRow],
    asset_id: AssetId,
    asset_label: &str,
    model: &dyn SeasonalModel,
    events: &[CalendarEvent],
    horizon_days: u32,
) -> Result<ForecastChart, ForecastError> {
    let observations = close_observations(rows, asset_id);
    if observations.is_empty() {
        return Err(ForecastError::EmptyInput);
    }
    let forecast = model.fit_predict(&observations, events, horizon_days)?;
    Ok(forecast_chart(&observations, &forecast, asset_label))
}

/// Configuration for the HTTP-hosted forecast service.
#[derive(Debug, Clone)]
pub struct ForecastServiceConfig {
    /// Base URL of the service, e.g. "http://localhost:8000".
    pub base_url: String,
    /// Request timeout in seconds (default: 120; model fits are slow).
    pub timeout_seconds: u64,
}

impl ForecastServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ForecastServiceConfig {
            base_url: base_url.into(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Serialize)]
struct ForecastRequest<'a> {
    observations: &'a [ForecastObservation],
    events: &'a [CalendarEvent],
    horizon_days: u32,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    points: Vec<ForecastPoint>,
}

/// JSON client for a forecast model hosted behind HTTP.
///
/// The request body carries the (ds, y) observations, the calendar events,
/// and the horizon; the response is the predicted points with bounds.
#[derive(Debug)]
pub struct ForecastServiceClient {
    client: reqwest::Client,
    config: ForecastServiceConfig,
}

impl ForecastServiceClient {
    /// Creates a client for the service at `config.base_url`.
    pub fn new(config: ForecastServiceConfig) -> Result<Self, ForecastError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ForecastError::ServiceUnavailable(e.to_string()))?;
        Ok(ForecastServiceClient { client, config })
    }

    /// Posts the series to the service and returns its predictions.
    pub async fn fit_predict(
        &self,
        observations: &[ForecastObservation],
        events: &[CalendarEvent],
        horizon_days: u32,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        if observations.is_empty() {
            return Err(ForecastError::EmptyInput);
        }

        let url = format!("{}/forecast", self.config.base_url.trim_end_matches('/'));
        let request = ForecastRequest {
            observations,
            events,
            horizon_days,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ForecastError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForecastError::ModelFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: ForecastResponse = response
            .json()
            .await
            .map_err(|e| ForecastError::InvalidResponse(e.to_string()))?;
        Ok(parsed.points)
    }
}
