use crate::asset::AssetId;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar bucket combining year and month, used to aggregate daily rows
/// into monthly observations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct YearMonth {
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

impl YearMonth {
    /// Creates a year-month bucket directly.
    pub fn new(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }

    /// Derives the bucket a calendar date falls into.
    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A single canonical OHLCV row as held by the price store.
///
/// Exactly one row exists per (asset_id, date) in the canonical dataset;
/// volume is non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub asset_id: AssetId,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// Creates a new bar.
    pub fn new(
        asset_id: AssetId,
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        OhlcvBar {
            asset_id,
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true when every numeric field holds a finite value.
    ///
    /// Rows ingested from CSV represent missing fields as NaN; the loader
    /// drops incomplete rows rather than letting NaN leak into analytics.
    pub fn is_complete(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// A loaded price row with the calendar fields the analytics layer groups by.
///
/// Produced by the loader from an [`OhlcvBar`]; derived structures are
/// recomputed from these rows on demand and never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub asset_id: AssetId,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    pub year_month: YearMonth,
}

impl PriceRow {
    /// Builds a price row from a stored bar, attaching the calendar fields.
    pub fn from_bar(bar: OhlcvBar) -> Self {
        let year_month = YearMonth::from_date(bar.date);
        PriceRow {
            asset_id: bar.asset_id,
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            year: year_month.year,
            month: year_month.month,
            year_month,
        }
    }
}
