//! Realized-price computation.
//!
//! Volume-weighted average price over three spans of one asset's history:
//! the full history (cumulative), a trailing short window, and the long
//! complement of that window against the cumulative totals.

use crate::price_row::PriceRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Per-row realized-price metrics.
///
/// Undefined values (zero denominator, or a trailing window not yet holding
/// `window` observations) are `None`; a row with undefined metrics never
/// perturbs the cumulative sums of later rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedPricePoint {
    pub date: NaiveDate,
    pub close: f64,
    /// Running sum of volume from the first row through this one.
    pub cum_volume: f64,
    /// Running sum of close * volume from the first row through this one.
    pub cum_value: f64,
    /// cum_value / cum_volume.
    pub realized_price: Option<f64>,
    pub short_volume: Option<f64>,
    pub short_value: Option<f64>,
    /// Volume-weighted average price over the trailing window.
    pub short_realized_price: Option<f64>,
    pub long_volume: Option<f64>,
    pub long_value: Option<f64>,
    /// Volume-weighted average price of everything before the trailing window.
    pub long_realized_price: Option<f64>,
}

/// Fixed-capacity accumulator of trailing (volume, value) sums.
///
/// Keeps the last `capacity` observations and their running totals so each
/// step is O(1): one push, at most one evict, two additions and two
/// subtractions.
#[derive(Debug, Clone)]
struct RollingSums {
    entries: VecDeque<(f64, f64)>,
    capacity: usize,
    volume: f64,
    value: f64,
}

impl RollingSums {
    fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "rolling window must hold at least one row");
        RollingSums {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            volume: 0.0,
            value: 0.0,
        }
    }

    fn push(&mut self, volume: f64, value: f64) {
        if self.entries.len() == self.capacity {
            if let Some((old_volume, old_value)) = self.entries.pop_front() {
                self.volume -= old_volume;
                self.value -= old_value;
            }
        }
        self.entries.push_back((volume, value));
        self.volume += volume;
        self.value += value;
    }

    fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    fn totals(&self) -> (f64, f64) {
        (self.volume, self.value)
    }
}

fn vwap(value: f64, volume: f64) -> Option<f64> {
    if volume > 0.0 {
        Some(value / volume)
    } else {
        None
    }
}

#[cfg(debug_assertions)]
fn assert_single_asset_sorted(rows: &[PriceRow]) {
    for pair in rows.windows(2) {
        debug_assert!(
            pair[0].asset_id == pair[1].asset_id,
            "realized price takes rows for exactly one asset"
        );
        debug_assert!(
            pair[0].date < pair[1].date,
            "rows must be strictly date-sorted before the realized-price engine"
        );
    }
}

/// Computes the realized-price series for one asset.
///
/// `rows` must belong to a single asset and be strictly sorted by date
/// ascending; the engine does not sort. `window` is a plain row count
/// (reference configuration: 155).
///
/// The short leg follows a strict rolling-window semantic: rows seen before
/// the window holds `window` observations have `None` short and long legs,
/// with no partial-window averaging. The long leg is the exact complement of
/// the short leg against the cumulative totals, so
/// `long + short == cumulative` holds for volume and value on every row
/// where the legs are defined.
///
/// # Panics
/// Panics if `window` is zero.
pub fn realized_price(rows: &[PriceRow], window: usize) -> Vec<RealizedPricePoint> {
    let mut trailing = RollingSums::new(window);

    #[cfg(debug_assertions)]
    assert_single_asset_sorted(rows);

    let mut cum_volume = 0.0f64;
    let mut cum_value = 0.0f64;
    let mut series = Vec::with_capacity(rows.len());

    for row in rows {
        let row_value = row.close * row.volume;
        cum_volume += row.volume;
        cum_value += row_value;
        trailing.push(row.volume, row_value);

        let (short_volume, short_value, short_rp, long_volume, long_value, long_rp) =
            if trailing.is_full() {
                let (sv, sw) = trailing.totals();
                let lv = cum_volume - sv;
                let lw = cum_value - sw;
                (
                    Some(sv),
                    Some(sw),
                    vwap(sw, sv),
                    Some(lv),
                    Some(lw),
                    vwap(lw, lv),
                )
            } else {
                (None, None, None, None, None, None)
            };

        series.push(RealizedPricePoint {
            date: row.date,
            close: row.close,
            cum_volume,
            cum_value,
            realized_price: vwap(cum_value, cum_volume),
            short_volume,
            short_value,
            short_realized_price: short_rp,
            long_volume,
            long_value,
            long_realized_price: long_rp,
        });
    }

    debug!(
        "computed realized-price series of {} points (window {})",
        series.len(),
        window
    );
    series
}
