//! Monthly return aggregation.
//!
//! Pure functions over an immutable, date-sorted snapshot of price rows.
//! Undefined ratios are carried as `None` so a single bad month never aborts
//! the aggregation or silently turns into zero.

use crate::asset::AssetId;
use crate::price_row::{PriceRow, YearMonth};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Return of one asset over one year-month bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub asset_id: AssetId,
    pub year_month: YearMonth,
    /// Close of the chronologically first row in the bucket.
    pub first_close: f64,
    /// Close of the chronologically last row in the bucket.
    pub last_close: f64,
    /// (last - first) / first; `None` when the first close is zero.
    pub monthly_return: Option<f64>,
}

/// Average return per calendar month across all observed years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverage {
    pub asset_id: AssetId,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Mean of the defined monthly returns; `None` when every contributing
    /// month was undefined.
    pub avg_return: Option<f64>,
}

fn pct_change(first: f64, last: f64) -> Option<f64> {
    if first == 0.0 || !first.is_finite() || !last.is_finite() {
        return None;
    }
    Some((last - first) / first)
}

#[cfg(debug_assertions)]
fn assert_date_sorted(rows: &[PriceRow], asset_id: AssetId) {
    let mut previous = None;
    for row in rows.iter().filter(|r| r.asset_id == asset_id) {
        if let Some(prev) = previous {
            debug_assert!(
                row.date >= prev,
                "rows must be date-sorted before aggregation"
            );
        }
        previous = Some(row.date);
    }
}

/// Computes the per-month return for one asset.
///
/// Rows must already be sorted by date for `asset_id` (the loader's
/// `sort_chronological` does this); first/last close are taken in row order,
/// not re-sorted here. Buckets come out in chronological order, one per
/// observed year-month.
pub fn monthly_returns(rows: &[PriceRow], asset_id: AssetId) -> Vec<MonthlyReturn> {
    #[cfg(debug_assertions)]
    assert_date_sorted(rows, asset_id);

    let mut buckets: BTreeMap<YearMonth, (f64, f64)> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.asset_id == asset_id) {
        buckets
            .entry(row.year_month)
            .and_modify(|(_, last)| *last = row.close)
            .or_insert((row.close, row.close));
    }

    let returns: Vec<MonthlyReturn> = buckets
        .into_iter()
        .map(|(year_month, (first_close, last_close))| MonthlyReturn {
            asset_id,
            year_month,
            first_close,
            last_close,
            monthly_return: pct_change(first_close, last_close),
        })
        .collect();

    debug!(
        "aggregated {} monthly buckets for asset {}",
        returns.len(),
        asset_id
    );
    returns
}

/// Averages monthly returns by calendar month across years.
///
/// Undefined monthly returns are excluded from the mean; a calendar month
/// whose every observation is undefined yields `None` rather than zero.
/// One output row per (asset_id, month).
pub fn monthly_average(returns: &[MonthlyReturn]) -> Vec<MonthlyAverage> {
    let mut buckets: BTreeMap<(AssetId, u32), Vec<f64>> = BTreeMap::new();
    for ret in returns {
        let values = buckets
            .entry((ret.asset_id, ret.year_month.month))
            .or_default();
        if let Some(value) = ret.monthly_return {
            values.push(value);
        }
    }

    buckets
        .into_iter()
        .map(|((asset_id, month), values)| {
            let avg_return = if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            };
            MonthlyAverage {
                asset_id,
                month,
                avg_return,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price_row::OhlcvBar;
    use chrono::NaiveDate;

    fn row(asset: i64, y: i32, m: u32, d: u32, close: f64) -> PriceRow {
        PriceRow::from_bar(OhlcvBar::new(
            AssetId::new(asset),
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            close,
            close,
            close,
            close,
            100.0,
        ))
    }

    #[test]
    fn test_monthly_return_uses_first_and_last_close() {
        let rows = vec![
            row(1, 2024, 1, 2, 100.0),
            row(1, 2024, 1, 15, 140.0),
            row(1, 2024, 1, 31, 110.0),
        ];
        let returns = monthly_returns(&rows, AssetId::new(1));
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].first_close, 100.0);
        assert_eq!(returns[0].last_close, 110.0);
        let value = returns[0].monthly_return.unwrap();
        assert!((value - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_buckets_are_distinct_and_chronological() {
        let rows = vec![
            row(1, 2023, 12, 29, 90.0),
            row(1, 2024, 1, 2, 100.0),
            row(1, 2024, 2, 1, 105.0),
        ];
        let returns = monthly_returns(&rows, AssetId::new(1));
        let buckets: Vec<YearMonth> = returns.iter().map(|r| r.year_month).collect();
        assert_eq!(
            buckets,
            vec![
                YearMonth::new(2023, 12),
                YearMonth::new(2024, 1),
                YearMonth::new(2024, 2)
            ]
        );
    }

    #[test]
    fn test_single_row_month_returns_zero() {
        let rows = vec![row(1, 2024, 3, 15, 123.0)];
        let returns = monthly_returns(&rows, AssetId::new(1));
        assert_eq!(returns[0].monthly_return, Some(0.0));
    }

    #[test]
    fn test_zero_first_close_is_undefined_not_zero() {
        let rows = vec![row(1, 2024, 4, 1, 0.0), row(1, 2024, 4, 30, 10.0)];
        let returns = monthly_returns(&rows, AssetId::new(1));
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].monthly_return, None);
    }

    #[test]
    fn test_other_assets_are_ignored() {
        let rows = vec![row(1, 2024, 1, 2, 100.0), row(2, 2024, 1, 2, 999.0)];
        let returns = monthly_returns(&rows, AssetId::new(1));
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].first_close, 100.0);
    }

    #[test]
    fn test_monthly_average_spans_years() {
        let rows = vec![
            row(1, 2023, 1, 2, 100.0),
            row(1, 2023, 1, 31, 110.0),
            row(1, 2024, 1, 2, 100.0),
            row(1, 2024, 1, 31, 130.0),
        ];
        let averages = monthly_average(&monthly_returns(&rows, AssetId::new(1)));
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].month, 1);
        // Mean of +10% and +30%.
        let value = averages[0].avg_return.unwrap();
        assert!((value - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_monthly_average_skips_undefined_observations() {
        let returns = vec![
            MonthlyReturn {
                asset_id: AssetId::new(1),
                year_month: YearMonth::new(2023, 5),
                first_close: 0.0,
                last_close: 10.0,
                monthly_return: None,
            },
            MonthlyReturn {
                asset_id: AssetId::new(1),
                year_month: YearMonth::new(2024, 5),
                first_close: 100.0,
                last_close: 105.0,
                monthly_return: Some(0.05),
            },
        ];
        let averages = monthly_average(&returns);
        assert_eq!(averages.len(), 1);
        let value = averages[0].avg_return.unwrap();
        assert!((value - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_monthly_average_all_undefined_is_none() {
        let returns = vec![MonthlyReturn {
            asset_id: AssetId::new(1),
            year_month: YearMonth::new(2024, 5),
            first_close: 0.0,
            last_close: 10.0,
            monthly_return: None,
        }];
        let averages = monthly_average(&returns);
        assert_eq!(averages[0].avg_return, None);
    }

    #[test]
    fn test_monthly_average_is_idempotent() {
        let rows = vec![
            row(1, 2023, 1, 2, 100.0),
            row(1, 2023, 1, 31, 110.0),
            row(1, 2023, 2, 1, 110.0),
            row(1, 2023, 2, 28, 99.0),
        ];
        let returns = monthly_returns(&rows, AssetId::new(1));
        let first = monthly_average(&returns);
        let second = monthly_average(&returns);
        assert_eq!(first, second);
    }

    #[test]
    fn test_monthly_average_separates_assets() {
        let rows = vec![
            row(1, 2024, 1, 2, 100.0),
            row(1, 2024, 1, 31, 110.0),
            row(2, 2024, 1, 2, 200.0),
            row(2, 2024, 1, 31, 180.0),
        ];
        let mut returns = monthly_returns(&rows, AssetId::new(1));
        returns.extend(monthly_returns(&rows, AssetId::new(2)));
        let averages = monthly_average(&returns);
        assert_eq!(averages.len(), 2);
        assert!(averages[0].avg_return.unwrap() > 0.0);
        assert!(averages[1].avg_return.unwrap() < 0.0);
    }
}
