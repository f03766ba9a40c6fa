//! Data contracts for the chart renderer.
//!
//! The rendering layer is an external collaborator: these payloads carry
//! already-computed series (dates, values, sign buckets) and nothing about
//! any particular charting library. Undefined metrics stay `None` so the
//! renderer can gap them instead of drawing a false zero.

use crate::realized::RealizedPricePoint;
use crate::returns::{MonthlyAverage, MonthlyReturn};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Binary color encoding of a return's sign.
///
/// A return of exactly zero is non-negative (green); only strictly negative
/// returns fall into the red bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignBucket {
    Negative,
    NonNegative,
}

impl SignBucket {
    /// Buckets a defined return value.
    pub fn from_return(value: f64) -> Self {
        if value < 0.0 {
            SignBucket::Negative
        } else {
            SignBucket::NonNegative
        }
    }
}

/// One dated point of a line series; `None` renders as a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// A labelled line series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

impl ChartSeries {
    pub fn new(label: impl Into<String>, points: Vec<SeriesPoint>) -> Self {
        ChartSeries {
            label: label.into(),
            points,
        }
    }
}

/// Line chart payload: x = date, y = price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
}

fn price_line_chart(
    title: String,
    metric_label: &str,
    points: &[RealizedPricePoint],
    metric: impl Fn(&RealizedPricePoint) -> Option<f64>,
) -> LineChart {
    let metric_series = points
        .iter()
        .map(|p| SeriesPoint {
            date: p.date,
            value: metric(p),
        })
        .collect();
    let close_series = points
        .iter()
        .map(|p| SeriesPoint {
            date: p.date,
            value: Some(p.close),
        })
        .collect();

    LineChart {
        title,
        x_label: "Date".to_string(),
        y_label: "Price".to_string(),
        series: vec![
            ChartSeries::new(metric_label, metric_series),
            ChartSeries::new("Close price", close_series),
        ],
    }
}

/// Realized price vs close price.
pub fn realized_price_chart(points: &[RealizedPricePoint], asset_label: &str) -> LineChart {
    price_line_chart(
        format!("Realized price vs Close price for {}", asset_label),
        "Realized price",
        points,
        |p| p.realized_price,
    )
}

/// Short-window realized price vs close price.
pub fn short_realized_price_chart(points: &[RealizedPricePoint], asset_label: &str) -> LineChart {
    price_line_chart(
        format!("Short Realized price vs Close price for {}", asset_label),
        "Short-Realized price",
        points,
        |p| p.short_realized_price,
    )
}

/// Long-window realized price vs close price.
pub fn long_realized_price_chart(points: &[RealizedPricePoint], asset_label: &str) -> LineChart {
    price_line_chart(
        format!("Long Realized price vs Close price for {}", asset_label),
        "Long-Realized price",
        points,
        |p| p.long_realized_price,
    )
}

/// One bar of the average-monthly-return chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Calendar month, 1-12.
    pub month: u32,
    pub value: Option<f64>,
    /// Sign bucket of the value; absent when the value is undefined.
    pub bucket: Option<SignBucket>,
}

/// Bar chart payload: x = month, y = average return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

/// Average monthly return bars for one asset, one bar per calendar month.
pub fn monthly_average_bars(averages: &[MonthlyAverage], asset_label: &str) -> BarChart {
    let bars = averages
        .iter()
        .map(|avg| Bar {
            month: avg.month,
            value: avg.avg_return,
            bucket: avg.avg_return.map(SignBucket::from_return),
        })
        .collect();

    BarChart {
        title: format!("Average monthly return: {}", asset_label),
        x_label: "Month".to_string(),
        y_label: "Average Monthly Return".to_string(),
        bars,
    }
}

/// One cell of the year-by-month return heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub value: Option<f64>,
    pub bucket: Option<SignBucket>,
}

impl HeatmapCell {
    fn empty() -> Self {
        HeatmapCell {
            value: None,
            bucket: None,
        }
    }
}

/// Heatmap payload: rows = years, columns = calendar months 1-12,
/// color = sign of the monthly return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnHeatmap {
    pub title: String,
    pub years: Vec<i32>,
    /// Always 1..=12.
    pub months: Vec<u32>,
    /// `cells[row][col]` corresponds to `years[row]` and `months[col]`.
    pub cells: Vec<Vec<HeatmapCell>>,
}

/// Pivots monthly returns into a year-by-month grid.
///
/// Months with no observation stay empty cells; undefined returns keep a
/// value-less cell rather than a zero.
pub fn monthly_return_heatmap(returns: &[MonthlyReturn], asset_label: &str) -> ReturnHeatmap {
    let years: Vec<i32> = returns
        .iter()
        .map(|r| r.year_month.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let months: Vec<u32> = (1..=12).collect();

    let mut cells = vec![vec![HeatmapCell::empty(); months.len()]; years.len()];
    for ret in returns {
        let row = years
            .binary_search(&ret.year_month.year)
            .expect("year collected above");
        let col = (ret.year_month.month - 1) as usize;
        cells[row][col] = HeatmapCell {
            value: ret.monthly_return,
            bucket: ret.monthly_return.map(SignBucket::from_return),
        };
    }

    ReturnHeatmap {
        title: format!(
            "Monthly return for {}. Red: Negative, Green: Positive",
            asset_label
        ),
        years,
        months,
        cells,
    }
}
