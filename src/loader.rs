use crate::asset::AssetId;
use crate::price_row::PriceRow;
use crate::price_store::{PriceStore, StoreError};
use chrono::NaiveDate;

/// Errors raised while loading the working dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The requested asset/date range yielded no rows. Propagated, no retry.
    DataUnavailable,
    /// The queried table is missing required fields. Fatal for this load.
    SchemaError(String),
    /// The storage backend failed.
    Store(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::DataUnavailable => write!(f, "No price data available"),
            LoadError::SchemaError(msg) => write!(f, "Schema error: {}", msg),
            LoadError::Store(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<StoreError> for LoadError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Schema(msg) => LoadError::SchemaError(msg),
            StoreError::Backend(msg) => LoadError::Store(msg),
        }
    }
}

/// Loads the working in-memory dataset for the analytics layer.
///
/// Fetches every row of `table`, drops rows with missing (non-finite) fields,
/// keeps rows on or after `start_date`, optionally narrows to one asset, and
/// attaches the derived calendar fields.
///
/// Row order from the store is preserved and nothing more: callers that need
/// chronological order run [`sort_chronological`] before handing rows to the
/// aggregator or the realized-price engine.
pub fn load_price_rows(
    store: &dyn PriceStore,
    table: &str,
    asset_filter: Option<AssetId>,
    start_date: NaiveDate,
) -> Result<Vec<PriceRow>, LoadError> {
    let bars = store.query_all(table)?;
    let total = bars.len();

    let mut dropped = 0usize;
    let rows: Vec<PriceRow> = bars
        .into_iter()
        .filter(|bar| {
            if !bar.is_complete() {
                dropped += 1;
                return false;
            }
            true
        })
        .filter(|bar| asset_filter.map_or(true, |id| bar.asset_id == id))
        .filter(|bar| bar.date >= start_date)
        .map(PriceRow::from_bar)
        .collect();

    if dropped > 0 {
        log::warn!("Dropped {} incomplete rows out of {}", dropped, total);
    }
    log::info!(
        "Loaded {} rows from '{}' (start date {})",
        rows.len(),
        table,
        start_date
    );

    if rows.is_empty() {
        return Err(LoadError::DataUnavailable);
    }
    Ok(rows)
}

/// Sorts rows by (asset_id, date) ascending.
///
/// The aggregator and the realized-price engine require date order and do
/// not sort on their own; run this after loading unless the store already
/// guarantees chronological order.
pub fn sort_chronological(rows: &mut [PriceRow]) {
    rows.sort_by(|a, b| (a.asset_id, a.date).cmp(&(b.asset_id, b.date)));
}
