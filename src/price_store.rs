use crate::price_row::OhlcvBar;
use std::collections::HashMap;

/// Trait for price store abstraction.
///
/// The analytics layer consumes the store through exactly two operations:
/// a whole-table overwrite and a full-table read. This keeps the core
/// decoupled from any specific database.
///
/// Implementations can be:
/// - In-memory HashMap (for testing)
/// - SQLite database
/// - Any other row store honoring the replace/query contract
pub trait PriceStore {
    /// Replaces the entire contents of `table` with `rows`.
    ///
    /// The replacement is atomic from a reader's point of view: a concurrent
    /// `query_all` observes either the old table or the new one, never a
    /// partially-replaced mixture.
    fn replace_all(&mut self, table: &str, rows: &[OhlcvBar]) -> Result<(), StoreError>;

    /// Reads every row of `table`.
    ///
    /// No ordering is guaranteed; callers needing chronological order sort
    /// the result themselves.
    fn query_all(&self, table: &str) -> Result<Vec<OhlcvBar>, StoreError>;
}

/// Errors reported by a price store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The table or its columns do not match the expected shape.
    Schema(String),
    /// The storage backend failed (connection, I/O, SQL execution).
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Schema(msg) => write!(f, "Schema error: {}", msg),
            StoreError::Backend(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// In-memory price store implementation for testing.
///
/// Stores rows in a HashMap keyed by table name. A table that has never been
/// replaced reads as empty, matching a freshly-created SQLite schema.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceStore {
    tables: HashMap<String, Vec<OhlcvBar>>,
}

impl InMemoryPriceStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        InMemoryPriceStore {
            tables: HashMap::new(),
        }
    }
}

impl PriceStore for InMemoryPriceStore {
    fn replace_all(&mut self, table: &str, rows: &[OhlcvBar]) -> Result<(), StoreError> {
        self.tables.insert(table.to_string(), rows.to_vec());
        Ok(())
    }

    fn query_all(&self, table: &str) -> Result<Vec<OhlcvBar>, StoreError> {
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetId;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> OhlcvBar {
        OhlcvBar::new(
            AssetId::new(1),
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close,
            close + 1.0,
            close - 1.0,
            close,
            100.0,
        )
    }

    #[test]
    fn test_replace_and_query_round_trip() {
        let mut store = InMemoryPriceStore::new();
        let rows = vec![bar(1, 100.0), bar(2, 101.0)];
        store.replace_all("prices", &rows).unwrap();

        let read = store.query_all("prices").unwrap();
        assert_eq!(read, rows);
    }

    #[test]
    fn test_replace_overwrites_previous_contents() {
        let mut store = InMemoryPriceStore::new();
        store
            .replace_all("prices", &[bar(1, 100.0), bar(2, 101.0)])
            .unwrap();
        store.replace_all("prices", &[bar(3, 102.0)]).unwrap();

        let read = store.query_all("prices").unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].close, 102.0);
    }

    #[test]
    fn test_unknown_table_reads_empty() {
        let store = InMemoryPriceStore::new();
        assert!(store.query_all("prices").unwrap().is_empty());
    }
}
