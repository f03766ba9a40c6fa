use crate::asset::AssetId;
use crate::price_row::OhlcvBar;
use crate::price_store::{PriceStore, StoreError};
use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;

/// Default table name for the canonical price dataset.
pub const DEFAULT_TABLE: &str = "prices";

/// SQLite-backed price store.
///
/// Holds the single flat `prices(date, open, high, low, close, volume,
/// asset_id)` table. The schema is created automatically on first use, and
/// `replace_all` rewrites the table inside one transaction so readers never
/// observe a partially-replaced table.
#[derive(Debug)]
pub struct SqlitePriceStore {
    conn: Connection,
}

impl SqlitePriceStore {
    /// Opens (or creates) a file-based store.
    ///
    /// # Errors
    /// Returns an error if the database connection cannot be established or
    /// the schema cannot be created.
    pub fn new<P: AsRef<Path>>(db_path: P) -> SqliteResult<Self> {
        let conn = Connection::open(db_path)?;
        let store = SqlitePriceStore { conn };
        store.ensure_table(DEFAULT_TABLE)?;
        Ok(store)
    }

    /// Creates an in-memory store. Useful for testing.
    pub fn new_in_memory() -> SqliteResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = SqlitePriceStore { conn };
        store.ensure_table(DEFAULT_TABLE)?;
        Ok(store)
    }

    /// Creates `table` with the canonical schema if it does not exist yet.
    fn ensure_table(&self, table: &str) -> SqliteResult<()> {
        self.conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    date TEXT NOT NULL,
                    open REAL NOT NULL,
                    high REAL NOT NULL,
                    low REAL NOT NULL,
                    close REAL NOT NULL,
                    volume REAL NOT NULL,
                    asset_id INTEGER NOT NULL,
                    PRIMARY KEY (asset_id, date)
                )",
                table
            ),
            [],
        )?;
        Ok(())
    }

    /// Checks whether a table exists.
    fn table_exists(&self, table: &str) -> SqliteResult<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
        stmt.exists([table])
    }

    /// Returns a reference to the underlying SQLite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Table names are interpolated into SQL (they cannot be bound as
    /// parameters), so only identifier characters are accepted.
    fn validate_table_name(table: &str) -> Result<(), StoreError> {
        let valid = !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(StoreError::Schema(format!(
                "invalid table name: '{}'",
                table
            )))
        }
    }
}

impl PriceStore for SqlitePriceStore {
    fn replace_all(&mut self, table: &str, rows: &[OhlcvBar]) -> Result<(), StoreError> {
        Self::validate_table_name(table)?;
        self.ensure_table(table)
            .map_err(|e| StoreError::Backend(format!("schema creation failed: {}", e)))?;

        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::Backend(format!("transaction start failed: {}", e)))?;

        tx.execute(&format!("DELETE FROM {}", table), [])
            .map_err(|e| StoreError::Backend(format!("table clear failed: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO {} (date, open, high, low, close, volume, asset_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    table
                ))
                .map_err(|e| StoreError::Backend(format!("insert prepare failed: {}", e)))?;

            for bar in rows {
                stmt.execute(rusqlite::params![
                    bar.date.format("%Y-%m-%d").to_string(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume,
                    bar.asset_id.value(),
                ])
                .map_err(|e| StoreError::Backend(format!("insert failed: {}", e)))?;
            }
        }

        tx.commit()
            .map_err(|e| StoreError::Backend(format!("commit failed: {}", e)))
    }

    fn query_all(&self, table: &str) -> Result<Vec<OhlcvBar>, StoreError> {
        Self::validate_table_name(table)?;

        let exists = self
            .table_exists(table)
            .map_err(|e| StoreError::Backend(format!("table lookup failed: {}", e)))?;
        if !exists {
            return Err(StoreError::Schema(format!("no such table: '{}'", table)));
        }

        // A prepare failure here means the table is missing expected columns.
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT date, open, high, low, close, volume, asset_id FROM {}",
                table
            ))
            .map_err(|e| StoreError::Schema(format!("unexpected table shape: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let date_str: String = row.get(0)?;
                let date = chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                    .map_err(|e| {
                        rusqlite::Error::InvalidColumnType(
                            0,
                            format!("invalid date '{}': {}", date_str, e),
                            rusqlite::types::Type::Text,
                        )
                    })?;
                Ok(OhlcvBar {
                    asset_id: AssetId::new(row.get(6)?),
                    date,
                    open: row.get(1)?,
                    high: row.get(2)?,
                    low: row.get(3)?,
                    close: row.get(4)?,
                    volume: row.get(5)?,
                })
            })
            .map_err(|e| StoreError::Backend(format!("query failed: {}", e)))?;

        let mut bars = Vec::new();
        for row in rows {
            bars.push(row.map_err(|e| StoreError::Backend(format!("row read failed: {}", e)))?);
        }
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(asset: i64, day: u32, close: f64, volume: f64) -> OhlcvBar {
        OhlcvBar::new(
            AssetId::new(asset),
            NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            close - 1.0,
            close + 2.0,
            close - 2.0,
            close,
            volume,
        )
    }

    #[test]
    fn test_schema_created_on_open() {
        let store = SqlitePriceStore::new_in_memory().unwrap();
        assert!(store.table_exists(DEFAULT_TABLE).unwrap());
    }

    #[test]
    fn test_replace_and_query_round_trip() {
        let mut store = SqlitePriceStore::new_in_memory().unwrap();
        let rows = vec![bar(1, 1, 100.0, 10.0), bar(1, 2, 101.0, 20.0)];
        store.replace_all(DEFAULT_TABLE, &rows).unwrap();

        let mut read = store.query_all(DEFAULT_TABLE).unwrap();
        read.sort_by_key(|b| b.date);
        assert_eq!(read, rows);
    }

    #[test]
    fn test_replace_fully_supersedes_previous_load() {
        let mut store = SqlitePriceStore::new_in_memory().unwrap();
        store
            .replace_all(DEFAULT_TABLE, &[bar(1, 1, 100.0, 10.0), bar(1, 2, 101.0, 10.0)])
            .unwrap();
        store
            .replace_all(DEFAULT_TABLE, &[bar(2, 3, 55.0, 5.0)])
            .unwrap();

        let read = store.query_all(DEFAULT_TABLE).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].asset_id, AssetId::new(2));
        assert_eq!(read[0].close, 55.0);
    }

    #[test]
    fn test_query_missing_table_is_schema_error() {
        let store = SqlitePriceStore::new_in_memory().unwrap();
        let err = store.query_all("other_prices").unwrap_err();
        assert!(matches!(err, StoreError::Schema(_)));
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let mut store = SqlitePriceStore::new_in_memory().unwrap();
        let err = store.replace_all("prices; DROP TABLE prices", &[]).unwrap_err();
        assert!(matches!(err, StoreError::Schema(_)));
    }

    #[test]
    fn test_empty_replace_leaves_empty_table() {
        let mut store = SqlitePriceStore::new_in_memory().unwrap();
        store
            .replace_all(DEFAULT_TABLE, &[bar(1, 1, 100.0, 10.0)])
            .unwrap();
        store.replace_all(DEFAULT_TABLE, &[]).unwrap();
        assert!(store.query_all(DEFAULT_TABLE).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let store = SqlitePriceStore::new_in_memory().unwrap();
        store
            .conn
            .execute("CREATE TABLE trimmed (date TEXT, close REAL)", [])
            .unwrap();
        let err = store.query_all("trimmed").unwrap_err();
        assert!(matches!(err, StoreError::Schema(_)));
    }
}
