use crate::asset::AssetId;
use crate::price_row::OhlcvBar;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Required CSV columns besides the date column.
const NUMERIC_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Errors that can occur while ingesting an OHLCV CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// A required column is absent from the header row.
    MissingColumn(String),
    /// The CSV could not be read or parsed structurally.
    Csv(String),
    /// File access failed.
    Io(String),
    /// A date cell could not be parsed.
    InvalidDate { line: u64, value: String },
    /// A numeric cell held a non-empty, non-numeric value.
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::MissingColumn(name) => {
                write!(f, "Missing required column: {}", name)
            }
            IngestError::Csv(msg) => write!(f, "CSV error: {}", msg),
            IngestError::Io(msg) => write!(f, "I/O error: {}", msg),
            IngestError::InvalidDate { line, value } => {
                write!(f, "Invalid date '{}' on line {}", value, line)
            }
            IngestError::InvalidNumber {
                line,
                column,
                value,
            } => write!(f, "Invalid {} value '{}' on line {}", column, value, line),
        }
    }
}

impl std::error::Error for IngestError {}

/// Reads a delimited OHLCV time series into canonical bars.
///
/// The header row is required. Column names map case-insensitively onto
/// {date|index, open, high, low, close, volume}; the source file carries no
/// asset identifier, so `asset_id` is attached here, post-parse.
///
/// Empty numeric cells become NaN rather than failing the whole file; the
/// loader later drops incomplete rows the same way the canonical dataset
/// drops rows with missing fields.
pub fn read_ohlcv_csv<R: Read>(reader: R, asset_id: AssetId) -> Result<Vec<OhlcvBar>, IngestError> {
    let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| IngestError::Csv(e.to_string()))?
        .clone();

    let mut columns: HashMap<String, usize> = HashMap::new();
    for (index, name) in headers.iter().enumerate() {
        columns.entry(name.trim().to_lowercase()).or_insert(index);
    }

    // The date column is either "date" or the exported index column.
    let date_index = columns
        .get("date")
        .or_else(|| columns.get("index"))
        .copied()
        .ok_or_else(|| IngestError::MissingColumn("date".to_string()))?;

    let mut numeric_indexes = [0usize; NUMERIC_COLUMNS.len()];
    for (slot, name) in NUMERIC_COLUMNS.iter().enumerate() {
        numeric_indexes[slot] = columns
            .get(*name)
            .copied()
            .ok_or_else(|| IngestError::MissingColumn(name.to_string()))?;
    }

    let mut bars = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| IngestError::Csv(e.to_string()))?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(bars.len() as u64 + 2);

        let date_cell = record.get(date_index).unwrap_or("").trim();
        let date = NaiveDate::parse_from_str(date_cell, "%Y-%m-%d").map_err(|_| {
            IngestError::InvalidDate {
                line,
                value: date_cell.to_string(),
            }
        })?;

        let mut values = [0.0f64; NUMERIC_COLUMNS.len()];
        for (slot, name) in NUMERIC_COLUMNS.iter().enumerate() {
            let cell = record.get(numeric_indexes[slot]).unwrap_or("").trim();
            values[slot] = if cell.is_empty() {
                f64::NAN
            } else {
                cell.parse::<f64>().map_err(|_| IngestError::InvalidNumber {
                    line,
                    column: name.to_string(),
                    value: cell.to_string(),
                })?
            };
        }

        bars.push(OhlcvBar {
            asset_id,
            date,
            open: values[0],
            high: values[1],
            low: values[2],
            close: values[3],
            volume: values[4],
        });
    }

    log::info!(
        "Ingested {} rows for asset {} from CSV",
        bars.len(),
        asset_id
    );
    Ok(bars)
}

/// Convenience wrapper reading the CSV from a file path.
pub fn read_ohlcv_csv_path<P: AsRef<Path>>(
    path: P,
    asset_id: AssetId,
) -> Result<Vec<OhlcvBar>, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::Io(e.to_string()))?;
    read_ohlcv_csv(file, asset_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Volume
2024-01-02,100.0,105.0,99.0,104.0,1200
2024-01-03,104.0,106.0,101.0,102.5,900
";

    #[test]
    fn test_reads_sample_csv() {
        let bars = read_ohlcv_csv(SAMPLE.as_bytes(), AssetId::new(1)).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 104.0);
        assert_eq!(bars[1].volume, 900.0);
        assert_eq!(bars[1].asset_id, AssetId::new(1));
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let csv = "\
DATE,open,HIGH,Low,cLoSe,VOLUME
2024-01-02,1,2,0.5,1.5,10
";
        let bars = read_ohlcv_csv(csv.as_bytes(), AssetId::new(2)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 1.5);
    }

    #[test]
    fn test_index_column_is_accepted_as_date() {
        let csv = "\
index,close,high,low,open,volume
2024-01-02,1.5,2.0,0.5,1.0,10
";
        let bars = read_ohlcv_csv(csv.as_bytes(), AssetId::new(1)).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_missing_column_is_reported() {
        let csv = "\
Date,Open,High,Low,Close
2024-01-02,1,2,0.5,1.5
";
        let err = read_ohlcv_csv(csv.as_bytes(), AssetId::new(1)).unwrap_err();
        assert_eq!(err, IngestError::MissingColumn("volume".to_string()));
    }

    #[test]
    fn test_empty_numeric_cell_becomes_nan() {
        let csv = "\
Date,Open,High,Low,Close,Volume
2024-01-02,1,2,0.5,,10
";
        let bars = read_ohlcv_csv(csv.as_bytes(), AssetId::new(1)).unwrap();
        assert!(bars[0].close.is_nan());
        assert!(!bars[0].is_complete());
    }

    #[test]
    fn test_bad_number_is_reported_with_line() {
        let csv = "\
Date,Open,High,Low,Close,Volume
2024-01-02,1,2,0.5,1.5,10
2024-01-03,1,2,0.5,abc,10
";
        let err = read_ohlcv_csv(csv.as_bytes(), AssetId::new(1)).unwrap_err();
        match err {
            IngestError::InvalidNumber { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "close");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_reported() {
        let csv = "\
Date,Open,High,Low,Close,Volume
02/01/2024,1,2,0.5,1.5,10
";
        let err = read_ohlcv_csv(csv.as_bytes(), AssetId::new(1)).unwrap_err();
        assert!(matches!(err, IngestError::InvalidDate { .. }));
    }
}
