use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer identifier attached to every stored price row.
///
/// The ingested CSV carries no asset column; the id is assigned during
/// ingestion and keys every stored and derived structure afterwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AssetId(pub i64);

impl AssetId {
    /// Creates a new asset id.
    pub fn new(id: i64) -> Self {
        AssetId(id)
    }

    /// Returns the raw integer value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AssetId {
    fn from(id: i64) -> Self {
        AssetId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_id_display() {
        assert_eq!(AssetId::new(1).to_string(), "1");
        assert_eq!(AssetId::from(42).to_string(), "42");
    }

    #[test]
    fn test_asset_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&AssetId::new(7)).unwrap();
        assert_eq!(json, "7");

        let back: AssetId = serde_json::from_str("7").unwrap();
        assert_eq!(back, AssetId::new(7));
    }

    #[test]
    fn test_asset_id_ordering() {
        assert!(AssetId::new(1) < AssetId::new(2));
    }
}
