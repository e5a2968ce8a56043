// ABOUTME: The atomic unit of data moved between the table store and the snapshot
// ABOUTME: One versioned (row, family, column) -> value entry

use crate::sync::checksum::compute_checksum;
use serde::{Deserialize, Serialize};

/// One versioned cell
///
/// `column` is always the unqualified column name, never `family:column`.
/// `timestamp` is nanoseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row_key: String,
    pub family: String,
    pub column: String,
    pub value: Vec<u8>,
    pub timestamp: i64,
}

impl Cell {
    pub fn new(
        row_key: impl Into<String>,
        family: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<Vec<u8>>,
        timestamp: i64,
    ) -> Self {
        Self {
            row_key: row_key.into(),
            family: family.into(),
            column: column.into(),
            value: value.into(),
            timestamp,
        }
    }

    /// Integrity checksum of this cell
    pub fn checksum(&self) -> u32 {
        compute_checksum(
            &self.row_key,
            &self.family,
            &self.column,
            &self.value,
            self.timestamp,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_matches_codec() {
        let cell = Cell::new("r", "cf", "c", vec![1, 2, 3], 1_000);
        assert_eq!(
            cell.checksum(),
            compute_checksum("r", "cf", "c", &[1, 2, 3], 1_000)
        );
    }
}
