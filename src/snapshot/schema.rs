// ABOUTME: Fixed relational layout every snapshot table uses
// ABOUTME: One row per cell plus its checksum, keyed by the source table name

use crate::cell::Cell;
use crate::utils::quote_identifier;
use rusqlite::Row;

/// Column list shared by every statement, in storage order
const COLUMNS: &str = r#""key", "column_family", "column", "value", "timestamp", "chk""#;

/// One stored cell and its recorded checksum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub key: String,
    pub column_family: String,
    pub column: String,
    pub value: Vec<u8>,
    pub timestamp: i64,
    pub checksum: u32,
}

impl SnapshotRow {
    /// Build a row from a cell, computing its checksum
    pub fn from_cell(cell: Cell) -> Self {
        let checksum = cell.checksum();
        Self {
            key: cell.row_key,
            column_family: cell.family,
            column: cell.column,
            value: cell.value,
            timestamp: cell.timestamp,
            checksum,
        }
    }

    /// Checksum recomputed from the row's fields
    pub fn computed_checksum(&self) -> u32 {
        crate::sync::checksum::compute_checksum(
            &self.key,
            &self.column_family,
            &self.column,
            &self.value,
            self.timestamp,
        )
    }

    pub(crate) fn from_sql_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            column_family: row.get(1)?,
            column: row.get(2)?,
            value: row.get(3)?,
            timestamp: row.get(4)?,
            checksum: row.get(5)?,
        })
    }
}

pub(crate) fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_identifier(table))
}

pub(crate) fn create_table_sql(table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {} ("key" TEXT, "column_family" TEXT, "column" TEXT, "value" BLOB, "timestamp" INTEGER, "chk" INTEGER)"#,
        quote_identifier(table)
    )
}

pub(crate) fn insert_sql(table: &str) -> String {
    format!(
        "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        quote_identifier(table),
        COLUMNS
    )
}

pub(crate) fn select_sql(table: &str) -> String {
    format!("SELECT {} FROM {}", COLUMNS, quote_identifier(table))
}

pub(crate) const LIST_USER_TABLES_SQL: &str = r"SELECT name FROM sqlite_master
     WHERE type = 'table' AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
     ORDER BY name";
