// ABOUTME: Local SQLite snapshot file holding one table per remote table
// ABOUTME: Table lifecycle, streaming inserts and streaming reads

pub mod schema;

pub use schema::SnapshotRow;

use crate::error::StoreError;
use rusqlite::{params, Connection, Statement};
use std::path::Path;

/// Handle to a snapshot file
///
/// Every statement runs in SQLite's implicit per-statement transaction.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    /// Open (creating if needed) a snapshot file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        tracing::debug!("Opening snapshot file {}", path.display());
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open a throwaway in-memory snapshot
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Names of user tables in the snapshot, sorted, excluding SQLite internals
    pub fn list_user_tables(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(schema::LIST_USER_TABLES_SQL)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    pub fn drop_table(&self, table: &str) -> Result<(), StoreError> {
        self.conn.execute(&schema::drop_table_sql(table), [])?;
        Ok(())
    }

    pub fn create_table(&self, table: &str) -> Result<(), StoreError> {
        self.conn.execute(&schema::create_table_sql(table), [])?;
        Ok(())
    }

    /// Insert a single row
    ///
    /// Prefer [`SnapshotStore::writer`] when inserting many rows.
    pub fn insert_row(&self, table: &str, row: &SnapshotRow) -> Result<(), StoreError> {
        self.writer(table)?.insert(row)
    }

    /// Prepare a reusable insert statement for `table`
    pub fn writer(&self, table: &str) -> Result<SnapshotWriter<'_>, StoreError> {
        let stmt = self.conn.prepare(&schema::insert_sql(table))?;
        Ok(SnapshotWriter { stmt })
    }

    /// Prepare a scan over every row of `table` in storage order
    pub fn scan(&self, table: &str) -> Result<SnapshotScan<'_>, StoreError> {
        let stmt = self.conn.prepare(&schema::select_sql(table))?;
        Ok(SnapshotScan { stmt })
    }

    /// Collect every row of `table`
    pub fn read_all(&self, table: &str) -> Result<Vec<SnapshotRow>, StoreError> {
        let mut scan = self.scan(table)?;
        let rows = scan.rows()?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Prepared insert into one snapshot table
pub struct SnapshotWriter<'conn> {
    stmt: Statement<'conn>,
}

impl SnapshotWriter<'_> {
    pub fn insert(&mut self, row: &SnapshotRow) -> Result<(), StoreError> {
        self.stmt.execute(params![
            row.key,
            row.column_family,
            row.column,
            row.value,
            row.timestamp,
            row.checksum,
        ])?;
        Ok(())
    }
}

/// Prepared full-table read
pub struct SnapshotScan<'conn> {
    stmt: Statement<'conn>,
}

impl SnapshotScan<'_> {
    /// Lazily stream rows; dropping the iterator stops the read
    pub fn rows(
        &mut self,
    ) -> Result<impl Iterator<Item = Result<SnapshotRow, StoreError>> + '_, StoreError> {
        let rows = self
            .stmt
            .query_map([], SnapshotRow::from_sql_row)?
            .map(|row| row.map_err(StoreError::from));
        Ok(rows)
    }
}
