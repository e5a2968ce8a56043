// ABOUTME: Synchronization engine between the table store and the snapshot file
// ABOUTME: Table enumeration and sequential, fail-fast orchestration of save/restore

pub mod batch;
pub mod checksum;
pub mod restore;
pub mod save;

pub use batch::{MutationBatch, DEFAULT_BATCH_SIZE};
pub use checksum::compute_checksum;
pub use restore::restore_table;
pub use save::save_table;

use crate::context::OperationContext;
use crate::error::{Result, SyncError};
use crate::snapshot::SnapshotStore;
use crate::store::{TableAdmin, TableData};
use crate::utils::sanitize_identifier;

/// Rows moved for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub table: String,
    pub rows: usize,
}

/// Per-table results of a run, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub tables: Vec<TableSummary>,
}

impl SyncSummary {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.table.as_str()).collect()
    }

    fn record(&mut self, table: &str, rows: usize) {
        self.tables.push(TableSummary {
            table: table.to_string(),
            rows,
        });
    }
}

/// List remote tables in lexicographic order
pub async fn list_remote_tables<A: TableAdmin>(
    ctx: &OperationContext,
    admin: &A,
) -> Result<Vec<String>> {
    ctx.check(|| "listing remote tables".to_string())?;
    let mut tables = admin.list_tables().await.map_err(SyncError::List)?;
    tables.sort();
    Ok(tables)
}

/// Save every remote table into the snapshot
///
/// Tables are processed one at a time in lexicographic order. The first
/// failure aborts the run; tables saved before it keep their new snapshot.
pub async fn save_all<A: TableAdmin, D: TableData>(
    ctx: &OperationContext,
    admin: &A,
    data: &D,
    snapshot: &SnapshotStore,
) -> Result<SyncSummary> {
    let tables = list_remote_tables(ctx, admin).await?;
    if tables.is_empty() {
        tracing::warn!("⚠ No tables found in the table store");
    }

    let mut summary = SyncSummary::default();
    for (idx, table) in tables.iter().enumerate() {
        tracing::debug!(
            "Saving table {}/{}: '{}'",
            idx + 1,
            tables.len(),
            sanitize_identifier(table)
        );
        let rows = save_table(ctx, table, data, snapshot)
            .await
            .inspect_err(|e| tracing::error!("✗ Save aborted: {}", e))?;
        summary.record(table, rows);
    }

    Ok(summary)
}

/// Replace the contents of the table store with the snapshot
///
/// 1. Lists remote tables and deletes every row of each (in lexicographic order)
/// 2. Lists the snapshot's user tables (sorted, SQLite internals excluded)
/// 3. Restores each snapshot table into the same-named remote table
///
/// The first failure aborts the run. Restore is a full replace, never a merge.
pub async fn restore<A: TableAdmin, D: TableData>(
    ctx: &OperationContext,
    admin: &A,
    data: &D,
    snapshot: &SnapshotStore,
    batch_size: usize,
) -> Result<SyncSummary> {
    let remote_tables = list_remote_tables(ctx, admin).await?;

    for table in &remote_tables {
        ctx.check(|| format!("clearing remote table '{}'", table))?;
        tracing::info!("Clearing remote table '{}'...", sanitize_identifier(table));
        admin
            .drop_all_rows(table)
            .await
            .map_err(|source| SyncError::Clear {
                table: table.clone(),
                source,
            })?;
    }

    ctx.check(|| "listing snapshot tables".to_string())?;
    let tables = snapshot.list_user_tables().map_err(SyncError::List)?;
    if tables.is_empty() {
        tracing::warn!("⚠ Snapshot contains no tables");
    }

    let mut summary = SyncSummary::default();
    for (idx, table) in tables.iter().enumerate() {
        tracing::debug!(
            "Restoring table {}/{}: '{}'",
            idx + 1,
            tables.len(),
            sanitize_identifier(table)
        );
        let rows = restore_table(ctx, table, data, snapshot, batch_size)
            .await
            .inspect_err(|e| tracing::error!("✗ Restore aborted: {}", e))?;
        summary.record(table, rows);
    }

    Ok(summary)
}
