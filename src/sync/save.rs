// ABOUTME: Save pipeline - dumps every live cell of a remote table into the snapshot
// ABOUTME: Drops and recreates the snapshot table, then streams rows into it

use crate::cell::Cell;
use crate::context::OperationContext;
use crate::error::{Result, StoreError, SyncError, WriteFailure};
use crate::snapshot::{SnapshotRow, SnapshotStore};
use crate::store::{TableData, TableHandle};
use crate::utils::{sanitize_identifier, unqualified_column};

/// Save one remote table into a same-named snapshot table
///
/// Steps:
/// 1. Drops any existing snapshot table of that name and creates it fresh
/// 2. Streams every cell across the whole key range of the remote table
/// 3. Strips the `family:` qualifier from each column name
/// 4. Computes the cell checksum and appends one snapshot row
///
/// Aborts on the first insert failure (stopping the stream) or on any stream
/// failure from the store. The remote table is never modified.
///
/// # Returns
///
/// Number of cells written to the snapshot.
pub async fn save_table<D: TableData>(
    ctx: &OperationContext,
    table: &str,
    data: &D,
    snapshot: &SnapshotStore,
) -> Result<usize> {
    tracing::info!("Saving '{}' table...", sanitize_identifier(table));

    ctx.check(|| format!("dropping snapshot table '{}'", table))?;
    snapshot.drop_table(table).map_err(|source| SyncError::Clear {
        table: table.to_string(),
        source,
    })?;

    ctx.check(|| format!("creating snapshot table '{}'", table))?;
    snapshot
        .create_table(table)
        .map_err(|source| SyncError::Schema {
            table: table.to_string(),
            source,
        })?;

    let mut writer = snapshot
        .writer(table)
        .map_err(|source| SyncError::Schema {
            table: table.to_string(),
            source,
        })?;

    ctx.check(|| format!("streaming rows of '{}'", table))?;
    let handle = data.open_table(table);

    let mut saved = 0usize;
    let mut row_error: Option<SyncError> = None;

    let stream_result = handle
        .read_rows(&mut |row| {
            for (family, items) in row.families() {
                for item in items {
                    if let Err(e) = ctx.check(|| format!("saving row '{}' of '{}'", row.key(), table)) {
                        row_error = Some(e);
                        return false;
                    }

                    let cell = Cell::new(
                        item.row.clone(),
                        family,
                        unqualified_column(family, &item.column),
                        item.value.clone(),
                        item.timestamp,
                    );

                    if let Err(source) = writer.insert(&SnapshotRow::from_cell(cell)) {
                        row_error = Some(SyncError::Write {
                            table: table.to_string(),
                            source: WriteFailure::Insert {
                                key: row.key().to_string(),
                                source,
                            },
                        });
                        return false;
                    }
                    saved += 1;
                }
            }
            true
        })
        .await;

    stream_result.map_err(|source: StoreError| SyncError::Stream {
        table: table.to_string(),
        source,
    })?;
    if let Some(err) = row_error {
        return Err(err);
    }

    tracing::info!("✓ Saved {} rows for '{}'", saved, sanitize_identifier(table));
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTableStore;

    fn seeded_store() -> MemoryTableStore {
        let store = MemoryTableStore::new();
        store.create_table("t", ["cf1", "cf2"]).unwrap();
        store
            .insert_cells(
                "t",
                &[
                    Cell::new("r1", "cf1", "mycolumn", b"v1".to_vec(), 1_000),
                    Cell::new("r1", "cf2", "other", vec![0, 0], 2_000),
                    Cell::new("r2", "cf1", "mycolumn", Vec::new(), 3_000),
                ],
            )
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_save_table_writes_one_row_per_cell() {
        let store = seeded_store();
        let snapshot = SnapshotStore::open_in_memory().unwrap();

        let saved = save_table(&OperationContext::new(), "t", &store, &snapshot)
            .await
            .unwrap();
        assert_eq!(saved, 3);

        let rows = snapshot.read_all("t").unwrap();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.checksum, row.computed_checksum());
        }
    }

    #[tokio::test]
    async fn test_save_table_strips_family_prefix() {
        let store = seeded_store();
        let snapshot = SnapshotStore::open_in_memory().unwrap();

        save_table(&OperationContext::new(), "t", &store, &snapshot)
            .await
            .unwrap();

        let rows = snapshot.read_all("t").unwrap();
        assert!(rows.iter().all(|r| !r.column.contains(':')));
        assert!(rows
            .iter()
            .any(|r| r.column_family == "cf1" && r.column == "mycolumn"));
    }

    #[tokio::test]
    async fn test_save_table_replaces_previous_snapshot() {
        let store = seeded_store();
        let snapshot = SnapshotStore::open_in_memory().unwrap();
        snapshot.create_table("t").unwrap();
        snapshot
            .insert_row(
                "t",
                &SnapshotRow::from_cell(Cell::new("stale", "cf1", "c", b"x".to_vec(), 0)),
            )
            .unwrap();

        save_table(&OperationContext::new(), "t", &store, &snapshot)
            .await
            .unwrap();

        let rows = snapshot.read_all("t").unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.key != "stale"));
    }

    #[tokio::test]
    async fn test_save_missing_remote_table_is_stream_failure() {
        let store = MemoryTableStore::new();
        let snapshot = SnapshotStore::open_in_memory().unwrap();

        let err = save_table(&OperationContext::new(), "ghost", &store, &snapshot)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Stream { ref table, .. } if table == "ghost"));
    }

    #[tokio::test]
    async fn test_save_with_expired_context_touches_nothing() {
        let store = seeded_store();
        let snapshot = SnapshotStore::open_in_memory().unwrap();
        let ctx = OperationContext::new();
        ctx.cancel();

        let err = save_table(&ctx, "t", &store, &snapshot).await.unwrap_err();
        assert!(matches!(err, SyncError::ContextExpired { .. }));
        assert!(snapshot.list_user_tables().unwrap().is_empty());
    }
}
