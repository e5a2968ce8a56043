// ABOUTME: Restore pipeline - replays a snapshot table into the remote store
// ABOUTME: Verifies every checksum and writes through bounded bulk-apply batches

use super::batch::MutationBatch;
use crate::context::OperationContext;
use crate::error::{Result, StoreError, SyncError, WriteFailure};
use crate::snapshot::SnapshotStore;
use crate::store::{ApplyOutcome, Mutation, TableData, TableHandle};
use crate::utils::sanitize_identifier;

/// Restore one snapshot table into the same-named remote table
///
/// Rows are read in the snapshot's storage order. Each row's checksum is
/// recomputed before it is queued; a mismatch aborts immediately, so the
/// corrupted row and everything after it are never written. Verified cells
/// are flushed whenever `batch_size` of them have accumulated, and once more
/// at the end for the remainder.
///
/// The remote table is expected to have been cleared already.
///
/// # Returns
///
/// Number of cells restored.
pub async fn restore_table<D: TableData>(
    ctx: &OperationContext,
    table: &str,
    data: &D,
    snapshot: &SnapshotStore,
    batch_size: usize,
) -> Result<usize> {
    tracing::info!("Restoring '{}' table...", sanitize_identifier(table));

    let stream_error = |source: StoreError| SyncError::Stream {
        table: table.to_string(),
        source,
    };

    ctx.check(|| format!("reading snapshot table '{}'", table))?;
    let handle = data.open_table(table);
    let mut scan = snapshot.scan(table).map_err(stream_error)?;

    let mut batch = MutationBatch::new(batch_size);
    let mut restored = 0usize;

    for row in scan.rows().map_err(stream_error)? {
        let row = row.map_err(stream_error)?;

        let computed = row.computed_checksum();
        if computed != row.checksum {
            tracing::error!(
                "✗ Integrity check failed for row '{}' in '{}'",
                sanitize_identifier(&row.key),
                sanitize_identifier(table)
            );
            return Err(SyncError::ChecksumMismatch {
                table: table.to_string(),
                key: row.key,
                stored: row.checksum,
                computed,
            });
        }

        let mutation = Mutation::set_cell(row.column_family, row.column, row.timestamp, row.value);
        batch.push(row.key, mutation);
        restored += 1;

        if batch.is_full() {
            flush(ctx, &handle, table, batch.take()).await?;
        }
    }

    if !batch.is_empty() {
        flush(ctx, &handle, table, batch.take()).await?;
    }

    tracing::info!(
        "✓ Restored {} rows for '{}'",
        restored,
        sanitize_identifier(table)
    );
    Ok(restored)
}

/// Send one batch as a single bulk-apply call
///
/// Items applied before a rejected item stay applied; nothing is rolled back.
async fn flush<H: TableHandle>(
    ctx: &OperationContext,
    handle: &H,
    table: &str,
    batch: MutationBatch,
) -> Result<()> {
    ctx.check(|| format!("writing a batch to '{}'", table))?;

    tracing::debug!(
        "Applying batch of {} mutations to '{}'",
        batch.len(),
        sanitize_identifier(handle.name())
    );

    let outcomes = handle
        .apply_bulk(batch.keys(), batch.mutations())
        .await
        .map_err(|source| SyncError::Write {
            table: table.to_string(),
            source: WriteFailure::BulkCall(source),
        })?;

    let failed = outcomes.iter().filter(|outcome| outcome.is_failed()).count();
    let first_failure = outcomes
        .iter()
        .enumerate()
        .find_map(|(index, outcome)| match outcome {
            ApplyOutcome::Failed(message) => Some((index, message)),
            ApplyOutcome::Applied => None,
        });

    if let Some((index, message)) = first_failure {
        let key = batch.keys().get(index).cloned().unwrap_or_default();
        return Err(SyncError::Write {
            table: table.to_string(),
            source: WriteFailure::BulkItem {
                index,
                key,
                failed,
                message: message.clone(),
            },
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::snapshot::SnapshotRow;
    use crate::store::MemoryTableStore;

    fn snapshot_with(table: &str, cells: &[Cell]) -> SnapshotStore {
        let snapshot = SnapshotStore::open_in_memory().unwrap();
        snapshot.create_table(table).unwrap();
        let mut writer = snapshot.writer(table).unwrap();
        for cell in cells {
            writer.insert(&SnapshotRow::from_cell(cell.clone())).unwrap();
        }
        drop(writer);
        snapshot
    }

    fn cells(n: usize) -> Vec<Cell> {
        (0..n)
            .map(|i| Cell::new(format!("row{:04}", i), "cf", "c", vec![i as u8], i as i64 * 1_000))
            .collect()
    }

    fn empty_store() -> MemoryTableStore {
        let store = MemoryTableStore::new();
        store.create_table("t", ["cf"]).unwrap();
        store
    }

    #[tokio::test]
    async fn test_restore_table_writes_all_cells() {
        let source = cells(5);
        let snapshot = snapshot_with("t", &source);
        let store = empty_store();

        let restored = restore_table(&OperationContext::new(), "t", &store, &snapshot, 100)
            .await
            .unwrap();

        assert_eq!(restored, 5);
        assert_eq!(store.cells("t").unwrap(), source);
        assert_eq!(store.bulk_apply_calls(), 1);
    }

    #[tokio::test]
    async fn test_batch_boundaries() {
        for (n, expected_calls) in [(99, 1), (100, 1), (101, 2), (250, 3)] {
            let snapshot = snapshot_with("t", &cells(n));
            let store = empty_store();

            let restored = restore_table(&OperationContext::new(), "t", &store, &snapshot, 100)
                .await
                .unwrap();

            assert_eq!(restored, n);
            assert_eq!(
                store.bulk_apply_calls(),
                expected_calls,
                "{} cells should need {} bulk calls",
                n,
                expected_calls
            );
        }
    }

    #[tokio::test]
    async fn test_empty_snapshot_makes_no_calls() {
        let snapshot = snapshot_with("t", &[]);
        let store = empty_store();

        let restored = restore_table(&OperationContext::new(), "t", &store, &snapshot, 100)
            .await
            .unwrap();
        assert_eq!(restored, 0);
        assert_eq!(store.bulk_apply_calls(), 0);
    }

    #[tokio::test]
    async fn test_checksum_mismatch_halts_before_writing() {
        let snapshot = snapshot_with("t", &cells(150));
        snapshot
            .connection()
            .execute(
                r#"UPDATE "t" SET "value" = X'FF' WHERE "key" = 'row0120'"#,
                [],
            )
            .unwrap();
        let store = empty_store();

        let err = restore_table(&OperationContext::new(), "t", &store, &snapshot, 100)
            .await
            .unwrap_err();

        match err {
            SyncError::ChecksumMismatch {
                table,
                key,
                stored,
                computed,
            } => {
                assert_eq!(table, "t");
                assert_eq!(key, "row0120");
                assert_ne!(stored, computed);
            }
            other => panic!("expected checksum mismatch, got {:?}", other),
        }

        // First full batch went out, nothing at or after the corrupted row did
        let written = store.cells("t").unwrap();
        assert_eq!(written.len(), 100);
        assert!(written.iter().all(|c| c.row_key.as_str() < "row0100"));
    }

    #[tokio::test]
    async fn test_per_item_failure_reports_first_index() {
        let mut source = cells(4);
        source[2].family = "nope".to_string();
        source[3].family = "nope".to_string();
        let snapshot = snapshot_with("t", &source);
        let store = empty_store();

        let err = restore_table(&OperationContext::new(), "t", &store, &snapshot, 100)
            .await
            .unwrap_err();

        match err {
            SyncError::Write {
                source:
                    WriteFailure::BulkItem {
                        index, key, failed, ..
                    },
                ..
            } => {
                assert_eq!(index, 2);
                assert_eq!(key, "row0002");
                assert_eq!(failed, 2);
            }
            other => panic!("expected per-item failure, got {:?}", other),
        }

        // Items before the rejected ones stay applied
        assert_eq!(store.cells("t").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_remote_table_is_call_failure() {
        let snapshot = snapshot_with("t", &cells(3));
        let store = MemoryTableStore::new();

        let err = restore_table(&OperationContext::new(), "t", &store, &snapshot, 100)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::Write {
                source: WriteFailure::BulkCall(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_expired_context_blocks_flush() {
        let snapshot = snapshot_with("t", &cells(3));
        let store = empty_store();
        let ctx = OperationContext::new();
        ctx.cancel();

        let err = restore_table(&ctx, "t", &store, &snapshot, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::ContextExpired { .. }));
        assert_eq!(store.bulk_apply_calls(), 0);
    }
}
