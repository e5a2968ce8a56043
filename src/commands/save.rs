// ABOUTME: Save command implementation - dump the table store to a snapshot file
// ABOUTME: Opens both stores, runs the save pipeline and reports per-table counts

use crate::config::SyncConfig;
use crate::snapshot::SnapshotStore;
use crate::store::MemoryTableStore;
use crate::sync;
use anyhow::{Context, Result};
use std::path::Path;

/// Save every table of the table store into a snapshot file
///
/// Each snapshot table is dropped and recreated, so running this twice on an
/// unchanged store produces the same snapshot.
///
/// # Arguments
///
/// * `store_path` - JSON state file of the table store
/// * `db_path` - SQLite snapshot file (created if missing)
/// * `config` - Run configuration
///
/// # Errors
///
/// Returns an error if either store cannot be opened or any table fails to save.
///
/// # Examples
///
/// ```no_run
/// # use anyhow::Result;
/// # use std::path::Path;
/// # use table_snapshot_sync::{commands::save, config::SyncConfig};
/// # async fn example() -> Result<()> {
/// save(Path::new("local.json"), Path::new("local.db"), &SyncConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn save(store_path: &Path, db_path: &Path, config: &SyncConfig) -> Result<()> {
    tracing::info!("Starting save...");
    tracing::info!("  Table store: {}", store_path.display());
    tracing::info!("  Snapshot:    {}", db_path.display());

    let store = MemoryTableStore::load(store_path)
        .with_context(|| format!("Failed to open table store {}", store_path.display()))?;
    let snapshot = SnapshotStore::open(db_path)
        .with_context(|| format!("Failed to open {}", db_path.display()))?;

    let ctx = config.operation_context();
    let summary = sync::save_all(&ctx, &store, &store, &snapshot)
        .await
        .context("Failed to save")?;

    super::log_summary("Save", &summary);
    tracing::info!("✓ Save complete");
    Ok(())
}
