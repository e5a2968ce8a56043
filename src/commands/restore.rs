// ABOUTME: Restore command implementation - replace the table store with a snapshot
// ABOUTME: Confirms the destructive clear, restores, then persists the store state

use crate::config::SyncConfig;
use crate::snapshot::SnapshotStore;
use crate::store::MemoryTableStore;
use crate::sync;
use anyhow::{bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::path::Path;

/// Restore a snapshot file into the table store
///
/// Every remote table is cleared before any data is written, so the store
/// ends up holding exactly what the snapshot holds. The updated store state
/// is written back to `store_path` only after the whole restore succeeds.
///
/// # Arguments
///
/// * `store_path` - JSON state file of the table store
/// * `db_path` - SQLite snapshot file to read (must exist)
/// * `config` - Run configuration
/// * `skip_confirmation` - Do not prompt before clearing remote tables
///
/// # Errors
///
/// Returns an error if the snapshot is missing, the user declines, or any
/// table fails to clear, verify or write.
pub async fn restore(
    store_path: &Path,
    db_path: &Path,
    config: &SyncConfig,
    skip_confirmation: bool,
) -> Result<()> {
    tracing::info!("Starting restore...");
    tracing::info!("  Snapshot:    {}", db_path.display());
    tracing::info!("  Table store: {}", store_path.display());

    if !db_path.exists() {
        bail!(
            "Snapshot file {} does not exist.\n\
             Run 'save' first or pass --db with the path of an existing snapshot.",
            db_path.display()
        );
    }

    let store = MemoryTableStore::load(store_path)
        .with_context(|| format!("Failed to open table store {}", store_path.display()))?;
    let snapshot = SnapshotStore::open(db_path)
        .with_context(|| format!("Failed to open {}", db_path.display()))?;

    if !skip_confirmation && !confirm_restore(store_path)? {
        tracing::warn!("⚠ User cancelled restore");
        bail!("Restore cancelled by user");
    }

    let ctx = config.operation_context();
    let summary = sync::restore(&ctx, &store, &store, &snapshot, config.batch_size)
        .await
        .context("Failed to restore")?;

    store
        .persist(store_path)
        .with_context(|| format!("Failed to write table store {}", store_path.display()))?;

    super::log_summary("Restore", &summary);
    tracing::info!("✓ Restore complete");
    Ok(())
}

fn confirm_restore(store_path: &Path) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "This deletes every row of every table in {} before restoring. Continue?",
            store_path.display()
        ))
        .default(false)
        .interact()
        .context("Failed to get confirmation")
}
