// ABOUTME: Command implementations behind the CLI verbs
// ABOUTME: Exports save and restore plus shared path/summary helpers

pub mod restore;
pub mod save;

pub use restore::restore;
pub use save::save;

use crate::sync::SyncSummary;
use crate::utils::sanitize_identifier;
use std::path::{Path, PathBuf};

/// Snapshot path used when none is given: `<store file stem>.db` next to the store file
pub fn default_db_path(store_path: &Path) -> PathBuf {
    let stem = store_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    store_path.with_file_name(format!("{}.db", stem))
}

fn log_summary(verb: &str, summary: &SyncSummary) {
    tracing::info!("");
    tracing::info!("========================================");
    tracing::info!("{} Summary", verb);
    tracing::info!("========================================");
    for table in &summary.tables {
        tracing::info!("  {}: {} rows", sanitize_identifier(&table.table), table.rows);
    }
    tracing::info!("Total tables: {}", summary.tables.len());
    tracing::info!("Total rows: {}", summary.total_rows());
    tracing::info!("========================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_path() {
        assert_eq!(
            default_db_path(Path::new("/data/local.json")),
            PathBuf::from("/data/local.db")
        );
        assert_eq!(
            default_db_path(Path::new("emulator")),
            PathBuf::from("emulator.db")
        );
    }
}
