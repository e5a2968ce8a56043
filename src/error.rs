// ABOUTME: Error taxonomy for the save/restore engine
// ABOUTME: Every table-scoped failure carries the table name it aborted

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Failures reported by either store (remote tables or local snapshot)
#[derive(Debug, Error)]
pub enum StoreError {
    /// Table does not exist in the store
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// `SQLite` error from the snapshot file
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Any other backend failure
    #[error("store backend error: {0}")]
    Backend(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Ways a write can fail, on either side of the pipeline
#[derive(Debug, Error)]
pub enum WriteFailure {
    /// Inserting a snapshot row failed
    #[error("failed to save row '{key}': {source}")]
    Insert {
        key: String,
        #[source]
        source: StoreError,
    },

    /// The bulk-apply call itself failed
    #[error("bulk apply call failed: {0}")]
    BulkCall(#[source] StoreError),

    /// The call succeeded but at least one item was rejected
    #[error("bulk apply rejected {failed} item(s), first at index {index} (row '{key}'): {message}")]
    BulkItem {
        index: usize,
        key: String,
        failed: usize,
        message: String,
    },
}

/// Errors that abort a `save` or `restore` run
#[derive(Debug, Error)]
pub enum SyncError {
    /// Enumerating remote or snapshot tables failed
    #[error("failed to list tables: {0}")]
    List(#[source] StoreError),

    /// Dropping rows (remote) or a snapshot table (local) failed
    #[error("failed to clear table '{table}': {source}")]
    Clear {
        table: String,
        #[source]
        source: StoreError,
    },

    /// Creating the snapshot table failed
    #[error("failed to create snapshot table '{table}': {source}")]
    Schema {
        table: String,
        #[source]
        source: StoreError,
    },

    /// Row iteration failed on either store
    #[error("failure while iterating rows of '{table}': {source}")]
    Stream {
        table: String,
        #[source]
        source: StoreError,
    },

    /// A snapshot row does not match its recorded checksum
    #[error(
        "integrity check failed for row '{key}' in '{table}': stored checksum={stored}, computed={computed}"
    )]
    ChecksumMismatch {
        table: String,
        key: String,
        stored: u32,
        computed: u32,
    },

    /// Inserting into the snapshot or bulk-applying to the store failed
    #[error("failed to write table '{table}': {source}")]
    Write {
        table: String,
        #[source]
        source: WriteFailure,
    },

    /// The caller's context was already expired when a store call was attempted
    #[error("operation context expired before {during}")]
    ContextExpired { during: String },
}

impl SyncError {
    /// Table the failure is scoped to, if any
    pub fn table(&self) -> Option<&str> {
        match self {
            SyncError::Clear { table, .. }
            | SyncError::Schema { table, .. }
            | SyncError::Stream { table, .. }
            | SyncError::ChecksumMismatch { table, .. }
            | SyncError::Write { table, .. } => Some(table),
            SyncError::List(_) | SyncError::ContextExpired { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_mismatch_message_carries_both_values() {
        let err = SyncError::ChecksumMismatch {
            table: "users".to_string(),
            key: "row-1".to_string(),
            stored: 12,
            computed: 34,
        };
        let msg = err.to_string();
        assert!(msg.contains("stored checksum=12"));
        assert!(msg.contains("computed=34"));
        assert_eq!(err.table(), Some("users"));
    }

    #[test]
    fn test_bulk_item_failure_message() {
        let err = SyncError::Write {
            table: "events".to_string(),
            source: WriteFailure::BulkItem {
                index: 3,
                key: "k3".to_string(),
                failed: 2,
                message: "unknown column family 'x'".to_string(),
            },
        };
        let msg = format!("{}", err);
        assert!(msg.contains("events"));
        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("index 3"));
        assert!(source.contains("'k3'"));
        assert!(source.contains("2 item(s)"));
    }

    #[test]
    fn test_list_failure_has_no_table() {
        let err = SyncError::List(StoreError::Backend("unavailable".to_string()));
        assert_eq!(err.table(), None);
    }
}
