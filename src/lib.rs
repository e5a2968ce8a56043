// ABOUTME: Library module for table-snapshot-sync
// ABOUTME: Exports the save/restore engine, store interfaces and commands

pub mod cell;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod snapshot;
pub mod store;
pub mod sync;
pub mod utils;

pub use cell::Cell;
pub use context::OperationContext;
pub use error::{Result, StoreError, SyncError, WriteFailure};
pub use snapshot::{SnapshotRow, SnapshotStore};
pub use sync::{restore, save_all, SyncSummary};
