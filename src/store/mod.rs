// ABOUTME: Interfaces to the remote wide-column table store
// ABOUTME: Admin listing/clearing, row streaming and bulk mutation apply

pub mod memory;

pub use memory::MemoryTableStore;

use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// One cell version as streamed by the table store
///
/// `column` may be qualified with its family (`family:column`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadItem {
    pub row: String,
    pub column: String,
    pub timestamp: i64,
    pub value: Vec<u8>,
}

/// One streamed row: its key and the items of each column family
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    key: String,
    families: BTreeMap<String, Vec<ReadItem>>,
}

impl Row {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            families: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn push(&mut self, family: impl Into<String>, item: ReadItem) {
        self.families.entry(family.into()).or_default().push(item);
    }

    /// Items grouped by column family, families in lexicographic order
    pub fn families(&self) -> impl Iterator<Item = (&str, &[ReadItem])> {
        self.families
            .iter()
            .map(|(family, items)| (family.as_str(), items.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.families.values().all(Vec::is_empty)
    }
}

/// A pending write of one cell version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub family: String,
    pub column: String,
    pub timestamp: i64,
    pub value: Vec<u8>,
}

impl Mutation {
    pub fn set_cell(
        family: impl Into<String>,
        column: impl Into<String>,
        timestamp: i64,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            family: family.into(),
            column: column.into(),
            timestamp,
            value: value.into(),
        }
    }
}

/// Result of one item inside a bulk apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Failed(String),
}

impl ApplyOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ApplyOutcome::Failed(_))
    }
}

/// Administrative operations on the table store
#[async_trait(?Send)]
pub trait TableAdmin {
    /// Names of every table in the instance, in no particular order
    async fn list_tables(&self) -> Result<Vec<String>, StoreError>;

    /// Delete every row of a table, keeping the table and its families
    async fn drop_all_rows(&self, table: &str) -> Result<(), StoreError>;
}

/// Data-plane access to the table store
pub trait TableData {
    type Handle: TableHandle;

    fn open_table(&self, name: &str) -> Self::Handle;
}

/// An opened table
#[async_trait(?Send)]
pub trait TableHandle {
    fn name(&self) -> &str;

    /// Stream every row across the full key range, in key order
    ///
    /// The visitor returns `false` to stop the stream; no further rows are
    /// delivered after that and the call returns `Ok(())`.
    async fn read_rows(&self, visitor: &mut dyn FnMut(Row) -> bool) -> Result<(), StoreError>;

    /// Apply `mutations[i]` to row `keys[i]` for every `i`
    ///
    /// A call-level error means nothing can be assumed about the batch.
    /// Otherwise one outcome is returned per item, in order. Items are not
    /// applied atomically: earlier items stay applied when a later one fails.
    async fn apply_bulk(
        &self,
        keys: &[String],
        mutations: &[Mutation],
    ) -> Result<Vec<ApplyOutcome>, StoreError>;
}
