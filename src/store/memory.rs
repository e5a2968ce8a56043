// ABOUTME: In-process table store with optional JSON state file
// ABOUTME: Serves as a local emulator for the CLI and as the test backend

use super::{ApplyOutcome, Mutation, ReadItem, Row, TableAdmin, TableData, TableHandle};
use crate::cell::Cell;
use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredVersion {
    column: String,
    timestamp: i64,
    value: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredTable {
    families: BTreeSet<String>,
    /// row key -> family -> versions sorted by (column asc, timestamp desc)
    rows: BTreeMap<String, BTreeMap<String, Vec<StoredVersion>>>,
}

impl StoredTable {
    fn set(&mut self, key: &str, mutation: &Mutation) {
        let versions = self
            .rows
            .entry(key.to_string())
            .or_default()
            .entry(mutation.family.clone())
            .or_default();

        match versions
            .iter_mut()
            .find(|v| v.column == mutation.column && v.timestamp == mutation.timestamp)
        {
            Some(existing) => existing.value = mutation.value.clone(),
            None => {
                versions.push(StoredVersion {
                    column: mutation.column.clone(),
                    timestamp: mutation.timestamp,
                    value: mutation.value.clone(),
                });
                versions.sort_by(|a, b| {
                    a.column
                        .cmp(&b.column)
                        .then_with(|| b.timestamp.cmp(&a.timestamp))
                });
            }
        }
    }

    fn to_row(key: &str, families: &BTreeMap<String, Vec<StoredVersion>>) -> Row {
        let mut row = Row::new(key);
        for (family, versions) in families {
            for version in versions {
                row.push(
                    family.clone(),
                    ReadItem {
                        row: key.to_string(),
                        column: format!("{}:{}", family, version.column),
                        timestamp: version.timestamp,
                        value: version.value.clone(),
                    },
                );
            }
        }
        row
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    tables: BTreeMap<String, StoredTable>,
}

/// Table store kept in memory
///
/// Cloning is cheap and clones share the same state, so one instance can be
/// handed out as both the admin and the data client.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    state: Arc<RwLock<StoreState>>,
    bulk_calls: Arc<AtomicUsize>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load store state from a JSON file written by [`MemoryTableStore::persist`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        tracing::debug!("Loading table store state from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let state: StoreState = serde_json::from_str(&content)?;
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            bulk_calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Write the current store state to a JSON file
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let content = {
            let state = self.read_state()?;
            serde_json::to_string_pretty(&*state)?
        };
        std::fs::write(path, content)?;
        tracing::debug!("Persisted table store state to {}", path.display());
        Ok(())
    }

    /// Create a table with the given column families, replacing any existing one
    pub fn create_table<I, S>(&self, name: &str, families: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.write_state()?;
        state.tables.insert(
            name.to_string(),
            StoredTable {
                families: families.into_iter().map(Into::into).collect(),
                rows: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Write cells directly, bypassing the bulk-apply path
    pub fn insert_cells(&self, table: &str, cells: &[Cell]) -> Result<(), StoreError> {
        let mut state = self.write_state()?;
        let stored = state
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        for cell in cells {
            if !stored.families.contains(&cell.family) {
                return Err(StoreError::Backend(format!(
                    "unknown column family '{}' in table '{}'",
                    cell.family, table
                )));
            }
            let mutation =
                Mutation::set_cell(&cell.family, &cell.column, cell.timestamp, cell.value.clone());
            stored.set(&cell.row_key, &mutation);
        }
        Ok(())
    }

    /// Every cell of a table, sorted
    pub fn cells(&self, table: &str) -> Result<Vec<Cell>, StoreError> {
        let state = self.read_state()?;
        let stored = state
            .tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;

        let mut cells: Vec<Cell> = stored
            .rows
            .iter()
            .flat_map(|(key, families)| {
                families.iter().flat_map(move |(family, versions)| {
                    versions.iter().map(move |v| {
                        Cell::new(
                            key.clone(),
                            family.clone(),
                            v.column.clone(),
                            v.value.clone(),
                            v.timestamp,
                        )
                    })
                })
            })
            .collect();
        cells.sort();
        Ok(cells)
    }

    /// Number of `apply_bulk` calls served so far, across all handles
    pub fn bulk_apply_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("table store lock poisoned".to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, StoreState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("table store lock poisoned".to_string()))
    }
}

#[async_trait(?Send)]
impl TableAdmin for MemoryTableStore {
    async fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let state = self.read_state()?;
        Ok(state.tables.keys().cloned().collect())
    }

    async fn drop_all_rows(&self, table: &str) -> Result<(), StoreError> {
        let mut state = self.write_state()?;
        let stored = state
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        stored.rows.clear();
        Ok(())
    }
}

impl TableData for MemoryTableStore {
    type Handle = MemoryTableHandle;

    fn open_table(&self, name: &str) -> MemoryTableHandle {
        MemoryTableHandle {
            name: name.to_string(),
            store: self.clone(),
        }
    }
}

/// Handle to one table of a [`MemoryTableStore`]
#[derive(Debug, Clone)]
pub struct MemoryTableHandle {
    name: String,
    store: MemoryTableStore,
}

#[async_trait(?Send)]
impl TableHandle for MemoryTableHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_rows(&self, visitor: &mut dyn FnMut(Row) -> bool) -> Result<(), StoreError> {
        let state = self.store.read_state()?;
        let stored = state
            .tables
            .get(&self.name)
            .ok_or_else(|| StoreError::TableNotFound(self.name.clone()))?;

        for (key, families) in &stored.rows {
            let row = StoredTable::to_row(key, families);
            if row.is_empty() {
                continue;
            }
            if !visitor(row) {
                break;
            }
        }
        Ok(())
    }

    async fn apply_bulk(
        &self,
        keys: &[String],
        mutations: &[Mutation],
    ) -> Result<Vec<ApplyOutcome>, StoreError> {
        self.store.bulk_calls.fetch_add(1, Ordering::SeqCst);

        if keys.len() != mutations.len() {
            return Err(StoreError::Backend(format!(
                "mismatched bulk apply: {} keys, {} mutations",
                keys.len(),
                mutations.len()
            )));
        }

        let mut state = self.store.write_state()?;
        let stored = state
            .tables
            .get_mut(&self.name)
            .ok_or_else(|| StoreError::TableNotFound(self.name.clone()))?;

        let outcomes = keys
            .iter()
            .zip(mutations)
            .map(|(key, mutation)| {
                if stored.families.contains(&mutation.family) {
                    stored.set(key, mutation);
                    ApplyOutcome::Applied
                } else {
                    ApplyOutcome::Failed(format!(
                        "unknown column family '{}'",
                        mutation.family
                    ))
                }
            })
            .collect();

        Ok(outcomes)
    }
}
