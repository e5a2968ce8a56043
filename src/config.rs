// ABOUTME: Optional TOML configuration for save/restore runs
// ABOUTME: Batch size and run-wide timeout, overridable from the command line

use crate::context::OperationContext;
use crate::sync::DEFAULT_BATCH_SIZE;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Tunables for a run
///
/// ```toml
/// batch_size = 100
/// timeout_secs = 600
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Mutations per bulk-apply call during restore
    pub batch_size: usize,
    /// Deadline for the whole run; none means no deadline
    pub timeout_secs: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_secs: None,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.timeout_secs == Some(0) {
            bail!("timeout_secs must be greater than 0 when set");
        }
        Ok(())
    }

    /// Apply command-line overrides on top of file values
    pub fn with_overrides(mut self, batch_size: Option<usize>, timeout_secs: Option<u64>) -> Self {
        if let Some(batch_size) = batch_size {
            self.batch_size = batch_size;
        }
        if timeout_secs.is_some() {
            self.timeout_secs = timeout_secs;
        }
        self
    }

    /// Build the operation context for a run starting now
    pub fn operation_context(&self) -> OperationContext {
        match self.timeout_secs {
            Some(secs) => OperationContext::with_timeout(Duration::from_secs(secs)),
            None => OperationContext::new(),
        }
    }
}

pub fn parse_config(content: &str) -> Result<SyncConfig> {
    let config: SyncConfig = toml::from_str(content).context("Failed to parse config")?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_config_from_file(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config file {}", path.display()))
}
