//! Key-value persistence for uploaded CSV text and user preferences.
//!
//! Everything is stored as plain strings under fixed keys:
//! - Raw CSV text per dataset, plus upload metadata
//! - Hidden, isolated and picklist team lists as JSON arrays
//! - Scouting cursors, isolate mode, column and filter selections
//!
//! Derived statistics are never stored; they are recomputed from a
//! [`Snapshot`] on every read.

mod file;
mod memory;
mod scout;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use scout::{CursorKind, DatasetMeta, ScoutStore, Snapshot};

use std::path::PathBuf;
use thiserror::Error;

use crate::ingest::IngestError;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Upload rejected: {0}")]
    Rejected(#[from] IngestError),
}

/// A string-keyed store of string values.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Keys are used as file names, so only a safe subset is accepted.
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
