//! Filesystem-backed store: one file per key.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use super::{check_key, KeyValueStore, StorageConfig, StorageError};

/// Stores each key as `<data_dir>/store/<key>`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            dir: config.store_dir(),
        }
    }

    fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.dir.join(key))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temp file and renames it into place.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;
        self.ensure_dir()?;

        let tmp = self.dir.join(format!("{key}.tmp"));
        let mut writer = BufWriter::new(File::create(&tmp)?);
        writer.write_all(value.as_bytes())?;
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, &path)?;

        debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> FileStore {
        FileStore::new(&StorageConfig::new(temp_dir.path().to_path_buf()))
    }

    #[test]
    fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.set("csvText", "Team Number\n226\n").unwrap();
        assert_eq!(
            store.get("csvText").unwrap().as_deref(),
            Some("Team Number\n226\n")
        );
        assert!(temp_dir.path().join("store/csvText").exists());
    }

    #[test]
    fn test_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.set("picklist", "[\"226\"]").unwrap();
        store.set("picklist", "[]").unwrap();
        assert_eq!(store.get("picklist").unwrap().as_deref(), Some("[]"));
        assert!(!temp_dir.path().join("store/picklist.tmp").exists());
    }

    #[test]
    fn test_get_missing() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(store(&temp_dir).get("csvText").unwrap(), None);
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.set("csvText", "x").unwrap();
        store.remove("csvText").unwrap();
        assert_eq!(store.get("csvText").unwrap(), None);
        // Removing again is a no-op
        store.remove("csvText").unwrap();
    }

    #[test]
    fn test_rejects_path_keys() {
        let temp_dir = TempDir::new().unwrap();
        let err = store(&temp_dir).set("../escape", "x").unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
