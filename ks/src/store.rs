//! File-backed store: one file per key

use fs2::FileExt;
use log::{debug, info};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::{KeyValueStore, StoreError, validate_key};

const LOCK_FILE: &str = ".lock";

/// A `KeyValueStore` that keeps each key in its own file under a directory
///
/// Writes go to a hidden temp file that is renamed over the target, so readers
/// never observe a half-written value. Writers serialize on an advisory lock.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open or create a store at the given directory
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| StoreError::io(&base_path, e))?;
        debug!("Opened file store at {}", base_path.display());
        Ok(Self { base_path })
    }

    /// Directory holding the store's files
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the file backing `key`
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    fn lock(&self) -> Result<File, StoreError> {
        let lock_path = self.base_path.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StoreError::io(&lock_path, e))?;
        file.lock_exclusive().map_err(|e| StoreError::io(&lock_path, e))?;
        Ok(file)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        let path = self.key_path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        let lock = self.lock()?;

        let path = self.key_path(key);
        let tmp = self.base_path.join(format!(".{}.tmp", key));
        let mut f = File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
        f.write_all(value).map_err(|e| StoreError::io(&tmp, e))?;
        f.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))?;

        // Dropping the handle releases the lock as well; unlock explicitly so
        // the release is not tied to drop order.
        let _ = lock.unlock();
        info!("Wrote {} bytes to key {}", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let lock = self.lock()?;
        let path = self.key_path(key);
        let result = match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        };
        let _ = lock.unlock();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        assert_eq!(store.get("slot").unwrap(), None);

        store.set("slot", b"first").unwrap();
        assert_eq!(store.get("slot").unwrap(), Some(b"first".to_vec()));

        store.set("slot", b"second").unwrap();
        assert_eq!(store.get("slot").unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn test_value_survives_reopen() {
        let temp = TempDir::new().unwrap();
        FileStore::open(temp.path()).unwrap().set("slot", b"kept").unwrap();

        let reopened = FileStore::open(temp.path()).unwrap();
        assert_eq!(reopened.get("slot").unwrap(), Some(b"kept".to_vec()));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        store.set("slot", b"value").unwrap();

        assert!(store.key_path("slot").exists());
        assert!(!temp.path().join(".slot.tmp").exists());
    }

    #[test]
    fn test_remove() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        store.set("slot", b"value").unwrap();

        store.remove("slot").unwrap();
        assert_eq!(store.get("slot").unwrap(), None);

        // Removing again is fine
        store.remove("slot").unwrap();
    }

    #[test]
    fn test_open_creates_nested_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        let store = FileStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.path(), nested.as_path());
    }

    #[test]
    fn test_invalid_key_rejected() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        assert!(matches!(store.set("../x", b"v"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.get(".lock"), Err(StoreError::InvalidKey(_))));
    }
}
