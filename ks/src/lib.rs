//! KvStore - single-slot key-value byte storage
//!
//! Values are opaque byte blobs addressed by a short string key. Each write
//! replaces the whole value for its key; there are no partial writes.
//!
//! # Architecture
//!
//! ```text
//! {store_dir}/
//! ├── .lock                  # advisory lock held during writes
//! ├── mindflow-tasks         # one file per key, named by the key
//! └── ...
//! ```
//!
//! # Example
//!
//! ```ignore
//! use kvstore::{FileStore, KeyValueStore};
//!
//! let store = FileStore::open("~/.local/share/mindflow")?;
//! store.set("mindflow-tasks", b"[]")?;
//! assert_eq!(store.get("mindflow-tasks")?, Some(b"[]".to_vec()));
//! ```

mod error;
mod memory;
mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::FileStore;

/// Byte-oriented key-value storage
///
/// Implementations must make `set` atomic per key: a concurrent or later
/// `get` observes either the previous value or the new one, never a mix.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Remove the value stored under `key`; missing keys are not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Check that a key is usable as a file name on every platform
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
