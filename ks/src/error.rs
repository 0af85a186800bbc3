//! KvStore error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during key-value operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
