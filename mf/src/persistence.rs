//! Persistence adapter: the whole task collection in one key-value slot

use std::sync::Arc;

use kvstore::{KeyValueStore, StoreError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::Task;

/// Key of the slot holding the serialized task collection
pub const STORAGE_KEY: &str = "mindflow-tasks";

/// Errors that can occur while writing the task collection
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write task slot: {0}")]
    Store(#[from] StoreError),
}

/// Reads and writes the full task list under `STORAGE_KEY`
#[derive(Clone)]
pub struct TaskSlot {
    store: Arc<dyn KeyValueStore>,
}

impl TaskSlot {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the stored collection
    ///
    /// A missing, unreadable or unparseable value yields an empty collection.
    pub fn load(&self) -> Vec<Task> {
        debug!("load: called");
        let bytes = match self.store.get(STORAGE_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("load: no stored tasks");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "load: failed to read task slot, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<Task>>(&bytes) {
            Ok(tasks) => {
                debug!(count = tasks.len(), "load: loaded tasks");
                tasks
            }
            Err(e) => {
                warn!(error = %e, "load: stored tasks are corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the stored collection with `tasks`
    pub fn save(&self, tasks: &[Task]) -> Result<(), PersistError> {
        debug!(count = tasks.len(), "save: called");
        let bytes = serde_json::to_vec(tasks)?;
        self.store.set(STORAGE_KEY, &bytes)?;
        Ok(())
    }
}
