//! Identifier generation and resolution
//!
//! Task and subtask ids are opaque strings. Production code uses UUIDv7;
//! tests inject `SequentialIds` to get predictable values.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a Task
pub type TaskId = String;

/// Identifier of a SubTask
pub type SubTaskId = String;

/// Number of trailing characters shown as a short id
pub const SHORT_ID_LEN: usize = 8;

/// Source of fresh, never-reused identifiers
pub trait IdGenerator: Send + Sync {
    /// Produce a new unique opaque id
    fn next_id(&self) -> String;
}

/// UUIDv7 ids
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::now_v7().to_string()
    }
}

/// Deterministic ids of the form `{prefix}-{n}`, starting at 1
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

/// Short display form of an id (its last `SHORT_ID_LEN` characters)
pub fn short_id(id: &str) -> &str {
    let start = id
        .char_indices()
        .rev()
        .nth(SHORT_ID_LEN - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &id[start..]
}

/// Resolves a user-typed reference to one id out of a candidate set
pub struct IdResolver<'a> {
    ids: Vec<&'a str>,
}

impl<'a> IdResolver<'a> {
    pub fn new(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Resolve a partial reference to a full ID
    ///
    /// Returns:
    /// - Ok(Some(id)) if exactly one match (an exact match always wins)
    /// - Ok(None) if no matches
    /// - Err with candidates if ambiguous
    pub fn resolve(&self, reference: &str) -> Result<Option<&'a str>, Vec<&'a str>> {
        if reference.is_empty() {
            return Ok(None);
        }
        if let Some(exact) = self.ids.iter().find(|id| **id == reference) {
            return Ok(Some(*exact));
        }

        let matches: Vec<&'a str> = self
            .ids
            .iter()
            .filter(|id| id.contains(reference))
            .copied()
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.first().copied()),
            _ => Err(matches),
        }
    }
}
