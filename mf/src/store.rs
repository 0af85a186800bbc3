//! Task store: the ordered in-memory task collection
//!
//! All mutation goes through the methods here. Every mutating method writes
//! the complete updated collection to the task slot and only then replaces
//! the in-memory one, so memory and the stored value never diverge.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{IdGenerator, IdResolver, SubTask, Task, TaskDraft, TaskId};
use crate::persistence::{PersistError, TaskSlot};

/// Errors returned by task store mutations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task title must not be empty")]
    EmptyTitle,

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Current wall-clock time in unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Ordered task collection, newest first
pub struct TaskStore {
    tasks: Vec<Task>,
    slot: TaskSlot,
    ids: Arc<dyn IdGenerator>,
}

impl TaskStore {
    /// Open the store, loading whatever the slot currently holds
    pub fn open(slot: TaskSlot, ids: Arc<dyn IdGenerator>) -> Self {
        let tasks = slot.load();
        info!(count = tasks.len(), "Opened task store");
        Self { tasks, slot, ids }
    }

    /// Current collection, newest first
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve a full or partial task id
    ///
    /// See `IdResolver::resolve` for the matching rules.
    pub fn resolve_id(&self, reference: &str) -> Result<Option<TaskId>, Vec<TaskId>> {
        let resolver = IdResolver::new(self.tasks.iter().map(|t| t.id.as_str()));
        match resolver.resolve(reference) {
            Ok(found) => Ok(found.map(str::to_string)),
            Err(candidates) => Err(candidates.into_iter().map(str::to_string).collect()),
        }
    }

    /// Build a Task from a draft, assigning fresh ids and a creation time
    ///
    /// The task is not inserted. Blank subtask titles are dropped.
    pub fn new_task(&self, draft: TaskDraft) -> Result<Task, StoreError> {
        self.new_tasks(vec![draft]).map(|mut tasks| tasks.remove(0))
    }

    /// Build several tasks sharing one creation time
    fn new_tasks(&self, drafts: Vec<TaskDraft>) -> Result<Vec<Task>, StoreError> {
        if drafts.iter().any(|d| d.title.trim().is_empty()) {
            return Err(StoreError::EmptyTitle);
        }

        let created_at = self.next_timestamp();
        Ok(drafts
            .into_iter()
            .map(|draft| Task {
                id: self.ids.next_id(),
                title: draft.title.trim().to_string(),
                description: draft.description.filter(|d| !d.trim().is_empty()),
                completed: false,
                priority: draft.priority,
                category: draft.category,
                created_at,
                subtasks: self.new_subtasks(&draft.subtasks),
            })
            .collect())
    }

    fn new_subtasks(&self, titles: &[String]) -> Vec<SubTask> {
        titles
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| SubTask::new(self.ids.next_id(), t))
            .collect()
    }

    /// Wall-clock time, never earlier than any existing task's creation time
    fn next_timestamp(&self) -> i64 {
        let newest = self.tasks.iter().map(|t| t.created_at).max().unwrap_or(i64::MIN);
        now_ms().max(newest)
    }

    /// Create a task from a draft and add it to the front
    pub fn create(&mut self, draft: TaskDraft) -> Result<Task, StoreError> {
        let task = self.new_task(draft)?;
        self.add(task.clone())?;
        Ok(task)
    }

    /// Create tasks from drafts and prepend them as one block
    ///
    /// Either every draft is inserted or none is.
    pub fn insert_drafts(&mut self, drafts: Vec<TaskDraft>) -> Result<Vec<TaskId>, StoreError> {
        let tasks = self.new_tasks(drafts)?;
        let ids = tasks.iter().map(|t| t.id.clone()).collect();
        self.add_batch(tasks)?;
        Ok(ids)
    }

    /// Prepend a task
    pub fn add(&mut self, task: Task) -> Result<(), StoreError> {
        debug!(id = %task.id, "add: called");
        let mut tasks = Vec::with_capacity(self.tasks.len() + 1);
        tasks.push(task);
        tasks.extend(self.tasks.iter().cloned());
        self.commit(tasks)
    }

    /// Prepend tasks as a contiguous block, keeping their order
    pub fn add_batch(&mut self, tasks: Vec<Task>) -> Result<(), StoreError> {
        debug!(count = tasks.len(), "add_batch: called");
        let mut tasks = tasks;
        tasks.extend(self.tasks.iter().cloned());
        self.commit(tasks)
    }

    /// Flip a task's completion flag
    ///
    /// Returns whether a task matched; a missing id is not an error.
    pub fn toggle_completion(&mut self, id: &str) -> Result<bool, StoreError> {
        debug!(%id, "toggle_completion: called");
        let mut tasks = self.tasks.clone();
        let toggled = tasks.iter_mut().find(|t| t.id == id).map(|task| {
            task.completed = !task.completed;
            task.completed
        });
        self.commit(tasks)?;
        if let Some(completed) = toggled {
            info!(%id, completed, "Toggled task");
        }
        Ok(toggled.is_some())
    }

    /// Remove a task
    ///
    /// Returns the removed task; a missing id is not an error.
    pub fn remove(&mut self, id: &str) -> Result<Option<Task>, StoreError> {
        debug!(%id, "remove: called");
        let mut tasks = self.tasks.clone();
        let removed = tasks.iter().position(|t| t.id == id).map(|idx| tasks.remove(idx));
        self.commit(tasks)?;
        if removed.is_some() {
            info!(%id, "Removed task");
        }
        Ok(removed)
    }

    /// Replace a task's subtasks wholesale
    ///
    /// Returns whether a task matched; a missing id is not an error.
    pub fn set_subtasks(&mut self, task_id: &str, subtasks: Vec<SubTask>) -> Result<bool, StoreError> {
        debug!(%task_id, count = subtasks.len(), "set_subtasks: called");
        let mut tasks = self.tasks.clone();
        let found = match tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.subtasks = subtasks;
                true
            }
            None => false,
        };
        self.commit(tasks)?;
        Ok(found)
    }

    /// Append new subtasks built from `titles` after the existing ones
    ///
    /// Duplicate titles are kept. Returns the number of subtasks appended;
    /// nothing is written when there is nothing to append.
    pub fn append_subtasks(&mut self, task_id: &str, titles: &[String]) -> Result<usize, StoreError> {
        let Some(task) = self.get(task_id) else {
            return Ok(0);
        };
        let added = self.new_subtasks(titles);
        if added.is_empty() {
            return Ok(0);
        }

        let count = added.len();
        let mut merged = task.subtasks.clone();
        merged.extend(added);
        self.set_subtasks(task_id, merged)?;
        info!(%task_id, count, "Appended subtasks");
        Ok(count)
    }

    /// Flip one subtask's completion flag
    ///
    /// Returns whether both the task and the subtask matched.
    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<bool, StoreError> {
        let Some(task) = self.get(task_id) else {
            return Ok(false);
        };
        if task.subtask(subtask_id).is_none() {
            return Ok(false);
        }

        let updated = task
            .subtasks
            .iter()
            .map(|s| {
                if s.id == subtask_id {
                    SubTask {
                        completed: !s.completed,
                        ..s.clone()
                    }
                } else {
                    s.clone()
                }
            })
            .collect();
        self.set_subtasks(task_id, updated)
    }

    /// Write `tasks` to the slot, then make it the current collection
    ///
    /// On a failed write the current collection is left as it was.
    fn commit(&mut self, tasks: Vec<Task>) -> Result<(), StoreError> {
        self.slot.save(&tasks)?;
        self.tasks = tasks;
        Ok(())
    }
}
