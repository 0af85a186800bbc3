//! Task and SubTask entities

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::id::{SubTaskId, TaskId};
use super::priority::Priority;

/// A top-level unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub completed: bool,

    pub priority: Priority,

    pub category: Category,

    /// Creation time (unix ms)
    pub created_at: i64,

    #[serde(default)]
    pub subtasks: Vec<SubTask>,
}

impl Task {
    /// Completed and total subtask counts
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        (done, self.subtasks.len())
    }

    pub fn subtask(&self, id: &str) -> Option<&SubTask> {
        self.subtasks.iter().find(|s| s.id == id)
    }
}

/// A smaller actionable item nested under a Task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: SubTaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl SubTask {
    pub fn new(id: impl Into<SubTaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
        }
    }
}

/// Everything needed to create a Task except its identity and timestamp
///
/// Both manual input and planned items become drafts; the task store turns a
/// draft into a `Task` at insertion time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: Category,
    pub subtasks: Vec<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_subtasks<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtasks = titles.into_iter().map(Into::into).collect();
        self
    }
}
