//! Plan shapes returned by the planning client, and their output schemas

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::{Category, Priority, TaskDraft};

/// A goal broken down into tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub tasks: Vec<PlannedTask>,
}

/// One task of a plan, without identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub priority: Priority,

    pub category: Category,

    #[serde(default)]
    pub subtasks: Vec<String>,
}

impl Plan {
    /// Parse model output into a plan
    ///
    /// Every task needs a non-blank title; enum values must match exactly.
    pub fn parse(text: &str) -> Result<Self, String> {
        let plan: Plan = serde_json::from_str(text.trim()).map_err(|e| e.to_string())?;
        if let Some(idx) = plan.tasks.iter().position(|t| t.title.trim().is_empty()) {
            return Err(format!("task {} has an empty title", idx));
        }
        Ok(plan)
    }

    /// Drafts in plan order, ready for the task store
    pub fn into_drafts(self) -> Vec<TaskDraft> {
        self.tasks.into_iter().map(TaskDraft::from).collect()
    }
}

impl From<PlannedTask> for TaskDraft {
    fn from(planned: PlannedTask) -> Self {
        TaskDraft {
            title: planned.title,
            description: planned.description,
            priority: planned.priority,
            category: planned.category,
            subtasks: planned.subtasks,
        }
    }
}

/// Parse a JSON array of step strings, dropping blank entries
pub fn parse_steps(text: &str) -> Result<Vec<String>, serde_json::Error> {
    let steps: Vec<String> = serde_json::from_str(text.trim())?;
    Ok(steps
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Output schema for goal planning
pub fn plan_schema() -> Value {
    let priorities: Vec<&str> = Priority::ALL.iter().map(|p| p.as_str()).collect();
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "tasks": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "priority": { "type": "STRING", "enum": priorities },
                        "category": { "type": "STRING", "enum": categories },
                        "subtasks": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" }
                        }
                    },
                    "required": ["title", "priority", "category", "subtasks"]
                }
            }
        }
    })
}

/// Output schema for subtask suggestion
pub fn steps_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" }
    })
}
