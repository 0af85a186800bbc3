//! MindFlow - personal task manager with AI-assisted planning
//!
//! Tasks live in an ordered, newest-first collection that is written to a
//! single key-value slot after every change. A hosted model can turn a
//! free-text goal into a batch of tasks, suggest subtasks for an existing
//! task, or pick a task's priority.

pub mod cli;
pub mod config;
pub mod domain;
pub mod filter;
pub mod llm;
pub mod persistence;
pub mod planning;
pub mod prompts;
pub mod stats;
pub mod store;
pub mod workspace;

// Re-export commonly used types
pub use config::Config;
pub use domain::{Category, IdGenerator, Priority, SubTask, Task, TaskDraft, TaskId, UuidGenerator};
pub use filter::{CategoryFilter, CompletionFilter, filter};
pub use llm::{LlmClient, LlmError, create_client};
pub use persistence::{PersistError, STORAGE_KEY, TaskSlot};
pub use planning::{Plan, PlanError, PlannedTask, PlanningClient};
pub use prompts::PromptLoader;
pub use stats::Summary;
pub use store::{StoreError, TaskStore};
pub use workspace::{ActionError, BreakdownOutcome, RequestKey, RequestTracker, Workspace};
