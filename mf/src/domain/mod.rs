//! Domain types for MindFlow
//!
//! Core entities: Task, SubTask
//! Closed enums: Priority, Category

mod category;
mod id;
mod priority;
mod task;

pub use category::Category;
pub use id::{IdGenerator, IdResolver, SHORT_ID_LEN, SequentialIds, SubTaskId, TaskId, UuidGenerator, short_id};
pub use priority::Priority;
pub use task::{SubTask, Task, TaskDraft};
