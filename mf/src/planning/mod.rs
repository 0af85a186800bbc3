//! AI planning
//!
//! Turns free text into structured plans via an `LlmClient`:
//! - goal -> several prioritized, categorized tasks with subtasks
//! - task title -> suggested subtask titles
//! - task title -> suggested priority

mod client;
mod error;
mod plan;

pub use client::PlanningClient;
pub use error::PlanError;
pub use plan::{Plan, PlannedTask, parse_steps, plan_schema, steps_schema};
