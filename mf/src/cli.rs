//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::{Category, Priority};
use crate::filter::{CategoryFilter, CompletionFilter};

/// MindFlow - personal task manager with AI-assisted planning
#[derive(Parser, Debug)]
#[command(
    name = "mf",
    author,
    version,
    about = "Personal task manager with AI-assisted goal planning",
    after_help = "Logs are written to: ~/.local/share/mindflow/logs/mindflow.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Directory holding the task store (overrides storage.store-dir)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task
    Add {
        /// Task title
        #[arg(required = true)]
        title: String,

        /// Optional description
        #[arg(short, long)]
        desc: Option<String>,

        /// Priority (low, medium, high)
        #[arg(short, long, default_value = "medium")]
        priority: Priority,

        /// Category (work, personal, health, learning, general)
        #[arg(short = 'C', long, default_value = "general")]
        category: Category,

        /// Ask the model to pick the priority
        #[arg(long, conflicts_with = "priority")]
        suggest_priority: bool,
    },

    /// List tasks
    List {
        /// Completion filter (all, active, completed)
        #[arg(short, long, default_value = "all")]
        filter: CompletionFilter,

        /// Category filter (all or a category name)
        #[arg(short = 'C', long, default_value = "all")]
        category: CategoryFilter,
    },

    /// Show one task with its subtasks
    Show {
        /// Task id (full or partial)
        #[arg(required = true)]
        id: String,
    },

    /// Toggle a task's completion
    Toggle {
        /// Task id (full or partial)
        #[arg(required = true)]
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task id (full or partial)
        #[arg(required = true)]
        id: String,
    },

    /// Subtask operations
    Subtask {
        #[command(subcommand)]
        command: SubtaskCommand,
    },

    /// Turn a goal into a plan of tasks
    Plan {
        /// Goal description
        #[arg(required = true, num_args = 1..)]
        goal: Vec<String>,
    },

    /// Ask the model to suggest subtasks for tasks
    Breakdown {
        /// Task ids (full or partial)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Show completion statistics
    Stats,
}

/// Subtask subcommands
#[derive(Subcommand, Debug)]
pub enum SubtaskCommand {
    /// Toggle a subtask's completion
    Toggle {
        /// Task id (full or partial)
        task: String,

        /// Subtask id (full or partial)
        subtask: String,
    },
}
