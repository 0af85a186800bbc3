//! Aggregate counts over a task snapshot

use crate::domain::{Category, Priority, Task};

/// Completion and priority breakdown of a task collection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    /// Active tasks per priority, highest first, zero counts omitted
    pub active_by_priority: Vec<(Priority, usize)>,
    /// All tasks per category, in `Category::ALL` order
    pub by_category: Vec<(Category, usize)>,
}

impl Summary {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();

        let active_by_priority = Priority::ALL
            .iter()
            .rev()
            .map(|p| (*p, tasks.iter().filter(|t| !t.completed && t.priority == *p).count()))
            .filter(|(_, n)| *n > 0)
            .collect();

        let by_category = Category::ALL
            .iter()
            .map(|c| (*c, tasks.iter().filter(|t| t.category == *c).count()))
            .collect();

        Self {
            total: tasks.len(),
            completed,
            active: tasks.len() - completed,
            active_by_priority,
            by_category,
        }
    }

    /// Fraction of tasks completed, 0.0 for an empty collection
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}
