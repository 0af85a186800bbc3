//! View filter: derived subsequences of the task collection

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Task};

/// Selects tasks by completion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl CompletionFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl std::fmt::Display for CompletionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for CompletionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Unknown completion filter: {}", s)),
        }
    }
}

/// Selects tasks by category, or not at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => task.category == *category,
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        Self::Only(category)
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Only(category) => write!(f, "{}", category),
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Category>().map(Self::Only)
    }
}

/// Tasks matching both filters, in their original order
pub fn filter(tasks: &[Task], completion: CompletionFilter, category: CategoryFilter) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| completion.matches(t) && category.matches(t))
        .collect()
}
