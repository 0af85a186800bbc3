//! Task categories

use serde::{Deserialize, Serialize};

/// Category of a Task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    Work,
    Personal,
    Health,
    Learning,
    #[default]
    General,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Learning,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Health => "Health",
            Self::Learning => "Learning",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "work" => Ok(Self::Work),
            "personal" => Ok(Self::Personal),
            "health" => Ok(Self::Health),
            "learning" => Ok(Self::Learning),
            "general" => Ok(Self::General),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("work".parse::<Category>().unwrap(), Category::Work);
        assert_eq!("LEARNING".parse::<Category>().unwrap(), Category::Learning);
        assert!("hobby".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_display_round_trips() {
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&Category::Health).unwrap();
        assert_eq!(json, "\"Health\"");

        let category: Category = serde_json::from_str("\"Personal\"").unwrap();
        assert_eq!(category, Category::Personal);
    }
}
