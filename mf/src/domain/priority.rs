//! Priority levels for tasks

use serde::{Deserialize, Serialize};

/// Priority level of a Task
///
/// Serialized as `"Low"`, `"Medium"`, `"High"`; this is also the value set the
/// planning schema hands to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Every priority, lowest first
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }

    #[test]
    fn test_priority_default() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Medium ".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_serde() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"High\"");

        let priority: Priority = serde_json::from_str("\"Low\"").unwrap();
        assert_eq!(priority, Priority::Low);

        assert!(serde_json::from_str::<Priority>("\"low\"").is_err());
    }
}
