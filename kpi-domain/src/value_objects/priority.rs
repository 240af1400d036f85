// Priority value object

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueObjectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Rank where a lower number means more urgent.
    pub fn numeric_value(&self) -> i32 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    pub fn escalation_timeout_minutes(&self) -> i64 {
        match self {
            Priority::High => 15,
            Priority::Medium => 60,
            Priority::Low => 240,
        }
    }

    pub fn cooldown_minutes(&self) -> i64 {
        match self {
            Priority::High => 5,
            Priority::Medium => 30,
            Priority::Low => 60,
        }
    }

    pub fn requires_sms(&self) -> bool {
        matches!(self, Priority::High)
    }

    pub fn is_higher_than(&self, other: Priority) -> bool {
        self.numeric_value() < other.numeric_value()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Lenient parse used when ranking or escalating; unknown input is
    /// treated as medium. Configuration validation reports it separately.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or(Priority::Medium)
    }
}

impl FromStr for Priority {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "1" => Ok(Priority::High),
            "medium" | "2" => Ok(Priority::Medium),
            "low" | "3" => Ok(Priority::Low),
            _ => Err(ValueObjectError::InvalidPriority(s.to_string())),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
