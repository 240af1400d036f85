// Escalation level value object

use serde::{Deserialize, Serialize};

use crate::value_objects::{Priority, SeverityLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EscalationLevel {
    None,
    Low,
    Medium,
    High,
    Immediate,
}

impl EscalationLevel {
    /// Combines breach severity with the owning indicator's priority.
    pub fn from_breach(severity: SeverityLevel, priority: Priority) -> Self {
        let high = priority == Priority::High;
        match severity {
            SeverityLevel::Critical if high => EscalationLevel::Immediate,
            SeverityLevel::Critical => EscalationLevel::High,
            SeverityLevel::High if high => EscalationLevel::High,
            SeverityLevel::High => EscalationLevel::Medium,
            SeverityLevel::Medium if high => EscalationLevel::Medium,
            _ => EscalationLevel::Low,
        }
    }

    pub fn requires_notification(&self) -> bool {
        *self != EscalationLevel::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationLevel::None => "none",
            EscalationLevel::Low => "low",
            EscalationLevel::Medium => "medium",
            EscalationLevel::High => "high",
            EscalationLevel::Immediate => "immediate",
        }
    }
}

impl std::fmt::Display for EscalationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
