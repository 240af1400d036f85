// Execution context value object

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueObjectError;

/// Why an indicator run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionContext {
    Scheduled,
    Manual,
    Test,
    Api,
    Retry,
}

impl ExecutionContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionContext::Scheduled => "scheduled",
            ExecutionContext::Manual => "manual",
            ExecutionContext::Test => "test",
            ExecutionContext::Api => "api",
            ExecutionContext::Retry => "retry",
        }
    }

    pub fn requires_user_permission(&self) -> bool {
        matches!(self, ExecutionContext::Manual | ExecutionContext::Test)
    }

    pub fn is_automated(&self) -> bool {
        matches!(self, ExecutionContext::Scheduled | ExecutionContext::Retry)
    }
}

impl FromStr for ExecutionContext {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(ExecutionContext::Scheduled),
            "manual" => Ok(ExecutionContext::Manual),
            "test" => Ok(ExecutionContext::Test),
            "api" => Ok(ExecutionContext::Api),
            "retry" => Ok(ExecutionContext::Retry),
            _ => Err(ValueObjectError::InvalidExecutionContext(s.to_string())),
        }
    }
}

impl std::fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
