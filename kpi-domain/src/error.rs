// Domain errors
//
// Value objects fail construction with `ValueObjectError`. Domain service
// validations report caller-recoverable failures as `DomainError`, which
// carries a machine-readable code next to the human message.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("invalid priority '{0}', expected high, medium or low")]
    InvalidPriority(String),
    #[error("invalid comparison operator '{0}'")]
    InvalidComparisonOperator(String),
    #[error("invalid threshold type '{0}'")]
    InvalidThresholdType(String),
    #[error("deviation percentage cannot be negative: {0}")]
    NegativeDeviation(String),
    #[error("deviation percentage undefined for a zero reference value")]
    ZeroReference,
    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(String),
    #[error("invalid email address: {0}")]
    InvalidEmailAddress(String),
    #[error("invalid indicator code '{0}': must start with a letter and contain 3-50 characters A-Z, 0-9 or _")]
    InvalidIndicatorCode(String),
    #[error("invalid SQL query: {0}")]
    InvalidSqlQuery(String),
    #[error("invalid execution context '{0}'")]
    InvalidExecutionContext(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{code}: {message}")]
pub struct DomainError {
    pub code: &'static str,
    pub message: String,
}

impl DomainError {
    pub const INVALID_SQL_QUERY: &'static str = "INVALID_SQL_QUERY";
    pub const SQL_QUERY_TOO_COMPLEX: &'static str = "SQL_QUERY_TOO_COMPLEX";
    pub const INVALID_INDICATOR_CODE: &'static str = "INVALID_INDICATOR_CODE";
    pub const SYSTEM_CODE_NOT_ALLOWED: &'static str = "SYSTEM_CODE_NOT_ALLOWED";
    pub const INVALID_EXECUTION_CONTEXT: &'static str = "INVALID_EXECUTION_CONTEXT";
    pub const INSUFFICIENT_PERMISSIONS: &'static str = "INSUFFICIENT_PERMISSIONS";
    pub const HEALTH_CALCULATION_ERROR: &'static str = "HEALTH_CALCULATION_ERROR";

    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
