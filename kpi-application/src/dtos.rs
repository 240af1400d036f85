// Request and response shapes of application use cases

use chrono::{DateTime, Utc};
use kpi_domain::{EscalationLevel, IndicatorDomainEvent, ValidationResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One finished execution of an indicator's query, as reported by the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub indicator_id: i64,
    pub execution_context: String,
    #[serde(default)]
    pub user_permission: bool,
    pub current_value: Option<Decimal>,
    pub historical_value: Option<Decimal>,
    #[serde(default = "default_success")]
    pub was_successful: bool,
    pub error_message: Option<String>,
    pub execution_duration_ms: Option<i64>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationOutcome {
    pub indicator_id: i64,
    pub breached: bool,
    pub escalation_level: EscalationLevel,
    pub events: Vec<IndicatorDomainEvent>,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedIndicator {
    pub indicator_id: i64,
    pub indicator_name: String,
    pub priority: String,
    pub priority_score: i32,
    pub next_execution_time: Option<DateTime<Utc>>,
    pub recommended_frequency_seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorValidationReport {
    pub indicator_id: i64,
    pub indicator_name: String,
    #[serde(flatten)]
    pub result: ValidationResult,
}
