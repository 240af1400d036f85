// Historical execution data
// One row per indicator run, read-only to analytics.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDataPoint {
    pub indicator_id: i64,
    pub timestamp: DateTime<Utc>,
    pub current_value: Decimal,
    #[serde(default)]
    pub historical_value: Option<Decimal>,
    pub is_successful: bool,
    #[serde(default)]
    pub execution_time_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl HistoricalDataPoint {
    pub fn value_f64(&self) -> f64 {
        self.current_value.to_f64().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLog {
    pub indicator_id: i64,
    pub triggered_at: DateTime<Utc>,
    #[serde(default)]
    pub current_value: Option<Decimal>,
    #[serde(default)]
    pub message: String,
}
