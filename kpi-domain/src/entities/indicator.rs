// Indicator entity
// A configured, schedulable check compared against a threshold.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{ScheduleError, Scheduler};
use crate::error::ValueObjectError;
use crate::value_objects::{Priority, ThresholdValue};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub owner_contact: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_currently_running: bool,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduler_id: Option<i64>,
    #[serde(default)]
    pub scheduler: Option<Scheduler>,
    pub priority: String,
    pub threshold_value: Decimal,
    pub threshold_comparison: String,
    pub threshold_type: String,
    pub last_minutes: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_last_days: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_query: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Indicator {
    pub fn threshold(&self) -> Result<ThresholdValue, ValueObjectError> {
        ThresholdValue::new(
            self.threshold_value,
            &self.threshold_comparison,
            &self.threshold_type,
        )
    }

    pub fn effective_priority(&self) -> Priority {
        Priority::parse_or_default(&self.priority)
    }

    /// `Ok(None)` when there is no scheduler or it has nothing planned.
    pub fn next_execution_time(&self) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        match &self.scheduler {
            Some(scheduler) => scheduler.next_execution_time(self.last_run),
            None => Ok(None),
        }
    }
}
