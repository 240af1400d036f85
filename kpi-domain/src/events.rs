// Indicator domain events
// Immutable records handed to an external dispatcher.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub trait DomainEvent {
    fn event_id(&self) -> Uuid;
    fn occurred_at(&self) -> DateTime<Utc>;
    fn event_type(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorChangeType {
    Created,
    Updated,
    Deleted,
    Executed,
    ThresholdBreached,
}

/// Facts about the change that only some event types carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorChangeDetails {
    pub current_value: Option<Decimal>,
    pub historical_value: Option<Decimal>,
    pub was_successful: bool,
    pub error_message: Option<String>,
    pub execution_duration_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventHeader {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub indicator_id: i64,
    pub indicator_name: String,
    pub owner_contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum IndicatorDomainEvent {
    IndicatorCreated {
        #[serde(flatten)]
        header: EventHeader,
        priority: String,
    },
    IndicatorUpdated {
        #[serde(flatten)]
        header: EventHeader,
    },
    IndicatorDeleted {
        #[serde(flatten)]
        header: EventHeader,
    },
    IndicatorExecuted {
        #[serde(flatten)]
        header: EventHeader,
        was_successful: bool,
        current_value: Option<Decimal>,
        historical_value: Option<Decimal>,
        error_message: Option<String>,
        execution_duration_ms: Option<i64>,
    },
    IndicatorThresholdBreached {
        #[serde(flatten)]
        header: EventHeader,
        current_value: Decimal,
        threshold_value: Decimal,
        threshold_comparison: String,
        priority: String,
    },
}

impl IndicatorDomainEvent {
    pub fn header(&self) -> &EventHeader {
        match self {
            IndicatorDomainEvent::IndicatorCreated { header, .. }
            | IndicatorDomainEvent::IndicatorUpdated { header }
            | IndicatorDomainEvent::IndicatorDeleted { header }
            | IndicatorDomainEvent::IndicatorExecuted { header, .. }
            | IndicatorDomainEvent::IndicatorThresholdBreached { header, .. } => header,
        }
    }
}

impl DomainEvent for IndicatorDomainEvent {
    fn event_id(&self) -> Uuid {
        self.header().event_id
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.header().occurred_at
    }

    fn event_type(&self) -> &'static str {
        match self {
            IndicatorDomainEvent::IndicatorCreated { .. } => "IndicatorCreated",
            IndicatorDomainEvent::IndicatorUpdated { .. } => "IndicatorUpdated",
            IndicatorDomainEvent::IndicatorDeleted { .. } => "IndicatorDeleted",
            IndicatorDomainEvent::IndicatorExecuted { .. } => "IndicatorExecuted",
            IndicatorDomainEvent::IndicatorThresholdBreached { .. } => "IndicatorThresholdBreached",
        }
    }
}
