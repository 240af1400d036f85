use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use crate::entities::{
    HealthStatus, HistoricalDataPoint, Indicator, IndicatorHealthScore, ValidationResult,
};
use crate::error::{DomainError, DomainResult, ValueObjectError};
use crate::events::{EventHeader, IndicatorChangeDetails, IndicatorChangeType, IndicatorDomainEvent};
use crate::services::statistics;
use crate::value_objects::{
    EmailAddress, EscalationLevel, ExecutionContext, IndicatorCode, PhoneNumber, Priority,
    SqlQuery,
};

const MAX_OVERDUE_REDUCTION: i64 = 500;
const OVERDUE_POINTS_PER_MINUTE: i64 = 10;
const MAX_LAST_MINUTES: i32 = 10_080;
const MAX_AVERAGE_LAST_DAYS: i32 = 365;
const MAX_TABLE_REFERENCES: usize = 10;
const MIN_FREQUENCY_SAMPLES: usize = 5;

/// Stateless rules over indicator snapshots. Nothing here performs I/O; the
/// current time is always supplied by the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndicatorDomainService;

impl IndicatorDomainService {
    pub fn new() -> Self {
        Self
    }

    pub fn should_execute_indicator(&self, indicator: &Indicator, now: DateTime<Utc>) -> bool {
        if !indicator.is_active || indicator.is_currently_running {
            return false;
        }
        let Some(scheduler) = indicator.scheduler.as_ref().filter(|s| s.is_enabled) else {
            return false;
        };
        if indicator.last_run.is_none() {
            return true;
        }
        match scheduler.next_execution_time(indicator.last_run) {
            Ok(Some(next)) => next <= now,
            _ => false,
        }
    }

    /// Lower scores are more urgent; sort ascending.
    pub fn calculate_priority_score(&self, indicator: &Indicator, now: DateTime<Utc>) -> i32 {
        let base = i64::from(indicator.effective_priority().numeric_value()) * 1000;
        let mut reduction = 0;
        if let Ok(Some(next)) = indicator.next_execution_time() {
            if next < now {
                let overdue_minutes = (now - next).num_minutes();
                reduction = (overdue_minutes * OVERDUE_POINTS_PER_MINUTE).min(MAX_OVERDUE_REDUCTION);
            }
        }
        (base - reduction) as i32
    }

    pub fn validate_indicator_configuration(&self, indicator: &Indicator) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let Err(err) = indicator.threshold() {
            errors.push(format!("Invalid threshold configuration: {}", err));
        }
        if let Err(err) = indicator.priority.parse::<Priority>() {
            errors.push(err.to_string());
        }
        if indicator.last_minutes <= 0 {
            errors.push("LastMinutes must be greater than 0".to_string());
        } else if indicator.last_minutes > MAX_LAST_MINUTES {
            warnings.push(format!(
                "LastMinutes of {} exceeds 7 days and may be slow to evaluate",
                indicator.last_minutes
            ));
        }
        if let Some(days) = indicator.average_last_days {
            if days <= 0 {
                errors.push("AverageLastDays must be greater than 0".to_string());
            } else if days > MAX_AVERAGE_LAST_DAYS {
                warnings.push(format!("AverageLastDays of {} exceeds one year", days));
            }
        }
        if let Some(sql) = indicator.sql_query.as_deref() {
            if let Err(err) = SqlQuery::new(sql) {
                errors.push(err.to_string());
            }
        }
        if let Some(code) = indicator.code.as_deref() {
            if let Err(err) = IndicatorCode::new(code) {
                errors.push(err.to_string());
            }
        }
        let contact = indicator.owner_contact.trim();
        if contact.is_empty() {
            warnings.push("No owner contact configured".to_string());
        } else if PhoneNumber::new(contact).is_err() && EmailAddress::new(contact).is_err() {
            warnings.push(format!(
                "Owner contact '{}' is neither a phone number nor an email address",
                contact
            ));
        }
        match (indicator.scheduler_id, indicator.scheduler.as_ref()) {
            (Some(id), None) => {
                warnings.push(format!("Scheduler {} is referenced but not loaded", id));
            }
            (_, Some(scheduler)) if !scheduler.is_enabled => {
                warnings.push(format!("Scheduler '{}' is disabled", scheduler.name));
            }
            _ => {}
        }

        ValidationResult::from_messages(errors, warnings)
    }

    pub fn determine_escalation_level(
        &self,
        indicator: &Indicator,
        current_value: Decimal,
        historical_value: Option<Decimal>,
    ) -> EscalationLevel {
        if indicator.threshold_value <= Decimal::ZERO {
            return EscalationLevel::None;
        }
        let Ok(threshold) = indicator.threshold() else {
            return EscalationLevel::None;
        };
        if !threshold.is_breached(current_value, historical_value) {
            return EscalationLevel::None;
        }
        let severity = threshold.breach_severity(current_value, historical_value);
        EscalationLevel::from_breach(severity, indicator.effective_priority())
    }

    pub fn calculate_recommended_frequency(
        &self,
        indicator: &Indicator,
        recent_values: &[Decimal],
    ) -> Duration {
        let base = match indicator.effective_priority() {
            Priority::High => Duration::minutes(5),
            Priority::Medium => Duration::minutes(15),
            Priority::Low => Duration::minutes(30),
        };
        if recent_values.len() < MIN_FREQUENCY_SAMPLES {
            return base;
        }
        let values: Vec<f64> = recent_values.iter().filter_map(|v| v.to_f64()).collect();
        let Some(avg) = statistics::mean(&values) else {
            return base;
        };
        if avg.abs() < f64::EPSILON {
            return base;
        }
        let volatility = statistics::population_std_dev(&values) / avg.abs();
        if volatility > 0.5 {
            base / 2
        } else if volatility < 0.1 {
            base * 2
        } else {
            base
        }
    }

    pub fn create_indicator_state_change_events(
        &self,
        indicator: &Indicator,
        change_type: IndicatorChangeType,
        details: &IndicatorChangeDetails,
        now: DateTime<Utc>,
    ) -> Vec<IndicatorDomainEvent> {
        let header = EventHeader {
            event_id: Uuid::new_v4(),
            occurred_at: now,
            indicator_id: indicator.id,
            indicator_name: indicator.name.clone(),
            owner_contact: indicator.owner_contact.clone(),
        };
        let event = match change_type {
            IndicatorChangeType::Created => IndicatorDomainEvent::IndicatorCreated {
                header,
                priority: indicator.priority.clone(),
            },
            IndicatorChangeType::Updated => IndicatorDomainEvent::IndicatorUpdated { header },
            IndicatorChangeType::Deleted => IndicatorDomainEvent::IndicatorDeleted { header },
            IndicatorChangeType::Executed => IndicatorDomainEvent::IndicatorExecuted {
                header,
                was_successful: details.was_successful,
                current_value: details.current_value,
                historical_value: details.historical_value,
                error_message: details.error_message.clone(),
                execution_duration_ms: details.execution_duration_ms,
            },
            IndicatorChangeType::ThresholdBreached => {
                let Some(current_value) = details.current_value else {
                    return Vec::new();
                };
                if indicator.threshold_value <= Decimal::ZERO {
                    return Vec::new();
                }
                IndicatorDomainEvent::IndicatorThresholdBreached {
                    header,
                    current_value,
                    threshold_value: indicator.threshold_value,
                    threshold_comparison: indicator.threshold_comparison.clone(),
                    priority: indicator.priority.clone(),
                }
            }
        };
        vec![event]
    }

    pub fn validate_sql_query(&self, sql: &str) -> DomainResult<SqlQuery> {
        let query = SqlQuery::new(sql)
            .map_err(|err| DomainError::new(DomainError::INVALID_SQL_QUERY, err.to_string()))?;
        let tables = query.table_references();
        if tables.len() > MAX_TABLE_REFERENCES {
            return Err(DomainError::new(
                DomainError::SQL_QUERY_TOO_COMPLEX,
                format!(
                    "query references {} tables, at most {} are allowed",
                    tables.len(),
                    MAX_TABLE_REFERENCES
                ),
            ));
        }
        if query.is_high_complexity() {
            warn!(
                "high complexity query (score {}) over tables {:?}",
                query.complexity_score(),
                tables
            );
        }
        Ok(query)
    }

    pub fn validate_indicator_code(&self, code: &str, is_update: bool) -> DomainResult<IndicatorCode> {
        let code = IndicatorCode::new(code)
            .map_err(|err| DomainError::new(DomainError::INVALID_INDICATOR_CODE, err.to_string()))?;
        if code.is_system_code() && !is_update {
            return Err(DomainError::new(
                DomainError::SYSTEM_CODE_NOT_ALLOWED,
                format!("system code '{}' cannot be used for new indicators", code),
            ));
        }
        Ok(code)
    }

    pub fn validate_execution_context(
        &self,
        context: &str,
        requires_user_permission: bool,
    ) -> DomainResult<ExecutionContext> {
        let context: ExecutionContext = context.parse().map_err(|err: ValueObjectError| {
            DomainError::new(DomainError::INVALID_EXECUTION_CONTEXT, err.to_string())
        })?;
        if context.requires_user_permission() && !requires_user_permission {
            return Err(DomainError::new(
                DomainError::INSUFFICIENT_PERMISSIONS,
                format!("'{}' execution requires user permission", context),
            ));
        }
        Ok(context)
    }

    pub fn calculate_health_score(
        &self,
        indicator: &Indicator,
        recent_executions: &[HistoricalDataPoint],
        now: DateTime<Utc>,
    ) -> DomainResult<IndicatorHealthScore> {
        let total = recent_executions.len();
        let failures = recent_executions.iter().filter(|e| !e.is_successful).count();
        let success_rate = if total == 0 {
            100.0
        } else {
            (total - failures) as f64 / total as f64 * 100.0
        };

        let mut score: i32 = 100;
        let mut issues = Vec::new();

        if success_rate < 50.0 {
            score -= 40;
            issues.push(format!("Low success rate: {:.1}%", success_rate));
        } else if success_rate < 80.0 {
            score -= 20;
            issues.push(format!("Degraded success rate: {:.1}%", success_rate));
        }

        if failures >= 3 {
            score -= 30;
            issues.push(format!("{} recent failures", failures));
        }

        let next = indicator.next_execution_time().map_err(|err| {
            DomainError::new(
                DomainError::HEALTH_CALCULATION_ERROR,
                format!("failed to calculate health score: {}", err),
            )
        })?;
        if let Some(next) = next {
            let overdue = now - next;
            if overdue > Duration::hours(1) {
                score -= 25;
                issues.push(format!("Overdue by {} minutes", overdue.num_minutes()));
            }
        }

        let validation = self.validate_indicator_configuration(indicator);
        if !validation.is_valid {
            score -= 15;
            issues.push(format!(
                "Configuration has {} error(s)",
                validation.errors.len()
            ));
        }

        let score = score.max(0) as u8;
        Ok(IndicatorHealthScore {
            indicator_id: indicator.id,
            indicator_name: indicator.name.clone(),
            score,
            status: HealthStatus::from_score(score),
            success_rate,
            recent_failures: failures,
            issues,
            calculated_at: now,
        })
    }
}
