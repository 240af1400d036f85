use rust_decimal::Decimal;
use tracing::{error, info, warn};

use kpi_domain::{EscalationLevel, IndicatorChangeDetails, IndicatorChangeType};

use crate::dtos::{EvaluationOutcome, EvaluationRequest};
use crate::{AppError, AppState};

/// Turns one finished execution into an escalation decision and the domain
/// events an external dispatcher should publish.
pub async fn evaluate_indicator(
    state: &AppState,
    request: EvaluationRequest,
) -> Result<EvaluationOutcome, AppError> {
    let service = &state.indicator_service;
    let context =
        service.validate_execution_context(&request.execution_context, request.user_permission)?;

    let indicator = state
        .indicator_repo
        .fetch_indicator(request.indicator_id)
        .await
        .map_err(|err| {
            error!("failed to fetch indicator {}: {}", request.indicator_id, err);
            AppError::Internal(err)
        })?
        .ok_or_else(|| AppError::indicator_not_found(request.indicator_id))?;

    if request.was_successful && request.current_value.is_none() {
        return Err(AppError::BadRequest(
            "a successful execution must report a current value".to_string(),
        ));
    }

    let now = state.clock.now();
    let details = IndicatorChangeDetails {
        current_value: request.current_value,
        historical_value: request.historical_value,
        was_successful: request.was_successful,
        error_message: request.error_message.clone(),
        execution_duration_ms: request.execution_duration_ms,
    };
    let mut events = service.create_indicator_state_change_events(
        &indicator,
        IndicatorChangeType::Executed,
        &details,
        now,
    );

    let mut breached = false;
    let mut escalation_level = EscalationLevel::None;
    if let (true, Some(current)) = (request.was_successful, request.current_value) {
        breached = indicator.threshold_value > Decimal::ZERO
            && indicator
                .threshold()
                .map(|t| t.is_breached(current, request.historical_value))
                .unwrap_or_else(|err| {
                    warn!("indicator {} has an invalid threshold: {}", indicator.id, err);
                    false
                });
        if breached {
            escalation_level =
                service.determine_escalation_level(&indicator, current, request.historical_value);
            events.extend(service.create_indicator_state_change_events(
                &indicator,
                IndicatorChangeType::ThresholdBreached,
                &details,
                now,
            ));
            info!(
                "indicator {} ({}) breached {} {} with {} during {} run, escalation {}",
                indicator.id,
                indicator.name,
                indicator.threshold_comparison,
                indicator.threshold_value,
                current,
                context,
                escalation_level
            );
        }
    }

    state.metrics.record_evaluation(breached);
    state.metrics.record_events(events.len());

    Ok(EvaluationOutcome {
        indicator_id: indicator.id,
        breached,
        escalation_level,
        events,
        evaluated_at: now,
    })
}
