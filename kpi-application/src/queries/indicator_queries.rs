use tracing::{error, warn};

use kpi_domain::{Indicator, IndicatorHealthScore};

use crate::dtos::{IndicatorValidationReport, PlannedIndicator};
use crate::{AppError, AppState};

async fn load_indicator(state: &AppState, indicator_id: i64) -> Result<Indicator, AppError> {
    state
        .indicator_repo
        .fetch_indicator(indicator_id)
        .await
        .map_err(|err| {
            error!("failed to fetch indicator {}: {}", indicator_id, err);
            AppError::Internal(err)
        })?
        .ok_or_else(|| AppError::indicator_not_found(indicator_id))
}

async fn load_recent(
    state: &AppState,
    indicator_id: i64,
) -> Result<Vec<kpi_domain::HistoricalDataPoint>, AppError> {
    state
        .history_repo
        .fetch_recent(indicator_id, state.config.recent_execution_limit)
        .await
        .map_err(|err| {
            error!("failed to fetch recent runs of indicator {}: {}", indicator_id, err);
            AppError::Internal(err)
        })
}

/// Active indicators that are due now, most urgent first.
pub async fn plan_due_indicators(state: &AppState) -> Result<Vec<PlannedIndicator>, AppError> {
    let now = state.clock.now();
    let indicators = state.indicator_repo.fetch_active_indicators().await.map_err(|err| {
        error!("failed to fetch active indicators: {}", err);
        AppError::Internal(err)
    })?;

    let service = &state.indicator_service;
    let mut planned = Vec::new();
    for indicator in indicators
        .iter()
        .filter(|indicator| service.should_execute_indicator(indicator, now))
    {
        let recent: Vec<_> = load_recent(state, indicator.id)
            .await?
            .iter()
            .filter(|p| p.is_successful)
            .map(|p| p.current_value)
            .collect();
        let next_execution_time = indicator.next_execution_time().unwrap_or_else(|err| {
            warn!("indicator {} has an unusable schedule: {}", indicator.id, err);
            None
        });
        planned.push(PlannedIndicator {
            indicator_id: indicator.id,
            indicator_name: indicator.name.clone(),
            priority: indicator.effective_priority().to_string(),
            priority_score: service.calculate_priority_score(indicator, now),
            next_execution_time,
            recommended_frequency_seconds: service
                .calculate_recommended_frequency(indicator, &recent)
                .num_seconds(),
        });
    }
    planned.sort_by_key(|p| (p.priority_score, p.indicator_id));
    Ok(planned)
}

pub async fn indicator_health(
    state: &AppState,
    indicator_id: i64,
) -> Result<IndicatorHealthScore, AppError> {
    let indicator = load_indicator(state, indicator_id).await?;
    let recent = load_recent(state, indicator_id).await?;
    let score = state
        .indicator_service
        .calculate_health_score(&indicator, &recent, state.clock.now())?;
    Ok(score)
}

/// Health of every active indicator, least healthy first.
pub async fn active_indicator_health(
    state: &AppState,
) -> Result<Vec<IndicatorHealthScore>, AppError> {
    let indicators = state.indicator_repo.fetch_active_indicators().await.map_err(|err| {
        error!("failed to fetch active indicators: {}", err);
        AppError::Internal(err)
    })?;
    let now = state.clock.now();
    let mut scores = Vec::with_capacity(indicators.len());
    for indicator in &indicators {
        let recent = load_recent(state, indicator.id).await?;
        scores.push(
            state
                .indicator_service
                .calculate_health_score(indicator, &recent, now)?,
        );
    }
    scores.sort_by_key(|s| (s.score, s.indicator_id));
    Ok(scores)
}

/// Configuration checks for every indicator, active or not.
pub async fn validate_indicators(
    state: &AppState,
) -> Result<Vec<IndicatorValidationReport>, AppError> {
    let indicators = state.indicator_repo.fetch_indicators().await.map_err(|err| {
        error!("failed to fetch indicators: {}", err);
        AppError::Internal(err)
    })?;
    Ok(indicators
        .iter()
        .map(|indicator| IndicatorValidationReport {
            indicator_id: indicator.id,
            indicator_name: indicator.name.clone(),
            result: state.indicator_service.validate_indicator_configuration(indicator),
        })
        .collect())
}
