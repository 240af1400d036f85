use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use kpi_application::commands::evaluate_indicator;
use kpi_application::dtos::EvaluationRequest;
use kpi_application::queries::{
    active_indicator_health, indicator_health, plan_due_indicators, validate_indicators,
};
use kpi_application::AppState;
use kpi_domain::{parse_timestamp, trailing_window};
use kpi_infrastructure::AppConfig;

use crate::cli::{Args, Command};
use crate::context::AppContext;

/// Runs one command and prints its JSON result on stdout.
///
/// Ctrl-C or SIGTERM drops the in-flight command.
pub async fn run(config: AppConfig, args: Args) -> Result<()> {
    let context = AppContext::new(&config).await?;
    let state = context.state;

    let output = tokio::select! {
        result = execute(&state, args.command) => result?,
        _ = shutdown_signal() => {
            warn!("interrupted, command abandoned");
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    if args.print_metrics {
        eprint!("{}", state.metrics.render_prometheus());
    }
    Ok(())
}

pub async fn execute(state: &AppState, command: Command) -> Result<Value> {
    let analytics = state.analytics();
    match command {
        Command::Plan => to_json(plan_due_indicators(state).await?),
        Command::Evaluate {
            indicator,
            value,
            historical,
            context,
            user_permission,
            failed,
            duration_ms,
        } => {
            let request = EvaluationRequest {
                indicator_id: indicator,
                execution_context: context,
                user_permission,
                current_value: value,
                historical_value: historical,
                was_successful: failed.is_none(),
                error_message: failed,
                execution_duration_ms: duration_ms,
            };
            let outcome = evaluate_indicator(state, request).await?;
            if outcome.escalation_level.requires_notification() {
                info!(
                    "indicator {} needs {} escalation",
                    outcome.indicator_id, outcome.escalation_level
                );
            }
            to_json(outcome)
        }
        Command::Health { indicator: Some(id) } => to_json(indicator_health(state, id).await?),
        Command::Health { indicator: None } => to_json(active_indicator_health(state).await?),
        Command::Validate => to_json(validate_indicators(state).await?),
        Command::Trend { indicator, days } => {
            let days = days.unwrap_or(state.config.trend_days_back);
            to_json(analytics.get_kpi_trend(indicator, days).await?)
        }
        Command::Performance { from, to } => {
            let end = match to {
                Some(value) => parse_timestamp(&value)?,
                None => state.clock.now(),
            };
            let start = match from {
                Some(value) => parse_timestamp(&value)?,
                None => trailing_window(end, state.config.trend_days_back)
                    .map(|(start, _)| start)
                    .ok_or_else(|| anyhow!("no {} day window before {}", state.config.trend_days_back, end))?,
            };
            to_json(analytics.get_kpi_performance_metrics(start, end).await?)
        }
        Command::Predict {
            indicator,
            days_ahead,
        } => {
            let days_ahead = days_ahead.unwrap_or(state.config.prediction_days_ahead);
            to_json(analytics.predict_kpi_value(indicator, days_ahead).await?)
        }
        Command::Anomalies { indicator } => {
            let report = analytics.detect_anomalies(indicator).await?;
            state.metrics.record_anomalies(report.anomalies.len());
            to_json(report)
        }
        Command::Seasonality { indicator } => {
            to_json(analytics.get_kpi_seasonality(indicator).await?)
        }
        Command::Correlations => to_json(analytics.get_kpi_correlations().await?),
    }
}

fn to_json(value: impl Serialize) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("sigterm handler unavailable: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
