use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use kpi_domain::ports::{AlertLogRepository, Clock, HistoricalDataRepository, IndicatorRepository};
use kpi_domain::services::kpi_analytics;
use kpi_domain::{
    trailing_window, AnomalyReport, HistoricalDataPoint, Indicator, KpiCorrelation,
    KpiPerformanceMetrics, KpiPrediction, KpiSeasonality, KpiTrend,
};

use crate::AppError;

pub const PREDICTION_WINDOW_DAYS: u32 = 90;
pub const ANOMALY_WINDOW_DAYS: u32 = 30;
pub const SEASONALITY_WINDOW_DAYS: u32 = 365;
pub const CORRELATION_WINDOW_DAYS: u32 = 30;

/// Read-side analytics over indicator history.
///
/// Every call loads one window through the ports and hands it to the pure
/// functions in `kpi_domain::services::kpi_analytics`.
#[derive(Clone)]
pub struct KpiAnalyticsService {
    indicator_repo: Arc<dyn IndicatorRepository>,
    history_repo: Arc<dyn HistoricalDataRepository>,
    alert_repo: Arc<dyn AlertLogRepository>,
    clock: Arc<dyn Clock>,
}

impl KpiAnalyticsService {
    pub fn new(
        indicator_repo: Arc<dyn IndicatorRepository>,
        history_repo: Arc<dyn HistoricalDataRepository>,
        alert_repo: Arc<dyn AlertLogRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            indicator_repo,
            history_repo,
            alert_repo,
            clock,
        }
    }

    pub async fn get_kpi_trend(&self, indicator_id: i64, days_back: u32) -> Result<KpiTrend, AppError> {
        let indicator = self.load_indicator(indicator_id).await?;
        let (start, end) = window(self.clock.now(), days_back)?;
        let points = self.load_history(indicator_id, start, end).await?;
        debug!(
            "trend for indicator {} over {} rows",
            indicator_id,
            points.len()
        );
        Ok(kpi_analytics::calculate_trend(&indicator, &points, start, end))
    }

    /// Metrics for every active indicator with at least one row in
    /// `[start, end]`, highest alert rate first.
    pub async fn get_kpi_performance_metrics(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<KpiPerformanceMetrics>, AppError> {
        if start > end {
            return Err(AppError::BadRequest(format!(
                "window start {} is after end {}",
                start, end
            )));
        }
        let indicators = self.load_active_indicators().await?;
        let alerts = self.alert_repo.fetch_alerts(start, end).await.map_err(|err| {
            error!("failed to fetch alert logs: {}", err);
            AppError::Internal(err)
        })?;
        let mut alert_counts: HashMap<i64, usize> = HashMap::new();
        for alert in &alerts {
            *alert_counts.entry(alert.indicator_id).or_default() += 1;
        }

        let mut metrics = Vec::new();
        for indicator in &indicators {
            let points = self.load_history(indicator.id, start, end).await?;
            let alert_count = alert_counts.get(&indicator.id).copied().unwrap_or_default();
            if let Some(row) = kpi_analytics::calculate_performance(indicator, &points, alert_count) {
                metrics.push(row);
            }
        }
        metrics.sort_by(|a, b| b.alert_rate.total_cmp(&a.alert_rate));
        Ok(metrics)
    }

    pub async fn predict_kpi_value(
        &self,
        indicator_id: i64,
        days_ahead: u32,
    ) -> Result<KpiPrediction, AppError> {
        self.load_indicator(indicator_id).await?;
        let now = self.clock.now();
        let (start, end) = window(now, PREDICTION_WINDOW_DAYS)?;
        let points = self.load_history(indicator_id, start, end).await?;
        kpi_analytics::predict_value(indicator_id, &points, days_ahead, now).ok_or_else(|| {
            AppError::BadRequest(format!("cannot predict {} days ahead of {}", days_ahead, now))
        })
    }

    pub async fn detect_anomalies(&self, indicator_id: i64) -> Result<AnomalyReport, AppError> {
        self.load_indicator(indicator_id).await?;
        let (start, end) = window(self.clock.now(), ANOMALY_WINDOW_DAYS)?;
        let points = self.load_history(indicator_id, start, end).await?;
        Ok(kpi_analytics::detect_anomalies(indicator_id, &points))
    }

    pub async fn get_kpi_seasonality(&self, indicator_id: i64) -> Result<Vec<KpiSeasonality>, AppError> {
        self.load_indicator(indicator_id).await?;
        let (start, end) = window(self.clock.now(), SEASONALITY_WINDOW_DAYS)?;
        let points = self.load_history(indicator_id, start, end).await?;
        Ok(kpi_analytics::analyze_seasonality(indicator_id, &points))
    }

    /// Pairwise correlations among active indicators, strongest first.
    pub async fn get_kpi_correlations(&self) -> Result<Vec<KpiCorrelation>, AppError> {
        let indicators = self.load_active_indicators().await?;
        let (start, end) = window(self.clock.now(), CORRELATION_WINDOW_DAYS)?;

        let mut series: Vec<(Indicator, Vec<HistoricalDataPoint>)> = Vec::with_capacity(indicators.len());
        for indicator in indicators {
            let points = self.load_history(indicator.id, start, end).await?;
            series.push((indicator, points));
        }

        let mut correlations = Vec::new();
        for (idx, (first, first_points)) in series.iter().enumerate() {
            for (second, second_points) in &series[idx + 1..] {
                if let Some(found) =
                    kpi_analytics::correlate((first, first_points), (second, second_points))
                {
                    correlations.push(found);
                }
            }
        }
        correlations.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
        Ok(correlations)
    }

    async fn load_indicator(&self, indicator_id: i64) -> Result<Indicator, AppError> {
        self.indicator_repo
            .fetch_indicator(indicator_id)
            .await
            .map_err(|err| {
                error!("failed to fetch indicator {}: {}", indicator_id, err);
                AppError::Internal(err)
            })?
            .ok_or_else(|| AppError::indicator_not_found(indicator_id))
    }

    async fn load_active_indicators(&self) -> Result<Vec<Indicator>, AppError> {
        self.indicator_repo.fetch_active_indicators().await.map_err(|err| {
            error!("failed to fetch active indicators: {}", err);
            AppError::Internal(err)
        })
    }

    async fn load_history(
        &self,
        indicator_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HistoricalDataPoint>, AppError> {
        self.history_repo
            .fetch_history(indicator_id, start, end)
            .await
            .map_err(|err| {
                error!("failed to fetch history for indicator {}: {}", indicator_id, err);
                AppError::Internal(err)
            })
    }
}

fn window(now: DateTime<Utc>, days: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    trailing_window(now, days)
        .ok_or_else(|| AppError::BadRequest(format!("a {} day window before {} is out of range", days, now)))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use kpi_domain::{AnomalySeverity, TrendDirection};

    use super::*;
    use crate::testing::{fixture_indicator, fixture_now, point, Fixture};

    fn service(fixture: &Fixture) -> KpiAnalyticsService {
        fixture.state().analytics()
    }

    #[tokio::test]
    async fn trend_of_linear_series() {
        let fixture = Fixture::new(vec![fixture_indicator(1, "high")]);
        for idx in 0..10 {
            fixture.push_point(point(1, fixture_now() - Duration::days(10 - idx), f64::from(idx as i32 + 1) * 10.0, true));
        }
        let trend = service(&fixture).get_kpi_trend(1, 30).await.expect("trend");
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert_eq!(trend.data_points.len(), 10);
        assert!((trend.slope - 10.0).abs() < 1e-9);
        assert!((trend.r_squared - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn trend_without_rows_is_unknown() {
        let fixture = Fixture::new(vec![fixture_indicator(1, "high")]);
        let trend = service(&fixture).get_kpi_trend(1, 30).await.expect("trend");
        assert_eq!(trend.direction, TrendDirection::Unknown);
        assert_eq!(trend.trend_strength, 0.0);
    }

    #[tokio::test]
    async fn oversized_windows_are_rejected() {
        let fixture = Fixture::new(vec![fixture_indicator(1, "high")]);
        let err = service(&fixture).get_kpi_trend(1, u32::MAX).await.expect_err("trend");
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = service(&fixture).predict_kpi_value(1, u32::MAX).await.expect_err("prediction");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn missing_indicator_is_not_found() {
        let fixture = Fixture::new(Vec::new());
        let err = service(&fixture).detect_anomalies(42).await.expect_err("missing");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn repository_failure_is_internal() {
        let fixture = Fixture::new(vec![fixture_indicator(1, "high")]);
        fixture.fail_history();
        let err = service(&fixture).get_kpi_trend(1, 30).await.expect_err("failure");
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn single_outlier_is_high_anomaly() {
        let fixture = Fixture::new(vec![fixture_indicator(1, "medium")]);
        for idx in 0..19 {
            let value = 100.0 + (idx % 3) as f64;
            fixture.push_point(point(1, fixture_now() - Duration::hours(idx + 2), value, true));
        }
        fixture.push_point(point(1, fixture_now() - Duration::hours(1), 1000.0, true));
        let report = service(&fixture).detect_anomalies(1).await.expect("anomalies");
        assert!(report.sufficient_data);
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].severity, AnomalySeverity::High);
    }

    #[tokio::test]
    async fn prediction_needs_ten_points() {
        let fixture = Fixture::new(vec![fixture_indicator(1, "low")]);
        for idx in 0..5 {
            fixture.push_point(point(1, fixture_now() - Duration::days(idx + 1), 50.0, true));
        }
        let prediction = service(&fixture).predict_kpi_value(1, 7).await.expect("prediction");
        assert_eq!(prediction.confidence, 0.0);
        assert_eq!(prediction.direction, TrendDirection::Unknown);
        assert_eq!(prediction.data_points_used, 5);
    }

    #[tokio::test]
    async fn performance_sorted_by_alert_rate() {
        let fixture = Fixture::new(vec![fixture_indicator(1, "high"), fixture_indicator(2, "low")]);
        for idx in 0..4 {
            fixture.push_point(point(1, fixture_now() - Duration::hours(idx + 1), 10.0, true));
            fixture.push_point(point(2, fixture_now() - Duration::hours(idx + 1), 10.0, idx != 0));
        }
        fixture.push_alert(2, fixture_now() - Duration::hours(1));
        fixture.push_alert(2, fixture_now() - Duration::hours(2));

        let (start, end) = window(fixture_now(), 1).expect("window");
        let rows = service(&fixture)
            .get_kpi_performance_metrics(start, end)
            .await
            .expect("performance");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].indicator_id, 2);
        assert_eq!(rows[0].alert_count, 2);
        assert_eq!(rows[0].failed_executions, 1);
        assert!((rows[0].alert_rate - 50.0).abs() < 1e-9);
        assert!((rows[0].reliability - 75.0).abs() < 1e-9);
        assert_eq!(rows[1].alert_rate, 0.0);
    }

    #[tokio::test]
    async fn inverted_window_is_rejected() {
        let fixture = Fixture::new(Vec::new());
        let now = fixture_now();
        let err = service(&fixture)
            .get_kpi_performance_metrics(now, now - Duration::days(1))
            .await
            .expect_err("inverted");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn correlates_daily_averages() {
        let fixture = Fixture::new(vec![
            fixture_indicator(1, "high"),
            fixture_indicator(2, "high"),
            fixture_indicator(3, "high"),
        ]);
        for day in 1..=8 {
            let ts = fixture_now() - Duration::days(day);
            let x = f64::from(day as i32);
            fixture.push_point(point(1, ts, x * 3.0, true));
            fixture.push_point(point(2, ts, 100.0 - x * 5.0, true));
            fixture.push_point(point(3, ts, if day % 2 == 0 { 1.0 } else { 2.0 }, true));
        }
        let correlations = service(&fixture).get_kpi_correlations().await.expect("correlations");
        assert_eq!(correlations.len(), 1);
        assert_eq!(correlations[0].first_indicator_id, 1);
        assert_eq!(correlations[0].second_indicator_id, 2);
        assert!((correlations[0].coefficient + 1.0).abs() < 1e-9);
        assert_eq!(correlations[0].common_days, 8);
    }

    #[tokio::test]
    async fn seasonality_placeholder_for_short_history() {
        let fixture = Fixture::new(vec![fixture_indicator(1, "high")]);
        fixture.push_point(point(1, fixture_now() - Duration::days(1), 5.0, true));
        let patterns = service(&fixture).get_kpi_seasonality(1).await.expect("seasonality");
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].pattern, "Insufficient Data");
    }
}
