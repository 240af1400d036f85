// In-memory ports for application tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use kpi_domain::ports::{AlertLogRepository, Clock, HistoricalDataRepository, IndicatorRepository};
use kpi_domain::{
    AlertLog, HistoricalDataPoint, Indicator, IndicatorDomainService, RuntimeConfig, Schedule,
    Scheduler,
};

use crate::{AppState, Metrics};

pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
}

/// Due fifteen minutes ago on a 15 minute interval.
pub fn fixture_indicator(id: i64, priority: &str) -> Indicator {
    Indicator {
        id,
        name: format!("kpi-{}", id),
        code: None,
        owner_contact: "ops@example.com".to_string(),
        is_active: true,
        is_currently_running: false,
        last_run: Some(fixture_now() - Duration::minutes(30)),
        scheduler_id: Some(1),
        scheduler: Some(Scheduler {
            id: 1,
            name: "every 15m".to_string(),
            is_enabled: true,
            schedule: Schedule::Interval { minutes: 15 },
        }),
        priority: priority.to_string(),
        threshold_value: Decimal::from(10),
        threshold_comparison: "gt".to_string(),
        threshold_type: "threshold_value".to_string(),
        last_minutes: 60,
        average_last_days: None,
        sql_query: None,
    }
}

pub fn point(indicator_id: i64, timestamp: DateTime<Utc>, value: f64, ok: bool) -> HistoricalDataPoint {
    HistoricalDataPoint {
        indicator_id,
        timestamp,
        current_value: Decimal::from_f64(value).unwrap(),
        historical_value: None,
        is_successful: ok,
        execution_time_ms: 100,
        error_message: if ok { None } else { Some("timeout".to_string()) },
    }
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    indicators: Vec<Indicator>,
    points: Mutex<Vec<HistoricalDataPoint>>,
    alerts: Mutex<Vec<AlertLog>>,
    history_fails: AtomicBool,
}

#[async_trait]
impl IndicatorRepository for InMemoryStore {
    async fn fetch_indicator(&self, id: i64) -> anyhow::Result<Option<Indicator>> {
        Ok(self.indicators.iter().find(|i| i.id == id).cloned())
    }

    async fn fetch_indicators(&self) -> anyhow::Result<Vec<Indicator>> {
        Ok(self.indicators.clone())
    }

    async fn fetch_active_indicators(&self) -> anyhow::Result<Vec<Indicator>> {
        Ok(self.indicators.iter().filter(|i| i.is_active).cloned().collect())
    }
}

#[async_trait]
impl HistoricalDataRepository for InMemoryStore {
    async fn fetch_history(
        &self,
        indicator_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<HistoricalDataPoint>> {
        if self.history_fails.load(Ordering::Relaxed) {
            return Err(anyhow!("history store offline"));
        }
        let mut rows: Vec<_> = self
            .points
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.indicator_id == indicator_id && p.timestamp >= start && p.timestamp <= end)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.timestamp);
        Ok(rows)
    }

    async fn fetch_recent(
        &self,
        indicator_id: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<HistoricalDataPoint>> {
        if self.history_fails.load(Ordering::Relaxed) {
            return Err(anyhow!("history store offline"));
        }
        let mut rows: Vec<_> = self
            .points
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.indicator_id == indicator_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.timestamp);
        let skip = rows.len().saturating_sub(limit);
        Ok(rows.split_off(skip))
    }
}

#[async_trait]
impl AlertLogRepository for InMemoryStore {
    async fn fetch_alerts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<AlertLog>> {
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.triggered_at >= start && a.triggered_at <= end)
            .cloned()
            .collect())
    }
}

pub struct Fixture {
    store: Arc<InMemoryStore>,
}

impl Fixture {
    pub fn new(indicators: Vec<Indicator>) -> Self {
        Self {
            store: Arc::new(InMemoryStore {
                indicators,
                ..Default::default()
            }),
        }
    }

    pub fn push_point(&self, point: HistoricalDataPoint) {
        self.store.points.lock().unwrap().push(point);
    }

    pub fn push_alert(&self, indicator_id: i64, triggered_at: DateTime<Utc>) {
        self.store.alerts.lock().unwrap().push(AlertLog {
            indicator_id,
            triggered_at,
            current_value: None,
            message: "threshold breached".to_string(),
        });
    }

    pub fn fail_history(&self) {
        self.store.history_fails.store(true, Ordering::Relaxed);
    }

    pub fn state(&self) -> AppState {
        AppState {
            config: RuntimeConfig::default(),
            indicator_repo: self.store.clone(),
            history_repo: self.store.clone(),
            alert_repo: self.store.clone(),
            clock: Arc::new(FixedClock(fixture_now())),
            indicator_service: IndicatorDomainService::new(),
            metrics: Arc::new(Metrics::default()),
        }
    }
}
