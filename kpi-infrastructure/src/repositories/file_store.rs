// File-backed repositories
//
// indicators.yaml holds schedulers and indicators, history.json and
// alerts.json hold flat lists. Everything is loaded once and served from
// memory.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use kpi_domain::ports::{AlertLogRepository, HistoricalDataRepository, IndicatorRepository};
use kpi_domain::{AlertLog, HistoricalDataPoint, Indicator, Scheduler};

use crate::utils::read_optional;

#[derive(Debug, Default, Deserialize)]
struct IndicatorDocument {
    #[serde(default)]
    schedulers: Vec<Scheduler>,
    #[serde(default)]
    indicators: Vec<Indicator>,
}

#[derive(Debug, Default)]
pub struct FileDataStore {
    indicators: Vec<Indicator>,
    history: HashMap<i64, Vec<HistoricalDataPoint>>,
    alerts: Vec<AlertLog>,
}

impl FileDataStore {
    /// The indicator file is required; missing history or alert files load as empty.
    pub async fn load(indicators_path: &str, history_path: &str, alerts_path: &str) -> Result<Self> {
        let content = read_optional(indicators_path)
            .await?
            .ok_or_else(|| anyhow!("indicator file {} not found", indicators_path))?;
        let document: IndicatorDocument = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", indicators_path))?;
        let indicators = link_schedulers(document);

        let points: Vec<HistoricalDataPoint> = match read_optional(history_path).await? {
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", history_path))?,
            None => {
                warn!("history file {} not found, starting empty", history_path);
                Vec::new()
            }
        };
        let alerts: Vec<AlertLog> = match read_optional(alerts_path).await? {
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", alerts_path))?,
            None => Vec::new(),
        };

        info!(
            "loaded {} indicators, {} history rows, {} alerts",
            indicators.len(),
            points.len(),
            alerts.len()
        );
        Ok(Self::from_parts(indicators, points, alerts))
    }

    pub fn from_parts(
        indicators: Vec<Indicator>,
        points: Vec<HistoricalDataPoint>,
        alerts: Vec<AlertLog>,
    ) -> Self {
        let mut history: HashMap<i64, Vec<HistoricalDataPoint>> = HashMap::new();
        for point in points {
            history.entry(point.indicator_id).or_default().push(point);
        }
        for rows in history.values_mut() {
            rows.sort_by_key(|p| p.timestamp);
        }
        Self {
            indicators,
            history,
            alerts,
        }
    }
}

/// Attaches schedulers referenced by id; inline schedulers win.
fn link_schedulers(document: IndicatorDocument) -> Vec<Indicator> {
    let schedulers: HashMap<i64, Scheduler> = document
        .schedulers
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    document
        .indicators
        .into_iter()
        .map(|mut indicator| {
            if indicator.scheduler.is_none() {
                if let Some(id) = indicator.scheduler_id {
                    indicator.scheduler = schedulers.get(&id).cloned();
                    if indicator.scheduler.is_none() {
                        warn!("indicator {} references unknown scheduler {}", indicator.id, id);
                    }
                }
            }
            indicator
        })
        .collect()
}

#[async_trait]
impl IndicatorRepository for FileDataStore {
    async fn fetch_indicator(&self, id: i64) -> Result<Option<Indicator>> {
        Ok(self.indicators.iter().find(|i| i.id == id).cloned())
    }

    async fn fetch_indicators(&self) -> Result<Vec<Indicator>> {
        Ok(self.indicators.clone())
    }

    async fn fetch_active_indicators(&self) -> Result<Vec<Indicator>> {
        Ok(self
            .indicators
            .iter()
            .filter(|i| i.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HistoricalDataRepository for FileDataStore {
    async fn fetch_history(
        &self,
        indicator_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HistoricalDataPoint>> {
        let Some(rows) = self.history.get(&indicator_id) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .iter()
            .filter(|p| p.timestamp >= start && p.timestamp <= end)
            .cloned()
            .collect())
    }

    async fn fetch_recent(&self, indicator_id: i64, limit: usize) -> Result<Vec<HistoricalDataPoint>> {
        let Some(rows) = self.history.get(&indicator_id) else {
            return Ok(Vec::new());
        };
        let skip = rows.len().saturating_sub(limit);
        Ok(rows[skip..].to_vec())
    }
}

#[async_trait]
impl AlertLogRepository for FileDataStore {
    async fn fetch_alerts(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<AlertLog>> {
        Ok(self
            .alerts
            .iter()
            .filter(|a| a.triggered_at >= start && a.triggered_at <= end)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;

    const INDICATORS: &str = r#"
schedulers:
  - id: 1
    name: every 15 minutes
    schedule:
      kind: interval
      minutes: 15
indicators:
  - id: 10
    name: Failed payments
    owner_contact: ops@example.com
    scheduler_id: 1
    priority: high
    threshold_value: 10
    threshold_comparison: gt
    threshold_type: threshold_value
    last_minutes: 60
  - id: 11
    name: Legacy export
    is_active: false
    scheduler_id: 9
    priority: low
    threshold_value: 2.5
    threshold_comparison: lte
    threshold_type: percentage
    last_minutes: 1440
"#;

    const HISTORY: &str = r#"[
  {"indicator_id": 10, "timestamp": "2026-03-02T10:00:00Z", "current_value": 12, "historical_value": null, "is_successful": true, "execution_time_ms": 80, "error_message": null},
  {"indicator_id": 10, "timestamp": "2026-03-01T10:00:00Z", "current_value": 8, "historical_value": null, "is_successful": true, "execution_time_ms": 95, "error_message": null},
  {"indicator_id": 10, "timestamp": "2026-03-02T11:00:00Z", "current_value": 0, "historical_value": null, "is_successful": false, "execution_time_ms": 30000, "error_message": "timeout"}
]"#;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    async fn store(dir: &tempfile::TempDir) -> FileDataStore {
        let indicators = dir.path().join("indicators.yaml");
        let history = dir.path().join("history.json");
        std::fs::write(&indicators, INDICATORS).expect("write indicators");
        std::fs::write(&history, HISTORY).expect("write history");
        FileDataStore::load(
            indicators.to_str().expect("utf8"),
            history.to_str().expect("utf8"),
            dir.path().join("alerts.json").to_str().expect("utf8"),
        )
        .await
        .expect("load store")
    }

    #[tokio::test]
    async fn links_schedulers_and_filters_active() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store(&dir).await;

        let all = store.fetch_indicators().await.expect("indicators");
        assert_eq!(all.len(), 2);
        assert!(all[0].scheduler.is_some());
        assert!(all[1].scheduler.is_none());
        assert_eq!(all[1].threshold_value, Decimal::new(25, 1));

        let active = store.fetch_active_indicators().await.expect("active");
        assert_eq!(active.iter().map(|i| i.id).collect::<Vec<_>>(), vec![10]);
        assert!(store.fetch_indicator(99).await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn history_is_sorted_and_windowed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store(&dir).await;

        let rows = store.fetch_history(10, ts(1, 0), ts(2, 10)).await.expect("history");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].timestamp < rows[1].timestamp);

        let recent = store.fetch_recent(10, 2).await.expect("recent");
        assert_eq!(recent.len(), 2);
        assert!(!recent[1].is_successful);
        assert!(store.fetch_alerts(ts(1, 0), ts(3, 0)).await.expect("alerts").is_empty());
    }

    #[tokio::test]
    async fn missing_indicator_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.yaml");
        let result = FileDataStore::load(missing.to_str().expect("utf8"), "", "").await;
        assert!(result.is_err());
    }
}
