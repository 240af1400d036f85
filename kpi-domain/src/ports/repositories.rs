use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{AlertLog, HistoricalDataPoint, Indicator};

#[async_trait]
pub trait IndicatorRepository: Send + Sync {
    async fn fetch_indicator(&self, id: i64) -> anyhow::Result<Option<Indicator>>;
    async fn fetch_indicators(&self) -> anyhow::Result<Vec<Indicator>>;
    async fn fetch_active_indicators(&self) -> anyhow::Result<Vec<Indicator>>;
}

#[async_trait]
pub trait HistoricalDataRepository: Send + Sync {
    /// Rows for one indicator with `start <= timestamp <= end`, oldest first.
    async fn fetch_history(
        &self,
        indicator_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<HistoricalDataPoint>>;

    /// The most recent `limit` rows for one indicator, oldest first.
    async fn fetch_recent(
        &self,
        indicator_id: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<HistoricalDataPoint>>;
}

#[async_trait]
pub trait AlertLogRepository: Send + Sync {
    async fn fetch_alerts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<AlertLog>>;
}
