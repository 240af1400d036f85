// Analytics read models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiTrend {
    pub indicator_id: i64,
    pub indicator_name: String,
    pub direction: TrendDirection,
    /// Goodness of fit of the regression line, 0..=1.
    pub trend_strength: f64,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Sample standard deviation (n - 1).
    pub volatility: f64,
    /// Population standard deviation (n).
    pub standard_deviation: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub average_value: f64,
    pub last_value: Option<f64>,
    pub data_points: Vec<TrendPoint>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiPerformanceMetrics {
    pub indicator_id: i64,
    pub indicator_name: String,
    pub owner_contact: String,
    pub priority: String,
    pub total_executions: usize,
    pub successful_executions: usize,
    pub failed_executions: usize,
    pub alert_count: usize,
    pub average_execution_time_ms: f64,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub average_value: Option<f64>,
    pub reliability: f64,
    pub alert_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiPrediction {
    pub indicator_id: i64,
    pub predicted_value: f64,
    /// Percent, capped at 95.
    pub confidence: f64,
    pub days_ahead: u32,
    pub prediction_date: DateTime<Utc>,
    pub direction: TrendDirection,
    pub data_points_used: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalySeverity {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiAnomaly {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub expected_value: f64,
    pub deviation: f64,
    pub z_score: f64,
    pub severity: AnomalySeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub indicator_id: i64,
    pub sufficient_data: bool,
    pub data_points_analyzed: usize,
    pub mean: f64,
    pub standard_deviation: f64,
    pub anomalies: Vec<KpiAnomaly>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalBucket {
    pub label: String,
    pub average_value: f64,
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSeasonality {
    pub indicator_id: i64,
    pub pattern: String,
    /// Spread of bucket averages relative to the overall mean.
    pub strength: f64,
    pub buckets: Vec<SeasonalBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCorrelation {
    pub first_indicator_id: i64,
    pub first_indicator_name: String,
    pub second_indicator_id: i64,
    pub second_indicator_name: String,
    pub coefficient: f64,
    pub common_days: usize,
}
