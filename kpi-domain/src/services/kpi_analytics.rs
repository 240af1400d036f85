// KPI analytics computations
//
// Pure functions over an already time-filtered window of historical rows.
// Loading the window is the caller's job.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};

use crate::entities::{
    AnomalyReport, AnomalySeverity, HistoricalDataPoint, Indicator, KpiAnomaly, KpiCorrelation,
    KpiPerformanceMetrics, KpiPrediction, KpiSeasonality, KpiTrend, SeasonalBucket,
    TrendDirection, TrendPoint,
};
use crate::services::statistics;

pub const TREND_SLOPE_THRESHOLD: f64 = 0.1;
pub const ANOMALY_Z_THRESHOLD: f64 = 2.5;
pub const HIGH_ANOMALY_Z_THRESHOLD: f64 = 3.0;
pub const MAX_PREDICTION_CONFIDENCE: f64 = 95.0;
pub const MIN_PREDICTION_POINTS: usize = 10;
pub const MIN_ANOMALY_POINTS: usize = 10;
pub const MIN_SEASONALITY_POINTS: usize = 50;
pub const MIN_CORRELATION_DAYS: usize = 5;
pub const REPORTED_CORRELATION: f64 = 0.5;

const INSUFFICIENT_DATA: &str = "Insufficient Data";
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn successful_by_time(points: &[HistoricalDataPoint]) -> Vec<&HistoricalDataPoint> {
    let mut successful: Vec<&HistoricalDataPoint> =
        points.iter().filter(|p| p.is_successful).collect();
    successful.sort_by_key(|p| p.timestamp);
    successful
}

pub fn trend_direction(slope: f64) -> TrendDirection {
    if slope > TREND_SLOPE_THRESHOLD {
        TrendDirection::Increasing
    } else if slope < -TREND_SLOPE_THRESHOLD {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

pub fn calculate_trend(
    indicator: &Indicator,
    points: &[HistoricalDataPoint],
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> KpiTrend {
    let successful = successful_by_time(points);
    let values: Vec<f64> = successful.iter().map(|p| p.value_f64()).collect();

    let mut trend = KpiTrend {
        indicator_id: indicator.id,
        indicator_name: indicator.name.clone(),
        direction: TrendDirection::Unknown,
        trend_strength: 0.0,
        slope: 0.0,
        intercept: 0.0,
        r_squared: 0.0,
        volatility: 0.0,
        standard_deviation: 0.0,
        min_value: 0.0,
        max_value: 0.0,
        average_value: 0.0,
        last_value: None,
        data_points: Vec::new(),
        period_start,
        period_end,
    };
    let Some(fit) = statistics::linear_regression(&values) else {
        return trend;
    };

    trend.direction = trend_direction(fit.slope);
    trend.trend_strength = fit.r_squared;
    trend.slope = fit.slope;
    trend.intercept = fit.intercept;
    trend.r_squared = fit.r_squared;
    trend.volatility = statistics::sample_std_dev(&values);
    trend.standard_deviation = statistics::population_std_dev(&values);
    trend.min_value = values.iter().copied().fold(f64::INFINITY, f64::min);
    trend.max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    trend.average_value = statistics::mean(&values).unwrap_or_default();
    trend.last_value = values.last().copied();
    trend.data_points = successful
        .iter()
        .map(|p| TrendPoint {
            timestamp: p.timestamp,
            value: p.value_f64(),
        })
        .collect();
    trend
}

/// `None` when the indicator has no rows in the window.
pub fn calculate_performance(
    indicator: &Indicator,
    points: &[HistoricalDataPoint],
    alert_count: usize,
) -> Option<KpiPerformanceMetrics> {
    if points.is_empty() {
        return None;
    }
    let total = points.len();
    let values: Vec<f64> = points
        .iter()
        .filter(|p| p.is_successful)
        .map(|p| p.value_f64())
        .collect();
    let successful = values.len();
    let average_execution_time_ms =
        points.iter().map(|p| p.execution_time_ms as f64).sum::<f64>() / total as f64;

    Some(KpiPerformanceMetrics {
        indicator_id: indicator.id,
        indicator_name: indicator.name.clone(),
        owner_contact: indicator.owner_contact.clone(),
        priority: indicator.priority.clone(),
        total_executions: total,
        successful_executions: successful,
        failed_executions: total - successful,
        alert_count,
        average_execution_time_ms,
        min_value: values.iter().copied().reduce(f64::min),
        max_value: values.iter().copied().reduce(f64::max),
        average_value: statistics::mean(&values),
        reliability: successful as f64 / total as f64 * 100.0,
        alert_rate: alert_count as f64 / total as f64 * 100.0,
    })
}

/// `None` when the target date falls outside the calendar.
pub fn predict_value(
    indicator_id: i64,
    points: &[HistoricalDataPoint],
    days_ahead: u32,
    now: DateTime<Utc>,
) -> Option<KpiPrediction> {
    let prediction_date = now.checked_add_signed(Duration::days(i64::from(days_ahead)))?;
    let values: Vec<f64> = successful_by_time(points).iter().map(|p| p.value_f64()).collect();

    let fit = if values.len() >= MIN_PREDICTION_POINTS {
        statistics::linear_regression(&values)
    } else {
        None
    };
    let Some(fit) = fit else {
        return Some(KpiPrediction {
            indicator_id,
            predicted_value: 0.0,
            confidence: 0.0,
            days_ahead,
            prediction_date,
            direction: TrendDirection::Unknown,
            data_points_used: values.len(),
            message: format!(
                "Insufficient data for prediction: {} of {} required points",
                values.len(),
                MIN_PREDICTION_POINTS
            ),
        });
    };

    let n = values.len() as f64;
    let avg = statistics::mean(&values).unwrap_or_default();
    Some(KpiPrediction {
        indicator_id,
        predicted_value: fit.slope * (n + f64::from(days_ahead)) + avg,
        confidence: (fit.r_squared * 100.0).min(MAX_PREDICTION_CONFIDENCE),
        days_ahead,
        prediction_date,
        direction: trend_direction(fit.slope),
        data_points_used: values.len(),
        message: format!("Prediction based on {} data points", values.len()),
    })
}

pub fn detect_anomalies(indicator_id: i64, points: &[HistoricalDataPoint]) -> AnomalyReport {
    let successful = successful_by_time(points);
    let values: Vec<f64> = successful.iter().map(|p| p.value_f64()).collect();

    if values.len() < MIN_ANOMALY_POINTS {
        return AnomalyReport {
            indicator_id,
            sufficient_data: false,
            data_points_analyzed: values.len(),
            mean: 0.0,
            standard_deviation: 0.0,
            anomalies: Vec::new(),
            message: format!(
                "Insufficient data for anomaly detection: {} of {} required points",
                values.len(),
                MIN_ANOMALY_POINTS
            ),
        };
    }

    let avg = statistics::mean(&values).unwrap_or_default();
    let std_dev = statistics::population_std_dev(&values);
    let mut anomalies = Vec::new();
    if std_dev > f64::EPSILON {
        for point in &successful {
            let value = point.value_f64();
            let z_score = (value - avg).abs() / std_dev;
            if z_score <= ANOMALY_Z_THRESHOLD {
                continue;
            }
            anomalies.push(KpiAnomaly {
                timestamp: point.timestamp,
                value,
                expected_value: avg,
                deviation: value - avg,
                z_score,
                severity: if z_score > HIGH_ANOMALY_Z_THRESHOLD {
                    AnomalySeverity::High
                } else {
                    AnomalySeverity::Medium
                },
            });
        }
    }

    AnomalyReport {
        indicator_id,
        sufficient_data: true,
        data_points_analyzed: values.len(),
        mean: avg,
        standard_deviation: std_dev,
        message: format!("{} anomalies in {} data points", anomalies.len(), values.len()),
        anomalies,
    }
}

/// Day-of-week and hour-of-day profiles of successful values.
pub fn analyze_seasonality(indicator_id: i64, points: &[HistoricalDataPoint]) -> Vec<KpiSeasonality> {
    let successful = successful_by_time(points);
    if successful.len() < MIN_SEASONALITY_POINTS {
        return vec![KpiSeasonality {
            indicator_id,
            pattern: INSUFFICIENT_DATA.to_string(),
            strength: 0.0,
            buckets: Vec::new(),
        }];
    }

    let values: Vec<f64> = successful.iter().map(|p| p.value_f64()).collect();
    let overall = statistics::mean(&values).unwrap_or_default();

    let weekly = profile(&successful, |ts| ts.weekday().num_days_from_monday(), |key| {
        WEEKDAYS[key as usize].to_string()
    });
    let daily = profile(&successful, |ts| ts.hour(), |key| format!("{:02}:00", key));

    vec![
        seasonality(indicator_id, "DayOfWeek", weekly, overall),
        seasonality(indicator_id, "HourOfDay", daily, overall),
    ]
}

fn profile(
    points: &[&HistoricalDataPoint],
    key_of: impl Fn(DateTime<Utc>) -> u32,
    label_of: impl Fn(u32) -> String,
) -> Vec<SeasonalBucket> {
    let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for point in points {
        groups
            .entry(key_of(point.timestamp))
            .or_default()
            .push(point.value_f64());
    }
    groups
        .into_iter()
        .map(|(key, values)| SeasonalBucket {
            label: label_of(key),
            average_value: statistics::mean(&values).unwrap_or_default(),
            sample_count: values.len(),
        })
        .collect()
}

fn seasonality(
    indicator_id: i64,
    pattern: &str,
    buckets: Vec<SeasonalBucket>,
    overall_mean: f64,
) -> KpiSeasonality {
    let strength = if buckets.len() < 2 || overall_mean.abs() < f64::EPSILON {
        0.0
    } else {
        let max = buckets.iter().map(|b| b.average_value).fold(f64::NEG_INFINITY, f64::max);
        let min = buckets.iter().map(|b| b.average_value).fold(f64::INFINITY, f64::min);
        (max - min) / overall_mean.abs()
    };
    KpiSeasonality {
        indicator_id,
        pattern: pattern.to_string(),
        strength,
        buckets,
    }
}

fn daily_averages(points: &[HistoricalDataPoint]) -> BTreeMap<NaiveDate, f64> {
    let mut days: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for point in points.iter().filter(|p| p.is_successful) {
        days.entry(point.timestamp.date_naive())
            .or_default()
            .push(point.value_f64());
    }
    days.into_iter()
        .filter_map(|(day, values)| statistics::mean(&values).map(|avg| (day, avg)))
        .collect()
}

/// Pearson correlation of per-day averages; `None` unless enough days
/// overlap and the relationship is at least moderately strong.
pub fn correlate(
    first: (&Indicator, &[HistoricalDataPoint]),
    second: (&Indicator, &[HistoricalDataPoint]),
) -> Option<KpiCorrelation> {
    let first_days = daily_averages(first.1);
    let second_days = daily_averages(second.1);
    let (xs, ys): (Vec<f64>, Vec<f64>) = first_days
        .iter()
        .filter_map(|(day, x)| second_days.get(day).map(|y| (*x, *y)))
        .unzip();
    if xs.len() < MIN_CORRELATION_DAYS {
        return None;
    }
    let coefficient = statistics::pearson(&xs, &ys)?;
    if coefficient.abs() < REPORTED_CORRELATION {
        return None;
    }
    Some(KpiCorrelation {
        first_indicator_id: first.0.id,
        first_indicator_name: first.0.name.clone(),
        second_indicator_id: second.0.id,
        second_indicator_name: second.0.name.clone(),
        coefficient,
        common_days: xs.len(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal::Decimal;

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap()
    }

    fn point(idx: i64, value: f64, ok: bool) -> HistoricalDataPoint {
        HistoricalDataPoint {
            indicator_id: 1,
            timestamp: start() + Duration::hours(idx),
            current_value: Decimal::from_f64(value).unwrap(),
            historical_value: None,
            is_successful: ok,
            execution_time_ms: 100 + idx,
            error_message: None,
        }
    }

    fn indicator(id: i64) -> Indicator {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("kpi-{id}"),
            "priority": "high",
            "threshold_value": 10,
            "threshold_comparison": "gt",
            "threshold_type": "absolute",
            "last_minutes": 60
        }))
        .unwrap()
    }

    #[test]
    fn linear_series_trends_upward() {
        let points: Vec<_> = (0..10).map(|i| point(i, (i as f64 + 1.0) * 10.0, true)).collect();
        let trend = calculate_trend(&indicator(1), &points, start(), start() + Duration::days(1));
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert!((trend.slope - 10.0).abs() < 1e-9);
        assert!((trend.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(trend.min_value, 10.0);
        assert_eq!(trend.max_value, 100.0);
        assert_eq!(trend.last_value, Some(100.0));
        assert!(trend.volatility > trend.standard_deviation);
    }

    #[test]
    fn empty_window_has_unknown_trend() {
        let trend = calculate_trend(&indicator(1), &[point(0, 5.0, false)], start(), start());
        assert_eq!(trend.direction, TrendDirection::Unknown);
        assert_eq!(trend.trend_strength, 0.0);
        assert!(trend.data_points.is_empty());
    }

    #[test]
    fn performance_counts_successes_failures_and_alerts() {
        let points = vec![point(0, 4.0, true), point(1, 8.0, true), point(2, 0.0, false), point(3, 6.0, true)];
        let metrics = calculate_performance(&indicator(1), &points, 2).unwrap();
        assert_eq!(metrics.total_executions, 4);
        assert_eq!(metrics.failed_executions, 1);
        assert_eq!(metrics.min_value, Some(4.0));
        assert_eq!(metrics.max_value, Some(8.0));
        assert_eq!(metrics.average_value, Some(6.0));
        assert_eq!(metrics.reliability, 75.0);
        assert_eq!(metrics.alert_rate, 50.0);
        assert_eq!(metrics.average_execution_time_ms, 101.5);
        assert!(calculate_performance(&indicator(1), &[], 0).is_none());
    }

    #[test]
    fn prediction_requires_ten_points() {
        let few: Vec<_> = (0..9).map(|i| point(i, 1.0, true)).collect();
        let prediction = predict_value(1, &few, 7, start()).unwrap();
        assert_eq!(prediction.confidence, 0.0);
        assert_eq!(prediction.direction, TrendDirection::Unknown);

        let points: Vec<_> = (0..10).map(|i| point(i, (i as f64 + 1.0) * 10.0, true)).collect();
        let prediction = predict_value(1, &points, 7, start()).unwrap();
        // slope 10 * (10 + 7) + mean 55
        assert!((prediction.predicted_value - 225.0).abs() < 1e-6);
        assert_eq!(prediction.confidence, 95.0);
        assert_eq!(prediction.prediction_date, start() + Duration::days(7));
    }

    #[test]
    fn prediction_date_out_of_range() {
        assert!(predict_value(1, &[], u32::MAX, start()).is_none());
    }

    #[test]
    fn single_outlier_is_flagged_high() {
        let mut points: Vec<_> = (0..19)
            .map(|i| point(i, 100.0 + if i % 2 == 0 { 1.5 } else { -1.5 }, true))
            .collect();
        points.push(point(19, 1000.0, true));
        let report = detect_anomalies(1, &points);
        assert!(report.sufficient_data);
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].value, 1000.0);
        assert_eq!(report.anomalies[0].severity, AnomalySeverity::High);
    }

    #[test]
    fn anomaly_detection_needs_data_and_spread() {
        let few: Vec<_> = (0..9).map(|i| point(i, 1.0, true)).collect();
        assert!(!detect_anomalies(1, &few).sufficient_data);
        let flat: Vec<_> = (0..12).map(|i| point(i, 3.0, true)).collect();
        let report = detect_anomalies(1, &flat);
        assert!(report.sufficient_data);
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn seasonality_profiles() {
        let few: Vec<_> = (0..49).map(|i| point(i, 1.0, true)).collect();
        let result = analyze_seasonality(1, &few);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].pattern, "Insufficient Data");

        // one point per hour for four days, busier during the day
        let points: Vec<_> = (0..96)
            .map(|i| {
                let hour = i % 24;
                point(i, if (8..20).contains(&hour) { 200.0 } else { 100.0 }, true)
            })
            .collect();
        let result = analyze_seasonality(1, &points);
        assert_eq!(result.len(), 2);
        let hourly = &result[1];
        assert_eq!(hourly.pattern, "HourOfDay");
        assert_eq!(hourly.buckets.len(), 24);
        assert!((hourly.strength - 100.0 / 150.0).abs() < 1e-9);
        assert_eq!(result[0].buckets[0].label, "Mon");
    }

    #[test]
    fn correlation_over_daily_averages() {
        let days = |f: fn(i64) -> f64| -> Vec<HistoricalDataPoint> {
            (0..6).map(|d| point(d * 24, f(d), true)).collect()
        };
        let rising = days(|d| d as f64 * 2.0 + 1.0);
        let falling = days(|d| 50.0 - d as f64 * 3.0);
        let a = indicator(1);
        let b = indicator(2);
        let corr = correlate((&a, &rising), (&b, &falling)).unwrap();
        assert!((corr.coefficient + 1.0).abs() < 1e-9);
        assert_eq!(corr.common_days, 6);

        let short: Vec<_> = rising.iter().take(4).cloned().collect();
        assert!(correlate((&a, &short), (&b, &falling)).is_none());
    }
}
