use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// `[now - days, now]`, or `None` when the start falls outside the calendar.
pub fn trailing_window(now: DateTime<Utc>, days: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = now.checked_sub_signed(Duration::days(i64::from(days)))?;
    Some((start, now))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|err| anyhow!(err))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("invalid date: {}", value))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_and_timestamps() {
        let date = parse_timestamp("2026-03-01").unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        let ts = parse_timestamp("2026-03-01T10:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn window_start_out_of_range() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let (start, end) = trailing_window(now, 30).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 31, 12, 0, 0).unwrap());
        assert_eq!(end, now);
        assert!(trailing_window(now, u32::MAX).is_none());
    }
}
