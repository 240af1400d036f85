// Scheduler entity
// Owned by the scheduling layer; the domain only asks it for the next run.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("interval must be positive, got {0} minutes")]
    InvalidInterval(i64),
    #[error("next execution time is out of range")]
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    Interval { minutes: i64 },
    Daily { time: NaiveTime },
    Once { at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    pub schedule: Schedule,
}

fn default_enabled() -> bool {
    true
}

impl Scheduler {
    /// Next run after `last_run`. Recurring schedules have no next run until
    /// the indicator has run once.
    pub fn next_execution_time(
        &self,
        last_run: Option<DateTime<Utc>>,
    ) -> Result<Option<DateTime<Utc>>, ScheduleError> {
        match &self.schedule {
            Schedule::Interval { minutes } => {
                if *minutes <= 0 {
                    return Err(ScheduleError::InvalidInterval(*minutes));
                }
                let Some(last_run) = last_run else {
                    return Ok(None);
                };
                let step = Duration::try_minutes(*minutes).ok_or(ScheduleError::OutOfRange)?;
                last_run
                    .checked_add_signed(step)
                    .map(Some)
                    .ok_or(ScheduleError::OutOfRange)
            }
            Schedule::Daily { time } => {
                let Some(last_run) = last_run else {
                    return Ok(None);
                };
                let same_day = Utc.from_utc_datetime(&last_run.date_naive().and_time(*time));
                if same_day > last_run {
                    return Ok(Some(same_day));
                }
                same_day
                    .checked_add_signed(Duration::days(1))
                    .map(Some)
                    .ok_or(ScheduleError::OutOfRange)
            }
            Schedule::Once { at } => match last_run {
                Some(last_run) if last_run >= *at => Ok(None),
                _ => Ok(Some(*at)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn scheduler(schedule: Schedule) -> Scheduler {
        Scheduler {
            id: 1,
            name: "test".to_string(),
            is_enabled: true,
            schedule,
        }
    }

    #[test]
    fn interval_adds_minutes_to_last_run() {
        let s = scheduler(Schedule::Interval { minutes: 15 });
        assert_eq!(s.next_execution_time(Some(at(10, 0))).unwrap(), Some(at(10, 15)));
        assert_eq!(s.next_execution_time(None).unwrap(), None);
    }

    #[test]
    fn interval_must_be_positive() {
        let s = scheduler(Schedule::Interval { minutes: 0 });
        assert_eq!(s.next_execution_time(None), Err(ScheduleError::InvalidInterval(0)));
    }

    #[test]
    fn daily_rolls_to_next_day_once_passed() {
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let s = scheduler(Schedule::Daily { time });
        assert_eq!(s.next_execution_time(Some(at(8, 0))).unwrap(), Some(at(9, 30)));
        let next = s.next_execution_time(Some(at(9, 30))).unwrap().unwrap();
        assert_eq!(next, at(9, 30) + Duration::days(1));
    }

    #[test]
    fn once_runs_a_single_time() {
        let s = scheduler(Schedule::Once { at: at(12, 0) });
        assert_eq!(s.next_execution_time(None).unwrap(), Some(at(12, 0)));
        assert_eq!(s.next_execution_time(Some(at(11, 0))).unwrap(), Some(at(12, 0)));
        assert_eq!(s.next_execution_time(Some(at(12, 5))).unwrap(), None);
    }
}
