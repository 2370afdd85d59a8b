use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::types::Period;

/// Time range a reflection covers.
///
/// Bounded windows are aligned to the user's local midnight so that an
/// `n`-day window touches exactly `n` local calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: Option<DateTime<Utc>>,
    pub end: DateTime<Utc>,
    pub days: Option<u32>,
}

impl Window {
    pub fn last_days(days: u32, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let days = days.max(1);
        let today = local_date(now, offset);
        let first = today - Duration::days(i64::from(days) - 1);
        let local_midnight = first.and_time(NaiveTime::MIN);
        let start = Utc.from_utc_datetime(
            &(local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()))),
        );

        Self {
            start: Some(start),
            end: now,
            days: Some(days),
        }
    }

    pub fn unbounded(now: DateTime<Utc>) -> Self {
        Self {
            start: None,
            end: now,
            days: None,
        }
    }

    pub fn for_period(period: Period, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        match period.days() {
            Some(days) => Self::last_days(days, now, offset),
            None => Self::unbounded(now),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && at <= self.end
    }
}

pub fn local_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}
