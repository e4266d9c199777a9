//! Date range for loading calendar events.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::error::{KinError, KinResult};
use crate::event::CalendarEvent;

pub const DEFAULT_PAST_DAYS: i64 = 30;
pub const DEFAULT_FUTURE_DAYS: i64 = 365;
/// Widest range a single load may ask for.
pub const MAX_SPAN_DAYS: i64 = 366 * 5;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Default for DateRange {
    /// Default range: DEFAULT_PAST_DAYS back to DEFAULT_FUTURE_DAYS ahead of today
    fn default() -> Self {
        let today = Utc::now().date_naive();
        DateRange {
            from: today - Duration::days(DEFAULT_PAST_DAYS),
            to: today + Duration::days(DEFAULT_FUTURE_DAYS),
        }
    }
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> KinResult<Self> {
        if to < from {
            return Err(KinError::Validation(format!(
                "Date range ends ({to}) before it starts ({from})"
            )));
        }
        if (to - from).num_days() > MAX_SPAN_DAYS {
            return Err(KinError::Validation(format!(
                "Date range {from} to {to} is wider than {MAX_SPAN_DAYS} days"
            )));
        }
        Ok(DateRange { from, to })
    }

    /// Parse optional YYYY-MM-DD bounds, falling back to the default window for missing ones.
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> KinResult<Self> {
        let default = DateRange::default();

        let from = match from {
            Some(s) => parse_date(s)?,
            None => default.from,
        };
        let to = match to {
            Some(s) => parse_date(s)?,
            None => default.to,
        };

        DateRange::new(from, to)
    }

    /// Start of the first day, UTC.
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.from.and_time(NaiveTime::MIN).and_utc()
    }

    /// Last second of the last day, UTC.
    pub fn end_utc(&self) -> DateTime<Utc> {
        self.to.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::seconds(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.from.year()..=self.to.year()
    }

    /// Whether any part of the event falls inside the range.
    pub fn overlaps(&self, event: &CalendarEvent) -> bool {
        event.start.to_utc() <= self.end_utc() && event.end.to_utc() >= self.start_utc()
    }
}

fn parse_date(s: &str) -> KinResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        KinError::Validation(format!("Invalid date format '{s}'. Expected YYYY-MM-DD"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_args_parses_bounds() {
        let range = DateRange::from_args(Some("2025-01-01"), Some("2026-02-01")).unwrap();
        assert_eq!(range.from, date(2025, 1, 1));
        assert_eq!(range.years(), 2025..=2026);
        assert_eq!(
            range.end_utc(),
            Utc.with_ymd_and_hms(2026, 2, 1, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_from_args_rejects_bad_input() {
        assert!(DateRange::from_args(Some("01/02/2025"), None).is_err());
        assert!(DateRange::from_args(Some("2025-02-01"), Some("2025-01-01")).is_err());
    }

    #[test]
    fn test_from_args_rejects_oversized_span() {
        let err = DateRange::from_args(Some("0001-01-01"), Some("9999-12-31")).unwrap_err();
        assert!(matches!(err, KinError::Validation(_)));

        assert!(DateRange::from_args(Some("2025-01-01"), Some("2029-12-31")).is_ok());
    }

    #[test]
    fn test_overlaps_multi_day_events() {
        let range = DateRange::new(date(2025, 3, 10), date(2025, 3, 20)).unwrap();
        let spanning = CalendarEvent::new(
            "Trip",
            EventTime::Date(date(2025, 3, 1)),
            EventTime::Date(date(2025, 3, 12)),
        );
        let before = CalendarEvent::new(
            "Earlier",
            EventTime::Date(date(2025, 3, 1)),
            EventTime::Date(date(2025, 3, 2)),
        );

        assert!(range.overlaps(&spanning));
        assert!(!range.overlaps(&before));
    }
}
