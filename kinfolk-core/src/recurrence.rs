//! RRULE expansion for recurring events.
//!
//! Expands a master recurring event into individual instances within a date range.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rrule::RRuleSet;

use crate::date_range::DateRange;
use crate::error::{KinError, KinResult};
use crate::event::{CalendarEvent, EventTime, Recurrence};

/// Upper bound on instances produced for one master event.
pub const MAX_INSTANCES: u16 = 366;

/// Split an instance id (`{master_id}_{YYYYMMDD}`) into its master id and day.
pub fn split_instance_id(id: &str) -> Option<(&str, NaiveDate)> {
    let (master_id, day) = id.rsplit_once('_')?;
    if master_id.is_empty() || day.len() != 8 || !day.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day = NaiveDate::parse_from_str(day, "%Y%m%d").ok()?;
    Some((master_id, day))
}

/// Build an iCalendar-format RRULE string for the rrule crate parser.
fn build_rrule_string(start: &EventTime, recurrence: &Recurrence) -> String {
    // The rrule crate needs a datetime, so all-day dates become midnight UTC
    let dtstart = match start {
        EventTime::Date(d) => format!("DTSTART:{}T000000Z", d.format("%Y%m%d")),
        EventTime::DateTime(dt) => format!("DTSTART:{}", dt.format("%Y%m%dT%H%M%SZ")),
    };

    format!("{}\nRRULE:{}", dtstart, recurrence.to_rrule())
}

/// Convert an rrule occurrence back to an EventTime matching the master's variant.
fn occurrence_to_event_time(dt: &DateTime<rrule::Tz>, master_start: &EventTime) -> EventTime {
    match master_start {
        EventTime::Date(_) => EventTime::Date(dt.date_naive()),
        EventTime::DateTime(_) => EventTime::DateTime(dt.with_timezone(&Utc)),
    }
}

/// Expand a recurring master event into the instances that overlap `range`.
///
/// Instances carry the master's fields with `recurrence` cleared and an id of
/// `{master_id}_{YYYYMMDD}`. The master itself is not included.
pub fn expand_recurring_event(
    master: &CalendarEvent,
    range: &DateRange,
) -> KinResult<Vec<CalendarEvent>> {
    let recurrence = match &master.recurrence {
        Some(r) => r,
        None => return Ok(Vec::new()),
    };
    recurrence.validate()?;

    let rrule_str = build_rrule_string(&master.start, recurrence);

    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
        KinError::Recurrence(format!(
            "Failed to parse RRULE for event '{}': {}",
            master.id, e
        ))
    })?;

    // after/before are exclusive, so widen by a second on each side. Occurrences
    // starting up to one event length before the range can still overlap it.
    let span = (master.end.to_utc() - master.start.to_utc()).max(Duration::zero());
    let tz: rrule::Tz = Utc.into();
    let after = (range.start_utc() - span - Duration::seconds(1)).with_timezone(&tz);
    let before = (range.end_utc() + Duration::seconds(1)).with_timezone(&tz);

    let result = rrule_set.after(after).before(before).all(MAX_INSTANCES);
    if result.limited {
        tracing::debug!(event = %master.id, limit = MAX_INSTANCES, "recurrence expansion truncated");
    }

    let instances = result
        .dates
        .iter()
        .map(|occ_dt| {
            let start = occurrence_to_event_time(occ_dt, &master.start);
            let end = match (&master.start, &master.end) {
                (EventTime::Date(d_start), EventTime::Date(d_end)) => {
                    let day_diff = (*d_end - *d_start).num_days();
                    EventTime::Date(occ_dt.date_naive() + Duration::days(day_diff))
                }
                (s, e) => EventTime::DateTime(occ_dt.with_timezone(&Utc) + (e.to_utc() - s.to_utc())),
            };

            CalendarEvent {
                id: format!(
                    "{}_{}",
                    master.id,
                    occ_dt.with_timezone(&Utc).format("%Y%m%d")
                ),
                start,
                end,
                recurrence: None,
                ..master.clone()
            }
        })
        .filter(|instance| range.overlaps(instance))
        .collect();

    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Frequency;
    use chrono::{NaiveDate, TimeZone, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_split_instance_id() {
        assert_eq!(
            split_instance_id("sunday-dinner_20250608"),
            Some(("sunday-dinner", date(2025, 6, 8)))
        );
        assert_eq!(split_instance_id("a_b_20250101"), Some(("a_b", date(2025, 1, 1))));
        assert_eq!(split_instance_id("dinner_20251301"), None);
        assert_eq!(split_instance_id("dinner_2025061"), None);
        assert_eq!(split_instance_id("dinner_extra"), None);
        assert_eq!(split_instance_id("dinner"), None);
    }

    #[test]
    fn test_non_recurring_event_expands_to_nothing() {
        let event = CalendarEvent::new(
            "Once",
            EventTime::Date(date(2025, 1, 1)),
            EventTime::Date(date(2025, 1, 1)),
        );
        let range = DateRange::new(date(2025, 1, 1), date(2025, 12, 31)).unwrap();
        assert!(expand_recurring_event(&event, &range).unwrap().is_empty());
    }

    #[test]
    fn test_weekly_on_weekdays_within_range() {
        let mut event = CalendarEvent::new(
            "Piano lesson",
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 3, 3, 16, 0, 0).unwrap()),
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 3, 3, 17, 0, 0).unwrap()),
        );
        event.id = "piano".into();
        let mut rule = Recurrence::new(Frequency::Weekly);
        rule.weekdays = vec![Weekday::Mon, Weekday::Thu];
        event.recurrence = Some(rule);

        // Mon 10th, Thu 13th, Mon 17th
        let range = DateRange::new(date(2025, 3, 10), date(2025, 3, 17)).unwrap();
        let instances = expand_recurring_event(&event, &range).unwrap();

        let ids: Vec<_> = instances.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["piano_20250310", "piano_20250313", "piano_20250317"]);

        let first = &instances[0];
        assert_eq!(
            first.end,
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap())
        );
        assert!(first.recurrence.is_none());
        assert_eq!(first.title, "Piano lesson");
    }

    #[test]
    fn test_until_stops_expansion() {
        let mut event = CalendarEvent::new(
            "Swim club",
            EventTime::Date(date(2025, 1, 1)),
            EventTime::Date(date(2025, 1, 1)),
        );
        let mut rule = Recurrence::new(Frequency::Monthly);
        rule.until = Some(date(2025, 3, 15));
        event.recurrence = Some(rule);

        let range = DateRange::new(date(2025, 1, 1), date(2025, 12, 31)).unwrap();
        let instances = expand_recurring_event(&event, &range).unwrap();

        let starts: Vec<_> = instances.iter().map(|e| e.start.date()).collect();
        assert_eq!(starts, vec![date(2025, 1, 1), date(2025, 2, 1), date(2025, 3, 1)]);
    }

    #[test]
    fn test_multi_day_instance_overlapping_range_start_is_kept() {
        let mut event = CalendarEvent::new(
            "Lake weekend",
            EventTime::Date(date(2025, 3, 7)),
            EventTime::Date(date(2025, 3, 9)),
        );
        event.id = "lake".into();
        event.recurrence = Some(Recurrence::new(Frequency::Weekly));

        // Sat 8th falls inside the Fri 7th to Sun 9th instance
        let range = DateRange::new(date(2025, 3, 8), date(2025, 3, 13)).unwrap();
        let instances = expand_recurring_event(&event, &range).unwrap();

        let ids: Vec<_> = instances.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["lake_20250307"]);
        assert_eq!(instances[0].end, EventTime::Date(date(2025, 3, 9)));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let mut event = CalendarEvent::new(
            "Broken",
            EventTime::Date(date(2025, 1, 1)),
            EventTime::Date(date(2025, 1, 1)),
        );
        let mut rule = Recurrence::new(Frequency::Daily);
        rule.interval = 0;
        event.recurrence = Some(rule);

        let range = DateRange::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap();
        assert!(expand_recurring_event(&event, &range).is_err());
    }
}
