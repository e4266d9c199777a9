//! ICS export of a calendar view.

use chrono::Duration;
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::error::KinResult;
use crate::event::{CalendarEvent, EventCategory, EventTime};

/// Generate one .ics document holding every event.
pub fn generate_calendar_ics(name: &str, events: &[CalendarEvent]) -> KinResult<String> {
    let mut cal = Calendar::new();
    cal.name(name);

    for event in events {
        cal.push(to_ics_event(event));
    }

    let cal = cal.done();
    Ok(strip_ics_bloat(&cal.to_string()))
}

fn to_ics_event(event: &CalendarEvent) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&format!("{}@kinfolk", event.id));
    ics_event.summary(&event.title);

    // DTSTAMP - required by RFC 5545
    let dtstamp = event
        .updated_at
        .or(event.created_at)
        .unwrap_or_else(chrono::Utc::now)
        .format("%Y%m%dT%H%M%SZ")
        .to_string();
    ics_event.add_property("DTSTAMP", &dtstamp);

    add_datetime_property(&mut ics_event, "DTSTART", &event.start);

    // DTEND is exclusive for all-day events, while ours is the last day
    let end = match &event.end {
        EventTime::Date(d) => EventTime::Date(*d + Duration::days(1)),
        other => other.clone(),
    };
    add_datetime_property(&mut ics_event, "DTEND", &end);

    if let Some(ref desc) = event.description {
        ics_event.description(desc);
    }

    if let Some(ref loc) = event.location {
        ics_event.location(loc);
    }

    if let Some(ref recurrence) = event.recurrence {
        ics_event.add_property("RRULE", &recurrence.to_rrule());
    }

    if let Some(category) = event.category {
        ics_event.add_property("CATEGORIES", category_name(category));
    }

    // Birthdays and memorials do not block time
    if matches!(
        event.category,
        Some(EventCategory::Birthday | EventCategory::Memorial)
    ) {
        ics_event.add_property("TRANSP", "TRANSPARENT");
    }

    ics_event.done()
}

fn category_name(category: EventCategory) -> &'static str {
    match category {
        EventCategory::Birthday => "BIRTHDAY",
        EventCategory::Memorial => "MEMORIAL",
        EventCategory::Holiday => "HOLIDAY",
        EventCategory::FamilyEvent => "FAMILY",
        EventCategory::Appointment => "APPOINTMENT",
    }
}

/// Add a datetime property with proper formatting based on EventTime variant
fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &EventTime) {
    match time {
        EventTime::Date(d) => {
            let mut prop = Property::new(name, d.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
        EventTime::DateTime(dt) => {
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%SZ").to_string());
        }
    }
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with KINFOLK
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:KINFOLK\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
