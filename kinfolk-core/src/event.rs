//! Calendar event types.
//!
//! Events are stored in the remote event table, mirrored into the local cache,
//! and synthesized from member records (birthdays and memorials). All three
//! sources share this one shape.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{KinError, KinResult};
use crate::group::FamilyGroup;
use crate::store::Document;

/// A calendar event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default)]
    pub all_day: bool,

    // Presentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,

    // Ownership
    /// User who owns the event. None for system events, which everyone sees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Explicit family group tag. When absent the owner's classification decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_group: Option<FamilyGroup>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Start or end of an event. Serialized as an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventCategory {
    Birthday,
    Memorial,
    Holiday,
    FamilyEvent,
    Appointment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A simple recurrence rule: every `interval` `frequency`s, optionally on given weekdays,
/// until a date or for a number of occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekdays: Vec<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

fn default_interval() -> u32 {
    1
}

impl Document for CalendarEvent {
    const KIND: &'static str = "event";

    fn id(&self) -> &str {
        &self.id
    }
}

impl CalendarEvent {
    pub fn new(title: &str, start: EventTime, end: EventTime) -> Self {
        let all_day = start.is_date();
        CalendarEvent {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            start,
            end,
            all_day,
            background_color: None,
            border_color: None,
            text_color: None,
            owner_id: None,
            family_group: None,
            recurrence: None,
            category: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Birthday and memorial events synthesized from member records.
    pub fn is_generated(&self) -> bool {
        matches!(
            self.category,
            Some(EventCategory::Birthday | EventCategory::Memorial)
        ) && (self.id.starts_with("birthday-") || self.id.starts_with("memorial-"))
    }

    pub fn validate(&self) -> KinResult<()> {
        if self.title.trim().is_empty() {
            return Err(KinError::Validation("Event title must not be empty".into()));
        }
        if self.end.to_utc() < self.start.to_utc() {
            return Err(KinError::Validation(format!(
                "Event '{}' ends before it starts",
                self.title
            )));
        }
        if let Some(recurrence) = &self.recurrence {
            recurrence.validate()?;
        }
        Ok(())
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl EventTime {
    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// UTC instant; all-day dates map to midnight UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => d.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::DateTime(dt) => dt.date_naive(),
            EventTime::Date(d) => *d,
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl Frequency {
    fn as_rrule(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl Recurrence {
    pub fn new(frequency: Frequency) -> Self {
        Recurrence {
            frequency,
            interval: 1,
            weekdays: Vec::new(),
            until: None,
            count: None,
        }
    }

    pub fn validate(&self) -> KinResult<()> {
        if self.interval == 0 {
            return Err(KinError::Validation(
                "Recurrence interval must be at least 1".into(),
            ));
        }
        if self.count == Some(0) {
            return Err(KinError::Validation(
                "Recurrence count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// RFC 5545 RRULE value, e.g. `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE;UNTIL=20251231T235959Z`.
    pub fn to_rrule(&self) -> String {
        let mut parts = vec![format!("FREQ={}", self.frequency.as_rrule())];

        if self.interval > 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }

        if !self.weekdays.is_empty() {
            let days: Vec<&str> = self.weekdays.iter().map(weekday_code).collect();
            parts.push(format!("BYDAY={}", days.join(",")));
        }

        if let Some(until) = self.until {
            parts.push(format!("UNTIL={}T235959Z", until.format("%Y%m%d")));
        } else if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }

        parts.join(";")
    }
}

fn weekday_code(day: &Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Fields a client supplies when creating or replacing an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub description: Option<String>,
    pub location: Option<String>,
    pub recurrence: Option<Recurrence>,
    pub category: Option<EventCategory>,
    pub background_color: Option<String>,
    pub border_color: Option<String>,
    pub text_color: Option<String>,
}

impl EventDraft {
    /// Build a new event owned by `owner`.
    pub fn into_event(self, owner: &str, group: FamilyGroup) -> KinResult<CalendarEvent> {
        let mut event = CalendarEvent::new(&self.title, self.start.clone(), self.end.clone());
        event.owner_id = Some(owner.to_string());
        event.family_group = Some(group);
        event.created_at = Some(Utc::now());
        self.apply(&mut event)?;
        Ok(event)
    }

    /// Replace the editable fields of an existing event, keeping id and ownership.
    pub fn apply(self, event: &mut CalendarEvent) -> KinResult<()> {
        if self.category.is_some_and(|c| matches!(c, EventCategory::Birthday | EventCategory::Memorial))
        {
            return Err(KinError::Validation(
                "Birthday and memorial events are generated from member records".into(),
            ));
        }

        event.all_day = self.start.is_date();
        event.title = self.title;
        event.start = self.start;
        event.end = self.end;
        event.description = self.description;
        event.location = self.location;
        event.recurrence = self.recurrence;
        event.category = self.category;
        event.background_color = self.background_color;
        event.border_color = self.border_color;
        event.text_color = self.text_color;
        event.updated_at = Some(Utc::now());

        event.validate()
    }
}
