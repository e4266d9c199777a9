//! Terminal rendering for kinfolk types.
//!
//! Extension traits that add colored output to kinfolk-core types using owo_colors.

use chrono::Local;
use kinfolk_core::relationship::{Relative, Suggestion};
use kinfolk_core::{CalendarEvent, EventCategory, EventTime, FamilyGroup, FamilyMember};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for FamilyGroup {
    fn render(&self) -> String {
        match self {
            FamilyGroup::Demo => "demo".yellow().to_string(),
            FamilyGroup::Real => "real".green().to_string(),
        }
    }
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let title = match self.category {
            Some(EventCategory::Birthday) => format!("🎂 {}", self.title).magenta().to_string(),
            Some(EventCategory::Memorial) => format!("🕯 {}", self.title).dimmed().to_string(),
            Some(EventCategory::Holiday) => self.title.green().to_string(),
            _ => self.title.clone(),
        };

        let mut line = format!("  {} {}", format_time(&self.start), title);
        if let Some(location) = &self.location {
            line.push_str(&format!(" {}", format!("@ {location}").dimmed()));
        }
        line
    }
}

impl Render for FamilyMember {
    fn render(&self) -> String {
        let mut line = format!("{} {}", self.full_name().bold(), format!("({})", self.id).dimmed());

        if let Some(nickname) = &self.nickname {
            line.push_str(&format!(" \"{nickname}\""));
        }
        match (self.birthday, self.death_date) {
            (Some(born), Some(died)) => line.push_str(&format!(" {born} – {died}")),
            (Some(born), None) => line.push_str(&format!(" b. {born}")),
            (None, Some(died)) => line.push_str(&format!(" d. {died}")),
            (None, None) => {}
        }
        line
    }
}

impl Render for Relative {
    fn render(&self) -> String {
        format!(
            "  {} {} {}",
            format!("{:<16}", self.label).cyan(),
            self.name,
            format!("({})", self.member_id).dimmed()
        )
    }
}

impl Render for Suggestion {
    fn render(&self) -> String {
        format!(
            "  {} {} → {}  {}",
            format!("{:<16}", self.relationship_type.label()).cyan(),
            self.from_member_id,
            self.to_member_id,
            self.reason.dimmed()
        )
    }
}

/// A human-readable day label (e.g. "Today", "Tomorrow", "Wed Feb 25")
pub fn format_date_label(time: &EventTime) -> String {
    let today = Local::now().date_naive();
    let date = match time {
        EventTime::Date(d) => *d,
        EventTime::DateTime(dt) => dt.with_timezone(&Local).date_naive(),
    };

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

/// The time portion of an event (e.g. "15:00" or "all-day")
fn format_time(time: &EventTime) -> String {
    match time {
        EventTime::Date(_) => "all-day".to_string(),
        EventTime::DateTime(dt) => format!("{:>7}", dt.with_timezone(&Local).format("%H:%M")),
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
