//! Birthday and memorial events synthesized from member records.

use chrono::{Datelike, NaiveDate};

use crate::date_range::DateRange;
use crate::event::{CalendarEvent, EventCategory, EventTime};
use crate::member::FamilyMember;

/// The anniversary of `date` in `year`. Feb 29 falls back to Feb 28 in non-leap years.
fn anniversary(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), date.day() - 1))
}

fn all_day(id: String, title: String, day: NaiveDate, member: &FamilyMember) -> CalendarEvent {
    let mut event = CalendarEvent::new(&title, EventTime::Date(day), EventTime::Date(day));
    event.id = id;
    event.owner_id = Some(member.id.clone());
    event.family_group = Some(member.family_group);
    event
}

/// Birthday events for one member, one per year of `range`.
///
/// Birthdays after a member's death are kept as "in memory" entries. Nothing
/// is produced before the member was born.
pub fn birthday_events(member: &FamilyMember, range: &DateRange) -> Vec<CalendarEvent> {
    let Some(birthday) = member.birthday else {
        return Vec::new();
    };

    range
        .years()
        .filter(|year| *year >= birthday.year())
        .filter_map(|year| anniversary(birthday, year))
        .filter(|day| range.contains(*day))
        .map(|day| {
            let deceased = member.death_date.is_some_and(|died| day > died);
            let title = if deceased {
                format!("{}'s Birthday (in memory)", member.display_name())
            } else {
                format!("{}'s Birthday", member.display_name())
            };

            let mut event = all_day(
                format!("birthday-{}-{}", member.id, day.year()),
                title,
                day,
                member,
            );
            event.category = Some(EventCategory::Birthday);
            if !deceased && day.year() > birthday.year() {
                if let Some(age) = member.age_on(day) {
                    event.description = Some(format!("Turns {age}"));
                }
            }
            event
        })
        .collect()
}

/// Memorial events for a deceased member, one per year after the year of death.
pub fn memorial_events(member: &FamilyMember, range: &DateRange) -> Vec<CalendarEvent> {
    let Some(died) = member.death_date else {
        return Vec::new();
    };

    range
        .years()
        .filter(|year| *year > died.year())
        .filter_map(|year| anniversary(died, year))
        .filter(|day| range.contains(*day))
        .map(|day| {
            let mut event = all_day(
                format!("memorial-{}-{}", member.id, day.year()),
                format!("In memory of {}", member.display_name()),
                day,
                member,
            );
            event.category = Some(EventCategory::Memorial);
            let years = day.year() - died.year();
            event.description = Some(format!(
                "{} year{} since {} passed",
                years,
                if years == 1 { "" } else { "s" },
                member.display_name()
            ));
            event
        })
        .collect()
}

/// All generated events for a set of members.
pub fn generate_events(members: &[FamilyMember], range: &DateRange) -> Vec<CalendarEvent> {
    members
        .iter()
        .flat_map(|m| {
            let mut events = birthday_events(m, range);
            events.extend(memorial_events(m, range));
            events
        })
        .collect()
}
