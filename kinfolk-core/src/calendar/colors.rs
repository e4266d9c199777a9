//! Presentation colors by event category.

use crate::event::{CalendarEvent, EventCategory};

/// Background, border and text color for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub border: &'static str,
    pub text: &'static str,
}

pub fn palette(category: EventCategory) -> Palette {
    match category {
        EventCategory::Birthday => Palette {
            background: "#F472B6",
            border: "#DB2777",
            text: "#FFFFFF",
        },
        EventCategory::Memorial => Palette {
            background: "#9CA3AF",
            border: "#6B7280",
            text: "#FFFFFF",
        },
        EventCategory::Holiday => Palette {
            background: "#34D399",
            border: "#059669",
            text: "#FFFFFF",
        },
        EventCategory::FamilyEvent => Palette {
            background: "#60A5FA",
            border: "#2563EB",
            text: "#FFFFFF",
        },
        EventCategory::Appointment => Palette {
            background: "#FBBF24",
            border: "#D97706",
            text: "#1F2937",
        },
    }
}

/// Rewrite an event's colors from its category.
///
/// Uncategorized events keep whatever colors they carry; missing ones are
/// filled from the family-event palette.
pub fn normalize_colors(event: &mut CalendarEvent) {
    let fill = |slot: &mut Option<String>, value: &str, force: bool| {
        if force || slot.is_none() {
            *slot = Some(value.to_string());
        }
    };

    let (palette, force) = match event.category {
        Some(category) => (palette(category), true),
        None => (palette(EventCategory::FamilyEvent), false),
    };

    fill(&mut event.background_color, palette.background, force);
    fill(&mut event.border_color, palette.border, force);
    fill(&mut event.text_color, palette.text, force);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono::NaiveDate;

    fn event(category: Option<EventCategory>) -> CalendarEvent {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut e = CalendarEvent::new("Something", EventTime::Date(day), EventTime::Date(day));
        e.category = category;
        e
    }

    #[test]
    fn test_category_overrides_stored_colors() {
        let mut e = event(Some(EventCategory::Birthday));
        e.background_color = Some("#000000".into());

        normalize_colors(&mut e);

        assert_eq!(e.background_color.as_deref(), Some("#F472B6"));
        assert_eq!(e.border_color.as_deref(), Some("#DB2777"));
        assert_eq!(e.text_color.as_deref(), Some("#FFFFFF"));
    }

    #[test]
    fn test_uncategorized_keeps_custom_colors() {
        let mut e = event(None);
        e.background_color = Some("#123456".into());

        normalize_colors(&mut e);

        assert_eq!(e.background_color.as_deref(), Some("#123456"));
        assert_eq!(e.border_color.as_deref(), Some("#2563EB"));
    }
}
