//! Calendar event reconciliation and visibility filtering.
//!
//! A calendar load gathers events from three places: the remote event store,
//! the local cache of the last remote snapshot, and events generated from
//! member birthdays and death dates. [`reconcile`] merges them by id, drops
//! everything the viewer's family group must not see, and normalizes colors.

mod colors;
mod loader;

pub use colors::{Palette, normalize_colors, palette};
pub use loader::{CalendarLoader, CalendarView};

use std::collections::{HashMap, HashSet};

use crate::event::CalendarEvent;
use crate::group::{FamilyGroup, GroupDirectory};

/// Who is looking at the calendar.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: String,
    pub group: FamilyGroup,
    /// Member ids belonging to the viewer's family group
    pub family_ids: HashSet<String>,
}

impl Viewer {
    pub fn resolve(id: &str, directory: &GroupDirectory) -> Self {
        let group = directory.viewer_group(id);
        Viewer {
            id: id.to_string(),
            group,
            family_ids: directory.member_ids(group),
        }
    }
}

/// The three event sources of a calendar load.
#[derive(Debug, Clone, Default)]
pub struct EventSources {
    pub remote: Vec<CalendarEvent>,
    pub cached: Vec<CalendarEvent>,
    pub generated: Vec<CalendarEvent>,
}

/// Union of the sources keyed by event id.
///
/// Later sources win on collision: remote events replace cached ones, and
/// generated birthday/memorial events replace both.
pub fn merge_sources(sources: EventSources) -> HashMap<String, CalendarEvent> {
    let EventSources {
        remote,
        cached,
        generated,
    } = sources;

    cached
        .into_iter()
        .chain(remote)
        .chain(generated)
        .map(|event| (event.id.clone(), event))
        .collect()
}

/// Whether `viewer` may see `event`.
///
/// System events (no owner) are visible to everyone. An explicit group tag
/// that differs from the viewer's hides the event. Otherwise the owner must be
/// placed in the viewer's group, by classification when the owner is known,
/// or by membership of the viewer's family ids. Anything undetermined is hidden.
pub fn is_visible(event: &CalendarEvent, viewer: &Viewer, directory: &GroupDirectory) -> bool {
    let Some(owner) = event.owner_id.as_deref() else {
        return true;
    };

    if event.family_group.is_some_and(|tag| tag != viewer.group) {
        return false;
    }

    match directory.classify(owner) {
        Some(group) => group == viewer.group,
        None => viewer.family_ids.contains(owner),
    }
}

/// Merge, filter and normalize. The result is ordered by start, then id.
pub fn reconcile(
    sources: EventSources,
    viewer: &Viewer,
    directory: &GroupDirectory,
) -> Vec<CalendarEvent> {
    let merged = merge_sources(sources);
    let total = merged.len();

    let mut visible: Vec<CalendarEvent> = merged
        .into_values()
        .filter(|event| is_visible(event, viewer, directory))
        .collect();

    for event in &mut visible {
        normalize_colors(event);
    }

    sort_events(&mut visible);

    tracing::debug!(
        viewer = %viewer.id,
        group = %viewer.group,
        total,
        visible = visible.len(),
        "reconciled calendar events"
    );

    visible
}

pub(crate) fn sort_events(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| {
        a.start
            .to_utc()
            .cmp(&b.start.to_utc())
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventCategory, EventTime};
    use crate::member::FamilyMember;
    use chrono::NaiveDate;

    fn day(d: u32) -> EventTime {
        EventTime::Date(NaiveDate::from_ymd_opt(2025, 6, d).unwrap())
    }

    fn event(id: &str, title: &str, owner: Option<&str>, d: u32) -> CalendarEvent {
        let mut e = CalendarEvent::new(title, day(d), day(d));
        e.id = id.to_string();
        e.owner_id = owner.map(str::to_string);
        e
    }

    fn member(id: &str, group: FamilyGroup) -> FamilyMember {
        let mut m = FamilyMember::new("Test", "Member", group);
        m.id = id.to_string();
        m
    }

    fn directory() -> GroupDirectory {
        GroupDirectory::new(
            ["demo-user"],
            &[
                member("alice", FamilyGroup::Real),
                member("bob", FamilyGroup::Real),
                member("dora", FamilyGroup::Demo),
            ],
        )
    }

    #[test]
    fn test_merge_precedence_generated_over_remote_over_cache() {
        let sources = EventSources {
            cached: vec![
                event("shared", "from cache", None, 1),
                event("cache-only", "cache only", None, 1),
                event("birthday-alice-2025", "cached birthday", None, 1),
            ],
            remote: vec![
                event("shared", "from remote", None, 1),
                event("birthday-alice-2025", "remote birthday", None, 1),
            ],
            generated: vec![event("birthday-alice-2025", "generated birthday", None, 1)],
        };

        let merged = merge_sources(sources);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged["shared"].title, "from remote");
        assert_eq!(merged["cache-only"].title, "cache only");
        assert_eq!(merged["birthday-alice-2025"].title, "generated birthday");
    }

    #[test]
    fn test_system_events_are_visible_to_everyone() {
        let directory = directory();
        let holiday = event("new-year", "Holiday", None, 1);

        for viewer_id in ["alice", "dora", "demo-user", "stranger"] {
            let viewer = Viewer::resolve(viewer_id, &directory);
            assert!(is_visible(&holiday, &viewer, &directory), "{viewer_id}");
        }
    }

    #[test]
    fn test_owner_classification_decides() {
        let directory = directory();
        let real_viewer = Viewer::resolve("alice", &directory);
        let demo_viewer = Viewer::resolve("dora", &directory);

        let bobs = event("e1", "Bob's BBQ", Some("bob"), 1);
        let demos = event("e2", "Demo party", Some("demo-user"), 1);

        assert!(is_visible(&bobs, &real_viewer, &directory));
        assert!(!is_visible(&bobs, &demo_viewer, &directory));
        assert!(is_visible(&demos, &demo_viewer, &directory));
        assert!(!is_visible(&demos, &real_viewer, &directory));
    }

    #[test]
    fn test_mismatched_tag_hides_even_own_group_owner() {
        let directory = directory();
        let viewer = Viewer::resolve("alice", &directory);

        let mut tagged = event("e1", "Mislabeled", Some("bob"), 1);
        tagged.family_group = Some(FamilyGroup::Demo);

        assert!(!is_visible(&tagged, &viewer, &directory));
    }

    #[test]
    fn test_matching_tag_does_not_admit_foreign_owner() {
        let directory = directory();
        let viewer = Viewer::resolve("alice", &directory);

        let mut tagged = event("e1", "Sneaky", Some("dora"), 1);
        tagged.family_group = Some(FamilyGroup::Real);

        assert!(!is_visible(&tagged, &viewer, &directory));
    }

    #[test]
    fn test_undetermined_owner_falls_back_to_family_ids() {
        let directory = directory();
        let mut viewer = Viewer::resolve("alice", &directory);

        let orphan = event("e1", "Unknown owner", Some("carol"), 1);
        assert!(!is_visible(&orphan, &viewer, &directory));

        viewer.family_ids.insert("carol".into());
        assert!(is_visible(&orphan, &viewer, &directory));
    }

    #[test]
    fn test_no_event_from_outside_the_viewers_group_is_returned() {
        let directory = directory();
        let owners = [Some("alice"), Some("bob"), Some("dora"), Some("demo-user"), Some("ghost"), None];
        let tags = [None, Some(FamilyGroup::Real), Some(FamilyGroup::Demo)];

        let mut remote = Vec::new();
        for (i, owner) in owners.iter().enumerate() {
            for (j, tag) in tags.iter().enumerate() {
                let mut e = event(&format!("e{i}{j}"), "x", *owner, 1 + i as u32);
                e.family_group = *tag;
                remote.push(e);
            }
        }

        for viewer_id in ["alice", "dora", "demo-user", "stranger"] {
            let viewer = Viewer::resolve(viewer_id, &directory);
            let visible = reconcile(
                EventSources {
                    remote: remote.clone(),
                    ..EventSources::default()
                },
                &viewer,
                &directory,
            );

            assert!(!visible.is_empty());
            for e in &visible {
                if let Some(owner) = e.owner_id.as_deref() {
                    assert!(
                        viewer.family_ids.contains(owner),
                        "{viewer_id} saw {owner}'s event {}",
                        e.id
                    );
                }
            }
        }
    }

    #[test]
    fn test_reconcile_orders_and_normalizes() {
        let directory = directory();
        let viewer = Viewer::resolve("alice", &directory);

        let mut birthday = event("birthday-bob-2025", "Bob's Birthday", Some("bob"), 3);
        birthday.category = Some(EventCategory::Birthday);

        let visible = reconcile(
            EventSources {
                remote: vec![event("b", "Later", None, 5), event("a", "Same day", None, 3)],
                cached: vec![],
                generated: vec![birthday],
            },
            &viewer,
            &directory,
        );

        let ids: Vec<_> = visible.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "birthday-bob-2025", "b"]);
        assert_eq!(visible[1].background_color.as_deref(), Some("#F472B6"));
        assert!(visible.iter().all(|e| e.background_color.is_some()));
    }
}
