//! One calendar load: gather sources, reconcile, expand recurrences.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::calendar::{EventSources, Viewer, reconcile, sort_events};
use crate::date_range::DateRange;
use crate::event::CalendarEvent;
use crate::generated::generate_events;
use crate::group::{FamilyGroup, GroupDirectory};
use crate::member::FamilyMember;
use crate::recurrence::expand_recurring_event;
use crate::store::{EventCache, EventStore};

/// The result of a calendar load.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarView {
    pub viewer: String,
    pub family_group: FamilyGroup,
    /// False when the remote store failed and only cached/generated events were used
    pub remote_available: bool,
    pub events: Vec<CalendarEvent>,
}

pub struct CalendarLoader {
    store: Arc<dyn EventStore>,
    cache: EventCache,
}

impl CalendarLoader {
    pub fn new(store: Arc<dyn EventStore>, cache: EventCache) -> Self {
        CalendarLoader { store, cache }
    }

    /// Load the calendar `viewer_id` sees within `range`.
    ///
    /// A remote failure is logged and the load continues with the cached
    /// snapshot. A successful remote fetch refreshes the cache, and cached
    /// events missing from the remote set are dropped as deleted.
    pub async fn load(
        &self,
        viewer_id: &str,
        members: &[FamilyMember],
        directory: &GroupDirectory,
        range: &DateRange,
    ) -> CalendarView {
        let mut cached = self.cache.read().await;

        let (remote, remote_available) = match self.store.list_events().await {
            Ok(events) => {
                if let Err(e) = self.cache.write(&events).await {
                    tracing::warn!(error = %e, "could not refresh event cache");
                }
                let live: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();
                let before = cached.len();
                cached.retain(|e| live.contains(e.id.as_str()));
                if cached.len() < before {
                    tracing::debug!(dropped = before - cached.len(), "pruned deleted events from cache");
                }
                (events, true)
            }
            Err(e) => {
                tracing::warn!(error = %e, cached = cached.len(), "remote event store unavailable, using cache");
                (Vec::new(), false)
            }
        };

        let generated = generate_events(members, range);
        let viewer = Viewer::resolve(viewer_id, directory);

        let visible = reconcile(
            EventSources {
                remote,
                cached,
                generated,
            },
            &viewer,
            directory,
        );

        let mut events = Vec::with_capacity(visible.len());
        for event in visible {
            if event.recurrence.is_some() {
                match expand_recurring_event(&event, range) {
                    Ok(instances) => events.extend(instances),
                    Err(e) => {
                        tracing::warn!(event = %event.id, error = %e, "skipping unexpandable recurring event")
                    }
                }
            } else if range.overlaps(&event) {
                events.push(event);
            }
        }
        sort_events(&mut events);

        tracing::info!(
            viewer = %viewer.id,
            group = %viewer.group,
            events = events.len(),
            remote_available,
            "loaded calendar"
        );

        CalendarView {
            viewer: viewer.id,
            family_group: viewer.group,
            remote_available,
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{KinError, KinResult};
    use crate::event::{EventTime, Frequency, Recurrence};
    use crate::store::Table;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct Unreachable;

    #[async_trait]
    impl EventStore for Unreachable {
        async fn list_events(&self) -> KinResult<Vec<CalendarEvent>> {
            Err(KinError::Storage("connection refused".into()))
        }

        async fn get_event(&self, _id: &str) -> KinResult<Option<CalendarEvent>> {
            Err(KinError::Storage("connection refused".into()))
        }

        async fn put_event(&self, _event: &CalendarEvent) -> KinResult<()> {
            Err(KinError::Storage("connection refused".into()))
        }

        async fn delete_event(&self, _id: &str) -> KinResult<bool> {
            Err(KinError::Storage("connection refused".into()))
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: &str, owner: &str, day: NaiveDate) -> CalendarEvent {
        let mut e = CalendarEvent::new(id, EventTime::Date(day), EventTime::Date(day));
        e.id = id.to_string();
        e.owner_id = Some(owner.to_string());
        e
    }

    fn members() -> Vec<FamilyMember> {
        let mut alice = FamilyMember::new("Alice", "Smith", FamilyGroup::Real);
        alice.id = "alice".into();
        alice.birthday = Some(date(1980, 6, 10));

        let mut dora = FamilyMember::new("Dora", "Demo", FamilyGroup::Demo);
        dora.id = "dora".into();
        dora.birthday = Some(date(1990, 6, 12));

        vec![alice, dora]
    }

    fn june() -> DateRange {
        DateRange::new(date(2025, 6, 1), date(2025, 6, 30)).unwrap()
    }

    #[tokio::test]
    async fn test_load_merges_remote_and_generated_for_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let table: Table<CalendarEvent> = Table::open(dir.path().join("events"));
        table.put(&event("picnic", "alice", date(2025, 6, 20))).await.unwrap();
        table.put(&event("demo-fair", "dora", date(2025, 6, 21))).await.unwrap();
        table.put(&event("last-year", "alice", date(2024, 6, 20))).await.unwrap();

        let members = members();
        let directory = GroupDirectory::new(Vec::<String>::new(), &members);
        let loader = CalendarLoader::new(Arc::new(table), EventCache::new(&dir.path().join("cache")));

        let view = loader.load("alice", &members, &directory, &june()).await;

        let ids: Vec<_> = view.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["birthday-alice-2025", "picnic"]);
        assert!(view.remote_available);
        assert_eq!(view.family_group, FamilyGroup::Real);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EventCache::new(dir.path());
        cache.write(&[event("cached-picnic", "alice", date(2025, 6, 20))]).await.unwrap();

        let members = members();
        let directory = GroupDirectory::new(Vec::<String>::new(), &members);
        let loader = CalendarLoader::new(Arc::new(Unreachable), cache);

        let view = loader.load("alice", &members, &directory, &june()).await;

        let ids: Vec<_> = view.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["birthday-alice-2025", "cached-picnic"]);
        assert!(!view.remote_available);
    }

    #[tokio::test]
    async fn test_successful_load_refreshes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let table: Table<CalendarEvent> = Table::open(dir.path().join("events"));
        table.put(&event("picnic", "alice", date(2025, 6, 20))).await.unwrap();
        let cache = EventCache::new(&dir.path().join("cache"));

        let members = members();
        let directory = GroupDirectory::new(Vec::<String>::new(), &members);
        let loader = CalendarLoader::new(Arc::new(table), cache.clone());
        loader.load("alice", &members, &directory, &june()).await;

        let cached: Vec<_> = cache.read().await.into_iter().map(|e| e.id).collect();
        assert_eq!(cached, vec!["picnic"]);
    }

    #[tokio::test]
    async fn test_events_deleted_remotely_do_not_return_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let table: Table<CalendarEvent> = Table::open(dir.path().join("events"));
        table.put(&event("picnic", "alice", date(2025, 6, 20))).await.unwrap();
        let cache = EventCache::new(&dir.path().join("cache"));
        cache.write(&[
            event("picnic", "alice", date(2025, 6, 20)),
            event("cancelled", "alice", date(2025, 6, 21)),
        ])
        .await
        .unwrap();

        let members: Vec<FamilyMember> = members().into_iter().map(|mut m| {
            m.birthday = None;
            m
        }).collect();
        let directory = GroupDirectory::new(Vec::<String>::new(), &members);
        let loader = CalendarLoader::new(Arc::new(table), cache);

        let view = loader.load("alice", &members, &directory, &june()).await;

        let ids: Vec<_> = view.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["picnic"]);
    }

    #[tokio::test]
    async fn test_recurring_events_are_expanded_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let table: Table<CalendarEvent> = Table::open(dir.path().join("events"));
        let mut dinner = event("sunday-dinner", "alice", date(2025, 1, 5));
        dinner.recurrence = Some(Recurrence::new(Frequency::Weekly));
        table.put(&dinner).await.unwrap();

        let members: Vec<FamilyMember> = members().into_iter().map(|mut m| {
            m.birthday = None;
            m
        }).collect();
        let directory = GroupDirectory::new(Vec::<String>::new(), &members);
        let loader = CalendarLoader::new(Arc::new(table), EventCache::new(&dir.path().join("cache")));

        let view = loader.load("alice", &members, &directory, &june()).await;

        // Sundays in June 2025: 1, 8, 15, 22, 29
        assert_eq!(view.events.len(), 5);
        assert_eq!(view.events[0].id, "sunday-dinner_20250601");
        assert!(view.events.iter().all(|e| e.recurrence.is_none()));
    }
}
