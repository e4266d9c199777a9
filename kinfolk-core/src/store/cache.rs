//! Local snapshot of the remote event store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::KinResult;
use crate::event::CalendarEvent;

const CACHE_FILE: &str = "events.json";

#[derive(Serialize, Deserialize)]
struct Snapshot {
    saved_at: DateTime<Utc>,
    events: Vec<CalendarEvent>,
}

/// The last successfully fetched remote events, kept on disk.
#[derive(Debug, Clone)]
pub struct EventCache {
    path: PathBuf,
    ttl: Option<Duration>,
}

impl EventCache {
    pub fn new(dir: &Path) -> Self {
        EventCache {
            path: dir.join(CACHE_FILE),
            ttl: None,
        }
    }

    /// Snapshots older than `ttl` are treated as absent.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Cached events. A missing, unreadable, corrupt or expired snapshot all read as empty.
    pub async fn read(&self) -> Vec<CalendarEvent> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no event cache");
                return Vec::new();
            }
        };

        let snapshot: Snapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "ignoring corrupt event cache");
                return Vec::new();
            }
        };

        if let Some(ttl) = self.ttl {
            let age = Utc::now().signed_duration_since(snapshot.saved_at);
            if age.to_std().is_ok_and(|age| age > ttl) {
                tracing::debug!(saved_at = %snapshot.saved_at, "event cache expired");
                return Vec::new();
            }
        }

        snapshot.events
    }

    pub async fn write(&self, events: &[CalendarEvent]) -> KinResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let snapshot = Snapshot {
            saved_at: Utc::now(),
            events: events.to_vec(),
        };
        tokio::fs::write(&self.path, serde_json::to_vec(&snapshot)?).await?;

        tracing::debug!(count = events.len(), path = %self.path.display(), "refreshed event cache");
        Ok(())
    }
}
