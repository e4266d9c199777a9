//! Event RSVPs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KinError, KinResult};
use crate::event::CalendarEvent;
use crate::recurrence::split_instance_id;
use crate::store::{Document, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RsvpStatus {
    Going,
    Maybe,
    NotGoing,
}

/// A member's response to an event. One per (event, member).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rsvp {
    pub id: String,
    pub event_id: String,
    pub member_id: String,
    pub status: RsvpStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub responded_at: DateTime<Utc>,
}

impl Document for Rsvp {
    const KIND: &'static str = "rsvp";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Rsvp {
    fn key(event_id: &str, member_id: &str) -> String {
        format!("{event_id}__{member_id}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RsvpSummary {
    pub going: usize,
    pub maybe: usize,
    pub not_going: usize,
}

impl RsvpSummary {
    pub fn from_responses(responses: &[Rsvp]) -> Self {
        responses
            .iter()
            .fold(RsvpSummary::default(), |mut summary, rsvp| {
                match rsvp.status {
                    RsvpStatus::Going => summary.going += 1,
                    RsvpStatus::Maybe => summary.maybe += 1,
                    RsvpStatus::NotGoing => summary.not_going += 1,
                }
                summary
            })
    }
}

/// RSVP bookkeeping over the rsvp table.
#[derive(Debug, Clone)]
pub struct RsvpBook {
    table: Table<Rsvp>,
}

impl RsvpBook {
    pub fn new(table: Table<Rsvp>) -> Self {
        RsvpBook { table }
    }

    /// Record `member_id`'s response, replacing any earlier one.
    pub async fn respond(
        &self,
        event: &CalendarEvent,
        member_id: &str,
        status: RsvpStatus,
        note: Option<String>,
    ) -> KinResult<Rsvp> {
        if event.is_generated() {
            return Err(KinError::Validation(format!(
                "'{}' is generated from a member record and does not take RSVPs",
                event.title
            )));
        }

        let rsvp = Rsvp {
            id: Rsvp::key(&event.id, member_id),
            event_id: event.id.clone(),
            member_id: member_id.to_string(),
            status,
            note,
            responded_at: Utc::now(),
        };
        self.table.put(&rsvp).await?;

        tracing::info!(event = %event.id, member = member_id, status = ?status, "recorded rsvp");
        Ok(rsvp)
    }

    pub async fn responses(&self, event_id: &str) -> KinResult<Vec<Rsvp>> {
        let mut responses: Vec<Rsvp> = self
            .table
            .scan()
            .await?
            .into_iter()
            .filter(|r| r.event_id == event_id)
            .collect();
        responses.sort_by_key(|r| r.responded_at);
        Ok(responses)
    }

    pub async fn summary(&self, event_id: &str) -> KinResult<RsvpSummary> {
        Ok(RsvpSummary::from_responses(&self.responses(event_id).await?))
    }

    /// Drop every response to an event and to its recurring instances, e.g.
    /// after the event is deleted.
    pub async fn clear(&self, event_id: &str) -> KinResult<usize> {
        let doomed = self.table.scan().await?.into_iter().filter(|r| {
            r.event_id == event_id
                || split_instance_id(&r.event_id).is_some_and(|(master, _)| master == event_id)
        });

        let mut removed = 0;
        for rsvp in doomed {
            if self.table.delete(&rsvp.id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
