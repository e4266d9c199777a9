//! The kinfolk data directory and the operations the server and CLI share.

use std::sync::Arc;

use crate::calendar::{CalendarLoader, CalendarView, Viewer, is_visible};
use crate::config::KinfolkConfig;
use crate::date_range::DateRange;
use crate::error::{KinError, KinResult};
use crate::event::{CalendarEvent, EventDraft};
use crate::group::{FamilyGroup, GroupDirectory};
use crate::ics::generate_calendar_ics;
use crate::member::{FamilyMember, MemberPatch};
use crate::photo::{Photo, PhotoStore};
use crate::recurrence::{expand_recurring_event, split_instance_id};
use crate::relationship::{
    FamilyRelationship, Relative, Suggestion, Validation, relatives_of, suggest_relationships,
    validate_relationship,
};
use crate::rsvp::{Rsvp, RsvpBook, RsvpStatus, RsvpSummary};
use crate::store::{EventCache, EventStore, Table};

pub struct Kinfolk {
    config: KinfolkConfig,
    members: Table<FamilyMember>,
    relationships: Table<FamilyRelationship>,
    events: Arc<dyn EventStore>,
    rsvps: RsvpBook,
    photos: PhotoStore,
    loader: CalendarLoader,
}

impl Kinfolk {
    /// Open using ~/.config/kinfolk/config.toml
    pub fn load() -> KinResult<Self> {
        Self::open(KinfolkConfig::load()?)
    }

    pub fn open(config: KinfolkConfig) -> KinResult<Self> {
        let data = config.data_path();
        let events: Arc<dyn EventStore> =
            Arc::new(Table::<CalendarEvent>::open(data.join("events")));
        let cache = EventCache::new(&config.cache_path()?).with_ttl(config.cache_ttl()?);

        tracing::debug!(data = %data.display(), "opened kinfolk data directory");

        Ok(Kinfolk {
            members: Table::open(data.join("members")),
            relationships: Table::open(data.join("relationships")),
            rsvps: RsvpBook::new(Table::open(data.join("rsvps"))),
            photos: PhotoStore::new(config.photos_path(), config.max_photo_bytes),
            loader: CalendarLoader::new(events.clone(), cache),
            events,
            config,
        })
    }

    pub fn config(&self) -> &KinfolkConfig {
        &self.config
    }

    pub async fn directory(&self) -> KinResult<GroupDirectory> {
        let members = self.members.scan().await?;
        Ok(GroupDirectory::new(self.config.demo_users.iter().cloned(), &members))
    }

    // MEMBERS:

    pub async fn members(&self, group: Option<FamilyGroup>) -> KinResult<Vec<FamilyMember>> {
        let mut members: Vec<FamilyMember> = self
            .members
            .scan()
            .await?
            .into_iter()
            .filter(|m| group.is_none_or(|g| m.family_group == g))
            .collect();
        members.sort_by(|a, b| (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name)));
        Ok(members)
    }

    pub async fn member(&self, id: &str) -> KinResult<FamilyMember> {
        self.members.require(id).await
    }

    pub async fn create_member(&self, member: FamilyMember) -> KinResult<FamilyMember> {
        member.validate()?;
        if self.members.get(&member.id).await?.is_some() {
            return Err(KinError::Conflict(format!(
                "Member '{}' already exists",
                member.id
            )));
        }
        self.members.put(&member).await?;
        tracing::info!(member = %member.id, group = %member.family_group, "created member");
        Ok(member)
    }

    pub async fn update_member(&self, id: &str, patch: MemberPatch) -> KinResult<FamilyMember> {
        self.members
            .update(id, |member| {
                patch.apply(member);
                member.validate()
            })
            .await
    }

    /// Delete a member along with every relationship touching them.
    /// Returns the number of relationships removed.
    pub async fn delete_member(&self, id: &str) -> KinResult<usize> {
        if !self.members.delete(id).await? {
            return Err(KinError::not_found("member", id));
        }

        let mut removed = 0;
        for rel in self.relationships.scan().await? {
            if rel.involves(id) && self.relationships.delete(&rel.id).await? {
                removed += 1;
            }
        }

        tracing::info!(member = id, relationships = removed, "deleted member");
        Ok(removed)
    }

    // RELATIONSHIPS:

    pub async fn relationships(&self) -> KinResult<Vec<FamilyRelationship>> {
        self.relationships.scan().await
    }

    /// Validate and store a relationship. Warnings are returned, not enforced.
    pub async fn create_relationship(
        &self,
        relationship: FamilyRelationship,
    ) -> KinResult<(FamilyRelationship, Validation)> {
        let members = self.members.scan().await?;
        let existing = self.relationships.scan().await?;

        let validation = validate_relationship(&relationship, &existing, &members)?;
        self.relationships.put(&relationship).await?;

        tracing::info!(
            relationship = %relationship.id,
            from = %relationship.from_member_id,
            to = %relationship.to_member_id,
            kind = ?relationship.relationship_type,
            warnings = validation.warnings.len(),
            "created relationship"
        );
        Ok((relationship, validation))
    }

    pub async fn delete_relationship(&self, id: &str) -> KinResult<()> {
        if self.relationships.delete(id).await? {
            Ok(())
        } else {
            Err(KinError::not_found("relationship", id))
        }
    }

    pub async fn relatives(&self, member_id: &str) -> KinResult<Vec<Relative>> {
        let member = self.member(member_id).await?;
        let members = self.members.scan().await?;
        let relationships = self.relationships.scan().await?;
        Ok(relatives_of(&member, &relationships, &members))
    }

    pub async fn suggestions(&self, member_id: &str) -> KinResult<Vec<Suggestion>> {
        // Existence check so unknown ids are a 404, not an empty list
        self.member(member_id).await?;
        let members = self.members.scan().await?;
        let relationships = self.relationships.scan().await?;
        Ok(suggest_relationships(member_id, &relationships, &members))
    }

    // EVENTS:

    /// The merged, filtered calendar `viewer_id` sees within `range`.
    pub async fn calendar(&self, viewer_id: &str, range: &DateRange) -> KinResult<CalendarView> {
        let members = self.members.scan().await?;
        let directory =
            GroupDirectory::new(self.config.demo_users.iter().cloned(), &members);
        Ok(self.loader.load(viewer_id, &members, &directory, range).await)
    }

    pub async fn export_ics(&self, viewer_id: &str, range: &DateRange) -> KinResult<String> {
        let view = self.calendar(viewer_id, range).await?;
        generate_calendar_ics(&format!("kinfolk ({})", view.family_group), &view.events)
    }

    /// A stored event, or a recurring instance (`{master}_{YYYYMMDD}`) of one.
    async fn find_event(&self, id: &str) -> KinResult<Option<CalendarEvent>> {
        if let Some(event) = self.events.get_event(id).await? {
            return Ok(Some(event));
        }

        let Some((master_id, day)) = split_instance_id(id) else {
            return Ok(None);
        };
        let Some(master) = self
            .events
            .get_event(master_id)
            .await?
            .filter(|master| master.recurrence.is_some())
        else {
            return Ok(None);
        };

        // Only days the rule actually produces are instances
        let instances = expand_recurring_event(&master, &DateRange::new(day, day)?)?;
        Ok(instances.into_iter().find(|instance| instance.id == id))
    }

    /// Stored events the viewer may see, recurring ones unexpanded.
    pub async fn events(&self, viewer_id: &str) -> KinResult<Vec<CalendarEvent>> {
        let directory = self.directory().await?;
        let viewer = Viewer::resolve(viewer_id, &directory);

        Ok(self
            .events
            .list_events()
            .await?
            .into_iter()
            .filter(|event| is_visible(event, &viewer, &directory))
            .collect())
    }

    /// An event the viewer may see. Hidden events read as missing.
    pub async fn event(&self, viewer_id: &str, id: &str) -> KinResult<CalendarEvent> {
        let directory = self.directory().await?;
        let viewer = Viewer::resolve(viewer_id, &directory);

        self.find_event(id)
            .await?
            .filter(|event| is_visible(event, &viewer, &directory))
            .ok_or_else(|| KinError::not_found("event", id))
    }

    pub async fn create_event(&self, viewer_id: &str, draft: EventDraft) -> KinResult<CalendarEvent> {
        let group = self.directory().await?.viewer_group(viewer_id);
        let event = draft.into_event(viewer_id, group)?;
        self.events.put_event(&event).await?;

        tracing::info!(event = %event.id, owner = viewer_id, "created event");
        Ok(event)
    }

    pub async fn update_event(
        &self,
        viewer_id: &str,
        id: &str,
        draft: EventDraft,
    ) -> KinResult<CalendarEvent> {
        let mut event = self.require_owned(viewer_id, id).await?;
        draft.apply(&mut event)?;
        self.events.put_event(&event).await?;
        Ok(event)
    }

    pub async fn delete_event(&self, viewer_id: &str, id: &str) -> KinResult<()> {
        self.require_owned(viewer_id, id).await?;
        self.events.delete_event(id).await?;
        let cleared = self.rsvps.clear(id).await?;

        tracing::info!(event = id, rsvps = cleared, "deleted event");
        Ok(())
    }

    async fn require_owned(&self, viewer_id: &str, id: &str) -> KinResult<CalendarEvent> {
        let event = self
            .events
            .get_event(id)
            .await?
            .ok_or_else(|| KinError::not_found("event", id))?;

        if event.owner_id.as_deref() != Some(viewer_id) {
            return Err(KinError::Forbidden(format!(
                "Only the owner can change '{}'",
                event.title
            )));
        }
        Ok(event)
    }

    // RSVPS:

    pub async fn respond(
        &self,
        viewer_id: &str,
        event_id: &str,
        status: RsvpStatus,
        note: Option<String>,
    ) -> KinResult<Rsvp> {
        let event = self.event(viewer_id, event_id).await?;
        self.rsvps.respond(&event, viewer_id, status, note).await
    }

    pub async fn responses(
        &self,
        viewer_id: &str,
        event_id: &str,
    ) -> KinResult<(Vec<Rsvp>, RsvpSummary)> {
        self.event(viewer_id, event_id).await?;
        let responses = self.rsvps.responses(event_id).await?;
        let summary = RsvpSummary::from_responses(&responses);
        Ok((responses, summary))
    }

    // PHOTOS:

    pub async fn upload_photo(
        &self,
        viewer_id: &str,
        content_type: &str,
        bytes: &[u8],
        caption: Option<String>,
    ) -> KinResult<Photo> {
        self.photos.put(viewer_id, content_type, bytes, caption).await
    }

    /// Photos uploaded by members of the viewer's family group.
    pub async fn photos(&self, viewer_id: &str, prefix: Option<&str>) -> KinResult<Vec<Photo>> {
        let directory = self.directory().await?;
        let group = directory.viewer_group(viewer_id);

        Ok(self
            .photos
            .list(prefix)
            .await?
            .into_iter()
            .filter(|photo| uploader_group(&directory, photo) == group)
            .collect())
    }

    /// A photo's metadata. Photos from another family group read as missing.
    pub async fn photo(&self, viewer_id: &str, key: &str) -> KinResult<Photo> {
        let directory = self.directory().await?;
        let group = directory.viewer_group(viewer_id);

        self.photos
            .head(key)
            .await?
            .filter(|photo| uploader_group(&directory, photo) == group)
            .ok_or_else(|| KinError::not_found("photo", key))
    }

    pub async fn photo_data(&self, viewer_id: &str, key: &str) -> KinResult<(Photo, Vec<u8>)> {
        let photo = self.photo(viewer_id, key).await?;
        let bytes = self.photos.get(key).await?;
        Ok((photo, bytes))
    }
}

fn uploader_group(directory: &GroupDirectory, photo: &Photo) -> FamilyGroup {
    directory.classify(&photo.uploaded_by).unwrap_or(FamilyGroup::Real)
}
