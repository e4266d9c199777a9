//! Core types for the kinfolk family hub.
//!
//! This crate is shared by the kinfolk CLI and server:
//! - `member`, `relationship` and `group` for the family graph
//! - `event`, `calendar`, `recurrence` and `generated` for the shared calendar
//! - `rsvp` and `photo` for responses and uploads
//! - [`Kinfolk`] ties them to a data directory

pub mod calendar;
pub mod config;
pub mod date_range;
pub mod error;
pub mod event;
pub mod generated;
pub mod group;
pub mod ics;
pub mod kinfolk;
pub mod member;
pub mod photo;
pub mod recurrence;
pub mod relationship;
pub mod rsvp;
pub mod store;

pub use config::KinfolkConfig;
pub use date_range::DateRange;
pub use error::{KinError, KinResult};
pub use event::{CalendarEvent, EventCategory, EventDraft, EventTime, Frequency, Recurrence};
pub use group::{FamilyGroup, GroupDirectory};
pub use kinfolk::Kinfolk;
pub use member::{FamilyMember, Gender, MemberPatch};
pub use relationship::{FamilyRelationship, RelationshipType};
pub use rsvp::{Rsvp, RsvpStatus, RsvpSummary};
