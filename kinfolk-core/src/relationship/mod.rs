//! Family relationships between members.

mod kind;
mod rules;

pub use kind::{RelationshipCategory, RelationshipType};
pub use rules::{Suggestion, Validation, suggest_relationships, validate_relationship};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::member::FamilyMember;
use crate::store::Document;

/// A directed relationship: `from_member_id` is the `relationship_type` of `to_member_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyRelationship {
    pub id: String,
    pub from_member_id: String,
    pub to_member_id: String,
    pub relationship_type: RelationshipType,
    /// Free-form refinement, e.g. "maternal" or "twin"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Document for FamilyRelationship {
    const KIND: &'static str = "relationship";

    fn id(&self) -> &str {
        &self.id
    }
}

impl FamilyRelationship {
    pub fn new(from: &str, to: &str, relationship_type: RelationshipType) -> Self {
        FamilyRelationship {
            id: uuid::Uuid::new_v4().to_string(),
            from_member_id: from.to_string(),
            to_member_id: to.to_string(),
            relationship_type,
            subtype: None,
            notes: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn involves(&self, member_id: &str) -> bool {
        self.from_member_id == member_id || self.to_member_id == member_id
    }

    /// "Alice Smith is Bob Smith's mother"
    pub fn describe(&self, from: &FamilyMember, to: &FamilyMember) -> String {
        format!(
            "{} is {}'s {}",
            from.display_name(),
            to.display_name(),
            self.relationship_type.label().to_lowercase()
        )
    }
}

/// Another member as seen from one member's point of view.
#[derive(Debug, Clone, Serialize)]
pub struct Relative {
    pub relationship_id: String,
    pub member_id: String,
    pub name: String,
    /// What the relative is to the member in question
    pub relationship_type: RelationshipType,
    pub label: String,
    pub description: String,
}

/// Every relative of `member`, with relationships stored in either direction
/// flipped through the inverse table. Relationships pointing at unknown
/// members are skipped.
pub fn relatives_of(
    member: &FamilyMember,
    relationships: &[FamilyRelationship],
    members: &[FamilyMember],
) -> Vec<Relative> {
    let find = |id: &str| members.iter().find(|m| m.id == id);

    let mut relatives: Vec<Relative> = relationships
        .iter()
        .filter_map(|rel| {
            let (other, kind) = if rel.to_member_id == member.id {
                (find(&rel.from_member_id)?, rel.relationship_type)
            } else if rel.from_member_id == member.id {
                let other = find(&rel.to_member_id)?;
                (other, rel.relationship_type.inverse(other.gender))
            } else {
                return None;
            };

            Some(Relative {
                relationship_id: rel.id.clone(),
                member_id: other.id.clone(),
                name: other.display_name(),
                relationship_type: kind,
                label: kind.label().to_string(),
                description: format!(
                    "{} is {}'s {}",
                    other.display_name(),
                    member.display_name(),
                    kind.label().to_lowercase()
                ),
            })
        })
        .collect();

    relatives.sort_by(|a, b| {
        (a.relationship_type.category() as u8, &a.name)
            .cmp(&(b.relationship_type.category() as u8, &b.name))
    });
    relatives
}
