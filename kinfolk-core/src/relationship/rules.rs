//! Validation and suggestion heuristics for new relationships.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{KinError, KinResult};
use crate::member::FamilyMember;
use crate::relationship::{FamilyRelationship, RelationshipType};

/// Minimum plausible age gap per generation, below which we warn.
const MIN_GENERATION_GAP_YEARS: i64 = 12;

/// Outcome of a successful validation. Warnings do not block saving.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Validation {
    pub warnings: Vec<String>,
}

/// Check a candidate relationship against the members it links and the relationships
/// already recorded.
pub fn validate_relationship(
    candidate: &FamilyRelationship,
    existing: &[FamilyRelationship],
    members: &[FamilyMember],
) -> KinResult<Validation> {
    let mut validation = Validation::default();

    if candidate.from_member_id == candidate.to_member_id {
        return Err(KinError::Validation(
            "A member cannot be related to themselves".into(),
        ));
    }

    let find = |id: &str| {
        members
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| KinError::not_found("member", id))
    };
    let from = find(&candidate.from_member_id)?;
    let to = find(&candidate.to_member_id)?;

    if from.family_group != to.family_group {
        return Err(KinError::Validation(format!(
            "{} ({}) and {} ({}) belong to different family groups",
            from.display_name(),
            from.family_group,
            to.display_name(),
            to.family_group
        )));
    }

    if let (Some(start), Some(end)) = (candidate.start_date, candidate.end_date) {
        if end < start {
            return Err(KinError::Validation(format!(
                "Relationship ends ({end}) before it starts ({start})"
            )));
        }
    }

    let kind = candidate.relationship_type;

    for rel in existing.iter().filter(|r| r.id != candidate.id) {
        let same_direction =
            rel.from_member_id == from.id && rel.to_member_id == to.id;
        let reverse_direction =
            rel.from_member_id == to.id && rel.to_member_id == from.id;

        if same_direction && rel.relationship_type.neutral() == kind.neutral() {
            return Err(KinError::Conflict(format!(
                "{} is already recorded",
                rel.describe(from, to)
            )));
        }

        if reverse_direction {
            let implied = rel.relationship_type.inverse(None);
            if implied == kind.neutral() {
                return Err(KinError::Conflict(format!(
                    "{} is already recorded",
                    rel.describe(to, from)
                )));
            }
            if implied.is_ancestral() || implied.is_descendant() || kind.is_ancestral() || kind.is_descendant() {
                return Err(KinError::Conflict(format!(
                    "{} conflicts with {} {}",
                    rel.describe(to, from),
                    from.display_name(),
                    kind.label().to_lowercase()
                )));
            }
        }
    }

    if let (Some(implied), Some(actual)) = (kind.gender(), from.gender) {
        if implied != actual {
            validation.warnings.push(format!(
                "'{}' does not match the gender recorded for {}",
                kind.label(),
                from.display_name()
            ));
        }
    }

    if let (Some(from_born), Some(to_born)) = (from.birthday, to.birthday) {
        let (elder, younger, elder_born, younger_born) = if kind.is_ancestral() {
            (from, to, from_born, to_born)
        } else if kind.is_descendant() {
            (to, from, to_born, from_born)
        } else {
            return Ok(validation);
        };

        if elder_born >= younger_born {
            return Err(KinError::Validation(format!(
                "{} (born {}) cannot be the {} of {} (born {})",
                elder.display_name(),
                elder_born,
                kind.label().to_lowercase(),
                younger.display_name(),
                younger_born
            )));
        }

        let gap_years = (younger_born - elder_born).num_days() / 365;
        let min_gap = MIN_GENERATION_GAP_YEARS * i64::from(kind.generations());
        if gap_years < min_gap {
            validation.warnings.push(format!(
                "{} is only {} years older than {}",
                elder.display_name(),
                gap_years,
                younger.display_name()
            ));
        }
    }

    Ok(validation)
}

/// A relationship the graph implies but nobody recorded yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub from_member_id: String,
    pub to_member_id: String,
    pub relationship_type: RelationshipType,
    pub reason: String,
}

struct Graph<'a> {
    relationships: &'a [FamilyRelationship],
    members: &'a [FamilyMember],
}

impl<'a> Graph<'a> {
    fn member(&self, id: &str) -> Option<&'a FamilyMember> {
        self.members.iter().find(|m| m.id == id)
    }

    fn parents_of(&self, id: &str) -> Vec<&'a str> {
        self.edges(id, |kind| kind.neutral() == RelationshipType::Parent)
    }

    fn spouses_of(&self, id: &str) -> Vec<&'a str> {
        self.edges(id, |kind| {
            matches!(kind.neutral(), RelationshipType::Spouse | RelationshipType::Partner)
        })
    }

    fn siblings_of(&self, id: &str) -> Vec<&'a str> {
        self.edges(id, |kind| kind.neutral() == RelationshipType::Sibling)
    }

    fn children_of(&self, id: &str) -> Vec<&'a str> {
        self.edges(id, |kind| kind.neutral() == RelationshipType::Child)
    }

    /// Members M such that "M is <kind> of `id`", whichever direction the relationship was stored in.
    fn edges(&self, id: &str, wanted: impl Fn(RelationshipType) -> bool) -> Vec<&'a str> {
        let mut found: Vec<&'a str> = self
            .relationships
            .iter()
            .filter_map(|rel| {
                if rel.to_member_id == id && wanted(rel.relationship_type) {
                    Some(rel.from_member_id.as_str())
                } else if rel.from_member_id == id && wanted(rel.relationship_type.inverse(None)) {
                    Some(rel.to_member_id.as_str())
                } else {
                    None
                }
            })
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    fn related(&self, a: &str, b: &str) -> bool {
        self.relationships
            .iter()
            .any(|rel| rel.involves(a) && rel.involves(b))
    }

    fn name(&self, id: &str) -> String {
        self.member(id)
            .map(FamilyMember::display_name)
            .unwrap_or_else(|| id.to_string())
    }
}

/// Relationships implied for `member_id` by the ones already recorded:
/// a parent's parent is a grandparent, a parent's other child is a sibling,
/// a parent's spouse who is not a parent is a step-parent, and a parent's
/// sibling is an aunt or uncle. Pairs that are already related are skipped.
pub fn suggest_relationships(
    member_id: &str,
    relationships: &[FamilyRelationship],
    members: &[FamilyMember],
) -> Vec<Suggestion> {
    let graph = Graph {
        relationships,
        members,
    };
    let mut suggestions = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    let mut suggest = |relative: &str, kind: RelationshipType, reason: String| {
        if relative == member_id || graph.related(relative, member_id) {
            return;
        }
        if !seen.insert((relative.to_string(), member_id.to_string())) {
            return;
        }
        let gender = graph.member(relative).and_then(|m| m.gender);
        suggestions.push(Suggestion {
            from_member_id: relative.to_string(),
            to_member_id: member_id.to_string(),
            relationship_type: kind.gendered(gender),
            reason,
        });
    };

    let parents = graph.parents_of(member_id);

    for parent in &parents {
        let parent_name = graph.name(parent);

        for grandparent in graph.parents_of(parent) {
            suggest(
                grandparent,
                RelationshipType::Grandparent,
                format!("Parent of {parent_name}"),
            );
        }

        for sibling in graph.children_of(parent) {
            suggest(
                sibling,
                RelationshipType::Sibling,
                format!("Also a child of {parent_name}"),
            );
        }

        for spouse in graph.spouses_of(parent) {
            if !parents.contains(&spouse) {
                suggest(
                    spouse,
                    RelationshipType::StepParent,
                    format!("Spouse of {parent_name}"),
                );
            }
        }

        for pibling in graph.siblings_of(parent) {
            suggest(
                pibling,
                RelationshipType::Pibling,
                format!("Sibling of {parent_name}"),
            );
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::FamilyGroup;
    use crate::member::Gender;
    use chrono::NaiveDate;

    fn member(id: &str, gender: Gender, born: Option<(i32, u32, u32)>) -> FamilyMember {
        let mut m = FamilyMember::new(id, "Smith", FamilyGroup::Real);
        m.id = id.to_string();
        m.gender = Some(gender);
        m.birthday = born.and_then(|(y, mo, d)| NaiveDate::from_ymd_opt(y, mo, d));
        m
    }

    fn family() -> Vec<FamilyMember> {
        vec![
            member("grandma", Gender::Female, Some((1940, 1, 1))),
            member("mom", Gender::Female, Some((1965, 1, 1))),
            member("stepdad", Gender::Male, Some((1963, 1, 1))),
            member("aunt", Gender::Female, Some((1968, 1, 1))),
            member("kid", Gender::Male, Some((1995, 1, 1))),
            member("sis", Gender::Female, Some((1998, 1, 1))),
        ]
    }

    fn rel(from: &str, to: &str, kind: RelationshipType) -> FamilyRelationship {
        FamilyRelationship::new(from, to, kind)
    }

    #[test]
    fn test_self_relationship_is_rejected() {
        let members = family();
        let result = validate_relationship(&rel("mom", "mom", RelationshipType::Mother), &[], &members);
        assert!(matches!(result, Err(KinError::Validation(_))));
    }

    #[test]
    fn test_unknown_member_is_not_found() {
        let members = family();
        let result = validate_relationship(&rel("mom", "ghost", RelationshipType::Mother), &[], &members);
        assert!(matches!(result, Err(KinError::NotFound { .. })));
    }

    #[test]
    fn test_cross_group_relationship_is_rejected() {
        let mut members = family();
        members[4].family_group = FamilyGroup::Demo;
        let result = validate_relationship(&rel("mom", "kid", RelationshipType::Mother), &[], &members);
        assert!(matches!(result, Err(KinError::Validation(_))));
    }

    #[test]
    fn test_duplicates_in_either_direction_conflict() {
        let members = family();
        let existing = vec![rel("mom", "kid", RelationshipType::Mother)];

        let same = validate_relationship(&rel("mom", "kid", RelationshipType::Parent), &existing, &members);
        assert!(matches!(same, Err(KinError::Conflict(_))));

        let reverse = validate_relationship(&rel("kid", "mom", RelationshipType::Son), &existing, &members);
        assert!(matches!(reverse, Err(KinError::Conflict(_))));

        let contradiction =
            validate_relationship(&rel("kid", "mom", RelationshipType::Father), &existing, &members);
        assert!(matches!(contradiction, Err(KinError::Conflict(_))));
    }

    #[test]
    fn test_parent_younger_than_child_is_rejected() {
        let members = family();
        let result = validate_relationship(&rel("kid", "mom", RelationshipType::Father), &[], &members);
        assert!(matches!(result, Err(KinError::Validation(_))));

        let as_child = validate_relationship(&rel("mom", "kid", RelationshipType::Daughter), &[], &members);
        assert!(matches!(as_child, Err(KinError::Validation(_))));
    }

    #[test]
    fn test_warnings_do_not_block() {
        let mut members = family();
        members.push(member("teen-parent", Gender::Female, Some((1987, 1, 1))));

        let validation =
            validate_relationship(&rel("teen-parent", "kid", RelationshipType::Father), &[], &members)
                .unwrap();

        assert_eq!(validation.warnings.len(), 2, "{:?}", validation.warnings);
    }

    #[test]
    fn test_plausible_relationship_has_no_warnings() {
        let members = family();
        let validation =
            validate_relationship(&rel("grandma", "kid", RelationshipType::Grandmother), &[], &members)
                .unwrap();
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn test_suggestions_from_parent_links() {
        let members = family();
        let relationships = vec![
            rel("mom", "kid", RelationshipType::Mother),
            rel("sis", "mom", RelationshipType::Daughter),
            rel("grandma", "mom", RelationshipType::Mother),
            rel("stepdad", "mom", RelationshipType::Husband),
            rel("aunt", "mom", RelationshipType::Sister),
        ];

        let suggestions = suggest_relationships("kid", &relationships, &members);
        let find = |id: &str| suggestions.iter().find(|s| s.from_member_id == id).map(|s| s.relationship_type);

        assert_eq!(find("grandma"), Some(RelationshipType::Grandmother));
        assert_eq!(find("sis"), Some(RelationshipType::Sister));
        assert_eq!(find("stepdad"), Some(RelationshipType::StepFather));
        assert_eq!(find("aunt"), Some(RelationshipType::Aunt));
        assert_eq!(suggestions.len(), 4);
    }

    #[test]
    fn test_suggestions_skip_existing_pairs() {
        let members = family();
        let relationships = vec![
            rel("mom", "kid", RelationshipType::Mother),
            rel("grandma", "mom", RelationshipType::Mother),
            rel("grandma", "kid", RelationshipType::Grandmother),
        ];

        assert!(suggest_relationships("kid", &relationships, &members).is_empty());
    }
}
