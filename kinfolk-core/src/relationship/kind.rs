//! The relationship type table.
//!
//! Every type has a category, a display label, an optional gender, a neutral
//! form and (through its neutral form) an inverse. The table drives display
//! formatting only; nothing here keeps the graph consistent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KinError;
use crate::member::Gender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipCategory {
    Direct,
    Extended,
    InLaw,
    Step,
    Adoptive,
    Honorary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    // Direct
    Parent,
    Father,
    Mother,
    Child,
    Son,
    Daughter,
    Sibling,
    Brother,
    Sister,
    HalfSibling,
    HalfBrother,
    HalfSister,
    Spouse,
    Husband,
    Wife,
    Partner,

    // Extended
    Grandparent,
    Grandfather,
    Grandmother,
    Grandchild,
    Grandson,
    Granddaughter,
    GreatGrandparent,
    GreatGrandfather,
    GreatGrandmother,
    GreatGrandchild,
    GreatGrandson,
    GreatGranddaughter,
    /// Aunt or uncle
    Pibling,
    Aunt,
    Uncle,
    /// Niece or nephew
    Nibling,
    Niece,
    Nephew,
    Cousin,
    SecondCousin,

    // In-law
    ParentInLaw,
    FatherInLaw,
    MotherInLaw,
    ChildInLaw,
    SonInLaw,
    DaughterInLaw,
    SiblingInLaw,
    BrotherInLaw,
    SisterInLaw,

    // Step
    StepParent,
    StepFather,
    StepMother,
    StepChild,
    StepSon,
    StepDaughter,
    StepSibling,
    StepBrother,
    StepSister,

    // Adoptive and foster
    AdoptiveParent,
    AdoptedChild,
    FosterParent,
    FosterChild,

    // Honorary
    Godparent,
    Godfather,
    Godmother,
    Godchild,
    Guardian,
    Ward,
    Fiance,
    ExSpouse,
    FamilyFriend,
    Other,
}

use RelationshipType::*;

impl RelationshipType {
    pub const ALL: &'static [RelationshipType] = &[
        Parent, Father, Mother, Child, Son, Daughter, Sibling, Brother, Sister, HalfSibling,
        HalfBrother, HalfSister, Spouse, Husband, Wife, Partner, Grandparent, Grandfather,
        Grandmother, Grandchild, Grandson, Granddaughter, GreatGrandparent, GreatGrandfather,
        GreatGrandmother, GreatGrandchild, GreatGrandson, GreatGranddaughter, Pibling, Aunt,
        Uncle, Nibling, Niece, Nephew, Cousin, SecondCousin, ParentInLaw, FatherInLaw,
        MotherInLaw, ChildInLaw, SonInLaw, DaughterInLaw, SiblingInLaw, BrotherInLaw,
        SisterInLaw, StepParent, StepFather, StepMother, StepChild, StepSon, StepDaughter,
        StepSibling, StepBrother, StepSister, AdoptiveParent, AdoptedChild, FosterParent,
        FosterChild, Godparent, Godfather, Godmother, Godchild, Guardian, Ward, Fiance,
        ExSpouse, FamilyFriend, Other,
    ];

    pub fn category(self) -> RelationshipCategory {
        match self.neutral() {
            Parent | Child | Sibling | HalfSibling | Spouse | Partner => {
                RelationshipCategory::Direct
            }
            Grandparent | Grandchild | GreatGrandparent | GreatGrandchild | Pibling | Nibling
            | Cousin | SecondCousin => RelationshipCategory::Extended,
            ParentInLaw | ChildInLaw | SiblingInLaw => RelationshipCategory::InLaw,
            StepParent | StepChild | StepSibling => RelationshipCategory::Step,
            AdoptiveParent | AdoptedChild | FosterParent | FosterChild => {
                RelationshipCategory::Adoptive
            }
            _ => RelationshipCategory::Honorary,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Parent => "Parent",
            Father => "Father",
            Mother => "Mother",
            Child => "Child",
            Son => "Son",
            Daughter => "Daughter",
            Sibling => "Sibling",
            Brother => "Brother",
            Sister => "Sister",
            HalfSibling => "Half-sibling",
            HalfBrother => "Half-brother",
            HalfSister => "Half-sister",
            Spouse => "Spouse",
            Husband => "Husband",
            Wife => "Wife",
            Partner => "Partner",
            Grandparent => "Grandparent",
            Grandfather => "Grandfather",
            Grandmother => "Grandmother",
            Grandchild => "Grandchild",
            Grandson => "Grandson",
            Granddaughter => "Granddaughter",
            GreatGrandparent => "Great-grandparent",
            GreatGrandfather => "Great-grandfather",
            GreatGrandmother => "Great-grandmother",
            GreatGrandchild => "Great-grandchild",
            GreatGrandson => "Great-grandson",
            GreatGranddaughter => "Great-granddaughter",
            Pibling => "Aunt/Uncle",
            Aunt => "Aunt",
            Uncle => "Uncle",
            Nibling => "Niece/Nephew",
            Niece => "Niece",
            Nephew => "Nephew",
            Cousin => "Cousin",
            SecondCousin => "Second cousin",
            ParentInLaw => "Parent-in-law",
            FatherInLaw => "Father-in-law",
            MotherInLaw => "Mother-in-law",
            ChildInLaw => "Child-in-law",
            SonInLaw => "Son-in-law",
            DaughterInLaw => "Daughter-in-law",
            SiblingInLaw => "Sibling-in-law",
            BrotherInLaw => "Brother-in-law",
            SisterInLaw => "Sister-in-law",
            StepParent => "Stepparent",
            StepFather => "Stepfather",
            StepMother => "Stepmother",
            StepChild => "Stepchild",
            StepSon => "Stepson",
            StepDaughter => "Stepdaughter",
            StepSibling => "Stepsibling",
            StepBrother => "Stepbrother",
            StepSister => "Stepsister",
            AdoptiveParent => "Adoptive parent",
            AdoptedChild => "Adopted child",
            FosterParent => "Foster parent",
            FosterChild => "Foster child",
            Godparent => "Godparent",
            Godfather => "Godfather",
            Godmother => "Godmother",
            Godchild => "Godchild",
            Guardian => "Guardian",
            Ward => "Ward",
            Fiance => "Fiancé(e)",
            ExSpouse => "Ex-spouse",
            FamilyFriend => "Family friend",
            Other => "Relative",
        }
    }

    /// Gender implied by the type, if any.
    pub fn gender(self) -> Option<Gender> {
        match self {
            Father | Son | Brother | HalfBrother | Husband | Grandfather | Grandson
            | GreatGrandfather | GreatGrandson | Uncle | Nephew | FatherInLaw | SonInLaw
            | BrotherInLaw | StepFather | StepSon | StepBrother | Godfather => Some(Gender::Male),
            Mother | Daughter | Sister | HalfSister | Wife | Grandmother | Granddaughter
            | GreatGrandmother | GreatGranddaughter | Aunt | Niece | MotherInLaw
            | DaughterInLaw | SisterInLaw | StepMother | StepDaughter | StepSister
            | Godmother => Some(Gender::Female),
            _ => None,
        }
    }

    /// The gender-neutral form: Mother -> Parent, Uncle -> Pibling.
    pub fn neutral(self) -> RelationshipType {
        match self {
            Father | Mother => Parent,
            Son | Daughter => Child,
            Brother | Sister => Sibling,
            HalfBrother | HalfSister => HalfSibling,
            Husband | Wife => Spouse,
            Grandfather | Grandmother => Grandparent,
            Grandson | Granddaughter => Grandchild,
            GreatGrandfather | GreatGrandmother => GreatGrandparent,
            GreatGrandson | GreatGranddaughter => GreatGrandchild,
            Aunt | Uncle => Pibling,
            Niece | Nephew => Nibling,
            FatherInLaw | MotherInLaw => ParentInLaw,
            SonInLaw | DaughterInLaw => ChildInLaw,
            BrotherInLaw | SisterInLaw => SiblingInLaw,
            StepFather | StepMother => StepParent,
            StepSon | StepDaughter => StepChild,
            StepBrother | StepSister => StepSibling,
            Godfather | Godmother => Godparent,
            other => other,
        }
    }

    /// The gendered form of this type's neutral form, when one exists for `gender`.
    pub fn gendered(self, gender: Option<Gender>) -> RelationshipType {
        let neutral = self.neutral();
        let Some(gender) = gender else {
            return neutral;
        };
        let male = gender == Gender::Male;
        let female = gender == Gender::Female;

        match neutral {
            Parent if male => Father,
            Parent if female => Mother,
            Child if male => Son,
            Child if female => Daughter,
            Sibling if male => Brother,
            Sibling if female => Sister,
            HalfSibling if male => HalfBrother,
            HalfSibling if female => HalfSister,
            Spouse if male => Husband,
            Spouse if female => Wife,
            Grandparent if male => Grandfather,
            Grandparent if female => Grandmother,
            Grandchild if male => Grandson,
            Grandchild if female => Granddaughter,
            GreatGrandparent if male => GreatGrandfather,
            GreatGrandparent if female => GreatGrandmother,
            GreatGrandchild if male => GreatGrandson,
            GreatGrandchild if female => GreatGranddaughter,
            Pibling if male => Uncle,
            Pibling if female => Aunt,
            Nibling if male => Nephew,
            Nibling if female => Niece,
            ParentInLaw if male => FatherInLaw,
            ParentInLaw if female => MotherInLaw,
            ChildInLaw if male => SonInLaw,
            ChildInLaw if female => DaughterInLaw,
            SiblingInLaw if male => BrotherInLaw,
            SiblingInLaw if female => SisterInLaw,
            StepParent if male => StepFather,
            StepParent if female => StepMother,
            StepChild if male => StepSon,
            StepChild if female => StepDaughter,
            StepSibling if male => StepBrother,
            StepSibling if female => StepSister,
            Godparent if male => Godfather,
            Godparent if female => Godmother,
            other => other,
        }
    }

    /// If A is `self` of B, B is `self.inverse(B's gender)` of A.
    pub fn inverse(self, target_gender: Option<Gender>) -> RelationshipType {
        let inverse = match self.neutral() {
            Parent => Child,
            Child => Parent,
            Grandparent => Grandchild,
            Grandchild => Grandparent,
            GreatGrandparent => GreatGrandchild,
            GreatGrandchild => GreatGrandparent,
            Pibling => Nibling,
            Nibling => Pibling,
            ParentInLaw => ChildInLaw,
            ChildInLaw => ParentInLaw,
            StepParent => StepChild,
            StepChild => StepParent,
            AdoptiveParent => AdoptedChild,
            AdoptedChild => AdoptiveParent,
            FosterParent => FosterChild,
            FosterChild => FosterParent,
            Godparent => Godchild,
            Godchild => Godparent,
            Guardian => Ward,
            Ward => Guardian,
            // Symmetric relationships
            symmetric => symmetric,
        };
        inverse.gendered(target_gender)
    }

    /// Types in which the first member is a generation above the second.
    pub fn is_ancestral(self) -> bool {
        matches!(
            self.neutral(),
            Parent | Grandparent | GreatGrandparent | AdoptiveParent | StepParent
        )
    }

    /// Types in which the first member is a generation below the second.
    pub fn is_descendant(self) -> bool {
        matches!(
            self.neutral(),
            Child | Grandchild | GreatGrandchild | AdoptedChild | StepChild
        )
    }

    /// Minimum number of generations between the two members, for ancestral types.
    pub fn generations(self) -> u32 {
        match self.neutral() {
            GreatGrandparent | GreatGrandchild => 3,
            Grandparent | Grandchild => 2,
            Parent | Child | AdoptiveParent | AdoptedChild | StepParent | StepChild => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RelationshipType {
    type Err = KinError;

    /// Accepts the wire name (`father_in_law`), kebab or spaced variants, or the label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        let normalized = wanted.replace(['-', ' '], "_");

        if let Ok(kind) =
            serde_json::from_value::<RelationshipType>(serde_json::Value::String(normalized))
        {
            return Ok(kind);
        }

        RelationshipType::ALL
            .iter()
            .copied()
            .find(|kind| kind.label().to_lowercase() == wanted)
            .ok_or_else(|| KinError::Validation(format!("Unknown relationship type '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_variant_once() {
        let unique: std::collections::HashSet<_> = RelationshipType::ALL.iter().collect();
        assert_eq!(unique.len(), RelationshipType::ALL.len());
        assert!(RelationshipType::ALL.len() >= 60);
    }

    #[test]
    fn test_inverse_of_inverse_is_neutral_form() {
        for kind in RelationshipType::ALL {
            let back = kind.inverse(None).inverse(None);
            assert_eq!(back, kind.neutral(), "{kind:?}");
        }
    }

    #[test]
    fn test_inverse_is_gendered_by_target() {
        assert_eq!(Mother.inverse(Some(Gender::Male)), Son);
        assert_eq!(Mother.inverse(Some(Gender::Female)), Daughter);
        assert_eq!(Mother.inverse(None), Child);
        assert_eq!(Uncle.inverse(Some(Gender::Female)), Niece);
        assert_eq!(StepFather.inverse(Some(Gender::Other)), StepChild);
        assert_eq!(Husband.inverse(Some(Gender::Female)), Wife);
        assert_eq!(Guardian.inverse(Some(Gender::Male)), Ward);
        assert_eq!(Cousin.inverse(Some(Gender::Male)), Cousin);
    }

    #[test]
    fn test_gender_matches_gendered_form() {
        for kind in RelationshipType::ALL {
            if let Some(gender) = kind.gender() {
                assert_eq!(kind.neutral().gendered(Some(gender)), *kind);
            }
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(Grandmother.category(), RelationshipCategory::Extended);
        assert_eq!(SisterInLaw.category(), RelationshipCategory::InLaw);
        assert_eq!(StepSon.category(), RelationshipCategory::Step);
        assert_eq!(HalfBrother.category(), RelationshipCategory::Direct);
        assert_eq!(FosterChild.category(), RelationshipCategory::Adoptive);
        assert_eq!(Godmother.category(), RelationshipCategory::Honorary);
    }

    #[test]
    fn test_parse_from_wire_name_and_label() {
        assert_eq!("father_in_law".parse::<RelationshipType>().unwrap(), FatherInLaw);
        assert_eq!("Father-in-law".parse::<RelationshipType>().unwrap(), FatherInLaw);
        assert_eq!("great grandmother".parse::<RelationshipType>().unwrap(), GreatGrandmother);
        assert_eq!("Aunt/Uncle".parse::<RelationshipType>().unwrap(), Pibling);
        assert!("archnemesis".parse::<RelationshipType>().is_err());
    }
}
