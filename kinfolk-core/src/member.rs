//! Family member profiles.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{KinError, KinResult};
use crate::group::FamilyGroup;
use crate::store::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    pub family_group: FamilyGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Photo store key of the profile picture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

impl Document for FamilyMember {
    const KIND: &'static str = "member";

    fn id(&self) -> &str {
        &self.id
    }
}

impl FamilyMember {
    pub fn new(first_name: &str, last_name: &str, family_group: FamilyGroup) -> Self {
        FamilyMember {
            id: Self::generate_id(first_name, last_name),
            first_name: first_name.to_string(),
            middle_name: None,
            last_name: last_name.to_string(),
            nickname: None,
            gender: None,
            birthday: None,
            death_date: None,
            family_group,
            email: None,
            bio: None,
            profile_photo: None,
        }
    }

    /// `alice-smith-1f3a9c2e`: readable prefix plus a random suffix.
    pub fn generate_id(first_name: &str, last_name: &str) -> String {
        let base = slug::slugify(format!("{first_name} {last_name}"));
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}", base, &suffix[..8])
    }

    /// Name shown in the UI: the nickname if set, otherwise the first name, plus last name.
    pub fn display_name(&self) -> String {
        let first = self.nickname.as_deref().unwrap_or(&self.first_name);
        format!("{} {}", first, self.last_name)
    }

    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// Age in whole years on `date`, if the birthday is known.
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let birthday = self.birthday?;
        if date < birthday {
            return None;
        }
        let mut age = date.year() - birthday.year();
        if (date.month(), date.day()) < (birthday.month(), birthday.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }

    pub fn validate(&self) -> KinResult<()> {
        if self.first_name.trim().is_empty() {
            return Err(KinError::Validation("first_name must not be empty".into()));
        }
        if self.last_name.trim().is_empty() {
            return Err(KinError::Validation("last_name must not be empty".into()));
        }
        if let (Some(born), Some(died)) = (self.birthday, self.death_date) {
            if died < born {
                return Err(KinError::Validation(format!(
                    "{} cannot die ({died}) before being born ({born})",
                    self.display_name()
                )));
            }
        }
        Ok(())
    }
}

/// Partial update of a member profile. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberPatch {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub profile_photo: Option<String>,
}

impl MemberPatch {
    pub fn apply(self, member: &mut FamilyMember) {
        if let Some(v) = self.first_name {
            member.first_name = v;
        }
        if let Some(v) = self.last_name {
            member.last_name = v;
        }
        member.middle_name = self.middle_name.or(member.middle_name.take());
        member.nickname = self.nickname.or(member.nickname.take());
        member.gender = self.gender.or(member.gender);
        member.birthday = self.birthday.or(member.birthday);
        member.death_date = self.death_date.or(member.death_date);
        member.email = self.email.or(member.email.take());
        member.bio = self.bio.or(member.bio.take());
        member.profile_photo = self.profile_photo.or(member.profile_photo.take());
    }
}
