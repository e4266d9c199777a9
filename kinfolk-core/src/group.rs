//! Family groups: the demo/real partition of users and their data.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KinError;
use crate::member::FamilyMember;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyGroup {
    Demo,
    Real,
}

impl FamilyGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyGroup::Demo => "demo",
            FamilyGroup::Real => "real",
        }
    }
}

impl fmt::Display for FamilyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FamilyGroup {
    type Err = KinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(FamilyGroup::Demo),
            "real" => Ok(FamilyGroup::Real),
            other => Err(KinError::Validation(format!(
                "Unknown family group '{other}' (expected 'demo' or 'real')"
            ))),
        }
    }
}

/// Per-user classification into family groups.
///
/// Built from the configured demo user list and the member records. A user
/// listed in `demo_users` is demo no matter what their member record says.
#[derive(Debug, Clone, Default)]
pub struct GroupDirectory {
    demo_users: HashSet<String>,
    members: HashMap<String, FamilyGroup>,
}

impl GroupDirectory {
    pub fn new<I, S>(demo_users: I, members: &[FamilyMember]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GroupDirectory {
            demo_users: demo_users.into_iter().map(Into::into).collect(),
            members: members
                .iter()
                .map(|m| (m.id.clone(), m.family_group))
                .collect(),
        }
    }

    /// The group a user belongs to, or None if the user is unknown.
    pub fn classify(&self, user_id: &str) -> Option<FamilyGroup> {
        if self.demo_users.contains(user_id) {
            return Some(FamilyGroup::Demo);
        }
        self.members.get(user_id).copied()
    }

    /// Classification for a viewer. Unknown viewers see real data only.
    pub fn viewer_group(&self, viewer_id: &str) -> FamilyGroup {
        self.classify(viewer_id).unwrap_or(FamilyGroup::Real)
    }

    /// Ids of every member belonging to `group`.
    pub fn member_ids(&self, group: FamilyGroup) -> HashSet<String> {
        self.members
            .keys()
            .chain(self.demo_users.iter())
            .filter(|id| self.classify(id) == Some(group))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::FamilyMember;

    fn member(id: &str, group: FamilyGroup) -> FamilyMember {
        let mut m = FamilyMember::new("Test", "Person", group);
        m.id = id.to_string();
        m
    }

    #[test]
    fn test_parse_family_group() {
        assert_eq!("demo".parse::<FamilyGroup>().unwrap(), FamilyGroup::Demo);
        assert_eq!(" Real ".parse::<FamilyGroup>().unwrap(), FamilyGroup::Real);
        assert!("staging".parse::<FamilyGroup>().is_err());
    }

    #[test]
    fn test_demo_user_list_overrides_member_record() {
        let members = vec![member("alice", FamilyGroup::Real), member("bob", FamilyGroup::Real)];
        let directory = GroupDirectory::new(["bob"], &members);

        assert_eq!(directory.classify("alice"), Some(FamilyGroup::Real));
        assert_eq!(directory.classify("bob"), Some(FamilyGroup::Demo));
        assert_eq!(directory.classify("nobody"), None);
    }

    #[test]
    fn test_member_ids_partition_is_disjoint() {
        let members = vec![
            member("alice", FamilyGroup::Real),
            member("bob", FamilyGroup::Real),
            member("carol", FamilyGroup::Demo),
        ];
        let directory = GroupDirectory::new(["bob", "dave"], &members);

        let real = directory.member_ids(FamilyGroup::Real);
        let demo = directory.member_ids(FamilyGroup::Demo);

        assert_eq!(real, HashSet::from(["alice".to_string()]));
        assert_eq!(
            demo,
            HashSet::from(["bob".to_string(), "carol".to_string(), "dave".to_string()])
        );
        assert!(real.is_disjoint(&demo));
    }

    #[test]
    fn test_unknown_viewer_sees_real_group() {
        let directory = GroupDirectory::new(Vec::<String>::new(), &[]);
        assert_eq!(directory.viewer_group("stranger"), FamilyGroup::Real);
    }
}
