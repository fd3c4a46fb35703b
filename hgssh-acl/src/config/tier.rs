//! One scope of repository policy: `[defaults]` or a single `[r:<name>]` section.

use std::collections::HashMap;

use crate::permission::PermissionSet;
use crate::principal::Principal;
use crate::{Error, Result};

use super::LOCATION_KEY;

/// The location template and permission table of one policy section.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tier {
    location: Option<String>,
    users: HashMap<String, PermissionSet>,
    /// Group grants in file order.
    groups: Vec<(String, PermissionSet)>,
}

impl Tier {
    /// Create a tier without location or permissions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tier from the `(key, value)` entries of `section`.
    pub fn from_entries<'a>(section: &str, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut tier = Self::new();
        tier.extend(section, entries)?;
        Ok(tier)
    }

    /// Add the entries of `section` to this tier, with later keys replacing earlier ones.
    ///
    /// An empty `location` is ignored so the next tier may supply one. A location starting with
    /// `~name` is refused, as only the gateway account's own home can be expanded.
    pub fn extend<'a>(&mut self, section: &str, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<()> {
        for (key, value) in entries {
            if key == LOCATION_KEY {
                if names_other_home(value) {
                    return Err(Error::InvalidLocation {
                        section: section.to_owned(),
                        value: value.to_owned(),
                    });
                }
                if !value.is_empty() {
                    self.location = Some(value.to_owned());
                }
                continue;
            }
            let permissions = PermissionSet::parse(value).map_err(|err| Error::InvalidPermission {
                section: section.to_owned(),
                principal: key.to_owned(),
                value: value.to_owned(),
                flag: err.0,
            })?;
            match Principal::parse(key) {
                Principal::User(user) => {
                    self.users.insert(user, permissions);
                }
                Principal::Group(group) => match self.groups.iter_mut().find(|(name, _)| *name == group) {
                    Some((_, existing)) => *existing = permissions,
                    None => self.groups.push((group, permissions)),
                },
            }
        }
        Ok(())
    }

    /// Set the location template.
    pub fn with_location(mut self, template: impl Into<String>) -> Self {
        self.location = Some(template.into());
        self
    }

    /// Grant `permissions` to `principal`, which is a user name or an `@group` reference.
    pub fn with_grant(mut self, principal: &str, permissions: PermissionSet) -> Self {
        match Principal::parse(principal) {
            Principal::User(user) => {
                self.users.insert(user, permissions);
            }
            Principal::Group(group) => {
                self.groups.retain(|(name, _)| *name != group);
                self.groups.push((group, permissions));
            }
        }
        self
    }

    /// The location template, possibly containing `$r`.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// The permissions granted to `user` by name, ignoring groups.
    pub fn user(&self, user: &str) -> Option<PermissionSet> {
        self.users.get(user).copied()
    }

    /// The permissions granted to groups, in file order.
    pub fn group_grants(&self) -> impl Iterator<Item = (&str, PermissionSet)> + '_ {
        self.groups.iter().map(|(group, permissions)| (group.as_str(), *permissions))
    }

    /// Return `true` if neither location nor any permission is configured.
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.users.is_empty() && self.groups.is_empty()
    }
}

/// `~user` and `~user/...`, as opposed to `~` and `~/...`.
fn names_other_home(template: &str) -> bool {
    template
        .strip_prefix('~')
        .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Permission;

    #[test]
    fn entries_are_split_into_location_users_and_groups() {
        let tier = Tier::from_entries(
            "defaults",
            [("location", "repos/$r"), ("alice", "rw"), ("@devs", "r"), ("@ops", "w")],
        )
        .unwrap();
        assert_eq!(tier.location(), Some("repos/$r"));
        assert_eq!(tier.user("alice"), Some(PermissionSet::READ_WRITE));
        assert_eq!(tier.user("devs"), None);
        assert_eq!(
            tier.group_grants().collect::<Vec<_>>(),
            [("devs", PermissionSet::from(Permission::Read)), ("ops", PermissionSet::from(Permission::Write))]
        );
    }

    #[test]
    fn empty_values_are_kept_for_users_but_not_for_location() {
        let tier = Tier::from_entries("r:proj", [("location", ""), ("bob", "")]).unwrap();
        assert_eq!(tier.location(), None);
        assert_eq!(tier.user("bob"), Some(PermissionSet::EMPTY));
    }

    #[test]
    fn later_keys_replace_earlier_ones() {
        let tier = Tier::from_entries("r:proj", [("@devs", "r"), ("bob", "r"), ("@devs", "rw"), ("bob", "")]).unwrap();
        assert_eq!(tier.group_grants().collect::<Vec<_>>(), [("devs", PermissionSet::READ_WRITE)]);
        assert_eq!(tier.user("bob"), Some(PermissionSet::EMPTY));
    }

    #[test]
    fn unknown_flags_name_their_origin() {
        let err = Tier::from_entries("r:proj", [("carol", "rx")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid permission \"rx\" for 'carol' in [r:proj]: unknown flag 'x'"
        );
    }

    #[test]
    fn home_of_other_accounts_is_refused() {
        let err = Tier::from_entries("defaults", [("location", "~hg/repos/$r")]).unwrap_err();
        assert_eq!(err.kind(), crate::Kind::Validation);
        assert_eq!(
            err.to_string(),
            "invalid location \"~hg/repos/$r\" in [defaults]: only '~' and '~/' refer to a home directory"
        );

        for template in ["~", "~/repos/$r", "repos/~x/$r", "/srv/$r"] {
            let tier = Tier::from_entries("defaults", [("location", template)]).unwrap();
            assert_eq!(tier.location(), Some(template));
        }
    }
}
