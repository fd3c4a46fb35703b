//! Keys of permission tables and entries of the creation allow list.

use std::fmt;

use crate::GroupRegistry;

/// The prefix marking a group reference, as in `@admins`.
pub const GROUP_PREFIX: char = '@';

/// A user name or a reference to a group of users.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// A literal user name.
    User(String),
    /// A group name, without its `@` prefix.
    Group(String),
}

impl Principal {
    /// Parse `key`, treating a leading `@` as group reference.
    pub fn parse(key: &str) -> Self {
        match key.strip_prefix(GROUP_PREFIX) {
            Some(group) => Principal::Group(group.to_owned()),
            None => Principal::User(key.to_owned()),
        }
    }

    /// Return `true` if `user` is this principal, or a member of the group it references.
    pub fn matches(&self, user: &str, groups: &GroupRegistry) -> bool {
        match self {
            Principal::User(name) => name == user,
            Principal::Group(group) => groups.is_member(user, group),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::User(name) => f.write_str(name),
            Principal::Group(group) => write!(f, "{GROUP_PREFIX}{group}"),
        }
    }
}
