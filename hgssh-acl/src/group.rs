//! Named groups of users from the `[groups]` section.

use std::collections::HashMap;

/// Split a comma-separated list into trimmed, non-empty items.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Maps group names to their members.
///
/// Groups don't nest: a member named `@other` is just a user with an odd name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GroupRegistry {
    groups: HashMap<String, Vec<String>>,
}

impl GroupRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(group, comma separated members)` pairs, as found in the `[groups]`
    /// section. A group defined twice keeps its last definition.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut registry = Self::new();
        for (name, members) in entries {
            registry.insert(name, split_list(members));
        }
        registry
    }

    /// Define `group` with `members`, replacing a previous definition. Duplicate members are
    /// dropped while keeping the order of first appearance.
    pub fn insert<'a>(&mut self, group: impl Into<String>, members: impl IntoIterator<Item = &'a str>) {
        let mut unique: Vec<String> = Vec::new();
        for member in members {
            if !unique.iter().any(|known| known == member) {
                unique.push(member.to_owned());
            }
        }
        self.groups.insert(group.into(), unique);
    }

    /// Return the members of `group`, or nothing if it isn't defined.
    pub fn members_of(&self, group: &str) -> &[String] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or_default()
    }

    /// Return `true` if `user` is a member of `group`.
    pub fn is_member(&self, user: &str, group: &str) -> bool {
        self.members_of(group).iter().any(|member| member == user)
    }

    /// Return `true` if `group` is defined, even if it has no members.
    pub fn contains(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    /// The amount of defined groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Return `true` if no group is defined.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
