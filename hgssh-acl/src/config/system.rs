//! Gateway-wide settings of the `[system]` section.

use crate::group::split_list;
use crate::principal::Principal;
use crate::GroupRegistry;

/// The principals allowed to create repositories, from `[system] init`.
///
/// The default list is empty and permits nobody.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InitAllowList {
    principals: Vec<Principal>,
}

impl InitAllowList {
    /// Parse a comma-separated list of users and `@group` references.
    pub fn parse(value: &str) -> Self {
        InitAllowList {
            principals: split_list(value).map(Principal::parse).collect(),
        }
    }

    /// Return `true` if `user` is listed, or is a member of a listed group.
    pub fn permits(&self, user: &str, groups: &GroupRegistry) -> bool {
        self.principals.iter().any(|principal| principal.matches(user, groups))
    }

    /// The listed principals in order.
    pub fn principals(&self) -> &[Principal] {
        &self.principals
    }

    /// Return `true` if nobody may create repositories.
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}
