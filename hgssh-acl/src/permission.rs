//! Read and write permission flags.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// A single permission flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Pull and clone.
    Read,
    /// Push changesets and keys.
    Write,
}

impl Permission {
    /// Parse the single-character flag used in policy files.
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'r' => Some(Permission::Read),
            'w' => Some(Permission::Write),
            _ => None,
        }
    }

    /// The character representing this flag in policy files.
    pub fn flag(self) -> char {
        match self {
            Permission::Read => 'r',
            Permission::Write => 'w',
        }
    }
}

/// A character other than `r` or `w` appeared in a permission value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission flag '{0}'")]
pub struct UnknownFlag(pub char);

/// The set of [`Permission`] flags granted to a user for one repository.
///
/// Read and write are independent: a set holding only `w` has no read flag, but still passes
/// [`grants_access()`](Self::grants_access).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionSet {
    read: bool,
    write: bool,
}

impl PermissionSet {
    /// The set without any flags.
    pub const EMPTY: PermissionSet = PermissionSet {
        read: false,
        write: false,
    };
    /// Both flags.
    pub const READ_WRITE: PermissionSet = PermissionSet { read: true, write: true };

    /// Parse `text` strictly, so each character must be `r` or `w`. Repeats are fine and an empty
    /// string yields [`EMPTY`](Self::EMPTY).
    pub fn parse(text: &str) -> Result<Self, UnknownFlag> {
        text.chars().try_fold(Self::EMPTY, |mut set, flag| {
            set.insert(Permission::from_flag(flag).ok_or(UnknownFlag(flag))?);
            Ok(set)
        })
    }

    /// Add `permission` to the set.
    pub fn insert(&mut self, permission: Permission) {
        match permission {
            Permission::Read => self.read = true,
            Permission::Write => self.write = true,
        }
    }

    /// Add `permission` and return the set.
    pub fn with(mut self, permission: Permission) -> Self {
        self.insert(permission);
        self
    }

    /// Return `true` if `permission` is part of the set.
    pub fn contains(&self, permission: Permission) -> bool {
        match permission {
            Permission::Read => self.read,
            Permission::Write => self.write,
        }
    }

    /// Return the flags present in either set.
    pub fn union(self, other: PermissionSet) -> Self {
        PermissionSet {
            read: self.read || other.read,
            write: self.write || other.write,
        }
    }

    /// Return `true` if neither flag is set.
    pub fn is_empty(&self) -> bool {
        !self.read && !self.write
    }

    /// Return `true` if the holder may open a session at all, i.e. holds `r` or `w`.
    pub fn grants_access(&self) -> bool {
        self.read || self.write
    }

    /// Return `true` if the holder may not push, i.e. lacks `w`.
    pub fn is_read_only(&self) -> bool {
        !self.write
    }

    /// Iterate the contained flags in `r`, `w` order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        [Permission::Read, Permission::Write]
            .into_iter()
            .filter(|permission| self.contains(*permission))
    }
}

impl FromStr for PermissionSet {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for permission in self.iter() {
            write!(f, "{}", permission.flag())?;
        }
        Ok(())
    }
}

impl BitOr for PermissionSet {
    type Output = PermissionSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for PermissionSet {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl From<Permission> for PermissionSet {
    fn from(permission: Permission) -> Self {
        PermissionSet::EMPTY.with(permission)
    }
}
