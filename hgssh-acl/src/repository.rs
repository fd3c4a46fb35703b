//! Logical repository names as requested by clients.

use std::fmt;

use crate::{Error, Result};

/// The prefix of policy sections that configure a single repository, as in `[r:project]`.
pub const SECTION_PREFIX: &str = "r:";

/// A validated logical repository name.
///
/// Names may contain `/` to address nested repositories like `team/project`, but no segment may
/// be empty, `.` or `..`, the name may not start with `~`, and the characters `[`, `]`, NUL, CR
/// and LF are refused since they would collide with section syntax or terminal output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Validate `name` as-is.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        match invalid_reason(&name) {
            Some(reason) => Err(Error::InvalidRepositoryName { name, reason }),
            None => Ok(RepositoryName(name)),
        }
    }

    /// Turn the repository argument of a remote command into a name by stripping a single leading
    /// and a single trailing `/`, then validating the rest.
    pub fn from_request(argument: &str) -> Result<Self> {
        let name = argument.strip_prefix('/').unwrap_or(argument);
        Self::new(name.strip_suffix('/').unwrap_or(name))
    }

    /// Parse the name out of a section header like `r:project`, returning `None` for other
    /// sections.
    pub fn from_section(section: &str) -> Option<Result<Self>> {
        section.strip_prefix(SECTION_PREFIX).map(Self::new)
    }

    /// The name as string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The policy section configuring this repository.
    pub fn section_key(&self) -> String {
        format!("{SECTION_PREFIX}{}", self.0)
    }
}

fn invalid_reason(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("name is empty");
    }
    if name.starts_with('~') {
        return Some("name may not start with '~'");
    }
    if name.contains(['[', ']', '\0', '\r', '\n']) {
        return Some("name contains a reserved character");
    }
    name.split('/').find_map(|segment| match segment {
        "" => Some("name contains an empty path segment"),
        "." | ".." => Some("name contains a relative path segment"),
        _ => None,
    })
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RepositoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_exactly_one_leading_separator() {
        assert_eq!(RepositoryName::from_request("/proj").unwrap().as_str(), "proj");
        assert_eq!(RepositoryName::from_request("proj").unwrap().as_str(), "proj");
        assert_eq!(
            RepositoryName::from_request("/team/proj").unwrap().as_str(),
            "team/proj"
        );
        assert!(
            RepositoryName::from_request("//proj").is_err(),
            "the second separator leaves an empty segment"
        );
    }

    #[test]
    fn strips_exactly_one_trailing_separator() {
        assert_eq!(RepositoryName::from_request("proj/").unwrap().as_str(), "proj");
        assert_eq!(RepositoryName::from_request("/team/proj/").unwrap().as_str(), "team/proj");
        assert!(RepositoryName::from_request("proj//").is_err());
        assert!(RepositoryName::from_request("/").is_err());
        assert!(RepositoryName::new("proj/").is_err(), "only requests are trimmed");
    }

    #[test]
    fn traversal_and_section_syntax_are_rejected() {
        for name in ["", "..", "../etc", "a/../../b", "./a", "a/", "~", "~root/x", "a]b", "r[x", "a\nb"] {
            let err = RepositoryName::new(name).unwrap_err();
            assert_eq!(err.kind(), crate::Kind::RepositoryName, "{name:?}");
        }
    }

    #[test]
    fn dots_inside_segments_are_fine() {
        for name in ["proj.hg", "a..b", ".hidden", "team/proj-2"] {
            assert!(RepositoryName::new(name).is_ok(), "{name:?}");
        }
    }

    #[test]
    fn section_key_round_trips() {
        let name = RepositoryName::new("team/proj").unwrap();
        assert_eq!(name.section_key(), "r:team/proj");
        assert_eq!(RepositoryName::from_section(&name.section_key()).unwrap().unwrap(), name);
        assert!(RepositoryName::from_section("defaults").is_none());
    }
}
