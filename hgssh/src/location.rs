//! Turning location templates into repository paths.

use std::path::{Component, Path, PathBuf};

use hgssh_acl::RepositoryName;

/// The placeholder replaced by the repository name in location templates.
pub const PLACEHOLDER: &str = "$r";

/// Replace every [`PLACEHOLDER`] in `template` with `repository`.
pub fn substitute(template: &str, repository: &RepositoryName) -> String {
    template.replace(PLACEHOLDER, repository.as_str())
}

/// Resolves substituted locations relative to a working directory.
///
/// `~` and `~/...` expand to the home directory of the gateway account, relative paths are
/// joined onto the working directory, and the result is normalized lexically. Templates naming
/// other accounts' homes (`~name/...`) never get here, the policy loader refuses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    cwd: PathBuf,
    home: Option<PathBuf>,
}

impl PathResolver {
    /// Create a resolver for paths relative to `cwd`, with `~` left unexpanded.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            home: None,
        }
    }

    /// Expand `~` to `home`.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Expand `~` to `home` if it is known.
    pub fn with_home_opt(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// The directory relative paths are resolved against.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolve `location` into an absolute, normalized path.
    pub fn resolve(&self, location: &str) -> PathBuf {
        let expanded = self.expand_home(location);
        normalize(&self.cwd.join(expanded))
    }

    fn expand_home(&self, location: &str) -> PathBuf {
        let Some(home) = &self.home else {
            return location.into();
        };
        if location == "~" {
            return home.clone();
        }
        match location.strip_prefix("~/") {
            Some(rest) => home.join(rest),
            None => location.into(),
        }
    }
}

/// Remove `.` components and apply `..` to the preceding component, without touching the
/// filesystem. `..` at the root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(Component::CurDir);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(name: &str) -> RepositoryName {
        RepositoryName::new(name).unwrap()
    }

    #[test]
    fn every_placeholder_is_substituted() {
        assert_eq!(substitute("repos/$r", &name("proj")), "repos/proj");
        assert_eq!(substitute("$r/$r.hg", &name("a/b")), "a/b/a/b.hg");
        assert_eq!(substitute("/fixed/path", &name("proj")), "/fixed/path");
    }

    #[test]
    fn relative_paths_join_the_working_directory() {
        let resolver = PathResolver::new("/home/hg");
        assert_eq!(resolver.resolve("repos/proj"), Path::new("/home/hg/repos/proj"));
        assert_eq!(resolver.resolve("./repos/../other/proj"), Path::new("/home/hg/other/proj"));
        assert_eq!(resolver.resolve("/srv/hg/proj"), Path::new("/srv/hg/proj"));
        assert_eq!(resolver.resolve("../../../../x"), Path::new("/x"));
    }

    #[test]
    fn home_is_expanded_when_known() {
        let resolver = PathResolver::new("/srv").with_home("/home/hg");
        assert_eq!(resolver.resolve("~/repositories/proj"), Path::new("/home/hg/repositories/proj"));
        assert_eq!(resolver.resolve("~"), Path::new("/home/hg"));
        assert_eq!(resolver.resolve("a/~/b"), Path::new("/srv/a/~/b"));

        let without_home = PathResolver::new("/srv");
        assert_eq!(without_home.resolve("~/proj"), Path::new("/srv/~/proj"));
    }

    #[test]
    fn normalize_is_lexical() {
        assert_eq!(normalize(Path::new("/a/./b/../c/")), Path::new("/a/c"));
        assert_eq!(normalize(Path::new("/..")), Path::new("/"));
        assert_eq!(normalize(Path::new("a/../..")), Path::new(".."));
        assert_eq!(normalize(Path::new("a/..")), Path::new("."));
    }
}
