//! The argument vector and configuration handed to Mercurial.
//!
//! Mercurial refuses `serve --stdio` unless the arguments are exactly `-R <repo> serve --stdio`,
//! so the reject hooks of read-only sessions can't be passed with `--config`. They are rendered
//! as an hgrc file instead, which the dispatcher appends to the `HGRCPATH` of the child.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use hgssh_acl::PermissionSet;

/// The name under which reject hooks are registered, as in `hooks.prechangegroup.hgssh`.
pub const REJECT_HOOK_NAME: &str = "hgssh";

/// The hook points guarded in read-only sessions: incoming changegroups and pushed keys.
pub const REJECT_HOOK_POINTS: [&str; 2] = ["prechangegroup", "prepushkey"];

/// A shell hook that fails every transaction it is attached to.
pub const DEFAULT_REJECT_HOOK: &str = "echo 'Permission denied' >&2; exit 1";

/// The environment variable listing the configuration files Mercurial reads.
pub const HGRCPATH: &str = "HGRCPATH";

/// The system-wide configuration Mercurial reads while `HGRCPATH` is unset.
pub const SYSTEM_HGRC_PATHS: [&str; 2] = ["/etc/mercurial/hgrc", "/etc/mercurial/hgrc.d"];

/// The per-account configuration files, relative to the home directory, Mercurial reads while
/// `HGRCPATH` is unset.
pub const USER_HGRC_FILES: [&str; 2] = [".hgrc", ".config/hg/hgrc"];

/// The search path to put into `HGRCPATH` so that `hook_config` is read last.
///
/// An `inherited` search path is kept in front. Without one, the locations Mercurial would have
/// used by default are listed, so setting the variable doesn't hide existing configuration.
pub fn hgrc_search_path(hook_config: &Path, inherited: Option<&OsStr>, home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = match inherited {
        Some(inherited) => std::env::split_paths(inherited)
            .filter(|path| !path.as_os_str().is_empty())
            .collect(),
        None => SYSTEM_HGRC_PATHS
            .iter()
            .map(PathBuf::from)
            .chain(home.into_iter().flat_map(|home| USER_HGRC_FILES.iter().map(move |file| home.join(file))))
            .collect(),
    };
    paths.push(hook_config.to_owned());
    paths
}

/// The action a Mercurial invocation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `serve --stdio` on an existing repository.
    Serve,
    /// `init` of a new repository.
    Init,
}

/// A fully authorized Mercurial command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    action: Action,
    repository: PathBuf,
    reject_hook: Option<String>,
}

impl Invocation {
    /// Serve `repository` over stdio. If `permissions` lack `w`, `reject_hook` is attached to
    /// every [`REJECT_HOOK_POINTS`] through [`hgrc()`](Self::hgrc), so pulls succeed and pushes
    /// are aborted by Mercurial.
    pub fn serve(repository: impl Into<PathBuf>, permissions: PermissionSet, reject_hook: &str) -> Self {
        Invocation {
            action: Action::Serve,
            repository: repository.into(),
            reject_hook: permissions.is_read_only().then(|| reject_hook.to_owned()),
        }
    }

    /// Create `repository`.
    pub fn init(repository: impl Into<PathBuf>) -> Self {
        Invocation {
            action: Action::Init,
            repository: repository.into(),
            reject_hook: None,
        }
    }

    /// What the invocation does.
    pub fn action(&self) -> Action {
        self.action
    }

    /// The absolute path of the repository.
    pub fn repository(&self) -> &Path {
        &self.repository
    }

    /// Return `true` if pushes will be rejected.
    pub fn is_read_only(&self) -> bool {
        self.reject_hook.is_some()
    }

    /// The arguments to pass to `hg`, without the program name.
    pub fn args(&self) -> Vec<OsString> {
        let repository = self.repository.clone().into_os_string();
        match self.action {
            Action::Serve => vec!["-R".into(), repository, "serve".into(), "--stdio".into()],
            Action::Init => vec!["init".into(), repository],
        }
    }

    /// The configuration file Mercurial has to read in addition to its own, if any.
    ///
    /// Only read-only sessions have one: a `[hooks]` section attaching the reject hook.
    pub fn hgrc(&self) -> Option<String> {
        self.reject_hook.as_ref().map(|hook| {
            let mut config = String::from("[hooks]\n");
            for point in REJECT_HOOK_POINTS {
                config.push_str(&format!("{point}.{REJECT_HOOK_NAME} = {hook}\n"));
            }
            config
        })
    }
}
