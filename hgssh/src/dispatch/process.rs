//! Running the real Mercurial executable.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{Dispatch, ExitOutcome};
use crate::error::{Error, Result};
use crate::invocation::{hgrc_search_path, HGRCPATH};
use crate::Invocation;

/// Spawns `hg` with inherited stdio and waits for it.
///
/// The child's stdin and stdout carry the Mercurial wire protocol to the SSH client, so
/// nothing is read or written by the gateway while the session runs. If the invocation brings
/// its own [configuration](Invocation::hgrc), it is written to a temporary file that is appended
/// to the child's `HGRCPATH` and removed once the child exits.
#[derive(Debug, Clone)]
pub struct HgProcess {
    program: PathBuf,
    home: Option<PathBuf>,
}

impl HgProcess {
    /// Run `program` for each invocation, looked up in `PATH` if it has no directory part.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            home: None,
        }
    }

    /// Keep the configuration files in `home` visible when `HGRCPATH` has to be set.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// The executable that will be started.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for HgProcess {
    fn default() -> Self {
        Self::new(crate::command::HG)
    }
}

/// Write `config` to a temporary file, which lives as long as the returned handle.
fn write_hgrc(config: &str) -> std::io::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().prefix("hgssh-").suffix(".rc").tempfile()?;
    file.write_all(config.as_bytes())?;
    file.flush()?;
    Ok(file)
}

impl Dispatch for HgProcess {
    fn invoke(&mut self, invocation: &Invocation) -> Result<ExitOutcome> {
        let mut command = Command::new(&self.program);
        command
            .args(invocation.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let hgrc = invocation
            .hgrc()
            .map(|config| write_hgrc(&config))
            .transpose()
            .map_err(|source| Error::HookConfig { source })?;
        if let Some(hgrc) = &hgrc {
            let inherited = std::env::var_os(HGRCPATH);
            let paths = hgrc_search_path(hgrc.path(), inherited.as_deref(), self.home.as_deref());
            let search_path = std::env::join_paths(paths).map_err(|err| Error::HookConfig {
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, err),
            })?;
            command.env(HGRCPATH, search_path);
        }

        let status = command.status().map_err(|source| Error::Spawn {
            program: self.program.clone(),
            source,
        })?;
        drop(hgrc);
        tracing::debug!(program = %self.program.display(), ?status, "mercurial exited");
        Ok(status.into())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use hgssh_acl::Permission;

    #[test]
    fn exit_status_of_the_program_is_reported() {
        let mut ok = HgProcess::new("true");
        assert!(ok.invoke(&Invocation::init("/nonexistent")).unwrap().is_success());

        let mut failing = HgProcess::new("false");
        assert_eq!(failing.invoke(&Invocation::init("/nonexistent")).unwrap().code, 1);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let mut missing = HgProcess::new("/nonexistent/hg");
        let err = missing.invoke(&Invocation::init("/nonexistent")).unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
        assert!(err.to_string().starts_with("could not run /nonexistent/hg: "));
    }

    #[test]
    fn hook_config_is_readable_by_the_child_and_removed_afterwards() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("hg");
        let copy = dir.path().join("seen.rc");
        std::fs::write(
            &script,
            format!("#!/bin/sh\ncat \"${{HGRCPATH##*:}}\" > \"{}\"\nprintf '%s' \"${{HGRCPATH##*:}}\" > \"{}.path\"\n", copy.display(), copy.display()),
        )
        .unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let invocation = Invocation::serve("/srv/proj", Permission::Read.into(), "false");
        let outcome = HgProcess::new(&script).invoke(&invocation).unwrap();
        assert!(outcome.is_success());

        assert_eq!(std::fs::read_to_string(&copy).unwrap(), invocation.hgrc().unwrap());
        let used = std::fs::read_to_string(dir.path().join("seen.rc.path")).unwrap();
        assert!(!Path::new(&used).exists(), "temporary configuration is cleaned up");
    }
}
