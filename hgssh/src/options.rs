//! Settings of a gateway process that don't come from the policy file.

use std::path::PathBuf;

use crate::command::HG;
use crate::error::{Error, Result};
use crate::invocation::DEFAULT_REJECT_HOOK;

/// Options of the gateway itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOptions {
    /// The Mercurial executable.
    pub hg: PathBuf,
    /// The shell command attached as reject hook in read-only sessions.
    pub reject_hook: String,
    /// The directory `~` expands to in repository locations, if any.
    pub home: Option<PathBuf>,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            hg: HG.into(),
            reject_hook: DEFAULT_REJECT_HOOK.into(),
            home: None,
        }
    }
}

impl GatewayOptions {
    /// Run `hg` as the Mercurial executable.
    pub fn with_hg(mut self, hg: impl Into<PathBuf>) -> Self {
        self.hg = hg.into();
        self
    }

    /// Attach `command` as reject hook in read-only sessions.
    pub fn with_reject_hook(mut self, command: impl Into<String>) -> Self {
        self.reject_hook = command.into();
        self
    }

    /// Expand `~` to `home`.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Check that the options can be used to serve requests.
    ///
    /// An empty reject hook would let read-only users push, and an empty executable can't
    /// be started. The reject hook is written to a configuration file, so it must fit on one line.
    pub fn validate(&self) -> Result<()> {
        if self.hg.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "the Mercurial executable must not be empty".into(),
            });
        }
        if self.reject_hook.trim().is_empty() {
            return Err(Error::Config {
                message: "the reject hook must not be empty".into(),
            });
        }
        if self.reject_hook.contains(['\n', '\r']) {
            return Err(Error::Config {
                message: "the reject hook must be a single line".into(),
            });
        }
        Ok(())
    }
}
