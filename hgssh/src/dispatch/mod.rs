//! Handing authorized invocations to Mercurial.
//!
//! The router never starts processes itself. It produces an [`Invocation`] which a
//! [`Dispatch`] implementation executes:
//! - [`HgProcess`] runs the real `hg` executable with the gateway's own stdio,
//! - [`Recording`] keeps every argument vector in memory for tests.
//!
//! # Examples
//!
//! ```rust
//! use hgssh::dispatch::{Dispatch, ExitOutcome, Recording};
//! use hgssh::Invocation;
//!
//! let mut dispatch = Recording::new();
//! let outcome = dispatch.invoke(&Invocation::init("/srv/hg/new")).unwrap();
//! assert_eq!(outcome, ExitOutcome::success());
//! assert_eq!(dispatch.last_call().unwrap(), ["init", "/srv/hg/new"]);
//! ```

use crate::error::{Result, REJECTION_EXIT_CODE};
use crate::Invocation;

pub mod process;
pub mod recording;

pub use process::HgProcess;
pub use recording::{RecordedCall, Recording};

/// How a Mercurial session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// The status the gateway process exits with.
    pub code: u8,
}

impl ExitOutcome {
    /// A session that ended normally.
    pub fn success() -> Self {
        Self { code: 0 }
    }

    /// A session that ended with `code`, or was killed by a signal if `None`.
    ///
    /// Codes outside `0..=255` and termination by signal both map to the rejection status.
    pub fn from_code(code: Option<i32>) -> Self {
        let code = code
            .and_then(|code| u8::try_from(code).ok())
            .unwrap_or(REJECTION_EXIT_CODE);
        Self { code }
    }

    /// Return `true` if the session succeeded.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

impl From<std::process::ExitStatus> for ExitOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        Self::from_code(status.code())
    }
}

/// Executes authorized invocations.
pub trait Dispatch {
    /// Run `invocation` to completion.
    ///
    /// The call blocks for the duration of the session. Errors are reserved for failures to
    /// start Mercurial at all; a session that fails is reported through its [`ExitOutcome`].
    fn invoke(&mut self, invocation: &Invocation) -> Result<ExitOutcome>;
}

impl<D: Dispatch + ?Sized> Dispatch for &mut D {
    fn invoke(&mut self, invocation: &Invocation) -> Result<ExitOutcome> {
        (**self).invoke(invocation)
    }
}
