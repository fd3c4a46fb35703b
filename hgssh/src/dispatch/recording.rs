//! An in-memory dispatcher.

use std::ffi::OsString;

use super::{Dispatch, ExitOutcome};
use crate::error::Result;
use crate::Invocation;

/// What a [`Recording`] was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// The arguments to `hg`.
    pub args: Vec<OsString>,
    /// The extra configuration Mercurial would have read.
    pub hgrc: Option<String>,
}

/// Records every invocation instead of running it.
///
/// Each call returns the configured outcome, [`ExitOutcome::success()`] by default.
#[derive(Debug, Clone)]
pub struct Recording {
    outcome: ExitOutcome,
    calls: Vec<RecordedCall>,
}

impl Recording {
    /// Create a recorder whose invocations all succeed.
    pub fn new() -> Self {
        Self {
            outcome: ExitOutcome::success(),
            calls: Vec::new(),
        }
    }

    /// Report `outcome` for every invocation.
    pub fn with_outcome(mut self, outcome: ExitOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// The recorded calls, oldest first.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// The most recent argument vector as strings, if any.
    pub fn last_call(&self) -> Option<Vec<String>> {
        self.calls.last().map(|call| {
            call.args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect()
        })
    }

    /// The extra configuration of the most recent call, if it had one.
    pub fn last_hgrc(&self) -> Option<&str> {
        self.calls.last().and_then(|call| call.hgrc.as_deref())
    }
}

impl Default for Recording {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch for Recording {
    fn invoke(&mut self, invocation: &Invocation) -> Result<ExitOutcome> {
        self.calls.push(RecordedCall {
            args: invocation.args(),
            hgrc: invocation.hgrc(),
        });
        Ok(self.outcome)
    }
}
