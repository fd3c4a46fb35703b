//! One gateway request from command line to exit status.

use std::path::Path;

use hgssh_acl::PolicyConfig;

use crate::dispatch::{Dispatch, ExitOutcome, HgProcess};
use crate::error::Result;
use crate::{CommandRouter, GatewayOptions, Invocation, Rejection};

/// Policy, options and a dispatcher, ready to serve requests.
#[derive(Debug)]
pub struct Gateway<D> {
    config: PolicyConfig,
    options: GatewayOptions,
    dispatch: D,
}

impl Gateway<HgProcess> {
    /// Create a gateway that runs the Mercurial executable named in `options`.
    pub fn with_hg_process(config: PolicyConfig, options: GatewayOptions) -> Result<Self> {
        let dispatch = HgProcess::new(options.hg.clone()).with_home(options.home.clone());
        Self::new(config, options, dispatch)
    }
}

impl<D: Dispatch> Gateway<D> {
    /// Create a gateway handing authorized invocations to `dispatch`, after validating `options`.
    pub fn new(config: PolicyConfig, options: GatewayOptions, dispatch: D) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            config,
            options,
            dispatch,
        })
    }

    /// Authorize the command `raw` sent by `user` without running it.
    pub fn route(&self, user: &str, raw: &str, cwd: &Path) -> std::result::Result<Invocation, Rejection> {
        CommandRouter::new(&self.config, &self.options).route(user, raw, cwd)
    }

    /// Authorize the command `raw` sent by `user` and run it, with relative repository
    /// locations resolved against `cwd`.
    pub fn run(&mut self, user: &str, raw: &str, cwd: &Path) -> Result<ExitOutcome> {
        let invocation = match self.route(user, raw, cwd) {
            Ok(invocation) => invocation,
            Err(rejection) => {
                tracing::warn!(user, command = raw, kind = ?rejection.kind(), "{rejection}");
                return Err(rejection.into());
            }
        };
        tracing::info!(
            user,
            action = ?invocation.action(),
            repository = %invocation.repository().display(),
            read_only = invocation.is_read_only(),
            "dispatching to mercurial"
        );
        self.dispatch.invoke(&invocation)
    }

    /// The loaded policy.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// The gateway options.
    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    /// The dispatcher, to inspect what it was asked to do.
    pub fn dispatch(&self) -> &D {
        &self.dispatch
    }
}
