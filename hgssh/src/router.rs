//! Authorization of remote commands against the policy.

use std::path::Path;

use hgssh_acl::{PermissionResolver, PolicyConfig, RepositoryName};

use crate::command::RemoteCommand;
use crate::location::{substitute, PathResolver};
use crate::{GatewayOptions, Invocation, Rejection};

/// Turns a raw remote command into an [`Invocation`], or refuses it.
///
/// Every check happens here, before anything touches repository storage. The router holds no
/// state besides borrowed configuration, so it can be used for any number of requests.
#[derive(Debug, Clone, Copy)]
pub struct CommandRouter<'a> {
    config: &'a PolicyConfig,
    options: &'a GatewayOptions,
}

impl<'a> CommandRouter<'a> {
    /// Route requests according to `config` and `options`.
    pub fn new(config: &'a PolicyConfig, options: &'a GatewayOptions) -> Self {
        Self { config, options }
    }

    /// Authorize `raw`, the command line sent by `user`, with relative locations resolved
    /// against `cwd`.
    pub fn route(&self, user: &str, raw: &str, cwd: &Path) -> Result<Invocation, Rejection> {
        match RemoteCommand::parse(raw)? {
            RemoteCommand::Serve { repository } => self.serve(user, &repository, cwd),
            RemoteCommand::Init { repository } => self.init(user, &repository, cwd),
        }
    }

    fn serve(&self, user: &str, argument: &str, cwd: &Path) -> Result<Invocation, Rejection> {
        let name = repository_name(argument)?;
        let policy = PermissionResolver::new(self.config).resolve(user, &name);

        let template = policy.location().ok_or_else(|| Rejection::UnknownRepository {
            name: name.to_string(),
        })?;
        let path = self.path_resolver(cwd).resolve(&substitute(template, &name));

        let permissions = policy.permissions().ok_or_else(|| Rejection::NoPermissionRecord {
            name: name.to_string(),
        })?;
        if !permissions.grants_access() {
            return Err(Rejection::AccessDenied {
                name: name.to_string(),
            });
        }
        Ok(Invocation::serve(path, permissions, &self.options.reject_hook))
    }

    fn init(&self, user: &str, argument: &str, cwd: &Path) -> Result<Invocation, Rejection> {
        if !self.config.init_allow_list().permits(user, self.config.groups()) {
            return Err(Rejection::CreationForbidden { user: user.to_owned() });
        }
        let name = repository_name(argument)?;
        let template = PermissionResolver::new(self.config)
            .resolve_location(&name)
            .ok_or_else(|| Rejection::UnknownRepository {
                name: name.to_string(),
            })?;
        Ok(Invocation::init(self.path_resolver(cwd).resolve(&substitute(&template, &name))))
    }

    fn path_resolver(&self, cwd: &Path) -> PathResolver {
        PathResolver::new(cwd).with_home_opt(self.options.home.clone())
    }
}

fn repository_name(argument: &str) -> Result<RepositoryName, Rejection> {
    RepositoryName::from_request(argument).map_err(|err| {
        let reason = match err {
            hgssh_acl::Error::InvalidRepositoryName { reason, .. } => reason,
            _ => "name is not usable",
        };
        Rejection::InvalidName {
            name: argument.to_owned(),
            reason,
        }
    })
}
