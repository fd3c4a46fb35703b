//! Computation of the effective policy for a `(user, repository)` pair.
//!
//! Two tiers are consulted in order: the repository's own `[r:<name>]` section, then
//! `[defaults]`. Location and permissions are resolved independently, each taken from the
//! first tier that supplies it. Within a tier a direct user entry shadows every group entry,
//! while grants of all matching groups are combined.

use crate::{GroupRegistry, PermissionSet, PolicyConfig, RepositoryName, Tier};

/// The tier a resolved value was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The repository's own `[r:<name>]` section.
    Explicit,
    /// The `[defaults]` section.
    Defaults,
}

/// Location template and permissions of a user for one repository, each possibly absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EffectivePolicy {
    location: Option<(String, Source)>,
    permissions: Option<(PermissionSet, Source)>,
}

impl EffectivePolicy {
    /// The unsubstituted location template. `None` means the repository is unknown.
    pub fn location(&self) -> Option<&str> {
        self.location.as_ref().map(|(template, _)| template.as_str())
    }

    /// The permissions of the user. `None` means no entry matched the user at all, which is
    /// different from a matching entry without flags.
    pub fn permissions(&self) -> Option<PermissionSet> {
        self.permissions.map(|(permissions, _)| permissions)
    }

    /// The tier that supplied the location.
    pub fn location_source(&self) -> Option<Source> {
        self.location.as_ref().map(|(_, source)| *source)
    }

    /// The tier that supplied the permissions.
    pub fn permissions_source(&self) -> Option<Source> {
        self.permissions.map(|(_, source)| source)
    }

    fn is_complete(&self) -> bool {
        self.location.is_some() && self.permissions.is_some()
    }
}

/// Resolves effective policies against a loaded [`PolicyConfig`].
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    config: &'a PolicyConfig,
}

impl<'a> PermissionResolver<'a> {
    /// Create a resolver for `config`.
    pub fn new(config: &'a PolicyConfig) -> Self {
        Self { config }
    }

    /// Compute location template and permissions of `user` for `repository`.
    pub fn resolve(&self, user: &str, repository: &RepositoryName) -> EffectivePolicy {
        let mut policy = EffectivePolicy::default();
        for (tier, source) in self.tiers(repository) {
            if policy.location.is_none() {
                policy.location = tier.location().map(|template| (template.to_owned(), source));
            }
            if policy.permissions.is_none() {
                policy.permissions = tier_permissions(tier, user, self.config.groups())
                    .map(|permissions| (permissions, source));
            }
            if policy.is_complete() {
                break;
            }
        }
        tracing::debug!(
            user,
            %repository,
            location = ?policy.location(),
            permissions = ?policy.permissions().map(|permissions| permissions.to_string()),
            "resolved policy"
        );
        policy
    }

    /// Compute only the location template of `repository`, as needed to create it.
    pub fn resolve_location(&self, repository: &RepositoryName) -> Option<String> {
        self.tiers(repository)
            .find_map(|(tier, _)| tier.location())
            .map(ToOwned::to_owned)
    }

    fn tiers(&self, repository: &RepositoryName) -> impl Iterator<Item = (&'a Tier, Source)> {
        self.config
            .repository(repository)
            .map(|tier| (tier, Source::Explicit))
            .into_iter()
            .chain(Some((self.config.defaults(), Source::Defaults)))
    }
}

/// The permissions `tier` grants `user`, if any entry matches.
fn tier_permissions(tier: &Tier, user: &str, groups: &GroupRegistry) -> Option<PermissionSet> {
    if let Some(direct) = tier.user(user) {
        return Some(direct);
    }
    tier.group_grants()
        .filter(|(group, _)| groups.is_member(user, group))
        .map(|(_, permissions)| permissions)
        .reduce(PermissionSet::union)
}
