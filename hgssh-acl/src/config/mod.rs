//! Loading of the policy file.
//!
//! The file uses plain section/key-value syntax:
//!
//! ```ini
//! [groups]
//! admins = alice, bob
//!
//! [system]
//! init = @admins
//!
//! [defaults]
//! location = repos/$r
//! @admins = rw
//!
//! [r:website]
//! location = /srv/www/hg
//! carol = r
//! ```
//!
//! # Sections
//! - `[groups]`: `name = comma, separated, users`
//! - `[system]`: `init = users or @groups` allowed to create repositories
//! - `[defaults]`: `location` template and permissions applying to every repository
//! - `[r:<name>]`: `location` template and permissions of one repository
//!
//! Permission values are built from the flags `r` and `w`, anything else fails the load.

pub mod system;
pub mod tier;

pub use system::InitAllowList;
pub use tier::Tier;

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use ini::{Ini, ParseOption};

use crate::{Error, GroupRegistry, RepositoryName, Result};

/// The section defining groups.
pub const GROUPS_SECTION: &str = "groups";
/// The section holding gateway-wide settings.
pub const SYSTEM_SECTION: &str = "system";
/// The section applying to every repository.
pub const DEFAULTS_SECTION: &str = "defaults";
/// The key in [`SYSTEM_SECTION`] listing who may create repositories.
pub const INIT_KEY: &str = "init";
/// The key holding a location template in repository sections.
pub const LOCATION_KEY: &str = "location";

/// The loaded, normalized policy of one gateway invocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    groups: GroupRegistry,
    init: InitAllowList,
    defaults: Tier,
    repositories: HashMap<RepositoryName, Tier>,
}

impl PolicyConfig {
    /// Read and parse the policy file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = text.parse::<Self>()?;
        tracing::debug!(
            path = %path.display(),
            groups = config.groups.len(),
            repositories = config.repositories.len(),
            "loaded policy"
        );
        Ok(config)
    }

    /// Build the policy from an already parsed file.
    pub fn from_ini(ini: &Ini) -> Result<Self> {
        let mut config = Self::default();
        let mut group_entries = Vec::new();
        for (section, properties) in ini.iter() {
            let Some(section) = section else { continue };
            match section {
                GROUPS_SECTION => group_entries.extend(properties.iter()),
                SYSTEM_SECTION => {
                    if let Some(value) = properties.get_all(INIT_KEY).last() {
                        config.init = InitAllowList::parse(value);
                    }
                }
                DEFAULTS_SECTION => config.defaults.extend(section, properties.iter())?,
                _ => match RepositoryName::from_section(section) {
                    Some(Ok(name)) => config
                        .repositories
                        .entry(name)
                        .or_default()
                        .extend(section, properties.iter())?,
                    Some(Err(err)) => tracing::warn!(section, %err, "ignoring unreachable repository section"),
                    None => tracing::debug!(section, "ignoring unknown section"),
                },
            }
        }
        config.groups = GroupRegistry::from_entries(group_entries);
        Ok(config)
    }

    /// Start building a policy in code.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The group definitions.
    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    /// The principals allowed to create repositories.
    pub fn init_allow_list(&self) -> &InitAllowList {
        &self.init
    }

    /// The tier applying to every repository.
    pub fn defaults(&self) -> &Tier {
        &self.defaults
    }

    /// The tier configured for `repository` alone, if there is one.
    pub fn repository(&self, repository: &RepositoryName) -> Option<&Tier> {
        self.repositories.get(repository)
    }

    /// The names of all repositories with their own section.
    pub fn repository_names(&self) -> impl Iterator<Item = &RepositoryName> + '_ {
        self.repositories.keys()
    }
}

impl FromStr for PolicyConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let ini = Ini::load_from_str_opt(s, parse_options())?;
        Self::from_ini(&ini)
    }
}

/// Values are kept verbatim, so paths and permission flags don't go through quote or escape
/// processing.
fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// Assemble a [`PolicyConfig`] without a file.
#[derive(Debug, Default)]
pub struct Builder {
    config: PolicyConfig,
}

impl Builder {
    /// Define `group` with its `members`.
    pub fn group<'a>(mut self, group: &str, members: impl IntoIterator<Item = &'a str>) -> Self {
        self.config.groups.insert(group, members);
        self
    }

    /// Set the repository-creation allow list.
    pub fn init(mut self, allowed: InitAllowList) -> Self {
        self.config.init = allowed;
        self
    }

    /// Set the `[defaults]` tier.
    pub fn defaults(mut self, tier: Tier) -> Self {
        self.config.defaults = tier;
        self
    }

    /// Set the tier of `repository`.
    pub fn repository(mut self, repository: RepositoryName, tier: Tier) -> Self {
        self.config.repositories.insert(repository, tier);
        self
    }

    /// Finish building.
    pub fn build(self) -> PolicyConfig {
        self.config
    }
}
