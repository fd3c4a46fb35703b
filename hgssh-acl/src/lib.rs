//! hgssh-acl: access-control model for the hgssh gateway.
//!
//! A single shared SSH account serves every Mercurial repository; the identity of the caller
//! is a user name bound to their key, and this crate decides what that user may do with a
//! repository. It provides:
//!
//! - [`GroupRegistry`] to expand `@group` references into member users,
//! - [`PolicyConfig`] holding the `[defaults]` tier, the `[r:<name>]` tiers and the
//!   repository-creation allow list,
//! - [`PermissionResolver`] which computes the [`EffectivePolicy`] of a `(user, repository)` pair.
//!
//! The policy is loaded once per process and treated as immutable for its lifetime.
//!
//! # Example
//!
//! ```rust
//! use hgssh_acl::{PermissionResolver, PolicyConfig, RepositoryName};
//!
//! let config: PolicyConfig = "[groups]\nadmins = alice\n\n[defaults]\nlocation = repos/$r\n@admins = rw\n".parse()?;
//! let repository = RepositoryName::from_request("/proj")?;
//!
//! let policy = PermissionResolver::new(&config).resolve("alice", &repository);
//! assert_eq!(policy.location(), Some("repos/$r"));
//! assert!(policy.permissions().is_some_and(|perms| !perms.is_read_only()));
//! # Ok::<(), hgssh_acl::Error>(())
//! ```
#![deny(missing_docs, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod config;
pub mod group;
pub mod permission;
pub mod principal;
pub mod repository;
pub mod resolve;

mod error;

pub use config::{InitAllowList, PolicyConfig, Tier};
pub use error::{Error, Kind, Result};
pub use group::GroupRegistry;
pub use permission::{Permission, PermissionSet};
pub use principal::Principal;
pub use repository::RepositoryName;
pub use resolve::{EffectivePolicy, PermissionResolver, Source};
