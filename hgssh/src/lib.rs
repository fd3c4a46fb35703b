//! hgssh: restrict a shared SSH account to Mercurial operations the caller is allowed to do.
//!
//! Every user's key in `authorized_keys` is bound to `hgssh <user> <policy-file>`. When a client
//! connects, the gateway receives the command the client wanted to run, checks it against the
//! policy of [`hgssh_acl`] and either refuses it with a one-line diagnostic and exit status
//! [`REJECTION_EXIT_CODE`], or hands it to Mercurial:
//!
//! - `hg -R <repo> serve --stdio` is served if the user holds `r` or `w` on the repository.
//!   Without `w`, hooks that abort every incoming changegroup and pushkey are attached, so pulls
//!   work while pushes fail.
//! - `hg init <repo>` runs if the user is on the `init` allow list of the `[system]` section.
//!
//! # Example
//!
//! ```rust
//! use std::path::Path;
//!
//! use hgssh::dispatch::Recording;
//! use hgssh::{Gateway, GatewayOptions};
//!
//! let config: hgssh_acl::PolicyConfig = "[groups]\nadmins = alice\n\n[defaults]\nlocation = repos/$r\n@admins = rw\n".parse()?;
//! let mut gateway = Gateway::new(config, GatewayOptions::default(), Recording::new())?;
//!
//! let outcome = gateway.run("alice", "hg -R /proj serve --stdio", Path::new("/home/hg"))?;
//! assert!(outcome.is_success());
//! assert_eq!(
//!     gateway.dispatch().last_call().unwrap(),
//!     ["-R", "/home/hg/repos/proj", "serve", "--stdio"]
//! );
//!
//! let err = gateway.run("bob", "hg -R /proj serve --stdio", Path::new("/home/hg")).unwrap_err();
//! assert_eq!(err.to_string(), "Illegal repository \"proj\"");
//! # Ok::<(), hgssh::Error>(())
//! ```
#![deny(missing_docs, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod command;
pub mod dispatch;
pub mod gateway;
pub mod invocation;
pub mod location;
pub mod options;
pub mod router;

mod error;

pub use command::RemoteCommand;
pub use error::{Error, Kind, Rejection, Result, REJECTION_EXIT_CODE};
pub use gateway::Gateway;
pub use invocation::{Action, Invocation};
pub use options::GatewayOptions;
pub use router::CommandRouter;
