//! hgssh-keys: maintain the `authorized_keys` entries of an hgssh account.
//!
//! Public keys live in a directory as `<user>.pub` files, typically inside an administration
//! repository. Each key becomes one `authorized_keys` line forcing the gateway command
//! `hgssh <user> <policy-file>`, with forwarding and terminal allocation disabled. The lines are
//! kept between [`BEGIN_MARKER`] and [`END_MARKER`]; everything else in the file is left alone.
//!
//! # Example
//!
//! ```rust
//! use std::path::Path;
//!
//! use hgssh_keys::{authorized_line, merge, render_block, KeyEntry};
//!
//! let entry = KeyEntry {
//!     user: "alice".into(),
//!     key: "ssh-ed25519 AAAAC3Nz alice@laptop".into(),
//!     source: "keys/alice.pub".into(),
//! };
//! let line = authorized_line(Path::new("/usr/bin/hgssh"), Path::new("/etc/hgssh.conf"), &entry)?;
//! let text = merge("ssh-rsa AAAA admin\n", &render_block([line]));
//!
//! assert!(text.starts_with("### HGSSH BEGIN ###\ncommand=\"/usr/bin/hgssh alice /etc/hgssh.conf\","));
//! assert!(text.ends_with("### HGSSH END ###\nssh-rsa AAAA admin\n"));
//! # Ok::<(), hgssh_keys::Error>(())
//! ```
#![deny(missing_docs, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod authorized_keys;
pub mod collect;

mod error;

pub use authorized_keys::{
    authorized_line, merge, read_authorized_keys, render_block, write_authorized_keys, BEGIN_MARKER, END_MARKER,
};
pub use collect::{collect_keys, is_key_line, is_valid_user, KeyEntry};
pub use error::{Error, Kind, Result};

use std::path::Path;

/// Render the `authorized_keys` lines of all `entries`.
pub fn authorized_lines(gateway: &Path, config: &Path, entries: &[KeyEntry]) -> Result<Vec<String>> {
    entries
        .iter()
        .map(|entry| authorized_line(gateway, config, entry))
        .collect()
}
