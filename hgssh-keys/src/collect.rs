//! Gathering public keys from a directory of `<user>.pub` files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// The extension of public key files.
pub const PUBLIC_KEY_EXTENSION: &str = "pub";

const KEY_TYPES: &[&str] = &["ssh-rsa", "ssh-dss", "ssh-ed25519", "sk-ssh-ed25519@openssh.com"];
const KEY_TYPE_PREFIXES: &[&str] = &["ecdsa-sha2-", "sk-ecdsa-sha2-"];

/// One public key and the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    /// The user name, taken from the file stem.
    pub user: String,
    /// The key line as found in the file, trimmed.
    pub key: String,
    /// The file the key was read from.
    pub source: PathBuf,
}

/// Return `true` if `line` starts with a known key type followed by key data.
pub fn is_key_line(line: &str) -> bool {
    let mut fields = line.split_whitespace();
    let (Some(kind), Some(_data)) = (fields.next(), fields.next()) else {
        return false;
    };
    KEY_TYPES.contains(&kind) || KEY_TYPE_PREFIXES.iter().any(|prefix| kind.starts_with(prefix))
}

/// Return `true` if `user` can be passed as a single word in a forced command.
pub fn is_valid_user(user: &str) -> bool {
    !user.is_empty()
        && !user.starts_with('-')
        && !user.chars().any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '\\'))
}

/// Collect every key in the `*.pub` files below `dir`, in file name order.
///
/// Lines that aren't keys, like comments, are ignored. Files whose name isn't a usable user
/// name are skipped with a warning.
pub fn collect_keys(dir: impl AsRef<Path>) -> Result<Vec<KeyEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != PUBLIC_KEY_EXTENSION) {
            continue;
        }
        let Some(user) = path.file_stem().and_then(|stem| stem.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping key file without a UTF-8 name");
            continue;
        };
        if !is_valid_user(user) {
            tracing::warn!(path = %path.display(), user, "skipping key file with an unusable user name");
            continue;
        }

        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_owned(),
            source,
        })?;
        let before = entries.len();
        entries.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| is_key_line(line))
                .map(|key| KeyEntry {
                    user: user.to_owned(),
                    key: key.to_owned(),
                    source: path.to_owned(),
                }),
        );
        tracing::debug!(path = %path.display(), user, keys = entries.len() - before, "read key file");
    }
    Ok(entries)
}
