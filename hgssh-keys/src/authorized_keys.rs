//! Rendering and merging the generated block of `authorized_keys`.

use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::KeyEntry;

/// The line opening the generated block.
pub const BEGIN_MARKER: &str = "### HGSSH BEGIN ###";
/// The line closing the generated block.
pub const END_MARKER: &str = "### HGSSH END ###";

/// Restrictions applied to every generated key, after the forced command.
pub const RESTRICTIONS: &str = "no-agent-forwarding,no-port-forwarding,no-pty,no-X11-forwarding";

/// The `authorized_keys` line forcing `entry`'s key to run `<gateway> <user> <config>`.
///
/// Paths are shell-quoted if needed. `entry.user` must have passed
/// [`is_valid_user()`](crate::is_valid_user).
pub fn authorized_line(gateway: &Path, config: &Path, entry: &KeyEntry) -> Result<String> {
    let command = [
        quoted("gateway path", gateway)?,
        shell_words::quote(&entry.user).into_owned(),
        quoted("policy path", config)?,
    ]
    .join(" ");
    Ok(format!(
        "command=\"{}\",{RESTRICTIONS} {}",
        command.replace('"', "\\\""),
        entry.key
    ))
}

fn quoted(what: &'static str, path: &Path) -> Result<String> {
    let unquotable = || Error::Unquotable {
        what,
        value: path.display().to_string(),
    };
    let path = path.to_str().ok_or_else(unquotable)?;
    if path.chars().any(char::is_control) {
        return Err(unquotable());
    }
    Ok(shell_words::quote(path).into_owned())
}

/// The generated block for `lines`, markers included.
pub fn render_block<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut block = format!("{BEGIN_MARKER}\n");
    for line in lines {
        block.push_str(line.as_ref());
        block.push('\n');
    }
    block.push_str(END_MARKER);
    block.push('\n');
    block
}

/// Replace the generated block in `existing` with `block`.
///
/// Lines outside of earlier blocks are kept in order, with trailing whitespace and trailing
/// empty lines removed, and follow the new block. Merging the result again yields the same text.
pub fn merge(existing: &str, block: &str) -> String {
    let mut preserved = Vec::new();
    let mut in_block = false;
    for line in existing.lines().map(str::trim_end) {
        if in_block {
            in_block = line != END_MARKER;
        } else if line == BEGIN_MARKER {
            in_block = true;
        } else {
            preserved.push(line);
        }
    }
    while preserved.last().is_some_and(|line| line.is_empty()) {
        preserved.pop();
    }

    let mut out = block.to_owned();
    for line in preserved {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Replace `path` with `text`, readable and writable by the owner only.
///
/// The text is written to a temporary file in the same directory which then replaces `path`,
/// so readers never see a partial file.
pub fn write_authorized_keys(path: &Path, text: &str) -> Result<()> {
    let write_error = |source| Error::Write {
        path: path.to_owned(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))
            .map_err(write_error)?;
    }
    temp.write_all(text.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(path).map_err(|err| write_error(err.error))?;
    Ok(())
}

/// Read `path`, treating a missing file as empty.
pub fn read_authorized_keys(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(Error::Read {
            path: path.to_owned(),
            source,
        }),
    }
}
