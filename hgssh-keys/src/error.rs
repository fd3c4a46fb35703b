//! Errors of key collection and `authorized_keys` maintenance.

use std::path::PathBuf;

/// Result type alias for key operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable classification of [`Error`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Reading or writing the filesystem failed.
    Io,
    /// A value can't be placed in an `authorized_keys` line.
    InvalidArgument,
}

/// Errors produced while generating `authorized_keys`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The key directory couldn't be traversed.
    #[error("could not walk key directory: {0}")]
    Walk(#[from] walkdir::Error),
    /// A file couldn't be read.
    #[error("could not read {}: {source}", .path.display())]
    Read {
        /// The file that was attempted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A file couldn't be written.
    #[error("could not write {}: {source}", .path.display())]
    Write {
        /// The file that was attempted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A path or name contains characters that can't be quoted in a forced command.
    #[error("{what} {value:?} can't be used in a forced command")]
    Unquotable {
        /// What the value is.
        what: &'static str,
        /// The offending value.
        value: String,
    },
}

impl Error {
    /// Fast classification helper returning a stable error kind.
    pub fn kind(&self) -> Kind {
        match self {
            Error::Walk(_) | Error::Read { .. } | Error::Write { .. } => Kind::Io,
            Error::Unquotable { .. } => Kind::InvalidArgument,
        }
    }
}
