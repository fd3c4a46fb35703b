//! Error types for loading and validating access-control policy.

use std::path::PathBuf;

/// Result type alias for policy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable high-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// The policy file could not be read.
    Io,
    /// The policy file is not valid section/key-value syntax.
    Syntax,
    /// The policy file is well-formed but holds an invalid value.
    Validation,
    /// A repository name supplied by a client was rejected.
    RepositoryName,
}

/// Errors produced while loading policy or validating names.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The policy file could not be read from disk.
    #[error("could not read policy file {}: {source}", .path.display())]
    Read {
        /// The path that was attempted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The policy file is syntactically invalid.
    #[error("could not parse policy file: {0}")]
    Parse(#[from] ini::ParseError),
    /// A permission value contains a flag other than `r` or `w`.
    #[error("invalid permission {value:?} for '{principal}' in [{section}]: unknown flag '{flag}'")]
    InvalidPermission {
        /// The section holding the entry.
        section: String,
        /// The principal the entry grants permissions to.
        principal: String,
        /// The raw value as written.
        value: String,
        /// The first character that isn't a known flag.
        flag: char,
    },
    /// A location template names another account's home directory, which can't be resolved.
    #[error("invalid location {value:?} in [{section}]: only '~' and '~/' refer to a home directory")]
    InvalidLocation {
        /// The section holding the entry.
        section: String,
        /// The template as written.
        value: String,
    },
    /// A repository name is empty, escapes its location or collides with section syntax.
    #[error("invalid repository name {name:?}: {reason}")]
    InvalidRepositoryName {
        /// The offending name, after leading-separator stripping.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl Error {
    /// Fast classification helper returning a stable error kind.
    pub fn kind(&self) -> Kind {
        match self {
            Error::Read { .. } => Kind::Io,
            Error::Parse(_) => Kind::Syntax,
            Error::InvalidPermission { .. } | Error::InvalidLocation { .. } => Kind::Validation,
            Error::InvalidRepositoryName { .. } => Kind::RepositoryName,
        }
    }
}
