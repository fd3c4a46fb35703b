//! Rejections and errors of the gateway.

use std::path::PathBuf;

/// The exit status shared by every refused or failed invocation.
pub const REJECTION_EXIT_CODE: u8 = 255;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable classification of [`Rejection`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// The command line could not be split into words.
    Malformed,
    /// The words don't form a recognized command.
    IllegalCommand,
    /// The repository argument isn't a usable name.
    InvalidName,
    /// No location is configured for the repository.
    UnknownRepository,
    /// No permission entry matches the user.
    NoPermissionRecord,
    /// A permission entry matches, but holds neither `r` nor `w`.
    AccessDenied,
    /// The user may not create repositories.
    CreationForbidden,
}

/// A refused remote command. The `Display` form is the one-line diagnostic shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The command line couldn't be tokenized.
    #[error("Illegal command \"{command}\": {reason}")]
    Malformed {
        /// The raw command line.
        command: String,
        /// The tokenizer's complaint.
        reason: String,
    },
    /// The command is neither `hg -R <repo> serve --stdio` nor `hg init <repo>`.
    #[error("Illegal command \"{command}\"")]
    IllegalCommand {
        /// The raw command line.
        command: String,
    },
    /// The repository argument was refused.
    #[error("Illegal repository name \"{name}\": {reason}")]
    InvalidName {
        /// The repository argument as sent.
        name: String,
        /// Why it was refused.
        reason: &'static str,
    },
    /// No tier supplied a location.
    #[error("No repository found for \"{name}\"")]
    UnknownRepository {
        /// The logical repository name.
        name: String,
    },
    /// No tier had an entry for the user.
    #[error("Illegal repository \"{name}\"")]
    NoPermissionRecord {
        /// The logical repository name.
        name: String,
    },
    /// The user's entry grants neither read nor write.
    #[error("Access denied to \"{name}\"")]
    AccessDenied {
        /// The logical repository name.
        name: String,
    },
    /// `hg init` by a user outside the allow list.
    #[error("User does not have permission to create repositories.")]
    CreationForbidden {
        /// The claimed user.
        user: String,
    },
}

impl Rejection {
    /// Fast classification helper returning a stable rejection kind.
    pub fn kind(&self) -> Kind {
        match self {
            Rejection::Malformed { .. } => Kind::Malformed,
            Rejection::IllegalCommand { .. } => Kind::IllegalCommand,
            Rejection::InvalidName { .. } => Kind::InvalidName,
            Rejection::UnknownRepository { .. } => Kind::UnknownRepository,
            Rejection::NoPermissionRecord { .. } => Kind::NoPermissionRecord,
            Rejection::AccessDenied { .. } => Kind::AccessDenied,
            Rejection::CreationForbidden { .. } => Kind::CreationForbidden,
        }
    }
}

/// Everything that ends an invocation before or instead of a Mercurial session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote command was refused.
    #[error(transparent)]
    Rejected(#[from] Rejection),
    /// The policy file couldn't be loaded.
    #[error(transparent)]
    Policy(#[from] hgssh_acl::Error),
    /// The current working directory is unavailable.
    #[error("could not determine the working directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    /// The Mercurial executable couldn't be started.
    #[error("could not run {}: {source}", .program.display())]
    Spawn {
        /// The executable that was attempted.
        program: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration carrying the reject hooks couldn't be prepared.
    #[error("could not prepare the reject hook configuration: {source}")]
    HookConfig {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Options were inconsistent.
    #[error("invalid configuration: {message}")]
    Config {
        /// What's wrong.
        message: String,
    },
}

impl Error {
    /// The rejection behind this error, if it is one.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Error::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// The process exit status to report. All errors share [`REJECTION_EXIT_CODE`].
    pub fn exit_code(&self) -> u8 {
        REJECTION_EXIT_CODE
    }
}
