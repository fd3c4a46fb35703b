//! Classification of the command line sent by the client.

use crate::Rejection;

/// The program name every accepted command starts with.
pub const HG: &str = "hg";

/// The value used when the remote command is unavailable. It never matches a known command.
pub const UNKNOWN_COMMAND: &str = "?";

/// A recognized remote command, with the repository argument as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    /// `hg -R <repository> serve --stdio`, a pull or push session.
    Serve {
        /// The raw repository argument.
        repository: String,
    },
    /// `hg init <repository>`, creation of a new repository.
    Init {
        /// The raw repository argument.
        repository: String,
    },
}

impl RemoteCommand {
    /// Tokenize `command` with shell quoting rules and match it against the accepted shapes.
    pub fn parse(command: &str) -> Result<Self, Rejection> {
        let words = shell_words::split(command).map_err(|err| Rejection::Malformed {
            command: command.to_owned(),
            reason: err.to_string(),
        })?;
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        match words.as_slice() {
            [HG, "-R", repository, "serve", "--stdio"] => Ok(RemoteCommand::Serve {
                repository: (*repository).to_owned(),
            }),
            [HG, "init", repository] => Ok(RemoteCommand::Init {
                repository: (*repository).to_owned(),
            }),
            _ => Err(Rejection::IllegalCommand {
                command: command.to_owned(),
            }),
        }
    }

    /// The raw repository argument.
    pub fn repository(&self) -> &str {
        match self {
            RemoteCommand::Serve { repository } | RemoteCommand::Init { repository } => repository,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;

    #[test]
    fn serve_and_init_are_recognized() {
        assert_eq!(
            RemoteCommand::parse("hg -R /proj serve --stdio").unwrap(),
            RemoteCommand::Serve {
                repository: "/proj".into()
            }
        );
        assert_eq!(
            RemoteCommand::parse("hg init newrepo").unwrap(),
            RemoteCommand::Init {
                repository: "newrepo".into()
            }
        );
    }

    #[test]
    fn quoting_is_honored() {
        assert_eq!(
            RemoteCommand::parse("hg -R 'my repo' serve --stdio").unwrap().repository(),
            "my repo"
        );
        assert_eq!(
            RemoteCommand::parse(r#"hg init "a\"b""#).unwrap().repository(),
            "a\"b"
        );
    }

    #[test]
    fn unbalanced_quotes_are_malformed() {
        let rejection = RemoteCommand::parse("hg -R 'proj serve --stdio").unwrap_err();
        assert_eq!(rejection.kind(), Kind::Malformed);
        assert!(rejection.to_string().starts_with("Illegal command \"hg -R 'proj serve --stdio\": "));
    }

    #[test]
    fn everything_else_is_illegal() {
        for command in [
            UNKNOWN_COMMAND,
            "",
            "hg -R proj serve",
            "hg -R proj serve --stdio --debugger",
            "hg serve --stdio -R proj",
            "hg init",
            "hg init a b",
            "git-upload-pack proj",
            "sh -c 'hg -R proj serve --stdio'",
        ] {
            let rejection = RemoteCommand::parse(command).unwrap_err();
            assert_eq!(rejection.kind(), Kind::IllegalCommand, "{command:?}");
        }
    }
}
