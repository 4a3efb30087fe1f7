//! Command-line parsing.

use super::error::CommandError;

/// A parsed command. Arguments are kept raw; validation happens when the
/// command is run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Admins,
    Invite { target: Option<String> },
    Delete { target: Option<String> },
    Cleanup { months: Option<String> },
}

impl Command {
    /// Parse the text that follows the bot mention.
    ///
    /// Unknown or missing sub-commands parse as [`Command::Help`].
    ///
    /// # Errors
    ///
    /// Returns `CommandError::TooManyArguments` if a sub-command is followed
    /// by more than one argument.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let mut tokens = text.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(Self::Help);
        };
        let argument = tokens.next().map(str::to_string);
        if tokens.next().is_some() {
            return Err(CommandError::TooManyArguments);
        }

        let command = match name {
            "invite" => Self::Invite { target: argument },
            "delete" => Self::Delete { target: argument },
            "cleanup" => Self::Cleanup { months: argument },
            "admins" => Self::Admins,
            _ => Self::Help,
        };
        Ok(command)
    }
}
