//! Command names and their argument contracts.

use std::fmt;
use std::str::FromStr;

use crate::error::{CommandError, Result};

/// A recognized host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Create,
    Initialize,
    Update,
    SetRegion,
    Remove,
}

/// Arity and output contract of a command.
///
/// Argument counts exclude the command name itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub min_args: usize,
    pub max_args: usize,
    /// Output slots the host must provide, status included.
    pub outputs: usize,
    /// Position of the optional session-index argument.
    pub session_arg: Option<usize>,
    verb: &'static str,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Create,
        Command::Initialize,
        Command::Update,
        Command::SetRegion,
        Command::Remove,
    ];

    /// Look up a command by its host name.
    pub fn parse(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.name() == name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))
    }

    /// Name the host uses for this command.
    pub fn name(self) -> &'static str {
        match self {
            Command::Create => "create",
            Command::Initialize => "initialize",
            Command::Update => "update",
            Command::SetRegion => "set_region",
            Command::Remove => "remove",
        }
    }

    /// Argument contract of this command.
    pub fn spec(self) -> CommandSpec {
        let (min_args, max_args, outputs, session_arg, verb) = match self {
            // [config-root-path?]
            Command::Create => (0, 1, 1, None, "create"),
            // image, region?, session-index?
            Command::Initialize => (1, 3, 2, Some(2), "initialize"),
            // image, session-index?
            Command::Update => (1, 2, 2, Some(1), "update"),
            // region, session-index?
            Command::SetRegion => (1, 2, 2, Some(1), "reset"),
            // session-index?
            Command::Remove => (0, 1, 1, Some(0), "remove"),
        };
        CommandSpec {
            min_args,
            max_args,
            outputs,
            session_arg,
            verb,
        }
    }
}

impl CommandSpec {
    /// Check argument and output counts; a host `nargout` of 0 still provides the status slot.
    pub fn check(&self, nargs: usize, nargout: usize) -> Result<()> {
        if nargs < self.min_args {
            return Err(CommandError::argument(format!(
                "at least {} input argument(s) are needed to {} tracker, got {nargs}",
                self.min_args, self.verb
            )));
        }
        if nargs > self.max_args {
            return Err(CommandError::argument(format!(
                "at most {} input argument(s) are accepted to {} tracker, got {nargs}",
                self.max_args, self.verb
            )));
        }
        let nargout = nargout.max(1);
        if nargout != self.outputs {
            return Err(CommandError::argument(format!(
                "{} output argument(s) are needed to {} tracker, got {nargout}",
                self.outputs, self.verb
            )));
        }
        Ok(())
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for cmd in Command::ALL {
            assert_eq!(cmd.name().parse::<Command>().unwrap(), cmd);
        }
    }

    #[test]
    fn test_unknown_command_named() {
        let err = Command::parse("bogus").unwrap_err();
        assert!(matches!(&err, CommandError::UnknownCommand(name) if name == "bogus"));
        assert_eq!(err.to_string(), "invalid command provided: bogus");
    }

    #[test]
    fn test_arity_checks() {
        let update = Command::Update.spec();
        assert!(update.check(1, 2).is_ok());
        assert!(update.check(2, 2).is_ok());
        assert!(matches!(update.check(0, 2), Err(CommandError::Argument(_))));
        assert!(matches!(update.check(3, 2), Err(CommandError::Argument(_))));
        assert!(matches!(update.check(1, 1), Err(CommandError::Argument(_))));

        let create = Command::Create.spec();
        assert!(create.check(0, 0).is_ok());
        assert!(create.check(1, 1).is_ok());
        assert!(create.check(0, 2).is_err());
    }
}
