//! Chat command parsing.

use crate::error::CommandError;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Leave,
    Set { key: String, value: String },
    Status,
    Help,
}

impl Command {
    /// Parse `text` if it begins with `prefix`.
    ///
    /// Returns `None` for ordinary chat so callers can ignore it, and
    /// `Some(Err(..))` for prefixed text that is not a valid command.
    /// Everything after the key of `set` is the value, so search queries
    /// with spaces work unquoted.
    pub fn parse(prefix: &str, text: &str) -> Option<Result<Self, CommandError>> {
        let body = text.trim().strip_prefix(prefix)?;
        let mut parts = body.trim_start().splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return None;
        }
        let rest = parts.next().unwrap_or_default().trim();

        Some(match name.to_lowercase().as_str() {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "leave" => Ok(Command::Leave),
            "status" => Ok(Command::Status),
            "help" => Ok(Command::Help),
            "set" => parse_set(rest),
            other => Err(CommandError::Unknown(other.to_string())),
        })
    }
}

fn parse_set(args: &str) -> Result<Command, CommandError> {
    let missing = CommandError::MissingArgument {
        command: "set",
        expected: "<key> <value>",
    };
    let mut parts = args.splitn(2, char::is_whitespace);
    let key = parts.next().filter(|k| !k.is_empty()).ok_or(missing.clone())?;
    let value = parts
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(missing)?;
    Ok(Command::Set {
        key: key.to_string(),
        value: value.to_string(),
    })
}
