//! Operator console command parsing

use panicbot_domain::{MemberId, RoleId};
use thiserror::Error;

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Switch the member the console acts as
    As(MemberId),
    PanicAlert {
        message: String,
    },
    PanicBan {
        target: MemberId,
        reason: String,
        days: Option<i64>,
    },
    /// Press the vote button; `None` uses the latest prompt the acting member received
    Vote {
        token: Option<String>,
    },
    /// Show (no changes) or edit a member's roles
    Roles {
        member: MemberId,
        added: Vec<RoleId>,
        removed: Vec<RoleId>,
    },
    Members,
    Votes,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Commands start with '/'. Type /help for available commands")]
    NotACommand,

    #[error("Unknown command: {0}. Type /help for available commands")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

const USAGE_AS: &str = "/as <member>";
const USAGE_ALERT: &str = "/panicalert <message>";
const USAGE_BAN: &str = "/panicban <member> <reason> [days]";
const USAGE_ROLES: &str = "/roles <member> [+role] [-role] ...";

pub const HELP: &str = "\
Commands:
  /as <member>                        - Act as another member
  /panicalert <message>               - Raise a panic alert
  /panicban <member> <reason> [days]  - Start a panic ban vote (days: 0-7 of messages to purge)
  /vote [token]                       - Cast a vote (defaults to your latest prompt)
  /roles <member> [+role] [-role]     - Show or change a member's roles
  /members                            - List known members
  /votes                              - List outstanding votes
  /help, /h, /?                       - Show this help
  /quit, /exit, /q                    - Exit";

/// Parse one console line.
///
/// For `/panicban`, a trailing integer after at least one reason word is
/// taken as the purge days.
pub fn parse_console_command(line: &str) -> Result<ConsoleCommand, ParseError> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Err(ParseError::NotACommand);
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    let words: Vec<&str> = args.split_whitespace().collect();

    match name {
        "as" => match words.as_slice() {
            [member] => Ok(ConsoleCommand::As(MemberId::from(*member))),
            _ => Err(ParseError::Usage(USAGE_AS)),
        },
        "panicalert" => {
            if args.is_empty() {
                return Err(ParseError::Usage(USAGE_ALERT));
            }
            Ok(ConsoleCommand::PanicAlert {
                message: args.to_string(),
            })
        }
        "panicban" => parse_ban(&words),
        "vote" => match words.as_slice() {
            [] => Ok(ConsoleCommand::Vote { token: None }),
            [token] => Ok(ConsoleCommand::Vote {
                token: Some(token.to_string()),
            }),
            _ => Err(ParseError::Usage("/vote [token]")),
        },
        "roles" => parse_roles(&words),
        "members" => Ok(ConsoleCommand::Members),
        "votes" => Ok(ConsoleCommand::Votes),
        "help" | "h" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
        _ => Err(ParseError::Unknown(format!("/{}", name))),
    }
}

fn parse_ban(words: &[&str]) -> Result<ConsoleCommand, ParseError> {
    let [target, reason @ ..] = words else {
        return Err(ParseError::Usage(USAGE_BAN));
    };

    let (reason, days) = match reason {
        [head @ .., last] if !head.is_empty() => match last.parse::<i64>() {
            Ok(days) => (head, Some(days)),
            Err(_) => (reason, None),
        },
        _ => (reason, None),
    };
    if reason.is_empty() {
        return Err(ParseError::Usage(USAGE_BAN));
    }

    Ok(ConsoleCommand::PanicBan {
        target: MemberId::from(*target),
        reason: reason.join(" "),
        days,
    })
}

fn parse_roles(words: &[&str]) -> Result<ConsoleCommand, ParseError> {
    let [member, changes @ ..] = words else {
        return Err(ParseError::Usage(USAGE_ROLES));
    };

    let mut added = Vec::new();
    let mut removed = Vec::new();
    for change in changes {
        if let Some(role) = change.strip_prefix('+').filter(|r| !r.is_empty()) {
            added.push(RoleId::from(role));
        } else if let Some(role) = change.strip_prefix('-').filter(|r| !r.is_empty()) {
            removed.push(RoleId::from(role));
        } else {
            return Err(ParseError::Usage(USAGE_ROLES));
        }
    }

    Ok(ConsoleCommand::Roles {
        member: MemberId::from(*member),
        added,
        removed,
    })
}
