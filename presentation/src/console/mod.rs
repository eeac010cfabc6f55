//! Operator console: terminal gateway and line-based event source

mod command;
mod gateway;
mod operator;

pub use command::{ConsoleCommand, HELP, ParseError, parse_console_command};
pub use gateway::ConsoleMessagingGateway;
pub use operator::{OperatorConsole, Step};
