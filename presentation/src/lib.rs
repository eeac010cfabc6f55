//! Presentation layer for panicbot
//!
//! This crate contains the CLI definition and the operator console: a
//! terminal messaging gateway plus a line-based event source that drives
//! the vote engine without a live Discord connection.

pub mod cli;
pub mod console;

// Re-export commonly used types
pub use cli::commands::{Cli, GatewayKind};
pub use console::{
    ConsoleCommand, ConsoleMessagingGateway, OperatorConsole, ParseError, parse_console_command,
};
