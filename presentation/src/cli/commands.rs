//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which messaging gateway carries outbound messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GatewayKind {
    /// Print everything to the terminal (local dry runs)
    Console,
    /// Discord REST API
    Discord,
}

/// CLI arguments for panicbot
#[derive(Parser, Debug)]
#[command(name = "panicbot")]
#[command(author, version, about = "Discord moderation bot with quorum-based panic votes")]
#[command(long_about = r#"
panicbot lets trusted members raise a panic alert or start a panic ban vote.
Eligible voters are prompted by DM; the action runs once enough of them agree
before the vote timer runs out.

Configuration files are loaded from (in priority order):
1. --config <path> / $CONFIG              Explicit config file
2. ./config.yml, ./config.yaml, ./config.toml   Project-level config
3. ~/.config/panicbot/config.yml           Global config

PANICBOT_DISCORD_BOT_TOKEN overrides discordBotToken.

Example:
  panicbot --config config.yml --gateway discord
  panicbot --gateway console -vv
"#)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, env = "CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOGLEVEL", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Verbosity level (-v = debug, -vv = trace); overrides --log-level
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Messaging gateway
    #[arg(long, value_enum, default_value = "console")]
    pub gateway: GatewayKind,

    /// Write vote audit events to this JSONL file
    #[arg(long, env = "PANICBOT_AUDIT_LOG", value_name = "PATH")]
    pub audit_log: Option<PathBuf>,

    /// Also write logs to daily-rotated files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Member the operator console acts as at startup
    #[arg(long = "as", value_name = "MEMBER", default_value = "operator")]
    pub operator: String,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and the resolved config, then exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// The effective log directive: `-v` wins over `--log-level`/`LOGLEVEL`.
    pub fn log_directive(&self) -> Option<&str> {
        match self.verbose {
            0 => self.log_level.as_deref(),
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["panicbot"]).unwrap();
        assert_eq!(cli.gateway, GatewayKind::Console);
        assert_eq!(cli.operator, "operator");
        assert!(!cli.show_config);
    }

    #[test]
    fn test_verbose_overrides_log_level() {
        let cli = Cli::try_parse_from(["panicbot", "--log-level", "warn"]).unwrap();
        assert_eq!(cli.log_directive(), Some("warn"));

        let cli = Cli::try_parse_from(["panicbot", "--log-level", "warn", "-vv"]).unwrap();
        assert_eq!(cli.log_directive(), Some("trace"));
    }

    #[test]
    fn test_gateway_selection() {
        let cli = Cli::try_parse_from(["panicbot", "--gateway", "discord", "--as", "mod0"])
            .unwrap();
        assert_eq!(cli.gateway, GatewayKind::Discord);
        assert_eq!(cli.operator, "mod0");
    }
}
