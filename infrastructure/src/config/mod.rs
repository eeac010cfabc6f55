//! Configuration file loading for panicbot
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `PANICBOT_DISCORD_BOT_TOKEN` environment variable (bot token only)
//! 2. `--config <path>` / `CONFIG` specified file
//! 3. Project root: `./config.yml`, `./config.yaml` or `./config.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/panicbot/config.yml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAlertingMethods, FileConfig, FileContactOnVote, FileDuration, FileEmailConfig,
    FileGracePeriodConfig, FileIdList, FilePerKind, FileTwilioConfig, FileVoteTimers,
    FileVotingConfig,
};
pub use loader::{ConfigLoader, TOKEN_ENV};
