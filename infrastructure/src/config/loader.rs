//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml, Yaml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order.
const PROJECT_FILES: &[&str] = &["config.yml", "config.yaml", "config.toml"];

/// Environment variable that overrides `discordBotToken`.
pub const TOKEN_ENV: &str = "PANICBOT_DISCORD_BOT_TOKEN";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `PANICBOT_DISCORD_BOT_TOKEN` (token only)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./config.yml`, `./config.yaml` or `./config.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/panicbot/config.yml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = Self::merge_file(figment, &global_path);
        }

        if let Some(path) = Self::project_config_path() {
            figment = Self::merge_file(figment, &path);
        }

        if let Some(path) = config_path {
            figment = Self::merge_file(figment, path);
        }

        // Env keys are not camelCase, so the token is merged under its file key
        if let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.trim().is_empty()
        {
            figment = figment.merge(Serialized::default("discordBotToken", token));
        }

        figment.extract().map_err(Box::new)
    }

    /// Load a single file, ignoring every other source.
    pub fn load_file(path: &Path) -> Result<FileConfig, Box<figment::Error>> {
        let figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        Self::merge_file(figment, path).extract().map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn merge_file(figment: Figment, path: &Path) -> Figment {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => figment.merge(Toml::file(path)),
            _ => figment.merge(Yaml::file(path)),
        }
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/panicbot/config.yml if set,
    /// otherwise falls back to ~/.config/panicbot/config.yml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("panicbot").join("config.yml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        if std::env::var_os(TOKEN_ENV).is_some() {
            println!("  [FOUND] Env:     {}", TOKEN_ENV);
        } else {
            println!("  [     ] Env:     {}", TOKEN_ENV);
        }

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./{}", PROJECT_FILES.join(" or ./"));
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.discord_bot_token.is_empty());
        assert_eq!(config.voting.required_votes.panic_ban, 0);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("panicbot"));
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(
            file,
            "guildID: \"99\"\nvoting:\n  requiredVotes:\n    panicBan: 3\n"
        )
        .unwrap();

        let config = ConfigLoader::load_file(file.path()).unwrap();
        assert_eq!(config.guild_id, "99");
        assert_eq!(config.voting.required_votes.panic_ban, 3);
        // Untouched sections keep their defaults
        assert_eq!(config.voting.required_votes.panic_alert, 0);
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "guildID = \"7\"\n\n[voting.voteTimers]\npanicBanVoteTimer = \"2m\"\n"
        )
        .unwrap();

        let config = ConfigLoader::load_file(file.path()).unwrap();
        assert_eq!(config.guild_id, "7");
        assert_eq!(
            config.to_voting_policy().vote_timers.panic_ban,
            std::time::Duration::from_secs(120)
        );
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "voting:\n  requiredVotes:\n    panicBan: lots\n").unwrap();
        assert!(ConfigLoader::load_file(file.path()).is_err());
    }
}
