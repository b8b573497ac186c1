//! Environment-based configuration
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Reminder file path, history depth and channel renaming toggle
//! - 1.0.0: Initial release

use anyhow::{anyhow, Context as _, Result};
use std::path::PathBuf;

pub const DEFAULT_REMINDS_FILE: &str = "./reminds.json";
pub const DEFAULT_MESSAGES_TO_FETCH: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Development guild; also the guild scanned for word counts and renamed channels
    pub discord_guild_id: Option<u64>,
    pub reminds_file_path: PathBuf,
    pub log_level: String,
    pub messages_to_fetch: u64,
    pub channel_names_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let discord_token =
            get("DISCORD_TOKEN").ok_or_else(|| anyhow!("DISCORD_TOKEN must be set"))?;

        let discord_guild_id = get("DISCORD_GUILD_ID")
            .map(|id| id.parse::<u64>())
            .transpose()
            .context("DISCORD_GUILD_ID must be a numeric guild id")?;

        let reminds_file_path = get("REMINDS_FILE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REMINDS_FILE));

        let messages_to_fetch = get("MESSAGES_TO_FETCH")
            .map(|n| n.parse::<u64>())
            .transpose()
            .context("MESSAGES_TO_FETCH must be a non-negative number")?
            .unwrap_or(DEFAULT_MESSAGES_TO_FETCH);

        let channel_names_enabled = get("CHANNEL_NAMES_ENABLED")
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
            .unwrap_or(true);

        Ok(Config {
            discord_token,
            discord_guild_id,
            reminds_file_path,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            messages_to_fetch,
            channel_names_enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DISCORD_TOKEN", "  abc  ")]).unwrap();
        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.discord_guild_id, None);
        assert_eq!(config.reminds_file_path, PathBuf::from(DEFAULT_REMINDS_FILE));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.messages_to_fetch, DEFAULT_MESSAGES_TO_FETCH);
        assert!(config.channel_names_enabled);
    }

    #[test]
    fn test_missing_or_blank_token_fails() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("DISCORD_TOKEN", "   ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_GUILD_ID", "1234"),
            ("REMINDS_FILE_PATH", "/data/reminds.json"),
            ("LOG_LEVEL", "debug"),
            ("MESSAGES_TO_FETCH", "250"),
            ("CHANNEL_NAMES_ENABLED", "false"),
        ])
        .unwrap();
        assert_eq!(config.discord_guild_id, Some(1234));
        assert_eq!(config.reminds_file_path, PathBuf::from("/data/reminds.json"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.messages_to_fetch, 250);
        assert!(!config.channel_names_enabled);
    }

    #[test]
    fn test_bad_guild_id_fails() {
        assert!(config_from(&[("DISCORD_TOKEN", "abc"), ("DISCORD_GUILD_ID", "general")]).is_err());
    }
}
