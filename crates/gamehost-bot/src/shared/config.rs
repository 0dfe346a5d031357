use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::shared::error::{BotError, BotResult};

pub const CONFIG_PATH_ENV: &str = "GAMEHOST_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

fn default_command_channel_name() -> String {
    "server-commands".to_string()
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_watch_attempts() -> u32 {
    10
}

fn default_watch_interval_secs() -> u64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub discord_token: String,
    #[serde(default)]
    pub aws_region: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    #[serde(default = "default_command_channel_name")]
    pub command_channel_name: String,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Categories the bot answers in. Empty means every category.
    #[serde(default)]
    pub instance_names: Vec<String>,
    #[serde(default = "default_watch_attempts")]
    pub watch_attempts: u32,
    #[serde(default = "default_watch_interval_secs")]
    pub watch_interval_secs: u64,
}

impl BotConfig {
    /// Load from the file named by `GAMEHOST_CONFIG` (or `config.json`),
    /// then apply `DISCORD_TOKEN` / `AWS_REGION` overrides.
    pub fn load() -> BotResult<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> BotResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| BotError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> BotResult<Self> {
        serde_json::from_str(raw).map_err(|e| BotError::Config(format!("invalid config: {e}")))
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN").filter(|v| !v.trim().is_empty()) {
            self.discord_token = token;
        }
        if let Some(region) = lookup("AWS_REGION").filter(|v| !v.trim().is_empty()) {
            self.aws_region = region;
        }
    }

    pub fn validate(&self) -> BotResult<()> {
        if self.discord_token.trim().is_empty() {
            return Err(BotError::Config("discord_token is required".to_string()));
        }
        if self.aws_region.trim().is_empty() {
            return Err(BotError::Config("aws_region is required".to_string()));
        }
        if self.command_prefix.is_empty() {
            return Err(BotError::Config("command_prefix cannot be empty".to_string()));
        }
        if self.command_channel_name.is_empty() {
            return Err(BotError::Config(
                "command_channel_name cannot be empty".to_string(),
            ));
        }
        if self.watch_attempts == 0 {
            return Err(BotError::Config("watch_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Static keys are only used when both halves are present.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.aws_access_key_id, &self.aws_secret_access_key) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"{"discord_token": "token", "aws_region": "eu-west-2"}"#;

    #[test]
    fn test_defaults_applied() {
        let config = BotConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.command_channel_name, "server-commands");
        assert_eq!(config.command_prefix, "!");
        assert!(config.instance_names.is_empty());
        assert_eq!(config.watch_attempts, 10);
        assert_eq!(config.watch_interval(), Duration::from_secs(1));
        tokio_test::assert_ok!(config.validate());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "discord_token": "token",
                "aws_region": "us-east-1",
                "aws_access_key_id": "AKIDEXAMPLE",
                "aws_secret_access_key": "secret",
                "instance_names": ["Foo", "Bar"],
                "watch_attempts": 3
            }}"#
        )
        .unwrap();

        let config = BotConfig::from_file(file.path()).unwrap();
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(config.instance_names, vec!["Foo", "Bar"]);
        assert_eq!(config.watch_attempts, 3);
        assert_eq!(config.static_credentials(), Some(("AKIDEXAMPLE", "secret")));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = BotConfig::from_file("/nonexistent/gamehost/config.json");
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let result = BotConfig::from_json("{not json");
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = BotConfig::from_json("{}").unwrap();
        config.apply_env_overrides(|key| match key {
            "DISCORD_TOKEN" => Some("from-env".to_string()),
            "AWS_REGION" => Some("ap-south-1".to_string()),
            _ => None,
        });
        assert_eq!(config.discord_token, "from-env");
        assert_eq!(config.aws_region, "ap-south-1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_env_override_ignored() {
        let mut config = BotConfig::from_json(MINIMAL).unwrap();
        config.apply_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.discord_token, "token");
    }

    #[test]
    fn test_validate_rejects_missing_token() {
        let config = BotConfig::from_json(r#"{"aws_region": "eu-west-2"}"#).unwrap();
        assert!(matches!(config.validate(), Err(BotError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = BotConfig::from_json(MINIMAL).unwrap();
        config.watch_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_credentials_fall_back_to_default_chain() {
        let mut config = BotConfig::from_json(MINIMAL).unwrap();
        config.aws_access_key_id = Some("AKIDEXAMPLE".to_string());
        assert_eq!(config.static_credentials(), None);
    }
}
