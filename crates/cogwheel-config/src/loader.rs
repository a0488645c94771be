//! Configuration loading utilities

use crate::Config;
use cogwheel_common::CogwheelError;
use std::env;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[source] CogwheelError),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name
        var: String,
        /// Parse failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for CogwheelError {
    fn from(err: ConfigError) -> Self {
        Self::config_with_source("failed to load configuration", err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate().map_err(ConfigError::ValidationError)?;

        info!(path = %path.as_ref().display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration from `COGWHEEL_CONFIG_PATH`, `config.yaml` or
    /// `config.yml`, falling back to defaults plus environment overrides.
    pub fn load() -> Result<Config, ConfigError> {
        if let Ok(config_path) = env::var("COGWHEEL_CONFIG_PATH") {
            return Self::load_config(config_path);
        }
        for candidate in ["config.yaml", "config.yml"] {
            if Path::new(candidate).exists() {
                return Self::load_config(candidate);
            }
        }

        debug!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate().map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> cogwheel_common::Result<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Parse YAML without applying overrides or validation.
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides(config, |key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            config.discord.token = token;
        }
        if let Some(prefix) = lookup("DISCORD_PREFIX") {
            config.discord.prefix = prefix;
        }
        if let Some(guild_id) = lookup("DISCORD_GUILD_ID") {
            config.discord.guild_id = Some(parse_var("DISCORD_GUILD_ID", &guild_id)?);
        }

        if let Some(client_id) = lookup("ANILIST_CLIENT_ID") {
            config.anilist.client_id = client_id;
        }
        if let Some(secret) = lookup("ANILIST_CLIENT_SECRET") {
            config.anilist.client_secret = secret;
        }

        if let Some(path) = lookup("COGWHEEL_DB_PATH") {
            config.storage.path = path;
        }
        if let Some(level) = lookup("COGWHEEL_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DISCORD_GUILD_ID", "42"),
            ("COGWHEEL_LOG_LEVEL", "debug"),
        ]);
        ConfigLoader::apply_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.discord.token, "abc");
        assert_eq!(config.discord.guild_id, Some(42));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_bad_guild_id_override() {
        let mut config = Config::default();
        let err = ConfigLoader::apply_overrides(&mut config, lookup_from(&[("DISCORD_GUILD_ID", "x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { ref var, .. } if var == "DISCORD_GUILD_ID"));
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(ConfigLoader::parse("").unwrap(), Config::default());
    }
}
