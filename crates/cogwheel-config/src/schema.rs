//! Configuration schema definitions using serde.

use cogwheel_common::{CogwheelError, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Discord caps embeds at 25 fields, which bounds every page size.
pub const MAX_PAGE_SIZE: usize = 25;

/// Main configuration structure for Cogwheel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Discord configuration.
    pub discord: DiscordConfig,
    /// AniList integration configuration.
    pub anilist: AniListConfig,
    /// Trivia question source configuration.
    pub trivia: TriviaConfig,
    /// Interactive session timing configuration.
    pub sessions: SessionsConfig,
    /// Persistent storage configuration.
    pub storage: StorageConfig,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token.
    pub token: String,
    /// Prefix for text commands.
    pub prefix: String,
    /// Register commands in this guild only (fast updates while developing).
    pub guild_id: Option<u64>,
}

/// AniList API and OAuth configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AniListConfig {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// OAuth redirect URI (the pin page shows the code to the user).
    pub redirect_uri: String,
    /// OAuth authorize endpoint.
    pub authorize_url: String,
    /// OAuth token endpoint.
    pub token_url: String,
    /// GraphQL endpoint.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Connection pool max idle connections per host.
    pub max_idle_per_host: usize,
    /// Requests per second allowed towards AniList.
    pub rate_limit_per_sec: u32,
    /// Retry attempts for transport failures and 5xx responses.
    pub max_retries: usize,
}

/// Trivia question source configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TriviaConfig {
    /// Open Trivia DB endpoint.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

/// Interactive session timing and paging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionsConfig {
    /// Help pager inactivity window in seconds.
    pub help_timeout_seconds: u64,
    /// Trivia inactivity window in seconds.
    pub trivia_timeout_seconds: u64,
    /// Memory game inactivity window in seconds.
    pub memory_timeout_seconds: u64,
    /// AniList browser inactivity window in seconds.
    pub anilist_timeout_seconds: u64,
    /// How long the memory board is shown face up before play starts.
    pub memory_preview_seconds: u64,
    /// How long a mismatched pair stays visible, in milliseconds.
    pub memory_mismatch_delay_ms: u64,
    /// Categories per help page when browsing all commands.
    pub help_categories_per_page: usize,
    /// AniList list entries per page.
    pub anilist_entries_per_page: usize,
}

/// Persistent storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the embedded database.
    pub path: String,
}

/// Logging configuration as it appears in the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `cogwheel_session=debug`.
    pub level: String,
    /// Emit JSON lines.
    pub json: bool,
    /// Optional log file (rotated daily).
    pub file: Option<String>,
}

impl From<&LoggingSettings> for LoggingConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level.clone(),
            json_format: settings.json,
            file_path: settings.file.clone(),
            ..Self::default()
        }
    }
}

impl SessionsConfig {
    /// Help pager inactivity window.
    pub const fn help_window(&self) -> Duration {
        Duration::from_secs(self.help_timeout_seconds)
    }

    /// Trivia inactivity window.
    pub const fn trivia_window(&self) -> Duration {
        Duration::from_secs(self.trivia_timeout_seconds)
    }

    /// Memory game inactivity window.
    pub const fn memory_window(&self) -> Duration {
        Duration::from_secs(self.memory_timeout_seconds)
    }

    /// AniList browser inactivity window.
    pub const fn anilist_window(&self) -> Duration {
        Duration::from_secs(self.anilist_timeout_seconds)
    }

    /// Memory board preview duration.
    pub const fn memory_preview(&self) -> Duration {
        Duration::from_secs(self.memory_preview_seconds)
    }

    /// Delay before a mismatched pair is turned face down again.
    pub const fn memory_mismatch_delay(&self) -> Duration {
        Duration::from_millis(self.memory_mismatch_delay_ms)
    }
}

impl AniListConfig {
    /// Whether OAuth credentials are present, i.e. users can connect accounts.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Link the user follows to obtain an authorization code.
    pub fn authorization_link(&self) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}",
            self.authorize_url, self.client_id, self.redirect_uri
        )
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), CogwheelError> {
        if self.discord.token.trim().is_empty() {
            return Err(CogwheelError::validation_field(
                "Discord token cannot be empty",
                "discord.token",
            ));
        }

        if self.discord.prefix.is_empty() || self.discord.prefix.chars().count() > 10 {
            return Err(CogwheelError::validation_field(
                "Command prefix must be between 1 and 10 characters",
                "discord.prefix",
            ));
        }

        for (field, value) in [
            ("anilist.api_url", &self.anilist.api_url),
            ("anilist.token_url", &self.anilist.token_url),
            ("anilist.authorize_url", &self.anilist.authorize_url),
            ("anilist.redirect_uri", &self.anilist.redirect_uri),
            ("trivia.api_url", &self.trivia.api_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                CogwheelError::validation_field(format!("Invalid URL '{value}': {e}"), field)
            })?;
        }

        for (field, value) in [
            ("anilist.timeout_seconds", self.anilist.timeout_seconds),
            ("trivia.timeout_seconds", self.trivia.timeout_seconds),
            ("sessions.help_timeout_seconds", self.sessions.help_timeout_seconds),
            ("sessions.trivia_timeout_seconds", self.sessions.trivia_timeout_seconds),
            ("sessions.memory_timeout_seconds", self.sessions.memory_timeout_seconds),
            ("sessions.anilist_timeout_seconds", self.sessions.anilist_timeout_seconds),
        ] {
            if value == 0 {
                return Err(CogwheelError::validation_field(
                    format!("{field} must be greater than 0"),
                    field,
                ));
            }
        }

        if self.anilist.rate_limit_per_sec == 0 {
            return Err(CogwheelError::validation_field(
                "AniList rate limit must be greater than 0",
                "anilist.rate_limit_per_sec",
            ));
        }

        for (field, value) in [
            ("sessions.help_categories_per_page", self.sessions.help_categories_per_page),
            ("sessions.anilist_entries_per_page", self.sessions.anilist_entries_per_page),
        ] {
            if !(1..=MAX_PAGE_SIZE).contains(&value) {
                return Err(CogwheelError::validation_field(
                    format!("{field} must be between 1 and {MAX_PAGE_SIZE}"),
                    field,
                ));
            }
        }

        if self.storage.path.trim().is_empty() {
            return Err(CogwheelError::validation_field(
                "Storage path cannot be empty",
                "storage.path",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.discord.token = "token".to_string();
        config
    }

    #[test]
    fn test_default_config_needs_token() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("Discord token"));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let mut config = valid();
        config.sessions.memory_timeout_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sessions.memory_timeout_seconds"));
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = valid();
        config.sessions.anilist_entries_per_page = 26;
        assert!(config.validate().is_err());
        config.sessions.anilist_entries_per_page = 25;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_url_is_rejected() {
        let mut config = valid();
        config.trivia.api_url = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_authorization_link() {
        let mut config = AniListConfig::default();
        config.client_id = "21007".to_string();
        assert_eq!(
            config.authorization_link(),
            "https://anilist.co/api/v2/oauth/authorize?client_id=21007&response_type=code&redirect_uri=https://anilist.co/api/v2/oauth/pin"
        );
        assert!(!config.is_configured());
    }
}
