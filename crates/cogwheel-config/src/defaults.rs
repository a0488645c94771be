//! Default values for every configuration section.

use crate::schema::*;

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            prefix: ".".to_string(),
            guild_id: None,
        }
    }
}

impl Default for AniListConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "https://anilist.co/api/v2/oauth/pin".to_string(),
            authorize_url: "https://anilist.co/api/v2/oauth/authorize".to_string(),
            token_url: "https://anilist.co/api/v2/oauth/token".to_string(),
            api_url: "https://graphql.anilist.co".to_string(),
            timeout_seconds: 30,
            max_idle_per_host: 10,
            rate_limit_per_sec: 2,
            max_retries: 3,
        }
    }
}

impl Default for TriviaConfig {
    fn default() -> Self {
        Self {
            api_url: "https://opentdb.com/api.php".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            help_timeout_seconds: 30,
            trivia_timeout_seconds: 30,
            memory_timeout_seconds: 20,
            anilist_timeout_seconds: 30,
            memory_preview_seconds: 7,
            memory_mismatch_delay_ms: 1000,
            help_categories_per_page: 4,
            anilist_entries_per_page: 6,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "data/cogwheel.db".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}
