//! Integration tests for cogwheel-config crate.

use cogwheel_config::{Config, ConfigCache, ConfigError, ConfigLoader};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_partial_file_keeps_defaults() {
    let file = write_config(
        r#"
discord:
  token: "file_token"
sessions:
  memory_timeout_seconds: 45
"#,
    );

    let config = ConfigLoader::load_config(file.path()).unwrap();
    assert_eq!(config.sessions.memory_timeout_seconds, 45);
    assert_eq!(config.sessions.help_timeout_seconds, 30);
    assert_eq!(config.sessions.anilist_entries_per_page, 6);
    assert_eq!(config.anilist.api_url, "https://graphql.anilist.co");
}

#[test]
fn test_invalid_file_is_rejected() {
    let file = write_config(
        r#"
discord:
  token: "file_token"
sessions:
  help_categories_per_page: 0
"#,
    );

    let err = ConfigLoader::load_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn test_malformed_yaml() {
    let file = write_config("discord: [unclosed");
    let err = ConfigLoader::load_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_missing_file() {
    let err = ConfigLoader::load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::IoError(_)));
}

#[test]
fn test_config_cache() {
    let mut config = Config::default();
    config.discord.token = "t".to_string();
    let cache = ConfigCache::new(config.clone());

    assert_eq!(cache.get().discord.token, "t");

    config.sessions.trivia_timeout_seconds = 60;
    cache.update(config);
    assert_eq!(cache.get().sessions.trivia_window().as_secs(), 60);
}
