//! Application-wide error types using thiserror.

use cogwheel_common::CogwheelError;
use poise::serenity_prelude as serenity;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] CogwheelError),

    /// Discord/Serenity error.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// Embedded database error.
    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Command context could not be built.
    #[error("Setup error: {0}")]
    Setup(String),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BotError::Setup("no trivia source".to_string());
        assert_eq!(err.to_string(), "Setup error: no trivia source");

        let err: BotError = CogwheelError::validation("bad prefix").into();
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
