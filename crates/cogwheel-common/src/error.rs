//! Error types and utilities for Cogwheel

use thiserror::Error;

/// Result type alias for Cogwheel operations
pub type Result<T> = std::result::Result<T, CogwheelError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for Cogwheel operations
#[derive(Error, Debug)]
pub enum CogwheelError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<BoxedSource>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network related errors (transport failures, timeouts)
    #[error("Network error: {message}")]
    Network {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<BoxedSource>,
    },

    /// Discord API related errors
    #[error("Discord API error: {message}")]
    Discord {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<BoxedSource>,
    },

    /// AniList API related errors
    #[error("AniList API error: {message}")]
    AniList {
        /// Human readable description
        message: String,
        /// HTTP status, when the failure came from a non-2xx response
        status_code: Option<u16>,
    },

    /// Persistent storage errors
    #[error("Storage error: {message}")]
    Storage {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<BoxedSource>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        /// Human readable description
        message: String,
        /// Offending field, if known
        field: Option<String>,
    },
}

impl CogwheelError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Discord API error with source
    pub fn discord_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Discord {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new AniList API error
    pub fn anilist(msg: impl Into<String>) -> Self {
        Self::AniList {
            message: msg.into(),
            status_code: None,
        }
    }

    /// Create a new AniList API error with status code
    pub fn anilist_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::AniList {
            message: msg.into(),
            status_code: Some(status),
        }
    }

    /// Create a new storage error with source
    pub fn storage_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Message suitable for showing to the user who triggered the failure.
    ///
    /// Transport and storage details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::AniList { message, .. } => format!("AniList API Error: {message}"),
            Self::Network { .. } => "Could not reach the remote service. Please try again.".to_string(),
            Self::Storage { .. } | Self::Io(_) => {
                "Something went wrong while saving your data. Please try again.".to_string()
            }
            other => format!("An error occurred: {other}"),
        }
    }
}

// Error conversion implementations for external types

/// Convert from reqwest::Error to CogwheelError
impl From<reqwest::Error> for CogwheelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map_or(0, |s| s.as_u16());
            Self::network_with_source(format!("HTTP error: {status_code}"), err)
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

/// Convert from sled::Error to CogwheelError
impl From<sled::Error> for CogwheelError {
    fn from(err: sled::Error) -> Self {
        Self::storage_with_source("Database operation failed", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let config_error = CogwheelError::config("config issue");
        assert_eq!(config_error.to_string(), "Configuration error: config issue");

        let anilist_error = CogwheelError::anilist_with_status("Server error", 500);
        assert_eq!(anilist_error.to_string(), "AniList API error: Server error");

        let validation_error = CogwheelError::validation_field("Invalid input", "page");
        assert!(validation_error.to_string().contains("Validation error"));
    }

    #[test]
    fn test_error_with_source() {
        let config_error = CogwheelError::config_with_source(
            "Failed to read file",
            io::Error::new(io::ErrorKind::NotFound, "File not found"),
        );
        assert!(config_error.to_string().contains("Failed to read file"));
        assert!(config_error.source().is_some());

        let storage_error = CogwheelError::storage_with_source(
            "Flush failed",
            io::Error::new(io::ErrorKind::PermissionDenied, "Access denied"),
        );
        assert!(storage_error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: CogwheelError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_error = serde_json::from_str::<serde_json::Value>(r#"{"invalid": json}"#).unwrap_err();
        let error: CogwheelError = serde_error.into();

        assert!(error.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_user_message_hides_transport_details() {
        let error = CogwheelError::network_with_source(
            "Connection failed",
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused on 10.0.0.1:443"),
        );
        let message = error.user_message();
        assert!(!message.contains("10.0.0.1"));

        let api = CogwheelError::anilist("User not found");
        assert_eq!(api.user_message(), "AniList API Error: User not found");

        let invalid = CogwheelError::validation("Please enter a valid number.");
        assert_eq!(invalid.user_message(), "Please enter a valid number.");
    }
}
