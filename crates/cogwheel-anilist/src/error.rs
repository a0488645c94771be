//! Classified AniList failures.

use cogwheel_common::CogwheelError;
use thiserror::Error;

/// Every way an AniList call can fail, reduced to what callers act on.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response. The cause stays in the source
    /// chain so the display carries no URL or OS detail.
    #[error("Could not reach AniList")]
    Transport(#[source] reqwest::Error),

    /// AniList answered with a non-2xx status.
    #[error("AniList API returned status code {0}")]
    Status(u16),

    /// The response carried a GraphQL `errors` field.
    #[error("AniList API Error: {0}")]
    Api(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected AniList response: {0}")]
    Decode(String),

    /// The client could not be built from its configuration.
    #[error("Invalid AniList client configuration: {0}")]
    Setup(String),
}

impl ProviderError {
    /// Whether retrying the same request could succeed.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status(status) => *status >= 500 || *status == 429,
            Self::Api(_) | Self::Decode(_) | Self::Setup(_) => false,
        }
    }

    /// Whether AniList reported that the requested user does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Status(status) => *status == 404,
            Self::Api(message) => message.to_ascii_lowercase().contains("not found"),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.without_url().to_string())
        } else {
            Self::Transport(err)
        }
    }
}

impl From<ProviderError> for CogwheelError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Transport(e) => Self::network_with_source("AniList request failed", e),
            ProviderError::Status(status) => {
                Self::anilist_with_status(format!("returned status code {status}"), status)
            }
            ProviderError::Api(message) | ProviderError::Decode(message) => Self::anilist(message),
            ProviderError::Setup(message) => Self::config(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::Status(502).is_transient());
        assert!(ProviderError::Status(429).is_transient());
        assert!(!ProviderError::Status(400).is_transient());
        assert!(!ProviderError::Api("Invalid token".into()).is_transient());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(ProviderError::Status(404).is_not_found());
        assert!(ProviderError::Api("User not found".into()).is_not_found());
        assert!(!ProviderError::Api("Invalid token".into()).is_not_found());
    }

    #[tokio::test]
    async fn test_transport_display_hides_request_detail() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/graphql")
            .send()
            .await
            .unwrap_err();
        let err = ProviderError::from(err);
        assert!(matches!(err, ProviderError::Transport(_)));

        let shown = err.to_string();
        assert_eq!(shown, "Could not reach AniList");
        assert!(std::error::Error::source(&err).is_some());

        let user = CogwheelError::from(err).user_message();
        assert!(!user.contains("127.0.0.1"), "{user}");
        assert!(!user.contains("os error"), "{user}");
    }

    #[test]
    fn test_user_message() {
        let err: CogwheelError = ProviderError::Api("Invalid token".into()).into();
        assert_eq!(err.user_message(), "AniList API Error: Invalid token");
    }
}
