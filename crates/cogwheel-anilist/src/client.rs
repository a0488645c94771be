//! AniList GraphQL client with connection pooling and rate limiting
//!
//! All bot features talk to AniList through [`RemoteDataProvider`]; the
//! production implementation is [`AniListClient`], which shares one pooled
//! HTTP client, throttles outgoing requests and retries transient failures.

use crate::error::ProviderError;
use crate::models::{
    GraphQlResponse, ListCollectionData, ListEntry, ListKind, ListStatus, Profile,
    TokenResponse, UserData, ViewerData, ViewerIdData,
};
use crate::queries;
use async_trait::async_trait;
use cogwheel_config::AniListConfig;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, info, instrument, warn};

/// Result alias for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Read access to AniList on behalf of a user or anonymously.
#[async_trait]
pub trait RemoteDataProvider: Send + Sync {
    /// Profile of the user owning `token`.
    async fn fetch_profile(&self, token: &str) -> ProviderResult<Option<Profile>>;

    /// Public profile by AniList user name; `None` when no such user exists.
    async fn fetch_profile_by_name(&self, username: &str) -> ProviderResult<Option<Profile>>;

    /// Entries of the token owner's list with the given status.
    async fn fetch_list(
        &self,
        token: &str,
        kind: ListKind,
        status: ListStatus,
    ) -> ProviderResult<Vec<ListEntry>>;

    /// Exchanges an authorization code for an access token.
    ///
    /// Returns `None` when AniList refuses the code.
    async fn exchange_code(&self, code: &str) -> ProviderResult<Option<String>>;
}

/// Pooled, throttled AniList client.
#[derive(Debug, Clone)]
pub struct AniListClient {
    client: Client,
    config: AniListConfig,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl AniListClient {
    /// Builds the client from configuration.
    pub fn new(config: AniListConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| ProviderError::Setup(format!("failed to create HTTP client: {e}")))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| ProviderError::Setup("rate limit must be greater than 0".into()))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// The configuration this client was built from.
    pub const fn config(&self) -> &AniListConfig {
        &self.config
    }

    /// Sends one GraphQL document, retrying transport failures and 5xx/429.
    #[instrument(skip(self, query, variables, token), fields(authenticated = token.is_some()))]
    async fn post_graphql<T>(
        &self,
        query: &str,
        variables: Value,
        token: Option<&str>,
    ) -> ProviderResult<T>
    where
        T: DeserializeOwned,
    {
        let body = json!({ "query": query, "variables": variables });

        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(10))
            .take(self.config.max_retries);

        RetryIf::spawn(
            retry_strategy,
            || self.attempt(&body, token),
            |err: &ProviderError| {
                let transient = err.is_transient();
                if transient {
                    warn!(error = %err, "AniList request failed, will retry");
                }
                transient
            },
        )
        .await
    }

    async fn attempt<T>(&self, body: &Value, token: Option<&str>) -> ProviderResult<T>
    where
        T: DeserializeOwned,
    {
        self.rate_limiter.until_ready().await;

        let mut request = self
            .client
            .post(&self.config.api_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "AniList returned an error status");
            return Err(ProviderError::Status(status.as_u16()));
        }

        let envelope: GraphQlResponse<T> = response.json().await?;
        if let Some(error) = envelope.errors.into_iter().next() {
            return Err(ProviderError::Api(error.message));
        }
        envelope
            .data
            .ok_or_else(|| ProviderError::Decode("response carried no data".into()))
    }

    async fn viewer_id(&self, token: &str) -> ProviderResult<i64> {
        let data: ViewerIdData = self
            .post_graphql(queries::VIEWER_ID, json!({}), Some(token))
            .await?;
        Ok(data.viewer.id)
    }
}

#[async_trait]
impl RemoteDataProvider for AniListClient {
    #[instrument(skip(self, token))]
    async fn fetch_profile(&self, token: &str) -> ProviderResult<Option<Profile>> {
        let data: ViewerData = self
            .post_graphql(&queries::viewer_profile(), json!({}), Some(token))
            .await?;
        Ok(data.viewer)
    }

    #[instrument(skip(self))]
    async fn fetch_profile_by_name(&self, username: &str) -> ProviderResult<Option<Profile>> {
        let result: ProviderResult<UserData> = self
            .post_graphql(
                &queries::user_profile(),
                json!({ "username": username }),
                None,
            )
            .await;

        match result {
            Ok(data) => Ok(data.user),
            Err(e) if e.is_not_found() => {
                debug!(username, "AniList user not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, token), fields(kind = %kind, status = %status))]
    async fn fetch_list(
        &self,
        token: &str,
        kind: ListKind,
        status: ListStatus,
    ) -> ProviderResult<Vec<ListEntry>> {
        let user_id = self.viewer_id(token).await?;
        let data: ListCollectionData = self
            .post_graphql(
                queries::LIST_COLLECTION,
                json!({
                    "userId": user_id,
                    "type": kind.media_type(),
                    "status": status.api_value(),
                }),
                Some(token),
            )
            .await?;

        let entries = data
            .collection
            .and_then(|collection| collection.lists.into_iter().next())
            .map(|list| list.entries)
            .unwrap_or_default();

        debug!(count = entries.len(), "Fetched AniList list entries");
        Ok(entries)
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> ProviderResult<Option<String>> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .post(&self.config.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            warn!(status = response.status().as_u16(), "AniList refused the authorization code");
            return Ok(None);
        }

        let token: TokenResponse = response.json().await?;
        if token.access_token.is_some() {
            info!("Exchanged AniList authorization code");
        }
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AniListClient::new(AniListConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        let config = AniListConfig {
            rate_limit_per_sec: 0,
            ..AniListConfig::default()
        };
        let err = AniListClient::new(config).unwrap_err();
        assert!(matches!(err, ProviderError::Setup(_)));
    }

    #[test]
    fn test_client_is_shareable() {
        fn assert_provider<T: RemoteDataProvider + Clone + 'static>() {}
        assert_provider::<AniListClient>();
    }
}
