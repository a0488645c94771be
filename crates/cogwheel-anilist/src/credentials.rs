//! Persisted AniList access tokens.
//!
//! Tokens live in a sled tree keyed by the Discord user id. A
//! [`CredentialCache`] mirrors the tree in memory so command handlers never
//! touch storage on the read path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cogwheel_common::{CogwheelError, Result, UserId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the sled tree holding tokens.
pub const TOKENS_TREE: &str = "anilist_tokens";

/// Durable mapping from Discord users to AniList access tokens.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stores or replaces the token for `user`.
    async fn save(&self, user: UserId, token: &str) -> Result<()>;

    /// Removes the token for `user`, returning whether one existed.
    async fn remove(&self, user: UserId) -> Result<bool>;

    /// Every stored token.
    async fn load_all(&self) -> Result<HashMap<UserId, String>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    access_token: String,
    saved_at: DateTime<Utc>,
}

/// [`CredentialStore`] backed by a sled tree.
#[derive(Debug, Clone)]
pub struct SledCredentialStore {
    tree: sled::Tree,
}

impl SledCredentialStore {
    /// Opens the token tree in an already opened database.
    pub fn new(db: &sled::Db) -> Result<Self> {
        let tree = db
            .open_tree(TOKENS_TREE)
            .map_err(|e| CogwheelError::storage_with_source("Failed to open token tree", e))?;
        Ok(Self { tree })
    }
}

#[async_trait]
impl CredentialStore for SledCredentialStore {
    async fn save(&self, user: UserId, token: &str) -> Result<()> {
        let record = StoredCredential {
            access_token: token.to_string(),
            saved_at: Utc::now(),
        };
        let bytes = serde_json::to_vec(&record)?;

        self.tree.insert(user.to_key(), bytes)?;
        self.tree.flush_async().await?;

        debug!(user = %user, "Stored AniList token");
        Ok(())
    }

    async fn remove(&self, user: UserId) -> Result<bool> {
        let existed = self.tree.remove(user.to_key())?.is_some();
        self.tree.flush_async().await?;

        debug!(user = %user, existed, "Removed AniList token");
        Ok(existed)
    }

    async fn load_all(&self) -> Result<HashMap<UserId, String>> {
        let mut tokens = HashMap::new();

        for item in &self.tree {
            let (key, value) = item?;
            let Some(user) = UserId::from_key(&key) else {
                warn!("Skipping token entry with malformed key");
                continue;
            };
            match serde_json::from_slice::<StoredCredential>(&value) {
                Ok(record) => {
                    tokens.insert(user, record.access_token);
                }
                Err(e) => warn!(user = %user, error = %e, "Skipping unreadable token entry"),
            }
        }

        Ok(tokens)
    }
}

/// In-memory view of the stored tokens, kept consistent on every write.
#[derive(Clone)]
pub struct CredentialCache {
    tokens: Arc<DashMap<UserId, String>>,
    store: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("connected_users", &self.tokens.len())
            .finish_non_exhaustive()
    }
}

impl CredentialCache {
    /// Creates an empty cache over `store`; call [`Self::refresh`] to fill it.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
            store,
        }
    }

    /// Reloads every token from storage.
    pub async fn refresh(&self) -> Result<usize> {
        let tokens = self.store.load_all().await?;
        self.tokens.clear();
        for (user, token) in tokens {
            self.tokens.insert(user, token);
        }
        info!(count = self.tokens.len(), "Loaded AniList credentials");
        Ok(self.tokens.len())
    }

    /// Token for `user`, if connected.
    pub fn get(&self, user: UserId) -> Option<String> {
        self.tokens.get(&user).map(|token| token.value().clone())
    }

    /// Whether `user` has connected an account.
    pub fn is_connected(&self, user: UserId) -> bool {
        self.tokens.contains_key(&user)
    }

    /// Persists and caches a token.
    pub async fn connect(&self, user: UserId, token: String) -> Result<()> {
        self.store.save(user, &token).await?;
        self.tokens.insert(user, token);
        Ok(())
    }

    /// Forgets the token for `user`, returning whether one existed.
    pub async fn disconnect(&self, user: UserId) -> Result<bool> {
        let existed = self.store.remove(user).await?;
        let cached = self.tokens.remove(&user).is_some();
        Ok(existed || cached)
    }

    /// Number of connected users.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no user is connected.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogwheel_common::test_utils::create_temp_dir;

    fn open_store() -> (tempfile::TempDir, SledCredentialStore) {
        let dir = create_temp_dir();
        let db = sled::open(dir.path().join("db")).unwrap();
        let store = SledCredentialStore::new(&db).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (_dir, store) = open_store();
        store.save(UserId(7), "token-a").await.unwrap();
        store.save(UserId(7), "token-b").await.unwrap();
        store.save(UserId(9), "token-c").await.unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[&UserId(7)], "token-b");
    }

    #[tokio::test]
    async fn test_remove_reports_existence() {
        let (_dir, store) = open_store();
        store.save(UserId(7), "token").await.unwrap();

        assert!(store.remove(UserId(7)).await.unwrap());
        assert!(!store.remove(UserId(7)).await.unwrap());
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cache_follows_writes() {
        let (_dir, store) = open_store();
        let cache = CredentialCache::new(Arc::new(store));

        cache.connect(UserId(1), "abc".into()).await.unwrap();
        assert_eq!(cache.get(UserId(1)).as_deref(), Some("abc"));

        assert!(cache.disconnect(UserId(1)).await.unwrap());
        assert!(!cache.is_connected(UserId(1)));
        assert!(!cache.disconnect(UserId(1)).await.unwrap());
    }
}
