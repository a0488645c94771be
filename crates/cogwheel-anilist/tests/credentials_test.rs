//! Credential persistence across restarts.

use cogwheel_anilist::{CredentialCache, CredentialStore, SledCredentialStore};
use cogwheel_common::UserId;
use std::sync::Arc;
use tempfile::TempDir;

fn open(dir: &TempDir) -> (sled::Db, Arc<SledCredentialStore>) {
    let db = sled::open(dir.path().join("cogwheel.db")).unwrap();
    let store = Arc::new(SledCredentialStore::new(&db).unwrap());
    (db, store)
}

#[tokio::test]
async fn test_tokens_survive_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let (db, store) = open(&dir);
        let cache = CredentialCache::new(store);
        cache.connect(UserId(10), "first".into()).await.unwrap();
        cache.connect(UserId(20), "second".into()).await.unwrap();
        cache.disconnect(UserId(20)).await.unwrap();
        db.flush_async().await.unwrap();
    }

    let (_db, store) = open(&dir);
    let cache = CredentialCache::new(store.clone());
    assert_eq!(cache.refresh().await.unwrap(), 1);
    assert_eq!(cache.get(UserId(10)).as_deref(), Some("first"));
    assert!(cache.get(UserId(20)).is_none());
    assert_eq!(store.load_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_refresh_replaces_stale_entries() {
    let dir = TempDir::new().unwrap();
    let (_db, store) = open(&dir);
    let cache = CredentialCache::new(store.clone());

    cache.connect(UserId(1), "a".into()).await.unwrap();
    store.remove(UserId(1)).await.unwrap();
    store.save(UserId(2), "b").await.unwrap();

    cache.refresh().await.unwrap();
    assert!(!cache.is_connected(UserId(1)));
    assert!(cache.is_connected(UserId(2)));
    assert_eq!(cache.len(), 1);
}
