//! Welcome settings persistence.

use cogwheel_commands::welcome::WelcomeStore;
use cogwheel_common::test_utils::create_temp_dir;
use cogwheel_common::GuildId;

#[tokio::test]
async fn test_message_requires_channel() {
    let dir = create_temp_dir();
    let db = sled::open(dir.path().join("cogwheel.db")).unwrap();
    let store = WelcomeStore::new(&db).unwrap();
    let guild = GuildId(7);

    assert!(!store.set_message(guild, "Hello {user.name}").await.unwrap());
    assert!(store.get(guild).unwrap().is_none());

    store.set_channel(guild, 1234).await.unwrap();
    assert!(store.set_message(guild, "Hello {user.name}").await.unwrap());

    let settings = store.get(guild).unwrap().unwrap();
    assert_eq!(settings.channel_id, 1234);
    assert_eq!(settings.message.as_deref(), Some("Hello {user.name}"));
}

#[tokio::test]
async fn test_changing_channel_keeps_message() {
    let dir = create_temp_dir();
    let db = sled::open(dir.path().join("cogwheel.db")).unwrap();
    let store = WelcomeStore::new(&db).unwrap();
    let guild = GuildId(7);

    store.set_channel(guild, 1).await.unwrap();
    store.set_message(guild, "Welcome!").await.unwrap();
    store.set_channel(guild, 2).await.unwrap();

    let settings = store.get(guild).unwrap().unwrap();
    assert_eq!(settings.channel_id, 2);
    assert_eq!(settings.message.as_deref(), Some("Welcome!"));
    assert!(store.get(GuildId(8)).unwrap().is_none());
}

#[tokio::test]
async fn test_settings_survive_reopen() {
    let dir = create_temp_dir();
    let path = dir.path().join("cogwheel.db");

    {
        let db = sled::open(&path).unwrap();
        let store = WelcomeStore::new(&db).unwrap();
        store.set_channel(GuildId(3), 99).await.unwrap();
        db.flush_async().await.unwrap();
    }

    let db = sled::open(&path).unwrap();
    let store = WelcomeStore::new(&db).unwrap();
    assert_eq!(store.get(GuildId(3)).unwrap().unwrap().channel_id, 99);
}
