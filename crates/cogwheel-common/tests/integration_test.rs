//! Integration tests for cogwheel-common crate.

use cogwheel_common::{capitalize, format_elapsed, page_count, truncate_string, GuildId, UserId};
use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

#[test]
fn test_user_id_display() {
    let user_id = UserId(987654321);
    assert_eq!(format!("{}", user_id), "987654321");
}

#[test]
fn test_user_id_is_usable_as_map_key() {
    let mut map = HashMap::new();
    map.insert(UserId(1), "token-a");
    map.insert(UserId(2), "token-b");
    assert_eq!(map.get(&UserId(2)), Some(&"token-b"));
}

#[test]
fn test_user_id_serialization() {
    let serialized = serde_json::to_string(&UserId(42)).unwrap();
    assert_eq!(serialized, "42");
    let back: UserId = serde_json::from_str(&serialized).unwrap();
    assert_eq!(back, UserId(42));
}

#[test]
fn test_user_id_key_rejects_wrong_width() {
    assert_eq!(UserId::from_key(&[1, 2, 3]), None);
}

#[test]
fn test_guild_id_key() {
    assert_eq!(GuildId(1).to_key(), [0, 0, 0, 0, 0, 0, 0, 1]);
}

#[test]
fn test_text_helpers() {
    assert_eq!(truncate_string("abcdef", 6), "abcdef");
    assert_eq!(truncate_string("abcdefg", 6), "abc...");
    assert_eq!(capitalize("hARD"), "Hard");
    assert_eq!(format_elapsed(Duration::from_secs(61)), "1 minutes and 1 seconds");
    assert_eq!(page_count(13, 4), 4);
}

proptest! {
    #[test]
    fn prop_user_id_key_roundtrip(raw in any::<u64>()) {
        let id = UserId(raw);
        prop_assert_eq!(UserId::from_key(&id.to_key()), Some(id));
    }

    #[test]
    fn prop_truncate_never_exceeds_limit(input in ".{0,80}", limit in 3usize..40) {
        prop_assert!(truncate_string(&input, limit).chars().count() <= limit);
    }

    #[test]
    fn prop_page_count_covers_all_items(items in 0usize..500, per_page in 1usize..30) {
        let pages = page_count(items, per_page);
        prop_assert!(pages * per_page >= items);
        prop_assert!(pages == 0 || (pages - 1) * per_page < items);
    }
}
