//! Test utilities and shared test helpers for Cogwheel.
//!
//! Enabled for dependants through the `testing` feature.

use crate::types::{ChannelId, GuildId, UserId};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Discord-related test fixtures.
pub mod discord_fixtures {
    use super::*;

    /// The user that owns sessions in tests.
    pub const fn owner() -> UserId {
        UserId(111_111_111_111_111_111)
    }

    /// A user that does not own the session under test.
    pub const fn intruder() -> UserId {
        UserId(222_222_222_222_222_222)
    }

    /// A channel ID for testing.
    pub const fn test_channel_id() -> ChannelId {
        ChannelId(123_456_789_012_345_678)
    }

    /// A guild ID for testing.
    pub const fn test_guild_id() -> GuildId {
        GuildId(987_654_321_098_765_432)
    }
}
