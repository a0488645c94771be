//! Command context and framework integration

use crate::trivia::{OpenTriviaSource, QuestionSource};
use crate::welcome::WelcomeStore;
use cogwheel_anilist::{AniListClient, CredentialCache, RemoteDataProvider, SledCredentialStore};
use cogwheel_config::{Config, ConfigCache};
use cogwheel_session::SessionRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state accessible across commands and event handlers
pub struct CommandContext {
    /// Live configuration
    pub config: Arc<ConfigCache>,
    /// Active interactive sessions, one per feature and user
    pub sessions: Arc<SessionRegistry>,
    /// AniList data provider
    pub anilist: Arc<dyn RemoteDataProvider>,
    /// Connected AniList accounts
    pub credentials: CredentialCache,
    /// Trivia question source
    pub questions: Arc<dyn QuestionSource>,
    /// Per-guild welcome settings
    pub welcome: WelcomeStore,
    /// When the bot started
    pub started_at: Instant,
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("config", &"<ConfigCache>")
            .field("active_sessions", &self.sessions.active_count())
            .field("anilist", &"<RemoteDataProvider>")
            .field("credentials", &self.credentials)
            .field("questions", &"<QuestionSource>")
            .field("started_at", &self.started_at)
            .finish()
    }
}

/// Error type for commands
pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// Poise context type alias
pub type Context<'a> = poise::Context<'a, CommandContext, CommandError>;

/// Poise application context type alias, for commands that open modals
pub type ApplicationContext<'a> = poise::ApplicationContext<'a, CommandContext, CommandError>;

/// Create a new command context with all required components
pub async fn create_command_context(
    config: Config,
    db: &sled::Db,
) -> Result<CommandContext, CommandError> {
    let anilist = AniListClient::new(config.anilist.clone())?;
    if !config.anilist.is_configured() {
        info!("AniList OAuth credentials not configured; account connection is disabled");
    }

    let credentials = CredentialCache::new(Arc::new(SledCredentialStore::new(db)?));
    credentials.refresh().await?;

    let questions = OpenTriviaSource::new(&config.trivia)?;
    let welcome = WelcomeStore::new(db)?;

    info!("Command context initialized");

    Ok(CommandContext {
        config: Arc::new(ConfigCache::new(config)),
        sessions: Arc::new(SessionRegistry::new()),
        anilist: Arc::new(anilist),
        credentials,
        questions: Arc::new(questions),
        welcome,
        started_at: Instant::now(),
    })
}
