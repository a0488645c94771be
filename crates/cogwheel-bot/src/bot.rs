//! Core bot logic using the Poise framework.

use crate::error::{BotError, BotResult};
use cogwheel_commands::{all_commands, create_command_context, welcome, CommandContext, CommandError};
use cogwheel_config::Config;
use poise::serenity_prelude as serenity;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Gateway intents the bot needs.
///
/// Member events drive welcome messages, message content enables prefix
/// commands and the emoji intent keeps the guild emoji cache warm for the
/// memory game.
pub fn intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_EMOJIS_AND_STICKERS
}

/// Framework options for the given text command prefix.
pub fn framework_options(prefix: &str) -> poise::FrameworkOptions<CommandContext, CommandError> {
    poise::FrameworkOptions {
        commands: all_commands(),
        on_error: |error| Box::pin(on_error(error)),
        event_handler: |ctx, event, framework, data| {
            Box::pin(event_handler(ctx, event, framework, data))
        },
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(prefix.to_string()),
            mention_as_prefix: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Main bot structure.
pub struct CogwheelBot {
    config: Config,
}

impl CogwheelBot {
    /// Creates a new bot instance.
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Connects to Discord and runs until the gateway closes or Ctrl+C.
    pub async fn run(self) -> BotResult<()> {
        let Self { config } = self;

        let db = open_database(&config.storage.path)?;
        let data = create_command_context(config.clone(), &db)
            .await
            .map_err(|e| BotError::Setup(e.to_string()))?;
        let sessions = data.sessions.clone();
        let guild_id = config.discord.guild_id;

        let framework = poise::Framework::builder()
            .options(framework_options(&config.discord.prefix))
            .setup(move |ctx, ready, framework| {
                Box::pin(async move {
                    info!(user = %ready.user.name, guilds = ready.guilds.len(), "Bot connected");
                    let commands = &framework.options().commands;
                    match guild_id {
                        Some(id) => {
                            poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(id))
                                .await?;
                            info!(guild_id = id, "Slash commands registered in development guild");
                        }
                        None => {
                            poise::builtins::register_globally(ctx, commands).await?;
                            info!("Slash commands registered globally");
                        }
                    }
                    Ok(data)
                })
            })
            .build();

        let mut client = serenity::ClientBuilder::new(&config.discord.token, intents())
            .framework(framework)
            .await?;

        let shard_manager = client.shard_manager.clone();
        let shutdown_sessions = sessions.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }

            info!("Received shutdown signal, starting graceful shutdown");
            shutdown_sessions.cancel_all();
            shard_manager.shutdown_all().await;
        });

        info!("Cogwheel is starting up...");
        let outcome = client.start().await;

        sessions.cancel_all();
        if let Err(e) = db.flush_async().await {
            warn!(error = %e, "Failed to flush database on shutdown");
        }

        outcome?;
        info!("Cogwheel has shut down");
        Ok(())
    }
}

fn open_database(path: &str) -> BotResult<sled::Db> {
    let db = sled::open(Path::new(path))?;
    info!(path, "Opened database");
    Ok(db)
}

/// Global error handler for the framework
async fn on_error(error: poise::FrameworkError<'_, CommandContext, CommandError>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!(error = %error, "Failed to start bot");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(command = %ctx.command().qualified_name, error = %error, "Command failed");
            if let Err(e) = ctx
                .say("An error occurred while running this command.")
                .await
            {
                warn!(error = %e, "Failed to report command error");
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!(event = event.snake_case_name(), error = %error, "Event handler failed");
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!(error = %e, "Error while handling error");
            }
        }
    }
}

/// Central event handler for Discord events
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, CommandContext, CommandError>,
    data: &CommandContext,
) -> Result<(), CommandError> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(user = %data_about_bot.user.name, "Bot ready");
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if welcome::greet(ctx, data, new_member).await? {
                debug!(guild_id = %new_member.guild_id, user = %new_member.user.id, "Sent welcome message");
            }
        }
        _ => {}
    }
    Ok(())
}
