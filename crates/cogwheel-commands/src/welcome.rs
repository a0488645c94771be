//! Welcome messages for new members
//!
//! Each guild stores a welcome channel and, optionally, a message template.
//! Templates use `{user.mention}`, `{user.name}`, `{user.id}`,
//! `{guild.name}` and `{guild.member_count}`; `{{` and `}}` produce literal
//! braces. A template that does not render falls back to the default text.

use crate::context::{ApplicationContext, CommandContext, CommandError, Context};
use chrono::{DateTime, Utc};
use cogwheel_common::{CogwheelError, GuildId, Result};
use poise::serenity_prelude as serenity;
use poise::{CreateReply, Modal as _};
use serde::{Deserialize, Serialize};
use serenity::{CreateEmbed, CreateMessage, Mentionable};
use tracing::{debug, info, instrument, warn};

/// Name of the sled tree holding welcome settings.
pub const WELCOME_TREE: &str = "welcome";

/// Longest custom welcome message accepted.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

const WELCOME_COLOR: u32 = 0x3498DB;

/// Welcome settings of one guild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WelcomeSettings {
    /// Channel welcome messages are posted to.
    pub channel_id: u64,
    /// Custom template; the default text is used when unset.
    pub message: Option<String>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

/// Per-guild welcome settings backed by a sled tree.
#[derive(Debug, Clone)]
pub struct WelcomeStore {
    tree: sled::Tree,
}

impl WelcomeStore {
    /// Opens the welcome tree in an already opened database.
    pub fn new(db: &sled::Db) -> Result<Self> {
        let tree = db
            .open_tree(WELCOME_TREE)
            .map_err(|e| CogwheelError::storage_with_source("Failed to open welcome tree", e))?;
        Ok(Self { tree })
    }

    /// Settings of `guild`, if any were saved.
    pub fn get(&self, guild: GuildId) -> Result<Option<WelcomeSettings>> {
        self.tree
            .get(guild.to_key())?
            .map(|bytes| serde_json::from_slice(&bytes).map_err(CogwheelError::from))
            .transpose()
    }

    /// Sets the welcome channel, keeping any custom message.
    pub async fn set_channel(&self, guild: GuildId, channel_id: u64) -> Result<()> {
        let message = self.get(guild)?.and_then(|settings| settings.message);
        self.put(
            guild,
            &WelcomeSettings {
                channel_id,
                message,
                updated_at: Utc::now(),
            },
        )
        .await
    }

    /// Sets the custom message. Returns `false` when no channel is set yet.
    pub async fn set_message(&self, guild: GuildId, message: &str) -> Result<bool> {
        let Some(mut settings) = self.get(guild)? else {
            return Ok(false);
        };
        settings.message = Some(message.to_string());
        settings.updated_at = Utc::now();
        self.put(guild, &settings).await?;
        Ok(true)
    }

    async fn put(&self, guild: GuildId, settings: &WelcomeSettings) -> Result<()> {
        self.tree.insert(guild.to_key(), serde_json::to_vec(settings)?)?;
        self.tree.flush_async().await?;
        debug!(guild = %guild, "Saved welcome settings");
        Ok(())
    }
}

// ============================================================================
// Message rendering
// ============================================================================

/// Values available to welcome templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeVars {
    /// Member mention, `<@id>`.
    pub mention: String,
    /// Member user name.
    pub name: String,
    /// Member id.
    pub id: u64,
    /// Guild name.
    pub guild_name: String,
    /// Guild member count.
    pub member_count: u64,
}

impl WelcomeVars {
    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            "user.mention" => Some(self.mention.clone()),
            "user.name" => Some(self.name.clone()),
            "user.id" => Some(self.id.to_string()),
            "guild.name" => Some(self.guild_name.clone()),
            "guild.member_count" => Some(self.member_count.to_string()),
            _ => None,
        }
    }
}

/// Fills in a template. `None` for unknown placeholders or unbalanced braces.
pub fn format_welcome(template: &str, vars: &WelcomeVars) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next()? {
                        '}' => break,
                        '{' => return None,
                        c => key.push(c),
                    }
                }
                out.push_str(&vars.lookup(&key)?);
            }
            '}' => return None,
            c => out.push(c),
        }
    }

    Some(out)
}

/// The text used when no custom message is set or it fails to render.
pub fn default_welcome(vars: &WelcomeVars) -> String {
    format!(
        "**Hello {mention}!**\n\n\
         Welcome to our vibrant community. We're thrilled to have you join us as our **{count}th** member!\n\n\
         🔹 **Your Details:**\n\
         • Name: `{name}`\n\
         • ID: `{id}`\n\n\
         🔹 **Getting Started:**\n\
         • Check out our rules and guidelines\n\
         • Introduce yourself in the introductions channel\n\
         • Explore our various topic-specific channels\n\n\
         If you have any questions, feel free to ask our friendly community or moderators.\n\n\
         We hope you have a fantastic time here! 🌟",
        mention = vars.mention,
        count = vars.member_count,
        name = vars.name,
        id = vars.id,
    )
}

/// Embed for a welcome message.
pub fn welcome_embed(template: Option<&str>, vars: &WelcomeVars) -> CreateEmbed {
    let custom = template.and_then(|template| {
        let rendered = format_welcome(template, vars);
        if rendered.is_none() {
            debug!("Custom welcome message did not render, using the default");
        }
        rendered
    });

    match custom {
        Some(description) => CreateEmbed::new().description(description).color(WELCOME_COLOR),
        None => CreateEmbed::new()
            .title(format!("Welcome to {}! 🎉", vars.guild_name))
            .description(default_welcome(vars))
            .color(WELCOME_COLOR),
    }
}

/// Posts the welcome message for `member`. Returns whether one was sent.
#[instrument(skip_all, fields(guild = %member.guild_id, user = %member.user.id))]
pub async fn greet(
    ctx: &serenity::Context,
    data: &CommandContext,
    member: &serenity::Member,
) -> Result<bool> {
    let Some(settings) = data.welcome.get(GuildId(member.guild_id.get()))? else {
        return Ok(false);
    };

    let cached = ctx
        .cache
        .guild(member.guild_id)
        .map(|guild| (guild.name.clone(), guild.member_count));
    let (guild_name, member_count) = match cached {
        Some(found) => found,
        None => {
            let guild = member
                .guild_id
                .to_partial_guild_with_counts(&ctx.http)
                .await
                .map_err(|e| CogwheelError::discord_with_source("Failed to fetch guild", e))?;
            (guild.name, guild.approximate_member_count.unwrap_or_default())
        }
    };

    let vars = WelcomeVars {
        mention: member.mention().to_string(),
        name: member.user.name.clone(),
        id: member.user.id.get(),
        guild_name,
        member_count,
    };
    let embed = welcome_embed(settings.message.as_deref(), &vars).thumbnail(member.face());

    let sent = serenity::ChannelId::new(settings.channel_id)
        .send_message(
            &ctx.http,
            CreateMessage::new().content(&vars.mention).embed(embed),
        )
        .await;

    match sent {
        Ok(_) => {
            info!("Sent welcome message");
            Ok(true)
        }
        Err(e) => {
            warn!(error = %e, channel_id = settings.channel_id, "Failed to send welcome message");
            Ok(false)
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn whisper(ctx: Context<'_>, text: impl Into<String>) -> std::result::Result<(), CommandError> {
    ctx.send(CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}

fn guild_of(ctx: Context<'_>) -> std::result::Result<GuildId, CommandError> {
    ctx.guild_id()
        .map(|id| GuildId(id.get()))
        .ok_or_else(|| "This command can only be used in a server.".into())
}

/// Set the welcome channel
#[poise::command(
    slash_command,
    rename = "welcome-channel",
    category = "Welcome",
    required_permissions = "MANAGE_GUILD",
    guild_only
)]
pub async fn welcome_channel(
    ctx: Context<'_>,
    #[description = "The text channel to set as the welcome channel"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> std::result::Result<(), CommandError> {
    let guild = guild_of(ctx)?;
    ctx.data().welcome.set_channel(guild, channel.id.get()).await?;

    info!(guild = %guild, channel_id = channel.id.get(), "Welcome channel set");
    whisper(ctx, format!("Set welcome channel to {}", channel.mention())).await
}

#[derive(Debug, poise::Modal)]
#[name = "Set Welcome Message"]
struct WelcomeModal {
    #[name = "Welcome Message"]
    #[placeholder = "Enter your custom welcome message here..."]
    #[paragraph]
    #[max_length = 2000]
    message: String,
}

/// Set the welcome message
#[poise::command(
    slash_command,
    rename = "welcome-message",
    category = "Welcome",
    required_permissions = "MANAGE_GUILD",
    guild_only
)]
pub async fn welcome_message(ctx: ApplicationContext<'_>) -> std::result::Result<(), CommandError> {
    let base: Context<'_> = ctx.into();
    let guild = guild_of(base)?;
    if base.data().welcome.get(guild)?.is_none() {
        return whisper(base, "Please set a welcome channel first!").await;
    }

    let Some(WelcomeModal { message }) = WelcomeModal::execute(ctx).await? else {
        return Ok(());
    };
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return whisper(
            base,
            format!("Welcome messages can be at most {MAX_MESSAGE_LENGTH} characters."),
        )
        .await;
    }

    if !base.data().welcome.set_message(guild, &message).await? {
        return whisper(base, "Please set a welcome channel first!").await;
    }
    whisper(base, format!("Set welcome message to: {message}")).await
}

/// Test the welcome message
#[poise::command(
    slash_command,
    rename = "welcome-test",
    category = "Welcome",
    required_permissions = "MANAGE_GUILD",
    guild_only
)]
pub async fn welcome_test(
    ctx: Context<'_>,
    #[description = "The user to simulate as a new member"] user: Option<serenity::User>,
) -> std::result::Result<(), CommandError> {
    ctx.defer_ephemeral().await?;

    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let user_id = user.map_or_else(|| ctx.author().id, |user| user.id);
    let member = guild_id.member(ctx.serenity_context(), user_id).await?;

    let sent = greet(ctx.serenity_context(), ctx.data(), &member).await?;
    if sent {
        whisper(ctx, "Sent test welcome message!").await
    } else {
        whisper(
            ctx,
            "Failed to send test welcome message. Please check your welcome channel and message settings.",
        )
        .await
    }
}
