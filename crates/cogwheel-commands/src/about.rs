//! About command

use crate::context::{CommandError, Context};
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use std::time::Duration;

const ABOUT_COLOR: u32 = 0x3498DB;
const ABOUT_TEXT: &str =
    "Paginated help, trivia, a memory game, AniList profiles and welcome messages for your server.";

/// Compact uptime such as `2d 3h 4m 5s`, leading zero units omitted.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60,
    );

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));
    parts.join(" ")
}

/// Shows information about the bot.
#[poise::command(slash_command, prefix_command, category = "Utility")]
pub async fn about(ctx: Context<'_>) -> Result<(), CommandError> {
    let data = ctx.data();
    let name = ctx.serenity_context().cache.current_user().name.clone();

    let embed = serenity::CreateEmbed::new()
        .title(format!("About {name}"))
        .description(ABOUT_TEXT)
        .color(ABOUT_COLOR)
        .field("Version", env!("CARGO_PKG_VERSION"), true)
        .field("Uptime", format_uptime(data.started_at.elapsed()), true)
        .field(
            "Active sessions",
            data.sessions.active_count().to_string(),
            true,
        );

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}
