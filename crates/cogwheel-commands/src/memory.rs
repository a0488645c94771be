//! Memory game played with the guild's custom emojis

use crate::context::{CommandError, Context};
use crate::discord::{component_id, dismiss, launch_leased, Controls, Reply, Screen, View};
use async_trait::async_trait;
use cogwheel_common::{format_elapsed, UserId};
use cogwheel_session::memory::BOARD_SIZES;
use cogwheel_session::{
    Feature, Frame, Lease, MemoryBoard, MemoryEvent, Session, SessionId, TerminalReason, Tile,
    TileState,
};
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::{
    ButtonStyle, ComponentInteraction, CreateActionRow, CreateButton, CreateEmbed,
    CreateEmbedFooter, EmojiId, ReactionType,
};
use std::time::Duration;
use tracing::{debug, info};

/// Board size used when none is given.
pub const DEFAULT_BOARD_SIZE: usize = 5;

const COMPLETED_COLOR: u32 = 0x00FF00;
const CONCEALED: char = '❓';
const LOCKED: char = '🔒';

/// A guild custom emoji used as a tile symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiSymbol {
    /// Emoji id.
    pub id: u64,
    /// Emoji name.
    pub name: String,
    /// Whether the emoji is animated.
    pub animated: bool,
}

impl EmojiSymbol {
    fn reaction(&self) -> ReactionType {
        ReactionType::Custom {
            animated: self.animated,
            id: EmojiId::new(self.id),
            name: Some(self.name.clone()),
        }
    }
}

impl From<&serenity::Emoji> for EmojiSymbol {
    fn from(emoji: &serenity::Emoji) -> Self {
        Self {
            id: emoji.id.get(),
            name: emoji.name.clone(),
            animated: emoji.animated,
        }
    }
}

fn title(size: usize) -> String {
    format!("Memory Game ({size}x{size}): Match the pairs!")
}

fn tile_button(id: String, tile: &Tile<EmojiSymbol>, face_up: bool, enabled: bool) -> CreateButton {
    let button = CreateButton::new(id);
    let symbol = tile.symbol.as_ref().map(EmojiSymbol::reaction);

    match (tile.state, symbol) {
        (TileState::Locked, _) | (_, None) => button
            .emoji(LOCKED)
            .style(ButtonStyle::Secondary)
            .disabled(true),
        (_, Some(symbol)) if face_up => button
            .emoji(symbol)
            .style(ButtonStyle::Secondary)
            .disabled(true),
        (TileState::Concealed, _) => button
            .emoji(CONCEALED)
            .style(ButtonStyle::Secondary)
            .disabled(!enabled),
        (TileState::Revealed, Some(symbol)) => button
            .emoji(symbol)
            .style(ButtonStyle::Success)
            .disabled(!enabled),
        (TileState::Matched, Some(symbol)) => button
            .emoji(symbol)
            .style(ButtonStyle::Success)
            .disabled(true),
        (TileState::Incorrect, Some(symbol)) => button
            .emoji(symbol)
            .style(ButtonStyle::Danger)
            .disabled(!enabled),
    }
}

fn grid(
    board: &MemoryBoard<EmojiSymbol>,
    id: impl Fn(usize, usize) -> String,
    face_up: bool,
    enabled: bool,
) -> Vec<CreateActionRow> {
    board
        .rows()
        .enumerate()
        .map(|(y, row)| {
            CreateActionRow::Buttons(
                row.iter()
                    .enumerate()
                    .map(|(x, tile)| tile_button(id(x, y), tile, face_up, enabled))
                    .collect(),
            )
        })
        .collect()
}

/// The face-up board shown before play starts.
pub fn preview_screen(board: &MemoryBoard<EmojiSymbol>, seconds: u64) -> Screen {
    Screen {
        content: format!(
            "Memory Game ({size}x{size}): Match the pairs! (Showing the emojis for {seconds} seconds...)",
            size = board.size()
        ),
        embeds: Vec::new(),
        components: grid(board, |x, y| format!("preview:{x}:{y}"), true, false),
    }
}

/// Summary card for a finished board.
pub fn completion_embed(board: &MemoryBoard<EmojiSymbol>) -> CreateEmbed {
    CreateEmbed::new()
        .title("🎉 Memory Game Completed! 🎉")
        .color(COMPLETED_COLOR)
        .field("🕒 Time Taken", format_elapsed(board.elapsed()), false)
        .field("🔢 Total Moves", board.moves().to_string(), false)
        .field("🧠 Board Size", format!("{0}x{0}", board.size()), false)
        .footer(CreateEmbedFooter::new("Thanks for playing!"))
}

fn parse_tile(action: &str) -> Option<(usize, usize)> {
    let mut parts = action.strip_prefix("tile:")?.split(':');
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y))
}

/// Waits out the preview. `false` when a newer game replaced this one first.
async fn hold_preview(lease: &Lease, preview: Duration) -> bool {
    let replaced = lease.cancellation();
    tokio::select! {
        () = tokio::time::sleep(preview) => true,
        () = replaced.cancelled() => false,
    }
}

struct MemoryView {
    session: SessionId,
}

impl View<MemoryBoard<EmojiSymbol>> for MemoryView {
    fn screen(&self, frame: &Frame<'_, MemoryBoard<EmojiSymbol>>) -> Screen {
        let board = frame.payload;

        if board.is_complete() {
            return Screen::embed(completion_embed(board), Vec::new());
        }
        match frame.ended {
            Some(TerminalReason::Replaced) => {
                return Screen::text("Game ended because a new game was started.");
            }
            Some(_) => return Screen::text("Game ended due to inactivity."),
            None => {}
        }

        let session = self.session;
        Screen {
            content: title(board.size()),
            embeds: Vec::new(),
            components: grid(
                board,
                |x, y| component_id(session, &format!("tile:{x}:{y}")),
                false,
                frame.controls_enabled,
            ),
        }
    }
}

struct MemoryControls;

#[async_trait]
impl Controls for MemoryControls {
    type Event = MemoryEvent;

    fn placeholder(&self) -> MemoryEvent {
        MemoryEvent::Settle
    }

    async fn decode(
        &self,
        ctx: &serenity::Context,
        action: &str,
        interaction: ComponentInteraction,
    ) -> Option<(MemoryEvent, Reply)> {
        let Some((x, y)) = parse_tile(action) else {
            debug!(action, "Ignoring unknown memory game action");
            dismiss(&ctx.http, &interaction).await;
            return None;
        };
        Some((MemoryEvent::Reveal { x, y }, Reply::Component(interaction)))
    }
}

/// Starts a memory game with custom server emojis
#[poise::command(slash_command, prefix_command, category = "Games", guild_only)]
pub async fn memorygame(
    ctx: Context<'_>,
    #[description = "Board size: 3, 4 or 5"] size: Option<usize>,
) -> Result<(), CommandError> {
    let size = size.unwrap_or(DEFAULT_BOARD_SIZE);
    if !BOARD_SIZES.contains(&size) {
        ctx.say("Invalid board size. Please choose 3, 4, or 5.").await?;
        return Ok(());
    }

    let guild_id = ctx
        .guild_id()
        .ok_or("This command can only be used in a server.")?;
    let symbols: Vec<EmojiSymbol> = guild_id
        .emojis(ctx.http())
        .await?
        .iter()
        .map(EmojiSymbol::from)
        .collect();

    let config = ctx.data().config.get();
    let generated = {
        let mut rng = rand::rng();
        MemoryBoard::generate(
            size,
            &symbols,
            config.sessions.memory_mismatch_delay(),
            &mut rng,
        )
    };
    let mut board = match generated {
        Ok(board) => board,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    let owner = UserId(ctx.author().id.get());
    let id = SessionId::new();
    let lease = ctx.data().sessions.begin(Feature::Memory, owner, id);

    let preview = config.sessions.memory_preview();
    let Screen {
        content,
        components,
        ..
    } = preview_screen(&board, preview.as_secs());
    let mut message = ctx
        .send(CreateReply::default().content(content).components(components))
        .await?
        .into_message()
        .await?;

    if !hold_preview(&lease, preview).await {
        debug!(session_id = %id, owner = %owner, "Memory game replaced during preview");
        let ended = Screen::text("Game ended because a new game was started.");
        message.edit(ctx.serenity_context(), ended.edit()).await?;
        return Ok(());
    }
    board.start_clock();

    info!(owner = %owner, size, "Memory game starting");
    let session = Session::new(Feature::Memory, owner, board, config.sessions.memory_window())
        .with_id(id);
    let view = MemoryView { session: id };
    launch_leased(ctx, session, view, MemoryControls, Some(message), lease).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogwheel_session::{SessionRegistry, Transition};
    use std::sync::Arc;

    fn symbol(id: u64) -> EmojiSymbol {
        EmojiSymbol {
            id,
            name: format!("emoji{id}"),
            animated: false,
        }
    }

    #[rustfmt::skip]
    fn board() -> MemoryBoard<EmojiSymbol> {
        let layout = vec![
            Some(symbol(1)), Some(symbol(2)), Some(symbol(3)),
            Some(symbol(4)), None,            Some(symbol(1)),
            Some(symbol(2)), Some(symbol(3)), Some(symbol(4)),
        ];
        MemoryBoard::with_layout(3, layout, Duration::from_secs(1)).unwrap()
    }

    fn frame(board: &MemoryBoard<EmojiSymbol>, ended: Option<TerminalReason>) -> Frame<'_, MemoryBoard<EmojiSymbol>> {
        Frame {
            payload: board,
            controls_enabled: ended.is_none(),
            ended,
        }
    }

    #[test]
    fn test_parse_tile() {
        assert_eq!(parse_tile("tile:2:4"), Some((2, 4)));
        assert_eq!(parse_tile("tile:2"), None);
        assert_eq!(parse_tile("tile:2:4:1"), None);
        assert_eq!(parse_tile("preview:1:1"), None);
    }

    #[test]
    fn test_preview_shows_every_symbol_disabled() {
        let screen = preview_screen(&board(), 7);
        assert_eq!(
            screen.content,
            "Memory Game (3x3): Match the pairs! (Showing the emojis for 7 seconds...)"
        );

        let rows = serde_json::to_value(&screen.components).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 3);
        assert_eq!(rows[0]["components"][0]["emoji"]["name"], "emoji1");
        assert_eq!(rows[0]["components"][0]["disabled"], true);
        assert_eq!(rows[1]["components"][1]["emoji"]["name"], "🔒");
    }

    #[test]
    fn test_board_screen_hides_concealed_tiles() {
        let view = MemoryView {
            session: SessionId::new(),
        };
        let mut board = board();
        board.apply(MemoryEvent::Reveal { x: 0, y: 0 });

        let screen = view.screen(&frame(&board, None));
        assert_eq!(screen.content, "Memory Game (3x3): Match the pairs!");

        let rows = serde_json::to_value(&screen.components).unwrap();
        assert_eq!(rows[0]["components"][0]["emoji"]["name"], "emoji1");
        assert_eq!(rows[0]["components"][1]["emoji"]["name"], "❓");
    }

    #[test]
    fn test_completed_board_shows_summary() {
        let view = MemoryView {
            session: SessionId::new(),
        };
        let mut board = board();
        for (a, b) in [((0, 0), (2, 1)), ((1, 0), (0, 2)), ((2, 0), (1, 2)), ((0, 1), (2, 2))] {
            board.apply(MemoryEvent::Reveal { x: a.0, y: a.1 });
            board.apply(MemoryEvent::Reveal { x: b.0, y: b.1 });
        }
        assert!(board.is_complete());

        let screen = view.screen(&frame(&board, Some(TerminalReason::Completed)));
        assert!(screen.components.is_empty());
        let embed = serde_json::to_value(&screen.embeds[0]).unwrap();
        assert_eq!(embed["title"], "🎉 Memory Game Completed! 🎉");
        assert_eq!(embed["fields"][1]["value"], "8");
        assert_eq!(embed["fields"][2]["value"], "3x3");
    }

    #[test]
    fn test_expired_board_ends_with_notice() {
        let view = MemoryView {
            session: SessionId::new(),
        };
        let board = board();
        let screen = view.screen(&frame(&board, Some(TerminalReason::Expired)));
        assert_eq!(screen.content, "Game ended due to inactivity.");
        assert!(screen.components.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_preview_holds_registration() {
        let registry = Arc::new(SessionRegistry::new());
        let (owner, id) = (UserId(1), SessionId::new());
        let lease = registry.begin(Feature::Memory, owner, id);

        assert_eq!(registry.active(Feature::Memory, owner), Some(id));
        assert!(hold_preview(&lease, Duration::from_secs(7)).await);
        assert_eq!(registry.active(Feature::Memory, owner), Some(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_game_during_preview_replaces_it() {
        let registry = Arc::new(SessionRegistry::new());
        let owner = UserId(1);
        let first = registry.begin(Feature::Memory, owner, SessionId::new());

        let newer = SessionId::new();
        let rival = registry.clone();
        let second = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            rival.begin(Feature::Memory, owner, newer)
        });

        let started = tokio::time::Instant::now();
        assert!(!hold_preview(&first, Duration::from_secs(7)).await);
        assert!(started.elapsed() < Duration::from_secs(7));

        let _second = second.await.unwrap();
        drop(first);
        assert_eq!(registry.active(Feature::Memory, owner), Some(newer));
    }
}
