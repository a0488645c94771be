//! Help command: command cards and a paginated, filterable command list

use crate::context::{CommandContext, CommandError, Context};
use crate::discord::{
    component_id, dismiss, launch, prompt_text, selected_value, Controls, Reply, Screen, View,
};
use async_trait::async_trait;
use cogwheel_common::UserId;
use cogwheel_session::{Feature, Frame, Pager, PagerEvent, Session, SessionId};
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::{
    ButtonStyle, ComponentInteraction, CreateActionRow, CreateButton, CreateEmbed,
    CreateEmbedFooter, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption,
};
use std::sync::Arc;

/// Label of the unfiltered category.
pub const ALL_CATEGORIES: &str = "All";

/// Most embed fields shown on one page of a single category.
pub const MAX_FIELDS_PER_PAGE: usize = 25;

const HELP_COLOR: u32 = 0x3498DB;
const UNCATEGORIZED: &str = "No Category";

/// One listed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// Command name.
    pub name: String,
    /// Category the command is listed under.
    pub category: String,
}

/// One page of the command list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpPage {
    /// Text above the fields.
    pub description: String,
    /// `(category, commands)` fields.
    pub fields: Vec<(String, String)>,
}

/// Distinct categories in first-seen order.
pub fn categories(entries: &[HelpEntry]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for entry in entries {
        if !seen.contains(&entry.category) {
            seen.push(entry.category.clone());
        }
    }
    seen
}

/// Builds the pages for `category`, or for every category when it is
/// [`ALL_CATEGORIES`]. Always returns at least one page.
pub fn build_pages(entries: &[HelpEntry], category: &str, categories_per_page: usize) -> Vec<HelpPage> {
    let all = category == ALL_CATEGORIES;

    let fields: Vec<(String, String)> = categories(entries)
        .into_iter()
        .filter(|name| all || name == category)
        .map(|name| {
            let commands = entries
                .iter()
                .filter(|entry| entry.category == name)
                .map(|entry| format!("`/{}`", entry.name))
                .collect::<Vec<_>>()
                .join(", ");
            (name, commands)
        })
        .collect();

    let (description, per_page) = if all {
        (
            "Here are all available commands:".to_string(),
            categories_per_page.max(1),
        )
    } else {
        (
            format!("Here are all available commands for category: {category}"),
            MAX_FIELDS_PER_PAGE,
        )
    };

    let mut pages: Vec<HelpPage> = fields
        .chunks(per_page)
        .map(|chunk| HelpPage {
            description: description.clone(),
            fields: chunk.to_vec(),
        })
        .collect();
    if pages.is_empty() {
        pages.push(HelpPage {
            description,
            fields: Vec::new(),
        });
    }
    pages
}

/// What the command card shows about one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    /// Full name, including parent commands.
    pub qualified_name: String,
    /// Description, if any.
    pub description: Option<String>,
    /// `(name, required)` per parameter.
    pub parameters: Vec<(String, bool)>,
    /// Prefix aliases.
    pub aliases: Vec<String>,
    /// Whether the command is a group.
    pub has_subcommands: bool,
}

impl CommandSummary {
    fn from_command(command: &poise::Command<CommandContext, CommandError>) -> Self {
        Self {
            qualified_name: command.qualified_name.clone(),
            description: command.description.clone(),
            parameters: command
                .parameters
                .iter()
                .map(|param| (param.name.clone(), param.required))
                .collect(),
            aliases: command.aliases.clone(),
            has_subcommands: !command.subcommands.is_empty(),
        }
    }

    /// `/name <required> [optional]`, plus ` <subcommand>` for groups.
    pub fn usage(&self) -> String {
        let mut usage = format!("/{}", self.qualified_name);
        for (name, required) in &self.parameters {
            if *required {
                usage.push_str(&format!(" <{name}>"));
            } else {
                usage.push_str(&format!(" [{name}]"));
            }
        }
        if self.has_subcommands {
            usage.push_str(" <subcommand>");
        }
        usage
    }
}

fn footer_hint(prefix: &str) -> String {
    format!("Type {prefix}help <command> for more info on a command.")
}

/// Card for a single command, or a not-found card when `summary` is `None`.
pub fn command_embed(summary: Option<&CommandSummary>, query: &str, prefix: &str) -> CreateEmbed {
    let embed = CreateEmbed::new()
        .color(HELP_COLOR)
        .footer(CreateEmbedFooter::new(footer_hint(prefix)));

    let Some(summary) = summary else {
        return embed
            .title("Bot Help")
            .description(format!("No command found named '{query}'."));
    };

    let mut embed = embed
        .title(format!("Help for /{}", summary.qualified_name))
        .description(
            summary
                .description
                .as_deref()
                .unwrap_or("No description available."),
        )
        .field("Usage", format!("`{}`", summary.usage()), false);

    if !summary.aliases.is_empty() {
        let aliases = summary
            .aliases
            .iter()
            .map(|alias| format!("{prefix}{alias}"))
            .collect::<Vec<_>>()
            .join(", ");
        embed = embed.field("Aliases", aliases, false);
    }
    embed
}

fn find_command<'a>(
    commands: &'a [poise::Command<CommandContext, CommandError>],
    name: &str,
) -> Option<&'a poise::Command<CommandContext, CommandError>> {
    commands.iter().find_map(|command| {
        if command.qualified_name == name
            || command.name == name
            || command.aliases.iter().any(|alias| alias == name)
        {
            Some(command)
        } else {
            find_command(&command.subcommands, name)
        }
    })
}

fn help_entries(ctx: Context<'_>) -> Vec<HelpEntry> {
    ctx.framework()
        .options()
        .commands
        .iter()
        .filter(|command| !command.hide_in_help)
        .map(|command| HelpEntry {
            name: command.name.clone(),
            category: command
                .category
                .clone()
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        })
        .collect()
}

// ============================================================================
// Session view and controls
// ============================================================================

struct HelpView {
    session: SessionId,
    prefix: String,
    categories: Vec<String>,
}

impl HelpView {
    fn embed(&self, pager: &Pager<HelpPage>) -> CreateEmbed {
        let mut embed = CreateEmbed::new().title("Bot Help").color(HELP_COLOR).footer(
            CreateEmbedFooter::new(format!("{} | {}", pager.indicator(), footer_hint(&self.prefix))),
        );
        if let Some(page) = pager.current_page() {
            embed = embed.description(&page.description).fields(
                page.fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone(), false)),
            );
        }
        embed
    }

    fn controls(&self, pager: &Pager<HelpPage>) -> Vec<CreateActionRow> {
        let mut rows = Vec::with_capacity(2);

        if pager.page_count() > 1 {
            rows.push(CreateActionRow::Buttons(vec![
                CreateButton::new(component_id(self.session, "prev"))
                    .label("Prev")
                    .style(ButtonStyle::Danger)
                    .disabled(!pager.has_prev()),
                CreateButton::new(component_id(self.session, "page"))
                    .label(pager.indicator())
                    .style(ButtonStyle::Primary)
                    .disabled(true),
                CreateButton::new(component_id(self.session, "next"))
                    .label("Next")
                    .style(ButtonStyle::Success)
                    .disabled(!pager.has_next()),
                CreateButton::new(component_id(self.session, "goto"))
                    .label("Go To")
                    .style(ButtonStyle::Secondary),
            ]));
        }

        let options = std::iter::once(ALL_CATEGORIES.to_string())
            .chain(self.categories.iter().cloned())
            .map(|category| {
                let selected = category == pager.label();
                CreateSelectMenuOption::new(category.clone(), category).default_selection(selected)
            })
            .collect();
        rows.push(CreateActionRow::SelectMenu(
            CreateSelectMenu::new(
                component_id(self.session, "category"),
                CreateSelectMenuKind::String { options },
            )
            .placeholder("Select a category"),
        ));

        rows
    }
}

impl View<Pager<HelpPage>> for HelpView {
    fn screen(&self, frame: &Frame<'_, Pager<HelpPage>>) -> Screen {
        let components = if frame.controls_enabled {
            self.controls(frame.payload)
        } else {
            Vec::new()
        };
        Screen::embed(self.embed(frame.payload), components)
    }
}

struct HelpControls {
    entries: Arc<Vec<HelpEntry>>,
    categories_per_page: usize,
}

#[async_trait]
impl Controls for HelpControls {
    type Event = PagerEvent<HelpPage>;

    fn placeholder(&self) -> Self::Event {
        PagerEvent::Next
    }

    async fn decode(
        &self,
        ctx: &serenity::Context,
        action: &str,
        interaction: ComponentInteraction,
    ) -> Option<(Self::Event, Reply)> {
        let event = match action {
            "prev" => PagerEvent::Prev,
            "next" => PagerEvent::Next,
            "goto" => {
                let (value, modal) =
                    prompt_text(ctx, &interaction, "Go To Page", "Page Number", "Enter the page number")
                        .await?;
                return Some((PagerEvent::GoTo(value), Reply::Modal(modal)));
            }
            "category" => match selected_value(&interaction) {
                Some(label) => {
                    let label = label.to_string();
                    let pages = build_pages(&self.entries, &label, self.categories_per_page);
                    PagerEvent::Filter { label, pages }
                }
                None => {
                    dismiss(&ctx.http, &interaction).await;
                    return None;
                }
            },
            _ => {
                dismiss(&ctx.http, &interaction).await;
                return None;
            }
        };
        Some((event, Reply::Component(interaction)))
    }
}

#[allow(clippy::unused_async)]
async fn autocomplete_command(ctx: Context<'_>, partial: &str) -> impl Iterator<Item = String> {
    let partial = partial.to_lowercase();
    let names: Vec<String> = ctx
        .framework()
        .options()
        .commands
        .iter()
        .filter(|command| !command.hide_in_help)
        .map(|command| command.qualified_name.clone())
        .filter(|name| name.to_lowercase().contains(&partial))
        .take(25)
        .collect();
    names.into_iter()
}

/// Shows help for bot commands
#[poise::command(slash_command, prefix_command, category = "Utility")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "The command to get help for"]
    #[autocomplete = "autocomplete_command"]
    command: Option<String>,
) -> Result<(), CommandError> {
    let config = ctx.data().config.get();
    let prefix = config.discord.prefix.clone();

    if let Some(query) = command {
        let name = query.trim_start_matches('/');
        let summary = find_command(&ctx.framework().options().commands, name)
            .map(CommandSummary::from_command);
        ctx.send(CreateReply::default().embed(command_embed(summary.as_ref(), &query, &prefix)))
            .await?;
        return Ok(());
    }

    let entries = help_entries(ctx);
    let per_page = config.sessions.help_categories_per_page;
    let pages = build_pages(&entries, ALL_CATEGORIES, per_page);

    let owner = UserId(ctx.author().id.get());
    let session = Session::new(
        Feature::Help,
        owner,
        Pager::new(ALL_CATEGORIES, pages),
        config.sessions.help_window(),
    );

    let view = HelpView {
        session: session.id(),
        prefix,
        categories: categories(&entries),
    };
    let controls = HelpControls {
        entries: Arc::new(entries),
        categories_per_page: per_page,
    };
    launch(ctx, session, view, controls, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogwheel_session::Transition;

    fn entry(name: &str, category: &str) -> HelpEntry {
        HelpEntry {
            name: name.into(),
            category: category.into(),
        }
    }

    fn catalogue() -> Vec<HelpEntry> {
        vec![
            entry("help", "Utility"),
            entry("about", "Utility"),
            entry("trivia", "Games"),
            entry("memorygame", "Games"),
            entry("anilist", "AniList"),
            entry("welcome-channel", "Welcome"),
            entry("ban", "Moderation"),
            entry("ping", "Misc"),
        ]
    }

    #[test]
    fn test_all_groups_categories_per_page() {
        let pages = build_pages(&catalogue(), ALL_CATEGORIES, 4);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].description, "Here are all available commands:");
        assert_eq!(pages[0].fields.len(), 4);
        assert_eq!(pages[0].fields[0], ("Utility".to_string(), "`/help`, `/about`".to_string()));
        assert_eq!(pages[1].fields.len(), 2);
        assert_eq!(pages[1].fields[1].0, "Misc");
    }

    #[test]
    fn test_single_category_page() {
        let pages = build_pages(&catalogue(), "Games", 4);
        assert_eq!(pages.len(), 1);
        assert_eq!(
            pages[0].description,
            "Here are all available commands for category: Games"
        );
        assert_eq!(
            pages[0].fields,
            vec![("Games".to_string(), "`/trivia`, `/memorygame`".to_string())]
        );
    }

    #[test]
    fn test_unknown_category_still_has_a_page() {
        let pages = build_pages(&catalogue(), "Music", 4);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].fields.is_empty());
    }

    #[test]
    fn test_usage_marks_optional_parameters() {
        let summary = CommandSummary {
            qualified_name: "memorygame".into(),
            description: None,
            parameters: vec![("size".into(), false)],
            aliases: vec![],
            has_subcommands: false,
        };
        assert_eq!(summary.usage(), "/memorygame [size]");

        let group = CommandSummary {
            qualified_name: "anilist-compare".into(),
            description: Some("Compare".into()),
            parameters: vec![("target".into(), true)],
            aliases: vec![],
            has_subcommands: true,
        };
        assert_eq!(group.usage(), "/anilist-compare <target> <subcommand>");
    }

    #[test]
    fn test_command_embed_shows_aliases_and_fallbacks() {
        let summary = CommandSummary {
            qualified_name: "help".into(),
            description: None,
            parameters: vec![("command".into(), false)],
            aliases: vec!["h".into()],
            has_subcommands: false,
        };
        let embed = serde_json::to_value(command_embed(Some(&summary), "help", ".")).unwrap();
        assert_eq!(embed["title"], "Help for /help");
        assert_eq!(embed["description"], "No description available.");
        assert_eq!(embed["fields"][0]["value"], "`/help [command]`");
        assert_eq!(embed["fields"][1]["value"], ".h");
        assert_eq!(
            embed["footer"]["text"],
            "Type .help <command> for more info on a command."
        );

        let missing = serde_json::to_value(command_embed(None, "nope", ".")).unwrap();
        assert_eq!(missing["description"], "No command found named 'nope'.");
    }

    #[test]
    fn test_view_hides_page_buttons_for_single_page() {
        let view = HelpView {
            session: SessionId::new(),
            prefix: ".".into(),
            categories: categories(&catalogue()),
        };

        let mut pager = Pager::new(ALL_CATEGORIES, build_pages(&catalogue(), ALL_CATEGORIES, 4));
        let frame = Frame {
            payload: &pager,
            controls_enabled: true,
            ended: None,
        };
        assert_eq!(view.screen(&frame).components.len(), 2);

        pager.apply(PagerEvent::Filter {
            label: "Games".into(),
            pages: build_pages(&catalogue(), "Games", 4),
        });
        let frame = Frame {
            payload: &pager,
            controls_enabled: true,
            ended: None,
        };
        let screen = view.screen(&frame);
        assert_eq!(screen.components.len(), 1);

        let embed = serde_json::to_value(&screen.embeds[0]).unwrap();
        assert_eq!(
            embed["footer"]["text"],
            "Page 1/1 | Type .help <command> for more info on a command."
        );
    }
}
