//! AniList commands: account connection, the profile and list browser,
//! profile comparison and logout.

use crate::context::{CommandContext, CommandError, Context};
use crate::discord::{
    card_embed, component_id, dismiss, launch, prompt_text, selected_value, Controls, Reply,
    Screen, View,
};
use async_trait::async_trait;
use cogwheel_anilist::card::{comparison_card, list_card, profile_card, ListPage};
use cogwheel_anilist::{
    CredentialCache, ListEntry, ListKind, ListStatus, Profile, ProviderError, RemoteDataProvider,
};
use cogwheel_common::{CogwheelError, UserId};
use cogwheel_session::{Directive, Feature, Frame, Pager, PagerEvent, Session, SessionId, Step, Transition};
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::{
    ButtonStyle, ComponentInteraction, ComponentInteractionCollector, CreateActionRow,
    CreateButton, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption,
};
use std::sync::Arc;
use tracing::{info, warn};

const NOT_AUTHENTICATED: &str = "You are not authenticated. Please use the /anilist command to log in.";
const LOGGED_OUT: &str =
    "You have been logged out from AniList. You'll need to reauthenticate to access your AniList data again.";
const NOT_LOGGED_IN: &str = "You are not currently logged in to AniList.";
const AUTH_FAILED: &str = "Failed to authenticate. Please try again.";
const FETCH_FAILED: &str = "Failed to fetch AniList data. Please try again.";

// ============================================================================
// Browser payload
// ============================================================================

/// What the browser currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserScreen {
    /// The profile card.
    Profile,
    /// One list, paginated.
    List {
        /// Anime or manga.
        kind: ListKind,
        /// Status filter.
        status: ListStatus,
        /// Pages of entries.
        pager: Pager<Vec<ListEntry>>,
        /// Entries in the whole list.
        total: usize,
    },
    /// The browser was closed; only this text remains.
    Ended(String),
}

/// Browser events. Remote data is fetched before the event is delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    /// Page navigation inside a list.
    Page(PagerEvent<Vec<ListEntry>>),
    /// Show a freshly fetched list.
    ShowList {
        /// Anime or manga.
        kind: ListKind,
        /// Status filter.
        status: ListStatus,
        /// The whole list.
        entries: Vec<ListEntry>,
    },
    /// Return to a freshly fetched profile.
    Back(Box<Profile>),
    /// A fetch failed; tell the owner and stay put.
    Failed(String),
    /// The account is no longer usable; end the browser with this text.
    Disconnected(String),
}

/// Profile and list browser state.
#[derive(Debug, Clone, PartialEq)]
pub struct Browser {
    profile: Profile,
    screen: BrowserScreen,
    per_page: usize,
}

impl Browser {
    /// Browser opened on `profile`'s card.
    pub fn new(profile: Profile, per_page: usize) -> Self {
        Self {
            profile,
            screen: BrowserScreen::Profile,
            per_page: per_page.max(1),
        }
    }

    /// Profile shown on the card.
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Current screen.
    pub const fn screen(&self) -> &BrowserScreen {
        &self.screen
    }

    /// Entries per list page.
    pub const fn per_page(&self) -> usize {
        self.per_page
    }
}

fn lift<T>(step: Step<PagerEvent<T>>) -> Step<BrowserEvent> {
    match step.directive {
        Directive::Render if step.terminal => Step::finish(),
        Directive::Render => Step::render(),
        Directive::Reject(message) => Step::reject(message),
        Directive::Deferred { .. } | Directive::Ignore => Step::ignore(),
    }
}

impl Transition for Browser {
    type Event = BrowserEvent;

    fn apply(&mut self, event: Self::Event) -> Step<Self::Event> {
        if matches!(self.screen, BrowserScreen::Ended(_)) {
            return Step::ignore();
        }

        match event {
            BrowserEvent::Page(event) => match &mut self.screen {
                BrowserScreen::List { pager, .. } => lift(pager.apply(event)),
                _ => Step::ignore(),
            },
            BrowserEvent::ShowList {
                kind,
                status,
                entries,
            } => {
                self.screen = BrowserScreen::List {
                    kind,
                    status,
                    pager: Pager::<ListEntry>::from_items(status.label(), &entries, self.per_page),
                    total: entries.len(),
                };
                Step::render()
            }
            BrowserEvent::Back(profile) => {
                self.profile = *profile;
                self.screen = BrowserScreen::Profile;
                Step::render()
            }
            BrowserEvent::Failed(message) => Step::reject(message),
            BrowserEvent::Disconnected(message) => {
                self.screen = BrowserScreen::Ended(message);
                Step::finish()
            }
        }
    }
}

// ============================================================================
// Browser view and controls
// ============================================================================

struct BrowserView {
    session: SessionId,
}

impl BrowserView {
    fn button(&self, action: &str, label: &str, style: ButtonStyle) -> CreateButton {
        CreateButton::new(component_id(self.session, action))
            .label(label)
            .style(style)
    }

    fn kind_select(&self) -> CreateActionRow {
        let options = vec![
            CreateSelectMenuOption::new("Anime List", ListKind::Anime.value()),
            CreateSelectMenuOption::new("Manga List", ListKind::Manga.value()),
        ];
        CreateActionRow::SelectMenu(
            CreateSelectMenu::new(
                component_id(self.session, "kind"),
                CreateSelectMenuKind::String { options },
            )
            .placeholder("Choose a list type"),
        )
    }

    fn status_select(&self, kind: ListKind, current: ListStatus) -> CreateActionRow {
        let options = ListStatus::ALL
            .into_iter()
            .map(|status| {
                CreateSelectMenuOption::new(status.label(), status.api_value())
                    .default_selection(status == current)
            })
            .collect();
        CreateActionRow::SelectMenu(
            CreateSelectMenu::new(
                component_id(self.session, &format!("status:{}", kind.value())),
                CreateSelectMenuKind::String { options },
            )
            .placeholder("Choose a status"),
        )
    }
}

impl View<Browser> for BrowserView {
    fn screen(&self, frame: &Frame<'_, Browser>) -> Screen {
        let browser = frame.payload;
        let live = frame.controls_enabled;

        match &browser.screen {
            BrowserScreen::Ended(message) => Screen::text(message.clone()),
            BrowserScreen::Profile => {
                let components = if live {
                    vec![
                        self.kind_select(),
                        CreateActionRow::Buttons(vec![self.button("logout", "Logout", ButtonStyle::Danger)]),
                    ]
                } else {
                    Vec::new()
                };
                Screen::embed(card_embed(&profile_card(&browser.profile)), components)
            }
            BrowserScreen::List {
                kind,
                status,
                pager,
                total,
            } => {
                let entries = pager.current_page().map_or(&[][..], Vec::as_slice);
                let card = list_card(
                    *kind,
                    *status,
                    ListPage {
                        entries,
                        number: pager.page_number(),
                        count: pager.page_count(),
                        per_page: browser.per_page,
                        total: *total,
                    },
                );

                let components = if live {
                    vec![
                        CreateActionRow::Buttons(vec![
                            self.button("first", "<<", ButtonStyle::Primary)
                                .disabled(!pager.has_prev()),
                            self.button("prev", "<", ButtonStyle::Danger)
                                .disabled(!pager.has_prev()),
                            self.button("next", ">", ButtonStyle::Success)
                                .disabled(!pager.has_next()),
                            self.button("last", ">>", ButtonStyle::Primary)
                                .disabled(!pager.has_next()),
                        ]),
                        self.status_select(*kind, *status),
                        CreateActionRow::Buttons(vec![
                            self.button("back", "Back", ButtonStyle::Secondary),
                            self.button("logout", "Logout", ButtonStyle::Danger),
                        ]),
                    ]
                } else {
                    Vec::new()
                };
                Screen::embed(card_embed(&card), components)
            }
        }
    }
}

struct BrowserControls {
    owner: UserId,
    provider: Arc<dyn RemoteDataProvider>,
    credentials: CredentialCache,
}

impl BrowserControls {
    async fn show_list(&self, kind: ListKind, status: ListStatus) -> BrowserEvent {
        let Some(token) = self.credentials.get(self.owner) else {
            return BrowserEvent::Failed(NOT_AUTHENTICATED.to_string());
        };
        match self.provider.fetch_list(&token, kind, status).await {
            Ok(entries) => BrowserEvent::ShowList {
                kind,
                status,
                entries,
            },
            Err(e) => {
                warn!(owner = %self.owner, error = ?e, "Failed to fetch AniList list");
                BrowserEvent::Failed(CogwheelError::from(e).user_message())
            }
        }
    }

    async fn back(&self) -> BrowserEvent {
        let Some(token) = self.credentials.get(self.owner) else {
            return BrowserEvent::Failed(NOT_AUTHENTICATED.to_string());
        };
        let reason = match self.provider.fetch_profile(&token).await {
            Ok(Some(profile)) => return BrowserEvent::Back(Box::new(profile)),
            Ok(None) => "profile not found".to_string(),
            Err(e) => {
                warn!(owner = %self.owner, error = ?e, "Failed to refresh AniList profile");
                if e.is_transient() {
                    return BrowserEvent::Failed(CogwheelError::from(e).user_message());
                }
                CogwheelError::from(e).user_message()
            }
        };

        warn!(owner = %self.owner, reason = %reason, "Profile refresh failed, dropping stored token");
        if let Err(e) = self.credentials.disconnect(self.owner).await {
            warn!(owner = %self.owner, error = %e, "Failed to remove stale AniList token");
        }
        BrowserEvent::Disconnected(format!("An error occurred: {reason}. Please try reconnecting."))
    }

    async fn logout(&self) -> BrowserEvent {
        match self.credentials.disconnect(self.owner).await {
            Ok(true) => {
                info!(owner = %self.owner, "AniList account disconnected");
                BrowserEvent::Disconnected(LOGGED_OUT.to_string())
            }
            Ok(false) => BrowserEvent::Disconnected(NOT_LOGGED_IN.to_string()),
            Err(e) => {
                warn!(owner = %self.owner, error = ?e, "Failed to remove AniList token");
                BrowserEvent::Failed(e.user_message())
            }
        }
    }
}

#[async_trait]
impl Controls for BrowserControls {
    type Event = BrowserEvent;

    fn placeholder(&self) -> BrowserEvent {
        BrowserEvent::Page(PagerEvent::Next)
    }

    async fn decode(
        &self,
        ctx: &serenity::Context,
        action: &str,
        interaction: ComponentInteraction,
    ) -> Option<(BrowserEvent, Reply)> {
        let page = match action {
            "first" => Some(PagerEvent::First),
            "prev" => Some(PagerEvent::Prev),
            "next" => Some(PagerEvent::Next),
            "last" => Some(PagerEvent::Last),
            _ => None,
        };
        if let Some(page) = page {
            return Some((BrowserEvent::Page(page), Reply::Component(interaction)));
        }

        let selection = match action {
            "kind" => selected_value(&interaction)
                .and_then(ListKind::parse)
                .map(|kind| (kind, ListStatus::default())),
            _ => action.strip_prefix("status:").and_then(|kind| {
                Some((
                    ListKind::parse(kind)?,
                    ListStatus::parse(selected_value(&interaction)?)?,
                ))
            }),
        };

        let reply = match (action, selection) {
            (_, Some(_)) | ("back" | "logout", None) => Reply::defer(interaction, &ctx.http).await,
            _ => {
                dismiss(&ctx.http, &interaction).await;
                return None;
            }
        };
        let event = match (action, selection) {
            (_, Some((kind, status))) => self.show_list(kind, status).await,
            ("back", None) => self.back().await,
            _ => self.logout().await,
        };
        Some((event, reply))
    }
}

async fn open_browser(ctx: Context<'_>, profile: Profile) -> Result<(), CommandError> {
    let data = ctx.data();
    let config = data.config.get();
    let owner = UserId(ctx.author().id.get());

    let session = Session::new(
        Feature::AniListBrowser,
        owner,
        Browser::new(profile, config.sessions.anilist_entries_per_page),
        config.sessions.anilist_window(),
    );
    let view = BrowserView {
        session: session.id(),
    };
    let controls = BrowserControls {
        owner,
        provider: data.anilist.clone(),
        credentials: data.credentials.clone(),
    };
    launch(ctx, session, view, controls, None).await
}

// ============================================================================
// Connect flow
// ============================================================================

/// Steps shown to a user connecting their account.
pub fn connect_instructions(link: &str) -> String {
    format!(
        "Please follow these steps to get your authorization code:\n\n\
         1. Click this link: [**Authenticate here**]({link})\n\
         2. If prompted, log in to your AniList account and authorize the application.\n\
         3. You will be redirected to a page that says 'Authorization Complete'.\n\
         4. On that page, you will see a 'PIN' or 'Authorization Code'. Copy this code.\n\
         5. Come back here and click the 'Enter Auth Code' button to enter the code you copied.\n\n\
         If you have any issues, please let me know!"
    )
}

async fn followup(http: &serenity::Http, modal: &serenity::ModalInteraction, text: &str) {
    let sent = modal
        .create_followup(
            http,
            CreateInteractionResponseFollowup::new()
                .content(text)
                .ephemeral(true),
        )
        .await;
    if let Err(e) = sent {
        warn!(error = %e, "Failed to send follow-up");
    }
}

/// Runs one code entry. Returns the connected profile on success.
async fn redeem_code(
    ctx: Context<'_>,
    click: &ComponentInteraction,
) -> Result<Option<Profile>, CommandError> {
    let serenity_ctx = ctx.serenity_context();
    let Some((code, modal)) = prompt_text(
        serenity_ctx,
        click,
        "Enter AniList Auth Code",
        "Enter your AniList authorization code",
        "Paste your auth code here...",
    )
    .await
    else {
        return Ok(None);
    };

    modal
        .create_response(
            &serenity_ctx.http,
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new().ephemeral(true)),
        )
        .await?;

    let data = ctx.data();
    let token = match data.anilist.exchange_code(code.trim()).await {
        Ok(Some(token)) => token,
        Ok(None) => {
            followup(&serenity_ctx.http, &modal, AUTH_FAILED).await;
            return Ok(None);
        }
        Err(e) => {
            warn!(error = %e, "AniList code exchange failed");
            followup(&serenity_ctx.http, &modal, AUTH_FAILED).await;
            return Ok(None);
        }
    };

    let owner = UserId(ctx.author().id.get());
    data.credentials.connect(owner, token.clone()).await?;

    match data.anilist.fetch_profile(&token).await {
        Ok(Some(profile)) => {
            info!(owner = %owner, anilist_user = %profile.name, "AniList account connected");
            followup(
                &serenity_ctx.http,
                &modal,
                &format!("Connected to AniList as {}.", profile.name),
            )
            .await;
            Ok(Some(profile))
        }
        Ok(None) | Err(_) => {
            followup(&serenity_ctx.http, &modal, FETCH_FAILED).await;
            Ok(None)
        }
    }
}

/// Connect your AniList account or browse your profile
#[poise::command(slash_command, category = "AniList")]
pub async fn anilist(ctx: Context<'_>) -> Result<(), CommandError> {
    let data = ctx.data();
    let owner = UserId(ctx.author().id.get());

    if let Some(token) = data.credentials.get(owner) {
        ctx.defer().await?;
        return match data.anilist.fetch_profile(&token).await {
            Ok(Some(profile)) => open_browser(ctx, profile).await,
            Ok(None) | Err(_) => {
                ctx.say(FETCH_FAILED).await?;
                Ok(())
            }
        };
    }

    let config = data.config.get();
    if !config.anilist.is_configured() {
        ctx.send(
            CreateReply::default()
                .content("AniList integration is not configured on this bot.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let button_id = format!("{}:anilist-code", ctx.id());
    ctx.send(
        CreateReply::default()
            .content(connect_instructions(&config.anilist.authorization_link()))
            .components(vec![CreateActionRow::Buttons(vec![CreateButton::new(
                button_id.clone(),
            )
            .label("Enter Auth Code")
            .style(ButtonStyle::Success)])])
            .ephemeral(true),
    )
    .await?;

    while let Some(click) = ComponentInteractionCollector::new(ctx.serenity_context())
        .author_id(ctx.author().id)
        .custom_ids(vec![button_id.clone()])
        .timeout(config.sessions.anilist_window())
        .await
    {
        if let Some(profile) = redeem_code(ctx, &click).await? {
            return open_browser(ctx, profile).await;
        }
    }

    Ok(())
}

// ============================================================================
// Compare and logout
// ============================================================================

/// Discord user id in `target`, accepting a bare id or a mention.
pub fn parse_user_target(target: &str) -> Option<u64> {
    let trimmed = target.trim();
    let inner = trimmed
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map_or(trimmed, |rest| rest.trim_start_matches('!'));
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    inner.parse().ok()
}

enum CompareTarget {
    Found(Profile),
    NotConnected,
    Missing,
}

async fn resolve_target(data: &CommandContext, target: &str) -> Result<CompareTarget, ProviderError> {
    let profile = match parse_user_target(target) {
        Some(id) => {
            let Some(token) = data.credentials.get(UserId(id)) else {
                return Ok(CompareTarget::NotConnected);
            };
            data.anilist.fetch_profile(&token).await?
        }
        None => data.anilist.fetch_profile_by_name(target.trim()).await?,
    };
    Ok(profile.map_or(CompareTarget::Missing, CompareTarget::Found))
}

/// Compare your AniList profile with another user's
#[poise::command(
    slash_command,
    prefix_command,
    rename = "anilist-compare",
    category = "AniList"
)]
pub async fn anilist_compare(
    ctx: Context<'_>,
    #[description = "AniList user name or Discord user ID to compare with"] target: String,
) -> Result<(), CommandError> {
    let data = ctx.data();
    let owner = UserId(ctx.author().id.get());

    let Some(token) = data.credentials.get(owner) else {
        ctx.send(
            CreateReply::default()
                .content("You need to connect your AniList account first.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };

    ctx.defer().await?;

    let own = match data.anilist.fetch_profile(&token).await {
        Ok(Some(profile)) => profile,
        Ok(None) | Err(_) => {
            ctx.say(FETCH_FAILED).await?;
            return Ok(());
        }
    };

    let other = match resolve_target(data, &target).await {
        Ok(CompareTarget::Found(profile)) => profile,
        Ok(CompareTarget::NotConnected) => {
            ctx.say("The specified Discord user hasn't connected their AniList account.")
                .await?;
            return Ok(());
        }
        Ok(CompareTarget::Missing) => {
            ctx.say("Couldn't find AniList data for the specified user.")
                .await?;
            return Ok(());
        }
        Err(e) => {
            warn!(error = ?e, target = %target, "AniList comparison failed");
            let message = CogwheelError::from(e).user_message();
            ctx.say(format!("An error occurred during comparison: {message}"))
                .await?;
            return Ok(());
        }
    };

    ctx.send(CreateReply::default().embed(card_embed(&comparison_card(&own, &other))))
        .await?;
    Ok(())
}

/// Disconnect your AniList account
#[poise::command(slash_command, rename = "anilist-logout", category = "AniList")]
pub async fn anilist_logout(ctx: Context<'_>) -> Result<(), CommandError> {
    let owner = UserId(ctx.author().id.get());
    let removed = ctx.data().credentials.disconnect(owner).await?;
    if removed {
        info!(owner = %owner, "AniList account disconnected");
    }

    ctx.send(
        CreateReply::default()
            .content(if removed { LOGGED_OUT } else { NOT_LOGGED_IN })
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogwheel_anilist::{Media, MediaTitle, SledCredentialStore};
    use cogwheel_common::test_utils::create_temp_dir;

    /// Provider whose every call fails before reaching a server.
    struct Unreachable;

    impl Unreachable {
        async fn fail<T>() -> std::result::Result<T, ProviderError> {
            let err = reqwest::Client::new()
                .get("http://127.0.0.1:1/graphql")
                .send()
                .await
                .unwrap_err();
            Err(err.into())
        }
    }

    #[async_trait]
    impl RemoteDataProvider for Unreachable {
        async fn fetch_profile(&self, _token: &str) -> std::result::Result<Option<Profile>, ProviderError> {
            Self::fail().await
        }

        async fn fetch_profile_by_name(
            &self,
            _username: &str,
        ) -> std::result::Result<Option<Profile>, ProviderError> {
            Self::fail().await
        }

        async fn fetch_list(
            &self,
            _token: &str,
            _kind: ListKind,
            _status: ListStatus,
        ) -> std::result::Result<Vec<ListEntry>, ProviderError> {
            Self::fail().await
        }

        async fn exchange_code(&self, _code: &str) -> std::result::Result<Option<String>, ProviderError> {
            Self::fail().await
        }
    }

    fn assert_clean(text: &str) {
        for detail in ["127.0.0.1", "http://", "os error", "Connection refused"] {
            assert!(!text.contains(detail), "user text leaks {detail:?}: {text}");
        }
    }

    fn profile(name: &str) -> Profile {
        Profile {
            name: name.into(),
            site_url: format!("https://anilist.co/user/{name}"),
            ..Profile::default()
        }
    }

    fn entries(n: usize) -> Vec<ListEntry> {
        (1..=n)
            .map(|i| ListEntry {
                media: Media {
                    title: MediaTitle {
                        romaji: Some(format!("Show {i}")),
                        english: None,
                    },
                    episodes: Some(12),
                    ..Media::default()
                },
                progress: Some(3),
                score: Some(8.0),
                ..ListEntry::default()
            })
            .collect()
    }

    fn frame(browser: &Browser) -> Frame<'_, Browser> {
        Frame {
            payload: browser,
            controls_enabled: true,
            ended: None,
        }
    }

    #[test]
    fn test_show_list_paginates_entries() {
        let mut browser = Browser::new(profile("Edward"), 6);
        let step = browser.apply(BrowserEvent::ShowList {
            kind: ListKind::Anime,
            status: ListStatus::Current,
            entries: entries(13),
        });
        assert_eq!(step, Step::render());

        let BrowserScreen::List { pager, total, .. } = browser.screen() else {
            panic!("expected the list screen");
        };
        assert_eq!(*total, 13);
        assert_eq!(pager.page_count(), 3);

        browser.apply(BrowserEvent::Page(PagerEvent::Last));
        let BrowserScreen::List { pager, .. } = browser.screen() else {
            panic!("expected the list screen");
        };
        assert_eq!(pager.current_page().map(Vec::len), Some(1));
    }

    #[test]
    fn test_paging_on_profile_is_ignored() {
        let mut browser = Browser::new(profile("Edward"), 6);
        assert_eq!(browser.apply(BrowserEvent::Page(PagerEvent::Next)), Step::ignore());
        assert_eq!(browser.screen(), &BrowserScreen::Profile);
    }

    #[test]
    fn test_back_replaces_profile() {
        let mut browser = Browser::new(profile("Edward"), 6);
        browser.apply(BrowserEvent::ShowList {
            kind: ListKind::Manga,
            status: ListStatus::Paused,
            entries: Vec::new(),
        });
        browser.apply(BrowserEvent::Back(Box::new(profile("Alphonse"))));

        assert_eq!(browser.screen(), &BrowserScreen::Profile);
        assert_eq!(browser.profile().name, "Alphonse");
    }

    #[test]
    fn test_failure_rejects_without_change() {
        let mut browser = Browser::new(profile("Edward"), 6);
        let step = browser.apply(BrowserEvent::Failed("An error occurred: boom".into()));
        assert_eq!(step, Step::reject("An error occurred: boom"));
        assert_eq!(browser.screen(), &BrowserScreen::Profile);
    }

    #[test]
    fn test_disconnect_ends_browser() {
        let mut browser = Browser::new(profile("Edward"), 6);
        let step = browser.apply(BrowserEvent::Disconnected(LOGGED_OUT.into()));
        assert_eq!(step, Step::finish());
        assert_eq!(browser.apply(BrowserEvent::Page(PagerEvent::Next)), Step::ignore());

        let screen = BrowserView {
            session: SessionId::new(),
        }
        .screen(&frame(&browser));
        assert_eq!(screen.content, LOGGED_OUT);
        assert!(screen.components.is_empty());
    }

    #[test]
    fn test_list_screen_footer_and_controls() {
        let mut browser = Browser::new(profile("Edward"), 6);
        browser.apply(BrowserEvent::ShowList {
            kind: ListKind::Anime,
            status: ListStatus::Completed,
            entries: entries(8),
        });

        let screen = BrowserView {
            session: SessionId::new(),
        }
        .screen(&frame(&browser));
        assert_eq!(screen.components.len(), 3);

        let embed = serde_json::to_value(&screen.embeds[0]).unwrap();
        assert_eq!(embed["title"], "Anime List - Completed");
        assert_eq!(embed["footer"]["text"], "Page 1/2 | Showing entries 1-6 out of 8");
        assert_eq!(embed["fields"][0]["value"], "Progress: 3/12 episodes\nScore: 8/10");
    }

    #[test]
    fn test_parse_user_target() {
        assert_eq!(parse_user_target("123456789"), Some(123_456_789));
        assert_eq!(parse_user_target("<@123>"), Some(123));
        assert_eq!(parse_user_target("<@!123>"), Some(123));
        assert_eq!(parse_user_target("Edward"), None);
        assert_eq!(parse_user_target("12ab"), None);
        assert_eq!(parse_user_target(""), None);
    }

    #[test]
    fn test_instructions_embed_link() {
        let text = connect_instructions("https://anilist.co/api/v2/oauth/authorize?client_id=1");
        assert!(text.contains(
            "1. Click this link: [**Authenticate here**](https://anilist.co/api/v2/oauth/authorize?client_id=1)"
        ));
        assert!(text.contains("5. Come back here"));
    }

    #[tokio::test]
    async fn test_unreachable_anilist_shows_generic_text() {
        let dir = create_temp_dir();
        let db = sled::open(dir.path().join("db")).unwrap();
        let credentials = CredentialCache::new(Arc::new(SledCredentialStore::new(&db).unwrap()));
        let owner = UserId(42);
        credentials.connect(owner, "token".into()).await.unwrap();

        let controls = BrowserControls {
            owner,
            provider: Arc::new(Unreachable),
            credentials: credentials.clone(),
        };

        let BrowserEvent::Failed(text) = controls.show_list(ListKind::Anime, ListStatus::Current).await
        else {
            panic!("expected a failure notice");
        };
        assert_clean(&text);

        let BrowserEvent::Failed(text) = controls.back().await else {
            panic!("a transport failure must not disconnect the account");
        };
        assert_clean(&text);
        assert!(credentials.is_connected(owner));
    }
}
