//! Discord bindings for interactive sessions.
//!
//! A session message carries components whose custom ids look like
//! `"{session}:{action}"`. A pump task collects clicks on that message,
//! turns them into session events through a feature's [`Controls`] and feeds
//! them to the [`SessionDriver`]. Drawing goes through a [`View`] wrapped in
//! a [`DiscordRenderer`].

use crate::context::{CommandError, Context};
use async_trait::async_trait;
use cogwheel_anilist::Card;
use cogwheel_common::{CogwheelError, Result, UserId};
use cogwheel_session::{
    Frame, Input, KeepAlive, Lease, Notifier, Renderer, Session, SessionDriver, SessionId, Transition,
};
use futures::{Stream, StreamExt};
use poise::serenity_prelude as serenity;
use serenity::{
    ActionRowComponent, ChannelId, ComponentInteraction, ComponentInteractionCollector,
    ComponentInteractionDataKind, CreateActionRow, CreateEmbed, CreateEmbedFooter,
    CreateInputText, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateModal, EditInteractionResponse, EditMessage, Http,
    InputTextStyle, MessageId, ModalInteraction, ModalInteractionCollector,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Inputs buffered per session before the pump waits for the driver.
const INPUT_BUFFER: usize = 16;

/// How long a text prompt (modal) stays open.
pub const MODAL_TIMEOUT: Duration = Duration::from_secs(120);

// ============================================================================
// Component ids
// ============================================================================

/// Custom id for a component of `session`.
pub fn component_id(session: SessionId, action: &str) -> String {
    format!("{}:{action}", session.simple())
}

/// Splits a custom id into its session and action.
pub fn parse_component_id(custom_id: &str) -> Option<(SessionId, &str)> {
    let (session, action) = custom_id.split_once(':')?;
    Some((SessionId::parse(session)?, action))
}

/// First selected value of a select menu interaction.
pub fn selected_value(interaction: &ComponentInteraction) -> Option<&str> {
    match &interaction.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => {
            values.first().map(String::as_str)
        }
        _ => None,
    }
}

// ============================================================================
// Reply handles
// ============================================================================

/// The interaction a rendered frame answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A click not yet answered.
    Component(ComponentInteraction),
    /// A click answered with a deferred update while slow work ran.
    Deferred(ComponentInteraction),
    /// A modal submitted from a component on the session message.
    Modal(ModalInteraction),
}

impl Reply {
    async fn respond(&self, http: &Http, response: CreateInteractionResponse) -> serenity::Result<()> {
        match self {
            Self::Component(interaction) | Self::Deferred(interaction) => {
                interaction.create_response(http, response).await
            }
            Self::Modal(interaction) => interaction.create_response(http, response).await,
        }
    }

    /// Defers the update of a click so slow work can run before rendering.
    pub async fn defer(interaction: ComponentInteraction, http: &Http) -> Self {
        if let Err(e) = interaction.defer(http).await {
            warn!(error = %e, "Failed to defer component interaction");
            return Self::Component(interaction);
        }
        Self::Deferred(interaction)
    }

    /// Answers the interaction with a message only the actor can see.
    pub async fn whisper(&self, http: &Http, message: &str) -> serenity::Result<()> {
        match self {
            Self::Deferred(interaction) => interaction
                .create_followup(
                    http,
                    CreateInteractionResponseFollowup::new()
                        .content(message)
                        .ephemeral(true),
                )
                .await
                .map(|_| ()),
            _ => {
                self.respond(
                    http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content(message)
                            .ephemeral(true),
                    ),
                )
                .await
            }
        }
    }
}

/// Answers a click that maps to no event so Discord stops waiting on it.
pub async fn dismiss(http: &Http, interaction: &ComponentInteraction) {
    if let Err(e) = interaction
        .create_response(http, CreateInteractionResponse::Acknowledge)
        .await
    {
        warn!(error = %e, "Failed to acknowledge component interaction");
    }
}

// ============================================================================
// Screens and views
// ============================================================================

/// Everything shown on a session message.
#[derive(Debug, Clone, Default)]
pub struct Screen {
    /// Plain message text.
    pub content: String,
    /// Embeds, replacing any previous ones.
    pub embeds: Vec<CreateEmbed>,
    /// Component rows, replacing any previous ones.
    pub components: Vec<CreateActionRow>,
}

impl Screen {
    /// Screen with a single embed.
    pub fn embed(embed: CreateEmbed, components: Vec<CreateActionRow>) -> Self {
        Self {
            content: String::new(),
            embeds: vec![embed],
            components,
        }
    }

    /// Screen with text only.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    fn update(self) -> CreateInteractionResponseMessage {
        CreateInteractionResponseMessage::new()
            .content(self.content)
            .embeds(self.embeds)
            .components(self.components)
    }

    pub(crate) fn edit(self) -> EditMessage {
        EditMessage::new()
            .content(self.content)
            .embeds(self.embeds)
            .components(self.components)
    }

    fn edit_response(self) -> EditInteractionResponse {
        EditInteractionResponse::new()
            .content(self.content)
            .embeds(self.embeds)
            .components(self.components)
    }

    fn reply(self) -> poise::CreateReply {
        let mut reply = poise::CreateReply::default().components(self.components);
        if !self.content.is_empty() {
            reply = reply.content(self.content);
        }
        for embed in self.embeds {
            reply = reply.embed(embed);
        }
        reply
    }
}

/// Draws a session payload.
pub trait View<P>: Send + Sync + 'static {
    /// Screen for `frame`.
    fn screen(&self, frame: &Frame<'_, P>) -> Screen;
}

/// Embed for a renderer-agnostic card.
pub fn card_embed(card: &Card) -> CreateEmbed {
    let mut embed = CreateEmbed::new().title(&card.title).color(card.color);
    if let Some(url) = &card.url {
        embed = embed.url(url);
    }
    if let Some(description) = &card.description {
        embed = embed.description(description);
    }
    if let Some(thumbnail) = &card.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    if let Some(image) = &card.image {
        embed = embed.image(image);
    }
    if let Some(footer) = &card.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    embed.fields(
        card.fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone(), field.inline)),
    )
}

// ============================================================================
// Renderer and notifier
// ============================================================================

/// Renders frames onto one session message.
pub struct DiscordRenderer<V> {
    http: Arc<Http>,
    channel: ChannelId,
    message: MessageId,
    view: V,
}

impl<V> DiscordRenderer<V> {
    /// Renderer for the message `message` in `channel`.
    pub const fn new(http: Arc<Http>, channel: ChannelId, message: MessageId, view: V) -> Self {
        Self {
            http,
            channel,
            message,
            view,
        }
    }
}

#[async_trait]
impl<P, V> Renderer<P, Reply> for DiscordRenderer<V>
where
    P: Send + Sync,
    V: View<P>,
{
    async fn render(&self, handle: Option<&Reply>, frame: Frame<'_, P>) -> Result<()> {
        let screen = self.view.screen(&frame);
        let http = self.http.as_ref();

        let outcome = match handle {
            Some(Reply::Deferred(interaction)) => interaction
                .edit_response(http, screen.edit_response())
                .await
                .map(|_| ()),
            Some(reply) => {
                reply
                    .respond(http, CreateInteractionResponse::UpdateMessage(screen.update()))
                    .await
            }
            None => self
                .channel
                .edit_message(http, self.message, screen.edit())
                .await
                .map(|_| ()),
        };

        outcome.map_err(|e| CogwheelError::discord_with_source("Failed to update session message", e))
    }

    async fn acknowledge(&self, handle: &Reply) -> Result<()> {
        if matches!(handle, Reply::Deferred(_)) {
            return Ok(());
        }
        handle
            .respond(self.http.as_ref(), CreateInteractionResponse::Acknowledge)
            .await
            .map_err(|e| CogwheelError::discord_with_source("Failed to acknowledge interaction", e))
    }
}

/// Sends ephemeral notices in answer to an interaction.
pub struct EphemeralNotifier {
    http: Arc<Http>,
}

impl EphemeralNotifier {
    /// Notifier using `http`.
    pub const fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Notifier<Reply> for EphemeralNotifier {
    async fn notify(&self, handle: &Reply, actor: UserId, message: &str) -> Result<()> {
        debug!(actor = %actor, message, "Sending ephemeral notice");
        handle
            .whisper(self.http.as_ref(), message)
            .await
            .map_err(|e| CogwheelError::discord_with_source("Failed to send notice", e))
    }
}

// ============================================================================
// Controls and pump
// ============================================================================

/// Translates clicks on a session message into session events.
#[async_trait]
pub trait Controls: Send + Sync + 'static {
    /// Event type of the session.
    type Event: Send + 'static;

    /// Cheap event forwarded for clicks by someone other than the owner.
    /// The input gate rejects those before the event is looked at.
    fn placeholder(&self) -> Self::Event;

    /// Event for an owner's click. Returning `None` drops the click; the
    /// implementation must have answered the interaction itself, e.g. with
    /// [`dismiss`].
    ///
    /// Runs beside the click loop, so it may wait on prompts or remote calls.
    async fn decode(
        &self,
        ctx: &serenity::Context,
        action: &str,
        interaction: ComponentInteraction,
    ) -> Option<(Self::Event, Reply)>;
}

/// Routes clicks into a session's input channel.
///
/// Clicks by anyone but `owner` go out at once, so the gate answers them
/// even while an owner click is still being decoded. Owner clicks are decoded
/// one at a time, in order, on a worker task; the expiry window is extended
/// every `period` while a decode is in flight.
async fn route_clicks<T, E, H, S, R, D, F>(
    mut clicks: S,
    owner: UserId,
    inputs: mpsc::Sender<Input<E, H>>,
    keep_alive: KeepAlive,
    period: Duration,
    reject: R,
    decode: D,
) where
    T: Send + 'static,
    E: Send + 'static,
    H: Send + 'static,
    S: Stream<Item = (UserId, T)> + Unpin,
    R: Fn(UserId, T) -> Input<E, H>,
    D: Fn(T) -> F + Send + 'static,
    F: Future<Output = Option<Input<E, H>>> + Send + 'static,
{
    let (owner_tx, mut owner_rx) = mpsc::channel::<T>(INPUT_BUFFER);
    let owner_inputs = inputs.clone();
    let period = period.max(Duration::from_millis(100));

    let worker = tokio::spawn(async move {
        while let Some(click) = owner_rx.recv().await {
            let pending = decode(click);
            tokio::pin!(pending);
            let mut ticks = tokio::time::interval(period);

            let decoded = loop {
                tokio::select! {
                    decoded = &mut pending => break decoded,
                    _ = ticks.tick() => keep_alive.extend(),
                }
            };
            if let Some(input) = decoded {
                if owner_inputs.send(input).await.is_err() {
                    break;
                }
            }
        }
    });

    loop {
        let (actor, click) = tokio::select! {
            () = inputs.closed() => {
                worker.abort();
                return;
            }
            next = clicks.next() => match next {
                Some(click) => click,
                None => break,
            },
        };

        let routed = if actor == owner {
            owner_tx.send(click).await.is_ok()
        } else {
            inputs.send(reject(actor, click)).await.is_ok()
        };
        if !routed {
            worker.abort();
            return;
        }
    }

    drop(owner_tx);
    if let Err(e) = worker.await {
        if !e.is_cancelled() {
            warn!(error = %e, "Owner click worker failed");
        }
    }
}

fn spawn_pump<P, C: Controls>(
    ctx: serenity::Context,
    message: MessageId,
    session: &Session<P>,
    controls: C,
    inputs: mpsc::Sender<Input<C::Event, Reply>>,
    keep_alive: KeepAlive,
) {
    let controls = Arc::new(controls);
    let (owner, period) = (session.owner(), session.window() / 2);
    let session = session.id();

    tokio::spawn(async move {
        let clicks = ComponentInteractionCollector::new(&ctx)
            .message_id(message)
            .stream()
            .filter_map(move |interaction| {
                let action = parse_component_id(&interaction.data.custom_id)
                    .filter(|(id, _)| *id == session)
                    .map(|(_, action)| action.to_string());
                let actor = UserId(interaction.user.id.get());
                futures::future::ready(action.map(|action| (actor, (action, interaction))))
            });

        let reject = {
            let controls = controls.clone();
            move |actor, (_, interaction): (String, ComponentInteraction)| {
                Input::new(actor, controls.placeholder(), Reply::Component(interaction))
            }
        };
        let decode = move |(action, interaction): (String, ComponentInteraction)| {
            let controls = controls.clone();
            let ctx = ctx.clone();
            async move {
                controls
                    .decode(&ctx, &action, interaction)
                    .await
                    .map(|(event, reply)| Input::new(owner, event, reply))
            }
        };

        route_clicks(Box::pin(clicks), owner, inputs, keep_alive, period, reject, decode).await;
        debug!(session_id = %session, "Component pump stopped");
    });
}

/// Starts a session on a new message, or on `existing` when given.
///
/// Any earlier session of the same feature and owner is replaced.
pub async fn launch<P, V, C>(
    ctx: Context<'_>,
    session: Session<P>,
    view: V,
    controls: C,
    existing: Option<serenity::Message>,
) -> std::result::Result<(), CommandError>
where
    P: Transition + Send + Sync + 'static,
    P::Event: Send + 'static,
    V: View<P>,
    C: Controls<Event = P::Event>,
{
    let lease = ctx
        .data()
        .sessions
        .begin(session.feature(), session.owner(), session.id());
    launch_leased(ctx, session, view, controls, existing, lease).await
}

/// Like [`launch`], for a session registered earlier through `lease`.
pub async fn launch_leased<P, V, C>(
    ctx: Context<'_>,
    session: Session<P>,
    view: V,
    controls: C,
    existing: Option<serenity::Message>,
    lease: Lease,
) -> std::result::Result<(), CommandError>
where
    P: Transition + Send + Sync + 'static,
    P::Event: Send + 'static,
    V: View<P>,
    C: Controls<Event = P::Event>,
{
    let screen = view.screen(&Frame {
        payload: session.current_payload(),
        controls_enabled: true,
        ended: None,
    });

    let message = match existing {
        Some(mut message) => {
            message.edit(ctx.serenity_context(), screen.edit()).await?;
            message
        }
        None => ctx.send(screen.reply()).await?.into_message().await?,
    };

    let http = ctx.serenity_context().http.clone();
    let renderer = Arc::new(DiscordRenderer::new(
        http.clone(),
        message.channel_id,
        message.id,
        view,
    ));
    let notifier = Arc::new(EphemeralNotifier::new(http));

    let (tx, rx) = mpsc::channel(INPUT_BUFFER);
    let keep_alive = KeepAlive::new();
    spawn_pump(
        ctx.serenity_context().clone(),
        message.id,
        &session,
        controls,
        tx,
        keep_alive.clone(),
    );
    SessionDriver::new(session, renderer, notifier)
        .with_lease(lease)
        .with_keep_alive(keep_alive)
        .spawn(rx);
    Ok(())
}

// ============================================================================
// Text prompts
// ============================================================================

/// Opens a one-field modal in answer to `interaction` and waits for it.
///
/// Returns the entered text and the modal interaction, which still has to be
/// answered. `None` when the prompt could not be shown or timed out.
pub async fn prompt_text(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    title: &str,
    label: &str,
    placeholder: &str,
) -> Option<(String, ModalInteraction)> {
    let modal_id = format!("{}:modal", interaction.id);
    let modal = CreateModal::new(&modal_id, title).components(vec![CreateActionRow::InputText(
        CreateInputText::new(InputTextStyle::Short, label, "value")
            .placeholder(placeholder)
            .required(true),
    )]);

    if let Err(e) = interaction
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await
    {
        warn!(error = %e, "Failed to open modal");
        return None;
    }

    let submitted = ModalInteractionCollector::new(ctx)
        .custom_ids(vec![modal_id])
        .timeout(MODAL_TIMEOUT)
        .await?;

    let value = submitted
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) => input.value.clone(),
            _ => None,
        })
        .unwrap_or_default();

    Some((value, submitted))
}
