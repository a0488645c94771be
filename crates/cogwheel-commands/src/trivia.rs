//! Trivia quiz command and its Open Trivia DB question source

use crate::context::{CommandError, Context};
use crate::discord::{component_id, dismiss, launch, Controls, Reply, Screen, View};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cogwheel_common::{capitalize, CogwheelError, Result};
use cogwheel_config::TriviaConfig;
use cogwheel_session::{
    Feature, Frame, Letter, Question, Session, SessionId, Trivia, TriviaEvent, TriviaPhase,
};
use poise::serenity_prelude as serenity;
use reqwest::Client;
use serde::Deserialize;
use serenity::{
    ButtonStyle, ComponentInteraction, CreateActionRow, CreateButton, CreateEmbed,
    CreateEmbedFooter,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const TRIVIA_COLOR: u32 = 0x3498DB;

/// Where trivia questions come from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetches one multiple choice question with its answers shuffled.
    async fn next_question(&self) -> Result<Question>;
}

#[derive(Debug, Deserialize)]
struct TriviaResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    category: String,
    difficulty: String,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

/// Questions from the Open Trivia DB, requested base64 encoded.
#[derive(Debug, Clone)]
pub struct OpenTriviaSource {
    client: Client,
    api_url: String,
}

impl OpenTriviaSource {
    /// Builds the source from configuration.
    pub fn new(config: &TriviaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CogwheelError::network_with_source("Failed to create trivia HTTP client", e))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }
}

fn decode_field(value: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(value)
        .map_err(|e| CogwheelError::validation(format!("Invalid base64 in trivia field: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| CogwheelError::validation(format!("Trivia field is not UTF-8: {e}")))
}

#[async_trait]
impl QuestionSource for OpenTriviaSource {
    #[instrument(skip(self))]
    async fn next_question(&self) -> Result<Question> {
        let response: TriviaResponse = self
            .client
            .get(&self.api_url)
            .query(&[("amount", "1"), ("type", "multiple"), ("encode", "base64")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.response_code != 0 {
            return Err(CogwheelError::network(format!(
                "Trivia API returned response code {}",
                response.response_code
            )));
        }
        let raw = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CogwheelError::network("Trivia API returned no questions"))?;

        let incorrect = raw
            .incorrect_answers
            .iter()
            .map(|answer| decode_field(answer))
            .collect::<Result<Vec<_>>>()?;

        let question = Question::shuffled(
            decode_field(&raw.category)?,
            decode_field(&raw.difficulty)?,
            decode_field(&raw.question)?,
            decode_field(&raw.correct_answer)?,
            incorrect,
            &mut rand::rng(),
        )?;

        debug!(category = %question.category, "Fetched trivia question");
        Ok(question)
    }
}

// ============================================================================
// Session view and controls
// ============================================================================

struct TriviaView {
    session: SessionId,
    seconds: u64,
}

impl TriviaView {
    fn embed(&self, trivia: &Trivia) -> CreateEmbed {
        let question = trivia.question();
        let choices = question
            .choices()
            .map(|(letter, answer)| format!("**{letter}:** {answer}"))
            .collect::<Vec<_>>()
            .join("\n");

        CreateEmbed::new()
            .title(format!(
                "**Category:** {} | **Difficulty:** {}",
                question.category,
                capitalize(&question.difficulty)
            ))
            .description(format!("**Question:**\n*{}*\n\n{choices}", question.prompt))
            .color(TRIVIA_COLOR)
            .footer(CreateEmbedFooter::new(format!(
                "You have {} seconds to answer! | Current score: {}",
                self.seconds,
                trivia.score()
            )))
    }

    fn buttons(&self, trivia: &Trivia, enabled: bool) -> Vec<CreateActionRow> {
        match trivia.phase() {
            TriviaPhase::Asking => {
                let buttons = trivia
                    .question()
                    .choices()
                    .map(|(letter, _)| {
                        CreateButton::new(component_id(self.session, &format!("answer:{letter}")))
                            .label(letter.to_string())
                            .style(ButtonStyle::Primary)
                            .disabled(!enabled)
                    })
                    .collect();
                vec![CreateActionRow::Buttons(buttons)]
            }
            TriviaPhase::Answered { .. } => vec![CreateActionRow::Buttons(vec![
                CreateButton::new(component_id(self.session, "continue"))
                    .label("Next Question")
                    .style(ButtonStyle::Success)
                    .disabled(!enabled),
            ])],
        }
    }
}

impl View<Trivia> for TriviaView {
    fn screen(&self, frame: &Frame<'_, Trivia>) -> Screen {
        let trivia = frame.payload;
        let mut screen = Screen::embed(self.embed(trivia), self.buttons(trivia, frame.controls_enabled));
        if let Some(feedback) = trivia.feedback() {
            screen.content = feedback;
        }
        screen
    }
}

struct TriviaControls {
    questions: Arc<dyn QuestionSource>,
}

#[async_trait]
impl Controls for TriviaControls {
    type Event = TriviaEvent;

    fn placeholder(&self) -> TriviaEvent {
        TriviaEvent::Answer(Letter::A)
    }

    async fn decode(
        &self,
        ctx: &serenity::Context,
        action: &str,
        interaction: ComponentInteraction,
    ) -> Option<(TriviaEvent, Reply)> {
        if let Some(letter) = action.strip_prefix("answer:").and_then(Letter::parse) {
            return Some((TriviaEvent::Answer(letter), Reply::Component(interaction)));
        }
        if action != "continue" {
            dismiss(&ctx.http, &interaction).await;
            return None;
        }

        let reply = Reply::defer(interaction, &ctx.http).await;
        match self.questions.next_question().await {
            Ok(question) => Some((TriviaEvent::Continue(Box::new(question)), reply)),
            Err(e) => {
                warn!(error = %e, "Failed to fetch next trivia question");
                if let Err(e) = reply
                    .whisper(&ctx.http, "Failed to fetch a trivia question. Please try again.")
                    .await
                {
                    warn!(error = %e, "Failed to report trivia fetch failure");
                }
                None
            }
        }
    }
}

/// Start a trivia quiz
#[poise::command(slash_command, prefix_command, category = "Games")]
pub async fn trivia(ctx: Context<'_>) -> std::result::Result<(), CommandError> {
    ctx.defer().await?;

    let question = match ctx.data().questions.next_question().await {
        Ok(question) => question,
        Err(e) => {
            warn!(error = %e, "Failed to fetch trivia question");
            ctx.say("Failed to fetch a trivia question. Please try again later.")
                .await?;
            return Ok(());
        }
    };

    let window = ctx.data().config.get().sessions.trivia_window();
    let owner = cogwheel_common::UserId(ctx.author().id.get());
    let session = Session::new(Feature::Trivia, owner, Trivia::new(question), window);

    let view = TriviaView {
        session: session.id(),
        seconds: window.as_secs(),
    };
    let controls = TriviaControls {
        questions: ctx.data().questions.clone(),
    };
    launch(ctx, session, view, controls, None).await
}
