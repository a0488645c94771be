//! Session state: identity, ownership, payload and lifecycle.

use crate::gate::InputGate;
use crate::transition::{Step, Transition};
use chrono::{DateTime, Utc};
use cogwheel_common::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// The interactive features that run sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// Paginated help menu.
    Help,
    /// Trivia quiz.
    Trivia,
    /// Memory game.
    Memory,
    /// AniList profile and list browser.
    AniListBrowser,
}

impl Feature {
    /// Stable lowercase name used in logs and component ids.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Trivia => "trivia",
            Self::Memory => "memory",
            Self::AniListBrowser => "anilist",
        }
    }

    /// Notice shown to someone pressing controls of a session they do not own.
    pub const fn rejection_notice(self) -> &'static str {
        match self {
            Self::Help => "This pagination menu is not for you.",
            Self::Trivia | Self::Memory => "This isn't your game!",
            Self::AniListBrowser => "This AniList menu belongs to someone else.",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unique session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form used to prefix component ids.
    pub fn simple(&self) -> String {
        self.0.simple().to_string()
    }

    /// Parses the short form produced by [`SessionId::simple`].
    pub fn parse(input: &str) -> Option<Self> {
        Uuid::try_parse(input).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Why a session stopped accepting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalReason {
    /// The payload reached its logical end.
    Completed,
    /// No accepted input arrived within the window.
    Expired,
    /// The owner started a newer session of the same feature.
    Replaced,
    /// The input source went away.
    Closed,
}

/// One user's in-progress exchange with a feature.
#[derive(Debug, Clone)]
pub struct Session<P> {
    id: SessionId,
    feature: Feature,
    owner: UserId,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    window: Duration,
    payload: P,
    terminal: Option<TerminalReason>,
}

impl<P> Session<P> {
    /// Creates a live session owned by `owner`.
    pub fn new(feature: Feature, owner: UserId, payload: P, window: Duration) -> Self {
        let created_at = Utc::now();
        Self {
            id: SessionId::new(),
            feature,
            owner,
            created_at,
            expires_at: deadline(created_at, window),
            window,
            payload,
            terminal: None,
        }
    }

    /// Replaces the generated id with one registered ahead of time.
    #[must_use]
    pub fn with_id(mut self, id: SessionId) -> Self {
        self.id = id;
        self
    }

    /// Session id.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Feature this session belongs to.
    pub const fn feature(&self) -> Feature {
        self.feature
    }

    /// The only user allowed to drive the session.
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// When the session was created.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the session expires unless another input is accepted.
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Inactivity window.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Read-only view of the payload.
    pub const fn current_payload(&self) -> &P {
        &self.payload
    }

    /// Why the session ended, if it has.
    pub const fn terminal(&self) -> Option<TerminalReason> {
        self.terminal
    }

    /// Whether input is no longer accepted.
    pub const fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Marks the session terminal. The first reason wins.
    pub(crate) fn terminate(&mut self, reason: TerminalReason) {
        if self.terminal.is_none() {
            self.terminal = Some(reason);
        }
    }

    /// Pushes the deadline one window past now.
    pub(crate) fn touch(&mut self) {
        self.expires_at = deadline(Utc::now(), self.window);
    }
}

impl<P: Transition> Session<P> {
    /// Runs `event` from `actor` through the gate and the transition.
    ///
    /// Returns the gate's notice when the actor is not allowed to act; the
    /// payload is untouched in that case. A step that reaches the logical end
    /// marks the session [`TerminalReason::Completed`].
    pub fn submit(&mut self, actor: UserId, event: P::Event) -> Result<Step<P::Event>, String> {
        let gate = InputGate::for_feature(self.feature);
        if !gate.authorize(actor, self) {
            return Err(gate.notice().to_string());
        }
        self.touch();
        Ok(self.apply(event))
    }

    pub(crate) fn apply(&mut self, event: P::Event) -> Step<P::Event> {
        let step = self.payload.apply(event);
        if step.terminal {
            self.terminate(TerminalReason::Completed);
        }
        step
    }
}

fn deadline(from: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(window).map_or(DateTime::<Utc>::MAX_UTC, |w| from + w)
}
