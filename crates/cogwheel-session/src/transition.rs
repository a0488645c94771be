//! The per-feature state update contract.

use std::time::Duration;

/// What the driver should do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<E> {
    /// Redraw the session.
    Render,
    /// Leave the payload as is and tell the actor why.
    Reject(String),
    /// Redraw now, then apply `event` after `delay` and redraw again.
    Deferred {
        /// How long the intermediate state stays visible.
        delay: Duration,
        /// Follow-up event applied once the delay has passed.
        event: E,
    },
    /// Nothing changed; acknowledge the interaction without redrawing.
    Ignore,
}

/// Result of applying one event to a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<E> {
    /// Rendering instruction.
    pub directive: Directive<E>,
    /// Whether the payload reached its logical end.
    pub terminal: bool,
}

impl<E> Step<E> {
    /// Redraw and keep going.
    pub const fn render() -> Self {
        Self {
            directive: Directive::Render,
            terminal: false,
        }
    }

    /// Redraw a final state.
    pub const fn finish() -> Self {
        Self {
            directive: Directive::Render,
            terminal: true,
        }
    }

    /// Reject with a message for the actor.
    pub fn reject(message: impl Into<String>) -> Self {
        Self {
            directive: Directive::Reject(message.into()),
            terminal: false,
        }
    }

    /// Redraw now and apply `event` later.
    pub const fn deferred(delay: Duration, event: E) -> Self {
        Self {
            directive: Directive::Deferred { delay, event },
            terminal: false,
        }
    }

    /// No-op.
    pub const fn ignore() -> Self {
        Self {
            directive: Directive::Ignore,
            terminal: false,
        }
    }
}

/// Pure state update for one feature.
///
/// Implementations never perform I/O; anything that needs a remote call is
/// resolved by the binding before the event is delivered.
pub trait Transition {
    /// Tagged input understood by this payload.
    type Event;

    /// Folds `event` into the payload.
    fn apply(&mut self, event: Self::Event) -> Step<Self::Event>;
}
