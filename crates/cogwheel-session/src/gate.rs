//! Per-user authorization of incoming interaction events.

use crate::session::{Feature, Session};
use cogwheel_common::UserId;

/// An interaction event addressed to a session.
///
/// `handle` is whatever the binding needs to answer the interaction
/// (for Discord, the component interaction itself).
#[derive(Debug, Clone)]
pub struct Input<E, H> {
    /// Who produced the event.
    pub actor: UserId,
    /// What they asked for.
    pub event: E,
    /// Reply handle for the interaction.
    pub handle: H,
}

impl<E, H> Input<E, H> {
    /// Bundles an event with its actor and reply handle.
    pub const fn new(actor: UserId, event: E, handle: H) -> Self {
        Self {
            actor,
            event,
            handle,
        }
    }
}

/// Accepts input only from a session's owner while the session is live.
#[derive(Debug, Clone)]
pub struct InputGate {
    notice: &'static str,
}

impl InputGate {
    /// Gate using the feature's rejection notice.
    pub const fn for_feature(feature: Feature) -> Self {
        Self {
            notice: feature.rejection_notice(),
        }
    }

    /// Whether `actor` may drive `session`.
    pub fn authorize<P>(&self, actor: UserId, session: &Session<P>) -> bool {
        actor == session.owner() && !session.is_terminal()
    }

    /// Ephemeral text for rejected actors.
    pub const fn notice(&self) -> &'static str {
        self.notice
    }
}
