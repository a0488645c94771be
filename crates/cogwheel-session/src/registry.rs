//! Registry of live sessions keyed by (feature, owner).

use crate::session::{Feature, SessionId};
use cogwheel_common::UserId;
use dashmap::DashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug)]
struct Entry {
    id: SessionId,
    cancel: CancellationToken,
}

/// Tracks the single live session each owner may have per feature.
///
/// Starting a session for a (feature, owner) pair that already has one
/// cancels the older session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    entries: DashMap<(Feature, UserId), Entry>,
}

impl SessionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers session `id` as the live one for (`feature`, `owner`).
    ///
    /// The returned lease unregisters the session when dropped and carries the
    /// token that fires if a newer session replaces this one.
    pub fn begin(self: &Arc<Self>, feature: Feature, owner: UserId, id: SessionId) -> Lease {
        let cancel = CancellationToken::new();
        let previous = self.entries.insert(
            (feature, owner),
            Entry {
                id,
                cancel: cancel.clone(),
            },
        );

        if let Some(previous) = previous {
            info!(
                session_id = %previous.id,
                replaced_by = %id,
                feature = %feature,
                owner = %owner,
                "Replacing live session"
            );
            previous.cancel.cancel();
        }

        Lease {
            registry: Arc::clone(self),
            feature,
            owner,
            id,
            cancel,
        }
    }

    /// Removes the entry for (`feature`, `owner`) if it still belongs to `id`.
    pub fn end(&self, feature: Feature, owner: UserId, id: SessionId) -> bool {
        let removed = self
            .entries
            .remove_if(&(feature, owner), |_, entry| entry.id == id)
            .is_some();
        if removed {
            debug!(session_id = %id, feature = %feature, owner = %owner, "Session unregistered");
        }
        removed
    }

    /// Live session id for (`feature`, `owner`).
    pub fn active(&self, feature: Feature, owner: UserId) -> Option<SessionId> {
        self.entries.get(&(feature, owner)).map(|entry| entry.id)
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    /// Cancels every live session, e.g. on shutdown.
    pub fn cancel_all(&self) {
        for entry in &self.entries {
            entry.cancel.cancel();
        }
    }
}

/// Registration of one live session.
#[derive(Debug)]
pub struct Lease {
    registry: Arc<SessionRegistry>,
    feature: Feature,
    owner: UserId,
    id: SessionId,
    cancel: CancellationToken,
}

impl Lease {
    /// Token cancelled when a newer session replaces this one.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Registered session id.
    pub const fn id(&self) -> SessionId {
        self.id
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.registry.end(self.feature, self.owner, self.id);
    }
}
