//! Session driver: the serialized event loop behind every interactive message.
//!
//! One driver task owns one [`Session`]. Inputs arrive through an mpsc
//! channel, so two events for the same session are never processed at the
//! same time. The loop races those inputs against the [`ExpiryTimer`] and the
//! registry's replacement token.

use crate::gate::{Input, InputGate};
use crate::registry::Lease;
use crate::session::{Session, TerminalReason};
use crate::timer::ExpiryTimer;
use crate::transition::{Directive, Step, Transition};
use async_trait::async_trait;
use cogwheel_common::{Result, UserId};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What the renderer is asked to draw.
#[derive(Debug)]
pub struct Frame<'a, P> {
    /// Payload to draw.
    pub payload: &'a P,
    /// Whether interactive controls should be enabled.
    pub controls_enabled: bool,
    /// Why the session ended, for the final frame.
    pub ended: Option<TerminalReason>,
}

/// Turns a payload into a message update.
#[async_trait]
pub trait Renderer<P, H>: Send + Sync
where
    P: Sync,
    H: Sync,
{
    /// Draws `frame`, answering the interaction behind `handle` when there is one.
    async fn render(&self, handle: Option<&H>, frame: Frame<'_, P>) -> Result<()>;

    /// Answers an interaction that changed nothing.
    async fn acknowledge(&self, _handle: &H) -> Result<()> {
        Ok(())
    }
}

/// Sends short notices only the target actor can see.
#[async_trait]
pub trait Notifier<H>: Send + Sync
where
    H: Sync,
{
    /// Tells `actor` about a rejected or failed interaction.
    async fn notify(&self, handle: &H, actor: UserId, message: &str) -> Result<()>;
}

/// Restarts a session's expiry window without delivering an event.
///
/// Bindings use it while an accepted input is still being turned into an
/// event, e.g. while the owner fills in a prompt.
#[derive(Debug, Clone, Default)]
pub struct KeepAlive(Arc<Notify>);

impl KeepAlive {
    /// Fresh handle, not yet tied to a driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the driver to restart the expiry window.
    pub fn extend(&self) {
        self.0.notify_one();
    }

    /// Resolves on the next (or a pending) [`Self::extend`].
    pub async fn extended(&self) {
        self.0.notified().await;
    }
}

/// Runs one session until it completes, expires, is replaced or its input closes.
pub struct SessionDriver<P: Transition + Sync, H: Sync> {
    session: Session<P>,
    gate: InputGate,
    renderer: Arc<dyn Renderer<P, H>>,
    notifier: Arc<dyn Notifier<H>>,
    lease: Option<Lease>,
    keep_alive: KeepAlive,
}

impl<P, H> SessionDriver<P, H>
where
    P: Transition + Send + Sync + 'static,
    P::Event: Send + 'static,
    H: Send + Sync + 'static,
{
    /// Driver for `session`.
    pub fn new(
        session: Session<P>,
        renderer: Arc<dyn Renderer<P, H>>,
        notifier: Arc<dyn Notifier<H>>,
    ) -> Self {
        let gate = InputGate::for_feature(session.feature());
        Self {
            session,
            gate,
            renderer,
            notifier,
            lease: None,
            keep_alive: KeepAlive::new(),
        }
    }

    /// Lets holders of `keep_alive` restart this driver's expiry window.
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: KeepAlive) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Ties the driver to a registry lease; the session ends as `Replaced`
    /// when the lease's token is cancelled.
    #[must_use]
    pub fn with_lease(mut self, lease: Lease) -> Self {
        self.lease = Some(lease);
        self
    }

    /// Runs the loop on a new task.
    pub fn spawn(self, inputs: mpsc::Receiver<Input<P::Event, H>>) -> JoinHandle<Session<P>> {
        tokio::spawn(self.run(inputs))
    }

    /// Runs the loop and returns the finished session.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<Input<P::Event, H>>) -> Session<P> {
        let timer = ExpiryTimer::start(self.session.window());
        let cancel = self
            .lease
            .as_ref()
            .map_or_else(CancellationToken::new, Lease::cancellation);
        let keep_alive = self.keep_alive.clone();

        info!(
            session_id = %self.session.id(),
            feature = %self.session.feature(),
            owner = %self.session.owner(),
            window_secs = self.session.window().as_secs(),
            "Session started"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    timer.cancel();
                    self.end(TerminalReason::Replaced, None).await;
                    break;
                }
                () = timer.fired() => {
                    self.end(TerminalReason::Expired, None).await;
                    break;
                }
                () = keep_alive.extended() => {
                    if timer.restart() {
                        self.session.touch();
                        debug!(session_id = %self.session.id(), "Expiry window extended");
                    }
                }
                input = inputs.recv() => {
                    let Some(input) = input else {
                        timer.cancel();
                        self.end(TerminalReason::Closed, None).await;
                        break;
                    };
                    if self.handle(input, &timer).await {
                        break;
                    }
                }
            }
        }

        drop(self.lease.take());
        self.session
    }

    /// Returns `true` once the session is over.
    async fn handle(&mut self, input: Input<P::Event, H>, timer: &ExpiryTimer) -> bool {
        let Input {
            actor,
            event,
            handle,
        } = input;

        if !self.gate.authorize(actor, &self.session) {
            debug!(
                session_id = %self.session.id(),
                actor = %actor,
                owner = %self.session.owner(),
                "Rejected input from non-owner"
            );
            self.notify(&handle, actor, self.gate.notice()).await;
            return false;
        }

        if !timer.restart() {
            self.end(TerminalReason::Expired, Some(&handle)).await;
            return true;
        }

        self.session.touch();
        let step = self.session.apply(event);
        self.perform(step, &handle, actor, timer).await
    }

    async fn perform(
        &mut self,
        step: Step<P::Event>,
        handle: &H,
        actor: UserId,
        timer: &ExpiryTimer,
    ) -> bool {
        if self.session.is_terminal() {
            return self.complete(Some(handle), timer).await;
        }

        match step.directive {
            Directive::Render => self.render(Some(handle)).await,
            Directive::Reject(message) => self.notify(handle, actor, &message).await,
            Directive::Ignore => {
                if let Err(e) = self.renderer.acknowledge(handle).await {
                    warn!(session_id = %self.session.id(), error = %e, "Failed to acknowledge input");
                }
            }
            Directive::Deferred { delay, event } => {
                self.render(Some(handle)).await;

                let mut pending = Some((delay, event));
                while let Some((delay, event)) = pending.take() {
                    tokio::time::sleep(delay).await;

                    let step = self.session.apply(event);
                    if self.session.is_terminal() {
                        return self.complete(None, timer).await;
                    }
                    match step.directive {
                        Directive::Deferred { delay, event } => {
                            self.render(None).await;
                            pending = Some((delay, event));
                        }
                        Directive::Render => self.render(None).await,
                        Directive::Reject(_) | Directive::Ignore => {}
                    }
                }
            }
        }
        false
    }

    async fn complete(&self, handle: Option<&H>, timer: &ExpiryTimer) -> bool {
        timer.cancel();
        info!(
            session_id = %self.session.id(),
            feature = %self.session.feature(),
            owner = %self.session.owner(),
            "Session completed"
        );
        self.render(handle).await;
        true
    }

    async fn end(&mut self, reason: TerminalReason, handle: Option<&H>) {
        self.session.terminate(reason);
        info!(
            session_id = %self.session.id(),
            feature = %self.session.feature(),
            owner = %self.session.owner(),
            reason = ?reason,
            "Session ended"
        );

        if reason != TerminalReason::Closed {
            self.render(handle).await;
        }
    }

    async fn render(&self, handle: Option<&H>) {
        let frame = Frame {
            payload: self.session.current_payload(),
            controls_enabled: !self.session.is_terminal(),
            ended: self.session.terminal(),
        };
        if let Err(e) = self.renderer.render(handle, frame).await {
            warn!(session_id = %self.session.id(), error = %e, "Failed to render session");
        }
    }

    async fn notify(&self, handle: &H, actor: UserId, message: &str) {
        if let Err(e) = self.notifier.notify(handle, actor, message).await {
            warn!(session_id = %self.session.id(), actor = %actor, error = %e, "Failed to notify actor");
        }
    }
}
