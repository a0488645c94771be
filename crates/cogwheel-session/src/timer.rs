//! Restartable single-shot inactivity timer.
//!
//! Re-arming bumps a generation counter and swaps the pending sleep task
//! inside one critical section. A sleep task only fires if its generation is
//! still current when it wakes, so a superseded task can never expire a
//! session that just received input.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::trace;

/// Lifecycle of an [`ExpiryTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Counting down.
    Running,
    /// The window elapsed. Terminal.
    Fired,
    /// Stopped before firing. Terminal.
    Cancelled,
}

#[derive(Debug)]
struct Inner {
    generation: u64,
    state: TimerState,
    task: Option<JoinHandle<()>>,
}

/// Inactivity timer owned by one session driver.
///
/// Must be created inside a Tokio runtime.
#[derive(Debug)]
pub struct ExpiryTimer {
    window: Duration,
    inner: Arc<Mutex<Inner>>,
    fired: Arc<Notify>,
}

impl ExpiryTimer {
    /// Starts counting down `window`.
    pub fn start(window: Duration) -> Self {
        let timer = Self {
            window,
            inner: Arc::new(Mutex::new(Inner {
                generation: 0,
                state: TimerState::Running,
                task: None,
            })),
            fired: Arc::new(Notify::new()),
        };

        {
            let mut inner = timer.inner.lock();
            inner.task = Some(timer.schedule(inner.generation));
        }
        timer
    }

    /// Restarts the countdown from now.
    ///
    /// Returns `false` when the timer already fired or was cancelled; the
    /// caller must then treat the session as over.
    pub fn restart(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != TimerState::Running {
            return false;
        }

        inner.generation += 1;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        inner.task = Some(self.schedule(inner.generation));
        trace!(generation = inner.generation, "Expiry timer re-armed");
        true
    }

    /// Stops the timer. Returns `false` if it had already fired or been cancelled.
    pub fn cancel(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != TimerState::Running {
            return false;
        }

        inner.state = TimerState::Cancelled;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        true
    }

    /// Current state.
    pub fn state(&self) -> TimerState {
        self.inner.lock().state
    }

    /// Inactivity window.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Resolves once the timer fires. Never resolves for a cancelled timer.
    pub async fn fired(&self) {
        self.fired.notified().await;
    }

    fn schedule(&self, generation: u64) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let fired = Arc::clone(&self.fired);
        let window = self.window;

        tokio::spawn(async move {
            tokio::time::sleep(window).await;

            let mut guard = inner.lock();
            if guard.generation != generation || guard.state != TimerState::Running {
                return;
            }
            guard.state = TimerState::Fired;
            guard.task = None;
            drop(guard);

            fired.notify_one();
        })
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        if let Some(task) = self.inner.lock().task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, sleep};

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_window() {
        let timer = ExpiryTimer::start(Duration::from_secs(30));
        assert_eq!(timer.state(), TimerState::Running);

        timer.fired().await;
        assert_eq!(timer.state(), TimerState::Fired);
        assert!(!timer.restart());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_supersedes_pending_fire() {
        let timer = ExpiryTimer::start(Duration::from_secs(10));

        advance(Duration::from_secs(9)).await;
        assert!(timer.restart());

        advance(Duration::from_secs(9)).await;
        tokio::task::yield_now().await;
        assert_eq!(timer.state(), TimerState::Running);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(timer.state(), TimerState::Fired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let timer = ExpiryTimer::start(Duration::from_secs(5));
        assert!(timer.cancel());
        assert!(!timer.cancel());

        sleep(Duration::from_secs(10)).await;
        assert_eq!(timer.state(), TimerState::Cancelled);
        assert!(!timer.restart());
    }
}
