use std::time::Duration;

use tokio::time::{self, Instant};

/// A single cancelable point in time.
///
/// Owned by the actor that waits on it. Once [`Deadline::cancel`] returns,
/// a pending [`Deadline::wait`] can no longer fire.
#[derive(Debug, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms (or moves) the deadline to `after` from now and returns the
    /// instant.
    pub fn arm_in(&mut self, after: Duration) -> Instant {
        let at = Instant::now() + after;
        self.at = Some(at);
        at
    }

    /// Disarms the deadline. Idempotent.
    pub fn cancel(&mut self) {
        self.at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    /// Resolves once the deadline passes, disarming it and returning the
    /// instant it was set for. Pends forever while disarmed.
    ///
    /// Cancel-safe: a dropped wait leaves the deadline armed.
    pub async fn wait(&mut self) -> Instant {
        let Some(at) = self.at else {
            return std::future::pending().await;
        };
        time::sleep_until(at).await;
        self.at = None;
        at
    }
}
