//! Delayed advance scheduling.
//!
//! A correct answer stays on screen for a fixed delay before the next flag
//! appears. [`AdvanceTimer`] spawns a task that sleeps out the delay and then
//! delivers the epoch-stamped token over the app's channel. Cancellation is
//! best-effort: the session discards tokens from an old epoch either way, so
//! aborting the task only saves a wasted send.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time;

use crate::session::AdvanceToken;

/// How long a correctly answered flag stays on screen.
pub const QUESTION_DELAY: Duration = Duration::from_millis(2000);

/// Schedules a single pending advance at a time.
#[derive(Debug, Default)]
pub struct AdvanceTimer {
    pending: Option<JoinHandle<()>>,
}

impl AdvanceTimer {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Deliver `token` on `tx` after [`QUESTION_DELAY`], replacing any
    /// previously scheduled delivery.
    pub fn schedule(&mut self, tx: UnboundedSender<AdvanceToken>, token: AdvanceToken) {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            time::sleep(QUESTION_DELAY).await;
            let _ = tx.send(token);
        }));
    }

    /// Abort the pending delivery, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
