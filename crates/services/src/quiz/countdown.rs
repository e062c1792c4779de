use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Remaining time under which the countdown is shown as a warning.
pub const WARNING_THRESHOLD_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick { remaining_secs: u64 },
    Expired,
}

/// Handle to a running countdown task.
///
/// Dropping the guard cancels the countdown, so a tick can never outlive the
/// owner. `stop` additionally waits for the task to finish.
pub struct CountdownGuard {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl CountdownGuard {
    /// Spawn a countdown of `total_secs` that emits one event per `tick`.
    ///
    /// The last event is always `Expired`, sent when the budget reaches zero.
    #[must_use]
    pub fn start(
        total_secs: u64,
        tick: Duration,
        events: mpsc::UnboundedSender<CountdownEvent>,
    ) -> Self {
        let token = CancellationToken::new();
        let handle = tokio::spawn(run_countdown(total_secs, tick, token.clone(), events));
        Self {
            token,
            handle: Some(handle),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel the countdown and wait until its task has exited.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "countdown task failed to join");
            }
        }
    }
}

impl Drop for CountdownGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_countdown(
    total_secs: u64,
    tick: Duration,
    token: CancellationToken,
    events: mpsc::UnboundedSender<CountdownEvent>,
) {
    let mut remaining = total_secs;
    let mut ticker = time::interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while remaining > 0 {
        tokio::select! {
            biased;
            () = token.cancelled() => return,
            _ = ticker.tick() => {
                remaining -= 1;
                if remaining > 0 && events.send(CountdownEvent::Tick { remaining_secs: remaining }).is_err() {
                    return;
                }
            }
        }
    }

    if !token.is_cancelled() {
        info!(total_secs, "countdown expired");
        let _ = events.send(CountdownEvent::Expired);
    }
}

/// Format seconds as `MM:SS`.
#[must_use]
pub fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[must_use]
pub fn is_warning(remaining_secs: u64) -> bool {
    remaining_secs < WARNING_THRESHOLD_SECS
}
