//! Cancellable fixed-period blink timer.
//!
//! The timer runs on the tokio runtime and calls its tick callback once per
//! period until cancelled:
//!
//! ```text
//! spawn ──► skip immediate tick ──► loop {
//!                                     cancelled? ─► exit
//!                                     period elapsed ─► on_tick()
//!                                   }
//! ```
//!
//! Cancellation is checked before every tick, so once [`BlinkTimer::stop`]
//! returns no further callback runs.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::state::ComparisonState;
use super::CompareError;

/// Shortest accepted blink period.
pub const MIN_BLINK_INTERVAL: Duration = Duration::from_millis(50);

/// Handle to a running blink task.
///
/// Dropping the handle cancels the task.
#[derive(Debug)]
pub struct BlinkTimer {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl BlinkTimer {
    /// Spawns a timer calling `on_tick` every `interval`.
    ///
    /// Fails with [`CompareError::NoRuntime`] outside a tokio runtime.
    pub fn spawn<F>(interval: Duration, on_tick: F) -> Result<Self, CompareError>
    where
        F: FnMut() + Send + 'static,
    {
        Self::spawn_with_token(interval, CancellationToken::new(), on_tick)
    }

    /// Spawns a timer stopped by `cancel`, which may be a child of a wider
    /// shutdown token.
    pub fn spawn_with_token<F>(
        interval: Duration,
        cancel: CancellationToken,
        mut on_tick: F,
    ) -> Result<Self, CompareError>
    where
        F: FnMut() + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| CompareError::NoRuntime)?;
        let interval = interval.max(MIN_BLINK_INTERVAL);
        let token = cancel.clone();

        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => {
                        trace!("Blink timer cancelled");
                        break;
                    }

                    _ = ticker.tick() => {
                        if token.is_cancelled() {
                            break;
                        }
                        on_tick();
                    }
                }
            }
        });

        debug!(interval_ms = interval.as_millis() as u64, "Blink timer started");
        Ok(Self {
            cancel,
            handle: Some(handle),
            interval,
        })
    }

    /// Spawns a timer that advances `state` once per its blink interval.
    ///
    /// The callback checks cancellation while holding the state lock, so a
    /// caller that cancels under the same lock sees no later toggle.
    pub fn for_state(state: Arc<Mutex<ComparisonState>>) -> Result<Self, CompareError> {
        let interval = match state.lock() {
            Ok(guard) => guard.blink_interval().unwrap_or(guard.defaults().blink_interval),
            Err(poisoned) => {
                let guard = poisoned.into_inner();
                guard.blink_interval().unwrap_or(guard.defaults().blink_interval)
            }
        };

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        Self::spawn_with_token(interval, cancel, move || match state.lock() {
            Ok(mut guard) => {
                if !token.is_cancelled() {
                    guard.tick();
                }
            }
            Err(_) => {
                warn!("Comparison state lock poisoned, stopping blink");
                token.cancel();
            }
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Requests cancellation without waiting for the task.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancels and waits for the task to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Blink timer task ended abnormally");
            }
        }
        debug!("Blink timer stopped");
    }
}

impl Drop for BlinkTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
