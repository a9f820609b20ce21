//! Rotating status text shown while a video job runs.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Messages cycled while waiting on a video job. Cosmetic only.
pub const VIDEO_STATUS_MESSAGES: [&str; 8] = [
    "AI director is reviewing the script...",
    "Setting up the virtual cameras...",
    "Adjusting the lighting...",
    "Rendering the first few frames...",
    "This can take a few minutes...",
    "Adding special effects...",
    "Finalizing the audio...",
    "Polishing the final cut...",
];

/// Status shown once polling is over and the artifact is being fetched.
pub const DOWNLOADING_MESSAGE: &str = "Downloading video...";

/// Default rotation cadence (5 seconds).
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest rotation cadence. Shorter intervals, zero included, are raised to it.
pub const MIN_STATUS_INTERVAL: Duration = Duration::from_millis(1);

/// Shared, readable status text.
pub type StatusSlot = Arc<Mutex<String>>;

/// Background task rotating [`VIDEO_STATUS_MESSAGES`] into a [`StatusSlot`].
///
/// The task is aborted when the ticker is stopped or dropped.
pub struct StatusTicker {
    handle: JoinHandle<()>,
}

impl StatusTicker {
    /// Write the first message and start rotating. Must be called inside a tokio runtime.
    pub fn start(slot: StatusSlot, interval: Duration) -> Self {
        set_status(&slot, VIDEO_STATUS_MESSAGES[0]);

        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval.max(MIN_STATUS_INTERVAL));
            // The first tick completes immediately.
            ticks.tick().await;
            let mut index = 0;
            loop {
                ticks.tick().await;
                index = (index + 1) % VIDEO_STATUS_MESSAGES.len();
                set_status(&slot, VIDEO_STATUS_MESSAGES[index]);
            }
        });

        Self { handle }
    }

    /// Stop rotating. Idempotent.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Replace the slot's text. A poisoned lock is recovered.
pub fn set_status(slot: &StatusSlot, message: &str) {
    let mut status = match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    status.clear();
    status.push_str(message);
}

/// Read the slot's current text.
pub fn read_status(slot: &StatusSlot) -> String {
    match slot.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
