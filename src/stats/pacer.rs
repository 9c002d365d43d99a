//! Pacing for per-post stats requests.

use std::time::Duration;

use tokio::time::{sleep, Instant};

/// Enforces a minimum interval between successive requests to the same host.
///
/// The first call returns immediately; every later call waits until at least
/// `interval` has passed since the previous one.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Wait for the next slot.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }
}
