//! Single-timer debounce for radius changes.

use std::time::Duration;

use tokio::time::Instant;

/// Holds at most one pending deadline. Re-arming replaces it, so a burst of
/// changes produces a single firing `delay` after the last one.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Completes when the pending deadline passes, disarming the timer.
    /// Never completes while disarmed.
    ///
    /// Cancel safe: dropping the future before it completes leaves the
    /// deadline in place.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
