use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Trailing-edge debounce state: one pending deadline, pushed back by every signal.
#[derive(Debug, Clone)]
pub struct CoalescingTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl CoalescingTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Record a signal at `now`, replacing any pending deadline.
    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fire at most once per quiet period: true exactly when a pending deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for CoalescingTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
