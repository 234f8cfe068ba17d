//! One-shot completion timer driven by caller-supplied time.
//!
//! The timer never sleeps and owns no thread. The owner arms it with a delay,
//! and the driver polls it with the current instant; a due timer fires exactly
//! once and disarms itself. Cancelling is immediate and idempotent.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct CompletionTimer {
    deadline: Option<Instant>,
}

impl CompletionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer to fire `after` from `now`, superseding any pending arming.
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now.checked_add(after).unwrap_or(now));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fires the pending arming if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut timer = CompletionTimer::new();
        timer.arm(t0, ms(100));

        assert!(!timer.poll(t0 + ms(99)));
        assert!(timer.poll(t0 + ms(100)));
        assert!(!timer.poll(t0 + ms(500)));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_rearm_supersedes_previous() {
        let t0 = Instant::now();
        let mut timer = CompletionTimer::new();
        timer.arm(t0, ms(100));
        timer.arm(t0 + ms(50), ms(100));
        assert_eq!(timer.deadline(), Some(t0 + ms(150)));

        assert!(!timer.poll(t0 + ms(120)));
        assert!(timer.poll(t0 + ms(150)));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let t0 = Instant::now();
        let mut timer = CompletionTimer::new();
        timer.arm(t0, ms(10));
        timer.cancel();
        timer.cancel();
        assert!(!timer.poll(t0 + Duration::from_secs(1)));
        assert_eq!(timer.deadline(), None);
    }
}
