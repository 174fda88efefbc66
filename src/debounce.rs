//! A single pending "settle" task for debouncing interaction.
//!
//! Every interaction reschedules the task, so it only comes due after the interaction has been
//! idle for the whole delay. The host drives it by polling with the current time.
use std::time::{Duration, Instant};

/// A cancellable, reschedulable deadline.
#[derive(Debug, Clone)]
pub struct SettleTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SettleTimer {
    /// Create an idle timer.
    pub fn new(delay: Duration) -> Self {
        SettleTimer {
            delay,
            deadline: None,
        }
    }

    /// The delay between the last interaction and the task coming due.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule the task `delay` after `now`, replacing any pending schedule.
    pub fn reschedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending task, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a task is pending.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending task comes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once for a pending task whose deadline has passed, and clears it.
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
mod test {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let start = Instant::now();
        let mut timer = SettleTimer::new(Duration::from_millis(1000));
        assert!(!timer.poll(start));

        timer.reschedule(start);
        assert!(timer.is_pending());
        assert!(!timer.poll(start + Duration::from_millis(999)));
        assert!(timer.poll(start + Duration::from_millis(1000)));
        assert!(!timer.poll(start + Duration::from_millis(5000)));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_reschedule_supersedes() {
        let start = Instant::now();
        let mut timer = SettleTimer::new(Duration::from_millis(1000));

        timer.reschedule(start);
        timer.reschedule(start + Duration::from_millis(800));
        assert!(!timer.poll(start + Duration::from_millis(1200)));
        assert!(timer.poll(start + Duration::from_millis(1800)));

        timer.reschedule(start);
        timer.cancel();
        assert!(!timer.poll(start + Duration::from_secs(10)));
    }
}
