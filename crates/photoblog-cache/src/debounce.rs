//! Coalescing of rapid navigation inputs.

use std::time::Duration;

use tokio::time::Instant;

/// Accepts one trigger per window and ignores the rest.
///
/// Keyboard repeat and wheel scrolling emit bursts of inputs; without this
/// guard each would start a resolve and possibly an extension.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    last: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns true if a trigger at `now` should be acted upon.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Forget the last trigger.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_inside_window_are_ignored() {
        let mut debounce = Debounce::new(Duration::from_millis(250));
        let start = Instant::now();
        assert!(debounce.try_acquire(start));
        assert!(!debounce.try_acquire(start + Duration::from_millis(10)));
        assert!(!debounce.try_acquire(start + Duration::from_millis(249)));
        assert!(debounce.try_acquire(start + Duration::from_millis(250)));
    }

    #[test]
    fn ignored_triggers_do_not_extend_window() {
        let mut debounce = Debounce::new(Duration::from_millis(100));
        let start = Instant::now();
        assert!(debounce.try_acquire(start));
        assert!(!debounce.try_acquire(start + Duration::from_millis(90)));
        assert!(debounce.try_acquire(start + Duration::from_millis(120)));
    }

    #[test]
    fn reset_allows_immediate_trigger() {
        let mut debounce = Debounce::new(Duration::from_secs(10));
        let start = Instant::now();
        assert!(debounce.try_acquire(start));
        debounce.reset();
        assert!(debounce.try_acquire(start));
    }
}
