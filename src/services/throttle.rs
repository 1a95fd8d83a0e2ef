//! Time-based throttling for progress log lines.

use std::time::{Duration, Instant};

/// Interval between progress lines of the directory pre-creation pass.
pub const PREPARE_PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Interval between progress lines of the copy pass.
pub const COPY_PROGRESS_INTERVAL: Duration = Duration::from_secs(3);

/// Time-based limiter for progress output.
///
/// `should_emit()` returns true at most once per interval; the first interval
/// starts when the throttle is created.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last_emit: Instant,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: Instant::now(),
        }
    }

    pub fn should_emit(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_emit) > self.interval {
            self.last_emit = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_not_emitted_before_interval() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(60));
        assert!(!throttle.should_emit());
        assert!(!throttle.should_emit());
    }

    #[test]
    fn test_emitted_once_per_interval() {
        let mut throttle = ProgressThrottle::new(Duration::from_millis(10));
        thread::sleep(Duration::from_millis(20));
        assert!(throttle.should_emit());
        // Timer restarted by the emit above
        assert!(!throttle.should_emit());
    }
}
