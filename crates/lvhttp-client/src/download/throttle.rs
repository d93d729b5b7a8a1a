//! Gate for intermediate download percentages.
//!
//! Every admitted percentage becomes one job on the main context, so a fast
//! download on small chunks would otherwise queue thousands of them.

use std::time::{Duration, Instant};

/// Default minimum time between two progress updates.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Decides which intermediate percentages reach the listener.
///
/// A percentage passes when it moved forward and `min_interval` elapsed
/// since the last one that passed. `100%` never passes here: the sink
/// reports it itself, once, after the file is flushed.
#[derive(Debug)]
pub struct ProgressThrottle {
    min_interval: Duration,
    last: Option<(Instant, f32)>,
}

impl ProgressThrottle {
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    pub fn admit(&mut self, percent: f32) -> bool {
        self.admit_at(percent, Instant::now())
    }

    fn admit_at(&mut self, percent: f32, now: Instant) -> bool {
        if percent >= 100.0 {
            return false;
        }
        if let Some((at, reported)) = self.last {
            if percent <= reported || now.duration_since(at) < self.min_interval {
                return false;
            }
        }
        self.last = Some((now, percent));
        true
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_percentage_passes() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(60));
        assert!(throttle.admit(0.5));
        assert!(!throttle.admit(10.0));
    }

    #[test]
    fn test_interval_is_measured_from_the_last_admitted() {
        let start = Instant::now();
        let mut throttle = ProgressThrottle::new(Duration::from_millis(100));
        assert!(throttle.admit_at(10.0, start));
        assert!(!throttle.admit_at(20.0, start + Duration::from_millis(60)));
        assert!(throttle.admit_at(30.0, start + Duration::from_millis(100)));
        assert!(!throttle.admit_at(40.0, start + Duration::from_millis(150)));
    }

    #[test]
    fn test_completion_is_left_to_the_sink() {
        let mut throttle = ProgressThrottle::new(Duration::ZERO);
        assert!(!throttle.admit(100.0));
        assert!(throttle.admit(99.9));
        assert!(!throttle.admit(100.0));
    }

    #[test]
    fn test_stalled_percentage_is_not_repeated() {
        let mut throttle = ProgressThrottle::new(Duration::ZERO);
        assert!(throttle.admit(25.0));
        assert!(!throttle.admit(25.0));
        assert!(throttle.admit(25.5));
    }
}
