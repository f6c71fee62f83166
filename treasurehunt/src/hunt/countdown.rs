//! Hunt countdown.
//!
//! The countdown only counts; it does not own a timer. The hunt service
//! feeds it one tick per interval from a cancelable ticker task.

use std::time::Duration;

/// Default total hunt duration (one hour).
pub const DEFAULT_HUNT_DURATION: Duration = Duration::from_secs(3600);

/// Default interval between countdown ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Still running with this much time left.
    Running(Duration),
    /// Reached zero on this tick. Returned exactly once.
    Expired,
    /// Already expired earlier; the tick is ignored.
    Finished,
}

/// Fixed-duration countdown that expires exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    total: Duration,
    tick: Duration,
    remaining: Duration,
    expired: bool,
}

impl Countdown {
    pub fn new(total: Duration, tick: Duration) -> Self {
        Self {
            total,
            tick,
            remaining: total,
            expired: false,
        }
    }

    /// Advance by one tick interval.
    pub fn tick(&mut self) -> CountdownStep {
        if self.expired {
            return CountdownStep::Finished;
        }

        self.remaining = self.remaining.saturating_sub(self.tick);
        if self.remaining.is_zero() {
            self.expired = true;
            CountdownStep::Expired
        } else {
            CountdownStep::Running(self.remaining)
        }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn elapsed(&self) -> Duration {
        self.total - self.remaining
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_HUNT_DURATION, DEFAULT_TICK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_one_hour() {
        let countdown = Countdown::default();
        assert_eq!(countdown.remaining(), Duration::from_secs(3600));
        assert_eq!(countdown.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_ticks_down_then_expires_once() {
        let mut countdown = Countdown::new(Duration::from_secs(3), Duration::from_secs(1));

        assert_eq!(countdown.tick(), CountdownStep::Running(Duration::from_secs(2)));
        assert_eq!(countdown.tick(), CountdownStep::Running(Duration::from_secs(1)));
        assert_eq!(countdown.tick(), CountdownStep::Expired);
        assert!(countdown.is_expired());

        // Never fires again, never restarts
        assert_eq!(countdown.tick(), CountdownStep::Finished);
        assert_eq!(countdown.tick(), CountdownStep::Finished);
        assert_eq!(countdown.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_uneven_tick_clamps_at_zero() {
        let mut countdown = Countdown::new(Duration::from_millis(2500), Duration::from_secs(1));
        countdown.tick();
        countdown.tick();
        assert_eq!(countdown.tick(), CountdownStep::Expired);
        assert_eq!(countdown.elapsed(), Duration::from_millis(2500));
    }

    #[test]
    fn test_full_hour_expires_on_tick_3600() {
        let mut countdown = Countdown::default();
        let mut expirations = 0;
        for _ in 0..3700 {
            if countdown.tick() == CountdownStep::Expired {
                expirations += 1;
            }
        }
        assert_eq!(expirations, 1);
    }
}
