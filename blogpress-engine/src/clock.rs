//! Time source for `created` / `updated` stamps.

use chrono::Utc;

use blogpress_core::Timestamp;

pub trait Clock {
    /// Current time in Unix seconds.
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }

    #[test]
    fn fixed_clock_is_fixed() {
        let c = FixedClock(1000);
        assert_eq!(c.now(), 1000);
        assert_eq!(c.now(), 1000);
    }
}
