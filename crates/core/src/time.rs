use chrono::{DateTime, Duration, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Returns true if this clock represents real time.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Clock::Default)
    }

    /// Returns true if this clock is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Whole seconds elapsed between two instants, clamped at zero.
///
/// Sub-second remainders are truncated, matching a once-per-second timer.
#[must_use]
pub fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    let secs = (to - from).num_seconds();
    u32::try_from(secs).unwrap_or(0)
}

/// Seconds left on a countdown that started at `from` with `limit_secs` on
/// the clock, clamped at zero.
#[must_use]
pub fn remaining_secs(from: DateTime<Utc>, now: DateTime<Utc>, limit_secs: u32) -> u32 {
    limit_secs.saturating_sub(elapsed_secs(from, now))
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_truncates_to_whole_seconds() {
        let start = fixed_now();
        let later = start + Duration::milliseconds(2_900);
        assert_eq!(elapsed_secs(start, later), 2);
    }

    #[test]
    fn elapsed_clamps_negative_spans() {
        let start = fixed_now();
        let earlier = start - Duration::seconds(5);
        assert_eq!(elapsed_secs(start, earlier), 0);
    }

    #[test]
    fn remaining_counts_down_and_clamps() {
        let start = fixed_now();
        assert_eq!(remaining_secs(start, start + Duration::seconds(40), 120), 80);
        assert_eq!(remaining_secs(start, start + Duration::seconds(500), 120), 0);
    }

    #[test]
    fn fixed_clock_is_stable() {
        let clock = fixed_clock();
        assert_eq!(clock.now(), clock.now());
        assert!(clock.is_fixed());
    }
}
