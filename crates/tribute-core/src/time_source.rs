//! Wall-clock abstraction so tests can control "now".
//!
//! - [`SystemTimeSource`] reads the real clock.
//! - [`ManualTimeSource`] returns a stored instant that only moves when told.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

/// A source of the current wall-clock time.
pub trait TimeSource: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A controllable clock for tests and replays.
///
/// Stores milliseconds since the Unix epoch in an atomic so it can be shared
/// with timer tasks behind an `Arc` without locking.
#[derive(Debug)]
pub struct ManualTimeSource {
    millis: AtomicI64,
}

impl ManualTimeSource {
    /// Start at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        self.millis.store(instant.timestamp_millis(), Ordering::Release);
    }

    /// Move forward (or backward, for negative durations) by `delta`.
    pub fn advance(&self, delta: Duration) {
        let step = delta.num_milliseconds();
        // fetch_update never fails here: the closure always returns Some.
        let _ = self
            .millis
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |ms| {
                Some(ms.saturating_add(step))
            });
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::Acquire)).unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn manual_source_moves_only_when_told() {
        let start = DateTime::from_timestamp_millis(1_711_555_200_000).unwrap();
        let source = ManualTimeSource::new(start);
        assert_eq!(source.now(), start);

        source.advance(Duration::seconds(90));
        assert_eq!(source.now(), start + Duration::seconds(90));

        source.set(start);
        assert_eq!(source.now(), start);
    }

    #[test]
    fn system_source_is_recent() {
        let before = Utc::now();
        let now = SystemTimeSource.now();
        assert!(now >= before);
    }
}
