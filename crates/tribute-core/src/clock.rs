//! Elapsed-time clock measured from a fixed anchor instant.
//!
//! The breakdown uses fixed divisors: a year is always 365 days and a month
//! is always 30 days. Each component is taken from the *total* elapsed
//! milliseconds modulo the next-larger unit, so the parts do not cascade
//! the way a calendar difference would. For 400 days this yields
//! `1 year, 1 month, 10 days` (`400 mod 30 = 10`), not `1 year, 1 month,
//! 5 days`. The displayed counter depends on this exact rule; do not
//! replace it with calendar arithmetic.
//!
//! # Design Principles
//!
//! - All arithmetic is checked (no silent overflow).
//! - The anchor is fixed at construction and never changes.
//! - `now` before the anchor is an error, never a negative breakdown.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use tribute_types::ElapsedBreakdown;

/// Milliseconds in one second.
pub const MILLIS_PER_SECOND: u64 = 1_000;
/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: u64 = 60_000;
/// Milliseconds in one hour.
pub const MILLIS_PER_HOUR: u64 = 3_600_000;
/// Milliseconds in one day.
pub const MILLIS_PER_DAY: u64 = 86_400_000;
/// Milliseconds in one fixed 30-day month.
pub const MILLIS_PER_MONTH: u64 = 2_592_000_000;
/// Milliseconds in one fixed 365-day year.
pub const MILLIS_PER_YEAR: u64 = 31_536_000_000;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The current time precedes the anchor instant.
    #[error("current time is {lead_ms}ms before the anchor instant")]
    BeforeAnchor {
        /// How far before the anchor `now` lies, in milliseconds.
        lead_ms: u64,
    },

    /// An intermediate value does not fit its target type.
    #[error("elapsed time out of range: {reason}")]
    Overflow {
        /// Which value overflowed.
        reason: String,
    },

    /// The anchor's local time is skipped or repeated by a DST transition.
    #[error("anchor {local_time} does not map to a single instant")]
    AmbiguousAnchor {
        /// The configured wall-clock time.
        local_time: NaiveDateTime,
    },

    /// The configured UTC offset is outside +/- 24 hours.
    #[error("invalid UTC offset: {minutes} minutes")]
    InvalidOffset {
        /// The offending offset.
        minutes: i32,
    },
}

/// The fixed reference point all elapsed time is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorInstant {
    instant: DateTime<Utc>,
}

impl AnchorInstant {
    /// Anchor at an exact UTC instant.
    pub const fn from_utc(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Anchor at a wall-clock time in the host's local time zone.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::AmbiguousAnchor`] if the local time falls in a
    /// DST gap or overlap.
    pub fn from_local(local_time: NaiveDateTime) -> Result<Self, ClockError> {
        Local
            .from_local_datetime(&local_time)
            .single()
            .map(|dt| Self::from_utc(dt.with_timezone(&Utc)))
            .ok_or(ClockError::AmbiguousAnchor { local_time })
    }

    /// Anchor at a wall-clock time with a fixed offset from UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidOffset`] if the offset is out of range,
    /// or [`ClockError::Overflow`] if shifting by it leaves chrono's
    /// representable range.
    pub fn from_offset(local_time: NaiveDateTime, offset_minutes: i32) -> Result<Self, ClockError> {
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ClockError::InvalidOffset {
                minutes: offset_minutes,
            })?;
        local_time
            .checked_sub_offset(offset)
            .map(|utc| Self::from_utc(utc.and_utc()))
            .ok_or_else(|| ClockError::Overflow {
                reason: format!("{local_time} shifted by {offset} is out of range"),
            })
    }

    /// The anchor as a UTC instant.
    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Whole milliseconds from the anchor to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::BeforeAnchor`] if `now` precedes the anchor.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> Result<u64, ClockError> {
        let delta = now
            .timestamp_millis()
            .checked_sub(self.instant.timestamp_millis())
            .ok_or_else(|| ClockError::Overflow {
                reason: "timestamp difference exceeds i64".to_owned(),
            })?;
        u64::try_from(delta).map_err(|_err| ClockError::BeforeAnchor {
            lead_ms: delta.unsigned_abs(),
        })
    }
}

/// Split a total elapsed duration into the fixed-divisor breakdown.
///
/// ```text
/// years   = total / year
/// months  = (total % year)   / month
/// days    = (total % month)  / day
/// hours   = (total % day)    / hour
/// minutes = (total % hour)   / minute
/// seconds = (total % minute) / second
/// ```
///
/// # Errors
///
/// Returns [`ClockError::Overflow`] if a component exceeds `u32`. No `u64`
/// input reaches that: `u64::MAX` milliseconds is about 585 million years.
pub fn breakdown(total_ms: u64) -> Result<ElapsedBreakdown, ClockError> {
    // Divisors are non-zero constants; the fallbacks are unreachable.
    let component = |modulus: Option<u64>, unit: u64| -> u64 {
        let within = modulus.map_or(Some(total_ms), |m| total_ms.checked_rem(m));
        within.and_then(|v| v.checked_div(unit)).unwrap_or(0)
    };

    Ok(ElapsedBreakdown {
        years: narrow(component(None, MILLIS_PER_YEAR), "years")?,
        months: narrow(component(Some(MILLIS_PER_YEAR), MILLIS_PER_MONTH), "months")?,
        days: narrow(component(Some(MILLIS_PER_MONTH), MILLIS_PER_DAY), "days")?,
        hours: narrow(component(Some(MILLIS_PER_DAY), MILLIS_PER_HOUR), "hours")?,
        minutes: narrow(component(Some(MILLIS_PER_HOUR), MILLIS_PER_MINUTE), "minutes")?,
        seconds: narrow(component(Some(MILLIS_PER_MINUTE), MILLIS_PER_SECOND), "seconds")?,
    })
}

fn narrow(value: u64, unit: &str) -> Result<u32, ClockError> {
    u32::try_from(value).map_err(|_err| ClockError::Overflow {
        reason: format!("{unit} = {value} exceeds u32"),
    })
}

/// Recomputes the elapsed breakdown against a fixed anchor.
///
/// Driven once per tick interval by the view context. The clock keeps the
/// last good breakdown so a failed tick leaves the display unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElapsedTimeClock {
    anchor: AnchorInstant,
    latest: ElapsedBreakdown,
    ticks: u64,
}

impl ElapsedTimeClock {
    /// Create a clock measuring from `anchor`. The breakdown starts at zero.
    pub fn new(anchor: AnchorInstant) -> Self {
        Self {
            anchor,
            latest: ElapsedBreakdown::default(),
            ticks: 0,
        }
    }

    /// Recompute the breakdown for `now` and remember it.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::BeforeAnchor`] if `now` precedes the anchor.
    /// The previous breakdown is kept in that case.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<ElapsedBreakdown, ClockError> {
        let total = self.anchor.elapsed_ms(now)?;
        let next = breakdown(total)?;
        self.latest = next;
        self.ticks = self.ticks.saturating_add(1);
        Ok(next)
    }

    /// The anchor this clock measures from.
    pub const fn anchor(&self) -> AnchorInstant {
        self.anchor
    }

    /// The most recent successful breakdown.
    pub const fn latest(&self) -> ElapsedBreakdown {
        self.latest
    }

    /// Number of successful ticks so far.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn anchor_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 27)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap()
    }

    fn make_clock() -> ElapsedTimeClock {
        ElapsedTimeClock::new(AnchorInstant::from_offset(anchor_time(), 0).unwrap())
    }

    fn at(clock: &ElapsedTimeClock, offset: Duration) -> DateTime<Utc> {
        clock.anchor().instant() + offset
    }

    #[test]
    fn one_second_after_anchor() {
        let mut clock = make_clock();
        let now = at(&clock, Duration::seconds(1));
        let b = clock.tick(now).unwrap();
        assert_eq!(
            b,
            ElapsedBreakdown {
                years: 0,
                months: 0,
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 1,
            }
        );
    }

    #[test]
    fn days_hours_minutes_seconds() {
        let mut clock = make_clock();
        let offset = Duration::days(2)
            + Duration::hours(3)
            + Duration::minutes(4)
            + Duration::seconds(5);
        let b = clock.tick(at(&clock, offset)).unwrap();
        assert_eq!(
            b,
            ElapsedBreakdown {
                years: 0,
                months: 0,
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5,
            }
        );
    }

    #[test]
    fn four_hundred_days_uses_fixed_divisors() {
        let mut clock = make_clock();
        let b = clock.tick(at(&clock, Duration::days(400))).unwrap();
        assert_eq!(b.years, 1);
        // (400 % 365) / 30 = 35 / 30 = 1
        assert_eq!(b.months, 1);
        // 400 % 30 = 10, taken from the total rather than the year remainder.
        assert_eq!(b.days, 10);
        assert_eq!((b.hours, b.minutes, b.seconds), (0, 0, 0));
    }

    #[test]
    fn exactly_one_fixed_year_leaves_five_days() {
        let b = breakdown(MILLIS_PER_YEAR).unwrap();
        assert_eq!(b.years, 1);
        assert_eq!(b.months, 0);
        // 365 % 30 = 5
        assert_eq!(b.days, 5);
    }

    #[test]
    fn sub_second_remainder_is_truncated() {
        let b = breakdown(59_999).unwrap();
        assert_eq!(b.seconds, 59);
        assert_eq!(b.minutes, 0);
    }

    #[test]
    fn zero_elapsed_at_anchor() {
        let mut clock = make_clock();
        let now = clock.anchor().instant();
        assert_eq!(clock.tick(now).unwrap(), ElapsedBreakdown::default());
    }

    #[test]
    fn before_anchor_is_an_error() {
        let mut clock = make_clock();
        let now = at(&clock, -Duration::milliseconds(1_500));
        let err = clock.tick(now).unwrap_err();
        assert!(matches!(err, ClockError::BeforeAnchor { lead_ms: 1_500 }));
    }

    #[test]
    fn failed_tick_keeps_previous_breakdown() {
        let mut clock = make_clock();
        let good = clock.tick(at(&clock, Duration::minutes(3))).unwrap();
        assert!(clock.tick(at(&clock, -Duration::seconds(1))).is_err());
        assert_eq!(clock.latest(), good);
        assert_eq!(clock.ticks(), 1);
    }

    #[test]
    fn offset_shifts_the_anchor() {
        let utc = AnchorInstant::from_offset(anchor_time(), 0).unwrap();
        let brt = AnchorInstant::from_offset(anchor_time(), -180).unwrap();
        // 16:00 at UTC-3 is 19:00 UTC.
        assert_eq!(brt.instant() - utc.instant(), Duration::hours(3));
    }

    #[test]
    fn offset_out_of_range_is_rejected() {
        let err = AnchorInstant::from_offset(anchor_time(), 24 * 60).unwrap_err();
        assert!(matches!(err, ClockError::InvalidOffset { minutes: 1440 }));
    }

    #[test]
    fn offset_past_representable_range_overflows() {
        let err = AnchorInstant::from_offset(NaiveDateTime::MIN, 60).unwrap_err();
        assert!(matches!(err, ClockError::Overflow { .. }));
    }

    #[test]
    fn largest_duration_breaks_down_without_overflow() {
        let b = breakdown(u64::MAX).unwrap();
        assert_eq!(u64::from(b.years), u64::MAX / MILLIS_PER_YEAR);
        assert!(b.months < 13);
        assert!(b.days < 30);
        assert!(b.hours < 24);
        assert!(b.minutes < 60);
        assert!(b.seconds < 60);
    }

    #[test]
    fn local_anchor_resolves() {
        assert!(AnchorInstant::from_local(anchor_time()).is_ok());
    }
}
