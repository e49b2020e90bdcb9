//! Time-of-day scalar types.
//!
//! **ClickHouse Documentation:**
//! - <https://clickhouse.com/docs/en/sql-reference/data-types/time>
//! - <https://clickhouse.com/docs/en/sql-reference/data-types/time64>
//!
//! Both types are 8-byte signed integers counting from midnight. `Time`
//! counts nanoseconds; `Time64` counts units of its [`Precision`], which is
//! not stored with the value.
//!
//! A raw value of 0 is the "unset" sentinel: it renders as `None` and
//! `None` encodes to 0. Exact midnight also encodes to 0, so midnight reads
//! back as unset.

use super::Precision;
use chrono::{
    DateTime,
    Duration,
    Local,
    NaiveDateTime,
    NaiveTime,
    Offset,
    TimeZone,
    Timelike,
};

pub const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
pub const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;

/// Nanoseconds since midnight, ignoring date and timezone.
fn nanos_of_day<T: Timelike>(t: &T) -> i64 {
    t.hour() as i64 * NANOS_PER_HOUR
        + t.minute() as i64 * NANOS_PER_MINUTE
        + t.second() as i64 * NANOS_PER_SECOND
        + t.nanosecond() as i64
}

/// Split nanoseconds since midnight into hour, minute, second, nanosecond.
fn clock(nanos: i64) -> (i64, i64, i64, i64) {
    let hour = nanos / NANOS_PER_HOUR;
    let rem = nanos % NANOS_PER_HOUR;
    let minute = rem / NANOS_PER_MINUTE;
    let rem = rem % NANOS_PER_MINUTE;
    (hour, minute, rem / NANOS_PER_SECOND, rem % NANOS_PER_SECOND)
}

/// Anchor a time of day to today's date in local time.
///
/// Components outside a single day roll over into neighbouring days.
fn anchor_today(nanos: i64) -> DateTime<Local> {
    let (hour, minute, second, nano) = clock(nanos);
    let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);
    let naive = midnight
        + Duration::hours(hour)
        + Duration::minutes(minute)
        + Duration::seconds(second)
        + Duration::nanoseconds(nano);
    resolve_local(&Local, &naive)
}

/// How far back to look for the offset in force before a DST gap.
const GAP_LOOKBACK_HOURS: i64 = 3;

/// Resolve a wall-clock reading in `tz`.
///
/// Ambiguous readings take the earlier instant. A reading inside a DST gap
/// is interpreted with the offset in force before the gap, which moves it
/// forward by the gap length (02:30 becomes 03:30 on a one-hour gap).
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> DateTime<Tz> {
    if let Some(dt) = tz.from_local_datetime(naive).earliest() {
        return dt;
    }
    let before = *naive - Duration::hours(GAP_LOOKBACK_HOURS);
    match tz.from_local_datetime(&before).earliest() {
        Some(dt) => {
            let offset = dt.offset().fix().local_minus_utc() as i64;
            tz.from_utc_datetime(&(*naive - Duration::seconds(offset)))
        }
        None => tz.from_utc_datetime(naive),
    }
}

fn naive_time(nanos: i64) -> Option<NaiveTime> {
    if !(0..24 * NANOS_PER_HOUR).contains(&nanos) {
        return None;
    }
    let (hour, minute, second, nano) = clock(nanos);
    NaiveTime::from_hms_nano_opt(
        hour as u32,
        minute as u32,
        second as u32,
        nano as u32,
    )
}

/// Time of day with nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(pub i64);

impl Time {
    /// Encode the time-of-day part of `t`.
    pub fn from_time<T: Timelike>(t: &T) -> Time {
        Time(nanos_of_day(t))
    }

    /// Encode an optional timestamp, `None` being the unset sentinel.
    pub fn from_datetime<T: Timelike>(t: Option<&T>) -> Time {
        t.map_or(Time(0), Time::from_time)
    }

    /// Today's local timestamp at this time of day; `None` for the unset
    /// sentinel.
    pub fn to_datetime(self) -> Option<DateTime<Local>> {
        if self.0 == 0 {
            return None;
        }
        Some(anchor_today(self.0))
    }

    /// Exact time of day, `None` if outside a single day.
    ///
    /// Unlike [`Time::to_datetime`], 0 is midnight here.
    pub fn to_naive_time(self) -> Option<NaiveTime> {
        naive_time(self.0)
    }
}

impl From<i64> for Time {
    fn from(v: i64) -> Self {
        Time(v)
    }
}

/// Time of day in units of an external [`Precision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time64(pub i64);

impl Time64 {
    /// Encode the time-of-day part of `t`, truncating below `p`.
    pub fn from_time<T: Timelike>(t: &T, p: Precision) -> Time64 {
        Time64(nanos_of_day(t) / p.scale())
    }

    pub fn from_datetime<T: Timelike>(t: Option<&T>, p: Precision) -> Time64 {
        t.map_or(Time64(0), |t| Time64::from_time(t, p))
    }

    /// Nanoseconds since midnight at precision `p`.
    pub fn nanos(self, p: Precision) -> i64 {
        self.0.saturating_mul(p.scale())
    }

    pub fn to_datetime(self, p: Precision) -> Option<DateTime<Local>> {
        if self.0 == 0 {
            return None;
        }
        Some(anchor_today(self.nanos(p)))
    }

    pub fn to_naive_time(self, p: Precision) -> Option<NaiveTime> {
        naive_time(self.nanos(p))
    }
}

impl From<i64> for Time64 {
    fn from(v: i64) -> Self {
        Time64(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{
        FixedOffset,
        LocalResult,
        NaiveDate,
        Utc,
    };

    /// Zone at +01:00 that springs forward to +02:00 at 2024-03-31 01:00 UTC,
    /// skipping local 02:00..03:00.
    #[derive(Debug, Clone, Copy)]
    struct SpringForward;

    fn transition() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap()
    }

    fn winter() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn summer() -> FixedOffset {
        FixedOffset::east_opt(7200).unwrap()
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(
            &self,
            local: &NaiveDate,
        ) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(
            &self,
            local: &NaiveDateTime,
        ) -> LocalResult<FixedOffset> {
            let as_winter = *local - Duration::hours(1) < transition();
            let as_summer = *local - Duration::hours(2) >= transition();
            match (as_winter, as_summer) {
                (true, false) => LocalResult::Single(winter()),
                (false, true) => LocalResult::Single(summer()),
                (true, true) => LocalResult::Ambiguous(winter(), summer()),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, _utc: &NaiveDate) -> FixedOffset {
            winter()
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < transition() {
                winter()
            } else {
                summer()
            }
        }
    }

    fn march_31(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_nano_opt(14, 30, 45, 123_456_789)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_time_conversion() {
        let now = sample();
        let t = Time::from_time(&now);
        assert_eq!(t.0, 52_245_123_456_789);

        let result = t.to_datetime().unwrap();
        assert_eq!(result.hour(), 14);
        assert_eq!(result.minute(), 30);
        assert_eq!(result.second(), 45);
        assert_eq!(result.nanosecond(), 123_456_789);
        assert_eq!(result.date_naive(), Local::now().date_naive());
    }

    #[test]
    fn test_time64_conversion() {
        let now = sample();
        for p in [
            Precision::SECOND,
            Precision::MILLI,
            Precision::MICRO,
            Precision::NANO,
        ] {
            let t = Time64::from_time(&now, p);
            let result = t.to_datetime(p).unwrap();

            assert_eq!(result.hour(), 14, "precision {}", p);
            assert_eq!(result.minute(), 30, "precision {}", p);
            assert_eq!(result.second(), 45, "precision {}", p);
            let expected = 123_456_789 / p.scale() * p.scale();
            assert_eq!(result.nanosecond() as i64, expected, "precision {}", p);
        }
    }

    #[test]
    fn test_time64_truncates() {
        let now = sample();
        assert_eq!(Time64::from_time(&now, Precision::MILLI).0, 52_245_123);
        assert_eq!(Time64::from_time(&now, Precision::SECOND).0, 52_245);
    }

    #[test]
    fn test_zero_sentinel() {
        assert_eq!(Time::from_datetime::<NaiveTime>(None), Time(0));
        assert_eq!(Time(0).to_datetime(), None);
        assert_eq!(Time64(0).to_datetime(Precision::MILLI), None);

        // Midnight collides with the sentinel.
        let midnight = NaiveTime::MIN;
        assert_eq!(Time::from_time(&midnight), Time(0));
        assert_eq!(Time(0).to_naive_time(), Some(midnight));
    }

    #[test]
    fn test_naive_time_range() {
        assert!(Time(-1).to_naive_time().is_none());
        assert!(Time(24 * NANOS_PER_HOUR).to_naive_time().is_none());
        assert_eq!(
            Time(NANOS_PER_HOUR + 2 * NANOS_PER_MINUTE + 3).to_naive_time(),
            NaiveTime::from_hms_nano_opt(1, 2, 0, 3)
        );
    }

    #[test]
    fn test_resolve_local_outside_gap() {
        let dt = resolve_local(&SpringForward, &march_31(1, 30));
        assert_eq!(dt.naive_local(), march_31(1, 30));
        assert_eq!(dt.naive_utc(), march_31(0, 30));

        let dt = resolve_local(&SpringForward, &march_31(4, 0));
        assert_eq!(dt.naive_utc(), march_31(2, 0));
    }

    #[test]
    fn test_resolve_local_in_gap_moves_forward() {
        let dt = resolve_local(&SpringForward, &march_31(2, 30));
        assert_eq!(dt.naive_local(), march_31(3, 30));
        assert_eq!(dt.naive_utc(), march_31(1, 30));
        assert_eq!(dt.offset().fix(), summer());
    }

    #[test]
    fn test_clock() {
        assert_eq!(clock(52_245_123_456_789), (14, 30, 45, 123_456_789));
        assert_eq!(clock(0), (0, 0, 0, 0));
    }
}
