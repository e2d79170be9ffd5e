//! Wall-clock time: broken-down dates, formatting, the RTC seam and the
//! monotonic system clock.

pub mod tz;

use core::fmt::Write;

use embassy_time::Instant;
use heapless::String;
use ::time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::app_state::AppError;

pub use ::time::Weekday;
pub use tz::TzRule;

/// 0000-01-01 00:00:00
const MIN_UNIX: i64 = -62_167_219_200;
/// 9999-12-31 23:59:59
const MAX_UNIX: i64 = 253_402_300_799;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Broken-down local time as stored in the RTC chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime(PrimitiveDateTime);

impl DateTime {
    /// Validated constructor; the weekday is derived from the date.
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        let date = Date::from_calendar_date(i32::from(year), month, day).ok()?;
        let time = Time::from_hms(hour, minute, second).ok()?;
        Some(Self(PrimitiveDateTime::new(date, time)))
    }

    /// Break down a count of seconds since 1970-01-01 00:00:00.
    ///
    /// Saturates outside years 0 through 9999.
    pub fn from_unix(seconds: i64) -> Self {
        let utc = OffsetDateTime::from_unix_timestamp(seconds.clamp(MIN_UNIX, MAX_UNIX))
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);
        Self(PrimitiveDateTime::new(utc.date(), utc.time()))
    }

    pub fn to_unix(&self) -> i64 {
        self.0.assume_utc().unix_timestamp()
    }

    pub fn year(&self) -> u16 {
        self.0.year().clamp(0, 9_999) as u16
    }

    /// 1 = January
    pub fn month(&self) -> u8 {
        u8::from(self.0.month())
    }

    pub fn day(&self) -> u8 {
        self.0.day()
    }

    pub fn hour(&self) -> u8 {
        self.0.hour()
    }

    pub fn minute(&self) -> u8 {
        self.0.minute()
    }

    pub fn second(&self) -> u8 {
        self.0.second()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Full weekday name, `%A`.
    pub fn weekday_name(&self) -> &'static str {
        match self.weekday() {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }

    /// `%e-%b-%Y`, e.g. ` 5-Oct-2025`.
    pub fn format_date(&self) -> String<16> {
        let mut out = String::new();
        let _ = write!(
            out,
            "{:>2}-{}-{}",
            self.day(),
            MONTH_ABBREVIATIONS[usize::from(self.month() - 1)],
            self.year()
        );
        out
    }

    /// `%I:%M:%S %p`, e.g. `03:07:09 PM`.
    pub fn format_time_12h(&self) -> String<16> {
        let hour = self.hour();
        let hour12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        let meridiem = if hour < 12 { "AM" } else { "PM" };

        let mut out = String::new();
        let _ = write!(
            out,
            "{:02}:{:02}:{:02} {}",
            hour12,
            self.minute(),
            self.second(),
            meridiem
        );
        out
    }
}

/// Battery-backed real-time clock chip.
pub trait RtcClock {
    fn read_datetime(&mut self) -> impl Future<Output = Result<DateTime, AppError>>;
    fn write_datetime(&mut self, datetime: &DateTime) -> impl Future<Output = Result<(), AppError>>;
}

/// Local wall-clock time extrapolated from a seed and the monotonic timer.
///
/// Seeded from the RTC at boot and again after every NTP sync.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    base_seconds: i64,
    base_instant: Instant,
}

impl SystemClock {
    pub fn new(local: &DateTime, now: Instant) -> Self {
        Self {
            base_seconds: local.to_unix(),
            base_instant: now,
        }
    }

    pub fn seed(&mut self, local: &DateTime, now: Instant) {
        self.base_seconds = local.to_unix();
        self.base_instant = now;
    }

    pub fn now(&self, now: Instant) -> DateTime {
        let elapsed = now.saturating_duration_since(self.base_instant).as_secs() as i64;
        DateTime::from_unix(self.base_seconds + elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_round_trip_known_date() {
        // 2025-10-05 14:07:09 UTC
        let dt = DateTime::from_unix(1_759_673_229);
        assert_eq!((dt.year(), dt.month(), dt.day()), (2025, 10, 5));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (14, 7, 9));
        assert_eq!(dt.weekday(), Weekday::Sunday);
        assert_eq!(dt.to_unix(), 1_759_673_229);
    }

    #[test]
    fn test_new_validates_fields() {
        assert!(DateTime::new(2025, 2, 29, 0, 0, 0).is_none());
        assert!(DateTime::new(2024, 2, 29, 0, 0, 0).is_some());
        assert!(DateTime::new(2024, 13, 1, 0, 0, 0).is_none());
        assert!(DateTime::new(2024, 1, 1, 24, 0, 0).is_none());
        assert!(DateTime::new(2024, 4, 31, 0, 0, 0).is_none());
        assert!(DateTime::new(2024, 1, 0, 0, 0, 0).is_none());
    }

    #[test]
    fn test_epoch_and_leap_day_from_unix() {
        let epoch = DateTime::from_unix(0);
        assert_eq!((epoch.year(), epoch.month(), epoch.day()), (1970, 1, 1));
        assert_eq!(epoch.weekday(), Weekday::Thursday);

        // 2024-02-29 12:00:00 UTC
        let leap = DateTime::from_unix(1_709_208_000);
        assert_eq!((leap.month(), leap.day(), leap.hour()), (2, 29, 12));
        assert_eq!(leap.weekday_name(), "Thursday");
    }

    #[test]
    fn test_from_unix_saturates_out_of_range() {
        let far = DateTime::from_unix(i64::MAX);
        assert_eq!((far.year(), far.month(), far.day()), (9_999, 12, 31));
        assert_eq!(DateTime::from_unix(i64::MIN).year(), 0);
    }

    #[test]
    fn test_clock_strings() {
        let dt = DateTime::new(2025, 3, 5, 15, 7, 9).unwrap();
        assert_eq!(dt.weekday_name(), "Wednesday");
        assert_eq!(dt.format_date().as_str(), " 5-Mar-2025");
        assert_eq!(dt.format_time_12h().as_str(), "03:07:09 PM");
    }

    #[test]
    fn test_midnight_and_noon_use_twelve() {
        let midnight = DateTime::new(2025, 12, 25, 0, 0, 0).unwrap();
        assert_eq!(midnight.format_time_12h().as_str(), "12:00:00 AM");
        assert_eq!(midnight.format_date().as_str(), "25-Dec-2025");

        let noon = DateTime::new(2025, 12, 25, 12, 30, 0).unwrap();
        assert_eq!(noon.format_time_12h().as_str(), "12:30:00 PM");
    }

    #[test]
    fn test_system_clock_advances_with_instant() {
        let seed = DateTime::new(2025, 12, 31, 23, 59, 58).unwrap();
        let clock = SystemClock::new(&seed, Instant::from_secs(100));

        let later = clock.now(Instant::from_millis(103_500));
        assert_eq!((later.year(), later.month(), later.day()), (2026, 1, 1));
        assert_eq!((later.hour(), later.minute(), later.second()), (0, 0, 1));
    }
}
