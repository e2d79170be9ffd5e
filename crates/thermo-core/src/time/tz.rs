//! POSIX TZ rules (`std offset [dst [offset] ,start[/time],end[/time]]`)
//!
//! Only the `Mm.w.d` transition form is supported, which covers every
//! rule shipped with the device. Offsets follow POSIX sign rules: the
//! written offset is *west* of UTC, so `ACST-9:30` is UTC+09:30.

use crate::app_state::{AppError, FromUnchecked};

use ::time::{Date, Month, Weekday};

use super::DateTime;

const DEFAULT_TRANSITION_SECS: i32 = 2 * 3_600;

/// A DST transition on the `week`th `weekday` of `month` (week 5 = last).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    month: Month,
    week: u8,
    weekday: Weekday,
    /// Local wall-clock time of the switch, seconds after midnight.
    time_secs: i32,
}

impl Transition {
    fn date_in(&self, year: i32) -> Option<Date> {
        if year >= Date::MAX.year() {
            return None;
        }

        let last_of_previous = Date::from_calendar_date(year, self.month, 1)
            .ok()?
            .previous_day()?;
        let day = last_of_previous.nth_next_occurrence(self.weekday, self.week);
        if day.month() == self.month {
            Some(day)
        } else {
            // Month has only four of this weekday
            Some(day.prev_occurrence(self.weekday))
        }
    }

    /// Local seconds since the epoch at which this transition happens in `year`.
    fn local_seconds(&self, year: i32) -> Option<i64> {
        let date = self.date_in(year)?;
        Some(date.midnight().assume_utc().unix_timestamp() + i64::from(self.time_secs))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DaylightSaving {
    offset_secs: i32,
    start: Transition,
    end: Transition,
}

/// Parsed timezone rule; offsets are stored east-positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TzRule {
    std_offset_secs: i32,
    dst: Option<DaylightSaving>,
}

impl TzRule {
    pub const UTC: TzRule = TzRule {
        std_offset_secs: 0,
        dst: None,
    };

    pub fn parse(rule: &str) -> Result<Self, AppError> {
        let mut cursor = Cursor::new(rule.as_bytes());

        cursor.name()?;
        let std_offset_secs = -cursor.offset()?;

        if cursor.at_end() {
            return Ok(Self {
                std_offset_secs,
                dst: None,
            });
        }

        cursor.name()?;
        let offset_secs = if cursor.peek() == Some(b',') {
            std_offset_secs + 3_600
        } else {
            -cursor.offset()?
        };

        cursor.expect(b',')?;
        let start = cursor.transition()?;
        cursor.expect(b',')?;
        let end = cursor.transition()?;

        if !cursor.at_end() {
            return Err(invalid("trailing characters"));
        }

        Ok(Self {
            std_offset_secs,
            dst: Some(DaylightSaving {
                offset_secs,
                start,
                end,
            }),
        })
    }

    /// Offset from UTC, in seconds east, in effect at `utc_seconds`.
    pub fn offset_at(&self, utc_seconds: i64) -> i32 {
        let Some(dst) = self.dst else {
            return self.std_offset_secs;
        };

        let year = i32::from(DateTime::from_unix(utc_seconds + i64::from(self.std_offset_secs)).year());
        let (Some(start_local), Some(end_local)) =
            (dst.start.local_seconds(year), dst.end.local_seconds(year))
        else {
            return self.std_offset_secs;
        };
        let start_utc = start_local - i64::from(self.std_offset_secs);
        let end_utc = end_local - i64::from(dst.offset_secs);

        let in_dst = if start_utc < end_utc {
            utc_seconds >= start_utc && utc_seconds < end_utc
        } else {
            // Southern hemisphere: DST spans the new year
            utc_seconds >= start_utc || utc_seconds < end_utc
        };

        if in_dst { dst.offset_secs } else { self.std_offset_secs }
    }

    pub fn to_local(&self, utc_seconds: i64) -> DateTime {
        DateTime::from_unix(utc_seconds + i64::from(self.offset_at(utc_seconds)))
    }
}

fn invalid(reason: &str) -> AppError {
    AppError::Config(heapless::String::from_unchecked(reason))
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn expect(&mut self, byte: u8) -> Result<(), AppError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(invalid("malformed TZ rule"))
        }
    }

    /// Zone abbreviation, either alphabetic or `<quoted>`.
    fn name(&mut self) -> Result<(), AppError> {
        let start = self.pos;
        if self.peek() == Some(b'<') {
            self.pos += 1;
            while self.peek().is_some_and(|b| b != b'>') {
                self.pos += 1;
            }
            return self.expect(b'>');
        }

        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if self.pos - start < 3 {
            return Err(invalid("TZ name too short"));
        }
        Ok(())
    }

    fn number(&mut self) -> Result<i32, AppError> {
        let start = self.pos;
        let mut value: i32 = 0;
        while let Some(digit) = self.peek().filter(u8::is_ascii_digit) {
            value = value * 10 + i32::from(digit - b'0');
            self.pos += 1;
            if self.pos - start > 3 {
                return Err(invalid("TZ number too long"));
            }
        }
        if self.pos == start {
            return Err(invalid("expected a number in TZ rule"));
        }
        Ok(value)
    }

    /// `[+-]hh[:mm[:ss]]` as signed seconds, in the sign convention written.
    fn offset(&mut self) -> Result<i32, AppError> {
        let sign = match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                -1
            }
            Some(b'+') => {
                self.pos += 1;
                1
            }
            _ => 1,
        };

        let mut seconds = self.number()? * 3_600;
        if self.peek() == Some(b':') {
            self.pos += 1;
            seconds += self.number()? * 60;
            if self.peek() == Some(b':') {
                self.pos += 1;
                seconds += self.number()?;
            }
        }
        Ok(sign * seconds)
    }

    /// `Mm.w.d[/time]`
    fn transition(&mut self) -> Result<Transition, AppError> {
        self.expect(b'M')?;
        let month = self.number()?;
        self.expect(b'.')?;
        let week = self.number()?;
        self.expect(b'.')?;
        let weekday = self.number()?;

        if !(1..=12).contains(&month) || !(1..=5).contains(&week) || !(0..=6).contains(&weekday) {
            return Err(invalid("TZ transition out of range"));
        }

        let time_secs = if self.peek() == Some(b'/') {
            self.pos += 1;
            self.offset()?
        } else {
            DEFAULT_TRANSITION_SECS
        };

        let month = Month::try_from(month as u8).map_err(|_| invalid("TZ transition out of range"))?;
        Ok(Transition {
            month,
            week: week as u8,
            weekday: Weekday::Sunday.nth_next(weekday as u8),
            time_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TIMEZONE;

    fn utc(year: u16, month: u8, day: u8, hour: u8, minute: u8) -> i64 {
        DateTime::new(year, month, day, hour, minute, 0).unwrap().to_unix()
    }

    #[test]
    fn test_adelaide_summer_and_winter_offsets() {
        let rule = TzRule::parse(DEFAULT_TIMEZONE).unwrap();
        assert_eq!(rule.offset_at(utc(2025, 1, 15, 0, 0)), 37_800);
        assert_eq!(rule.offset_at(utc(2025, 7, 1, 0, 0)), 34_200);

        let local = rule.to_local(utc(2025, 1, 15, 0, 0));
        assert_eq!((local.day(), local.hour(), local.minute()), (15, 10, 30));
    }

    #[test]
    fn test_adelaide_dst_starts_first_sunday_of_october() {
        let rule = TzRule::parse(DEFAULT_TIMEZONE).unwrap();
        // 2025-10-05 02:00 ACST == 2025-10-04 16:30 UTC
        let switch = utc(2025, 10, 4, 16, 30);
        assert_eq!(rule.offset_at(switch - 1), 34_200);
        assert_eq!(rule.offset_at(switch), 37_800);
    }

    #[test]
    fn test_adelaide_dst_ends_first_sunday_of_april() {
        let rule = TzRule::parse(DEFAULT_TIMEZONE).unwrap();
        // 2025-04-06 03:00 ACDT == 2025-04-05 16:30 UTC
        let switch = utc(2025, 4, 5, 16, 30);
        assert_eq!(rule.offset_at(switch - 1), 37_800);
        assert_eq!(rule.offset_at(switch), 34_200);
    }

    #[test]
    fn test_last_week_rule() {
        let rule = TzRule::parse("CET-1CEST,M3.5.0,M10.5.0/3").unwrap();
        // Last Sunday of March 2025 is the 30th; 02:00 CET == 01:00 UTC
        assert_eq!(rule.offset_at(utc(2025, 3, 30, 0, 59)), 3_600);
        assert_eq!(rule.offset_at(utc(2025, 3, 30, 1, 0)), 7_200);
        assert_eq!(rule.offset_at(utc(2025, 12, 1, 0, 0)), 3_600);
    }

    #[test]
    fn test_transition_dates_follow_calendar() {
        let first_sunday_october = Transition {
            month: Month::October,
            week: 1,
            weekday: Weekday::Sunday,
            time_secs: DEFAULT_TRANSITION_SECS,
        };
        // 2023-10-01 is itself a Sunday
        assert_eq!(
            first_sunday_october.date_in(2023),
            Date::from_calendar_date(2023, Month::October, 1).ok()
        );
        assert_eq!(
            first_sunday_october.date_in(2025),
            Date::from_calendar_date(2025, Month::October, 5).ok()
        );

        let last_friday_february = Transition {
            month: Month::February,
            week: 5,
            weekday: Weekday::Friday,
            time_secs: 0,
        };
        assert_eq!(
            last_friday_february.date_in(2024),
            Date::from_calendar_date(2024, Month::February, 23).ok()
        );
        assert_eq!(last_friday_february.date_in(9_999), None);
    }

    #[test]
    fn test_fixed_offset_rule() {
        let rule = TzRule::parse("<+0545>-5:45").unwrap();
        assert_eq!(rule.offset_at(0), 20_700);
        assert_eq!(TzRule::parse("UTC0").unwrap(), TzRule::UTC);
    }

    #[test]
    fn test_malformed_rules_are_rejected() {
        assert!(TzRule::parse("").is_err());
        assert!(TzRule::parse("ACST").is_err());
        assert!(TzRule::parse("ACST-9:30ACDT,J60,J300").is_err());
        assert!(TzRule::parse("ACST-9:30ACDT,M13.1.0,M4.1.0").is_err());
    }
}
