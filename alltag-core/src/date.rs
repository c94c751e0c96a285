//! Calendar dates without time of day or time zone.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::time::start_of_day;

// the text form has exactly four year digits
const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

static DATE_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

/// A calendar date. Like a timestamp, but with neither time of day nor zone.
///
/// Always a valid Gregorian date. Serializes as `"yyyy-mm-dd"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// 1970-01-01. Stands in for "no date set yet".
    pub fn epoch() -> Self {
        // chrono's default date is the Unix epoch
        Self(NaiveDate::default())
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| EngineError::InvalidCalendarDate(format!("{year:04}-{month:02}-{day:02}")))?;
        Self::within_range(date, 0)
    }

    /// The date of `dt` as seen in its own time zone.
    pub fn from_datetime<Z: TimeZone>(dt: &DateTime<Z>) -> Result<Self> {
        Self::within_range(dt.date_naive(), 0)
    }

    /// Only years 0000 through 9999 survive a format/parse round trip.
    fn within_range(date: NaiveDate, days: i64) -> Result<Self> {
        if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            Ok(Self(date))
        } else {
            Err(EngineError::DateOutOfRange {
                date: date.to_string(),
                days,
            })
        }
    }

    /// Parse a date string in the format "yyyy-mm-dd".
    pub fn parse(input: &str) -> Result<Self> {
        if !DATE_RX.is_match(input) {
            return Err(EngineError::MalformedInput(input.to_string()));
        }
        let field = |range: std::ops::Range<usize>| -> Result<u32> {
            input[range]
                .parse()
                .map_err(|_| EngineError::MalformedInput(input.to_string()))
        };
        let (year, month, day) = (field(0..4)?, field(5..7)?, field(8..10)?);
        NaiveDate::from_ymd_opt(year as i32, month, day)
            .map(Self)
            .ok_or_else(|| EngineError::InvalidCalendarDate(input.to_string()))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn is_epoch(&self) -> bool {
        *self == Self::epoch()
    }

    /// The instant at which this day starts in `tz`.
    pub fn first_second_in<Z: TimeZone>(&self, tz: &Z) -> DateTime<Z> {
        start_of_day(self.0, tz)
    }

    pub fn before(&self, other: &Self) -> bool {
        self < other
    }

    pub fn after(&self, other: &Self) -> bool {
        self > other
    }

    /// Number of days from `other` to `self`; negative if `other.after(self)`.
    pub fn sub(&self, other: &Self) -> i64 {
        // subtract in UTC so that DST transitions cannot skew the count
        let lhs = self.first_second_in(&Utc);
        let rhs = other.first_second_in(&Utc);
        (lhs - rhs).num_days()
    }

    /// Shift by that many days into the future (or the past, if negative).
    pub fn add_days(&self, days: i64) -> Result<Self> {
        let out_of_range = || EngineError::DateOutOfRange {
            date: self.to_string(),
            days,
        };
        // same reasoning as in sub(): anchor on UTC midnight
        let shifted = TimeDelta::try_days(days)
            .and_then(|delta| self.first_second_in(&Utc).checked_add_signed(delta))
            .ok_or_else(out_of_range)?;
        Self::within_range(shifted.date_naive(), days).map_err(|_| out_of_range())
    }
}

impl Default for CalendarDate {
    fn default() -> Self {
        Self::epoch()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<CalendarDate> for String {
    fn from(d: CalendarDate) -> Self {
        d.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    #[test]
    fn test_parse_and_format() {
        let d = date("2024-02-29");
        assert_eq!((d.year(), d.month(), d.day()), (2024, 2, 29));
        assert_eq!(d.to_string(), "2024-02-29");
        assert_eq!(date("0999-01-01").to_string(), "0999-01-01");
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        for input in ["", "2024-1-05", "24-01-05", "2024/01/05", "2024-01-05 ", "2024-01-05T00:00"] {
            assert_eq!(
                CalendarDate::parse(input),
                Err(EngineError::MalformedInput(input.to_string())),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_impossible_dates() {
        for input in ["2024-04-31", "2023-02-29", "2024-13-01", "2024-00-10", "2024-01-00"] {
            assert_eq!(
                CalendarDate::parse(input),
                Err(EngineError::InvalidCalendarDate(input.to_string())),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_from_ymd() {
        assert_eq!(CalendarDate::from_ymd(2024, 2, 29).unwrap(), date("2024-02-29"));
        assert_eq!(
            CalendarDate::from_ymd(2023, 2, 29),
            Err(EngineError::InvalidCalendarDate("2023-02-29".into()))
        );
    }

    #[test]
    fn test_epoch() {
        let e = CalendarDate::epoch();
        assert_eq!(e.to_string(), "1970-01-01");
        assert!(e.is_epoch());
        assert_eq!(CalendarDate::default(), e);
    }

    #[test]
    fn test_ordering() {
        let a = date("2023-12-31");
        let b = date("2024-01-01");
        assert!(a.before(&b));
        assert!(b.after(&a));
        assert!(!a.after(&a) && !a.before(&a));
    }

    #[test]
    fn test_sub_is_antisymmetric() {
        let pairs = [
            ("2024-01-01", "2024-01-05"),
            ("2024-03-30", "2024-04-01"),
            ("1970-01-01", "2024-10-27"),
            ("2023-02-28", "2024-02-29"),
        ];
        for (a, b) in pairs {
            let (a, b) = (date(a), date(b));
            assert_eq!(a.sub(&b), -b.sub(&a));
        }
        assert_eq!(date("2024-01-05").sub(&date("2024-01-01")), 4);
        assert_eq!(date("2024-03-01").sub(&date("2023-03-01")), 366);
    }

    #[test]
    fn test_add_days_round_trip() {
        // crosses the European spring-forward and fall-back weekends
        let start = date("2024-03-25");
        for n in [-400, -31, -1, 0, 1, 7, 220, 3650] {
            let shifted = start.add_days(n).unwrap();
            assert_eq!(shifted.sub(&start), n);
            assert_eq!(shifted.add_days(-n).unwrap(), start);
        }
        assert_eq!(date("2024-02-28").add_days(1).unwrap(), date("2024-02-29"));
        assert_eq!(date("2024-12-31").add_days(1).unwrap(), date("2025-01-01"));
    }

    #[test]
    fn test_add_days_out_of_range() {
        let err = date("2024-01-01").add_days(i64::MAX).unwrap_err();
        assert!(matches!(err, EngineError::DateOutOfRange { .. }));
    }

    #[test]
    fn test_add_days_stays_within_four_digit_years() {
        assert_eq!(
            date("9999-12-31").add_days(1),
            Err(EngineError::DateOutOfRange {
                date: "9999-12-31".into(),
                days: 1
            })
        );
        assert_eq!(
            date("0000-01-01").add_days(-1),
            Err(EngineError::DateOutOfRange {
                date: "0000-01-01".into(),
                days: -1
            })
        );
        assert!(date("2024-01-01").add_days(3_000_000).is_err());

        // the last representable days still round-trip through text
        for edge in [date("9999-12-30").add_days(1), date("0000-01-02").add_days(-1)] {
            let edge = edge.unwrap();
            assert_eq!(CalendarDate::parse(&edge.to_string()).unwrap(), edge);
        }
    }

    #[test]
    fn test_from_ymd_and_datetime_reject_five_digit_years() {
        assert!(matches!(
            CalendarDate::from_ymd(10000, 1, 1),
            Err(EngineError::DateOutOfRange { .. })
        ));
        assert!(matches!(
            CalendarDate::from_ymd(-1, 12, 31),
            Err(EngineError::DateOutOfRange { .. })
        ));
        let far = Utc.with_ymd_and_hms(12000, 6, 1, 0, 0, 0).unwrap();
        assert!(CalendarDate::from_datetime(&far).is_err());
        let near = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(CalendarDate::from_datetime(&near).unwrap(), date("2024-06-01"));
    }

    #[test]
    fn test_serde_as_string() {
        let d = date("2024-07-14");
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"2024-07-14\"");
        let back: CalendarDate = serde_json::from_str("\"2024-07-14\"").unwrap();
        assert_eq!(back, d);
        assert!(serde_json::from_str::<CalendarDate>("\"2024-07-32\"").is_err());
    }
}
