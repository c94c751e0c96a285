//! Time utilities: resolving whole days against a caller's time zone.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::error::{EngineError, Result};

/// Parse an IANA zone name like "Europe/Berlin".
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| EngineError::InvalidTimezone(name.to_string()))
}

/// The first instant of `date` in `tz`.
///
/// If local midnight falls into a DST gap (some zones switch at 00:00), the
/// first existing local instant of that day is used instead.
pub fn start_of_day<Z: TimeZone>(date: NaiveDate, tz: &Z) -> DateTime<Z> {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(dt) = tz.from_local_datetime(&midnight).earliest() {
        return dt;
    }
    // gaps are at most a few hours wide
    (1..=4)
        .filter_map(|h| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(h)))
                .earliest()
        })
        .next()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Seconds since the Unix epoch as a float, for interpolation math.
pub(crate) fn epoch_seconds<Z: TimeZone>(dt: &DateTime<Z>) -> f64 {
    dt.timestamp() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Europe/Berlin").unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(
            parse_timezone("Mars/Olympus_Mons"),
            Err(EngineError::InvalidTimezone("Mars/Olympus_Mons".into()))
        );
    }

    #[test]
    fn test_start_of_day_in_berlin() {
        // January is CET (UTC+1)
        let d = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let dt = start_of_day(d, &chrono_tz::Europe::Berlin);
        assert_eq!(dt.to_rfc3339(), "2024-01-03T00:00:00+01:00");
    }

    #[test]
    fn test_start_of_day_inside_midnight_gap() {
        // Santiago springs forward at 00:00 -> 01:00 in September
        let d = NaiveDate::from_ymd_opt(2023, 9, 3).unwrap();
        let dt = start_of_day(d, &chrono_tz::America::Santiago);
        assert_eq!(dt.date_naive(), d);
        assert_eq!(dt.to_rfc3339(), "2023-09-03T01:00:00-03:00");
    }
}
