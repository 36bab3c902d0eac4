//! Parsing of the free-text post age strings.
//!
//! The source page never supplies a machine-readable time in its legacy
//! markup, only strings like "23m", "2h", "Jul 9", or "25 Jun 19". These are
//! locale-ambiguous and carry no time zone, so everything resolves against a
//! caller-supplied `now` and a fixed neutral time-of-day.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::error::{Error, Result};
use crate::patterns::RELATIVE_AGE;

/// Hour of day assumed for date-only forms (UTC). The source gives no
/// time-of-day at all for them; noon keeps the date stable across offsets.
const NEUTRAL_HOUR: u32 = 12;

/// Parses a post timestamp string relative to `now`.
///
/// Recognized forms, tried in order:
/// - relative age `<N><unit>`, unit in `s`/`m`/`h`/`d`;
/// - month and day, e.g. `"Jul 9"`: the current year, unless that would land
///   in the future, in which case the previous year;
/// - day, month, two-digit year, e.g. `"25 Jun 19"`.
///
/// The relative form must be tried first: the regexes are anchored so a
/// token like "9h" can never be half-matched by the date forms.
///
/// A day is always exactly 24 hours here. That is wrong across DST
/// transitions, but it matches what the source displays.
pub fn parse_timestamp(s: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Some(caps) = RELATIVE_AGE.captures(s) {
        let quantity: i64 = caps[1].parse().map_err(|_| Error::Format(s.to_string()))?;
        let delta = match &caps[2] {
            "s" => Duration::seconds(quantity),
            "m" => Duration::minutes(quantity),
            "h" => Duration::hours(quantity),
            "d" => Duration::hours(24 * quantity),
            _ => return Err(Error::Format(s.to_string())),
        };
        return Ok(now - delta);
    }

    // "Jul 9", no year given. The fallback compares calendar dates, not
    // instants: today's date is not in the future even before noon.
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{s} {}", now.year()), "%b %d %Y") {
        if date > now.date_naive() {
            let last_year = NaiveDate::from_ymd_opt(date.year() - 1, date.month(), date.day())
                .ok_or_else(|| Error::Format(s.to_string()))?;
            return noon_utc(last_year, s);
        }
        return noon_utc(date, s);
    }

    // "25 Jun 19".
    if let Ok(date) = NaiveDate::parse_from_str(s, "%d %b %y") {
        return noon_utc(date, s);
    }

    Err(Error::Format(s.to_string()))
}

fn noon_utc(date: NaiveDate, original: &str) -> Result<DateTime<Utc>> {
    date.and_hms_opt(NEUTRAL_HOUR, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::Format(original.to_string()))
}
