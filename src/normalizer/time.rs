//! Best-effort timestamp parsing for feed dates.
//!
//! Feeds disagree wildly on date formats. Layouts are tried in a fixed order
//! and the first that matches wins. Zone abbreviations such as `EST` or `IST`
//! are not globally unique, so every named zone is read as UTC. This is a
//! known approximation and is kept on purpose.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

#[derive(Debug, Clone, Copy)]
enum Layout {
    /// RFC 1123 shape with a numeric offset, weekday optional.
    NumericZone(&'static str),
    /// RFC 1123 shape ending in a zone abbreviation, read as UTC.
    NamedZone(&'static str),
    Rfc3339,
    /// Offset-bearing ISO 8601 without weekday handling.
    Iso(&'static str),
    DateOnly,
}

const LAYOUTS: &[Layout] = &[
    Layout::NumericZone("%d %b %Y %H:%M:%S %z"),
    Layout::NumericZone("%e %b %Y %H:%M:%S %z"),
    Layout::NamedZone("%d %b %Y %H:%M:%S"),
    Layout::NamedZone("%e %b %Y %H:%M:%S"),
    Layout::NamedZone("%e %B %Y %H:%M:%S"),
    Layout::Rfc3339,
    Layout::Iso("%Y-%m-%dT%H:%M:%S%z"),
    Layout::DateOnly,
];

/// Parses a feed timestamp. Returns `None` when no known layout matches.
pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    LAYOUTS.iter().find_map(|layout| layout.parse(raw))
}

impl Layout {
    fn parse(self, raw: &str) -> Option<DateTime<Utc>> {
        match self {
            Layout::NumericZone(fmt) => DateTime::parse_from_str(strip_weekday(raw), fmt)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::NamedZone(fmt) => {
                let (stamp, zone) = strip_weekday(raw).rsplit_once(' ')?;
                if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
                    return None;
                }
                NaiveDateTime::parse_from_str(stamp.trim_end(), fmt)
                    .ok()
                    .map(|naive| naive.and_utc())
            }
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::Iso(fmt) => DateTime::parse_from_str(raw, fmt)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Layout::DateOnly => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc()),
        }
    }
}

/// Drops a leading `Mon, ` so a wrong weekday cannot reject a valid date.
fn strip_weekday(raw: &str) -> &str {
    match raw.split_once(',') {
        Some((day, rest)) if !day.is_empty() && day.chars().all(|c| c.is_ascii_alphabetic()) => {
            rest.trim_start()
        }
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_rfc1123_numeric_zone() {
        assert_eq!(
            parse_time("Mon, 02 Jan 2006 15:04:05 -0700"),
            Some(utc(2006, 1, 2, 22, 4, 5))
        );
    }

    #[test]
    fn test_rfc1123_single_digit_day() {
        assert_eq!(
            parse_time("Mon, 2 Jan 2006 15:04:05 +0100"),
            Some(utc(2006, 1, 2, 14, 4, 5))
        );
    }

    #[test]
    fn test_rfc1123_named_zone_is_utc() {
        assert_eq!(
            parse_time("Mon, 01 Jan 2024 00:00:00 GMT"),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            parse_time("Fri, 22 Jul 2022 10:30:00 EST"),
            Some(utc(2022, 7, 22, 10, 30, 0))
        );
    }

    #[test]
    fn test_full_month_name() {
        assert_eq!(
            parse_time("Monday, 23 November 2020 08:15:00 PST"),
            Some(utc(2020, 11, 23, 8, 15, 0))
        );
        assert_eq!(
            parse_time("Mon, 2 January 2006 15:04:05 MST"),
            Some(utc(2006, 1, 2, 15, 4, 5))
        );
    }

    #[test]
    fn test_wrong_weekday_still_parses() {
        assert_eq!(
            parse_time("Sun, 02 Jan 2006 15:04:05 +0000"),
            Some(utc(2006, 1, 2, 15, 4, 5))
        );
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            parse_time("2022-07-22T01:00:00Z"),
            Some(utc(2022, 7, 22, 1, 0, 0))
        );
        assert_eq!(
            parse_time("2022-07-22T03:00:00.250+02:00").map(|t| t.timestamp()),
            Some(utc(2022, 7, 22, 1, 0, 0).timestamp())
        );
    }

    #[test]
    fn test_numeric_offset_without_colon() {
        assert_eq!(
            parse_time("2020-11-23T10:00:00-0500"),
            Some(utc(2020, 11, 23, 15, 0, 0))
        );
    }

    #[test]
    fn test_date_only_is_midnight_utc() {
        assert_eq!(parse_time("2020-11-23"), Some(utc(2020, 11, 23, 0, 0, 0)));
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        assert_eq!(
            parse_time("\n   2020-11-23\t "),
            Some(utc(2020, 11, 23, 0, 0, 0))
        );
    }

    #[test]
    fn test_unparseable_returns_none() {
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("yesterday"), None);
        assert_eq!(parse_time("2020-13-45"), None);
        assert_eq!(parse_time("Mon, 02 Jan 2006 15:04:05 +0000 trailing"), None);
    }

    #[test]
    fn test_reparsing_rfc3339_output_is_stable() {
        let inputs = [
            "Mon, 02 Jan 2006 15:04:05 -0700",
            "Mon, 2 January 2006 15:04:05 MST",
            "2022-07-22T03:00:00+02:00",
            "2020-11-23T10:00:00-0500",
            "2020-11-23",
        ];
        for raw in inputs {
            let parsed = parse_time(raw).unwrap();
            assert_eq!(parse_time(&parsed.to_rfc3339()), Some(parsed), "{raw}");
        }
    }
}
