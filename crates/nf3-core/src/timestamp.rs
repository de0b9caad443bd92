//! Compact `YYYYMMDDHH` timestamps and calendar bucketing.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use nf3_common::Granularity;
use serde::{Deserialize, Serialize};

const TSTAMP_DIGITS: usize = 10;

/// Parse a `YYYYMMDDHH` timestamp.
///
/// Surrounding whitespace is trimmed and anything after the tenth character
/// is ignored, so `2024010112.0` (a number round-tripped through a
/// spreadsheet) parses the same as `2024010112`. Returns `None` for short
/// input, non-digits, or an impossible calendar date or hour.
pub fn parse_tstamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    let bytes = raw.as_bytes();
    if bytes.len() < TSTAMP_DIGITS || !bytes[..TSTAMP_DIGITS].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let digits = &raw[..TSTAMP_DIGITS];
    let year: i32 = digits[0..4].parse().ok()?;
    let month: u32 = digits[4..6].parse().ok()?;
    let day: u32 = digits[6..8].parse().ok()?;
    let hour: u32 = digits[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, 0, 0)
}

/// One calendar bucket: its first day plus a display label.
///
/// Ordering follows `start`, which is chronological.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bucket {
    pub start: NaiveDate,
    pub label: String,
}

/// First day of the bucket containing `date`.
pub fn bucket_start(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
        Granularity::Month => date - Days::new(u64::from(date.day0())),
        Granularity::Quarter => {
            let first_month = date.month0() / 3 * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), first_month, 1).unwrap_or(date)
        }
        Granularity::Year => date - Days::new(u64::from(date.ordinal0())),
    }
}

/// Display label for the bucket containing `date`.
///
/// `2024`, `2024-Q1`, `2024-03`, `2024-W09` (ISO week), `2024-03-01`.
pub fn bucket_label(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => date.format("%Y-%m-%d").to_string(),
        Granularity::Week => {
            let week = date.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        Granularity::Month => date.format("%Y-%m").to_string(),
        Granularity::Quarter => format!("{}-Q{}", date.year(), date.month0() / 3 + 1),
        Granularity::Year => date.year().to_string(),
    }
}

pub fn bucket_for(date: NaiveDate, granularity: Granularity) -> Bucket {
    let start = bucket_start(date, granularity);
    Bucket {
        start,
        label: bucket_label(start, granularity),
    }
}

/// `YYYY-MM` key of the calendar month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_valid_stamps() {
        let ts = parse_tstamp("2024010112").unwrap();
        assert_eq!(ts, d(2024, 1, 1).and_hms_opt(12, 0, 0).unwrap());
        assert_eq!(parse_tstamp(" 2024022923 "), d(2024, 2, 29).and_hms_opt(23, 0, 0));
    }

    #[test]
    fn ignores_trailing_characters() {
        assert_eq!(parse_tstamp("2024010112.0"), parse_tstamp("2024010112"));
        assert_eq!(parse_tstamp("202401011245"), parse_tstamp("2024010112"));
    }

    #[test]
    fn rejects_malformed_stamps() {
        assert_eq!(parse_tstamp(""), None);
        assert_eq!(parse_tstamp("202401"), None);
        assert_eq!(parse_tstamp("2024-01-01"), None);
        assert_eq!(parse_tstamp("2023022912"), None);
        assert_eq!(parse_tstamp("2024013224"), None);
        assert_eq!(parse_tstamp("2024010124"), None);
        assert_eq!(parse_tstamp("２０２４０１０１１２"), None);
    }

    #[test]
    fn bucket_starts() {
        let date = d(2024, 2, 28); // Wednesday
        assert_eq!(bucket_start(date, Granularity::Day), date);
        assert_eq!(bucket_start(date, Granularity::Week), d(2024, 2, 26));
        assert_eq!(bucket_start(date, Granularity::Month), d(2024, 2, 1));
        assert_eq!(bucket_start(date, Granularity::Quarter), d(2024, 1, 1));
        assert_eq!(bucket_start(d(2024, 12, 31), Granularity::Quarter), d(2024, 10, 1));
        assert_eq!(bucket_start(date, Granularity::Year), d(2024, 1, 1));
    }

    #[test]
    fn bucket_labels() {
        let date = d(2024, 3, 1);
        assert_eq!(bucket_for(date, Granularity::Day).label, "2024-03-01");
        assert_eq!(bucket_for(date, Granularity::Week).label, "2024-W09");
        assert_eq!(bucket_for(date, Granularity::Month).label, "2024-03");
        assert_eq!(bucket_for(date, Granularity::Quarter).label, "2024-Q1");
        assert_eq!(bucket_for(date, Granularity::Year).label, "2024");
    }

    #[test]
    fn iso_week_crosses_year_boundary() {
        // 2024-12-30 is the Monday of ISO week 2025-W01.
        let b = bucket_for(d(2025, 1, 1), Granularity::Week);
        assert_eq!(b.start, d(2024, 12, 30));
        assert_eq!(b.label, "2025-W01");
    }
}
