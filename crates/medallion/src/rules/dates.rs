//! Date parsing and date-derived rules.
//!
//! Nothing here fails: malformed input degrades to `None`.

use chrono::{NaiveDate, NaiveDateTime};

/// Textual date layouts accepted from source extracts.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Date-time layouts whose date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse an 8-digit integer date (YYYYMMDD).
///
/// Zero, negative values, any value whose digit count is not exactly 8 and
/// impossible calendar dates all become `None`.
pub fn parse_yyyymmdd(raw: Option<i64>) -> Option<NaiveDate> {
    let n = raw?;
    if n <= 0 || n.to_string().len() != 8 {
        return None;
    }
    let year = (n / 10_000) as i32;
    let month = ((n / 100) % 100) as u32;
    let day = (n % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a textual date or timestamp, keeping the calendar date.
///
/// Compact `YYYYMMDD` strings are accepted as well.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return parse_yyyymmdd(s.parse().ok());
    }
    None
}

/// Drop dates that lie after `as_of`; such values are logically impossible
/// (a birth date in the future, for instance).
pub fn not_after(date: Option<NaiveDate>, as_of: NaiveDate) -> Option<NaiveDate> {
    date.filter(|d| *d <= as_of)
}

/// The day before `date`, used to close a validity range one unit before the
/// next range opens.
pub fn day_before(date: Option<NaiveDate>) -> Option<NaiveDate> {
    date?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_yyyymmdd_valid() {
        assert_eq!(parse_yyyymmdd(Some(20230115)), Some(ymd(2023, 1, 15)));
    }

    #[test]
    fn test_yyyymmdd_rejects_zero_and_wrong_length() {
        assert_eq!(parse_yyyymmdd(Some(0)), None);
        assert_eq!(parse_yyyymmdd(Some(2023011)), None);
        assert_eq!(parse_yyyymmdd(Some(320230115)), None);
        assert_eq!(parse_yyyymmdd(Some(-20230115)), None);
        assert_eq!(parse_yyyymmdd(None), None);
    }

    #[test]
    fn test_yyyymmdd_impossible_calendar_date() {
        assert_eq!(parse_yyyymmdd(Some(20230231)), None);
        assert_eq!(parse_yyyymmdd(Some(20231301)), None);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date(Some("2025-10-06")), Some(ymd(2025, 10, 6)));
        assert_eq!(parse_date(Some(" 2011-07-01 00:00:00 ")), Some(ymd(2011, 7, 1)));
        assert_eq!(parse_date(Some("20110701")), Some(ymd(2011, 7, 1)));
        assert_eq!(parse_date(Some("not a date")), None);
        assert_eq!(parse_date(Some("")), None);
    }

    #[test]
    fn test_not_after() {
        let today = ymd(2024, 6, 1);
        assert_eq!(not_after(Some(ymd(2030, 1, 1)), today), None);
        assert_eq!(not_after(Some(ymd(1970, 1, 1)), today), Some(ymd(1970, 1, 1)));
        assert_eq!(not_after(Some(today), today), Some(today));
    }

    #[test]
    fn test_day_before() {
        assert_eq!(day_before(Some(ymd(2023, 3, 1))), Some(ymd(2023, 2, 28)));
        assert_eq!(day_before(None), None);
    }
}
