//! Date decoding for imported cells
//!
//! Numeric cells are Excel serial dates (1900 system). Text cells may carry
//! CJK year/month/day suffixes such as `2024年`, `2024年3月` or `2024年3月5日`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

const YEAR_MARKERS: &[char] = &['年'];
const MONTH_MARKERS: &[char] = &['月'];
const DAY_MARKERS: &[char] = &['日', '号'];

/// `2024-03-05`, `2024/3/5`, `2024.03`, optionally followed by a time
fn ymd_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(\d{1,4})[-/.](\d{1,2})(?:[-/.](\d{1,2}))?(?:[ T](\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?)?$",
        )
        .expect("date pattern is valid")
    })
}

/// Fallback formats tried after the numeric Y-M-D pattern.
const EXTRA_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M", "%Y%m%d"];
const EXTRA_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%d %B %Y", "%B %d, %Y", "%d-%b-%Y"];

/// Convert an Excel 1900-system serial number into a date-time.
///
/// Serial 1 is 1900-01-01. Excel counts a non-existent 1900-02-29 (serial
/// 60), so serials above 60 are shifted back by one day.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let days = serial.trunc() as i64;
    let millis = ((serial - serial.trunc()) * 86_400_000.0).round() as i64;

    let base = if days > 60 {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    };

    let midnight = base.checked_add_signed(Duration::days(days))?.and_time(NaiveTime::MIN);
    midnight.checked_add_signed(Duration::milliseconds(millis))
}

/// Inverse of `serial_to_datetime`.
pub fn datetime_to_serial(value: NaiveDateTime) -> f64 {
    let Some(base) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return 0.0;
    };
    let elapsed = value - base.and_time(NaiveTime::MIN);
    let mut serial = elapsed.num_milliseconds() as f64 / 86_400_000.0;
    if serial < 61.0 {
        serial -= 1.0;
    }
    serial
}

/// Parse date text, honouring year/month/day suffix markers.
///
/// - ends with a year marker: year only, padded to January 1st
/// - ends with a month marker: year and month, padded to day 1
/// - no markers at all: parsed directly, then as a bare year
/// - otherwise markers are turned into separators and the result parsed
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let has_year = text.contains(YEAR_MARKERS);
    let has_month = text.contains(MONTH_MARKERS);
    let has_day = text.contains(DAY_MARKERS);

    if text.ends_with(YEAR_MARKERS) {
        return year_only(text.trim_end_matches(YEAR_MARKERS));
    }

    if text.ends_with(MONTH_MARKERS) {
        let stripped = text.trim_end_matches(MONTH_MARKERS);
        return parse_plain(&markers_to_separators(stripped));
    }

    if !has_year && !has_month && !has_day {
        return parse_plain(text).or_else(|| year_only(text));
    }

    parse_plain(&markers_to_separators(text))
}

fn markers_to_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if YEAR_MARKERS.contains(&ch) || MONTH_MARKERS.contains(&ch) {
            out.push('-');
        } else if DAY_MARKERS.contains(&ch) {
            out.push(' ');
        } else if !ch.is_whitespace() || !out.ends_with(['-', ' ']) {
            out.push(ch);
        }
    }
    out.trim().trim_end_matches('-').to_string()
}

fn year_only(text: &str) -> Option<NaiveDateTime> {
    let year: i32 = text.trim().parse().ok()?;
    if !(1..=9999).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, 1, 1).map(|d| d.and_time(NaiveTime::MIN))
}

fn parse_plain(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Some(caps) = ymd_pattern().captures(text) {
        let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
        let date = NaiveDate::from_ymd_opt(year, num(2)?, num(3).unwrap_or(1))?;
        let nanos = caps
            .get(7)
            .and_then(|m| format!("{:0<9}", m.as_str()).parse::<u32>().ok())
            .unwrap_or(0);
        let time = NaiveTime::from_hms_nano_opt(
            num(4).unwrap_or(0),
            num(5).unwrap_or(0),
            num(6).unwrap_or(0),
            nanos,
        )?;
        return Some(date.and_time(time));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    for fmt in EXTRA_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }

    EXTRA_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}
