//! Strict date and timestamp formats.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::CheckOutcome;
use crate::violation::Violation;

fn all_digits(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_digit)
}

fn digits_value(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// Rejects missing zero padding, other separators, month outside 1–12 and
/// day outside the month's length (leap years included).
pub fn parse_date(s: &str) -> Result<NaiveDate, &'static str> {
    let b = s.as_bytes();
    if b.is_empty() {
        return Err("empty date");
    }
    if b.len() != 10 {
        return Err("expected YYYY-MM-DD");
    }
    if b[4] != b'-' || b[7] != b'-' {
        return Err("expected '-' separators");
    }
    if !all_digits(&b[0..4]) || !all_digits(&b[5..7]) || !all_digits(&b[8..10]) {
        return Err("expected digits in YYYY-MM-DD");
    }
    let year = digits_value(&b[0..4]) as i32;
    let month = digits_value(&b[5..7]);
    let day = digits_value(&b[8..10]);
    if !(1..=12).contains(&month) {
        return Err("month out of range");
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or("day out of range for month")
}

/// Parse `YYYY-MM-DDTHH:MM:SS` with an optional 1–6 digit fractional second.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, &'static str> {
    let b = s.as_bytes();
    if b.is_empty() {
        return Err("empty timestamp");
    }
    if b.len() < 19 || b[10] != b'T' {
        return Err("expected YYYY-MM-DDTHH:MM:SS");
    }
    let date = parse_date(&s[..10])?;
    if b[13] != b':' || b[16] != b':' {
        return Err("expected ':' separators");
    }
    if !all_digits(&b[11..13]) || !all_digits(&b[14..16]) || !all_digits(&b[17..19]) {
        return Err("expected digits in HH:MM:SS");
    }
    let hour = digits_value(&b[11..13]);
    let minute = digits_value(&b[14..16]);
    let second = digits_value(&b[17..19]);
    if hour > 23 {
        return Err("hour out of range");
    }
    if minute > 59 {
        return Err("minute out of range");
    }
    if second > 59 {
        return Err("second out of range");
    }

    let mut micros = 0;
    if b.len() > 19 {
        let fraction = &b[20..];
        if b[19] != b'.' || fraction.is_empty() || fraction.len() > 6 || !all_digits(fraction) {
            return Err("expected optional .ffffff fraction");
        }
        micros = digits_value(fraction) * 10u32.pow(6 - fraction.len() as u32);
    }

    date.and_hms_micro_opt(hour, minute, second, micros)
        .ok_or("time out of range")
}

/// Check a JSON value holds a strict `YYYY-MM-DD` date string.
pub fn validate_date_format(value: &Value, path: &str) -> CheckOutcome {
    let mut outcome = CheckOutcome::default();
    let reason = match value.as_str() {
        Some(s) => parse_date(s).err(),
        None => Some("expected a date string"),
    };
    if let Some(reason) = reason {
        outcome.error(Violation::InvalidDate {
            path: path.to_string(),
            value: value.to_string(),
            reason,
        });
    }
    outcome
}

/// Check a JSON value holds a `YYYY-MM-DDTHH:MM:SS[.ffffff]` timestamp string.
pub fn validate_timestamp(value: &Value, path: &str) -> CheckOutcome {
    let mut outcome = CheckOutcome::default();
    let reason = match value.as_str() {
        Some(s) => parse_timestamp(s).err(),
        None => Some("expected a timestamp string"),
    };
    if let Some(reason) = reason {
        outcome.error(Violation::InvalidTimestamp {
            path: path.to_string(),
            value: value.to_string(),
            reason,
        });
    }
    outcome
}
