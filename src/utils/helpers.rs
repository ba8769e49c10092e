//! Helper functions and utilities
//!
//! Text normalization for user input typed on Persian or Arabic keyboards,
//! amount validation, reference codes and Solar Hijri date formatting.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

/// Tehran local time, which has no daylight saving since 2022
const TEHRAN_OFFSET_SECONDS: i32 = 3 * 3600 + 30 * 60;

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+(\.\d+)?$").expect("amount pattern is valid"))
}

/// Map Persian (U+06F0..U+06F9) and Arabic-Indic (U+0660..U+0669) digits to ASCII.
///
/// Every other character passes through untouched.
pub fn normalize_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            other => other,
        })
        .collect()
}

/// Normalize digits, then keep only ASCII digits
pub fn digits_only(input: &str) -> String {
    normalize_digits(input)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}

/// Whether `input` is a non-negative decimal such as `1500` or `1500.50`
pub fn is_valid_amount(input: &str) -> bool {
    amount_pattern().is_match(input)
}

/// Digits allowed before the decimal point of a stored amount
pub const MAX_AMOUNT_INTEGER_DIGITS: usize = 15;

/// Digits allowed after the decimal point of a stored amount
pub const MAX_AMOUNT_FRACTION_DIGITS: usize = 2;

/// Canonical text of a valid amount, or `None` when it does not fit the
/// stored precision.
///
/// Leading zeros of the integer part are dropped so the value reads back
/// from the database exactly as returned here. Call only with input that
/// passed [`is_valid_amount`].
pub fn canonical_amount(amount: &str) -> Option<String> {
    let (integer, fraction) = match amount.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (amount, None),
    };

    let integer = integer.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };

    if integer.len() > MAX_AMOUNT_INTEGER_DIGITS {
        return None;
    }
    if fraction.is_some_and(|f| f.len() > MAX_AMOUNT_FRACTION_DIGITS) {
        return None;
    }

    Some(match fraction {
        Some(fraction) => format!("{}.{}", integer, fraction),
        None => integer.to_string(),
    })
}

/// Random 8-digit human reference code, zero padded
pub fn generate_reference_code() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..100_000_000);
    format!("{:08}", value)
}

/// Random file name with the given extension
pub fn random_file_name(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4().simple(), extension)
}

/// Convert a Gregorian date to the Solar Hijri calendar, returning `(year, month, day)`
pub fn gregorian_to_jalali(gy: i32, gm: u32, gd: u32) -> (i32, u32, u32) {
    const MONTH_OFFSETS: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

    let gy = gy as i64;
    let gy2 = if gm > 2 { gy + 1 } else { gy };
    let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400
        + gd as i64
        + MONTH_OFFSETS[(gm as usize).clamp(1, 12) - 1];

    let mut jy = -1595 + 33 * (days / 12_053);
    days %= 12_053;
    jy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let (jm, jd) = if days < 186 {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - 186) / 30, 1 + (days - 186) % 30)
    };

    (jy as i32, jm as u32, jd as u32)
}

/// Format a timestamp as a Tehran-local Jalali date, `Y/m/d H:i`
pub fn format_jalali(timestamp: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(TEHRAN_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix());
    let local = timestamp.with_timezone(&offset);
    let (year, month, day) = gregorian_to_jalali(local.year(), local.month(), local.day());
    format!(
        "{}/{:02}/{:02} {:02}:{:02}",
        year,
        month,
        day,
        local.hour(),
        local.minute()
    )
}

/// Display name built from first and last name, falling back to a generic word
pub fn display_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
    let joined = [first_name, last_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() {
        "کاربر".to_string()
    } else {
        joined
    }
}
