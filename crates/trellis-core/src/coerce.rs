// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! String coercion for configuration sources that only carry strings
//! (environment variables, command-line values, key/value stores).
//!
//! Every helper returns `None` for input it does not recognize instead of
//! failing, so a bad value degrades to "use the default".

/// Largest integer exactly representable as an IEEE-754 double (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Recognizes `1`/`+` as true and `0`/`-` as false.
///
/// Language-specific words such as "yes" are intentionally not recognized.
/// Surrounding whitespace is ignored.
pub fn to_boolean(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "+" => Some(true),
        "0" | "-" => Some(false),
        _ => None,
    }
}

/// The bootstrap variant of [`to_boolean`].
///
/// Additionally recognizes `true/false`, `yes/no`, `t/f` and `y/n` in any
/// letter case, since bootstrap values usually come straight from an
/// operator's shell.
pub fn to_bootstrap_boolean(s: &str) -> Option<bool> {
    let trimmed = s.trim();
    for (word, value) in [
        ("true", true),
        ("false", false),
        ("yes", true),
        ("no", false),
        ("t", true),
        ("f", false),
        ("y", true),
        ("n", false),
    ] {
        if trimmed.eq_ignore_ascii_case(word) {
            return Some(value);
        }
    }
    to_boolean(trimmed)
}

/// Parses a whole string as a number.
///
/// Accepts decimal notation with optional sign, fraction and exponent,
/// `0x`/`0o`/`0b` prefixed unsigned integers, and `Infinity` with an
/// optional sign. Blank input is 0.
pub fn to_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        // from_str_radix tolerates a leading sign; prefixed literals do not.
        let body = &trimmed[2..];
        if body.starts_with(['+', '-']) {
            return None;
        }
        return u64::from_str_radix(body, radix).ok().map(|n| n as f64);
    }

    // Rust's float grammar also admits "inf" and "nan"; reject anything
    // outside plain decimal notation before handing it over.
    let decimal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !decimal {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Parses the leading base-10 integer of a string.
///
/// Leading whitespace and a sign are allowed and parsing stops at the first
/// non-digit, so `"42px"` yields 42. Input without leading digits, or whose
/// value lies outside ±[`MAX_SAFE_INTEGER`], is unrecognized.
pub fn to_integer(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let mut value: i64 = 0;
    for b in digits[..end].bytes() {
        value = value.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
        if value > MAX_SAFE_INTEGER {
            return None;
        }
    }

    Some(if negative { -value } else { value })
}
