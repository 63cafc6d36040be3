//! Plain scalar resolution.
//!
//! Follows the YAML 1.2 core schema for null, booleans and special floats,
//! and accepts the JSON5 number spellings (`0x` integers, leading or
//! trailing decimal points, explicit `+` sign). `yes`/`no`/`on`/`off` are
//! plain strings.

use crate::ast::{NodeKind, QuoteStyle};

/// Resolves the text of an unquoted scalar to its node variant.
#[must_use]
pub fn resolve_plain(raw: &str) -> NodeKind {
    let owned = || raw.to_string();
    match raw {
        "" | "~" | "null" | "Null" | "NULL" => NodeKind::Null { raw: owned() },
        "true" | "True" | "TRUE" => NodeKind::Bool {
            value: true,
            raw: owned(),
        },
        "false" | "False" | "FALSE" => NodeKind::Bool {
            value: false,
            raw: owned(),
        },
        ".nan" | ".NaN" | ".NAN" => NodeKind::Nan { raw: owned() },
        _ if is_infinity(raw) => NodeKind::Infinity { raw: owned() },
        _ if is_integer(raw) => NodeKind::Integer { raw: owned() },
        _ if is_float(raw) => NodeKind::Float { raw: owned() },
        _ => NodeKind::String {
            value: owned(),
            style: QuoteStyle::Unquoted,
        },
    }
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}

fn is_infinity(raw: &str) -> bool {
    matches!(strip_sign(raw), ".inf" | ".Inf" | ".INF")
}

fn is_integer(raw: &str) -> bool {
    let digits = strip_sign(raw);
    let radix = |prefix: &str, pred: fn(&char) -> bool| {
        digits
            .strip_prefix(prefix)
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| pred(&c)))
    };
    if radix("0x", char::is_ascii_hexdigit) || radix("0X", char::is_ascii_hexdigit) {
        return true;
    }
    if radix("0o", |c| ('0'..='7').contains(c)) || radix("0b", |c| matches!(c, '0' | '1')) {
        return true;
    }
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_float(raw: &str) -> bool {
    let body = strip_sign(raw);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    if let Some(exp) = exponent {
        let exp = strip_sign(exp);
        if exp.is_empty() || !exp.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) {
        return false;
    }
    match frac_part {
        Some(frac) => all_digits(frac) && !(int_part.is_empty() && frac.is_empty()),
        // Without a dot the exponent is what makes it a float.
        None => !int_part.is_empty() && exponent.is_some(),
    }
}
