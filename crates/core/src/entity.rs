//! Character reference helpers shared by the reader and the writer.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt::Write;

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)&(?:#(?:\d{1,7}|x[\da-f]{1,6})|[\da-z]{1,31});")
        .expect("reference pattern is valid")
});

static REFERENCE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^&(?:#(?:\d{1,7}|x[\da-f]{1,6})|[\da-z]{1,31});")
        .expect("reference pattern is valid")
});

/// Decode a single `&...;` reference, or `None` when it names nothing.
///
/// Numeric references always decode; code points that are not allowed in
/// markdown text become U+FFFD.
pub fn decode_reference(reference: &str) -> Option<String> {
    let body = reference.strip_prefix('&')?.strip_suffix(';')?;
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return Some(decode_numeric(code).to_string());
    }
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    let decoded = html_escape::decode_html_entities(reference);
    // Named references expand to one or two code points; anything longer is
    // a prefix match such as `&ampxyz;`.
    if decoded == reference || decoded.chars().count() > 2 {
        None
    } else {
        Some(decoded.into_owned())
    }
}

fn decode_numeric(code: u32) -> char {
    let disallowed = code < 9
        || code == 11
        || (code > 13 && code < 32)
        || (code > 126 && code < 160)
        || (code & 0xFFFF) == 0xFFFE
        || (code & 0xFFFF) == 0xFFFF
        || (0xFDD0..=0xFDEF).contains(&code);
    if disallowed {
        return char::REPLACEMENT_CHARACTER;
    }
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Byte length of a decodable reference at the start of `value`.
pub fn reference_len(value: &str) -> Option<usize> {
    let found = REFERENCE_START.find(value)?;
    decode_reference(found.as_str()).map(|_| found.len())
}

/// Decode every known reference in `value`, leaving unknown ones as
/// written.
pub fn decode_light(value: &str) -> String {
    REFERENCE
        .replace_all(value, |caps: &Captures| {
            decode_reference(&caps[0]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Encode the characters of `subset` as hexadecimal references
/// (`&#xA;`). An `&` that would otherwise start a reference is encoded too,
/// so [`decode_light`] gives back the original value.
pub fn encode_subset(value: &str, subset: &[char]) -> String {
    let mut encoded = String::with_capacity(value.len());
    for (index, ch) in value.char_indices() {
        if subset.contains(&ch) || (ch == '&' && reference_len(&value[index..]).is_some()) {
            let _ = write!(encoded, "&#x{:X};", u32::from(ch));
        } else {
            encoded.push(ch);
        }
    }
    encoded
}
