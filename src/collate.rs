//! Human-oriented string ordering for repository names.
//!
//! Names compare in three passes: base characters ignoring case and accents,
//! then accents (an unaccented letter sorts before its accented forms), then
//! case (lowercase before uppercase). Byte order would put every uppercase
//! name before every lowercase one and push accented names to the end.
//!
//! Base characters group as whitespace, punctuation, symbols, digits, then
//! letters. ASCII punctuation and symbols follow the CLDR root order, so the
//! repository name separators sort `_` < `-` < `.` ahead of any digit.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Compares two names the way a reader expects to see them listed.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| secondary_key(a).cmp(&secondary_key(b)))
        .then_with(|| tertiary_key(a).cmp(&tertiary_key(b)))
}

/// ASCII punctuation and symbols in CLDR root collation order.
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

fn primary_key(s: &str) -> Vec<(u8, u32)> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(primary_weight)
        .collect()
}

/// `(group, weight)` for one base character.
fn primary_weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, 0)
    } else if let Some(pos) = PUNCTUATION_ORDER.find(c) {
        (1, pos as u32)
    } else if c.is_alphabetic() {
        (4, u32::from(c))
    } else if let Some(digit) = c.to_digit(10) {
        (3, digit)
    } else if c.is_numeric() {
        (3, u32::from(c))
    } else {
        (2, u32::from(c))
    }
}

/// Per-letter accent weight: 0 for a bare letter, otherwise the marks that
/// follow it in decomposed form.
fn secondary_key(s: &str) -> Vec<Vec<char>> {
    let mut key: Vec<Vec<char>> = Vec::new();
    for c in s.nfd() {
        if is_combining_mark(c) {
            if let Some(last) = key.last_mut() {
                last.push(c);
            }
        } else {
            key.push(Vec::new());
        }
    }
    key
}

fn tertiary_key(s: &str) -> Vec<bool> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(char::is_uppercase)
        .collect()
}
