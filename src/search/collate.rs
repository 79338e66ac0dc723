//! Locale-aware string ordering for display names.
//!
//! Approximates the default (root locale) collation used by browsers'
//! `localeCompare`: comparison is first on base letters with accents and case
//! ignored, then on accents, then on case with lowercase first. Raw code
//! point order only breaks the final tie.
//!
//! On the primary tier whitespace, punctuation and symbols sort before digits,
//! and digits before letters. Within each class, order is by code point, so
//! the finer ordering root collation gives between individual symbols is not
//! reproduced.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

fn char_class(c: char) -> u8 {
    if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    }
}

/// Base characters only: decomposed, marks stripped, lowercased, grouped by class.
fn primary_key(s: &str) -> impl Iterator<Item = (u8, char)> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| (char_class(c), c))
}

/// Decomposed and lowercased, marks kept.
fn secondary_key(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

fn tertiary(a: &str, b: &str) -> Ordering {
    for (ca, cb) in a.nfd().zip(b.nfd()) {
        if ca == cb {
            continue;
        }
        match (ca.is_lowercase(), cb.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(primary_key(b))
        .then_with(|| secondary_key(a).cmp(secondary_key(b)))
        .then_with(|| tertiary(a, b))
        .then_with(|| a.cmp(b))
}
