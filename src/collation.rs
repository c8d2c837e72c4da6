//! Collation - Locale-Aware Title Ordering
//!
//! Approximates root-locale collation for listing order:
//!
//! 1. Primary: case-folded, accent-stripped characters. Whitespace sorts
//!    first, then ASCII punctuation and symbols in root-collation order
//!    (`_ - , ; : ! ? .` before `@ * / & # %`, then `` ` ^ + < = > | ~ $``),
//!    then other non-alphanumerics, then digits, then letters.
//! 2. Secondary: unaccented before accented.
//! 3. Tertiary: lowercase before uppercase.
//! 4. Code-point order as the final tie-break, so the ordering is total.
//!
//! Non-ASCII punctuation and symbols share one class ordered by code point,
//! so `«` and `€` do not land where a full collator would put them.

use std::cmp::Ordering;

/// Compare two strings the way a listing should order them.
#[must_use]
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary_weight)
        .cmp(b.chars().map(primary_weight))
        .then_with(|| a.chars().map(accent_weight).cmp(b.chars().map(accent_weight)))
        .then_with(|| a.chars().map(case_weight).cmp(b.chars().map(case_weight)))
        .then_with(|| a.cmp(b))
}

/// ASCII punctuation then symbols, in root-collation order.
const ASCII_MARKS: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Primary class and position within it: whitespace, ASCII marks, other
/// non-alphanumerics, digits, letters.
fn class_rank(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, u32::from(c))
    } else if let Some(pos) = ASCII_MARKS.find(c) {
        (1, pos as u32)
    } else if !c.is_alphanumeric() {
        (2, u32::from(c))
    } else if c.is_numeric() {
        (3, u32::from(c))
    } else {
        (4, u32::from(c))
    }
}

fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn primary_weight(c: char) -> (u8, u32) {
    class_rank(strip_accent(fold_case(c)))
}

fn accent_weight(c: char) -> bool {
    let lower = fold_case(c);
    strip_accent(lower) != lower
}

fn case_weight(c: char) -> bool {
    c.is_uppercase()
}

/// Base letter for accented Latin lowercase letters.
fn strip_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' => 'i',
        'ľ' | 'ł' | 'ĺ' | 'ļ' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}
