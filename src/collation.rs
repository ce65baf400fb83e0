//! First-letter indexing under Hungarian alphabetical order.
//!
//! The order is a plain comparison function; store collation is never consulted.

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;

/// HUNGARIAN_ALPHABET
///
/// Single-character letters in Hungarian alphabetical order. Accented vowels
/// sit directly after their base letter.
pub const HUNGARIAN_ALPHABET: [char; 35] = [
    'A', 'Á', 'B', 'C', 'D', 'E', 'É', 'F', 'G', 'H', 'I', 'Í', 'J', 'K', 'L', 'M', 'N', 'O',
    'Ó', 'Ö', 'Ő', 'P', 'Q', 'R', 'S', 'T', 'U', 'Ú', 'Ü', 'Ű', 'V', 'W', 'X', 'Y', 'Z',
];

/// Position of `letter` in the Hungarian alphabet, `None` if it is not listed.
pub fn hungarian_rank(letter: &str) -> Option<usize> {
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => HUNGARIAN_ALPHABET.iter().position(|&known| known == c),
        _ => None,
    }
}

/// hungarian_cmp
///
/// Total order over uppercase letters: listed letters by table position, all
/// unlisted ones after them and equal to each other, so a stable sort keeps
/// their first-seen order.
pub fn hungarian_cmp(a: &str, b: &str) -> Ordering {
    match (hungarian_rank(a), hungarian_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Uppercased first character of `name`, or `None` for an empty name.
///
/// The name is read in NFC, so a decomposed "E\u{301}" counts as "É".
/// Uppercasing is per Unicode scalar, so "á" becomes "Á" rather than "A".
/// A character whose uppercase form is not a single character ("ß") is kept
/// as it is, so every initial stays one character long.
pub fn initial(name: &str) -> Option<String> {
    let first = name.nfc().next()?;
    let mut upper = first.to_uppercase();
    let letter = match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => first,
    };
    Some(letter.to_string())
}

/// index_letters
///
/// Distinct initials of `names`, sorted with `cmp`. Duplicates are removed by
/// exact equality after uppercasing; the sort is stable.
pub fn index_letters<I, S, F>(names: I, cmp: F) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str, &str) -> Ordering,
{
    let mut letters: Vec<String> = Vec::new();
    for name in names {
        if let Some(letter) = initial(name.as_ref()) {
            if !letters.contains(&letter) {
                letters.push(letter);
            }
        }
    }
    letters.sort_by(|a, b| cmp(a.as_str(), b.as_str()));
    letters
}

/// Index builder with the Hungarian comparison plugged in.
pub fn hungarian_index<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    index_letters(names, hungarian_cmp)
}

/// starts_with_letter
///
/// Exact check used after the store's candidate match: the lowercase form of
/// the name's first character must equal the lowercase form of `letter`.
/// Both sides are compared in NFC. Accents are significant and a
/// multi-character `letter` never matches.
pub fn starts_with_letter(name: &str, letter: &str) -> bool {
    let mut letter_chars = letter.nfc();
    let (Some(wanted), None) = (letter_chars.next(), letter_chars.next()) else {
        return false;
    };
    match name.nfc().next() {
        Some(first) => first.to_lowercase().eq(wanted.to_lowercase()),
        None => false,
    }
}

/// Escapes `%`, `_` and `\` so `value` can be embedded in a LIKE pattern.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
