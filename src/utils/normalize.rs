//! Text normalization shared by indexing and querying.
//!
//! Every word that enters an index and every query that probes one goes through
//! [`normalize`], so case, accents and punctuation never affect matching.
//!
//! # Examples
//!
//! ```
//! use ndowe_dict::utils::normalize::{normalize, tokens};
//!
//! assert_eq!(normalize("  ¡Canción!  "), "cancion");
//! assert_eq!(normalize("Niño"), "nino");
//! let words: Vec<&str> = tokens("buenos  dias").collect();
//! assert_eq!(words, vec!["buenos", "dias"]);
//! ```

use unicode_normalization::UnicodeNormalization;

/// Combining diacritical marks block stripped after canonical decomposition.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036F}';

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Normalizes text for indexing and lookup.
///
/// Steps, in order: lowercase, canonical decomposition (NFD), removal of
/// combining diacritical marks (U+0300..=U+036F), removal of every character
/// that is neither a word character nor whitespace, trimming.
///
/// The function is total and idempotent.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .filter(|&c| is_word_char(c) || c.is_whitespace())
        .collect();
    // Dropping characters can leave combining marks out of canonical order.
    let reordered: String = stripped.nfd().collect();
    reordered.trim().to_string()
}

/// Splits already-normalized text into its whitespace-separated tokens.
pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}

/// Collapses runs of whitespace in normalized text into single spaces.
///
/// Multi-word fields are indexed under this canonical phrase form.
pub fn phrase(normalized: &str) -> String {
    tokens(normalized).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize() {
        let cases = [
            ("Casa", "casa"),
            ("CANCIÓN", "cancion"),
            ("  pingüino ", "pinguino"),
            ("¿Qué tal?", "que tal"),
            ("niño-a", "ninoa"),
            ("ɛbɔngɔ", "ɛbɔngɔ"),
            ("Ŋgɔ́mbɛ", "ŋgɔmbɛ"),
            ("snake_case", "snake_case"),
            ("123 abc", "123 abc"),
            ("!!!", ""),
            ("", ""),
            ("a\u{05B1}!\u{05B0}", "a\u{05B0}\u{05B1}"),
        ];
        for (input, expected) in cases {
            let result = normalize(input);
            assert_eq!(result, expected, "normalize({:?}) should be {:?}, got {:?}", input, expected, result);
        }
    }

    #[test]
    fn test_marks_separated_by_punctuation_stay_idempotent() {
        let cases = ["a\u{05B1}!\u{05B0}", "e\u{0591}-\u{05B0}x", "o\u{05B4}?\u{05B1}"];
        for input in cases {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "normalize({:?}) is not idempotent", input);
        }
    }

    #[test]
    fn test_phrase_collapses_whitespace() {
        assert_eq!(phrase("buenos \t dias"), "buenos dias");
        assert_eq!(phrase(""), "");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "[a-zA-ZáéíóúÁÉÍÓÚñÑüÜɛɔŋ0-9 ,.;:¡!¿?'\"()\\-_\t]{0,40}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalize_is_idempotent_on_any_text(s in "\\PC{0,24}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
