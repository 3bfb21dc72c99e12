// In-memory index structures
//
// This module provides the prefix tree, the inverted word index, the
// per-language pairing of the two, and the approximate-match index.

pub mod trie;
pub mod inverted;
pub mod language;
pub mod fuzzy;

pub use trie::{Trie, TrieNode};
pub use inverted::InvertedIndex;
pub use language::LanguageIndex;
pub use fuzzy::{FuzzyIndex, FuzzyIndexBuilder, FuzzyMatch, MatchedField};
