//! Per-language word indexes.
//!
//! A [`LanguageIndex`] pairs a [`Trie`] with an [`InvertedIndex`] and feeds both
//! from the same tokenization pass, so autocomplete and exact lookup always see
//! the same vocabulary.

use indexmap::IndexSet;

use crate::index::{InvertedIndex, Trie};
use crate::storage::entry::EntryNo;
use crate::utils::normalize::{phrase, tokens};

#[derive(Debug, Default)]
pub struct LanguageIndex {
    trie: Trie,
    words: InvertedIndex,
}

impl LanguageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes one normalized field value of `entry`.
    ///
    /// Every token is indexed; a multi-token value is also indexed as a phrase.
    pub fn index_text(&mut self, normalized: &str, entry: EntryNo) {
        let mut count = 0;
        for token in tokens(normalized) {
            self.add_word(token, entry);
            count += 1;
        }
        if count > 1 {
            self.add_word(&phrase(normalized), entry);
        }
    }

    fn add_word(&mut self, word: &str, entry: EntryNo) {
        self.trie.insert(word, entry);
        self.words.index(word, entry);
    }

    /// Resolves a normalized query to the entries containing it verbatim.
    ///
    /// A query that is not an indexed word or phrase falls back to the entries
    /// containing every one of its tokens.
    pub fn exact(&self, normalized: &str) -> Vec<EntryNo> {
        let query = phrase(normalized);
        if query.is_empty() {
            return Vec::new();
        }
        if self.words.contains(&query) {
            return self.words.lookup(&query);
        }
        let query_tokens: Vec<&str> = tokens(&query).collect();
        if query_tokens.len() < 2 {
            return Vec::new();
        }
        let mut common: IndexSet<EntryNo> = self.words.lookup(query_tokens[0]).into_iter().collect();
        for token in &query_tokens[1..] {
            if common.is_empty() {
                break;
            }
            let next: IndexSet<EntryNo> = self.words.lookup(token).into_iter().collect();
            common.retain(|entry| next.contains(entry));
        }
        common.into_iter().collect()
    }

    /// Word-level suggestions for a normalized prefix, see [`Trie::prefix_search`].
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<(String, usize)> {
        self.trie.prefix_search(prefix, limit)
    }

    /// Entries indexed under exactly `word`.
    pub fn lookup(&self, word: &str) -> Vec<EntryNo> {
        self.words.lookup(word)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.words.len()
    }

    pub fn trie_node_count(&self) -> usize {
        self.trie.node_count()
    }
}
