//! Exact-match map from normalized word to the entries containing it.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::storage::entry::EntryNo;

#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    words: HashMap<String, IndexSet<EntryNo>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry` to the set for `word`, creating the set if needed.
    pub fn index(&mut self, word: &str, entry: EntryNo) {
        if word.is_empty() {
            return;
        }
        match self.words.get_mut(word) {
            Some(set) => {
                set.insert(entry);
            }
            None => {
                self.words.insert(word.to_string(), IndexSet::from([entry]));
            }
        }
    }

    /// Returns the entries indexed under `word`, in insertion order.
    ///
    /// Unknown words yield an empty list.
    pub fn lookup(&self, word: &str) -> Vec<EntryNo> {
        self.words
            .get(word)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
