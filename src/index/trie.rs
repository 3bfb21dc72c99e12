//! Prefix tree over normalized words, used for autocomplete.
//!
//! Each node owns its children in a sparse map keyed by character, so any
//! alphabet works (including Ndowe letters such as `ɛ`, `ɔ` and `ŋ`). Terminal
//! nodes record the entries whose words end there; the size of that set is the
//! word's frequency when ranking suggestions.
//!
//! # Examples
//!
//! ```
//! use ndowe_dict::index::Trie;
//!
//! let mut trie = Trie::new();
//! trie.insert("casa", 0);
//! trie.insert("casa", 2);
//! trie.insert("caza", 1);
//! let suggestions = trie.prefix_search("ca", 10);
//! assert_eq!(suggestions, vec![("casa".to_string(), 2), ("caza".to_string(), 1)]);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexSet;

use crate::storage::entry::EntryNo;

#[derive(Default)]
pub struct TrieNode {
    pub is_end_of_word: bool,
    pub entry_ids: IndexSet<EntryNo>,
    pub children: BTreeMap<char, TrieNode>,
}

// Paths are as deep as the longest indexed phrase, so nothing below may
// recurse per character.
impl Drop for TrieNode {
    fn drop(&mut self) {
        let mut pending: Vec<TrieNode> = std::mem::take(&mut self.children).into_values().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(std::mem::take(&mut node.children).into_values());
        }
    }
}

impl fmt::Debug for TrieNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrieNode")
            .field("is_end_of_word", &self.is_end_of_word)
            .field("entry_ids", &self.entry_ids)
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
    node_count: usize,
    word_count: usize,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `word` and tags its terminal node with `entry`.
    ///
    /// Inserting the same pair twice has no further effect. Empty words are ignored.
    pub fn insert(&mut self, word: &str, entry: EntryNo) {
        if word.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_insert_with(|| {
                self.node_count += 1;
                TrieNode::default()
            });
        }
        if !node.is_end_of_word {
            node.is_end_of_word = true;
            self.word_count += 1;
        }
        node.entry_ids.insert(entry);
    }

    fn find_node(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }

    /// Returns whether `word` was inserted as a complete word.
    pub fn contains(&self, word: &str) -> bool {
        self.find_node(word).is_some_and(|node| node.is_end_of_word)
    }

    /// Enumerates the words starting with `prefix` as `(word, frequency)` pairs.
    ///
    /// Results are ordered by frequency descending, then lexicographically, and
    /// truncated to `limit`. An empty prefix or an unknown path yields nothing.
    pub fn prefix_search(&self, prefix: &str, limit: usize) -> Vec<(String, usize)> {
        if prefix.is_empty() || limit == 0 {
            return Vec::new();
        }
        let Some(start) = self.find_node(prefix) else {
            return Vec::new();
        };

        let mut results = Self::collect_words(start, prefix);

        results.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        results.truncate(limit);
        results
    }

    /// Depth-first walk below `start` with an explicit stack of child iterators.
    fn collect_words(start: &TrieNode, prefix: &str) -> Vec<(String, usize)> {
        let mut out = Vec::new();
        let mut path = prefix.to_string();
        if start.is_end_of_word {
            out.push((path.clone(), start.entry_ids.len()));
        }
        let mut stack = vec![start.children.iter()];
        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some((&ch, child)) => {
                    path.push(ch);
                    if child.is_end_of_word {
                        out.push((path.clone(), child.entry_ids.len()));
                    }
                    stack.push(child.children.iter());
                }
                None => {
                    stack.pop();
                    if !stack.is_empty() {
                        path.pop();
                    }
                }
            }
        }
        out
    }

    /// Number of distinct words inserted.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Number of nodes below the root.
    pub fn node_count(&self) -> usize {
        self.node_count
    }
}
