//! Typo-tolerant matching over entry fields.
//!
//! The index keeps the normalized vocabulary of three fields (source word,
//! translations, examples) bucketed by token length. A query token is only
//! compared with tokens whose length difference alone cannot push the
//! normalized edit distance past the admission threshold.
//!
//! Distances are normalized Damerau-Levenshtein distances in `[0, 1]`. A
//! field's distance to a query is the mean over query tokens of the best
//! distance of any token in that field (1.0 when nothing came close). Fields
//! within the threshold match; the entry's score is the best field's
//! `weight * (1 - distance)`, with weights scaled so the source weight is 1.0.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use strsim::normalized_damerau_levenshtein;

use crate::config::FuzzyConfig;
use crate::storage::entry::{EnhancedEntry, EntryNo};
use crate::utils::normalize::{normalize, tokens};

/// Entry field a match was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedField {
    /// The Spanish headword
    Source,
    /// The Ndowe translations
    Target,
    /// Usage examples
    Example,
}

impl MatchedField {
    fn weight(self, config: &FuzzyConfig) -> f64 {
        match self {
            MatchedField::Source => config.source_weight,
            MatchedField::Target => config.target_weight,
            MatchedField::Example => config.example_weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Posting {
    entry: EntryNo,
    field: MatchedField,
}

#[derive(Debug, Clone)]
struct VocabEntry {
    token: String,
    postings: Vec<Posting>,
}

/// One entry admitted by [`FuzzyIndex::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub entry: EntryNo,
    /// Distance of the best-scoring field
    pub distance: f64,
    /// Weighted similarity in `[0, 1]`, higher is better
    pub score: f64,
    /// Every field within the threshold, in field order
    pub fields: Vec<MatchedField>,
}

/// Collects vocabulary entry by entry, then freezes it into a [`FuzzyIndex`].
#[derive(Debug, Default)]
pub struct FuzzyIndexBuilder {
    vocabulary: HashMap<String, IndexSet<Posting>>,
}

impl FuzzyIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_tokens(&mut self, normalized: &str, posting: Posting) {
        for token in tokens(normalized) {
            match self.vocabulary.get_mut(token) {
                Some(postings) => {
                    postings.insert(posting);
                }
                None => {
                    self.vocabulary.insert(token.to_string(), IndexSet::from([posting]));
                }
            }
        }
    }

    pub fn add_entry(&mut self, entry_no: EntryNo, entry: &EnhancedEntry) {
        self.add_tokens(
            &entry.source_word_normalized,
            Posting { entry: entry_no, field: MatchedField::Source },
        );
        for target in &entry.target_words {
            self.add_tokens(&normalize(target), Posting { entry: entry_no, field: MatchedField::Target });
        }
        for example in &entry.examples {
            self.add_tokens(&normalize(example), Posting { entry: entry_no, field: MatchedField::Example });
        }
    }

    pub fn build(self) -> FuzzyIndex {
        let mut by_length: BTreeMap<usize, Vec<VocabEntry>> = BTreeMap::new();
        let token_count = self.vocabulary.len();
        for (token, postings) in self.vocabulary {
            by_length.entry(token.chars().count()).or_default().push(VocabEntry {
                token,
                postings: postings.into_iter().collect(),
            });
        }
        FuzzyIndex { by_length, token_count }
    }
}

#[derive(Debug, Default, Clone)]
pub struct FuzzyIndex {
    by_length: BTreeMap<usize, Vec<VocabEntry>>,
    token_count: usize,
}

/// Token lengths whose length gap alone keeps the distance within `threshold`.
fn length_window(query_len: usize, threshold: f64) -> (usize, usize) {
    let len = query_len as f64;
    // Small slack so boundary ratios such as 1/4 vs 0.25 are not lost to rounding.
    let slack = 1e-9;
    let min = (len * (1.0 - threshold) - slack).ceil().max(1.0) as usize;
    let max = if threshold >= 1.0 {
        usize::MAX
    } else {
        (len / (1.0 - threshold) + slack).floor() as usize
    };
    (min, max)
}

impl FuzzyIndex {
    /// Builds the index for a whole entry list.
    pub fn from_entries(entries: &[EnhancedEntry]) -> Self {
        let mut builder = FuzzyIndexBuilder::new();
        for (entry_no, entry) in entries.iter().enumerate() {
            builder.add_entry(entry_no as EntryNo, entry);
        }
        builder.build()
    }

    /// Number of distinct tokens across all fields.
    pub fn vocabulary_size(&self) -> usize {
        self.token_count
    }

    /// Finds entries approximately matching a normalized query.
    ///
    /// Results are ordered by score descending, then distance ascending, then
    /// entry position.
    pub fn search(&self, normalized_query: &str, config: &FuzzyConfig) -> Vec<FuzzyMatch> {
        let query_tokens: Vec<&str> = tokens(normalized_query).collect();
        if query_tokens.is_empty() {
            return Vec::new();
        }
        let threshold = config.threshold;
        let token_total = query_tokens.len();

        // Best distance per query token, for every (entry, field) that came close.
        let mut best: HashMap<Posting, Vec<f64>> = HashMap::new();
        for (i, query_token) in query_tokens.iter().enumerate() {
            let (min_len, max_len) = length_window(query_token.chars().count(), threshold);
            for bucket in self.by_length.range(min_len..=max_len).map(|(_, bucket)| bucket) {
                for vocab in bucket {
                    let distance = 1.0 - normalized_damerau_levenshtein(query_token, &vocab.token);
                    if distance > threshold {
                        continue;
                    }
                    for posting in &vocab.postings {
                        let slots = best.entry(*posting).or_insert_with(|| vec![1.0; token_total]);
                        if distance < slots[i] {
                            slots[i] = distance;
                        }
                    }
                }
            }
        }

        let max_weight = config.source_weight.max(config.target_weight).max(config.example_weight);
        let mut by_entry: BTreeMap<EntryNo, FuzzyMatch> = BTreeMap::new();
        for (posting, slots) in best {
            let distance = slots.iter().sum::<f64>() / token_total as f64;
            if distance > threshold {
                continue;
            }
            let score = (posting.field.weight(config) / max_weight) * (1.0 - distance);
            let found = by_entry.entry(posting.entry).or_insert_with(|| FuzzyMatch {
                entry: posting.entry,
                distance,
                score,
                fields: Vec::new(),
            });
            found.fields.push(posting.field);
            if score > found.score || (score == found.score && distance < found.distance) {
                found.score = score;
                found.distance = distance;
            }
        }

        let mut matches: Vec<FuzzyMatch> = by_entry
            .into_values()
            .map(|mut m| {
                m.fields.sort();
                m.fields.dedup();
                m.score = m.score.clamp(0.0, 1.0);
                m
            })
            .collect();
        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.distance.total_cmp(&b.distance))
                .then_with(|| a.entry.cmp(&b.entry))
        });
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::entry::{enhance_entries, RawEntry};

    fn sample_index() -> FuzzyIndex {
        let entries = enhance_entries(vec![
            RawEntry::new("casa").with_targets(["nanga"]),
            RawEntry::new("caza").with_targets(["bolo"]),
            RawEntry::new("perro").with_targets(["mbwa"]).with_examples(["el perro come en casa"]),
            RawEntry::new("hogar").with_targets(["casa grande"]),
        ])
        .unwrap();
        FuzzyIndex::from_entries(&entries)
    }

    #[test]
    fn test_length_window() {
        assert_eq!(length_window(4, 0.3), (3, 5));
        assert_eq!(length_window(4, 0.25), (3, 5));
        assert_eq!(length_window(1, 0.3), (1, 1));
        assert_eq!(length_window(3, 1.0).1, usize::MAX);
    }

    #[test]
    fn test_single_typo_matches_source_word() {
        let index = sample_index();
        let matches = index.search("casz", &FuzzyConfig::default());
        assert_eq!(matches[0].entry, 0);
        assert!((matches[0].score - 0.75).abs() < 1e-9);
        assert_eq!(matches[0].fields, vec![MatchedField::Source]);
        assert!(matches.iter().all(|m| m.distance <= 0.3));
    }

    #[test]
    fn test_field_weights_order_results() {
        let index = sample_index();
        let matches = index.search("casa", &FuzzyConfig::default());
        let order: Vec<EntryNo> = matches.iter().map(|m| m.entry).collect();
        // source hit, translation hit, one-typo source hit ("caza"), example hit
        assert_eq!(order, vec![0, 3, 1, 2]);
        assert_eq!(matches[0].score, 1.0);
        assert!((matches[1].score - 0.8).abs() < 1e-9);
        assert!((matches[2].score - 0.75).abs() < 1e-9);
        assert!((matches[3].score - 0.3).abs() < 1e-9);
        assert_eq!(matches[1].fields, vec![MatchedField::Target]);
        assert_eq!(matches[3].fields, vec![MatchedField::Example]);
    }

    #[test]
    fn test_distant_queries_are_rejected() {
        let index = sample_index();
        assert!(index.search("xyzw", &FuzzyConfig::default()).is_empty());
        assert!(index.search("", &FuzzyConfig::default()).is_empty());
    }

    #[test]
    fn test_multi_token_query_averages_tokens() {
        let index = sample_index();
        let matches = index.search("casa grandes", &FuzzyConfig::default());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].entry, 3);
        assert_eq!(matches[0].fields, vec![MatchedField::Target]);
    }
}
