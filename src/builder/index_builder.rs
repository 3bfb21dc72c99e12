//! Builds one complete generation of search indexes.
//!
//! A generation is built off to the side from an owned entry list and only
//! handed to the engine once every stage has finished. A failed or cancelled
//! build simply drops its partial structures.
//!
//! Stages, each reported through [`ProgressState`]:
//!
//! 1. `normalize` - validate entries and recompute derived fields
//! 2. `source_index` - trie and inverted index over Spanish headwords
//! 3. `target_index` - trie and inverted index over Ndowe translations
//! 4. `fuzzy_index` - approximate-match vocabulary over all searchable fields

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use lru::LruCache;
use parking_lot::Mutex;

use crate::config::SearchConfig;
use crate::index::{FuzzyIndex, FuzzyIndexBuilder, LanguageIndex};
use crate::search::query::{Language, SearchMode, SearchResult};
use crate::storage::entry::{revalidate_entries, EnhancedEntry, EntryNo};
use crate::utils::normalize::normalize;
use crate::utils::progress_report::{ProgressReportFn, ProgressState};
use crate::{DictError, Result};

const REPORT_INTERVAL_PERCENT: u64 = 10;

/// Key of the per-generation query result cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct QueryKey {
    pub text: String,
    pub language: Language,
    pub mode: SearchMode,
    pub limit: usize,
    pub include_empty: bool,
}

/// Size figures of a built generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub entry_count: usize,
    pub source_vocabulary: usize,
    pub target_vocabulary: usize,
    pub source_trie_nodes: usize,
    pub target_trie_nodes: usize,
    pub fuzzy_vocabulary: usize,
    pub build_duration: Duration,
}

/// Every index structure built from one entry list.
pub struct IndexGeneration {
    pub(crate) entries: Vec<Arc<EnhancedEntry>>,
    pub(crate) ids: HashMap<String, EntryNo>,
    pub(crate) source: LanguageIndex,
    pub(crate) target: LanguageIndex,
    pub(crate) fuzzy: FuzzyIndex,
    pub(crate) query_cache: Option<Mutex<LruCache<QueryKey, Arc<Vec<SearchResult>>>>>,
    pub(crate) build_duration: Duration,
}

impl IndexGeneration {
    pub(crate) fn language(&self, language: Language) -> &LanguageIndex {
        match language {
            Language::Source => &self.source,
            Language::Target => &self.target,
        }
    }

    pub(crate) fn entry(&self, entry_no: EntryNo) -> Option<&Arc<EnhancedEntry>> {
        self.entries.get(entry_no as usize)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            entry_count: self.entries.len(),
            source_vocabulary: self.source.vocabulary_size(),
            target_vocabulary: self.target.vocabulary_size(),
            source_trie_nodes: self.source.trie_node_count(),
            target_trie_nodes: self.target.trie_node_count(),
            fuzzy_vocabulary: self.fuzzy.vocabulary_size(),
            build_duration: self.build_duration,
        }
    }
}

fn run_stage<F>(
    state_id: &str,
    entries: &[EnhancedEntry],
    reporter: Option<ProgressReportFn>,
    mut visit: F,
) -> Result<()>
where
    F: FnMut(EntryNo, &EnhancedEntry),
{
    let started = Instant::now();
    let mut progress = ProgressState::new(state_id, entries.len() as u64, REPORT_INTERVAL_PERCENT, reporter);
    if entries.is_empty() && progress.report_empty() {
        info!("Index build cancelled during {}", state_id);
        return Err(DictError::user_interrupted());
    }
    for (entry_no, entry) in entries.iter().enumerate() {
        visit(entry_no as EntryNo, entry);
        if progress.report(entry_no as u64) {
            info!("Index build cancelled during {}", state_id);
            return Err(DictError::user_interrupted());
        }
    }
    debug!("Stage {} finished in {:?}", state_id, started.elapsed());
    Ok(())
}

/// Builds a complete index generation from enhanced entries.
///
/// # Errors
///
/// Returns an `IndexBuild` error for invalid entries and `UserInterrupted` when
/// the reporter cancels. Nothing built so far survives an error.
pub fn build_generation(
    mut entries: Vec<EnhancedEntry>,
    config: &SearchConfig,
    reporter: Option<ProgressReportFn>,
) -> Result<IndexGeneration> {
    let started = Instant::now();
    info!("Building search indexes for {} entries", entries.len());

    if entries.len() > EntryNo::MAX as usize {
        return Err(DictError::index_build(format!(
            "{} entries exceed the supported maximum of {}",
            entries.len(),
            EntryNo::MAX
        )));
    }

    let mut progress = ProgressState::new("normalize", 1, REPORT_INTERVAL_PERCENT, reporter);
    revalidate_entries(&mut entries)?;
    if progress.report(0) {
        info!("Index build cancelled during normalize");
        return Err(DictError::user_interrupted());
    }

    let mut source = LanguageIndex::new();
    run_stage("source_index", &entries, reporter, |entry_no, entry| {
        if entry.source_word_normalized.is_empty() {
            warn!(
                "Source word '{}' of {} normalizes to nothing and is not indexed",
                entry.source_word, entry.id
            );
        }
        source.index_text(&entry.source_word_normalized, entry_no);
    })?;

    let mut target = LanguageIndex::new();
    run_stage("target_index", &entries, reporter, |entry_no, entry| {
        for word in &entry.target_words {
            target.index_text(&normalize(word), entry_no);
        }
    })?;

    let mut fuzzy = FuzzyIndexBuilder::new();
    run_stage("fuzzy_index", &entries, reporter, |entry_no, entry| {
        fuzzy.add_entry(entry_no, entry);
    })?;
    let fuzzy = fuzzy.build();

    let ids = entries
        .iter()
        .enumerate()
        .map(|(entry_no, entry)| (entry.id.clone(), entry_no as EntryNo))
        .collect();
    let entries: Vec<Arc<EnhancedEntry>> = entries.into_iter().map(Arc::new).collect();
    let query_cache = NonZeroUsize::new(config.query_cache_capacity).map(|cap| Mutex::new(LruCache::new(cap)));

    let generation = IndexGeneration {
        entries,
        ids,
        source,
        target,
        fuzzy,
        query_cache,
        build_duration: started.elapsed(),
    };
    let stats = generation.stats();
    info!(
        "Search indexes built in {:?}: {} entries, {} source words, {} target words, {} fuzzy tokens",
        stats.build_duration, stats.entry_count, stats.source_vocabulary, stats.target_vocabulary, stats.fuzzy_vocabulary
    );
    Ok(generation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::entry::{enhance_entries, RawEntry};

    fn cancel_on_target(state: &mut ProgressState) -> bool {
        state.state_id == "target_index"
    }

    fn entries() -> Vec<EnhancedEntry> {
        enhance_entries(vec![
            RawEntry::new("casa").with_targets(["nanga"]),
            RawEntry::new("buenos días").with_targets(["mbolo"]),
            RawEntry::new("¡¡").with_targets(["ee"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_generation_indexes_both_languages() {
        let generation = build_generation(entries(), &SearchConfig::default(), None).unwrap();
        assert_eq!(generation.source.exact("casa"), vec![0]);
        assert_eq!(generation.source.exact("buenos dias"), vec![1]);
        assert_eq!(generation.target.exact("mbolo"), vec![1]);
        assert_eq!(generation.ids.get("entry-2"), Some(&2));
        let stats = generation.stats();
        assert_eq!(stats.entry_count, 3);
        // casa, buenos, dias, "buenos dias"
        assert_eq!(stats.source_vocabulary, 4);
        assert!(generation.query_cache.is_some());
    }

    #[test]
    fn test_cancelled_build_is_interrupted() {
        let result = build_generation(entries(), &SearchConfig::default(), Some(cancel_on_target));
        assert!(matches!(result, Err(DictError::UserInterrupted { .. })));
    }

    #[test]
    fn test_zero_capacity_disables_query_cache() {
        let config = SearchConfig { query_cache_capacity: 0, ..SearchConfig::default() };
        let generation = build_generation(Vec::new(), &config, None).unwrap();
        assert!(generation.query_cache.is_none());
        assert_eq!(generation.stats().entry_count, 0);
    }
}
