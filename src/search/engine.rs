//! The dictionary search engine.
//!
//! [`SearchEngine`] owns the current index generation behind a lock that is
//! only held long enough to clone or replace an `Arc`. Queries work on the
//! generation they cloned, so a rebuild never disturbs a query in flight, and a
//! rebuild is published in one assignment once it is complete.
//!
//! # Examples
//!
//! ```
//! use ndowe_dict::search::{Language, SearchEngine, SearchMode, SearchQuery};
//! use ndowe_dict::storage::RawEntry;
//!
//! # fn main() -> ndowe_dict::Result<()> {
//! let engine = SearchEngine::default();
//! engine.initialize(vec![
//!     RawEntry::new("casa").with_targets(["nanga"]),
//!     RawEntry::new("caza").with_targets(["bolo"]),
//! ])?;
//!
//! let results = engine.search(&SearchQuery::new("Casa").mode(SearchMode::Exact))?;
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].entry.source_word, "casa");
//!
//! let suggestions = engine.autocomplete("ca", Language::Source)?;
//! assert_eq!(suggestions.len(), 2);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use parking_lot::RwLock;

use crate::builder::index_builder::{build_generation, IndexGeneration, IndexStats, QueryKey};
use crate::config::{CacheConfig, EngineConfig, SearchConfig};
use crate::search::query::{Language, MatchType, SearchMode, SearchQuery, SearchResult, Suggestion};
use crate::search::ranking::{finalize, merge_hybrid, sort_by_score};
use crate::storage::entry::{enhance_entries, EnhancedEntry, EntryNo, RawEntry};
use crate::utils::normalize::{normalize, phrase};
use crate::utils::progress_report::ProgressReportFn;
use crate::{DictError, Result};

/// Exact, prefix and typo-tolerant search over one dictionary.
pub struct SearchEngine {
    config: SearchConfig,
    current: RwLock<Option<Arc<IndexGeneration>>>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self {
            config: SearchConfig::default(),
            current: RwLock::new(None),
        }
    }
}

impl SearchEngine {
    /// Creates an uninitialized engine.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when the configuration does not validate.
    pub fn new(config: SearchConfig) -> Result<Self> {
        EngineConfig { search: config.clone(), cache: CacheConfig::default() }.validate()?;
        Ok(Self {
            config,
            current: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Validates raw entries and builds every index.
    ///
    /// On failure the engine is left uninitialized, whatever state it was in
    /// before, and the call can be retried with corrected data.
    pub fn initialize(&self, raw_entries: Vec<RawEntry>) -> Result<()> {
        self.initialize_with_progress(raw_entries, None)
    }

    /// Like [`initialize`](Self::initialize), reporting each build stage to `reporter`.
    ///
    /// The reporter may cancel the build by returning `true`, which yields
    /// `UserInterrupted` and leaves the engine uninitialized.
    pub fn initialize_with_progress(&self, raw_entries: Vec<RawEntry>, reporter: Option<ProgressReportFn>) -> Result<()> {
        let entries = match enhance_entries(raw_entries) {
            Ok(entries) => entries,
            Err(e) => {
                self.discard();
                return Err(e);
            }
        };
        self.install(entries, reporter)
    }

    /// Builds every index from already enhanced entries (e.g. read from the offline cache).
    pub fn initialize_enhanced(&self, entries: Vec<EnhancedEntry>) -> Result<()> {
        self.install(entries, None)
    }

    fn install(&self, entries: Vec<EnhancedEntry>, reporter: Option<ProgressReportFn>) -> Result<()> {
        match build_generation(entries, &self.config, reporter) {
            Ok(generation) => {
                *self.current.write() = Some(Arc::new(generation));
                Ok(())
            }
            Err(e) => {
                warn!("Index build failed, engine is uninitialized: {}", e);
                self.discard();
                Err(e)
            }
        }
    }

    fn discard(&self) {
        *self.current.write() = None;
    }

    fn generation(&self) -> Result<Arc<IndexGeneration>> {
        self.current.read().clone().ok_or_else(DictError::not_initialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn entry_count(&self) -> Result<usize> {
        Ok(self.generation()?.entries.len())
    }

    /// All entries of the current generation, in source order.
    pub fn entries(&self) -> Result<Vec<Arc<EnhancedEntry>>> {
        Ok(self.generation()?.entries.clone())
    }

    pub fn get_entry(&self, id: &str) -> Result<Option<Arc<EnhancedEntry>>> {
        let generation = self.generation()?;
        Ok(generation
            .ids
            .get(id)
            .and_then(|&entry_no| generation.entry(entry_no))
            .cloned())
    }

    pub fn stats(&self) -> Result<IndexStats> {
        Ok(self.generation()?.stats())
    }

    /// Runs a search.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before a successful `initialize`. Otherwise no
    /// match is an empty list, never an error.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let generation = self.generation()?;
        let normalized = phrase(&normalize(&query.text));
        let limit = query.limit.unwrap_or(self.config.default_limit);
        if normalized.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let key = QueryKey {
            text: normalized,
            language: query.language,
            mode: query.mode,
            limit,
            include_empty: query.include_empty,
        };
        if let Some(cache) = &generation.query_cache {
            if let Some(hit) = cache.lock().get(&key) {
                debug!("Query cache hit for '{}' ({}, {})", key.text, key.mode, key.language);
                return Ok(hit.as_ref().clone());
            }
        }

        let started = Instant::now();
        let results = match query.mode {
            SearchMode::Exact => self.exact_results(&generation, &key.text, query.language),
            SearchMode::Fuzzy => self.fuzzy_results(&generation, &key.text),
            SearchMode::Partial => self.partial_results(&generation, &key.text, query.language),
            SearchMode::Hybrid => self.hybrid_results(&generation, &key.text, query.language),
        };
        let results = finalize(results, query.include_empty, limit);
        debug!(
            "Search '{}' ({}, {}) returned {} results in {:?}",
            key.text,
            key.mode,
            key.language,
            results.len(),
            started.elapsed()
        );

        if let Some(cache) = &generation.query_cache {
            cache.lock().put(key, Arc::new(results.clone()));
        }
        Ok(results)
    }

    fn results_for(
        generation: &IndexGeneration,
        entry_nos: impl IntoIterator<Item = EntryNo>,
        score: f64,
        match_type: MatchType,
        language: Language,
    ) -> Vec<SearchResult> {
        entry_nos
            .into_iter()
            .filter_map(|entry_no| generation.entry(entry_no))
            .map(|entry| SearchResult {
                entry: Arc::clone(entry),
                score,
                match_type,
                matched_fields: vec![language.field()],
            })
            .collect()
    }

    fn exact_results(&self, generation: &IndexGeneration, normalized: &str, language: Language) -> Vec<SearchResult> {
        let hits = generation.language(language).exact(normalized);
        Self::results_for(generation, hits, 1.0, MatchType::Exact, language)
    }

    fn fuzzy_results(&self, generation: &IndexGeneration, normalized: &str) -> Vec<SearchResult> {
        generation
            .fuzzy
            .search(normalized, &self.config.fuzzy)
            .into_iter()
            .filter_map(|m| {
                generation.entry(m.entry).map(|entry| SearchResult {
                    entry: Arc::clone(entry),
                    score: m.score,
                    match_type: MatchType::Fuzzy,
                    matched_fields: m.fields,
                })
            })
            .collect()
    }

    fn partial_results(&self, generation: &IndexGeneration, normalized: &str, language: Language) -> Vec<SearchResult> {
        let index = generation.language(language);
        let mut best: HashMap<EntryNo, usize> = HashMap::new();
        let mut results: Vec<SearchResult> = Vec::new();
        for (word, _) in index.suggest(normalized, self.config.autocomplete_limit) {
            let score = if word == normalized { 1.0 } else { self.config.partial_match_score };
            for entry_no in index.lookup(&word) {
                match best.get(&entry_no) {
                    Some(&slot) => {
                        if score > results[slot].score {
                            results[slot].score = score;
                        }
                    }
                    None => {
                        if let Some(entry) = generation.entry(entry_no) {
                            best.insert(entry_no, results.len());
                            results.push(SearchResult {
                                entry: Arc::clone(entry),
                                score,
                                match_type: MatchType::Partial,
                                matched_fields: vec![language.field()],
                            });
                        }
                    }
                }
            }
        }
        sort_by_score(&mut results);
        results
    }

    fn hybrid_results(&self, generation: &IndexGeneration, normalized: &str, language: Language) -> Vec<SearchResult> {
        let exact = self.exact_results(generation, normalized, language);
        if exact.len() >= self.config.sufficient_exact_matches {
            return exact;
        }
        let fuzzy = self.fuzzy_results(generation, normalized);
        merge_hybrid(exact, fuzzy)
    }

    /// Word-level completions for `text` in `language`.
    ///
    /// Empty input, or input shorter than the configured minimum, yields no
    /// suggestions.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before a successful `initialize`.
    pub fn autocomplete(&self, text: &str, language: Language) -> Result<Vec<Suggestion>> {
        let generation = self.generation()?;
        let normalized = phrase(&normalize(text));
        if normalized.is_empty() || normalized.chars().count() < self.config.min_autocomplete_len {
            return Ok(Vec::new());
        }
        Ok(generation
            .language(language)
            .suggest(&normalized, self.config.autocomplete_limit)
            .into_iter()
            .map(|(word, count)| Suggestion {
                is_exact_match: word == normalized,
                text: word,
                count,
                language,
            })
            .collect())
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MatchedField;
    use crate::utils::progress_report::ProgressState;

    fn sample_entries() -> Vec<RawEntry> {
        vec![
            RawEntry::new("casa").with_targets(["nanga"]),
            RawEntry::new("caza").with_targets(["bolo"]),
        ]
    }

    fn engine() -> SearchEngine {
        let engine = SearchEngine::default();
        engine.initialize(sample_entries()).unwrap();
        engine
    }

    fn always_cancel(_state: &mut ProgressState) -> bool {
        true
    }

    #[test]
    fn test_queries_before_initialize_fail() {
        let engine = SearchEngine::default();
        assert!(engine.search(&SearchQuery::new("casa")).unwrap_err().is_not_initialized());
        assert!(engine.autocomplete("ca", Language::Source).unwrap_err().is_not_initialized());
        assert!(engine.entry_count().unwrap_err().is_not_initialized());
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_exact_search_scenario() {
        let engine = engine();
        let results = engine
            .search(&SearchQuery::new("casa").mode(SearchMode::Exact).language(Language::Source))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.source_word, "casa");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[0].match_type, MatchType::Exact);
        assert_eq!(results[0].matched_fields, vec![MatchedField::Source]);
    }

    #[test]
    fn test_exact_search_in_target_language() {
        let engine = engine();
        let results = engine
            .search(&SearchQuery::new("BOLO").mode(SearchMode::Exact).language(Language::Target))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.source_word, "caza");
        assert_eq!(results[0].matched_fields, vec![MatchedField::Target]);
    }

    #[test]
    fn test_fuzzy_search_scenario() {
        let engine = engine();
        let results = engine.search(&SearchQuery::new("casz").mode(SearchMode::Fuzzy)).unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].entry.source_word, "casa");
        assert_eq!(results[0].match_type, MatchType::Fuzzy);
        assert!(results[0].score > 0.0 && results[0].score < 1.0);
        for result in &results {
            assert!(["casa", "caza"].contains(&result.entry.source_word.as_str()));
        }
    }

    #[test]
    fn test_partial_search_ranks_completion_of_query_first() {
        let engine = SearchEngine::default();
        engine
            .initialize(vec![
                RawEntry::new("casamiento").with_targets(["a"]),
                RawEntry::new("casa").with_targets(["b"]),
                RawEntry::new("casas").with_targets(["c"]),
            ])
            .unwrap();
        let results = engine.search(&SearchQuery::new("casa").mode(SearchMode::Partial)).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].entry.source_word, "casa");
        assert_eq!(results[0].score, 1.0);
        assert!(results[1..].iter().all(|r| r.score == 0.8 && r.match_type == MatchType::Partial));
    }

    #[test]
    fn test_hybrid_prefers_exact_scores() {
        let engine = engine();
        let results = engine.search(&SearchQuery::new("casa")).unwrap();
        assert_eq!(results[0].entry.source_word, "casa");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[0].match_type, MatchType::Exact);
        // "caza" is one edit away and comes from the fuzzy pass
        assert_eq!(results[1].entry.source_word, "caza");
        assert_eq!(results[1].match_type, MatchType::Fuzzy);
        assert!(results[1].score < 1.0);
    }

    #[test]
    fn test_hybrid_skips_fuzzy_when_exact_is_sufficient() {
        let config = SearchConfig { sufficient_exact_matches: 1, ..SearchConfig::default() };
        let engine = SearchEngine::new(config).unwrap();
        engine.initialize(sample_entries()).unwrap();
        let results = engine.search(&SearchQuery::new("casa")).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_type, MatchType::Exact);
    }

    #[test]
    fn test_include_empty_and_limit() {
        let engine = SearchEngine::default();
        engine
            .initialize(vec![RawEntry::new("sol"), RawEntry::new("sol").with_targets(["weya"])])
            .unwrap();
        let query = SearchQuery::new("sol").mode(SearchMode::Exact);
        assert_eq!(engine.search(&query).unwrap().len(), 1);
        assert_eq!(engine.search(&query.clone().include_empty(true)).unwrap().len(), 2);
        assert_eq!(engine.search(&query.clone().include_empty(true).limit(1)).unwrap().len(), 1);
        assert!(engine.search(&SearchQuery::new("  ¿? ")).unwrap().is_empty());
    }

    #[test]
    fn test_autocomplete_scenario() {
        let engine = engine();
        let suggestions = engine.autocomplete("ca", Language::Source).unwrap();
        let words: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(words, vec!["casa", "caza"]);
        assert!(suggestions.iter().all(|s| s.count == 1 && !s.is_exact_match));
        let exact = engine.autocomplete("Casa", Language::Source).unwrap();
        assert!(exact[0].is_exact_match);
        assert!(engine.autocomplete("", Language::Source).unwrap().is_empty());
    }

    #[test]
    fn test_min_autocomplete_len() {
        let config = SearchConfig { min_autocomplete_len: 3, ..SearchConfig::default() };
        let engine = SearchEngine::new(config).unwrap();
        engine.initialize(sample_entries()).unwrap();
        assert!(engine.autocomplete("ca", Language::Source).unwrap().is_empty());
        assert_eq!(engine.autocomplete("cas", Language::Source).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_rebuild_leaves_engine_uninitialized() {
        let engine = engine();
        let err = engine.initialize(vec![RawEntry::new("ok"), RawEntry::default()]).unwrap_err();
        assert!(err.is_index_build());
        assert!(!engine.is_initialized());
        assert!(engine.search(&SearchQuery::new("casa")).unwrap_err().is_not_initialized());
        engine.initialize(sample_entries()).unwrap();
        assert_eq!(engine.entry_count().unwrap(), 2);
    }

    #[test]
    fn test_cancelled_build_leaves_engine_uninitialized() {
        let engine = engine();
        let err = engine.initialize_with_progress(sample_entries(), Some(always_cancel)).unwrap_err();
        assert!(matches!(err, DictError::UserInterrupted { .. }));
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_rebuild_does_not_disturb_held_results() {
        let engine = engine();
        let before = engine.search(&SearchQuery::new("casa").mode(SearchMode::Exact)).unwrap();
        engine.initialize(vec![RawEntry::new("perro").with_targets(["mbwa"])]).unwrap();
        assert_eq!(before[0].entry.source_word, "casa");
        assert!(engine.search(&SearchQuery::new("casa").mode(SearchMode::Exact)).unwrap().is_empty());
        assert_eq!(engine.get_entry("entry-0").unwrap().unwrap().source_word, "perro");
    }

    #[test]
    fn test_cached_results_match_fresh_results() {
        let engine = engine();
        let query = SearchQuery::new("casz").mode(SearchMode::Fuzzy);
        let first = engine.search(&query).unwrap();
        let second = engine.search(&query).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_long_translation_phrase_is_searchable() {
        let engine = SearchEngine::default();
        let long_word = "x".repeat(50_000);
        let phrase = format!("{} y", "x".repeat(50_000));
        engine
            .initialize(vec![
                RawEntry::new("casa").with_targets([long_word.as_str()]),
                RawEntry::new("caza").with_targets([phrase.as_str()]),
            ])
            .unwrap();
        let suggestions = engine.autocomplete("x", Language::Target).unwrap();
        assert_eq!(suggestions.len(), 2);
        let results = engine
            .search(&SearchQuery::new(phrase.as_str()).mode(SearchMode::Exact).language(Language::Target))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.source_word, "caza");
        engine.initialize(sample_entries()).unwrap();
    }

    #[test]
    fn test_queries_run_concurrently_with_rebuilds() {
        let engine = engine();
        let larger = vec![
            RawEntry::new("cama").with_targets(["bongo"]),
            RawEntry::new("casa").with_targets(["nanga"]),
            RawEntry::new("caza").with_targets(["bolo"]),
        ];
        let generations = [sample_entries(), larger];

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        let results = engine.search(&SearchQuery::new("casa").mode(SearchMode::Exact)).unwrap();
                        assert_eq!(results.len(), 1);
                        assert_eq!(results[0].entry.source_word, "casa");

                        let suggestions = engine.autocomplete("ca", Language::Source).unwrap();
                        let words: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
                        assert!(
                            words == ["casa", "caza"] || words == ["cama", "casa", "caza"],
                            "suggestions mix generations: {:?}",
                            words
                        );

                        let count = engine.entry_count().unwrap();
                        assert!(count == 2 || count == 3);
                    }
                });
            }
            for round in 0..50 {
                engine.initialize(generations[round % 2].clone()).unwrap();
            }
        });
        assert!(engine.is_initialized());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SearchConfig { default_limit: 0, ..SearchConfig::default() };
        assert!(SearchEngine::new(config).is_err());
    }
}
