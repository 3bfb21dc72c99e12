//! # ndowe-dict - Offline Spanish-Ndowe Dictionary Search
//!
//! This crate provides the search engine behind an offline bilingual dictionary
//! between Spanish and Ndowe: it builds in-memory indexes over a versioned word
//! list and answers exact, prefix and typo-tolerant queries in either language.
//!
//! ## Features
//!
//! - **Accent-insensitive matching**: "ÁRBOL", "arbol" and "árbol " all find the same entry
//! - **Autocomplete**: prefix suggestions ranked by how many entries a word maps to
//! - **Fuzzy search**: Damerau-Levenshtein matching across headwords, translations and examples
//! - **Hybrid ranking**: exact hits first, topped up with fuzzy matches when there are few
//! - **Offline cache**: versioned, integrity-checked persistence with a freshness window
//!
//! ## Quick Start
//!
//! ### Searching an in-memory word list
//!
//! ```
//! use ndowe_dict::{RawEntry, SearchEngine, SearchQuery, SearchMode};
//!
//! # fn main() -> ndowe_dict::Result<()> {
//! let engine = SearchEngine::default();
//! engine.initialize(vec![
//!     RawEntry::new("casa").with_targets(["nanga"]),
//!     RawEntry::new("caza").with_targets(["bwamba"]),
//! ])?;
//!
//! let results = engine.search(&SearchQuery::new("CASA"))?;
//! assert_eq!(results[0].entry.source_word, "casa");
//! assert_eq!(results[0].score, 1.0);
//!
//! let typo = engine.search(&SearchQuery::new("casz").mode(SearchMode::Fuzzy))?;
//! assert!(!typo.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ### Opening a cached dictionary session
//!
//! ```no_run
//! use ndowe_dict::{Dictionary, EngineConfig, FileStore, JsonFileLoader, SearchQuery};
//!
//! # fn main() -> ndowe_dict::Result<()> {
//! let loader = JsonFileLoader::new("dictionary.json");
//! let store = FileStore::open("/var/cache/ndowe")?;
//! let mut dictionary = Dictionary::new(loader, store, &EngineConfig::default())?;
//!
//! let outcome = dictionary.open()?;
//! println!("{} entries, version {}", outcome.entry_count, outcome.version);
//!
//! for result in dictionary.engine().search(&SearchQuery::new("agua"))? {
//!     println!("{} -> {}", result.entry.source_word, result.entry.target_words_joined);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): builds the `ndowe-search` command line tool
//!
//! ## Architecture
//!
//! The crate is organized into several key modules:
//!
//! - **Entries**: [`storage`] for raw and enhanced dictionary records
//! - **Indexes**: [`index`] for the trie, inverted and fuzzy indexes
//! - **Builder**: [`builder`] for dictionary sources and index generation
//! - **Search**: [`search`] for queries, ranking and the search engine
//! - **Cache**: [`cache`] for offline persistence
//! - **Session**: [`dictionary`] for wiring a loader, a cache and an engine
//! - **Utilities**: [`utils`] for text normalization, hashing and progress reporting
//!
//! ## Error Handling
//!
//! All fallible operations return a [`Result<T>`] type, where errors are represented by
//! [`DictError`]. The crate uses the `snafu` library for ergonomic error handling with
//! context and backtraces.
//!
//! ```
//! use ndowe_dict::{Result, SearchEngine, SearchQuery};
//!
//! fn example() -> Result<()> {
//!     let engine = SearchEngine::default();
//!     // Querying before initialize is an error, not an empty result
//!     assert!(engine.search(&SearchQuery::new("casa")).unwrap_err().is_not_initialized());
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod index;
pub mod search;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use builder::{DictionaryLoader, JsonFileLoader, MemoryLoader, IndexStats};
pub use cache::{CacheMetadata, FileStore, KvStore, MemoryStore, OfflineCache};
pub use config::{CacheConfig, EngineConfig, FuzzyConfig, SearchConfig};
pub use dictionary::{Dictionary, LoadOrigin, LoadOutcome};
pub use search::{Language, MatchType, MatchedField, SearchEngine, SearchMode, SearchQuery, SearchResult, Suggestion};
pub use storage::{EnhancedEntry, RawEntry};

// Re-export error types for convenience
pub use error::{DictError, Result, snafu};
