//! One dictionary session: loader, offline cache and search engine wired together.
//!
//! [`Dictionary::open`] decides where the entries come from:
//!
//! 1. probe the loader for its current version
//! 2. serve the offline cache when it holds that version and is fresh
//! 3. otherwise fetch, build the indexes and store the result for next time
//!
//! Cache failures never abort a load; the session continues memory-only. When
//! the loader is unreachable, any cached copy (even a stale one) is served.

use log::{info, warn};

use crate::builder::data_loader::DictionaryLoader;
use crate::cache::kv_store::KvStore;
use crate::cache::offline_cache::{CacheMetadata, OfflineCache};
use crate::config::EngineConfig;
use crate::search::engine::SearchEngine;
use crate::storage::entry::EnhancedEntry;
use crate::{DictError, Result};

/// Where the entries of a load came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// The cache held the loader's current version.
    FromCache,
    /// Entries were fetched from the loader.
    FromLoader,
    /// The loader was unreachable and an outdated cached copy was served.
    StaleCache,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub origin: LoadOrigin,
    pub version: String,
    pub entry_count: usize,
}

pub struct Dictionary<L: DictionaryLoader, S: KvStore> {
    loader: L,
    cache: OfflineCache<S>,
    engine: SearchEngine,
}

impl<L: DictionaryLoader, S: KvStore> Dictionary<L, S> {
    /// Creates a session. Nothing is loaded until [`open`](Self::open).
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when `config` does not validate.
    pub fn new(loader: L, store: S, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            loader,
            cache: OfflineCache::new(store, &config.cache),
            engine: SearchEngine::new(config.search.clone())?,
        })
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn cache(&self) -> &OfflineCache<S> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut OfflineCache<S> {
        &mut self.cache
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    /// Loads the dictionary, preferring a valid offline copy.
    ///
    /// # Errors
    ///
    /// Returns the loader's `Load` error when it is unreachable and nothing is
    /// cached, and `IndexBuild` when fetched data is malformed.
    pub fn open(&mut self) -> Result<LoadOutcome> {
        let version = match self.loader.latest_version() {
            Ok(version) => version,
            Err(e) if e.is_load() => return self.serve_cached_fallback(e),
            Err(e) => return Err(e),
        };

        if self.cache.is_valid(Some(&version)) {
            match self.install_cached(LoadOrigin::FromCache) {
                Ok(Some(outcome)) => {
                    info!("Serving {} cached entries (version {})", outcome.entry_count, outcome.version);
                    return Ok(outcome);
                }
                Ok(None) => {}
                Err(e) => warn!("Offline cache unusable, refetching: {}", e),
            }
        }
        self.fetch()
    }

    /// Fetches from the loader regardless of the cache state.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn refresh(&mut self) -> Result<LoadOutcome> {
        self.fetch()
    }

    fn fetch(&mut self) -> Result<LoadOutcome> {
        let (raw_entries, version) = match self.loader.fetch_entries() {
            Ok(fetched) => fetched,
            Err(e) if e.is_load() => return self.serve_cached_fallback(e),
            Err(e) => return Err(e),
        };
        self.engine.initialize(raw_entries)?;

        let entries: Vec<EnhancedEntry> = self.engine.entries()?.iter().map(|entry| (**entry).clone()).collect();
        let metadata = CacheMetadata::new(version.as_str()).with_index_built(true);
        if let Err(e) = self.cache.store(&entries, metadata) {
            warn!("Offline cache unavailable, continuing memory-only: {}", e);
        }
        info!("Loaded {} entries (version {}) from source", entries.len(), version);
        Ok(LoadOutcome {
            origin: LoadOrigin::FromLoader,
            version,
            entry_count: entries.len(),
        })
    }

    fn serve_cached_fallback(&mut self, cause: DictError) -> Result<LoadOutcome> {
        match self.install_cached(LoadOrigin::StaleCache) {
            Ok(Some(outcome)) => {
                warn!(
                    "Dictionary source unreachable ({}), serving cached version {}",
                    cause, outcome.version
                );
                Ok(outcome)
            }
            Ok(None) => Err(cause),
            Err(e) => {
                warn!("Dictionary source unreachable and cached copy unusable: {}", e);
                Err(cause)
            }
        }
    }

    fn install_cached(&mut self, origin: LoadOrigin) -> Result<Option<LoadOutcome>> {
        let Some(metadata) = self.cache.metadata()? else {
            return Ok(None);
        };
        let Some(entries) = self.cache.load()? else {
            return Ok(None);
        };
        let entry_count = entries.len();
        self.engine.initialize_enhanced(entries)?;
        Ok(Some(LoadOutcome {
            origin,
            version: metadata.version,
            entry_count,
        }))
    }
}

impl<L: DictionaryLoader, S: KvStore> std::fmt::Debug for Dictionary<L, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary").field("engine", &self.engine).finish_non_exhaustive()
    }
}
