//! Persists enhanced entries between sessions.
//!
//! Two blobs live in the backing [`KvStore`]: the JSON-serialized entry list
//! and a [`CacheMetadata`] record describing it. The metadata carries the
//! entry count and content hash of the entry blob, so a truncated or foreign
//! blob is reported instead of being served.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::cache::kv_store::KvStore;
use crate::config::CacheConfig;
use crate::storage::entry::EnhancedEntry;
use crate::utils::digest::content_hash;
use crate::{DictError, Result};

pub const ENTRIES_KEY: &str = "dictionary_entries";
pub const METADATA_KEY: &str = "dictionary_metadata";

/// Describes the cached entry list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    pub last_updated: DateTime<Utc>,
    pub version: String,
    pub entry_count: usize,
    pub index_built: bool,
    pub content_hash: String,
}

impl CacheMetadata {
    /// Metadata for `version`, timestamped now. Count and hash are filled in by
    /// [`OfflineCache::store`].
    pub fn new<S: Into<String>>(version: S) -> Self {
        Self {
            last_updated: Utc::now(),
            version: version.into(),
            entry_count: 0,
            index_built: false,
            content_hash: String::new(),
        }
    }

    pub fn with_index_built(mut self, index_built: bool) -> Self {
        self.index_built = index_built;
        self
    }

    pub fn with_last_updated(mut self, last_updated: DateTime<Utc>) -> Self {
        self.last_updated = last_updated;
        self
    }
}

/// Offline copy of the dictionary on top of a [`KvStore`].
pub struct OfflineCache<S: KvStore> {
    backend: S,
    freshness: Duration,
}

impl<S: KvStore> OfflineCache<S> {
    pub fn new(backend: S, config: &CacheConfig) -> Self {
        Self {
            backend,
            freshness: Duration::try_hours(config.freshness_hours).unwrap_or(Duration::MAX),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Persists `entries`, overwriting any previous copy.
    ///
    /// The stored metadata gets the entry count and the content hash of the
    /// serialized list stamped in; the stamped copy is returned.
    ///
    /// # Errors
    ///
    /// Returns a `Cache` error if the backend cannot be written.
    pub fn store(&mut self, entries: &[EnhancedEntry], mut metadata: CacheMetadata) -> Result<CacheMetadata> {
        let blob = serde_json::to_vec(entries)
            .map_err(|e| DictError::cache(format!("Failed to serialize entries: {}", e)))?;
        metadata.entry_count = entries.len();
        metadata.content_hash = content_hash(&blob);
        let meta_blob = serde_json::to_vec(&metadata)
            .map_err(|e| DictError::cache(format!("Failed to serialize cache metadata: {}", e)))?;

        self.backend.put(ENTRIES_KEY, &blob)?;
        self.backend.put(METADATA_KEY, &meta_blob)?;
        info!(
            "Cached {} entries (version {}, {} bytes)",
            metadata.entry_count,
            metadata.version,
            blob.len()
        );
        Ok(metadata)
    }

    /// Reads the stored metadata, `None` if nothing was ever stored.
    ///
    /// # Errors
    ///
    /// Returns a `Cache` error if the backend fails or the record is unreadable.
    pub fn metadata(&self) -> Result<Option<CacheMetadata>> {
        let Some(blob) = self.backend.get(METADATA_KEY)? else {
            return Ok(None);
        };
        serde_json::from_slice(&blob)
            .map(Some)
            .map_err(|e| DictError::cache(format!("Cache metadata is unreadable: {}", e)))
    }

    /// Returns exactly the entries last stored, or `None` when nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns a `Cache` error if the backend fails or the stored blob does not
    /// match its metadata.
    pub fn load(&self) -> Result<Option<Vec<EnhancedEntry>>> {
        let Some(metadata) = self.metadata()? else {
            debug!("Offline cache is empty");
            return Ok(None);
        };
        let blob = self
            .backend
            .get(ENTRIES_KEY)?
            .ok_or_else(|| DictError::cache("Cache metadata exists but the entry blob is missing"))?;

        let actual_hash = content_hash(&blob);
        if actual_hash != metadata.content_hash {
            return Err(DictError::cache(format!(
                "Cached entries are corrupted: hash {} does not match recorded {}",
                actual_hash, metadata.content_hash
            )));
        }
        let entries: Vec<EnhancedEntry> = serde_json::from_slice(&blob)
            .map_err(|e| DictError::cache(format!("Cached entries are unreadable: {}", e)))?;
        if entries.len() != metadata.entry_count {
            return Err(DictError::cache(format!(
                "Cached entry count {} does not match recorded {}",
                entries.len(),
                metadata.entry_count
            )));
        }
        info!("Loaded {} cached entries (version {})", entries.len(), metadata.version);
        Ok(Some(entries))
    }

    /// Whether the cached data may be served without refetching.
    pub fn is_valid(&self, required_version: Option<&str>) -> bool {
        self.is_valid_at(required_version, Utc::now())
    }

    /// [`is_valid`](Self::is_valid) evaluated at `now`.
    ///
    /// Invalid when nothing is cached, when `required_version` differs from the
    /// stored version, or when the data is older than the freshness window.
    pub fn is_valid_at(&self, required_version: Option<&str>, now: DateTime<Utc>) -> bool {
        let metadata = match self.metadata() {
            Ok(Some(metadata)) => metadata,
            Ok(None) => return false,
            Err(e) => {
                warn!("Treating offline cache as invalid: {}", e);
                return false;
            }
        };
        if let Some(required) = required_version {
            if required != metadata.version {
                debug!("Cache version {} does not match required {}", metadata.version, required);
                return false;
            }
        }
        let age = now.signed_duration_since(metadata.last_updated);
        if age > self.freshness {
            debug!("Cache is {} minutes old and stale", age.num_minutes());
            return false;
        }
        true
    }

    /// Removes both blobs.
    pub fn clear(&mut self) -> Result<()> {
        self.backend.remove(ENTRIES_KEY)?;
        self.backend.remove(METADATA_KEY)?;
        info!("Offline cache cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::kv_store::MemoryStore;
    use crate::storage::entry::{enhance_entries, RawEntry};

    fn entries() -> Vec<EnhancedEntry> {
        enhance_entries(vec![
            RawEntry::new("casa").with_targets(["nanga"]).with_examples(["mi casa es grande"]),
            RawEntry::new("agua").with_id("w-7").with_targets(["madiba"]),
            RawEntry::new("sol"),
        ])
        .unwrap()
    }

    fn cache() -> OfflineCache<MemoryStore> {
        OfflineCache::new(MemoryStore::new(), &CacheConfig::default())
    }

    #[test]
    fn test_round_trip_is_exact() {
        let mut cache = cache();
        assert_eq!(cache.load().unwrap(), None);
        let stored = cache.store(&entries(), CacheMetadata::new("v1").with_index_built(true)).unwrap();
        assert_eq!(stored.entry_count, 3);
        assert_eq!(stored.content_hash.len(), 16);
        assert_eq!(cache.load().unwrap(), Some(entries()));
        assert_eq!(cache.metadata().unwrap(), Some(stored));
    }

    #[test]
    fn test_validity_rules() {
        let mut cache = cache();
        assert!(!cache.is_valid(None));

        let stored_at = Utc::now();
        cache.store(&entries(), CacheMetadata::new("v1").with_last_updated(stored_at)).unwrap();
        assert!(cache.is_valid(None));
        assert!(cache.is_valid(Some("v1")));
        assert!(!cache.is_valid(Some("v2")));

        let within = stored_at + Duration::hours(23);
        let beyond = stored_at + Duration::hours(25);
        assert!(cache.is_valid_at(Some("v1"), within));
        assert!(!cache.is_valid_at(Some("v1"), beyond));
        assert!(!cache.is_valid_at(None, beyond));
    }

    #[test]
    fn test_corrupted_blob_is_reported() {
        let mut cache = cache();
        cache.store(&entries(), CacheMetadata::new("v1")).unwrap();
        cache.backend_mut().put(ENTRIES_KEY, b"[]").unwrap();
        assert!(cache.load().unwrap_err().is_cache());
    }

    #[test]
    fn test_count_mismatch_is_reported() {
        let mut cache = cache();
        let mut metadata = cache.store(&entries(), CacheMetadata::new("v1")).unwrap();
        metadata.entry_count = 5;
        let tampered = serde_json::to_vec(&metadata).unwrap();
        cache.backend_mut().put(METADATA_KEY, &tampered).unwrap();
        assert!(cache.load().unwrap_err().is_cache());
    }

    #[test]
    fn test_unreadable_metadata_invalidates() {
        let mut cache = cache();
        cache.store(&entries(), CacheMetadata::new("v1")).unwrap();
        cache.backend_mut().put(METADATA_KEY, b"not json").unwrap();
        assert!(!cache.is_valid(None));
        assert!(cache.load().unwrap_err().is_cache());
    }

    #[test]
    fn test_clear() {
        let mut cache = cache();
        cache.store(&entries(), CacheMetadata::new("v1")).unwrap();
        cache.clear().unwrap();
        assert!(cache.backend().is_empty());
        assert_eq!(cache.load().unwrap(), None);
    }
}
