//! Offline persistence of the enhanced dictionary.

pub mod kv_store;
pub mod offline_cache;

pub use kv_store::{FileStore, KvStore, MemoryStore};
pub use offline_cache::{CacheMetadata, OfflineCache};
