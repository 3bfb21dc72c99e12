// Dictionary data model
//
// This module holds the entry records shared by the indexes, the search engine
// and the offline cache.

pub mod entry;

pub use entry::{EntryNo, RawEntry, EnhancedEntry, enhance_entries, revalidate_entries};
