//! Builder module for loading dictionary data and building search indexes
//!
//! This module contains the dictionary source abstraction and the staged
//! construction of index generations consumed by the search engine.

pub mod data_loader;
pub mod index_builder;

// Re-export commonly used types for convenience
pub use data_loader::{DictionaryLoader, JsonFileLoader, MemoryLoader};
pub use index_builder::{build_generation, IndexGeneration, IndexStats};
