// Query resolution
//
// This module provides the query and result types, the ranking rules and the
// search engine that resolves exact, fuzzy, partial and hybrid queries.

pub mod query;
pub mod ranking;
pub mod engine;

pub use query::{Language, SearchMode, MatchType, SearchQuery, SearchResult, Suggestion};
pub use engine::SearchEngine;
pub use crate::index::MatchedField;
