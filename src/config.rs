//! Engine configuration.
//!
//! Configuration is plain serde data so hosts can ship it as JSON next to the
//! dictionary. Every field has a default; a partial file only overrides what it names.
//!
//! # Examples
//!
//! ```
//! use ndowe_dict::config::EngineConfig;
//!
//! # fn main() -> ndowe_dict::Result<()> {
//! let config = EngineConfig::from_json_str(r#"{ "search": { "default_limit": 20 } }"#)?;
//! assert_eq!(config.search.default_limit, 20);
//! assert_eq!(config.search.sufficient_exact_matches, 10);
//! assert_eq!(config.cache.freshness_hours, 24);
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{DictError, Result};

/// Weights and admission threshold for approximate matching.
///
/// `threshold` is the largest normalized edit distance (0.0 = identical,
/// 1.0 = nothing in common) a field may have and still count as a match.
/// Weights rank matches by the field they hit and must keep the order
/// source > target > example.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    pub threshold: f64,
    pub source_weight: f64,
    pub target_weight: f64,
    pub example_weight: f64,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            source_weight: 1.0,
            target_weight: 0.8,
            example_weight: 0.3,
        }
    }
}

/// Query-time behaviour of the search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result cap applied when a query does not set its own limit
    pub default_limit: usize,
    /// Hybrid search skips the fuzzy pass once this many exact matches are found
    pub sufficient_exact_matches: usize,
    /// Maximum number of trie suggestions consulted per query
    pub autocomplete_limit: usize,
    /// Queries shorter than this (in characters, after normalization) get no suggestions
    pub min_autocomplete_len: usize,
    /// Score given to prefix completions that are not the query itself
    pub partial_match_score: f64,
    /// Number of recent search results kept per index generation; 0 disables caching
    pub query_cache_capacity: usize,
    pub fuzzy: FuzzyConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            sufficient_exact_matches: 10,
            autocomplete_limit: 10,
            min_autocomplete_len: 1,
            partial_match_score: 0.8,
            query_cache_capacity: 64,
            fuzzy: FuzzyConfig::default(),
        }
    }
}

/// Offline cache behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cached data older than this is stale regardless of its version
    pub freshness_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { freshness_hours: 24 }
    }
}

/// Top-level configuration for a dictionary session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchConfig,
    pub cache: CacheConfig,
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(DictError::invalid_parameter(format!("{} must be within [0, 1], got {}", name, value)));
    }
    Ok(())
}

impl EngineConfig {
    /// Parses a configuration from JSON text and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from a JSON file and validates it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Checks value ranges and the field-priority ordering.
    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        let fuzzy = &search.fuzzy;
        if search.default_limit == 0 {
            return Err(DictError::invalid_parameter("default_limit must be at least 1"));
        }
        check_unit_interval("fuzzy.threshold", fuzzy.threshold)?;
        check_unit_interval("partial_match_score", search.partial_match_score)?;
        if search.partial_match_score >= 1.0 {
            return Err(DictError::invalid_parameter("partial_match_score must be below the exact score 1.0"));
        }
        if fuzzy.example_weight <= 0.0 {
            return Err(DictError::invalid_parameter("fuzzy weights must be positive"));
        }
        if !(fuzzy.source_weight > fuzzy.target_weight && fuzzy.target_weight > fuzzy.example_weight) {
            return Err(DictError::invalid_parameter(format!(
                "fuzzy weights must satisfy source > target > example, got {} / {} / {}",
                fuzzy.source_weight, fuzzy.target_weight, fuzzy.example_weight
            )));
        }
        if self.cache.freshness_hours <= 0 {
            return Err(DictError::invalid_parameter("cache.freshness_hours must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "search": { "fuzzy": { "threshold": 0.4 } } }"#).unwrap();
        assert_eq!(config.search.fuzzy.threshold, 0.4);
        assert_eq!(config.search.fuzzy.source_weight, 1.0);
        assert_eq!(config.search.default_limit, 50);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            r#"{ "search": { "default_limit": 0 } }"#,
            r#"{ "search": { "fuzzy": { "threshold": 1.5 } } }"#,
            r#"{ "search": { "partial_match_score": 1.0 } }"#,
            r#"{ "search": { "fuzzy": { "source_weight": 0.5, "target_weight": 0.8 } } }"#,
            r#"{ "search": { "fuzzy": { "example_weight": 0.0 } } }"#,
            r#"{ "cache": { "freshness_hours": 0 } }"#,
        ];
        for json in cases {
            let result = EngineConfig::from_json_str(json);
            assert!(
                matches!(result, Err(DictError::InvalidParameter { .. })),
                "expected {} to be rejected",
                json
            );
        }
    }

    #[test]
    fn test_malformed_json_is_parser_error() {
        let result = EngineConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(DictError::ParserError { .. })));
    }
}
