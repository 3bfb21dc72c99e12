//! Query and result types of the search engine.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::index::MatchedField;
use crate::storage::entry::EnhancedEntry;
use crate::DictError;

/// Which side of the dictionary a query targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Spanish headwords
    #[default]
    Source,
    /// Ndowe translations
    Target,
}

impl Language {
    /// The entry field words of this language are indexed from.
    pub fn field(self) -> MatchedField {
        match self {
            Language::Source => MatchedField::Source,
            Language::Target => MatchedField::Target,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Source => "source",
            Language::Target => "target",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = DictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "source" | "es" | "spanish" | "espanol" | "español" => Ok(Language::Source),
            "target" | "ndowe" | "ndw" => Ok(Language::Target),
            other => Err(DictError::invalid_parameter(format!("Unknown language: {}", other))),
        }
    }
}

/// Matching strategy selected by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Normalized whole-word (or phrase) lookup
    Exact,
    /// Typo-tolerant matching over source word, translations and examples
    Fuzzy,
    /// Prefix completion through the trie
    #[serde(alias = "autocomplete")]
    Partial,
    /// Exact first, topped up with fuzzy matches when exact coverage is thin
    #[default]
    Hybrid,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::Exact => "exact",
            SearchMode::Fuzzy => "fuzzy",
            SearchMode::Partial => "partial",
            SearchMode::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

impl FromStr for SearchMode {
    type Err = DictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(SearchMode::Exact),
            "fuzzy" => Ok(SearchMode::Fuzzy),
            "partial" | "autocomplete" | "prefix" => Ok(SearchMode::Partial),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(DictError::invalid_parameter(format!("Unknown search mode: {}", other))),
        }
    }
}

/// How a result was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Partial,
}

/// A search request.
///
/// # Examples
///
/// ```
/// use ndowe_dict::search::{Language, SearchMode, SearchQuery};
///
/// let query = SearchQuery::new("casa")
///     .language(Language::Source)
///     .mode(SearchMode::Exact)
///     .limit(5);
/// assert_eq!(query.limit, Some(5));
/// assert!(!query.include_empty);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub mode: SearchMode,
    /// Result cap; the engine's default limit applies when absent
    #[serde(default)]
    pub limit: Option<usize>,
    /// Keep entries that have no translations
    #[serde(default)]
    pub include_empty: bool,
}

impl SearchQuery {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            language: Language::default(),
            mode: SearchMode::default(),
            limit: None,
            include_empty: false,
        }
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn include_empty(mut self, include_empty: bool) -> Self {
        self.include_empty = include_empty;
        self
    }
}

/// One ranked search hit. The entry is shared with the index generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub entry: Arc<EnhancedEntry>,
    /// 1.0 is the best possible score
    pub score: f64,
    pub match_type: MatchType,
    pub matched_fields: Vec<MatchedField>,
}

/// A word-level autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub text: String,
    /// Number of entries containing the word
    pub count: usize,
    pub language: Language,
    pub is_exact_match: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_and_mode() {
        assert_eq!("ES".parse::<Language>().unwrap(), Language::Source);
        assert_eq!("ndowe".parse::<Language>().unwrap(), Language::Target);
        assert!("fr".parse::<Language>().is_err());
        assert_eq!("autocomplete".parse::<SearchMode>().unwrap(), SearchMode::Partial);
        assert_eq!("Hybrid".parse::<SearchMode>().unwrap(), SearchMode::Hybrid);
        assert!("semantic".parse::<SearchMode>().is_err());
    }

    #[test]
    fn test_query_json_defaults() {
        let query: SearchQuery = serde_json::from_str(r#"{"text":"casa","mode":"autocomplete"}"#).unwrap();
        assert_eq!(query.language, Language::Source);
        assert_eq!(query.mode, SearchMode::Partial);
        assert_eq!(query.limit, None);
        assert!(!query.include_empty);
    }
}
