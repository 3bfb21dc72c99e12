//! Dictionary entries as loaded from the source of truth and as indexed.
//!
//! [`RawEntry`] mirrors the JSON records served by the dictionary source. It is
//! validated once, when it is turned into an [`EnhancedEntry`]; after that every
//! field the indexes need is present and typed.
//!
//! # Examples
//!
//! ```
//! use ndowe_dict::storage::entry::{enhance_entries, RawEntry};
//!
//! # fn main() -> ndowe_dict::Result<()> {
//! let raw = vec![RawEntry::new("Canción").with_targets(["ndowe a"])];
//! let entries = enhance_entries(raw)?;
//! assert_eq!(entries[0].id, "entry-0");
//! assert_eq!(entries[0].source_word_normalized, "cancion");
//! assert!(entries[0].has_translations);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::utils::normalize::normalize;
use crate::{DictError, Result};

/// Position of an entry within one index generation.
///
/// Indexes store these handles instead of ID strings; the entry list of the
/// generation maps them back to entries.
pub type EntryNo = u32;

/// A dictionary record exactly as served by the dictionary source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEntry {
    /// Optional stable identifier; positional `entry-<index>` is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Spanish headword. Required; kept optional here so a missing value is
    /// reported as a build error naming the entry instead of a parse failure.
    pub source_word: Option<String>,
    /// Ndowe translations
    pub target_words: Vec<String>,
    pub examples: Vec<String>,
    pub cross_references: Vec<String>,
}

impl RawEntry {
    pub fn new<S: Into<String>>(source_word: S) -> Self {
        Self {
            source_word: Some(source_word.into()),
            ..Self::default()
        }
    }

    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_words = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = examples.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cross_references<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cross_references = refs.into_iter().map(Into::into).collect();
        self
    }
}

/// A dictionary record with the derived fields the indexes and the UI need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedEntry {
    pub id: String,
    pub source_word: String,
    pub source_word_normalized: String,
    pub target_words: Vec<String>,
    /// Translations joined with ", " for display
    pub target_words_joined: String,
    pub examples: Vec<String>,
    pub cross_references: Vec<String>,
    /// Every textual field concatenated, for display and export
    pub searchable_text: String,
    pub has_translations: bool,
    pub has_examples: bool,
    pub has_cross_references: bool,
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl EnhancedEntry {
    /// Validates a raw entry and derives its indexed fields.
    ///
    /// # Errors
    ///
    /// Returns an `IndexBuild` error when the source word is missing or blank.
    pub fn from_raw(raw: RawEntry, position: usize) -> Result<Self> {
        let source_word = match raw.source_word.as_deref().map(str::trim) {
            Some(word) if !word.is_empty() => word.to_string(),
            _ => {
                return Err(DictError::index_build(format!(
                    "entry {} is missing its source word",
                    position
                )));
            }
        };
        let id = match raw.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("entry-{}", position),
        };

        let mut entry = Self {
            id,
            source_word,
            source_word_normalized: String::new(),
            target_words: clean_list(raw.target_words),
            target_words_joined: String::new(),
            examples: clean_list(raw.examples),
            cross_references: clean_list(raw.cross_references),
            searchable_text: String::new(),
            has_translations: false,
            has_examples: false,
            has_cross_references: false,
        };
        entry.refresh_derived();
        Ok(entry)
    }

    /// Replaces the source word and recomputes everything derived from it.
    pub fn set_source_word<S: Into<String>>(&mut self, source_word: S) {
        self.source_word = source_word.into();
        self.refresh_derived();
    }

    /// Recomputes every derived field from the primary fields.
    ///
    /// Returns `true` when any derived field changed.
    pub fn refresh_derived(&mut self) -> bool {
        let normalized = normalize(&self.source_word);
        let joined = self.target_words.join(", ");
        let mut parts: Vec<&str> = Vec::with_capacity(4);
        parts.push(&self.source_word);
        if !joined.is_empty() {
            parts.push(&joined);
        }
        let examples = self.examples.join(" ");
        if !examples.is_empty() {
            parts.push(&examples);
        }
        let refs = self.cross_references.join(" ");
        if !refs.is_empty() {
            parts.push(&refs);
        }
        let searchable = parts.join(" ");

        let changed = normalized != self.source_word_normalized
            || joined != self.target_words_joined
            || searchable != self.searchable_text
            || self.has_translations != !self.target_words.is_empty()
            || self.has_examples != !self.examples.is_empty()
            || self.has_cross_references != !self.cross_references.is_empty();

        self.source_word_normalized = normalized;
        self.target_words_joined = joined;
        self.searchable_text = searchable;
        self.has_translations = !self.target_words.is_empty();
        self.has_examples = !self.examples.is_empty();
        self.has_cross_references = !self.cross_references.is_empty();
        changed
    }
}

/// Turns the raw source list into enhanced entries, validating every record.
///
/// # Errors
///
/// Returns an `IndexBuild` error for a missing source word or a duplicate ID.
pub fn enhance_entries(raw_entries: Vec<RawEntry>) -> Result<Vec<EnhancedEntry>> {
    let mut seen_ids = HashSet::with_capacity(raw_entries.len());
    let mut entries = Vec::with_capacity(raw_entries.len());
    for (position, raw) in raw_entries.into_iter().enumerate() {
        let entry = EnhancedEntry::from_raw(raw, position)?;
        if !seen_ids.insert(entry.id.clone()) {
            return Err(DictError::index_build(format!(
                "entry {} reuses id '{}'",
                position, entry.id
            )));
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Checks entries that did not come through [`enhance_entries`] (e.g. from a cache).
///
/// Derived fields are recomputed so they always match the current normalizer.
pub fn revalidate_entries(entries: &mut [EnhancedEntry]) -> Result<()> {
    let mut seen_ids = HashSet::with_capacity(entries.len());
    let mut refreshed = 0usize;
    for (position, entry) in entries.iter_mut().enumerate() {
        if entry.source_word.trim().is_empty() {
            return Err(DictError::index_build(format!(
                "entry {} is missing its source word",
                position
            )));
        }
        if !seen_ids.insert(entry.id.clone()) {
            return Err(DictError::index_build(format!(
                "entry {} reuses id '{}'",
                position, entry.id
            )));
        }
        if entry.refresh_derived() {
            refreshed += 1;
        }
    }
    if refreshed > 0 {
        log::debug!("Recomputed derived fields of {} entries", refreshed);
    }
    Ok(())
}
