//! Dictionary source abstractions.
//!
//! The search engine never fetches data itself. A [`DictionaryLoader`] supplies
//! the raw entry list together with a version token, and answers the cheaper
//! question "what version would I serve now?" so callers can decide whether
//! their offline cache is stale. Retrying a failed fetch is the loader's (or
//! its caller's) business.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::storage::entry::RawEntry;
use crate::utils::digest::content_hash;
use crate::{DictError, Result};

/// Source of truth for dictionary entries.
///
/// # Examples
///
/// ```
/// use ndowe_dict::builder::{DictionaryLoader, MemoryLoader};
/// use ndowe_dict::storage::RawEntry;
///
/// # fn main() -> ndowe_dict::Result<()> {
/// let mut loader = MemoryLoader::new(vec![RawEntry::new("casa")], "v1");
/// assert_eq!(loader.latest_version()?, "v1");
/// let (entries, version) = loader.fetch_entries()?;
/// assert_eq!(entries.len(), 1);
/// assert_eq!(version, "v1");
/// # Ok(())
/// # }
/// ```
pub trait DictionaryLoader {
    /// Returns the version token of the data a fetch would return now.
    ///
    /// # Errors
    ///
    /// Returns a `Load` error if the source is unreachable.
    fn latest_version(&mut self) -> Result<String>;

    /// Fetches the full raw entry list and its version token.
    ///
    /// # Errors
    ///
    /// Returns a `Load` error if the source is unreachable or malformed.
    fn fetch_entries(&mut self) -> Result<(Vec<RawEntry>, String)>;
}

/// Accepted layouts of the dictionary JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum DictionaryDocument {
    Versioned {
        #[serde(default)]
        version: Option<String>,
        entries: Vec<RawEntry>,
    },
    Bare(Vec<RawEntry>),
}

/// Loads the dictionary from a JSON file.
///
/// The file holds either a bare array of entries or an object
/// `{ "version": "...", "entries": [...] }`. Without an explicit version the
/// token is the content hash of the file, so any edit counts as a new version.
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<(Vec<RawEntry>, String)> {
        let bytes = fs::read(&self.path).map_err(|e| {
            DictError::load(format!("Failed to read dictionary file {}: {}", self.path.display(), e))
        })?;
        let document: DictionaryDocument = serde_json::from_slice(&bytes).map_err(|e| {
            DictError::load(format!("Failed to parse dictionary file {}: {}", self.path.display(), e))
        })?;
        let (entries, version) = match document {
            DictionaryDocument::Versioned { version: Some(version), entries } => (entries, version),
            DictionaryDocument::Versioned { version: None, entries } | DictionaryDocument::Bare(entries) => {
                (entries, content_hash(&bytes))
            }
        };
        debug!("Read {} entries (version {}) from {}", entries.len(), version, self.path.display());
        Ok((entries, version))
    }
}

impl DictionaryLoader for JsonFileLoader {
    fn latest_version(&mut self) -> Result<String> {
        self.read().map(|(_, version)| version)
    }

    fn fetch_entries(&mut self) -> Result<(Vec<RawEntry>, String)> {
        self.read()
    }
}

/// Serves a fixed in-memory entry list.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    entries: Vec<RawEntry>,
    version: String,
}

impl MemoryLoader {
    pub fn new<S: Into<String>>(entries: Vec<RawEntry>, version: S) -> Self {
        Self { entries, version: version.into() }
    }

    /// Replaces the served data, as a source-side update would.
    pub fn replace<S: Into<String>>(&mut self, entries: Vec<RawEntry>, version: S) {
        self.entries = entries;
        self.version = version.into();
    }
}

impl DictionaryLoader for MemoryLoader {
    fn latest_version(&mut self) -> Result<String> {
        Ok(self.version.clone())
    }

    fn fetch_entries(&mut self) -> Result<(Vec<RawEntry>, String)> {
        Ok((self.entries.clone(), self.version.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_versioned_document() {
        let file = write_json(r#"{"version":"2024-05","entries":[{"sourceWord":"casa","targetWords":["nanga"]}]}"#);
        let mut loader = JsonFileLoader::new(file.path());
        let (entries, version) = loader.fetch_entries().unwrap();
        assert_eq!(version, "2024-05");
        assert_eq!(entries[0].target_words, vec!["nanga"]);
        assert_eq!(loader.latest_version().unwrap(), "2024-05");
    }

    #[test]
    fn test_bare_array_is_versioned_by_content() {
        let json = r#"[{"sourceWord":"casa"},{"sourceWord":"caza"}]"#;
        let file = write_json(json);
        let mut loader = JsonFileLoader::new(file.path());
        let (entries, version) = loader.fetch_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(version, content_hash(json.as_bytes()));
    }

    #[test]
    fn test_missing_and_malformed_files_are_load_errors() {
        let mut missing = JsonFileLoader::new("/nonexistent/dictionary.json");
        assert!(missing.fetch_entries().unwrap_err().is_load());

        let file = write_json("{ broken");
        let mut broken = JsonFileLoader::new(file.path());
        assert!(broken.latest_version().unwrap_err().is_load());
    }

    #[test]
    fn test_memory_loader_replace() {
        let mut loader = MemoryLoader::new(Vec::new(), "v1");
        loader.replace(vec![RawEntry::new("sol")], "v2");
        assert_eq!(loader.latest_version().unwrap(), "v2");
        assert_eq!(loader.fetch_entries().unwrap().0.len(), 1);
    }
}
