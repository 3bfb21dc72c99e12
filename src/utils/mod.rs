// Utility functions and helpers
//
// This module provides text normalization, content hashing and build
// progress reporting shared by the index, cache and engine modules.

pub mod normalize;
pub mod digest;
pub mod progress_report;

pub use normalize::{normalize, tokens, phrase};
pub use digest::content_hash;
pub use progress_report::{ProgressState, ProgressReportFn};
