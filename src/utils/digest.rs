//! Content hashing for cache integrity and version tokens.
//!
//! # Examples
//!
//! ```
//! use ndowe_dict::utils::digest::content_hash;
//!
//! let hash = content_hash(b"[]");
//! assert_eq!(hash.len(), 16);
//! assert_eq!(hash, content_hash(b"[]"));
//! ```

use xxhash_rust::xxh64::Xxh64;

/// Computes the XXH64 digest of `input` and returns it as 16 lowercase hex digits.
///
/// Empty input is allowed and hashes like any other byte string.
pub fn content_hash(input: &[u8]) -> String {
    let mut hasher = Xxh64::new(0);
    hasher.update(input);
    // Big-endian so the hex string reads as the numeric digest.
    hex::encode(hasher.digest().to_be_bytes())
}
