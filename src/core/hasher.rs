//! Content digests for uploads.
//!
//! VirusTotal identifies file objects by SHA-256, so hashing the content
//! locally before submission lets a caller fetch the report of what it
//! uploaded once the analysis is done.

use sha2::{Digest, Sha256};

/// Returns the lowercase hex SHA-256 of `data`.
///
/// ```rust
/// use vtbridge::core::hasher::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
