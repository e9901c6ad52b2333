//! Hashing for cache keys and build identity.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hex digest of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA-256 hex digest of a string.
pub fn sha256_str(data: &str) -> String {
    sha256_bytes(data.as_bytes())
}
