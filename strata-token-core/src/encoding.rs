//! Encoding and comparison utilities shared by the store implementations.
//!
//! Token identifiers, tags, and double-submit hashes all travel as
//! URL-safe base64 without padding. Decoding is total: malformed input
//! yields `None` and the caller folds it into an absent token, so parse
//! failures are indistinguishable from misses at the public boundary.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Encodes bytes as URL-safe base64 without padding.
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes URL-safe unpadded base64. Malformed input yields `None`.
pub fn decode(encoded: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(encoded).ok()
}

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compares two byte strings in constant time.
///
/// Used wherever a caller-supplied value is checked against a secret-derived
/// one (HMAC tags, double-submit hashes). A short-circuiting comparison here
/// is a timing oracle, not just a performance concern. Length is not secret.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
