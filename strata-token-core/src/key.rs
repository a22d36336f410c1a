use std::fmt;

use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::StoreError;

/// Minimum accepted key length in bytes. HMAC-SHA256 keys shorter than the
/// hash's security level invite brute force of the tag.
const MIN_KEY_LEN: usize = 16;

/// Length of generated keys in bytes.
const GENERATED_KEY_LEN: usize = 32;

/// A process-wide symmetric key for tag computation.
///
/// Key material is loaded once at startup from the deployment's key store
/// and passed explicitly into each wrapper at construction; nothing mutates
/// a key after load. The bytes are wiped when the key is dropped.
///
/// # Example
/// ```rust
/// use strata_token_core::MacKey;
///
/// let key = MacKey::generate();
/// let same = MacKey::from_hex(&key.to_hex()).unwrap();
/// assert_eq!(key.as_bytes(), same.as_bytes());
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MacKey(Vec<u8>);

impl MacKey {
    /// Wraps raw key bytes. Rejects keys shorter than 16 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() < MIN_KEY_LEN {
            return Err(StoreError::invalid_key(format!(
                "key must be at least {MIN_KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes.to_vec()))
    }

    /// Parses a hex-encoded key string.
    pub fn from_hex(hex_str: &str) -> Result<Self, StoreError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| StoreError::invalid_key(format!("not valid hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Generates a fresh 256-bit key from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; GENERATED_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hex-encodes the key for storage in the deployment's key store.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for MacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key bytes.
        write!(f, "MacKey({} bytes)", self.0.len())
    }
}
