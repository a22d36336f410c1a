use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use strata_token_core::{StoreError, Token};

/// The stored form of a token: the row the persistence collaborator keeps
/// under the generated identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub subject: String,
    pub expiry: DateTime<Utc>,
    pub attributes: BTreeMap<String, String>,
}

impl TokenRecord {
    /// Rebuilds the token value this record was created from.
    pub fn into_token(self) -> Token {
        let mut token = Token::new(self.subject, self.expiry);
        for (key, value) in self.attributes {
            token.set_attribute(key, value);
        }
        token
    }
}

impl From<Token> for TokenRecord {
    fn from(token: Token) -> Self {
        Self {
            subject: token.subject().to_string(),
            expiry: token.expiry(),
            attributes: token.attributes().clone(),
        }
    }
}

/// The keyed-persistence collaborator the persistent store delegates to.
///
/// Implementations must provide atomic point operations; the token layer
/// adds no locking of its own. Any failure is a dependency failure
/// ([`StoreError::Backend`]), never a statement about a token's validity.
pub trait TokenBackend: Send + Sync {
    /// Persists `record` under `token_id`.
    ///
    /// Refuses to overwrite an existing row: identifier uniqueness is the
    /// one hard invariant of the persistent store, and a silent overwrite
    /// would let a colliding `create` clobber a live token.
    fn insert(&self, token_id: &str, record: TokenRecord) -> Result<(), StoreError>;

    /// Point lookup by identifier.
    fn lookup(&self, token_id: &str) -> Result<Option<TokenRecord>, StoreError>;

    /// Point delete by identifier. Deleting a missing row is a no-op.
    fn delete(&self, token_id: &str) -> Result<(), StoreError>;

    /// Bulk maintenance: removes every row whose expiry is at or before
    /// `now`, returning how many were removed.
    fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;
}

impl<B: TokenBackend + ?Sized> TokenBackend for std::sync::Arc<B> {
    fn insert(&self, token_id: &str, record: TokenRecord) -> Result<(), StoreError> {
        (**self).insert(token_id, record)
    }

    fn lookup(&self, token_id: &str) -> Result<Option<TokenRecord>, StoreError> {
        (**self).lookup(token_id)
    }

    fn delete(&self, token_id: &str) -> Result<(), StoreError> {
        (**self).delete(token_id)
    }

    fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        (**self).delete_expired(now)
    }
}

/// In-memory reference backend over a [`HashMap`].
///
/// Suitable for tests and single-process deployments; production deployments
/// substitute a database-backed implementation of [`TokenBackend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    rows: RwLock<HashMap<String, TokenRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenBackend for MemoryBackend {
    fn insert(&self, token_id: &str, record: TokenRecord) -> Result<(), StoreError> {
        let mut rows = self.rows.write();
        if rows.contains_key(token_id) {
            return Err(StoreError::backend(format!(
                "identifier collision on insert: {token_id}"
            )));
        }
        rows.insert(token_id.to_string(), record);
        Ok(())
    }

    fn lookup(&self, token_id: &str) -> Result<Option<TokenRecord>, StoreError> {
        Ok(self.rows.read().get(token_id).cloned())
    }

    fn delete(&self, token_id: &str) -> Result<(), StoreError> {
        self.rows.write().remove(token_id);
        Ok(())
    }

    fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|_, record| record.expiry > now);
        Ok(before - rows.len())
    }
}
