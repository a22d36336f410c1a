use rand::RngCore;
use tracing::debug;

use strata_token_core::{encoding, RequestContext, StoreError, Token, TokenStore};

use crate::backend::{TokenBackend, TokenRecord};

/// Raw length of generated identifiers in bytes (160 bits of randomness).
const TOKEN_ID_BYTES: usize = 20;

/// Thin pass-through store over a keyed persistence collaborator.
///
/// Generates an unguessable random identifier per token and stores the token
/// under it. This adapter provides no cryptographic protection of its own:
/// identifiers are not tamper-evident and token state lives server-side in
/// the backend, so both authenticity and confidentiality must come from an
/// outer wrapper. It intentionally carries no capability marker.
///
/// # Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use strata_token_core::{RequestContext, Token, TokenStore};
/// use strata_token_store::{MemoryBackend, PersistentTokenStore};
///
/// let store = PersistentTokenStore::new(MemoryBackend::new());
/// let ctx = RequestContext::new("GET", Utc::now());
///
/// let token = Token::new("alice", Utc::now() + Duration::minutes(10));
/// let token_id = store.create(&ctx, token.clone()).unwrap();
/// assert_eq!(store.read(&ctx, &token_id).unwrap(), Some(token));
/// ```
#[derive(Debug)]
pub struct PersistentTokenStore<B> {
    backend: B,
}

impl<B: TokenBackend> PersistentTokenStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Removes every stored token whose expiry has passed.
    ///
    /// Maintenance operation for an external scheduler; never invoked on the
    /// read/write hot path. Returns how many rows were purged.
    pub fn purge_expired(&self, ctx: &RequestContext) -> Result<usize, StoreError> {
        let purged = self.backend.delete_expired(ctx.now())?;
        if purged > 0 {
            debug!(purged, "purged expired tokens");
        }
        Ok(purged)
    }

    fn generate_id() -> String {
        let mut bytes = [0u8; TOKEN_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        encoding::encode(&bytes)
    }
}

impl<B: TokenBackend> TokenStore for PersistentTokenStore<B> {
    fn create(&self, _ctx: &RequestContext, token: Token) -> Result<String, StoreError> {
        let token_id = Self::generate_id();
        // The backend refuses to overwrite, so either the row is stored and
        // the identifier returned, or nothing is stored at all.
        self.backend.insert(&token_id, TokenRecord::from(token))?;
        Ok(token_id)
    }

    fn read(&self, ctx: &RequestContext, token_id: &str) -> Result<Option<Token>, StoreError> {
        let record = match self.backend.lookup(token_id)? {
            Some(record) => record,
            None => return Ok(None),
        };

        if record.expiry <= ctx.now() {
            // Expired rows are left for purge_expired; reads stay
            // side-effect-free.
            debug!("token expired");
            return Ok(None);
        }

        Ok(Some(record.into_token()))
    }

    fn revoke(&self, _ctx: &RequestContext, token_id: &str) -> Result<(), StoreError> {
        self.backend.delete(token_id)
    }
}
