use std::collections::HashMap;

use parking_lot::RwLock;
use rand::RngCore;
use tracing::debug;

use strata_token_core::{encoding, RequestContext, StoreError, Token, TokenStore};
use strata_token_core::{AuthenticatedTokenStore, ConfidentialTokenStore};

use crate::backend::TokenRecord;

/// The session-state collaborator the session-bound store delegates to.
///
/// In a deployment this is the transport's session manager: it allocates and
/// invalidates sessions and emits the session cookie. The token layer only
/// ever addresses sessions by the identifier the transport bound to the
/// request context.
pub trait SessionBackend: Send + Sync {
    /// Allocates a fresh session holding `record`, returning its identifier.
    ///
    /// The transport observes the allocation through this collaborator and
    /// emits the new session cookie; the token layer never returns the raw
    /// session identifier to a client.
    fn allocate(&self, record: TokenRecord) -> Result<String, StoreError>;

    /// Invalidates a session. Unknown identifiers are a no-op.
    fn invalidate(&self, session_id: &str) -> Result<(), StoreError>;

    /// Fetches the state of a live session.
    fn get(&self, session_id: &str) -> Result<Option<TokenRecord>, StoreError>;

    /// Sets one session-scoped attribute on a live session. Unknown
    /// identifiers are a no-op.
    fn set_attribute(&self, session_id: &str, key: &str, value: &str)
        -> Result<(), StoreError>;
}

impl<B: SessionBackend + ?Sized> SessionBackend for std::sync::Arc<B> {
    fn allocate(&self, record: TokenRecord) -> Result<String, StoreError> {
        (**self).allocate(record)
    }

    fn invalidate(&self, session_id: &str) -> Result<(), StoreError> {
        (**self).invalidate(session_id)
    }

    fn get(&self, session_id: &str) -> Result<Option<TokenRecord>, StoreError> {
        (**self).get(session_id)
    }

    fn set_attribute(
        &self,
        session_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        (**self).set_attribute(session_id, key, value)
    }
}

/// In-memory reference session backend.
#[derive(Debug, Default)]
pub struct MemorySessionBackend {
    sessions: RwLock<HashMap<String, TokenRecord>>,
    last_allocated: RwLock<Option<String>>,
}

impl MemorySessionBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The identifier of the most recently allocated session.
    ///
    /// This is the hook a cookie-emitting transport uses to learn which
    /// session to bind to the response after a `create`.
    pub fn last_allocated(&self) -> Option<String> {
        self.last_allocated.read().clone()
    }
}

impl SessionBackend for MemorySessionBackend {
    fn allocate(&self, record: TokenRecord) -> Result<String, StoreError> {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        let session_id = encoding::encode(&bytes);

        self.sessions
            .write()
            .insert(session_id.clone(), record);
        *self.last_allocated.write() = Some(session_id.clone());
        Ok(session_id)
    }

    fn invalidate(&self, session_id: &str) -> Result<(), StoreError> {
        self.sessions.write().remove(session_id);
        Ok(())
    }

    fn get(&self, session_id: &str) -> Result<Option<TokenRecord>, StoreError> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    fn set_attribute(
        &self,
        session_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        if let Some(record) = self.sessions.write().get_mut(session_id) {
            record.attributes.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// Session-bound store implementing hash-based double-submit verification.
///
/// `create` binds the token to fresh server-side session state and returns
/// `sha256(session_id)` as the identifier, so the value a client submits is
/// derivable only from the session the server itself allocated. Any
/// pre-existing session named by the request is invalidated first: an
/// attacker who fixed a session identifier before authentication cannot
/// reuse it afterwards.
///
/// `read` and `revoke` recompute the hash from the current session and
/// compare it to the supplied identifier in constant time; a short-circuiting
/// comparison here would be a timing oracle for guessing the double-submit
/// value.
///
/// Identifiers carry no token state and cannot be forged without the
/// server-side session, so this store is asserted secure directly, under the
/// assumption that the session backend itself is trustworthy.
#[derive(Debug)]
pub struct SessionTokenStore<B> {
    backend: B,
}

impl<B: SessionBackend> SessionTokenStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Verifies the supplied double-submit identifier against the session
    /// bound to the request. Returns the session identifier and state on
    /// match, and `None` on any mismatch or undecodable input.
    fn verify_binding(
        &self,
        ctx: &RequestContext,
        token_id: &str,
    ) -> Result<Option<(String, TokenRecord)>, StoreError> {
        let session_id = match ctx.session() {
            Some(session_id) => session_id,
            None => return Ok(None),
        };

        let record = match self.backend.get(session_id)? {
            Some(record) => record,
            None => return Ok(None),
        };

        let provided = match encoding::decode(token_id) {
            Some(provided) => provided,
            None => return Ok(None),
        };

        let computed = encoding::sha256(session_id.as_bytes());
        if !encoding::constant_time_eq(&computed, &provided) {
            debug!("double-submit mismatch");
            return Ok(None);
        }

        Ok(Some((session_id.to_string(), record)))
    }
}

impl<B: SessionBackend> TokenStore for SessionTokenStore<B> {
    fn create(&self, ctx: &RequestContext, token: Token) -> Result<String, StoreError> {
        // Session fixation defense: whatever session the request arrived
        // with must not survive authentication.
        if let Some(existing) = ctx.session() {
            self.backend.invalidate(existing)?;
        }

        let session_id = self.backend.allocate(TokenRecord::from(token))?;
        Ok(encoding::encode(&encoding::sha256(session_id.as_bytes())))
    }

    fn read(&self, ctx: &RequestContext, token_id: &str) -> Result<Option<Token>, StoreError> {
        let record = match self.verify_binding(ctx, token_id)? {
            Some((_, record)) => record,
            None => return Ok(None),
        };

        if record.expiry <= ctx.now() {
            return Ok(None);
        }

        Ok(Some(record.into_token()))
    }

    fn revoke(&self, ctx: &RequestContext, token_id: &str) -> Result<(), StoreError> {
        // The double-submit check applies to logout as well, otherwise an
        // attacker could sign users out cross-site.
        if let Some((session_id, _)) = self.verify_binding(ctx, token_id)? {
            self.backend.invalidate(&session_id)?;
        }
        Ok(())
    }
}

impl<B: SessionBackend> AuthenticatedTokenStore for SessionTokenStore<B> {}
impl<B: SessionBackend> ConfidentialTokenStore for SessionTokenStore<B> {}
