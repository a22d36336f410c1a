use crate::{RequestContext, StoreError, Token};

/// The contract implemented by every concrete token store and wrapper.
///
/// Stores compose as a decorator chain: each wrapper holds a delegate
/// satisfying this contract and adds one orthogonal concern (a keyed
/// integrity tag, caveat attenuation, remote introspection). The outermost
/// store's `read` is what the request layer invokes; verification failures
/// anywhere in the chain fold to an absent result rather than an error.
pub trait TokenStore: Send + Sync {
    /// Allocates and persists a new token, returning an opaque identifier.
    ///
    /// Either the token is durably stored and its identifier returned, or
    /// nothing is stored and an error is returned. Adapters that cannot mint
    /// tokens fail with [`StoreError::Unsupported`].
    fn create(&self, ctx: &RequestContext, token: Token) -> Result<String, StoreError>;

    /// Resolves an identifier to a token iff it exists, has not expired, and
    /// passes every wrapper-level verification.
    ///
    /// Malformed identifiers resolve to `Ok(None)`, never to an error, so an
    /// attacker cannot distinguish a parse failure from a miss. Must be
    /// side-effect-free on failure apart from logging.
    fn read(&self, ctx: &RequestContext, token_id: &str) -> Result<Option<Token>, StoreError>;

    /// Invalidates a token so subsequent `read` calls return absent.
    ///
    /// Idempotent: an identifier that does not currently resolve is a silent
    /// no-op, not an error.
    fn revoke(&self, ctx: &RequestContext, token_id: &str) -> Result<(), StoreError>;
}

/// Marker for stores that are tamper-evident: a party without the key cannot
/// forge or modify an identifier that will validate.
pub trait AuthenticatedTokenStore: TokenStore {}

/// Marker for stores whose identifiers reveal nothing about the token's
/// subject or claims to a party without the key.
pub trait ConfidentialTokenStore: TokenStore {}

/// Marker for stores providing both authenticity and confidentiality.
///
/// Blanket-implemented for anything carrying both markers, so the capability
/// a composed chain provides is derived by the compiler from how it was
/// constructed. A caller demanding `S: SecureTokenStore` can never be handed
/// a chain that only authenticates.
pub trait SecureTokenStore: AuthenticatedTokenStore + ConfidentialTokenStore {}

impl<S> SecureTokenStore for S where S: AuthenticatedTokenStore + ConfidentialTokenStore + ?Sized {}

impl<S: TokenStore + ?Sized> TokenStore for &S {
    fn create(&self, ctx: &RequestContext, token: Token) -> Result<String, StoreError> {
        (**self).create(ctx, token)
    }

    fn read(&self, ctx: &RequestContext, token_id: &str) -> Result<Option<Token>, StoreError> {
        (**self).read(ctx, token_id)
    }

    fn revoke(&self, ctx: &RequestContext, token_id: &str) -> Result<(), StoreError> {
        (**self).revoke(ctx, token_id)
    }
}

impl<S: AuthenticatedTokenStore + ?Sized> AuthenticatedTokenStore for &S {}
impl<S: ConfidentialTokenStore + ?Sized> ConfidentialTokenStore for &S {}

impl<S: TokenStore + ?Sized> TokenStore for std::sync::Arc<S> {
    fn create(&self, ctx: &RequestContext, token: Token) -> Result<String, StoreError> {
        (**self).create(ctx, token)
    }

    fn read(&self, ctx: &RequestContext, token_id: &str) -> Result<Option<Token>, StoreError> {
        (**self).read(ctx, token_id)
    }

    fn revoke(&self, ctx: &RequestContext, token_id: &str) -> Result<(), StoreError> {
        (**self).revoke(ctx, token_id)
    }
}

impl<S: AuthenticatedTokenStore + ?Sized> AuthenticatedTokenStore for std::sync::Arc<S> {}
impl<S: ConfidentialTokenStore + ?Sized> ConfidentialTokenStore for std::sync::Arc<S> {}
