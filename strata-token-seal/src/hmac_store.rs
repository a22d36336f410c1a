use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use strata_token_core::{
    encoding, AuthenticatedTokenStore, ConfidentialTokenStore, MacKey, RequestContext,
    StoreError, Token, TokenStore,
};

type HmacSha256 = Hmac<Sha256>;

/// Separator between the delegate identifier and its tag.
const TAG_SEPARATOR: char = '.';

/// Wrapper store that appends a keyed integrity tag to the delegate's
/// identifier.
///
/// The combined form is `identifier.tag` with the tag base64url-encoded.
/// `read` and `revoke` recompute the tag and compare it in constant time
/// before the delegate is consulted at all: an invalid tag never reaches the
/// wrapped store, so nothing about the delegate's contents leaks through
/// timing or behavior on forged input.
///
/// Capability composition is carried by the type: the wrapper authenticates
/// unconditionally, and is confidential exactly when its delegate is, so
/// `HmacTokenStore` over a confidential delegate satisfies
/// [`SecureTokenStore`](strata_token_core::SecureTokenStore), while over a
/// plain store it only authenticates. Claiming confidentiality that was
/// never provided is not representable.
///
/// # Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use strata_token_core::{MacKey, RequestContext, Token, TokenStore};
/// use strata_token_seal::HmacTokenStore;
/// use strata_token_store::{MemoryBackend, PersistentTokenStore};
///
/// let store = HmacTokenStore::new(
///     PersistentTokenStore::new(MemoryBackend::new()),
///     MacKey::generate(),
/// );
///
/// let ctx = RequestContext::new("GET", Utc::now());
/// let token_id = store
///     .create(&ctx, Token::new("alice", Utc::now() + Duration::minutes(10)))
///     .unwrap();
/// assert!(store.read(&ctx, &token_id).unwrap().is_some());
/// ```
#[derive(Debug)]
pub struct HmacTokenStore<S> {
    delegate: S,
    key: MacKey,
}

impl<S: TokenStore> HmacTokenStore<S> {
    pub fn new(delegate: S, key: MacKey) -> Self {
        Self { delegate, key }
    }

    fn compute_tag(&self, identifier: &str) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(self.key.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(identifier.as_bytes());
        mac.finalize().into_bytes().into()
    }

    /// Splits and verifies a combined `identifier.tag` string, returning the
    /// bare delegate identifier on success.
    fn verify_tag<'a>(&self, token_id: &'a str) -> Option<&'a str> {
        let (identifier, tag) = token_id.rsplit_once(TAG_SEPARATOR)?;
        let provided = encoding::decode(tag)?;
        let computed = self.compute_tag(identifier);
        if !encoding::constant_time_eq(&computed, &provided) {
            debug!("token tag mismatch");
            return None;
        }
        Some(identifier)
    }
}

impl<S: TokenStore> TokenStore for HmacTokenStore<S> {
    fn create(&self, ctx: &RequestContext, token: Token) -> Result<String, StoreError> {
        let identifier = self.delegate.create(ctx, token)?;
        let tag = self.compute_tag(&identifier);
        Ok(format!(
            "{identifier}{TAG_SEPARATOR}{}",
            encoding::encode(&tag)
        ))
    }

    fn read(&self, ctx: &RequestContext, token_id: &str) -> Result<Option<Token>, StoreError> {
        match self.verify_tag(token_id) {
            Some(identifier) => self.delegate.read(ctx, identifier),
            None => Ok(None),
        }
    }

    fn revoke(&self, ctx: &RequestContext, token_id: &str) -> Result<(), StoreError> {
        match self.verify_tag(token_id) {
            Some(identifier) => self.delegate.revoke(ctx, identifier),
            None => Ok(()),
        }
    }
}

impl<S: TokenStore> AuthenticatedTokenStore for HmacTokenStore<S> {}
impl<S: ConfidentialTokenStore> ConfidentialTokenStore for HmacTokenStore<S> {}
