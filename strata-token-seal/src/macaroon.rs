use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use strata_token_core::{
    encoding, AuthenticatedTokenStore, ConfidentialTokenStore, MacKey, RequestContext,
    StoreError, Token, TokenStore,
};

use crate::caveat::Caveat;

type HmacSha256 = Hmac<Sha256>;

/// Wire format version; bumping it invalidates all outstanding tokens.
const WIRE_VERSION: u8 = 1;

/// Length of the chained authentication tag in bytes.
const TAG_LEN: usize = 32;

/// A delegable, attenuable token protecting an opaque store identifier.
///
/// The authentication tag is chained in the macaroon fashion: the root tag
/// authenticates the protected identifier under the signing key, and each
/// appended caveat derives the next tag from the previous one. Appending a
/// caveat therefore never requires the signing key, while verifying the
/// cumulative restriction set always does. That asymmetry is what makes
/// holder-side delegation safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macaroon {
    identifier: String,
    caveats: Vec<Caveat>,
    tag: [u8; TAG_LEN],
}

/// Serialized form: a versioned JSON record, base64url-encoded.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Wire {
    v: u8,
    id: String,
    caveats: Vec<Caveat>,
    tag: String,
}

fn mac(key: &[u8], update: impl FnOnce(&mut HmacSha256)) -> [u8; TAG_LEN] {
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    update(&mut mac);
    mac.finalize().into_bytes().into()
}

/// Feeds a caveat into the chain with length-prefixed fields, so no pair of
/// distinct caveats can produce the same chain input.
fn chain_input(mac: &mut HmacSha256, caveat: &Caveat) {
    let kind = caveat.kind().as_bytes();
    let value = caveat.value().as_bytes();
    mac.update(&(kind.len() as u32).to_be_bytes());
    mac.update(kind);
    mac.update(&(value.len() as u32).to_be_bytes());
    mac.update(value);
}

impl Macaroon {
    /// Mints a macaroon protecting `identifier`, with zero caveats.
    pub(crate) fn mint(key: &MacKey, identifier: String) -> Self {
        let tag = mac(key.as_bytes(), |m| m.update(identifier.as_bytes()));
        Self {
            identifier,
            caveats: Vec::new(),
            tag,
        }
    }

    /// The protected base-store identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The attached caveats, in append order.
    pub fn caveats(&self) -> &[Caveat] {
        &self.caveats
    }

    /// Appends a caveat, deriving the next chained tag from the current one.
    ///
    /// No key is required: attenuation is a holder-side operation.
    pub fn append_caveat(mut self, caveat: Caveat) -> Self {
        self.tag = mac(&self.tag, |m| chain_input(m, &caveat));
        self.caveats.push(caveat);
        self
    }

    /// Recomputes the chain from the signing key and compares it to the
    /// stored tag in constant time.
    pub(crate) fn verify_tag(&self, key: &MacKey) -> bool {
        let mut expected = mac(key.as_bytes(), |m| m.update(self.identifier.as_bytes()));
        for caveat in &self.caveats {
            expected = mac(&expected, |m| chain_input(m, caveat));
        }
        encoding::constant_time_eq(&expected, &self.tag)
    }

    /// Serializes to the transportable token string.
    pub fn serialize(&self) -> String {
        let wire = Wire {
            v: WIRE_VERSION,
            id: self.identifier.clone(),
            caveats: self.caveats.clone(),
            tag: hex::encode(self.tag),
        };
        let json = serde_json::to_vec(&wire)
            .expect("macaroon wire record always serializes");
        encoding::encode(&json)
    }

    /// Parses a token string. Malformed input (bad base64, bad JSON, an
    /// unknown version, a tag of the wrong length) yields `None`; there are
    /// no partial parses.
    pub fn deserialize(token: &str) -> Option<Self> {
        let json = encoding::decode(token)?;
        let wire: Wire = serde_json::from_slice(&json).ok()?;
        if wire.v != WIRE_VERSION {
            return None;
        }
        let tag_bytes = hex::decode(&wire.tag).ok()?;
        let tag: [u8; TAG_LEN] = tag_bytes.try_into().ok()?;
        Some(Self {
            identifier: wire.id,
            caveats: wire.caveats,
            tag,
        })
    }
}

/// Wrapper store that issues macaroon tokens over any delegate.
///
/// `create` seals the delegate's identifier inside a zero-caveat macaroon.
/// `read` checks every attached caveat against the request context and then
/// verifies the chained tag; only when both stages pass is the delegate
/// consulted with the protected identifier, so denial decisions never touch
/// the store. `revoke` skips caveat checks: the issuer revoking a token does
/// not need to satisfy restrictions meant for a delegate's use.
#[derive(Debug)]
pub struct MacaroonTokenStore<S> {
    delegate: S,
    key: MacKey,
}

impl<S: TokenStore> MacaroonTokenStore<S> {
    pub fn new(delegate: S, key: MacKey) -> Self {
        Self { delegate, key }
    }
}

impl<S: TokenStore> TokenStore for MacaroonTokenStore<S> {
    fn create(&self, ctx: &RequestContext, token: Token) -> Result<String, StoreError> {
        let identifier = self.delegate.create(ctx, token)?;
        Ok(Macaroon::mint(&self.key, identifier).serialize())
    }

    fn read(&self, ctx: &RequestContext, token_id: &str) -> Result<Option<Token>, StoreError> {
        let macaroon = match Macaroon::deserialize(token_id) {
            Some(macaroon) => macaroon,
            None => return Ok(None),
        };

        if !macaroon.caveats().iter().all(|c| c.is_satisfied(ctx)) {
            debug!("macaroon caveat unsatisfied");
            return Ok(None);
        }

        if !macaroon.verify_tag(&self.key) {
            debug!("macaroon tag mismatch");
            return Ok(None);
        }

        self.delegate.read(ctx, macaroon.identifier())
    }

    fn revoke(&self, ctx: &RequestContext, token_id: &str) -> Result<(), StoreError> {
        let macaroon = match Macaroon::deserialize(token_id) {
            Some(macaroon) => macaroon,
            None => return Ok(()),
        };
        self.delegate.revoke(ctx, macaroon.identifier())
    }
}

impl<S: TokenStore> AuthenticatedTokenStore for MacaroonTokenStore<S> {}
impl<S: ConfidentialTokenStore> ConfidentialTokenStore for MacaroonTokenStore<S> {}
