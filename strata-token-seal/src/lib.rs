//! # Strata Token Seal
//!
//! Cryptographic wrappers for the Strata token layer. Each wrapper holds a
//! delegate satisfying the base [`TokenStore`](strata_token_core::TokenStore)
//! contract and adds one orthogonal concern:
//!
//! - [`HmacTokenStore`] appends a keyed integrity tag to the delegate's
//!   identifier, upgrading any store to at least authenticated.
//! - [`MacaroonTokenStore`] embeds the delegate's identifier inside a
//!   delegable, attenuable token with appended caveats, verified without
//!   contacting the store for denial decisions.
//!
//! ## Key Properties
//!
//! - **Append-only attenuation**: a holder can narrow a macaroon token
//!   (tighter deadline, single HTTP method, freshness window) without the
//!   signing key; removing a caveat invalidates the chained tag.
//! - **Server-side assurance**: verifying the cumulative restriction set
//!   always requires the signing key, so delegation never weakens what the
//!   server checks.
//! - **Capability composition**: wrappers re-assert authenticity and inherit
//!   their delegate's confidentiality, expressed as conditional trait impls
//!   so a composed chain's capability is derived at compile time.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use strata_token_core::{MacKey, RequestContext, Token, TokenStore};
//! use strata_token_seal::{AttenuationBuilder, Caveat, MacaroonTokenStore};
//! use strata_token_store::{MemoryBackend, PersistentTokenStore};
//!
//! let store = MacaroonTokenStore::new(
//!     PersistentTokenStore::new(MemoryBackend::new()),
//!     MacKey::generate(),
//! );
//!
//! let now = Utc::now();
//! let ctx = RequestContext::new("GET", now);
//! let token_id = store
//!     .create(&ctx, Token::new("alice", now + Duration::minutes(10)))
//!     .unwrap();
//!
//! // The holder narrows the token to GET requests, without any key.
//! let narrowed = AttenuationBuilder::from_serialized(&token_id)
//!     .unwrap()
//!     .caveat(Caveat::method("GET"))
//!     .seal();
//!
//! assert!(store.read(&ctx, &narrowed).unwrap().is_some());
//! let post_ctx = RequestContext::new("POST", now);
//! assert!(store.read(&post_ctx, &narrowed).unwrap().is_none());
//! ```

mod attenuate;
mod caveat;
mod hmac_store;
mod inspect;
mod macaroon;

pub use attenuate::AttenuationBuilder;
pub use caveat::{Caveat, CaveatKind};
pub use hmac_store::HmacTokenStore;
pub use inspect::{inspect_macaroon, MacaroonInspection};
pub use macaroon::{Macaroon, MacaroonTokenStore};
