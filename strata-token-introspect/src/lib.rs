//! # Strata Token Introspect
//!
//! Remote introspection adapter for the Strata token layer.
//!
//! This store wraps no local state: validation is delegated to a trusted
//! remote authority over an authenticated channel. It is a verifier only;
//! tokens are minted and revoked by the authority itself, so `create` and
//! `revoke` fail loudly with
//! [`StoreError::Unsupported`](strata_token_core::StoreError).
//!
//! A failing or unreachable authority is an availability problem in a
//! trusted dependency, not a statement about the presented token, and is
//! surfaced as a hard error rather than folded into an absent result.

mod adapter;
mod config;

pub use adapter::IntrospectionTokenStore;
pub use config::IntrospectionConfig;
