//! # Strata Token Core
//!
//! Core types shared across Strata token store implementations.
//!
//! This crate provides the contract every concrete store and wrapper in the
//! workspace builds on:
//!
//! - The [`Token`] value object (subject, expiry, claim attributes)
//! - The [`TokenStore`] contract and the capability marker traits
//!   ([`AuthenticatedTokenStore`], [`ConfidentialTokenStore`],
//!   [`SecureTokenStore`])
//! - The [`RequestContext`] consumed by every store operation
//! - The [`StoreError`] taxonomy
//! - Symmetric key material ([`MacKey`])
//! - Encoding and constant-time comparison utilities

pub mod encoding;

mod context;
mod error;
mod key;
mod store;
mod token;

pub use context::RequestContext;
pub use error::StoreError;
pub use key::MacKey;
pub use store::{
    AuthenticatedTokenStore, ConfidentialTokenStore, SecureTokenStore, TokenStore,
};
pub use token::Token;
