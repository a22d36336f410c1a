use chrono::{TimeZone, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use strata_token_core::{
    AuthenticatedTokenStore, ConfidentialTokenStore, RequestContext, StoreError, Token,
    TokenStore,
};

use crate::config::IntrospectionConfig;

const STORE_NAME: &str = "IntrospectionTokenStore";

/// Longest identifier forwarded to the authority.
const MAX_TOKEN_ID_LEN: usize = 1024;

/// The authority's introspection response record.
#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    active: bool,
    exp: Option<i64>,
    sub: Option<String>,
    scope: Option<String>,
    client_id: Option<String>,
}

/// Read-only store that validates identifiers against a remote authority.
///
/// `read` posts the identifier to the configured introspection endpoint with
/// the adapter's client credentials and maps the response: an active record
/// becomes a [`Token`] carrying the authority's `sub` and `exp` plus `scope`
/// and `client_id` claim attributes; an inactive record or a non-success
/// status is an absent token. Identifiers are matched against a strict
/// printable-character-and-length pattern before any network call.
///
/// `create` and `revoke` always fail with [`StoreError::Unsupported`]: this
/// adapter never mints or invalidates tokens locally.
#[derive(Debug)]
pub struct IntrospectionTokenStore {
    config: IntrospectionConfig,
    client: Client,
}

impl IntrospectionTokenStore {
    /// Builds the adapter, including its bounded-timeout HTTP client.
    pub fn new(config: IntrospectionConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::introspection(format!("building client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Accepts only identifiers the authority could plausibly have issued:
    /// printable ASCII, bounded length. Everything else is rejected before
    /// it reaches the network.
    fn is_plausible_identifier(token_id: &str) -> bool {
        !token_id.is_empty()
            && token_id.len() <= MAX_TOKEN_ID_LEN
            && token_id.bytes().all(|b| (0x20..=0x7e).contains(&b))
    }

    fn introspect(&self, token_id: &str) -> Result<Option<IntrospectionResponse>, StoreError> {
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("token", token_id), ("token_type_hint", "access_token")])
            .send()
            .map_err(|e| StoreError::introspection(format!("introspection call: {e}")))?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "introspection endpoint denied the request");
            return Ok(None);
        }

        // A success status with an undecodable body is a protocol failure in
        // a trusted dependency, not an invalid token.
        let record = response
            .json::<IntrospectionResponse>()
            .map_err(|e| StoreError::introspection(format!("introspection response: {e}")))?;
        Ok(Some(record))
    }
}

impl TokenStore for IntrospectionTokenStore {
    fn create(&self, _ctx: &RequestContext, _token: Token) -> Result<String, StoreError> {
        Err(StoreError::unsupported(STORE_NAME, "create"))
    }

    fn read(&self, ctx: &RequestContext, token_id: &str) -> Result<Option<Token>, StoreError> {
        if !Self::is_plausible_identifier(token_id) {
            return Ok(None);
        }

        let record = match self.introspect(token_id)? {
            Some(record) => record,
            None => return Ok(None),
        };

        if !record.active {
            return Ok(None);
        }

        // An active record without the fields needed to establish an
        // identity is a protocol failure.
        let subject = record
            .sub
            .ok_or_else(|| StoreError::introspection("active response missing 'sub'"))?;
        let exp = record
            .exp
            .ok_or_else(|| StoreError::introspection("active response missing 'exp'"))?;
        let expiry = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| StoreError::introspection("active response 'exp' out of range"))?;

        let mut token = Token::new(subject, expiry);
        if let Some(scope) = record.scope {
            token.set_attribute("scope", scope);
        }
        if let Some(client_id) = record.client_id {
            token.set_attribute("client_id", client_id);
        }

        if token.is_expired(ctx.now()) {
            return Ok(None);
        }

        Ok(Some(token))
    }

    fn revoke(&self, _ctx: &RequestContext, _token_id: &str) -> Result<(), StoreError> {
        Err(StoreError::unsupported(STORE_NAME, "revoke"))
    }
}

// Validation is delegated wholesale to the trusted authority over an
// authenticated channel; the adapter holds no local token state at all.
impl AuthenticatedTokenStore for IntrospectionTokenStore {}
impl ConfidentialTokenStore for IntrospectionTokenStore {}
