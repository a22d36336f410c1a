use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// An authenticated-session or delegation record.
///
/// A token binds a subject identity to an absolute expiry plus an extensible
/// set of string claim attributes. Subject and expiry are fixed at
/// construction; attributes may be enriched while a store is still validating
/// the token (e.g. an introspection response adding `scope`), after which the
/// token is published to request-scoped context and read concurrently.
/// Sharing a published token as `&Token` or `Arc<Token>` keeps those reads
/// safe without interior locking.
///
/// # Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use strata_token_core::Token;
///
/// let token = Token::new("alice", Utc::now() + Duration::minutes(10))
///     .with_attribute("scope", "read write");
///
/// assert_eq!(token.subject(), "alice");
/// assert_eq!(token.attribute("scope"), Some("read write"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    subject: String,
    expiry: DateTime<Utc>,
    attributes: BTreeMap<String, String>,
}

impl Token {
    /// Creates a token vouching for `subject` until `expiry`.
    pub fn new(subject: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            subject: subject.into(),
            expiry,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds a claim attribute, consuming and returning the token.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Adds a claim attribute in place.
    ///
    /// Only the validation path may call this; once a store has published the
    /// token the attribute map is treated as immutable.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// The identity this token vouches for.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The absolute timestamp after which the token must be treated as invalid.
    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// Looks up a single claim attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// All claim attributes, ordered by key.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Whether the token's validity window has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }
}
