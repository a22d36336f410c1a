use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use strata_token_core::RequestContext;

/// Lookback window assumed when a request carries no `since` hint.
const DEFAULT_SINCE_LOOKBACK_HOURS: i64 = 24;

const KIND_TIME: &str = "time";
const KIND_METHOD: &str = "method";
const KIND_SINCE: &str = "since";

/// A contextual restriction appended to a macaroon token.
///
/// Caveats are additive-only: a holder can append one without the signing
/// key, but removing or altering one invalidates the chained authentication
/// tag. Satisfying a token requires every caveat present to pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Caveat {
    kind: String,
    value: String,
}

/// The closed set of caveat kinds the verifier understands.
///
/// Dispatch over this enum is exhaustive, so adding a kind forces every
/// verifier call site to be revisited. Kinds outside the set parse as
/// [`CaveatKind::Unknown`] and fail closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaveatKind {
    /// Absolute deadline: satisfied while the request time is before it.
    Time,
    /// Restricts the token to one HTTP method.
    Method,
    /// Minimum freshness bound on the client's `since` window.
    Since,
    /// Any kind this verifier does not recognize.
    Unknown,
}

impl Caveat {
    /// Restricts the token to requests arriving before `deadline`.
    pub fn time(deadline: DateTime<Utc>) -> Self {
        Self {
            kind: KIND_TIME.to_string(),
            value: deadline.timestamp().to_string(),
        }
    }

    /// Restricts the token to requests using `method`.
    pub fn method(method: impl Into<String>) -> Self {
        Self {
            kind: KIND_METHOD.to_string(),
            value: method.into(),
        }
    }

    /// Restricts the token to requests whose `since` window starts after
    /// `minimum`.
    pub fn since(minimum: DateTime<Utc>) -> Self {
        Self {
            kind: KIND_SINCE.to_string(),
            value: minimum.timestamp().to_string(),
        }
    }

    /// Builds a caveat of an arbitrary kind.
    ///
    /// Useful for forward-compatible issuers; this verifier fails closed on
    /// any kind it does not recognize.
    pub fn custom(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// The caveat's kind string as it appears on the wire.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The constraint payload.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Maps the wire kind onto the closed verifier set.
    pub fn kind_tag(&self) -> CaveatKind {
        match self.kind.as_str() {
            KIND_TIME => CaveatKind::Time,
            KIND_METHOD => CaveatKind::Method,
            KIND_SINCE => CaveatKind::Since,
            _ => CaveatKind::Unknown,
        }
    }

    /// Whether the request context satisfies this caveat.
    ///
    /// An unparsable payload or an unrecognized kind is unsatisfied, never
    /// ignored.
    pub(crate) fn is_satisfied(&self, ctx: &RequestContext) -> bool {
        match self.kind_tag() {
            CaveatKind::Time => match self.epoch_value() {
                Some(deadline) => ctx.now() < deadline,
                None => false,
            },
            CaveatKind::Method => self.value == ctx.method(),
            CaveatKind::Since => match self.epoch_value() {
                Some(minimum) => {
                    let default = ctx.now() - Duration::hours(DEFAULT_SINCE_LOOKBACK_HOURS);
                    // Clamp client-supplied hints to the present so a caveat
                    // cannot be satisfied by claiming a future window.
                    let hint = ctx.since().unwrap_or(default).min(ctx.now());
                    hint > minimum
                }
                None => false,
            },
            CaveatKind::Unknown => {
                debug!(kind = %self.kind, "unrecognized caveat kind fails closed");
                false
            }
        }
    }

    fn epoch_value(&self) -> Option<DateTime<Utc>> {
        let seconds = self.value.parse::<i64>().ok()?;
        Utc.timestamp_opt(seconds, 0).single()
    }
}
