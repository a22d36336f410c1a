use strata_token_core::StoreError;

use crate::caveat::Caveat;
use crate::macaroon::Macaroon;

/// Builder for narrowing a serialized macaroon token by appending caveats.
///
/// Attenuation is a holder-side operation: no signing key is involved, and
/// the original token string is left untouched. Each appended caveat extends
/// the chained authentication tag, so the result carries the cumulative
/// restriction set and cannot be widened again.
///
/// # Example
/// ```rust,no_run
/// use chrono::{Duration, Utc};
/// use strata_token_seal::{AttenuationBuilder, Caveat};
///
/// # fn example(token_id: String) -> Result<(), strata_token_core::StoreError> {
/// let narrowed = AttenuationBuilder::from_serialized(&token_id)?
///     .caveat(Caveat::method("GET"))
///     .caveat(Caveat::time(Utc::now() + Duration::seconds(30)))
///     .seal();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AttenuationBuilder {
    macaroon: Macaroon,
}

impl AttenuationBuilder {
    /// Parses a serialized macaroon token for attenuation.
    pub fn from_serialized(token_id: &str) -> Result<Self, StoreError> {
        let macaroon = Macaroon::deserialize(token_id)
            .ok_or_else(|| StoreError::malformed("not a macaroon token"))?;
        Ok(Self { macaroon })
    }

    /// Appends one caveat to the restriction set.
    pub fn caveat(mut self, caveat: Caveat) -> Self {
        self.macaroon = self.macaroon.append_caveat(caveat);
        self
    }

    /// Serializes the narrowed token.
    pub fn seal(self) -> String {
        self.macaroon.serialize()
    }
}
