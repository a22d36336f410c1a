use chrono::{DateTime, TimeZone, Utc};

use strata_token_core::StoreError;

use crate::caveat::{Caveat, CaveatKind};
use crate::macaroon::Macaroon;

/// Result of inspecting a serialized macaroon token.
#[derive(Debug, Clone)]
pub struct MacaroonInspection {
    /// The protected base-store identifier.
    pub identifier: String,
    /// The attached caveats, in append order.
    pub caveats: Vec<Caveat>,
    /// The earliest `time` caveat deadline, if any.
    pub deadline: Option<DateTime<Utc>>,
    /// Whether that deadline has already passed.
    pub is_expired: bool,
}

/// Inspects a macaroon token without verifying it.
///
/// No key is required and no validity claim is made: this surfaces what the
/// token says about itself (the protected identifier and the restriction
/// set) for diagnostics and delegation tooling. Only `read` against the
/// issuing store establishes whether the token is genuine.
pub fn inspect_macaroon(token_id: &str) -> Result<MacaroonInspection, StoreError> {
    let macaroon = Macaroon::deserialize(token_id)
        .ok_or_else(|| StoreError::malformed("not a macaroon token"))?;
    let now = Utc::now();

    let deadline = macaroon
        .caveats()
        .iter()
        .filter(|caveat| caveat.kind_tag() == CaveatKind::Time)
        .filter_map(|caveat| {
            let seconds = caveat.value().parse::<i64>().ok()?;
            Utc.timestamp_opt(seconds, 0).single()
        })
        .min();

    Ok(MacaroonInspection {
        identifier: macaroon.identifier().to_string(),
        caveats: macaroon.caveats().to_vec(),
        deadline,
        is_expired: deadline.is_some_and(|deadline| deadline <= now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use strata_token_core::MacKey;

    #[test]
    fn test_inspect_lists_identifier_and_caveats() {
        let key = MacKey::generate();
        let deadline = Utc::now() + Duration::minutes(5);
        let token_id = Macaroon::mint(&key, "base-id".to_string())
            .append_caveat(Caveat::method("GET"))
            .append_caveat(Caveat::time(deadline))
            .serialize();

        let inspection = inspect_macaroon(&token_id).unwrap();
        assert_eq!(inspection.identifier, "base-id");
        assert_eq!(inspection.caveats.len(), 2);
        assert_eq!(inspection.caveats[0].kind(), "method");
        assert_eq!(
            inspection.deadline.unwrap().timestamp(),
            deadline.timestamp()
        );
        assert!(!inspection.is_expired);
    }

    #[test]
    fn test_inspect_reports_earliest_deadline_as_expired() {
        let key = MacKey::generate();
        let token_id = Macaroon::mint(&key, "base-id".to_string())
            .append_caveat(Caveat::time(Utc::now() + Duration::minutes(10)))
            .append_caveat(Caveat::time(Utc::now() - Duration::minutes(1)))
            .serialize();

        let inspection = inspect_macaroon(&token_id).unwrap();
        assert!(inspection.is_expired);
    }

    #[test]
    fn test_inspect_without_time_caveats() {
        let key = MacKey::generate();
        let token_id = Macaroon::mint(&key, "base-id".to_string()).serialize();

        let inspection = inspect_macaroon(&token_id).unwrap();
        assert!(inspection.deadline.is_none());
        assert!(!inspection.is_expired);
        assert!(inspection.caveats.is_empty());
    }

    #[test]
    fn test_inspect_rejects_garbage() {
        let err = inspect_macaroon("???").unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }
}
