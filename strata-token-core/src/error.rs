use thiserror::Error;

/// Failure modes a store operation can surface to its caller.
///
/// Invalid, expired, or tampered tokens are deliberately *not* represented
/// here: they collapse to an absent result (`Ok(None)` from `read`, a no-op
/// from `revoke`) so the caller cannot distinguish "wrong signature" from
/// "expired" from "never existed". An error value always means either a
/// programming-contract violation or a failing trusted dependency.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The operation is not available on this adapter (e.g. `create` on the
    /// introspection adapter, which is a verifier and never an issuer).
    #[error("operation '{operation}' is not supported by {store}")]
    Unsupported {
        /// The store the operation was invoked on
        store: &'static str,
        /// The operation that is unavailable
        operation: &'static str,
    },

    /// The persistence or session collaborator failed. Not a statement about
    /// the token's validity.
    #[error("backend failure: {reason}")]
    Backend { reason: String },

    /// The introspection authority could not be consulted (network failure,
    /// timeout, or an undecodable response from a trusted dependency).
    #[error("introspection failure: {reason}")]
    Introspection { reason: String },

    /// Key material supplied at construction time was malformed or too weak.
    #[error("invalid key material: {reason}")]
    InvalidKey { reason: String },

    /// A token string could not be parsed.
    ///
    /// Only holder-side APIs (attenuation, inspection) surface this; at the
    /// `read`/`revoke` boundary a malformed identifier collapses into an
    /// absent result instead.
    #[error("malformed token: {reason}")]
    Malformed { reason: String },
}

impl StoreError {
    /// Creates an `Unsupported` error for `operation` on `store`.
    pub fn unsupported(store: &'static str, operation: &'static str) -> Self {
        StoreError::Unsupported { store, operation }
    }

    /// Creates a `Backend` dependency failure.
    pub fn backend<S: Into<String>>(reason: S) -> Self {
        StoreError::Backend {
            reason: reason.into(),
        }
    }

    /// Creates an `Introspection` dependency failure.
    pub fn introspection<S: Into<String>>(reason: S) -> Self {
        StoreError::Introspection {
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidKey` error.
    pub fn invalid_key<S: Into<String>>(reason: S) -> Self {
        StoreError::InvalidKey {
            reason: reason.into(),
        }
    }

    /// Creates a `Malformed` error.
    pub fn malformed<S: Into<String>>(reason: S) -> Self {
        StoreError::Malformed {
            reason: reason.into(),
        }
    }

    /// Check if this error is an unsupported-operation contract violation.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, StoreError::Unsupported { .. })
    }

    /// Check if this error reports a failing collaborator rather than a
    /// contract violation.
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            StoreError::Backend { .. } | StoreError::Introspection { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::unsupported("IntrospectionTokenStore", "create");
        assert_eq!(
            err.to_string(),
            "operation 'create' is not supported by IntrospectionTokenStore"
        );

        let err = StoreError::backend("connection refused");
        assert_eq!(err.to_string(), "backend failure: connection refused");
    }

    #[test]
    fn test_error_predicates() {
        assert!(StoreError::unsupported("s", "create").is_unsupported());
        assert!(!StoreError::unsupported("s", "create").is_dependency_failure());
        assert!(StoreError::backend("x").is_dependency_failure());
        assert!(StoreError::introspection("timed out").is_dependency_failure());
        assert!(!StoreError::invalid_key("short").is_dependency_failure());
    }
}
