use std::time::Duration;

use serde::Deserialize;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Configuration for the introspection adapter, loaded once at startup from
/// the deployment's configuration source.
///
/// The client credentials authenticate this service to the introspection
/// authority; transport trust (TLS roots, pinning) is configured outside
/// this layer.
#[derive(Clone, Deserialize)]
pub struct IntrospectionConfig {
    /// The authority's introspection endpoint.
    pub endpoint: Url,
    /// Client identifier presented to the authority.
    pub client_id: String,
    /// Client secret presented to the authority.
    pub client_secret: String,
    /// Upper bound on each introspection call, in seconds. A call exceeding
    /// it is a hard dependency failure, never an absent token.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl IntrospectionConfig {
    /// Creates a config with the default call timeout.
    pub fn new(endpoint: Url, client_id: String, client_secret: String) -> Self {
        Self {
            endpoint,
            client_id,
            client_secret,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Overrides the call timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for IntrospectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the client secret.
        f.debug_struct("IntrospectionConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_default_timeout() {
        let config: IntrospectionConfig = serde_json::from_str(
            r#"{
                "endpoint": "https://as.example.com/introspect",
                "client_id": "api-gateway",
                "client_secret": "changeit"
            }"#,
        )
        .unwrap();

        assert_eq!(config.endpoint.as_str(), "https://as.example.com/introspect");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_debug_redacts_the_client_secret() {
        let config = IntrospectionConfig::new(
            Url::parse("https://as.example.com/introspect").unwrap(),
            "api-gateway".to_string(),
            "super-secret".to_string(),
        );
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_deserialize_rejects_bad_endpoint() {
        let result = serde_json::from_str::<IntrospectionConfig>(
            r#"{
                "endpoint": "not a url",
                "client_id": "api-gateway",
                "client_secret": "changeit"
            }"#,
        );
        assert!(result.is_err());
    }
}
