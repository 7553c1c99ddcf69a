//! Well-known authority hosts and bundled instance metadata
//!
//! The registry is the static half of instance discovery: hosts listed here are
//! trusted without a network round trip. It also carries the fallback metadata
//! document that describes the endpoint templates of the world-wide instance.
//!
//! The process-wide registry is built on first use and never mutated. Custom
//! registries (private clouds, tests) are equally immutable once constructed.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Hosts trusted without dynamic discovery
pub const WELL_KNOWN_AUTHORITY_HOSTS: &[&str] = &[
    "login.windows.net",
    "login.microsoftonline.com",
    "login.chinacloudapi.cn",
    "login.cloudgovapi.us",
];

/// Fallback metadata in case the discovery endpoint is not available
pub const FALLBACK_METADATA: &str = r#"{"version":"1","instances":[{"id":"https://login.windows.net","endpoints":[{"location":"https://login.windows.net/{tenant}/oauth2/authorize","usage":"Auth20Authorize"},{"location":"https://login.windows.net/{tenant}/oauth2/token","usage":"Auth20Token"}]}]}"#;

// Checked by `test_bundled_metadata_parses`
static BUNDLED_METADATA: Lazy<InstanceMetadataDocument> = Lazy::new(|| {
    serde_json::from_str(FALLBACK_METADATA).expect("bundled instance metadata is valid")
});

static GLOBAL_REGISTRY: Lazy<Arc<WellKnownHostRegistry>> =
    Lazy::new(|| Arc::new(WellKnownHostRegistry::bundled()));

/// Instance metadata document
///
/// ```json
/// {
///   "version": "1",
///   "instances": [{
///     "id": "https://login.windows.net",
///     "endpoints": [
///       {"location": "https://login.windows.net/{tenant}/oauth2/token", "usage": "Auth20Token"}
///     ]
///   }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceMetadataDocument {
    /// Document format version
    pub version: String,
    /// Known instances of the identity-provider network
    pub instances: Vec<InstanceMetadata>,
}

/// A single identity-provider instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceMetadata {
    /// Instance base URL
    pub id: String,
    /// Endpoint templates, `{tenant}` is substituted at use
    pub endpoints: Vec<EndpointMetadata>,
}

/// Endpoint template entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointMetadata {
    /// URL template containing a `{tenant}` placeholder
    pub location: String,
    /// What the endpoint is used for
    pub usage: EndpointUsage,
}

/// Endpoint usage tags found in instance metadata
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EndpointUsage {
    /// OAuth 2.0 authorization endpoint
    Auth20Authorize,
    /// OAuth 2.0 token endpoint
    Auth20Token,
    /// Any usage this crate does not interpret
    #[serde(other)]
    Other,
}

/// Registry of well-known authority hosts
#[derive(Debug, Clone)]
pub struct WellKnownHostRegistry {
    hosts: HashSet<String>,
    fallback_metadata: InstanceMetadataDocument,
}

impl WellKnownHostRegistry {
    /// The process-wide registry built from the bundled constants
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Registry with the given hosts and the bundled fallback metadata
    pub fn with_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(hosts, BUNDLED_METADATA.clone())
    }

    /// Registry with explicit hosts and metadata
    pub fn new<I, S>(hosts: I, fallback_metadata: InstanceMetadataDocument) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            fallback_metadata,
        }
    }

    fn bundled() -> Self {
        Self::with_hosts(WELL_KNOWN_AUTHORITY_HOSTS.iter().copied())
    }

    /// Exact, case-sensitive host lookup
    pub fn contains(&self, hostname: &str) -> bool {
        self.hosts.contains(hostname)
    }

    /// Iterate over the registered hosts (unordered)
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    /// The fallback metadata document
    pub fn fallback_metadata(&self) -> &InstanceMetadataDocument {
        &self.fallback_metadata
    }

    /// Endpoint for `usage` from the fallback metadata with `{tenant}` substituted.
    ///
    /// Instances are searched in document order; the first matching endpoint wins.
    pub fn fallback_endpoint(&self, usage: EndpointUsage, tenant: &str) -> Option<String> {
        self.fallback_metadata
            .instances
            .iter()
            .flat_map(|instance| instance.endpoints.iter())
            .find(|endpoint| endpoint.usage == usage)
            .map(|endpoint| endpoint.location.replace("{tenant}", tenant))
    }
}

impl Default for WellKnownHostRegistry {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_hosts() {
        let registry = WellKnownHostRegistry::global();
        for host in WELL_KNOWN_AUTHORITY_HOSTS {
            assert!(registry.contains(host), "{host} should be well known");
        }
        assert!(!registry.contains("login.example.com"));
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let registry = WellKnownHostRegistry::global();
        assert!(!registry.contains("LOGIN.WINDOWS.NET"));
        assert!(!registry.contains("login.windows.net:443"));
        assert!(!registry.contains("evil.login.windows.net"));
        assert!(!registry.contains("login.windows.net.evil.com"));
    }

    #[test]
    fn test_global_registry_is_shared() {
        let a = WellKnownHostRegistry::global();
        let b = WellKnownHostRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_bundled_metadata_parses() {
        let metadata: InstanceMetadataDocument = serde_json::from_str(FALLBACK_METADATA).unwrap();
        assert_eq!(&metadata, &*BUNDLED_METADATA);
        assert_eq!(metadata.version, "1");
        assert_eq!(metadata.instances.len(), 1);
        assert_eq!(metadata.instances[0].id, "https://login.windows.net");
        assert_eq!(metadata.instances[0].endpoints.len(), 2);
    }

    #[test]
    fn test_fallback_endpoint_substitutes_tenant() {
        let registry = WellKnownHostRegistry::default();
        assert_eq!(
            registry.fallback_endpoint(EndpointUsage::Auth20Token, "contoso"),
            Some("https://login.windows.net/contoso/oauth2/token".to_string())
        );
        assert_eq!(
            registry.fallback_endpoint(EndpointUsage::Auth20Authorize, "contoso"),
            Some("https://login.windows.net/contoso/oauth2/authorize".to_string())
        );
        assert_eq!(registry.fallback_endpoint(EndpointUsage::Other, "contoso"), None);
    }

    #[test]
    fn test_unknown_usage_deserializes_as_other() {
        let endpoint: EndpointMetadata =
            serde_json::from_str(r#"{"location":"https://x/{tenant}/saml","usage":"Saml20"}"#)
                .unwrap();
        assert_eq!(endpoint.usage, EndpointUsage::Other);
    }

    #[test]
    fn test_custom_registry() {
        let registry = WellKnownHostRegistry::with_hosts(["login.example.com"]);
        assert!(registry.contains("login.example.com"));
        assert!(!registry.contains("login.windows.net"));
        assert_eq!(registry.hosts().count(), 1);
        assert!(
            registry
                .fallback_endpoint(EndpointUsage::Auth20Token, "t")
                .is_some()
        );
    }
}
