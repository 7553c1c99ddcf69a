//! Resolver Configuration
//!
//! Everything that varies between deployments of the identity-provider
//! network lives here: the canonical discovery host, the discovery URL
//! template, endpoint path suffixes and transport limits.

use std::time::Duration;

use http::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::error::{AuthorityError, Result};

/// Host that answers instance discovery for every cloud
pub const WORLD_WIDE_AUTHORITY: &str = "login.windows.net";

/// Instance discovery URL template.
///
/// `{authorize_host}` is replaced by the canonical discovery host and
/// `{authorize_endpoint}` by the URL-encoded `https://{host}/{tenant}`.
/// Only `{authorize_endpoint}` is required; a template may name its host
/// literally, in which case `world_wide_authority` is not substituted.
pub const INSTANCE_DISCOVERY_ENDPOINT_TEMPLATE: &str = "https://{authorize_host}/common/discovery/instance?authorization_endpoint={authorize_endpoint}&api-version=1.0";

/// Path appended to the authority URL to form the token endpoint
pub const TOKEN_ENDPOINT_PATH: &str = "/oauth2/token";

/// Path appended to the authority URL to form the authorization endpoint
pub const AUTHORIZE_ENDPOINT_PATH: &str = "/oauth2/authorize";

/// Authority resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Canonical host queried for dynamic instance discovery
    pub world_wide_authority: String,
    /// Discovery URL template (see [`INSTANCE_DISCOVERY_ENDPOINT_TEMPLATE`]).
    /// Must contain `{authorize_endpoint}`; `{authorize_host}` is optional.
    pub instance_discovery_template: String,
    /// Token endpoint path suffix
    pub token_endpoint_path: String,
    /// Authorization endpoint path suffix
    pub authorize_endpoint_path: String,
    /// Discovery request timeout (default: 30 seconds)
    pub request_timeout: Duration,
    /// Maximum discovery response size in bytes (default: 10 KB)
    pub max_response_size: usize,
    /// User agent for discovery requests
    pub user_agent: String,
    /// Value of the `x-client-SKU` telemetry header
    pub client_sku: String,
    /// Value of the `x-client-Ver` telemetry header
    pub client_version: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            world_wide_authority: WORLD_WIDE_AUTHORITY.to_string(),
            instance_discovery_template: INSTANCE_DISCOVERY_ENDPOINT_TEMPLATE.to_string(),
            token_endpoint_path: TOKEN_ENDPOINT_PATH.to_string(),
            authorize_endpoint_path: AUTHORIZE_ENDPOINT_PATH.to_string(),
            request_timeout: Duration::from_secs(30),
            max_response_size: 10 * 1024, // 10 KB
            user_agent: format!("authority-resolver/{}", env!("CARGO_PKG_VERSION")),
            client_sku: env!("CARGO_PKG_NAME").to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ResolverConfig {
    /// Check that the configuration can produce discovery requests and endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Configuration`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.world_wide_authority.trim().is_empty() {
            return Err(AuthorityError::Configuration(
                "world_wide_authority must not be empty".to_string(),
            ));
        }

        if !self.instance_discovery_template.contains("{authorize_endpoint}") {
            return Err(AuthorityError::Configuration(
                "instance_discovery_template must contain {authorize_endpoint}".to_string(),
            ));
        }

        for (name, value) in [
            ("user_agent", &self.user_agent),
            ("client_sku", &self.client_sku),
            ("client_version", &self.client_version),
        ] {
            if HeaderValue::from_str(value).is_err() {
                return Err(AuthorityError::Configuration(format!(
                    "{name} is not a valid header value: {value:?}"
                )));
            }
        }

        for (name, path) in [
            ("token_endpoint_path", &self.token_endpoint_path),
            ("authorize_endpoint_path", &self.authorize_endpoint_path),
        ] {
            if !path.starts_with('/') {
                return Err(AuthorityError::Configuration(format!(
                    "{name} must start with '/': {path}"
                )));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(AuthorityError::Configuration(
                "request_timeout must be greater than zero".to_string(),
            ));
        }

        if self.max_response_size == 0 {
            return Err(AuthorityError::Configuration(
                "max_response_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
