//! # Instance Discoverer
//!
//! Decides whether an authority belongs to the trusted provider network:
//! the well-known host registry first, then one request to the canonical
//! instance discovery endpoint.

use std::sync::Arc;

use http::header::{ACCEPT_CHARSET, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};
use url::Url;

use super::types::{DiscoveryError, DiscoveryOutcome, InstanceDiscoveryResponse};
use crate::authority::{Authority, ParsedAuthority};
use crate::config::ResolverConfig;
use crate::context::CallContext;
use crate::error::{AuthorityError, Result};
use crate::registry::WellKnownHostRegistry;
use crate::transport::{HttpClient, HttpError, ReqwestHttpClient};

const CLIENT_REQUEST_ID: &str = "client-request-id";
const RETURN_CLIENT_REQUEST_ID: &str = "return-client-request-id";
const CLIENT_SKU: &str = "x-client-sku";
const CLIENT_VERSION: &str = "x-client-ver";

/// Instance discoverer
///
/// Shared by every [`Authority`] validated against the same provider network.
/// Holds no per-authority state.
pub struct InstanceDiscoverer {
    config: ResolverConfig,
    registry: Arc<WellKnownHostRegistry>,
    http_client: Arc<dyn HttpClient>,
    client_sku: HeaderValue,
    client_version: HeaderValue,
}

impl InstanceDiscoverer {
    /// Discoverer using the global registry and a reqwest transport
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Configuration`] if `config` is invalid or the
    /// HTTP client cannot be created.
    pub fn new(config: ResolverConfig) -> Result<Self> {
        let http_client = ReqwestHttpClient::new(&config)
            .map_err(|e| AuthorityError::Configuration(e.to_string()))?;
        Self::with_http_client(config, WellKnownHostRegistry::global(), Arc::new(http_client))
    }

    /// Discoverer with an explicit registry and transport
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Configuration`] if `config` is invalid.
    pub fn with_http_client(
        config: ResolverConfig,
        registry: Arc<WellKnownHostRegistry>,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self> {
        config.validate()?;
        let client_sku = header_value(&config.client_sku)?;
        let client_version = header_value(&config.client_version)?;
        Ok(Self {
            config,
            registry,
            http_client,
            client_sku,
            client_version,
        })
    }

    /// The resolver configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The well-known host registry
    pub fn registry(&self) -> &WellKnownHostRegistry {
        &self.registry
    }

    /// Establish trust in `authority`.
    ///
    /// A registry hit never touches the network. Otherwise exactly one `GET`
    /// is issued; there are no retries.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::Unreachable`] on transport failure, non-2xx status or
    ///   a body that is not JSON
    /// - [`DiscoveryError::ResponseMalformed`] when the body lacks
    ///   `tenant_discovery_endpoint`
    pub async fn discover(
        &self,
        authority: &Authority,
        ctx: &CallContext,
    ) -> std::result::Result<DiscoveryOutcome, DiscoveryError> {
        self.discover_parsed(authority.parsed(), ctx).await
    }

    pub(crate) async fn discover_parsed(
        &self,
        authority: &ParsedAuthority,
        ctx: &CallContext,
    ) -> std::result::Result<DiscoveryOutcome, DiscoveryError> {
        if self.perform_static_discovery(&authority.hostname) {
            return Ok(DiscoveryOutcome::WellKnown);
        }
        self.perform_dynamic_discovery(authority, ctx).await
    }

    fn perform_static_discovery(&self, hostname: &str) -> bool {
        debug!("Performing static instance discovery");

        let found = self.registry.contains(hostname);
        if found {
            debug!("Authority validated via static instance discovery: {}", hostname);
        }
        found
    }

    async fn perform_dynamic_discovery(
        &self,
        authority: &ParsedAuthority,
        ctx: &CallContext,
    ) -> std::result::Result<DiscoveryOutcome, DiscoveryError> {
        let discovery_url = self.build_discovery_url(authority)?;
        let headers = self.request_headers(ctx).map_err(DiscoveryError::Unreachable)?;
        debug!("Attempting instance discovery at: {}", discovery_url);

        let response = self
            .http_client
            .get(&discovery_url, headers)
            .await
            .map_err(|e| {
                warn!("Instance discovery request failed: {}", e);
                DiscoveryError::Unreachable(e)
            })?;

        if !response.status().is_success() {
            let err = HttpError::unexpected_status(&response);
            warn!("Instance discovery returned an error status: {}", err);
            return Err(DiscoveryError::Unreachable(err));
        }

        let body: serde_json::Value = serde_json::from_slice(response.body())
            .map_err(|e| DiscoveryError::Unreachable(HttpError::InvalidJson(e.to_string())))?;

        let parsed: InstanceDiscoveryResponse = serde_json::from_value(body)
            .map_err(|e| DiscoveryError::ResponseMalformed(e.to_string()))?;

        match parsed.tenant_discovery_endpoint {
            Some(ref endpoint) if !endpoint.is_empty() => {
                debug!("Authority validated via dynamic instance discovery");
                Ok(DiscoveryOutcome::Discovered {
                    tenant_discovery_endpoint: endpoint.clone(),
                })
            }
            _ => {
                let reason = match parsed.error_description() {
                    Some(description) => {
                        format!("missing tenant_discovery_endpoint ({description})")
                    }
                    None => "missing tenant_discovery_endpoint".to_string(),
                };
                Err(DiscoveryError::ResponseMalformed(reason))
            }
        }
    }

    /// Discovery URL for `authority`, always addressed to the canonical
    /// world-wide host rather than the authority's own host.
    fn build_discovery_url(
        &self,
        authority: &ParsedAuthority,
    ) -> std::result::Result<Url, DiscoveryError> {
        let authorize_endpoint = format!("https://{}/{}", authority.host, authority.tenant);

        let discovery_url = self
            .config
            .instance_discovery_template
            .replace("{authorize_host}", &self.config.world_wide_authority)
            .replace(
                "{authorize_endpoint}",
                &urlencoding::encode(&authorize_endpoint),
            );

        Url::parse(&discovery_url).map_err(|e| {
            DiscoveryError::Unreachable(HttpError::InvalidUrl(format!("{discovery_url}: {e}")))
        })
    }

    fn request_headers(&self, ctx: &CallContext) -> std::result::Result<HeaderMap, HttpError> {
        let correlation_id = HeaderValue::from_str(&ctx.correlation_id().to_string())
            .map_err(|e| HttpError::InvalidHeader(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_CHARSET, HeaderValue::from_static("utf-8"));
        headers.insert(HeaderName::from_static(CLIENT_REQUEST_ID), correlation_id);
        headers.insert(
            HeaderName::from_static(RETURN_CLIENT_REQUEST_ID),
            HeaderValue::from_static("true"),
        );
        headers.insert(HeaderName::from_static(CLIENT_SKU), self.client_sku.clone());
        headers.insert(
            HeaderName::from_static(CLIENT_VERSION),
            self.client_version.clone(),
        );
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| AuthorityError::Configuration(format!("invalid header value {value:?}: {e}")))
}

impl std::fmt::Debug for InstanceDiscoverer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceDiscoverer")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("http_client", &"<dyn HttpClient>")
            .finish()
    }
}
