//! Endpoint derivation for validated authorities.

use tracing::debug;
use url::Url;

use super::Authority;
use crate::config::ResolverConfig;
use crate::discovery::DiscoveryOutcome;

impl Authority {
    /// Populate the token and authorization endpoints if not yet set.
    ///
    /// Endpoints are always `{authority url}{configured path}`. A tenant
    /// discovery endpoint from `outcome` does not change the result; it is
    /// only used for the trust decision.
    pub(crate) fn resolve_endpoints(
        &self,
        config: &ResolverConfig,
        outcome: Option<&DiscoveryOutcome>,
    ) {
        if self.token_endpoint.get().is_some() {
            return;
        }

        if let Some(discovered) = outcome.and_then(DiscoveryOutcome::tenant_discovery_endpoint) {
            debug!(
                "Discovered tenant endpoint {} not used for endpoint derivation",
                discovered
            );
        }

        let token_endpoint = self
            .token_endpoint
            .get_or_init(|| derive_endpoint(&self.parsed.url, &config.token_endpoint_path));
        self.authorization_endpoint
            .get_or_init(|| derive_endpoint(&self.parsed.url, &config.authorize_endpoint_path));

        debug!("Token endpoint resolved: {}", token_endpoint);
    }
}

fn derive_endpoint(authority_url: &Url, path: &str) -> String {
    format!("{}{}", authority_url.as_str().trim_end_matches('/'), path)
}
