//! Authority resolver facade
//!
//! Bundles an [`InstanceDiscoverer`] with the parse → validate sequence that
//! token acquisition flows run before every token request.

use std::sync::Arc;

use crate::authority::Authority;
use crate::config::ResolverConfig;
use crate::context::CallContext;
use crate::discovery::InstanceDiscoverer;
use crate::error::Result;
use crate::registry::WellKnownHostRegistry;
use crate::transport::HttpClient;

/// Resolves authority URLs into validated [`Authority`] values
#[derive(Debug)]
pub struct AuthorityResolver {
    discoverer: InstanceDiscoverer,
}

impl AuthorityResolver {
    /// Resolver with the global registry and a reqwest transport
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Configuration`](crate::AuthorityError::Configuration)
    /// if `config` is invalid or the HTTP client cannot be built.
    pub fn new(config: ResolverConfig) -> Result<Self> {
        Ok(Self {
            discoverer: InstanceDiscoverer::new(config)?,
        })
    }

    /// Resolver with an explicit registry and transport
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Configuration`](crate::AuthorityError::Configuration)
    /// if `config` is invalid.
    pub fn with_http_client(
        config: ResolverConfig,
        registry: Arc<WellKnownHostRegistry>,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self> {
        Ok(Self {
            discoverer: InstanceDiscoverer::with_http_client(config, registry, http_client)?,
        })
    }

    /// The underlying discoverer
    pub fn discoverer(&self) -> &InstanceDiscoverer {
        &self.discoverer
    }

    /// Parse an authority URL without validating it
    ///
    /// # Errors
    ///
    /// See [`Authority::parse`].
    pub fn parse(&self, authority_url: &str, validate_authority: bool) -> Result<Authority> {
        Authority::parse(authority_url, validate_authority)
    }

    /// Validate a previously parsed authority
    ///
    /// # Errors
    ///
    /// See [`Authority::validate`].
    pub async fn validate(&self, authority: &mut Authority, ctx: &CallContext) -> Result<()> {
        authority.validate(&self.discoverer, ctx).await
    }

    /// Parse and validate an authority URL in one step
    ///
    /// # Errors
    ///
    /// Any error from [`Authority::parse`] or [`Authority::validate`].
    pub async fn resolve(
        &self,
        authority_url: &str,
        validate_authority: bool,
        ctx: &CallContext,
    ) -> Result<Authority> {
        let mut authority = Authority::parse(authority_url, validate_authority)?;
        authority.validate(&self.discoverer, ctx).await?;
        Ok(authority)
    }
}
