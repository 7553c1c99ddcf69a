//! # Authority
//!
//! An [`Authority`] is one identity-provider endpoint plus tenant, e.g.
//! `https://login.windows.net/contoso`.
//!
//! ## Lifecycle
//!
//! ```text
//!                 parse(url, true)             parse(url, false)
//!                        │                            │
//!                        ▼                            ▼
//!   ┌──────────────▶ Unvalidated               TrustAsserted
//!   │                    │ validate()                 │ validate()
//!   │ failed/cancelled   ▼                            │
//!   └─────────────── Validating                       │
//!                        │ discovery succeeded        │
//!                        ▼                            ▼
//!                    Validated ──────────────▶ endpoints resolved (once)
//! ```
//!
//! Construction performs every structural check and fails synchronously.
//! [`Authority::validate`] may be called any number of times; only the first
//! successful call does discovery work. A failed call commits nothing, so the
//! same instance can simply be validated again. The same holds when the
//! `validate` future is dropped before discovery completes (e.g. by an outer
//! timeout): the authority falls back to `Unvalidated`.
//!
//! ## Concurrency
//!
//! `validate` takes `&mut self`. Callers that share one authority between
//! tasks must serialize access themselves (e.g. `tokio::sync::Mutex`).

mod endpoint;
mod parse;

pub(crate) use parse::ParsedAuthority;

use once_cell::sync::OnceCell;
use tracing::{Instrument, debug, info, info_span, warn};
use crate::context::CallContext;
use crate::discovery::InstanceDiscoverer;
use crate::error::Result;

/// Validation state of an [`Authority`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityState {
    /// Not yet trusted
    Unvalidated,
    /// Discovery in progress
    Validating,
    /// Trusted via instance discovery
    Validated,
    /// Trusted because the caller disabled validation
    TrustAsserted,
}

impl AuthorityState {
    /// Whether the authority may be used for token requests
    pub fn is_trusted(self) -> bool {
        matches!(self, Self::Validated | Self::TrustAsserted)
    }
}

/// An identity-provider authority
#[derive(Debug)]
pub struct Authority {
    parsed: ParsedAuthority,
    state: AuthorityState,
    token_endpoint: OnceCell<String>,
    authorization_endpoint: OnceCell<String>,
}

impl Authority {
    /// Parse and structurally validate an authority URL.
    ///
    /// With `validate_authority == false` the caller asserts the authority is
    /// trustworthy and [`validate`](Self::validate) skips instance discovery.
    ///
    /// # Errors
    ///
    /// - [`AuthorityError::InvalidAuthorityUrl`](crate::AuthorityError::InvalidAuthorityUrl)
    ///   if the URL does not parse, is not `https`, or has a query string
    /// - [`AuthorityError::TenantNotFound`](crate::AuthorityError::TenantNotFound)
    ///   if the path has no tenant segment
    pub fn parse(authority_url: &str, validate_authority: bool) -> Result<Self> {
        let parsed = parse::parse_authority_url(authority_url)?;

        let state = if validate_authority {
            AuthorityState::Unvalidated
        } else {
            AuthorityState::TrustAsserted
        };

        Ok(Self {
            parsed,
            state,
            token_endpoint: OnceCell::new(),
            authorization_endpoint: OnceCell::new(),
        })
    }

    /// Normalized authority URL, `https://{host}/{tenant}`
    pub fn url(&self) -> &str {
        self.parsed.url.as_str()
    }

    /// Host including an explicit non-default port
    pub fn host(&self) -> &str {
        &self.parsed.host
    }

    /// Hostname without port
    pub fn hostname(&self) -> &str {
        &self.parsed.hostname
    }

    /// Tenant segment
    pub fn tenant(&self) -> &str {
        &self.parsed.tenant
    }

    pub(crate) fn parsed(&self) -> &ParsedAuthority {
        &self.parsed
    }

    /// Current validation state
    pub fn state(&self) -> AuthorityState {
        self.state
    }

    /// Whether the authority is trusted (validated, or validation disabled)
    pub fn is_validated(&self) -> bool {
        self.state.is_trusted()
    }

    /// Token endpoint, available after a successful [`validate`](Self::validate)
    pub fn token_endpoint(&self) -> Option<&str> {
        self.token_endpoint.get().map(String::as_str)
    }

    /// Authorization endpoint, available after a successful [`validate`](Self::validate)
    pub fn authorization_endpoint(&self) -> Option<&str> {
        self.authorization_endpoint.get().map(String::as_str)
    }

    /// Establish trust in this authority and resolve its endpoints.
    ///
    /// Already trusted authorities skip discovery; calling this repeatedly is
    /// safe and performs at most one discovery request per successful
    /// validation.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Discovery`](crate::AuthorityError::Discovery)
    /// if instance discovery fails. The authority stays unvalidated and can be
    /// validated again.
    pub async fn validate(
        &mut self,
        discoverer: &InstanceDiscoverer,
        ctx: &CallContext,
    ) -> Result<()> {
        let span = info_span!(
            "authority_validation",
            correlation_id = %ctx.correlation_id(),
            authority = %self.parsed.url
        );
        self.run_validation(discoverer, ctx).instrument(span).await
    }

    async fn run_validation(
        &mut self,
        discoverer: &InstanceDiscoverer,
        ctx: &CallContext,
    ) -> Result<()> {
        if self.is_validated() {
            debug!(
                "Instance discovery/validation has either already been completed or is turned off: {}",
                self.parsed.url
            );
            self.resolve_endpoints(discoverer.config(), None);
            return Ok(());
        }

        debug!("Performing instance discovery: {}", self.parsed.url);
        let attempt = ValidationAttempt::begin(&mut self.state);

        match discoverer.discover_parsed(&self.parsed, ctx).await {
            Ok(outcome) => {
                attempt.succeed();
                self.resolve_endpoints(discoverer.config(), Some(&outcome));
                info!("Authority validated: {}", self.parsed.url);
                Ok(())
            }
            Err(e) => {
                drop(attempt);
                warn!("Authority validation failed: {}", e);
                Err(e.into())
            }
        }
    }
}

/// Holds an authority in `Validating` for the duration of one discovery.
///
/// Dropping the attempt without [`succeed`](Self::succeed), including when the
/// enclosing future is cancelled, reverts the state to `Unvalidated`.
struct ValidationAttempt<'a> {
    state: &'a mut AuthorityState,
}

impl<'a> ValidationAttempt<'a> {
    fn begin(state: &'a mut AuthorityState) -> Self {
        *state = AuthorityState::Validating;
        Self { state }
    }

    fn succeed(self) {
        *self.state = AuthorityState::Validated;
    }
}

impl Drop for ValidationAttempt<'_> {
    fn drop(&mut self) {
        if *self.state == AuthorityState::Validating {
            *self.state = AuthorityState::Unvalidated;
        }
    }
}

impl std::fmt::Display for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.parsed.url.as_str())
    }
}
