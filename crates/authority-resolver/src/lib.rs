//! # Authority Resolver
//!
//! Validation and instance discovery for identity-provider authorities.
//!
//! Before a client exchanges credentials for tokens it must decide whether the
//! authority it was configured with (e.g. `https://login.windows.net/contoso`)
//! is a trustworthy member of the provider network, and where that
//! authority's token endpoint lives.
//!
//! ## Architecture
//!
//! - [`authority`] - The [`Authority`] type: URL validation, tenant parsing,
//!   validation state and endpoint resolution
//! - [`discovery`] - Static (well-known host) and dynamic (network) instance discovery
//! - [`registry`] - Process-wide well-known host registry and fallback metadata
//! - [`transport`] - HTTP seam used by dynamic discovery, with a reqwest implementation
//! - [`config`] - Resolver configuration
//! - [`resolver`] - [`AuthorityResolver`] facade
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use authority_resolver::{AuthorityResolver, CallContext, ResolverConfig};
//!
//! # async fn example() -> Result<(), authority_resolver::AuthorityError> {
//! let resolver = AuthorityResolver::new(ResolverConfig::default())?;
//!
//! let authority = resolver
//!     .resolve("https://login.windows.net/contoso", true, &CallContext::new())
//!     .await?;
//!
//! assert_eq!(
//!     authority.token_endpoint(),
//!     Some("https://login.windows.net/contoso/oauth2/token")
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Security
//!
//! - Authority URLs MUST use `https` and MUST NOT carry a query string
//! - A host outside the well-known registry is trusted only after the
//!   discovery service vouches for it; discovery failures are never
//!   converted into trust
//! - Discovery requests do not follow redirects

pub mod authority;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod transport;

#[doc(inline)]
pub use authority::{Authority, AuthorityState};
#[doc(inline)]
pub use config::ResolverConfig;
#[doc(inline)]
pub use context::CallContext;
#[doc(inline)]
pub use discovery::{DiscoveryError, DiscoveryOutcome, InstanceDiscoverer};
#[doc(inline)]
pub use error::{AuthorityError, Result};
#[doc(inline)]
pub use registry::{EndpointUsage, WellKnownHostRegistry};
#[doc(inline)]
pub use resolver::AuthorityResolver;
#[doc(inline)]
pub use transport::{HttpClient, HttpError, HttpResponse, ReqwestHttpClient};
