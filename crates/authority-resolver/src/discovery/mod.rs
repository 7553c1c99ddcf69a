//! # Instance Discovery
//!
//! Determines whether an authority is a trustworthy member of the
//! identity-provider network.
//!
//! ## Discovery Order
//!
//! 1. **Static**: exact hostname match against the
//!    [`WellKnownHostRegistry`](crate::registry::WellKnownHostRegistry). No network access.
//! 2. **Dynamic**: one `GET` to the canonical discovery host:
//!    `https://{world_wide_authority}/common/discovery/instance?authorization_endpoint={encoded authority}&api-version=1.0`
//!
//! The dynamic request carries the caller's correlation id in
//! `client-request-id`. A success response must contain
//! `tenant_discovery_endpoint`.
//!
//! ## Failure Policy
//!
//! Nothing falls back to trust. A registry miss followed by a failed or
//! malformed discovery response is reported to the caller, who decides
//! whether to retry.

mod discoverer;
mod types;

pub use discoverer::InstanceDiscoverer;
pub use types::{DiscoveryError, DiscoveryOutcome, InstanceDiscoveryResponse};
