//! Error types for authority resolution.

use thiserror::Error;

use crate::discovery::DiscoveryError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AuthorityError>;

/// Authority resolution errors
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// The authority URL is not an https URL without a query string
    #[error("Invalid authority URL: {0}")]
    InvalidAuthorityUrl(String),

    /// The authority URL path carries no tenant segment
    #[error("Could not determine tenant from authority URL: {0}")]
    TenantNotFound(String),

    /// Instance discovery failed
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Resolver configuration is unusable
    #[error("Invalid resolver configuration: {0}")]
    Configuration(String),
}

impl AuthorityError {
    /// Whether repeating the failed operation may succeed.
    ///
    /// Only an unreachable discovery endpoint is transient; structural URL
    /// errors and malformed discovery responses will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Discovery(DiscoveryError::Unreachable(_)))
    }
}
