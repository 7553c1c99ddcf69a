//! # Instance Discovery Types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::HttpError;

/// Instance discovery errors
#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    /// The discovery service could not be reached or answered unusably
    /// (transport failure, timeout, non-2xx status, invalid JSON).
    ///
    /// Retrying later may succeed.
    #[error("Instance discovery endpoint unreachable: {0}")]
    Unreachable(#[source] HttpError),

    /// The discovery service answered, but without a tenant discovery endpoint
    #[error("Failed to parse instance discovery response: {0}")]
    ResponseMalformed(String),
}

/// How trust in an authority was established
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// Host is in the well-known host registry; no request was made
    WellKnown,

    /// The discovery service vouched for the authority
    Discovered {
        /// Tenant-specific discovery endpoint returned by the service
        tenant_discovery_endpoint: String,
    },
}

impl DiscoveryOutcome {
    /// The tenant discovery endpoint, if discovery went over the network
    pub fn tenant_discovery_endpoint(&self) -> Option<&str> {
        match self {
            Self::WellKnown => None,
            Self::Discovered {
                tenant_discovery_endpoint,
            } => Some(tenant_discovery_endpoint),
        }
    }
}

/// Body of an instance discovery response
///
/// ```json
/// {
///   "tenant_discovery_endpoint": "https://login.windows.net/contoso/.well-known/openid-configuration"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceDiscoveryResponse {
    /// Present when the authority belongs to the provider network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_discovery_endpoint: Option<String>,

    /// Additional fields (error codes, descriptions, ...)
    #[serde(flatten)]
    pub additional_fields: HashMap<String, serde_json::Value>,
}

impl InstanceDiscoveryResponse {
    /// `error_description` sent by the service, if any
    pub fn error_description(&self) -> Option<&str> {
        self.additional_fields
            .get("error_description")
            .and_then(serde_json::Value::as_str)
    }
}
