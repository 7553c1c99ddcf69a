//! Per-call context supplied by the caller of [`Authority::validate`](crate::Authority::validate).

use uuid::Uuid;

/// Correlation data for one validation call.
///
/// The correlation id is sent as `client-request-id` on the discovery request
/// and recorded on the tracing span wrapping the call, so client logs can be
/// joined with server-side traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    correlation_id: Uuid,
}

impl CallContext {
    /// Context with a fresh random correlation id
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
        }
    }

    /// Context reusing a correlation id from an outer operation
    pub fn with_correlation_id(correlation_id: Uuid) -> Self {
        Self { correlation_id }
    }

    /// The correlation id
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}
