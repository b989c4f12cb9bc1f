//! Error types for the entity layer.

use thiserror::Error;

/// Failure surfaced by an external collaborator.
///
/// Retries, timeouts and rate limiting belong to the transport behind the
/// collaborator traits; this layer only carries the outcome to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network-level failure reaching the provider.
    #[error("network error: {0}")]
    Network(String),

    /// The session is missing or no longer valid.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited.
    #[error("rate limited{}", match (endpoint, retry_after_secs) {
        (Some(ep), Some(secs)) => format!(" on {} (retry after {}s)", ep, secs),
        (Some(ep), None) => format!(" on {}", ep),
        (None, Some(secs)) => format!(" (retry after {}s)", secs),
        (None, None) => String::new(),
    })]
    RateLimited {
        /// The endpoint that was rate limited (optional).
        endpoint: Option<String>,
        /// Seconds to wait before retrying (optional).
        retry_after_secs: Option<u64>,
    },

    /// Error response from the provider.
    #[error("provider error: {code} - {message}")]
    Provider { code: String, message: String },
}

/// Errors produced by entity and store operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The payload cannot become an entity.
    #[error("invalid user payload: {0}")]
    InvalidPayload(String),

    /// A patch carried a different id than the entity it was applied to.
    #[error("identity mismatch: entity {expected}, payload {got}")]
    IdentityMismatch { expected: String, got: String },

    /// No private conversation with the user is cached.
    #[error("no private conversation cached for user {0}")]
    ConversationNotFound(String),

    /// An external operation failed.
    #[error("external operation failed: {0}")]
    Api(#[from] ApiError),
}
