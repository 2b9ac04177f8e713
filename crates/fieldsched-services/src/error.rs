//! Error types for calls to external services.

use thiserror::Error;

/// Errors from the hosted store, auth, payments or workflow services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request never produced a response (DNS, TLS, timeout, reset).
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Service answered with a non-success status.
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Response body did not have the expected shape.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Service answered successfully but reported a failure in its payload.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Call requires a signed-in session.
    #[error("not signed in")]
    NotSignedIn,

    /// A required endpoint or key is missing from configuration.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// A credential contained characters not allowed in an HTTP header.
    #[error("invalid value for header {0}")]
    InvalidHeader(&'static str),
}

impl ServiceError {
    /// Message suitable for showing to the user. Details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::NotSignedIn => "Please sign in first.",
            Self::Status { status: 401, .. } | Self::Status { status: 403, .. } => {
                "Your session is not authorized for this operation. Please sign in again."
            }
            Self::NotConfigured(_) => "This service is not configured.",
            Self::Client(_)
            | Self::Network { .. }
            | Self::Status { .. }
            | Self::Decode { .. }
            | Self::Rejected(_)
            | Self::InvalidHeader(_) => "The operation failed. Please try again.",
        }
    }

    /// Whether the failure looks transient. Nothing retries automatically.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type for service calls.
pub type Result<T> = std::result::Result<T, ServiceError>;
