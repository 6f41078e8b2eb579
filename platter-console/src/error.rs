//! Client error types

use thiserror::Error;

/// Transport-level error, mapped from HTTP status codes and decode
/// failures by the gateway.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure, no response received
    #[error("network error: {0}")]
    Network(String),

    /// Authentication required (401)
    #[error("authentication required")]
    Unauthorized,

    /// Permission denied (403)
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend rejected the payload (400/422), field messages attached
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other non-success response
    #[error("server error: {0}")]
    Internal(String),

    /// Response body did not match the expected shape
    #[error("invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Result type for gateway operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure refreshing a resource collection from the backend.
#[derive(Debug, Error)]
#[error("failed to load {resource}: {source}")]
pub struct FetchError {
    pub resource: &'static str,
    #[source]
    pub source: ApiError,
}

/// Failure creating or updating a resource. The cache has already been
/// rolled back to a previously-valid state when this surfaces.
#[derive(Debug, Error)]
#[error("failed to save {resource}: {source}")]
pub struct SaveError {
    pub resource: &'static str,
    #[source]
    pub source: ApiError,
}

/// Failure deleting a resource; the entry has been restored.
#[derive(Debug, Error)]
#[error("failed to delete {resource}: {source}")]
pub struct DeleteError {
    pub resource: &'static str,
    #[source]
    pub source: ApiError,
}

/// Session errors. `NotAuthorized` is an authorization rejection after a
/// successful network exchange, distinct from credential or transport
/// failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("role '{role}' is not authorized for this console")]
    NotAuthorized { role: String },

    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Order workflow errors. `AlreadyTerminal` is a client-side guard and
/// never reaches the network.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("order {id} is already delivered")]
    AlreadyTerminal { id: String },

    #[error("order {id} is not in the cached list")]
    UnknownOrder { id: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}
