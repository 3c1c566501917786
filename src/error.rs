//! Error taxonomy for the session layer.
//!
//! The request gateway is the single classification point: a failed call
//! becomes exactly one `RequestError`. Higher layers either recover one
//! specific case (the identity check absorbs 401 into "not signed in") or
//! propagate the error unchanged. Nothing here is retried automatically.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

use crate::util::storage::StorageError;

/// Failure of a single gateway request.
///
/// `Clone` so one failed identity check can be observed by every caller
/// sharing the in-flight verification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// The server answered 401. The unauthorized hook has already run by the
    /// time a caller sees this.
    #[error("unauthorized (status {status})")]
    Unauthorized { status: u16, body: Value },

    /// Any other non-2xx status, with a display message derived from the body.
    #[error("{message}")]
    Api { status: u16, message: String, body: Value },

    /// The request could not complete (connection refused, timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The request body could not be encoded.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// A 2xx body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl RequestError {
    /// HTTP status carried by the error, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Network(_) | Self::Encode(_) | Self::Decode(_) => None,
        }
    }

    /// True for `Unauthorized` and for any error carrying status 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. }) || self.status() == Some(401)
    }
}

/// Errors surfaced by session-level operations (login, setup).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("config error: {0}")]
    Config(String),
}
