use reqwest::StatusCode;
use scheduler_core::ValidationError;
use thiserror::Error;

use crate::transport::TransportError;

/// Internal failure of a single client operation, before it is folded into an
/// [`Outcome`](crate::Outcome).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Connection error: {0}")]
    Connection(#[from] TransportError),
    /// Non-2xx with a usable message, surfaced verbatim.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    /// Non-2xx without a usable message.
    #[error("server returned {status} without a message")]
    RejectedSilently { status: StatusCode },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}
