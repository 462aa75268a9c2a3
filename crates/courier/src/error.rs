//! Error types for courier.

use thiserror::Error;

use crate::data::Response;

/// Boxed error raised by transports and user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Every way a single fetch can fail.
///
/// All variants flow into the same [`ErrorPolicy`](crate::ErrorPolicy)
/// decision point. [`FetchError::code`] gives a stable short tag for each.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failed: {0}")]
    Transport(#[source] BoxError),

    #[error("no transport configured and the `reqwest` feature is disabled")]
    NoTransport,

    #[error("fetchError: response rejected with status {}", .response.status())]
    Rejected { response: Box<Response> },

    #[error("invalidResponseType: `{kind}` is not a known response type")]
    InvalidResponseType { kind: String, response: Box<Response> },

    #[error("failed to read response body: {0}")]
    Body(#[source] BoxError),

    #[error("failed to decode JSON response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode JSON request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("response filter failed: {0}")]
    Filter(#[source] BoxError),

    #[error("{0}")]
    Custom(BoxError),

    #[error("error handler dropped its settle handle without settling")]
    Unsettled,
}

impl FetchError {
    /// Wrap an arbitrary error, typically from a delegated error handler.
    pub fn custom(error: impl Into<BoxError>) -> Self {
        FetchError::Custom(error.into())
    }

    /// Stable short tag identifying the failure class.
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::NoTransport => "noTransport",
            FetchError::Rejected { .. } => "fetchError",
            FetchError::InvalidResponseType { .. } => "invalidResponseType",
            FetchError::Body(_) => "body",
            FetchError::Decode(_) => "decode",
            FetchError::Encode(_) => "encode",
            FetchError::Filter(_) => "filter",
            FetchError::Custom(_) => "custom",
            FetchError::Unsettled => "unsettled",
        }
    }

    /// The raw response attached to this error, if any.
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchError::Rejected { response } | FetchError::InvalidResponseType { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }

    /// Take ownership of the attached raw response. Its body is still unread.
    pub fn into_response(self) -> Option<Response> {
        match self {
            FetchError::Rejected { response } | FetchError::InvalidResponseType { response, .. } => {
                Some(*response)
            }
            _ => None,
        }
    }
}
