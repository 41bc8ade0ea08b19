use serde_json::Value;
use thiserror::Error;

/// Closed category of call failure.
///
/// Use [`ClientError::kind`] to branch on failures programmatically without
/// matching on every variant's payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The call was malformed and never reached the network.
    InvalidArgument,
    /// Network-level failure, including non-success HTTP statuses.
    Transport,
    /// The API answered with `ok: false`.
    RemoteRejected,
    /// The response could not be decoded into the expected shape.
    Protocol,
    /// The call was cancelled before it settled.
    Cancelled,
}

/// Errors returned by dispatcher and facet operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The call could not be constructed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Base URL is not a valid absolute URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The transport failed to complete the exchange.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The API returned a structured failure.
    ///
    /// `error` is the API's own error code, copied verbatim.
    #[error("API rejected call: {error}")]
    RemoteRejected { error: String, response: Value },

    /// Response body did not match the `{ "ok": bool, ... }` envelope.
    #[error("malformed response: {0}")]
    Protocol(String),

    /// The call was cancelled before it settled.
    #[error("call cancelled")]
    Cancelled,
}

impl ClientError {
    /// Returns the failure category for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::InvalidBaseUrl(_) => ErrorKind::InvalidArgument,
            Self::Transport(_) => ErrorKind::Transport,
            Self::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Returns the remote error code for [`ErrorKind::RemoteRejected`] failures.
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            Self::RemoteRejected { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Errors raised by a [`crate::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed before a response was received.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Method identifier could not be joined to the base URL.
    #[error("invalid method path '{0}'")]
    InvalidPath(String),

    /// Non-success HTTP status with response payload.
    #[error("server returned status {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    /// HTTP 429, with the `Retry-After` delay when the server sent one.
    #[error("rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other exchange failure, typically from non-HTTP transports.
    #[error("{0}")]
    Other(String),
}
