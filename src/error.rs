//! Error types for the SSE client.
//!
//! Every failure the client can report is a variant of [`SseError`]. The
//! variants fall into three groups:
//!
//! | Group | Variants | Retried? |
//! |-------|----------|----------|
//! | Handshake | [`InvalidStatusCode`], [`InvalidContentType`] | No |
//! | Transient | [`Http`], [`Timeout`], [`Decode`] | Yes, up to the retry budget |
//! | Caller input | [`InvalidHeader`], [`Config`] | No |
//!
//! Once the retry budget is spent, the last transient error is wrapped in
//! [`ConnectionFailed`] before it reaches the caller.
//!
//! Malformed event-stream framing is never an error, and neither is a clean
//! server stop (HTTP 204) or a caller-initiated close: those simply end
//! iteration.
//!
//! [`InvalidStatusCode`]: SseError::InvalidStatusCode
//! [`InvalidContentType`]: SseError::InvalidContentType
//! [`Http`]: SseError::Http
//! [`Timeout`]: SseError::Timeout
//! [`Decode`]: SseError::Decode
//! [`InvalidHeader`]: SseError::InvalidHeader
//! [`Config`]: SseError::Config
//! [`ConnectionFailed`]: SseError::ConnectionFailed

use std::str::Utf8Error;
use std::time::Duration;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SseError>;

/// Errors produced while connecting to or reading from an event stream.
#[derive(Debug, Error)]
pub enum SseError {
    /// Network-level failure reported by the transport (DNS, TCP, TLS, or a
    /// broken body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request or a body read did not complete within the configured
    /// timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The response body was not valid UTF-8.
    #[error("invalid UTF-8 in event stream: {0}")]
    Decode(#[from] Utf8Error),

    /// The server answered with a status other than 2xx.
    #[error("fetch {url} failed with wrong response status: {status}")]
    InvalidStatusCode {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The server answered without a `text/event-stream` content type.
    #[error("fetch {url} failed with wrong Content-Type: {content_type:?}")]
    InvalidContentType {
        /// The `Content-Type` header value, if any.
        content_type: Option<String>,
        /// Requested URL.
        url: String,
    },

    /// A caller-supplied header name or value could not be encoded.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The client or request configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Connecting failed and the retry budget is exhausted.
    #[error("connection failed after {attempts} attempt(s): {source}")]
    ConnectionFailed {
        /// Number of connect attempts made in the failing cycle.
        attempts: u32,
        /// The last transient error.
        #[source]
        source: Box<SseError>,
    },
}

impl SseError {
    /// Whether the failure is transient and worth another connect attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SseError::Http(_) | SseError::Timeout(_) | SseError::Decode(_)
        )
    }

    /// Whether the error ends the stream's connection for good.
    ///
    /// Every error that reaches the caller is terminal, so callers that treat
    /// "connection error" as normal stream termination can match on this.
    pub fn is_connection_error(&self) -> bool {
        !matches!(self, SseError::InvalidHeader(_) | SseError::Config(_))
    }

    /// The HTTP status code, for status errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            SseError::InvalidStatusCode { status, .. } => Some(*status),
            SseError::ConnectionFailed { source, .. } => source.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SseError {
    fn from(err: reqwest::Error) -> Self {
        SseError::Http(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for SseError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        SseError::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for SseError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        SseError::InvalidHeader(err.to_string())
    }
}
