//! Utility functions for the SSE client.
//!
//! This module provides helper functions for:
//! - Status code classification
//! - Origin derivation for decoded events

/// Check if status code is a success (2xx)
#[inline]
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Check if status code tells the client to stop reconnecting
///
/// A server ends an event stream for good by answering `204 No Content`.
#[inline]
pub fn is_stop_status(status: u16) -> bool {
    status == 204
}

/// Derive `scheme://host[:port]` from a URL.
///
/// Returns `None` for URLs without a tuple origin (e.g. `data:` URLs).
///
/// # Examples
///
/// ```
/// use sse_client::client::origin_of;
///
/// assert_eq!(
///     origin_of("https://stream.example.org/v2/stream?x=1").as_deref(),
///     Some("https://stream.example.org"),
/// );
/// assert_eq!(
///     origin_of("http://127.0.0.1:8080/events").as_deref(),
///     Some("http://127.0.0.1:8080"),
/// );
/// ```
pub fn origin_of(url: &str) -> Option<String> {
    let origin = url::Url::parse(url).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
