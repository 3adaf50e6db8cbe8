//! Shared header handling for event-stream requests and responses.
//!
//! # Request Headers
//!
//! | Header | Value | When |
//! |--------|-------|------|
//! | Accept | `text/event-stream` | Always |
//! | Cache-Control | `no-cache` | Always |
//! | Last-Event-ID | last seen event id | When non-empty |
//!
//! Caller-supplied headers are applied first and the protocol headers are
//! force-set afterwards, so the protocol headers always win.
//!
//! # Examples
//!
//! ```
//! use sse_client::protocol::{is_event_stream_content_type, parse_retry};
//!
//! assert!(is_event_stream_content_type("text/event-stream; charset=utf-8"));
//! assert_eq!(parse_retry("5000"), Some(5000));
//! assert_eq!(parse_retry("5s"), None);
//! ```

use super::constants::{self, headers};
use crate::error::Result;
use http::{HeaderMap, HeaderValue};

/// Force-set the protocol request headers on top of caller headers.
///
/// # Errors
///
/// Returns [`SseError::InvalidHeader`](crate::SseError::InvalidHeader) if the
/// last event id cannot be sent as a header value.
///
/// # Examples
///
/// ```
/// use http::HeaderMap;
/// use sse_client::protocol::apply_protocol_headers;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("accept", "application/json".parse().unwrap());
/// apply_protocol_headers(&mut headers, "42").unwrap();
///
/// assert_eq!(headers["accept"], "text/event-stream");
/// assert_eq!(headers["last-event-id"], "42");
/// ```
pub fn apply_protocol_headers(map: &mut HeaderMap, last_event_id: &str) -> Result<()> {
    map.insert(
        headers::ACCEPT,
        HeaderValue::from_static(constants::EVENT_STREAM),
    );
    map.insert(headers::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    if last_event_id.is_empty() {
        map.remove(headers::LAST_EVENT_ID);
    } else {
        map.insert(
            headers::LAST_EVENT_ID,
            HeaderValue::from_bytes(last_event_id.as_bytes())?,
        );
    }

    Ok(())
}

/// Read the `Content-Type` header as a string, if present and printable.
pub fn content_type_of(map: &HeaderMap) -> Option<String> {
    map.get(headers::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Check that a `Content-Type` value names the event-stream media type.
///
/// The media type is compared case-insensitively and parameters such as
/// `charset` are ignored.
pub fn is_event_stream_content_type(value: &str) -> bool {
    let media_type = value.split(';').next().unwrap_or_default().trim();
    media_type.eq_ignore_ascii_case(constants::EVENT_STREAM)
}

/// Parse a `retry` field value into milliseconds.
///
/// Only a non-empty run of ASCII digits is accepted.
pub fn parse_retry(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// An `id` field is ignored when its value contains U+0000 NULL.
#[inline]
pub fn is_valid_event_id(value: &str) -> bool {
    !value.contains('\0')
}
