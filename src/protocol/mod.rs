//! Protocol constants and header helpers for `text/event-stream`.
//!
//! # Module Structure
//!
//! - **[constants]** - Header names, media type, field names and defaults
//! - **headers** - Request header assembly and response header checks
//!
//! # Specification
//!
//! Based on the [HTML Living Standard, Server-sent events].
//!
//! [HTML Living Standard, Server-sent events]: https://html.spec.whatwg.org/multipage/server-sent-events.html

pub mod constants;
mod headers;

pub use headers::{
    apply_protocol_headers, content_type_of, is_event_stream_content_type, is_valid_event_id,
    parse_retry,
};
