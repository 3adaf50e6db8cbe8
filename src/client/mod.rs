//! Server-Sent Events client implementation.
//!
//! This module turns an HTTP response body into a sequence of events and keeps
//! that sequence alive across disconnects:
//!
//! - **Decode the wire format** incrementally, whatever the chunk boundaries
//! - **Resume after disconnects** with `Last-Event-ID` and the server's `retry:`
//! - **Bound connect failures** with a configurable retry budget
//! - **Close from anywhere** with a cloneable [`CloseHandle`]
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── event_source - EventSource facade and builder
//! ├── stream       - Stream adapter
//! ├── connection   - Connect/read/reconnect state machine
//! ├── transport    - HTTP transport seam (reqwest by default)
//! ├── lines        - UTF-8 chunk decoding and line splitting
//! ├── parser       - Field parsing and event dispatch
//! ├── observer     - Lifecycle hooks
//! ├── config       - Client configuration
//! └── utils        - Utility functions
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`EventSource`] | One logical event stream |
//! | [`EventStream`] | `Stream` view of an event source |
//! | [`ConnectionManager`] | Lifecycle state machine |
//! | [`EventDecoder`] | Line-to-event decoder |
//! | [`Transport`] | Pluggable HTTP layer |
//! | [`ClientConfig`] | Client configuration options |
//!
//! # Examples
//!
//! ## Decoding Lines
//!
//! ```
//! use sse_client::client::{EventDecoder, LineSplitter, ReconnectState};
//! use std::time::Duration;
//!
//! let mut lines = LineSplitter::new();
//! let mut decoder = EventDecoder::new();
//! let mut state = ReconnectState::new(String::new(), Duration::from_secs(5));
//!
//! let mut events = Vec::new();
//! for chunk in ["event: ping\nid: 7\nda", "ta: hello\n\n"] {
//!     for line in lines.feed(chunk) {
//!         events.extend(decoder.decode_line(&line, &mut state));
//!     }
//! }
//!
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].event_type, "ping");
//! assert_eq!(events[0].data, "hello");
//! assert_eq!(state.last_event_id, "7");
//! ```
//!
//! ## Configuring Retries
//!
//! ```
//! use sse_client::client::ClientConfig;
//!
//! let config = ClientConfig {
//!     max_retries: Some(10),
//!     retry_delay_ms: 2000,
//!     request_timeout_ms: Some(30_000),
//!     ..Default::default()
//! };
//! assert!(config.allows_retry(10));
//! assert!(!config.allows_retry(11));
//! ```
//!
//! ## Closing From Another Task
//!
//! ```
//! use sse_client::client::CloseHandle;
//!
//! let handle = CloseHandle::new();
//! let remote = handle.clone();
//! remote.close();
//! assert!(handle.is_closed());
//! ```
//!
//! # Specification
//!
//! Based on the [WHATWG HTML Living Standard, Server-sent events].
//!
//! [WHATWG HTML Living Standard, Server-sent events]: https://html.spec.whatwg.org/multipage/server-sent-events.html

mod config;
mod connection;
mod event_source;
mod lines;
mod observer;
mod parser;
mod stream;
mod transport;
mod utils;

pub use config::ClientConfig;
pub use connection::{CloseHandle, ConnectionManager};
pub use event_source::{EventSource, EventSourceBuilder};
pub use lines::{LineSplitter, Utf8ChunkDecoder};
pub use observer::ConnectionObserver;
pub use parser::{EventDecoder, ReconnectState};
pub use stream::EventStream;
pub use transport::{ByteStream, ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use utils::*;
