#![warn(missing_docs)]

//! # sse_client: Server-Sent Events over streaming HTTP
//!
//! This crate implements the client side of Server-Sent Events (SSE): it reads
//! a `text/event-stream` response body, decodes it into [`Event`]s, and keeps
//! the stream alive across disconnects.
//!
//! Based on the [WHATWG HTML Living Standard, Server-sent events](https://html.spec.whatwg.org/multipage/server-sent-events.html)
//!
//! ## Overview
//!
//! An [`EventSource`] is one *logical* event stream backed by a sequence of
//! *physical* HTTP connections:
//!
//! 1. **Connect** - Send the request with `Accept: text/event-stream` and the
//!    `Last-Event-ID` seen so far
//! 2. **Validate** - Require a 2xx status and an event-stream content type
//! 3. **Decode** - Split the body into lines and lines into events, whatever
//!    the chunk boundaries
//! 4. **Reconnect** - When the body ends or breaks, wait the retry delay and
//!    connect again
//!
//! ## Key Features
//!
//! - **Incremental decoding**: `\n`, `\r\n` and bare `\r` line endings,
//!   multi-byte UTF-8 split across chunks, leading BOM
//! - **Resumption**: `id:` fields are replayed as `Last-Event-ID`; `retry:`
//!   replaces the reconnect delay
//! - **Bounded retries**: a per-cycle budget of connect attempts
//! - **Terminal responses**:
//!   - `204 No Content` - Server asked the client to stop
//!   - Non-2xx status - Handshake rejected, not retried
//!   - Wrong `Content-Type` - Handshake rejected, not retried
//! - **Cooperative close**: from the consumer, a hook, or another task
//!
//! ## Usage
//!
//! ```no_run
//! use sse_client::EventSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut source = EventSource::connect("http://localhost:8080/events").await?;
//!
//!     while let Some(result) = source.next().await {
//!         match result {
//!             Ok(event) => println!("[{}] {}", event.event_type, event.data),
//!             Err(e) if e.is_connection_error() => {
//!                 eprintln!("Connection lost: {}", e);
//!                 break;
//!             }
//!             Err(e) => return Err(e.into()),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[types]** - Events, connection states and request options
//! - **[error]** - Error types and result handling
//! - **[client]** - Event source, decoder and connection lifecycle
//! - **[protocol]** - Protocol constants and header handling

pub mod client;
pub mod error;
pub mod protocol;
pub mod types;

pub use client::{EventSource, EventSourceBuilder, EventStream};
pub use error::{Result, SseError};
pub use types::{ConnectionState, Event, SseRequest};
