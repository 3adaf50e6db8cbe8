//! The `EventSource` facade.
//!
//! An [`EventSource`] is one logical event stream: a lazy, single-pass
//! sequence of [`Event`]s read from as many physical connections as it takes.
//!
//! # Examples
//!
//! ## Reading events
//!
//! ```no_run
//! use sse_client::{EventSource, SseError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SseError> {
//!     let mut source = EventSource::connect("https://stream.example.org/v2/stream").await?;
//!
//!     while let Some(result) = source.next().await {
//!         match result {
//!             Ok(event) => println!("{}: {}", event.event_type, event.data),
//!             Err(e) if e.is_connection_error() => break,
//!             Err(e) => return Err(e),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Configuring the request
//!
//! ```no_run
//! use sse_client::EventSource;
//! use std::time::Duration;
//!
//! # async fn example() -> sse_client::Result<()> {
//! let mut source = EventSource::builder("https://api.example.com/events")
//!     .method("POST")
//!     .header("authorization", "Bearer token")
//!     .body(r#"{"topic":"prices"}"#)
//!     .last_event_id("1041")
//!     .timeout(Duration::from_secs(30))
//!     .max_retries(None)
//!     .connect()
//!     .await?;
//!
//! if let Some(Ok(event)) = source.next().await {
//!     println!("{event:?}");
//! }
//! source.close();
//! # Ok(())
//! # }
//! ```

use super::config::ClientConfig;
use super::connection::{CloseHandle, ConnectionManager};
use super::observer::ConnectionObserver;
use super::stream::EventStream;
use super::transport::{ReqwestTransport, Transport};
use crate::error::Result;
use crate::types::{ConnectionState, Event, SseRequest};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

/// A Server-Sent Events client for one URL.
///
/// # Lifecycle
///
/// 1. Created idle by [`EventSourceBuilder::build`], or opened right away by
///    [`EventSource::connect`] / [`EventSourceBuilder::connect`]
/// 2. Yields events from [`next()`](EventSource::next), reconnecting
///    transparently when the server closes the stream
/// 3. Ends when closed, when the server answers 204, or on a terminal error
///
/// Dropping an `EventSource` closes it and releases its connection.
pub struct EventSource {
    manager: ConnectionManager,
}

impl EventSource {
    /// Start configuring an event source for `url`.
    pub fn builder(url: impl Into<String>) -> EventSourceBuilder {
        EventSourceBuilder::new(url)
    }

    /// Connect to `url` with default settings.
    ///
    /// # Errors
    ///
    /// See [`EventSource::open`].
    pub async fn connect(url: impl Into<String>) -> Result<Self> {
        Self::builder(url).connect().await
    }

    /// Open the first connection. Does nothing if already opened or closed.
    ///
    /// # Errors
    ///
    /// - [`SseError::InvalidStatusCode`](crate::SseError::InvalidStatusCode)
    ///   if the server answers with a non-2xx status
    /// - [`SseError::InvalidContentType`](crate::SseError::InvalidContentType)
    ///   if the response is not `text/event-stream`
    /// - [`SseError::ConnectionFailed`](crate::SseError::ConnectionFailed) if
    ///   every connect attempt failed
    pub async fn open(&mut self) -> Result<()> {
        self.manager.open().await
    }

    /// Receive the next event.
    ///
    /// Opens the stream first if needed. Returns `None` once the stream is
    /// closed, `Some(Err(_))` once for the error that closed it.
    pub async fn next(&mut self) -> Option<Result<Event>> {
        self.manager.next_event().await.transpose()
    }

    /// Close the stream. Idempotent; later calls to `next()` return `None`.
    pub fn close(&mut self) {
        self.manager.close();
    }

    /// Handle that closes this event source from a callback or another task.
    pub fn close_handle(&self) -> CloseHandle {
        self.manager.close_handle()
    }

    /// Turn the event source into a [`Stream`](futures::Stream).
    pub fn into_stream(self) -> EventStream {
        EventStream::new(self)
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        self.manager.url()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Id that will be sent as `Last-Event-ID` on the next connect.
    pub fn last_event_id(&self) -> &str {
        self.manager.last_event_id()
    }

    /// Wait before the next reconnect.
    pub fn retry_delay(&self) -> Duration {
        self.manager.retry_delay()
    }

    /// Origin of the response events are read from.
    pub fn origin(&self) -> Option<&str> {
        self.manager.origin()
    }
}

/// Builder for [`EventSource`].
pub struct EventSourceBuilder {
    url: String,
    request: SseRequest,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    observer: Option<Arc<dyn ConnectionObserver>>,
}

impl EventSourceBuilder {
    /// Create a builder with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        EventSourceBuilder {
            url: url.into(),
            request: SseRequest::new(),
            config: ClientConfig::default(),
            transport: None,
            observer: None,
        }
    }

    /// HTTP method, `GET` by default.
    pub fn method(mut self, method: &str) -> Self {
        self.request = self.request.with_method(method);
        self
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.with_header(name, value);
        self
    }

    /// Request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request = self.request.with_body(body);
        self
    }

    /// Initial `Last-Event-ID`.
    pub fn last_event_id(mut self, id: impl Into<String>) -> Self {
        self.request = self.request.with_last_event_id(id);
        self
    }

    /// Replace all request options at once.
    pub fn request(mut self, request: SseRequest) -> Self {
        self.request = request;
        self
    }

    /// Bound on receiving the response head and on each body read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_ms = Some(saturating_millis(timeout));
        self
    }

    /// Connect retries per (re)connect cycle; `None` for unlimited.
    pub fn max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Initial reconnect delay.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay_ms = saturating_millis(delay);
        self
    }

    /// Replace the whole client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom transport instead of the default `reqwest` one.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Share a transport between several event sources.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Attach lifecycle hooks.
    pub fn observer(mut self, observer: impl ConnectionObserver) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Build an idle event source.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL, headers or configuration are invalid.
    pub fn build(self) -> Result<EventSource> {
        self.config.validate()?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.config)?),
        };

        let manager = ConnectionManager::new(
            self.url,
            self.request,
            Arc::new(self.config),
            transport,
            self.observer,
        )?;

        Ok(EventSource { manager })
    }

    /// Build the event source and open it.
    ///
    /// # Errors
    ///
    /// Configuration errors, then anything [`EventSource::open`] returns.
    pub async fn connect(self) -> Result<EventSource> {
        let mut source = self.build()?;
        source.open().await?;
        Ok(source)
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
