//! Connection lifecycle state machine.
//!
//! [`ConnectionManager`] owns everything that lives across reconnects: the
//! [`ConnectionState`], the [`ReconnectState`] (last event id and retry delay)
//! and the currently open response body. It is driven from
//! [`ConnectionManager::next_event`]; nothing runs in the background.
//!
//! ```text
//!   Idle ──open()──► Connecting ──2xx event-stream──► Open
//!                     │   ▲  ▲                          │
//!     transient error │   │  └──── stream end / read ───┘
//!     (budget left)   └───┘        error, after delay
//!
//!   any state ──close() / 204 / bad handshake / budget spent──► Closed
//! ```
//!
//! Each reconnect waits exactly the current retry delay. The delay starts at
//! the configured value and is replaced whenever the server sends `retry:`.

use super::config::ClientConfig;
use super::lines::{LineSplitter, Utf8ChunkDecoder};
use super::observer::ConnectionObserver;
use super::parser::{EventDecoder, ReconnectState};
use super::transport::{ByteStream, Transport, TransportRequest, TransportResponse};
use super::utils;
use crate::error::{Result, SseError};
use crate::protocol;
use crate::types::{ConnectionState, Event, SseRequest};
use bytes::Bytes;
use futures::StreamExt;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Cloneable handle that closes an event source from anywhere.
///
/// Closing is cooperative: the owner notices on its next step, and any
/// in-flight connect, body read or reconnect wait is interrupted immediately.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CloseHandle {
    /// Create an open (not closed) handle.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        CloseHandle { tx: Arc::new(tx) }
    }

    /// Request the close. Idempotent.
    pub fn close(&self) {
        self.tx.send_replace(true);
    }

    /// Whether a close has been requested.
    pub fn is_closed(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once a close has been requested.
    pub async fn closed(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

impl Default for CloseHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-connection decoding pipeline over one response body.
struct ActiveConnection {
    body: ByteStream,
    text: Utf8ChunkDecoder,
    lines: LineSplitter,
    decoder: EventDecoder,
}

impl ActiveConnection {
    fn new(body: ByteStream, logging: bool) -> Self {
        ActiveConnection {
            body,
            text: Utf8ChunkDecoder::new(),
            lines: LineSplitter::new(),
            decoder: EventDecoder::with_logging(logging),
        }
    }
}

/// Drives connect, read and reconnect for one logical event stream.
pub struct ConnectionManager {
    url: String,
    request: SseRequest,
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    observer: Option<Arc<dyn ConnectionObserver>>,
    state: ConnectionState,
    reconnect: ReconnectState,
    active: Option<ActiveConnection>,
    ready: VecDeque<Event>,
    origin: Option<String>,
    close: CloseHandle,
}

impl ConnectionManager {
    /// Create an idle manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL, request or configuration is unusable.
    pub fn new(
        url: impl Into<String>,
        request: SseRequest,
        config: Arc<ClientConfig>,
        transport: Arc<dyn Transport>,
        observer: Option<Arc<dyn ConnectionObserver>>,
    ) -> Result<Self> {
        let url = url.into();
        url::Url::parse(&url).map_err(|e| SseError::Config(format!("invalid url {url:?}: {e}")))?;
        request.validate()?;
        config.validate()?;

        let reconnect = ReconnectState::new(request.last_event_id.clone(), config.retry_delay());

        Ok(ConnectionManager {
            url,
            request,
            config,
            transport,
            observer,
            state: ConnectionState::Idle,
            reconnect,
            active: None,
            ready: VecDeque::new(),
            origin: None,
            close: CloseHandle::new(),
        })
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Id sent as `Last-Event-ID` on the next connect.
    pub fn last_event_id(&self) -> &str {
        &self.reconnect.last_event_id
    }

    /// Wait before the next reconnect.
    pub fn retry_delay(&self) -> Duration {
        self.reconnect.retry_delay
    }

    /// Origin of the current (or last) response.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Handle that closes this manager from elsewhere.
    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    /// Open the first connection.
    ///
    /// Does nothing unless the manager is idle. Returns `Ok` without
    /// connecting if the server answers 204 or the manager is closed
    /// meanwhile.
    ///
    /// # Errors
    ///
    /// Handshake errors, non-retryable transport errors, and
    /// [`SseError::ConnectionFailed`] once the retry budget is spent. The
    /// manager is closed in every error case.
    pub async fn open(&mut self) -> Result<()> {
        if self.state != ConnectionState::Idle {
            return Ok(());
        }
        self.state = ConnectionState::Connecting;
        self.connect().await
    }

    /// Pull the next event, connecting and reconnecting as needed.
    ///
    /// Returns `Ok(None)` once the manager is closed.
    pub async fn next_event(&mut self) -> Result<Option<Event>> {
        loop {
            if self.close.is_closed() {
                self.close();
            }

            match self.state {
                ConnectionState::Closed => return Ok(None),
                ConnectionState::Idle => {
                    self.open().await?;
                    continue;
                }
                ConnectionState::Connecting | ConnectionState::Open => {}
            }

            if let Some(event) = self.ready.pop_front() {
                return Ok(Some(event));
            }

            if self.active.is_none() {
                self.reconnect().await?;
                continue;
            }

            let read = self
                .read_chunk()
                .await
                .and_then(|chunk| chunk.map(|c| self.feed(&c)).transpose());

            // Events queued before the body ended are delivered before the
            // reconnect starts.
            match read {
                Ok(Some(())) => {}
                Ok(None) => {
                    if self.config.enable_logging && !self.close.is_closed() {
                        info!(url = %self.url, "SSE stream ended by server");
                    }
                    self.active = None;
                }
                Err(err) => {
                    if self.config.enable_logging {
                        warn!(url = %self.url, error = %err, "SSE stream read failed");
                    }
                    self.notify(|o| o.on_error(&err));
                    self.active = None;
                }
            }
        }
    }

    /// Close and release the connection. Idempotent.
    pub fn close(&mut self) {
        self.close.close();
        self.ready.clear();

        if self.active.take().is_some() && self.config.enable_logging {
            debug!(url = %self.url, "SSE connection released");
        }
        if self.state != ConnectionState::Closed {
            self.state = ConnectionState::Closed;
            if self.config.enable_logging {
                debug!(url = %self.url, "SSE closed");
            }
        }
    }

    /// Connect, retrying transient failures within the budget.
    async fn connect(&mut self) -> Result<()> {
        let mut failures: u32 = 0;

        loop {
            if self.close.is_closed() {
                self.close();
                return Ok(());
            }
            self.state = ConnectionState::Connecting;

            let request = match self.build_request() {
                Ok(request) => request,
                Err(err) => {
                    self.close();
                    return Err(err);
                }
            };

            if self.config.enable_logging {
                debug!(url = %self.url, attempt = failures + 1, "SSE connecting");
            }

            let timeout = self.config.request_timeout();
            let sent = tokio::select! {
                biased;
                _ = self.close.closed() => None,
                res = with_timeout(timeout, self.transport.send(request)) => Some(res.and_then(|r| r)),
            };

            match sent {
                None => {
                    self.close();
                    return Ok(());
                }
                Some(Ok(response)) => return self.accept(response),
                Some(Err(err)) if err.is_retryable() => {
                    failures += 1;
                    self.notify(|o| o.on_error(&err));

                    if !self.config.allows_retry(failures) {
                        if self.config.enable_logging {
                            error!(url = %self.url, attempts = failures, error = %err, "SSE connect retries exhausted");
                        }
                        self.close();
                        return Err(SseError::ConnectionFailed {
                            attempts: failures,
                            source: Box::new(err),
                        });
                    }

                    if self.config.enable_logging {
                        warn!(
                            url = %self.url,
                            attempt = failures,
                            delay_ms = self.reconnect.retry_delay.as_millis() as u64,
                            error = %err,
                            "SSE connect failed, retrying after delay"
                        );
                    }
                    self.wait_retry_delay().await;
                }
                Some(Err(err)) => {
                    self.notify(|o| o.on_error(&err));
                    self.close();
                    return Err(err);
                }
            }
        }
    }

    /// Validate the response head and start streaming its body.
    fn accept(&mut self, response: TransportResponse) -> Result<()> {
        let status = response.status;

        if utils::is_stop_status(status) {
            if self.config.enable_logging {
                info!(url = %self.url, "SSE server answered 204, not reconnecting");
            }
            self.close();
            return Ok(());
        }

        if !utils::is_success_status(status) {
            return self.fail_handshake(SseError::InvalidStatusCode {
                status,
                url: self.url.clone(),
            });
        }

        let content_type = protocol::content_type_of(&response.headers);
        if !content_type
            .as_deref()
            .is_some_and(protocol::is_event_stream_content_type)
        {
            return self.fail_handshake(SseError::InvalidContentType {
                content_type,
                url: self.url.clone(),
            });
        }

        self.origin = utils::origin_of(&response.url);
        self.active = Some(ActiveConnection::new(response.body, self.config.enable_logging));
        self.state = ConnectionState::Open;

        if self.config.enable_logging {
            info!(url = %self.url, status, "SSE connection established");
        }
        self.notify(|o| o.on_open());

        Ok(())
    }

    fn fail_handshake(&mut self, err: SseError) -> Result<()> {
        if self.config.enable_logging {
            error!(url = %self.url, error = %err, "SSE handshake rejected");
        }
        self.notify(|o| o.on_error(&err));
        self.close();
        Err(err)
    }

    /// Drop the current body, wait the retry delay, and connect again.
    async fn reconnect(&mut self) -> Result<()> {
        self.active = None;

        if self.close.is_closed() || self.state.is_closed() {
            self.close();
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        self.notify(|o| o.on_disconnect());

        if self.config.enable_logging {
            warn!(
                url = %self.url,
                delay_ms = self.reconnect.retry_delay.as_millis() as u64,
                last_event_id = %self.reconnect.last_event_id,
                "SSE reconnecting after delay"
            );
        }
        self.wait_retry_delay().await;

        self.connect().await
    }

    async fn wait_retry_delay(&mut self) {
        let delay = self.reconnect.retry_delay;
        let close = self.close.clone();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = close.closed() => {}
        }
    }

    /// Read one body chunk. `Ok(None)` means the body ended or a close was
    /// requested.
    async fn read_chunk(&mut self) -> Result<Option<Bytes>> {
        let close = self.close.clone();
        let timeout = self.config.request_timeout();
        let Some(active) = self.active.as_mut() else {
            return Ok(None);
        };

        tokio::select! {
            biased;
            _ = close.closed() => Ok(None),
            item = with_timeout(timeout, active.body.next()) => item?.transpose(),
        }
    }

    /// Push a chunk through the decoding pipeline, queueing the events it
    /// completes.
    fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };

        let text = active.text.decode(chunk)?;
        for line in active.lines.feed(&text) {
            if self.close.is_closed() {
                break;
            }
            let Some(event) = active.decoder.decode_line(&line, &mut self.reconnect) else {
                continue;
            };
            let event = event.with_origin(self.origin.as_deref());

            if self.config.enable_logging {
                debug!(event_type = %event.event_type, id = ?event.id, "SSE event received");
            }
            if event.is_message() {
                if let Some(observer) = &self.observer {
                    observer.on_message(&event);
                }
            }
            self.ready.push_back(event);
        }

        active.text.check()
    }

    fn build_request(&self) -> Result<TransportRequest> {
        let mut headers = self.request.header_map()?;
        protocol::apply_protocol_headers(&mut headers, &self.reconnect.last_event_id)?;

        Ok(TransportRequest {
            method: self.request.method.clone(),
            url: self.url.clone(),
            headers,
            body: self.request.body.clone(),
            timeout: self.config.request_timeout(),
        })
    }

    fn notify(&self, hook: impl FnOnce(&dyn ConnectionObserver)) {
        if let Some(observer) = &self.observer {
            hook(observer.as_ref());
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

async fn with_timeout<F: Future>(limit: Option<Duration>, fut: F) -> Result<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| SseError::Timeout(limit)),
        None => Ok(fut.await),
    }
}
