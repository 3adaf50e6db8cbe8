//! Core types: decoded events, connection state and request options.

use crate::error::{Result, SseError};
use crate::protocol::constants::DEFAULT_EVENT_TYPE;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

/// One decoded server-sent event.
///
/// Events are immutable once dispatched. `data` holds every `data:` line of
/// the event, in arrival order, joined with `\n`.
///
/// # Examples
///
/// ```
/// use sse_client::Event;
///
/// let event = Event::new("ping", "hello");
/// assert_eq!(event.event_type, "ping");
/// assert_eq!(event.data, "hello");
/// assert!(event.id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event type, `"message"` unless the server sent an `event:` field.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Payload.
    pub data: String,
    /// The `id:` field carried by this event, if any.
    pub id: Option<String>,
    /// The `retry:` field carried by this event, in milliseconds.
    pub retry: Option<u64>,
    /// The stream's last event id at the time of dispatch.
    pub last_event_id: String,
    /// `scheme://host[:port]` of the response that produced the event.
    pub origin: Option<String>,
}

impl Event {
    /// Create an event with the given type and data.
    pub fn new(event_type: impl Into<String>, data: impl Into<String>) -> Self {
        Event {
            event_type: event_type.into(),
            data: data.into(),
            id: None,
            retry: None,
            last_event_id: String::new(),
            origin: None,
        }
    }

    /// Create a `"message"` event.
    pub fn message(data: impl Into<String>) -> Self {
        Self::new(DEFAULT_EVENT_TYPE, data)
    }

    /// Whether this is a default `"message"` event.
    pub fn is_message(&self) -> bool {
        self.event_type == DEFAULT_EVENT_TYPE
    }

    /// Deserialize the payload as JSON.
    ///
    /// ```
    /// use sse_client::Event;
    ///
    /// let event = Event::message(r#"{"n": 3}"#);
    /// let value: serde_json::Value = event.json().unwrap();
    /// assert_eq!(value["n"], 3);
    /// ```
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.data)
    }

    pub(crate) fn with_origin(mut self, origin: Option<&str>) -> Self {
        self.origin = origin.map(str::to_string);
        self
    }
}

/// Connection lifecycle state.
///
/// `Closed` is terminal: once reached, no transition leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Created, not yet opened.
    Idle,
    /// Opening a connection, or waiting to retry.
    Connecting,
    /// Receiving events.
    Open,
    /// Closed for good.
    Closed,
}

impl ConnectionState {
    /// Whether events are currently streaming.
    pub fn is_open(self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Whether the state is terminal.
    pub fn is_closed(self) -> bool {
        matches!(self, ConnectionState::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Per-stream request options.
///
/// Built with chainable `with_*` methods.
///
/// ```
/// use sse_client::SseRequest;
///
/// let request = SseRequest::new()
///     .with_method("POST")
///     .with_header("authorization", "Bearer token")
///     .with_body(r#"{"topic":"prices"}"#)
///     .with_last_event_id("41");
///
/// assert_eq!(request.method, http::Method::POST);
/// assert_eq!(request.last_event_id, "41");
/// ```
#[derive(Debug, Clone)]
pub struct SseRequest {
    /// HTTP method, `GET` by default.
    pub method: Method,
    /// Caller headers, sent on every connect. Protocol headers override them.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<Bytes>,
    /// Initial `Last-Event-ID`.
    pub last_event_id: String,
    invalid_method: Option<String>,
}

impl SseRequest {
    /// Create a `GET` request with no extra headers.
    pub fn new() -> Self {
        SseRequest {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            last_event_id: String::new(),
            invalid_method: None,
        }
    }

    /// Set the HTTP method. A name that is not a valid HTTP token is
    /// rejected by [`validate`](Self::validate).
    pub fn with_method(mut self, method: &str) -> Self {
        match Method::from_bytes(method.to_uppercase().as_bytes()) {
            Ok(parsed) => {
                self.method = parsed;
                self.invalid_method = None;
            }
            Err(_) => self.invalid_method = Some(method.to_string()),
        }
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the initial last event id.
    pub fn with_last_event_id(mut self, id: impl Into<String>) -> Self {
        self.last_event_id = id.into();
        self
    }

    /// Encode the caller headers.
    ///
    /// # Errors
    ///
    /// Returns [`SseError::InvalidHeader`] for names or values that are not
    /// valid HTTP.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            map.append(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        Ok(map)
    }

    /// Check that the request can be sent.
    pub fn validate(&self) -> Result<()> {
        if let Some(method) = &self.invalid_method {
            return Err(SseError::Config(format!("invalid http method {method:?}")));
        }
        self.header_map()?;
        if self.last_event_id.contains(['\0', '\r', '\n']) {
            return Err(SseError::Config(format!(
                "last event id {:?} cannot be sent as a header",
                self.last_event_id
            )));
        }
        Ok(())
    }
}

impl Default for SseRequest {
    fn default() -> Self {
        Self::new()
    }
}
