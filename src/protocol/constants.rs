//! Constants of the event-stream wire protocol.

/// Media type of an event stream.
pub const EVENT_STREAM: &str = "text/event-stream";

/// Event type used when a message carries no `event` field.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// Initial reconnection delay in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5_000;

/// Connect retries allowed per (re)connect cycle.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// HTTP header names used by the protocol.
pub mod headers {
    use http::header::HeaderName;

    /// `Accept`
    pub const ACCEPT: HeaderName = http::header::ACCEPT;
    /// `Cache-Control`
    pub const CACHE_CONTROL: HeaderName = http::header::CACHE_CONTROL;
    /// `Content-Type`
    pub const CONTENT_TYPE: HeaderName = http::header::CONTENT_TYPE;
    /// `Last-Event-ID`
    pub const LAST_EVENT_ID: HeaderName = HeaderName::from_static("last-event-id");
}

/// Field names recognised by the decoder.
pub mod fields {
    /// Sets the event type.
    pub const EVENT: &str = "event";
    /// Appends a data line.
    pub const DATA: &str = "data";
    /// Sets the event id.
    pub const ID: &str = "id";
    /// Sets the reconnection delay.
    pub const RETRY: &str = "retry";
}
