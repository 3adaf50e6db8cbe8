//! Event decoder for `text/event-stream` lines.
//!
//! Line-at-a-time, accumulate-then-dispatch decoder for server-sent events.
//! Lines come from a [`LineSplitter`](super::LineSplitter); completed events
//! are returned as soon as the blank line that ends them is decoded.
//!
//! # Line Rules
//!
//! | Line | Effect |
//! |------|--------|
//! | empty | Dispatch the accumulated event, if anything was accumulated |
//! | `:...` | Comment, ignored |
//! | `name:value` | Field; one leading space of `value` is stripped |
//! | `name` | Field with an empty value |
//!
//! | Field | Effect |
//! |-------|--------|
//! | `event` | Set the event type |
//! | `data` | Append a data line |
//! | `id` | Set the id and the stream's last event id, unless it contains NUL |
//! | `retry` | Set the retry delay, if the value is all ASCII digits |
//! | other | Ignored |
//!
//! Malformed input never fails: anything not understood is skipped.
//!
//! # Examples
//!
//! ```
//! use sse_client::client::{EventDecoder, ReconnectState};
//! use std::time::Duration;
//!
//! let mut state = ReconnectState::new("", Duration::from_secs(5));
//! let mut decoder = EventDecoder::new();
//!
//! assert!(decoder.decode_line("data: a", &mut state).is_none());
//! assert!(decoder.decode_line("data: b", &mut state).is_none());
//! let event = decoder.decode_line("", &mut state).unwrap();
//!
//! assert_eq!(event.event_type, "message");
//! assert_eq!(event.data, "a\nb");
//! ```

use crate::protocol::{self, constants::fields, constants::DEFAULT_EVENT_TYPE};
use crate::types::Event;
use std::time::Duration;
use tracing::warn;

/// Stream state that outlives a single connection.
///
/// Owned by the connection manager and lent to the decoder for every line,
/// so that ids and retry delays carry over to the next reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectState {
    /// Sent as `Last-Event-ID` on every connect when non-empty.
    pub last_event_id: String,
    /// Wait before the next reconnect attempt.
    pub retry_delay: Duration,
}

impl ReconnectState {
    /// Create the state from the caller's initial values.
    pub fn new(last_event_id: impl Into<String>, retry_delay: Duration) -> Self {
        ReconnectState {
            last_event_id: last_event_id.into(),
            retry_delay,
        }
    }
}

/// Accumulates fields until a blank line dispatches them as an [`Event`].
#[derive(Debug, Default)]
pub struct EventDecoder {
    event_type: Option<String>,
    data: Vec<String>,
    id: Option<String>,
    retry: Option<u64>,
    quiet: bool,
}

impl EventDecoder {
    /// Create a decoder with an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder that logs ignored field values only if `enabled`.
    pub fn with_logging(enabled: bool) -> Self {
        EventDecoder {
            quiet: !enabled,
            ..Self::default()
        }
    }

    /// Decode one line, returning the event it dispatches, if any.
    pub fn decode_line(&mut self, line: &str, state: &mut ReconnectState) -> Option<Event> {
        if line.is_empty() {
            return self.dispatch(state);
        }
        if line.starts_with(':') {
            return None;
        }

        let (name, value) = match line.split_once(':') {
            Some((name, value)) => (name, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        self.process_field(name, value, state);

        None
    }

    /// Decode a batch of lines, returning every event they dispatch.
    pub fn decode_lines<I, S>(&mut self, lines: I, state: &mut ReconnectState) -> Vec<Event>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .filter_map(|line| self.decode_line(line.as_ref(), state))
            .collect()
    }

    /// Whether any field has been accumulated since the last dispatch.
    pub fn has_pending(&self) -> bool {
        self.event_type.is_some() || !self.data.is_empty() || self.id.is_some() || self.retry.is_some()
    }

    fn process_field(&mut self, name: &str, value: &str, state: &mut ReconnectState) {
        match name {
            fields::EVENT => self.event_type = Some(value.to_string()),
            fields::DATA => self.data.push(value.to_string()),
            fields::ID => {
                if protocol::is_valid_event_id(value) {
                    self.id = Some(value.to_string());
                    state.last_event_id = value.to_string();
                }
            }
            fields::RETRY => match protocol::parse_retry(value) {
                Some(ms) => {
                    self.retry = Some(ms);
                    state.retry_delay = Duration::from_millis(ms);
                }
                None if !self.quiet => warn!(value, "Received invalid retry value, ignoring it"),
                None => {}
            },
            _ => {}
        }
    }

    fn dispatch(&mut self, state: &ReconnectState) -> Option<Event> {
        if !self.has_pending() {
            return None;
        }

        Some(Event {
            event_type: self
                .event_type
                .take()
                .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
            data: std::mem::take(&mut self.data).join("\n"),
            id: self.id.take(),
            retry: self.retry.take(),
            last_event_id: state.last_event_id.clone(),
            origin: None,
        })
    }
}
