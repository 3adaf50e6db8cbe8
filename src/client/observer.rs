//! Connection lifecycle hooks.

use crate::error::SseError;
use crate::types::Event;

/// Observes an [`EventSource`](super::EventSource) as it connects, receives
/// and reconnects.
///
/// Every method has a no-op default, so implementors only override what they
/// need. Hooks run inline on the task that drives the event source; they should
/// return quickly. To stop the stream from a hook, keep a
/// [`CloseHandle`](super::CloseHandle) in the observer and call
/// [`close`](super::CloseHandle::close) on it.
///
/// ```
/// use sse_client::client::{CloseHandle, ConnectionObserver};
/// use sse_client::Event;
///
/// struct StopAfterDone {
///     handle: CloseHandle,
/// }
///
/// impl ConnectionObserver for StopAfterDone {
///     fn on_message(&self, event: &Event) {
///         if event.data == "done" {
///             self.handle.close();
///         }
///     }
/// }
/// ```
pub trait ConnectionObserver: Send + Sync + 'static {
    /// A connection was established (or re-established).
    fn on_open(&self) {}

    /// An event of type `"message"` was decoded.
    fn on_message(&self, _event: &Event) {}

    /// An open connection ended or broke; a reconnect follows.
    fn on_disconnect(&self) {}

    /// A connect attempt or a body read failed.
    fn on_error(&self, _error: &SseError) {}
}
