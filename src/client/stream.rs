//! `Stream` adapter for [`EventSource`].
//!
//! # Examples
//!
//! ```no_run
//! use futures::StreamExt;
//! use sse_client::EventSource;
//!
//! # async fn example() -> sse_client::Result<()> {
//! let source = EventSource::connect("http://localhost:8080/events").await?;
//!
//! let pings: Vec<_> = source
//!     .into_stream()
//!     .filter_map(|result| async move { result.ok() })
//!     .filter(|event| futures::future::ready(event.event_type == "ping"))
//!     .take(3)
//!     .collect()
//!     .await;
//! # Ok(())
//! # }
//! ```

use super::connection::CloseHandle;
use super::event_source::EventSource;
use crate::error::Result;
use crate::types::Event;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// An [`EventSource`] viewed as a `Stream` of events.
///
/// The stream ends when the event source closes. Dropping the stream drops
/// the event source and releases its connection.
pub struct EventStream {
    inner: Pin<Box<dyn Stream<Item = Result<Event>> + Send>>,
    close: CloseHandle,
}

impl EventStream {
    pub(crate) fn new(source: EventSource) -> Self {
        let close = source.close_handle();
        let inner = futures::stream::unfold(source, |mut source| async move {
            let item = source.next().await?;
            Some((item, source))
        });

        EventStream {
            inner: Box::pin(inner),
            close,
        }
    }

    /// Handle that ends this stream from elsewhere.
    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    /// End the stream; the next poll yields `None`.
    pub fn close(&self) {
        self.close.close();
    }
}

impl Stream for EventStream {
    type Item = Result<Event>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
