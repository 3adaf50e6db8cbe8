//! End-to-end tests against a local mock HTTP server.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::{HeaderMap, HeaderValue};
use mockito::{Matcher, Server};
use sse_client::client::{
    CloseHandle, ConnectionObserver, Transport, TransportRequest, TransportResponse,
};
use sse_client::{ConnectionState, Event, EventSource, SseError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const EVENT_STREAM: &str = "text/event-stream";

#[tokio::test]
async fn test_event_then_resume_with_last_event_id() {
    let mut server = Server::new_async().await;

    let first = server
        .mock("GET", "/events")
        .match_header("accept", EVENT_STREAM)
        .match_header("cache-control", "no-cache")
        .match_header("last-event-id", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", EVENT_STREAM)
        .with_body("retry: 10\nid: 1\nevent: ping\ndata: hello\n\n")
        .create_async()
        .await;
    let resumed = server
        .mock("GET", "/events")
        .match_header("last-event-id", "1")
        .with_status(204)
        .create_async()
        .await;

    let mut source = EventSource::builder(format!("{}/events", server.url()))
        .build()
        .unwrap();

    let event = source.next().await.unwrap().unwrap();
    assert_eq!(event.event_type, "ping");
    assert_eq!(event.data, "hello");
    assert_eq!(event.id.as_deref(), Some("1"));
    assert_eq!(event.last_event_id, "1");
    assert_eq!(event.origin.as_deref(), Some(server.url().as_str()));
    assert_eq!(source.retry_delay(), Duration::from_millis(10));

    assert!(source.next().await.is_none());
    assert_eq!(source.state(), ConnectionState::Closed);

    first.assert_async().await;
    resumed.assert_async().await;
}

#[tokio::test]
async fn test_not_found_is_terminal() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let mut source = EventSource::builder(format!("{}/missing", server.url()))
        .retry_delay(Duration::from_millis(1))
        .build()
        .unwrap();

    let err = assert_err!(source.next().await.unwrap());
    assert!(matches!(err, SseError::InvalidStatusCode { status: 404, .. }));
    assert!(!err.is_retryable());
    assert!(source.next().await.is_none());
    assert_eq!(source.state(), ConnectionState::Closed);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_content_at_open_closes_cleanly() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/events")
        .with_status(204)
        .create_async()
        .await;

    let mut source = assert_ok!(EventSource::connect(format!("{}/events", server.url())).await);

    assert_eq!(source.state(), ConnectionState::Closed);
    assert!(source.next().await.is_none());
}

#[tokio::test]
async fn test_wrong_content_type_is_terminal() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/events")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("data: nope\n\n")
        .expect(1)
        .create_async()
        .await;

    let result = EventSource::connect(format!("{}/events", server.url())).await;
    match result {
        Err(SseError::InvalidContentType { content_type, .. }) => {
            assert_eq!(content_type.as_deref(), Some("text/plain"));
        }
        other => panic!("expected InvalidContentType, got {:?}", other.map(|_| ())),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_content_type_parameters_are_accepted() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/events")
        .with_status(200)
        .with_header("content-type", "Text/Event-Stream; charset=utf-8")
        .with_body("data: ok\n\n")
        .create_async()
        .await;

    let mut source = EventSource::connect(format!("{}/events", server.url()))
        .await
        .unwrap();
    let event = source.next().await.unwrap().unwrap();
    assert_eq!(event.data, "ok");
    source.close();
}

#[tokio::test]
async fn test_post_with_headers_and_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/subscribe")
        .match_header("authorization", "Bearer secret")
        .match_header("accept", EVENT_STREAM)
        .match_header("last-event-id", "41")
        .match_body(Matcher::Json(serde_json::json!({"topic": "prices"})))
        .with_status(200)
        .with_header("content-type", EVENT_STREAM)
        .with_body("data: {\"price\":\ndata: 42}\n\n")
        .create_async()
        .await;

    let mut source = EventSource::builder(format!("{}/subscribe", server.url()))
        .method("POST")
        .header("authorization", "Bearer secret")
        // Overridden by the protocol headers.
        .header("accept", "application/json")
        .body(r#"{"topic":"prices"}"#)
        .last_event_id("41")
        .build()
        .unwrap();

    let event = source.next().await.unwrap().unwrap();
    assert!(event.is_message());
    assert_eq!(event.data, "{\"price\":\n42}");
    let value: serde_json::Value = event.json().unwrap();
    assert_eq!(value["price"], 42);
    assert_eq!(event.last_event_id, "41");

    source.close();
    assert!(source.next().await.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_close_inside_loop_stops_iteration() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/events")
        .with_status(200)
        .with_header("content-type", EVENT_STREAM)
        .with_body("data: 1\n\ndata: 2\n\ndata: 3\n\n")
        .create_async()
        .await;

    let mut source = EventSource::builder(format!("{}/events", server.url()))
        .build()
        .unwrap();

    let mut seen = Vec::new();
    while let Some(result) = source.next().await {
        let event = result.unwrap();
        seen.push(event.data.clone());
        if event.data == "2" {
            source.close();
        }
    }

    assert_eq!(seen, vec!["1", "2"]);
    assert_eq!(source.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_into_stream_with_combinators() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/events")
        .with_status(200)
        .with_header("content-type", EVENT_STREAM)
        .with_body(": comment\n\nevent: ping\ndata: a\n\ndata: b\n\nevent: ping\ndata: c\n\n")
        .create_async()
        .await;

    let source = EventSource::builder(format!("{}/events", server.url()))
        .build()
        .unwrap();

    let pings: Vec<Event> = source
        .into_stream()
        .filter_map(|result| async move { result.ok() })
        .filter(|event| futures::future::ready(event.event_type == "ping"))
        .take(2)
        .collect()
        .await;

    let data: Vec<_> = pings.iter().map(|e| e.data.as_str()).collect();
    assert_eq!(data, vec!["a", "c"]);
}

#[tokio::test]
async fn test_unreachable_server_exhausts_retries() {
    let mut source = EventSource::builder("http://127.0.0.1:1/events")
        .max_retries(Some(2))
        .retry_delay(Duration::from_millis(1))
        .build()
        .unwrap();

    let err = assert_err!(source.next().await.unwrap());
    match err {
        SseError::ConnectionFailed { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected ConnectionFailed, got {other:?}"),
    }
    assert!(source.next().await.is_none());
}

/// Closes the source once it has seen a given number of messages.
#[derive(Clone)]
struct StopAfter {
    limit: usize,
    seen: Arc<AtomicUsize>,
    handle: Arc<Mutex<Option<CloseHandle>>>,
}

impl ConnectionObserver for StopAfter {
    fn on_message(&self, _event: &Event) {
        if self.seen.fetch_add(1, Ordering::SeqCst) + 1 == self.limit {
            if let Some(handle) = self.handle.lock().unwrap().as_ref() {
                handle.close();
            }
        }
    }
}

#[tokio::test]
async fn test_observer_can_close_the_source() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/events")
        .with_status(200)
        .with_header("content-type", EVENT_STREAM)
        .with_body("data: 1\n\ndata: 2\n\ndata: 3\n\n")
        .create_async()
        .await;

    let observer = StopAfter {
        limit: 2,
        seen: Arc::new(AtomicUsize::new(0)),
        handle: Arc::new(Mutex::new(None)),
    };

    let mut source = EventSource::builder(format!("{}/events", server.url()))
        .observer(observer.clone())
        .build()
        .unwrap();
    *observer.handle.lock().unwrap() = Some(source.close_handle());

    while source.next().await.is_some() {}

    assert_eq!(observer.seen.load(Ordering::SeqCst), 2);
    assert_eq!(source.state(), ConnectionState::Closed);
}

/// Counts how many response bodies have been released.
struct ReleaseCounter(Arc<AtomicUsize>);

impl Drop for ReleaseCounter {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Serves one event and then keeps the body open forever.
struct HangingTransport {
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl Transport for HangingTransport {
    async fn send(&self, request: TransportRequest) -> sse_client::Result<TransportResponse> {
        let counter = ReleaseCounter(self.released.clone());
        let body = futures::stream::iter(vec![Ok(Bytes::from_static(b"data: hi\n\n"))])
            .chain(futures::stream::pending())
            .map(move |chunk| {
                let _held = &counter;
                chunk
            })
            .boxed();

        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static(EVENT_STREAM));

        Ok(TransportResponse {
            status: 200,
            headers,
            url: request.url,
            body,
        })
    }
}

#[tokio::test]
async fn test_connection_released_exactly_once() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut source = EventSource::builder("http://stream.test/events")
        .transport(HangingTransport {
            released: released.clone(),
        })
        .build()
        .unwrap();

    let event = source.next().await.unwrap().unwrap();
    assert_eq!(event.data, "hi");
    assert_eq!(event.origin.as_deref(), Some("http://stream.test"));
    assert_eq!(released.load(Ordering::SeqCst), 0);

    source.close();
    assert_eq!(released.load(Ordering::SeqCst), 1);
    source.close();
    drop(source);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_close_handle_unblocks_pending_read() {
    let released = Arc::new(AtomicUsize::new(0));
    let mut source = EventSource::builder("http://stream.test/events")
        .transport(HangingTransport {
            released: released.clone(),
        })
        .build()
        .unwrap();

    assert!(source.next().await.is_some());

    let handle = source.close_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.close();
    });

    let next = tokio::time::timeout(Duration::from_secs(5), source.next())
        .await
        .unwrap();
    assert!(next.is_none());
    assert_eq!(released.load(Ordering::SeqCst), 1);
}
