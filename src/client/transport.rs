//! HTTP transport seam.
//!
//! The event-stream client never talks to the network directly. It hands a
//! [`TransportRequest`] to a [`Transport`] and reads the body of the returned
//! [`TransportResponse`] chunk by chunk. Dropping the body stream releases the
//! underlying connection, which is also how an in-flight read is aborted.
//!
//! [`ReqwestTransport`] is the default implementation. Anything else (a
//! pre-configured client, a test double) can be plugged in through
//! [`EventSourceBuilder::transport`](super::EventSourceBuilder::transport).

use crate::client::config::ClientConfig;
use crate::error::{Result, SseError};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use http::{HeaderMap, Method};
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

/// Body of a streaming response.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A request as sent to the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Target URL.
    pub url: String,
    /// Complete request headers, protocol headers included.
    pub headers: HeaderMap,
    /// Optional body.
    pub body: Option<Bytes>,
    /// Bound on receiving the response head.
    pub timeout: Option<Duration>,
}

/// A response whose body has not been read yet.
pub struct TransportResponse {
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Final URL after redirects.
    pub url: String,
    /// Lazily read body.
    pub body: ByteStream,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Opens streaming HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return once the response head has arrived.
    ///
    /// # Errors
    ///
    /// Network-level failures should be reported as
    /// [`SseError::Http`](crate::SseError::Http) or
    /// [`SseError::Timeout`](crate::SseError::Timeout) so that they are
    /// retried.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport from the client configuration.
    ///
    /// No overall request timeout is set on the client: it would cut long-lived
    /// streams. Timeouts are applied per send and per body read instead.
    ///
    /// # Errors
    ///
    /// Returns [`SseError::Config`] if `reqwest` rejects the proxy or fails to
    /// build the client.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(timeout) = config.request_timeout() {
            builder = builder.connect_timeout(timeout);
        }

        if !config.proxy_url.is_empty() {
            let proxy = reqwest::Proxy::all(&config.proxy_url)
                .map_err(|e| SseError::Config(format!("invalid proxy {:?}: {e}", config.proxy_url)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| SseError::Config(format!("failed to build http client: {e}")))?;

        Ok(ReqwestTransport { client })
    }

    /// Wrap an existing client, sharing its connection pool.
    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut req_builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send().await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let url = response.url().to_string();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(SseError::from))
            .boxed();

        Ok(TransportResponse {
            status,
            headers,
            url,
            body,
        })
    }
}
