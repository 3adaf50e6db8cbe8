//! Client configuration.

use crate::error::{Result, SseError};
use crate::protocol::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS};
use std::time::Duration;

/// Connection and retry settings shared by every connect attempt of an
/// [`EventSource`](super::EventSource).
///
/// ```
/// use sse_client::client::ClientConfig;
///
/// let config = ClientConfig {
///     retry_delay_ms: 1000,
///     max_retries: None,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Initial wait before a reconnect, until the server sends `retry:`.
    pub retry_delay_ms: u64,
    /// Connect retries allowed per (re)connect cycle; `None` is unlimited.
    pub max_retries: Option<u32>,
    /// Bound on receiving the response head and on each body read.
    pub request_timeout_ms: Option<u64>,
    /// Proxy for the default transport; empty for none.
    pub proxy_url: String,
    /// Emit `tracing` records for connection lifecycle events.
    pub enable_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_retries: Some(DEFAULT_MAX_RETRIES),
            request_timeout_ms: None,
            proxy_url: String::new(),
            enable_logging: true,
        }
    }
}

impl ClientConfig {
    /// Initial retry delay.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Whether another connect attempt is allowed after `failures` failures.
    pub fn allows_retry(&self, failures: u32) -> bool {
        self.max_retries.map_or(true, |max| failures <= max)
    }

    /// Check the configuration for unusable values.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == Some(0) {
            return Err(SseError::Config("request timeout must be positive".into()));
        }
        if !self.proxy_url.is_empty() {
            url::Url::parse(&self.proxy_url)
                .map_err(|e| SseError::Config(format!("invalid proxy url: {e}")))?;
        }
        Ok(())
    }
}
