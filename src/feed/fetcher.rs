use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

use crate::util::{validate_feed_url, UrlValidationError};

/// Default deadline for one fetch, covering connect, headers and body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default cap on the response body size.
pub const DEFAULT_MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching a feed document.
///
/// The poll loop treats every variant the same way (skip this cycle, try
/// again on the next tick); the variants exist for logging and tests.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed URL could not be turned into a request
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// The whole exchange exceeded the fetch deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

/// Bounded-time HTTP GET for feed documents.
///
/// Cloning is cheap; the inner `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_size: usize,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl Fetcher {
    /// Creates a fetcher with the default deadline and size cap.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
            max_size: DEFAULT_MAX_FEED_SIZE,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Downloads the full body of `url`.
    ///
    /// One GET, no custom headers, no retries. The deadline covers the whole
    /// exchange, so a server that sends headers and then stalls the body
    /// still times out. On a non-2xx status the body is drained before the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] - URL not parseable or not http(s)
    /// - [`FetchError::Network`] - Connection or TLS errors, including a body
    ///   that ends before its `Content-Length`
    /// - [`FetchError::Timeout`] - Deadline exceeded
    /// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
    /// - [`FetchError::ResponseTooLarge`] - Body exceeded the size cap
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let url = validate_feed_url(url)?;

        tokio::time::timeout(self.timeout, self.fetch_unbounded(url))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }

    async fn fetch_unbounded(&self, url: url::Url) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            drain(response, self.max_size).await;
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        read_limited_bytes(response, self.max_size).await
    }
}

/// Reads and discards a response body so the connection can return to the pool.
///
/// Bodies larger than `limit` are abandoned instead; dropping the stream
/// closes the connection.
async fn drain(response: reqwest::Response, limit: usize) {
    let mut seen = 0usize;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                seen = seen.saturating_add(chunk.len());
                if seen > limit {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Error while draining response body");
                break;
            }
        }
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header. A body shorter than the header
    // is rejected by hyper itself and surfaces as a Network error.
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::with_capacity(expected_length.unwrap_or(0) as usize);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
