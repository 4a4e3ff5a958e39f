//! Fixed-interval retrying HTTP fetcher shared by every pipeline stage.
//!
//! [`RetryingFetcher`] issues a GET and returns whatever response the
//! transport produced, retrying only transport-level failures (DNS,
//! connect, timeout). HTTP error statuses are *not* inspected here: any
//! response object counts as success and is handed back to the caller.
//! Backoff is a constant interval with no jitter - a deliberate tradeoff
//! for a low-traffic single-user tool where predictability beats
//! sophistication.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

/// Default maximum fetch attempts, counted from 1.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default wait between failed attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 60;

/// A transport-level failure: the request never produced a response.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<reqwest::Error>,
}

impl TransportError {
    /// Creates a transport error from a bare message (used by test stubs).
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(source: reqwest::Error) -> Self {
        Self {
            message: source.to_string(),
            source: Some(source),
        }
    }
}

/// Errors surfaced by [`RetryingFetcher`].
///
/// Transport failures inside the retry budget are logged and absorbed;
/// only exhaustion escapes, as a distinct kind the caller must treat as
/// fatal for that URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP client construction failed.
    #[error("could not build HTTP client: {source}")]
    Client {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// Every attempt failed at the transport level.
    #[error("retries exhausted fetching {url} after {attempts} attempts")]
    RetriesExhausted {
        /// The URL that never produced a response.
        url: String,
        /// How many attempts were made.
        attempts: u32,
        /// The failure from the final attempt.
        #[source]
        source: TransportError,
    },
}

/// Fixed-interval retry settings.
///
/// Unlike exponential schemes, every wait is the same `delay`; the only
/// knobs are the attempt budget and that constant interval.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Returns the attempt budget (including the initial attempt).
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the constant wait between failed attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// The raw GET seam beneath the retry loop.
///
/// Production code uses [`HttpTransport`]; tests substitute scripted
/// stubs. `async_trait` keeps the trait object-safe for `Arc<dyn
/// Transport>` dispatch.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues one GET for `url`, returning the response or the
    /// transport failure that prevented one.
    async fn get(&self, url: &str) -> Result<reqwest::Response, TransportError>;
}

/// Real transport backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds the client with project-wide timeout and user-agent policy.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when client construction fails.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .user_agent(concat!("steamshots/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .map_err(|source| FetchError::Client { source })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<reqwest::Response, TransportError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(TransportError::from)
    }
}

/// GET with fixed-count, fixed-interval retry on transport failure.
#[derive(Clone)]
pub struct RetryingFetcher {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for RetryingFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingFetcher")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetryingFetcher {
    /// Creates a fetcher over the real HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when client construction fails.
    pub fn new(policy: RetryPolicy) -> Result<Self, FetchError> {
        Ok(Self {
            transport: Arc::new(HttpTransport::new()?),
            policy,
        })
    }

    /// Creates a fetcher over a caller-supplied transport (tests).
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Fetches `url`, retrying transport failures up to the policy's
    /// attempt budget with a constant wait between attempts.
    ///
    /// The first response the transport returns wins, whatever its HTTP
    /// status. Each failed attempt logs a warning with its number.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RetriesExhausted`] when every attempt fails.
    pub async fn fetch(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let mut last_error: Option<TransportError> = None;
        for attempt in 1..=self.policy.max_attempts() {
            match self.transport.get(url).await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    warn!(url, attempt, error = %error, "web request error");
                    last_error = Some(error);
                    tokio::time::sleep(self.policy.delay()).await;
                }
            }
        }
        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.policy.max_attempts(),
            source: last_error
                .unwrap_or_else(|| TransportError::new("no attempt produced an error")),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    /// Fails the first `failures` calls, then returns 200 responses.
    struct FlakyTransport {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyTransport {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn get(&self, _url: &str) -> Result<reqwest::Response, TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(TransportError::new(format!("simulated failure {call}")));
            }
            let inner = http::Response::builder()
                .status(200)
                .body(format!("response from call {call}"))
                .unwrap();
            Ok(reqwest::Response::from(inner))
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[test]
    fn test_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 10);
        assert_eq!(policy.delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_policy_clamps_attempts_to_one() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_fetch_returns_fourth_result_after_three_failures() {
        let transport = Arc::new(FlakyTransport::new(3));
        let fetcher = RetryingFetcher::with_transport(transport.clone(), fast_policy(10));

        let response = fetcher.fetch("http://example.test/page").await.unwrap();
        assert_eq!(transport.calls(), 4);
        assert_eq!(
            response.text().await.unwrap(),
            "response from call 4"
        );
    }

    #[tokio::test]
    async fn test_fetch_exhausts_after_exactly_max_attempts() {
        let transport = Arc::new(FlakyTransport::new(u32::MAX));
        let fetcher = RetryingFetcher::with_transport(transport.clone(), fast_policy(5));

        let error = fetcher.fetch("http://example.test/page").await.unwrap_err();
        assert_eq!(transport.calls(), 5);
        match error {
            FetchError::RetriesExhausted { url, attempts, .. } => {
                assert_eq!(url, "http://example.test/page");
                assert_eq!(attempts, 5);
            }
            other => panic!("expected RetriesExhausted, got: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_error_status_still_counts_as_success() {
        struct ServerErrorTransport;

        #[async_trait]
        impl Transport for ServerErrorTransport {
            async fn get(&self, _url: &str) -> Result<reqwest::Response, TransportError> {
                let inner = http::Response::builder()
                    .status(503)
                    .body(String::new())
                    .unwrap();
                Ok(reqwest::Response::from(inner))
            }
        }

        let fetcher =
            RetryingFetcher::with_transport(Arc::new(ServerErrorTransport), fast_policy(3));
        let response = fetcher.fetch("http://example.test/down").await.unwrap();
        assert_eq!(response.status().as_u16(), 503);
    }

    #[test]
    fn test_exhausted_error_display_names_url_and_attempts() {
        let error = FetchError::RetriesExhausted {
            url: "http://example.test/x".to_string(),
            attempts: 10,
            source: TransportError::new("connection refused"),
        };
        let msg = error.to_string();
        assert!(msg.contains("http://example.test/x"), "missing URL: {msg}");
        assert!(msg.contains("10"), "missing attempt count: {msg}");
    }
}
