//! Source configuration.

use std::time::Duration;
use url::Url;

/// Default per-request timeout.
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts per RPC call.
pub(crate) const DEFAULT_RETRY_ATTEMPTS: usize = 3;

/// Default delay between retries; backoff grows from here.
pub(crate) const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Configuration for an RPC block source, passed in at construction time.
///
/// Nothing here is read from ambient process state; the CLI resolves
/// environment variables into explicit values before building this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// The primary RPC endpoint.
    pub rpc_url: Url,
    /// An optional fallback endpoint, tried when the primary is unreachable.
    pub fallback_rpc_url: Option<Url>,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Attempts per RPC call before the block is skipped.
    pub retry_attempts: usize,
    /// Initial delay between retries.
    pub retry_delay: Duration,
}

impl SourceConfig {
    /// Creates a config for the given endpoint with default timeout and
    /// retry discipline.
    pub const fn new(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            fallback_rpc_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Sets the fallback endpoint.
    pub fn with_fallback(mut self, url: Url) -> Self {
        self.fallback_rpc_url = Some(url);
        self
    }

    /// Sets the per-request timeout.
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the retry discipline.
    pub const fn with_retries(mut self, attempts: usize, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourceConfig::new("http://localhost:8545".parse().unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert!(config.fallback_rpc_url.is_none());
    }

    #[test]
    fn test_builders() {
        let config = SourceConfig::new("http://localhost:8545".parse().unwrap())
            .with_fallback("http://localhost:8546".parse().unwrap())
            .with_request_timeout(Duration::from_secs(5))
            .with_retries(1, Duration::from_millis(100));
        assert_eq!(config.fallback_rpc_url.unwrap().as_str(), "http://localhost:8546/");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.retry_attempts, 1);
    }
}
