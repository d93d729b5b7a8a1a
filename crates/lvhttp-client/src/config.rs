//! Connection settings for [`HttpClient`](crate::HttpClient).
//!
//! Everything here is plain data. [`ReqwestBackend`](crate::ReqwestBackend)
//! turns it into a `reqwest::Client` once, at construction.

use std::time::Duration;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// `User-Agent` header sent with every request.
pub const USER_AGENT: &str = concat!("lvhttp/", env!("CARGO_PKG_VERSION"));

/// Longest single sleep between two attempts.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// How often, and how patiently, a transient failure is retried.
///
/// Which failures count as transient depends on the request method and is
/// decided by the backend; this only carries the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u8,
    /// Sleep before the first retry. Doubles on every further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Sleep before retry number `attempt` (the first retry is 1).
    ///
    /// Capped at [`MAX_RETRY_DELAY`] however large `attempt` gets.
    pub fn delay_before(&self, attempt: u8) -> Duration {
        let factor = 2u32.saturating_pow(u32::from(attempt.saturating_sub(1)));
        self.base_delay.saturating_mul(factor).min(MAX_RETRY_DELAY)
    }
}

/// Settings for the reqwest-backed client.
///
/// ```
/// use lvhttp_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new()
///     .with_base_url("https://www.wanandroid.com")
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(config.base_url(), "https://www.wanandroid.com/");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
    pub(crate) token: Option<String>,
    pub(crate) retry: RetryPolicy,
    pub(crate) system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            token: None,
            retry: RetryPolicy::default(),
            system_proxy: true,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root that relative request paths resolve against.
    ///
    /// Always stored with a trailing slash, so `article/list` lands below
    /// `https://host/api/` instead of replacing `api`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    /// Whole-request timeout, connect through last body byte.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bearer token for the `Authorization` header.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.retry.max_retries = retries;
        self
    }

    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry.base_delay = delay;
        self
    }

    /// `false` ignores `HTTP_PROXY`/`HTTPS_PROXY`, e.g. for loopback servers.
    #[must_use]
    pub const fn with_system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn retry(&self) -> RetryPolicy {
        self.retry
    }
}
