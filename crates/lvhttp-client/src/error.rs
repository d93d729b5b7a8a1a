//! Client errors and transport classification.
//!
//! Requests themselves fail with [`RequestError`], so the launch layer can
//! route them by key. [`ClientError`] only covers building a client.

use std::error::Error as StdError;

use lvhttp_core::RequestError;
use thiserror::Error;

/// Errors from constructing a client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL does not parse.
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// Map a `reqwest` error onto the request error taxonomy.
///
/// Order matters: a timeout while connecting is reported as a timeout, and
/// a connect failure caused by name resolution as an unknown host.
pub fn classify_reqwest_error(err: &reqwest::Error) -> RequestError {
    let url = err.url().map(ToString::to_string).unwrap_or_default();

    if err.is_timeout() {
        return RequestError::timeout(describe(err));
    }
    if err.is_connect() {
        if is_dns_failure(err) {
            let host = err
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("unknown")
                .to_string();
            return RequestError::unknown_host(host);
        }
        return RequestError::connect(describe(err));
    }
    if let Some(status) = err.status() {
        return RequestError::http(status.as_u16(), url);
    }
    if err.is_decode() {
        return RequestError::decode(describe(err));
    }
    if err.is_body() {
        return RequestError::io("body", describe(err));
    }
    RequestError::other(describe(err))
}

/// Map a non-success HTTP status onto the request error taxonomy.
pub fn classify_status(status: u16, url: &url::Url) -> RequestError {
    RequestError::http(status, url.as_str())
}

/// Whether a status is worth retrying.
pub fn is_retryable_status(status: u16) -> bool {
    (500..600).contains(&status)
}

/// The error's message followed by its source chain.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn is_dns_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string().to_lowercase();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return true;
        }
        source = cause.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvhttp_core::ErrorKey;

    #[test]
    fn test_classify_status() {
        let url = url::Url::parse("https://api.example.com/articles").unwrap();
        let err = classify_status(404, &url);
        assert_eq!(err.key(), Some(ErrorKey::Http));
        assert_eq!(err.to_string(), "HTTP 404: https://api.example.com/articles");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(200));
        assert!(!is_retryable_status(600));
    }

    #[test]
    fn test_invalid_base_url_message() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = ClientError::InvalidBaseUrl {
            url: "not a url".to_string(),
            source,
        };
        assert!(err.to_string().contains("not a url"));
    }

    #[tokio::test]
    async fn test_classify_connect_failure() {
        // Port 1 on loopback is never listening in the test environment.
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let err = client
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();
        assert_eq!(classify_reqwest_error(&err).key(), Some(ErrorKey::Connect));
    }

    #[tokio::test]
    async fn test_classify_builder_failure_is_other() {
        let err = reqwest::Client::new()
            .get("not a url")
            .send()
            .await
            .unwrap_err();
        assert_eq!(classify_reqwest_error(&err).key(), None);
    }
}
