//! HTTP client producing [`RequestResult`]s for the launch layer.
//!
//! Every method is a ready-made producer body:
//!
//! ```ignore
//! let client = Arc::new(DefaultHttpClient::new(&ClientConfig::new())?);
//! screen.launch_af(move || async move { client.get("articles").await }, render);
//! ```

use std::path::PathBuf;

use lvhttp_core::{RequestError, RequestResult};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::download::{
    DEFAULT_PROGRESS_INTERVAL, DownloadListener, DownloadTarget, FileSink, ProgressThrottle,
};
use crate::error::ClientError;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::upload::UploadPart;

// ============================================================================
// Type Aliases
// ============================================================================

/// Default client using the reqwest HTTP backend.
pub type DefaultHttpClient = HttpClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client joining request paths onto a base URL.
///
/// Generic over the HTTP backend so tests can substitute a fake one. Use
/// [`DefaultHttpClient`] in production code.
pub struct HttpClient<B: HttpBackend> {
    backend: B,
    base_url: Url,
    throttle_interval: std::time::Duration,
}

impl DefaultHttpClient {
    /// Create a client from a configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url).map_err(|source| {
            ClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            }
        })?;
        let backend = ReqwestBackend::new(config)?;
        Ok(Self::with_backend(base_url, backend))
    }
}

impl<B: HttpBackend> HttpClient<B> {
    /// Create a client with a custom backend.
    pub fn with_backend(base_url: Url, backend: B) -> Self {
        Self {
            backend,
            base_url,
            throttle_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Set how often download progress may be reported.
    #[must_use]
    pub const fn with_progress_interval(mut self, interval: std::time::Duration) -> Self {
        self.throttle_interval = interval;
        self
    }

    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the base URL. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> RequestResult<Url> {
        if let Ok(absolute) = Url::parse(path) {
            return Ok(absolute);
        }
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RequestError::other(format!("invalid request path '{path}': {e}")))
    }

    /// GET `path` and decode the JSON body.
    pub async fn get<T: DeserializeOwned + Send>(&self, path: &str) -> RequestResult<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        self.backend.get_json(&url).await
    }

    /// POST a url-encoded form to `path` and decode the JSON body.
    pub async fn post_form<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> RequestResult<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, fields = form.len(), "POST form");
        self.backend.post_form_json(&url, form).await
    }

    /// POST a multipart form to `path` and decode the JSON body.
    pub async fn upload<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        parts: &[UploadPart],
    ) -> RequestResult<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, parts = parts.len(), "POST multipart");
        self.backend.post_multipart_json(&url, parts).await
    }

    /// Stream `path` into `target`, reporting to `listener`.
    ///
    /// Returns the written file's path. On failure the partial file is
    /// removed and `listener.on_error` is called before the error returns.
    pub async fn download(
        &self,
        path: &str,
        target: &DownloadTarget,
        listener: &dyn DownloadListener,
    ) -> RequestResult<PathBuf> {
        let outcome = self.download_inner(path, target, listener).await;
        match &outcome {
            Ok(file) => listener.on_done(file),
            Err(e) => listener.on_error(e),
        }
        outcome
    }

    async fn download_inner(
        &self,
        path: &str,
        target: &DownloadTarget,
        listener: &dyn DownloadListener,
    ) -> RequestResult<PathBuf> {
        let url = self.url(path)?;
        tracing::debug!(%url, dest = %target.path().display(), "Download");
        let mut sink = FileSink::new(target, listener, ProgressThrottle::new(self.throttle_interval));
        match self.backend.download(&url, &mut sink).await {
            Ok(_) => sink.finish(),
            Err(e) => {
                sink.abort();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::MockDownloadListener;
    use crate::http::testing::{Canned, FakeBackend, Recorded};
    use lvhttp_core::BaseResponse;
    use mockall::predicate::eq;
    use serde_json::json;
    use std::time::Duration;
    use tokio_test::assert_ok;

    fn client(backend: FakeBackend) -> HttpClient<FakeBackend> {
        HttpClient::with_backend(Url::parse("https://api.example.com/v1/").unwrap(), backend)
            .with_progress_interval(Duration::ZERO)
    }

    #[test]
    fn test_default_client_creation() {
        let client = assert_ok!(DefaultHttpClient::new(&ClientConfig::new()));
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = ClientConfig::new().with_base_url("::not a url::");
        let Err(err) = DefaultHttpClient::new(&config) else {
            panic!("expected an invalid base URL error");
        };
        assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_url_resolution() {
        let client = client(FakeBackend::new());
        assert_eq!(
            client.url("articles/1").unwrap().as_str(),
            "https://api.example.com/v1/articles/1"
        );
        assert_eq!(
            client.url("/articles").unwrap().as_str(),
            "https://api.example.com/v1/articles"
        );
        assert_eq!(
            client.url("https://cdn.example.com/app.apk").unwrap().as_str(),
            "https://cdn.example.com/app.apk"
        );
    }

    #[tokio::test]
    async fn test_get_decodes_envelope() {
        let backend = FakeBackend::new().with_response(
            "article/list",
            Canned::Json(json!({"code": 200, "msg": "ok", "data": ["a", "b"]})),
        );
        let client = client(backend);
        let response: BaseResponse<Vec<String>> = client.get("article/list").await.unwrap();
        assert_eq!(response.code, 200);
        assert_eq!(response.message.as_deref(), Some("ok"));
        assert_eq!(response.into_data(), Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[tokio::test]
    async fn test_post_form_and_upload_reach_backend() {
        let backend = FakeBackend::new()
            .with_response("login", Canned::Json(json!({"code": 200})))
            .with_response("upload", Canned::Json(json!({"code": 200})));
        let requests = backend.requests();
        let client = client(backend);

        let form = vec![("user".to_string(), "lv".to_string())];
        let _: BaseResponse<()> = client.post_form("user/login", &form).await.unwrap();
        let parts = vec![UploadPart::text("key", "v"), UploadPart::text("key2", "w")];
        let _: BaseResponse<()> = client.upload("file/upload", &parts).await.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(
            *requests,
            vec![
                Recorded::Form("https://api.example.com/v1/user/login".into(), form),
                Recorded::Multipart(
                    "https://api.example.com/v1/file/upload".into(),
                    vec!["key".into(), "key2".into()]
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_download_writes_file_and_notifies_listener() {
        let backend =
            FakeBackend::new().with_response("app.apk", Canned::Body(b"0123456789".to_vec()));
        let client = client(backend);
        let dir = tempfile::tempdir().unwrap();
        let target = DownloadTarget::new(dir.path(), "app.apk");

        let mut listener = MockDownloadListener::new();
        listener.expect_on_create().with(eq(Some(10))).times(1).return_const(());
        listener.expect_on_progress().return_const(());
        let expected = target.path();
        listener
            .expect_on_done()
            .withf(move |p| p == expected)
            .times(1)
            .return_const(());
        listener.expect_on_error().never();

        let path = client.download("app.apk", &target, &listener).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"0123456789");
    }

    #[tokio::test]
    async fn test_download_failure_notifies_listener() {
        let backend = FakeBackend::new()
            .with_response("gone", Canned::Fail(RequestError::connect("reset by peer")));
        let client = client(backend);
        let dir = tempfile::tempdir().unwrap();
        let target = DownloadTarget::new(dir.path(), "gone.bin");

        let mut listener = MockDownloadListener::new();
        listener
            .expect_on_error()
            .withf(|e| matches!(e, RequestError::Connect { .. }))
            .times(1)
            .return_const(());
        listener.expect_on_done().never();

        let err = client.download("gone", &target, &listener).await.unwrap_err();
        assert_eq!(err, RequestError::connect("reset by peer"));
        assert!(!target.path().exists());
    }
}
