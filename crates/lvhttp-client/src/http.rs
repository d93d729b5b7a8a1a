//! HTTP backend abstraction.
//!
//! A trait-based backend keeps [`HttpClient`](crate::HttpClient) testable.
//! The production implementation uses reqwest with automatic retry for
//! transient errors.

use async_trait::async_trait;
use futures_util::StreamExt;
use lvhttp_core::{RequestError, RequestResult};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{ClientConfig, RetryPolicy, USER_AGENT};
use crate::download::ChunkSink;
use crate::error::{ClientError, classify_reqwest_error, classify_status, is_retryable_status};
use crate::upload::{PartBody, UploadPart};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Transport used by [`HttpClient`](crate::HttpClient).
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// GET a URL and deserialize the JSON body.
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> RequestResult<T>;

    /// POST a url-encoded form and deserialize the JSON body.
    async fn post_form_json<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
        form: &[(String, String)],
    ) -> RequestResult<T>;

    /// POST a multipart form and deserialize the JSON body.
    async fn post_multipart_json<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
        parts: &[UploadPart],
    ) -> RequestResult<T>;

    /// GET a URL and stream the body into `sink`. Returns the bytes written.
    async fn download(&self, url: &Url, sink: &mut dyn ChunkSink) -> RequestResult<u64>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Which failures a request may be replayed after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replay {
    /// GETs: 5xx responses, timeouts and connect failures.
    Idempotent,
    /// POSTs: only connect failures, where nothing reached the server.
    ConnectOnly,
}

impl Replay {
    fn after_status(self, status: u16) -> bool {
        self == Self::Idempotent && is_retryable_status(status)
    }

    fn after_error(self, error: &reqwest::Error) -> bool {
        match self {
            Self::Idempotent => error.is_timeout() || error.is_connect(),
            Self::ConnectOnly => error.is_connect(),
        }
    }
}

/// Production HTTP backend using reqwest with retry logic.
///
/// GETs are retried on 5xx responses and network errors with exponential
/// backoff. POSTs are retried only when the connection was never made.
pub struct ReqwestBackend {
    client: reqwest::Client,
    retry: RetryPolicy,
    auth_token: Option<String>,
}

impl ReqwestBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT);
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client,
            retry: config.retry,
            auth_token: config.token.clone(),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request with automatic retry for transient errors.
    ///
    /// `build` is called once per attempt since request bodies such as
    /// multipart forms cannot be cloned.
    async fn send_with_retry<F>(
        &self,
        url: &Url,
        replay: Replay,
        build: F,
    ) -> RequestResult<reqwest::Response>
    where
        F: Fn(&reqwest::Client) -> RequestResult<reqwest::RequestBuilder> + Send + Sync,
    {
        let mut last_error: Option<RequestError> = None;

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                let delay = self.retry.delay_before(attempt);
                tracing::debug!(%url, attempt, ?delay, "Retrying request");
                tokio::time::sleep(delay).await;
            }

            let request = self.authorize(build(&self.client)?);
            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if response.status().is_success() {
                        return Ok(response);
                    }
                    if replay.after_status(status) && attempt < self.retry.max_retries {
                        last_error = Some(classify_status(status, url));
                        continue;
                    }
                    return Err(classify_status(status, url));
                }
                Err(e) => {
                    let error = classify_reqwest_error(&e);
                    if replay.after_error(&e) && attempt < self.retry.max_retries {
                        last_error = Some(error);
                        continue;
                    }
                    return Err(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| RequestError::other("request was never sent")))
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> RequestResult<T> {
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        serde_json::from_slice(&body).map_err(|e| RequestError::decode(e.to_string()))
    }
}

fn multipart_form(parts: &[UploadPart]) -> RequestResult<Form> {
    parts.iter().try_fold(Form::new(), |form, part| {
        let name = part.name.clone();
        match &part.body {
            PartBody::Text(value) => Ok(form.text(name, value.clone())),
            PartBody::Bytes {
                data,
                file_name,
                mime,
            } => {
                let mut field = Part::bytes(data.clone());
                if let Some(file_name) = file_name {
                    field = field.file_name(file_name.clone());
                }
                let field = field
                    .mime_str(mime)
                    .map_err(|e| classify_reqwest_error(&e))?;
                Ok(form.part(name, field))
            }
        }
    })
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> RequestResult<T> {
        let response = self
            .send_with_retry(url, Replay::Idempotent, |client| Ok(client.get(url.as_str())))
            .await?;
        Self::read_json(response).await
    }

    async fn post_form_json<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
        form: &[(String, String)],
    ) -> RequestResult<T> {
        let response = self
            .send_with_retry(url, Replay::ConnectOnly, |client| {
                Ok(client.post(url.as_str()).form(form))
            })
            .await?;
        Self::read_json(response).await
    }

    async fn post_multipart_json<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
        parts: &[UploadPart],
    ) -> RequestResult<T> {
        let response = self
            .send_with_retry(url, Replay::ConnectOnly, |client| {
                Ok(client.post(url.as_str()).multipart(multipart_form(parts)?))
            })
            .await?;
        Self::read_json(response).await
    }

    async fn download(&self, url: &Url, sink: &mut dyn ChunkSink) -> RequestResult<u64> {
        let response = self
            .send_with_retry(url, Replay::Idempotent, |client| Ok(client.get(url.as_str())))
            .await?;

        sink.begin(response.content_length())?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| classify_reqwest_error(&e))?;
            sink.write_chunk(&chunk)?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
