//! HTTP producers for lvhttp.
//!
//! [`HttpClient`] turns requests into [`RequestResult`](lvhttp_core::RequestResult)s
//! whose errors carry the keys the launch layer dispatches on:
//! JSON GET and form POST, multipart upload, and streaming download with a
//! progress listener.

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod http;
pub mod upload;

pub use client::{DefaultHttpClient, HttpClient};
pub use config::{ClientConfig, DEFAULT_BASE_URL, MAX_RETRY_DELAY, RetryPolicy, USER_AGENT};
pub use download::{
    ChunkSink, DEFAULT_PROGRESS_INTERVAL, DownloadListener, DownloadTarget, NoopListener,
    ProgressThrottle,
};
pub use error::{ClientError, classify_reqwest_error, classify_status, is_retryable_status};
pub use http::{HttpBackend, ReqwestBackend};
pub use upload::{DEFAULT_PART_MIME, UploadPart};
