//! Response envelopes and the strategies that verify them.
//!
//! An envelope wraps a payload with an application-level status code that
//! is distinct from the HTTP status. A [`ResponseStrategy`] tells the
//! classifier how to treat a producer's output:
//!
//! - [`Enveloped`] compares the envelope code against the expected code and
//!   builds synthetic envelopes for failures and loading placeholders.
//! - [`Unwrapped`] takes any returned value as a success.

use serde::{Deserialize, Serialize};

use crate::error::{CodeError, RequestError};

/// Code carried by synthetic envelopes (failures and placeholders).
pub const SYNTHETIC_CODE: i32 = -1;

/// An application-level response wrapper.
///
/// Implement this for server envelopes whose fields are named differently
/// from [`BaseResponse`].
pub trait Envelope: Sized {
    /// Application status code.
    fn code(&self) -> i32;

    /// Server-supplied message, if any.
    fn message(&self) -> Option<&str>;

    /// Build an envelope that carries no data.
    fn failure(code: i32, message: String) -> Self;

    /// Payload used for `ResultState::Loading` before the request runs.
    fn placeholder() -> Self {
        Self::failure(SYNTHETIC_CODE, String::new())
    }
}

/// Default envelope: `{"code": .., "message": .., "data": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    pub code: i32,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> BaseResponse<T> {
    /// Create an envelope around `data`.
    pub fn new(code: i32, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            data,
        }
    }

    /// Take the payload out of the envelope.
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl<T> Envelope for BaseResponse<T> {
    fn code(&self) -> i32 {
        self.code
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn failure(code: i32, message: String) -> Self {
        Self {
            code,
            message: Some(message),
            data: None,
        }
    }
}

/// How a producer's output is verified and what payload failures carry.
pub trait ResponseStrategy<T>: Send + Sync {
    /// Check a successfully returned value.
    ///
    /// Returns the code error when the value must be reported as a failure.
    fn verify(&self, value: &T, expected_code: i32, fallback_message: &str) -> Option<CodeError>;

    /// Payload for an `Error` state built from a producer failure.
    fn failure_payload(&self, error: &RequestError, fallback_message: &str) -> Option<T>;

    /// Payload for the eager `Loading` state.
    fn loading_payload(&self) -> Option<T>;
}

/// Strategy for producers that return an [`Envelope`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Enveloped;

impl<E: Envelope> ResponseStrategy<E> for Enveloped {
    fn verify(&self, value: &E, expected_code: i32, fallback_message: &str) -> Option<CodeError> {
        (value.code() != expected_code).then(|| {
            CodeError::new(
                value.code(),
                value.message().unwrap_or(fallback_message).to_string(),
            )
        })
    }

    fn failure_payload(&self, error: &RequestError, fallback_message: &str) -> Option<E> {
        let message = error.to_string();
        let message = if message.is_empty() {
            fallback_message.to_string()
        } else {
            message
        };
        Some(E::failure(SYNTHETIC_CODE, message))
    }

    fn loading_payload(&self) -> Option<E> {
        Some(E::placeholder())
    }
}

/// Strategy for producers that return a bare payload (downloads, raw JSON).
#[derive(Debug, Clone, Copy, Default)]
pub struct Unwrapped;

impl<T> ResponseStrategy<T> for Unwrapped {
    fn verify(&self, _value: &T, _expected_code: i32, _fallback_message: &str) -> Option<CodeError> {
        None
    }

    fn failure_payload(&self, _error: &RequestError, _fallback_message: &str) -> Option<T> {
        None
    }

    fn loading_payload(&self) -> Option<T> {
        None
    }
}
