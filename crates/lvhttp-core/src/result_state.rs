//! Tri-state request outcome.

use crate::error::RequestError;

/// Outcome of an asynchronous request as seen by a caller.
///
/// A launch entry point may deliver `Loading` first, then exactly one
/// terminal state (`Success` or `Error`). Values are never mutated after
/// construction; the `on_*` continuations only observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultState<T> {
    /// The request has been launched; payload is a placeholder, if any.
    Loading(Option<T>),
    /// The request completed and passed verification.
    Success(T),
    /// The request failed.
    Error {
        /// Whatever payload is known: the rejected envelope on a code
        /// mismatch, a synthetic envelope on a transport failure, or nothing.
        payload: Option<T>,
        /// The failure.
        cause: Option<RequestError>,
    },
}

impl<T> ResultState<T> {
    /// Build an error state.
    pub const fn error(payload: Option<T>, cause: RequestError) -> Self {
        Self::Error {
            payload,
            cause: Some(cause),
        }
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// True for `Success` and `Error`.
    pub const fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    /// Borrow the payload of whichever variant is active.
    pub const fn payload(&self) -> Option<&T> {
        match self {
            Self::Loading(p) | Self::Error { payload: p, .. } => p.as_ref(),
            Self::Success(p) => Some(p),
        }
    }

    /// The error, for `Error` states that carry one.
    pub const fn cause(&self) -> Option<&RequestError> {
        match self {
            Self::Error { cause, .. } => cause.as_ref(),
            _ => None,
        }
    }

    /// Run `f` with the placeholder payload if this is `Loading`.
    #[must_use]
    pub fn on_loading(self, f: impl FnOnce(Option<&T>)) -> Self {
        if let Self::Loading(p) = &self {
            f(p.as_ref());
        }
        self
    }

    /// Run `f` with the payload if this is `Success`.
    #[must_use]
    pub fn on_success(self, f: impl FnOnce(&T)) -> Self {
        if let Self::Success(p) = &self {
            f(p);
        }
        self
    }

    /// Run `f` with the payload and cause if this is `Error`.
    #[must_use]
    pub fn on_error(self, f: impl FnOnce(Option<&T>, Option<&RequestError>)) -> Self {
        if let Self::Error { payload, cause } = &self {
            f(payload.as_ref(), cause.as_ref());
        }
        self
    }

    /// Transform the payload, keeping the variant.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultState<U> {
        match self {
            Self::Loading(p) => ResultState::Loading(p.map(f)),
            Self::Success(p) => ResultState::Success(f(p)),
            Self::Error { payload, cause } => ResultState::Error {
                payload: payload.map(f),
                cause,
            },
        }
    }

    /// Convert a terminal state into a `Result`.
    ///
    /// `Loading` has no outcome yet and converts to an error.
    pub fn into_result(self) -> Result<T, RequestError> {
        match self {
            Self::Success(p) => Ok(p),
            Self::Error { cause, .. } => {
                Err(cause.unwrap_or_else(|| RequestError::other("request failed")))
            }
            Self::Loading(_) => Err(RequestError::other("request still loading")),
        }
    }
}
