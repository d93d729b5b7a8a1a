//! Outcome classification (`try_catch`).
//!
//! Runs a producer, turns its outcome into a [`ResultState`], routes
//! failures to the registered handler on the main context, and logs the
//! failure once. Nothing escapes this boundary: producer errors and panics
//! alike end up in the returned state.
//!
//! Dispatch order on failure:
//! 1. the handler registered for the error's own key, if any;
//! 2. otherwise the `CatchAll` handler, if any.
//!
//! A code mismatch goes only to the `Code` handler, never to `CatchAll`.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use lvhttp_core::{
    Enveloped, Envelope, ErrorHandler, ErrorKey, RequestError, RequestResult, ResponseStrategy,
    ResultState, Unwrapped,
};

use crate::context::LaunchContext;
use crate::main_thread::{panic_message, with_main};

/// Which handler a failure was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The handler registered under the error's own key.
    Typed(ErrorKey),
    /// The catch-all handler.
    CatchAll,
    /// No handler was registered.
    Unhandled,
}

impl fmt::Display for Dispatched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(key) => write!(f, "{key}"),
            Self::CatchAll => f.write_str("catch_all"),
            Self::Unhandled => f.write_str("none"),
        }
    }
}

/// Run `producer` and classify its outcome with `strategy`.
pub async fn try_catch<T, S, F, Fut>(ctx: &LaunchContext, strategy: &S, producer: F) -> ResultState<T>
where
    S: ResponseStrategy<T> + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = RequestResult<T>>,
{
    let outcome = AssertUnwindSafe(async move { producer().await })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(RequestError::panicked(panic_message(payload.as_ref()))));

    let settings = ctx.settings();
    match outcome {
        Ok(value) => {
            let Some(code_error) =
                strategy.verify(&value, settings.expected_code, &settings.code_error_message)
            else {
                return ResultState::Success(value);
            };
            let error = RequestError::Code(code_error);
            let dispatched = match ctx.registry().lookup(ErrorKey::Code) {
                Some(handler) => {
                    invoke(ctx, handler, error.clone()).await;
                    Dispatched::Typed(ErrorKey::Code)
                }
                None => Dispatched::Unhandled,
            };
            log_failure(&error, dispatched);
            ResultState::error(Some(value), error)
        }
        Err(error) => {
            let payload = strategy.failure_payload(&error, &settings.network_error_message);
            let dispatched = dispatch(ctx, &error).await;
            log_failure(&error, dispatched);
            ResultState::error(payload, error)
        }
    }
}

/// [`try_catch`] for producers returning an [`Envelope`].
pub async fn try_catch_enveloped<E, F, Fut>(ctx: &LaunchContext, producer: F) -> ResultState<E>
where
    E: Envelope,
    F: FnOnce() -> Fut,
    Fut: Future<Output = RequestResult<E>>,
{
    try_catch(ctx, &Enveloped, producer).await
}

/// [`try_catch`] for producers returning a bare payload.
pub async fn try_catch_unwrapped<T, F, Fut>(ctx: &LaunchContext, producer: F) -> ResultState<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = RequestResult<T>>,
{
    try_catch(ctx, &Unwrapped, producer).await
}

async fn dispatch(ctx: &LaunchContext, error: &RequestError) -> Dispatched {
    let registry = ctx.registry();
    if let Some(key) = error.key() {
        if let Some(handler) = registry.lookup(key) {
            invoke(ctx, handler, error.clone()).await;
            return Dispatched::Typed(key);
        }
        // Code mismatches have a dedicated route only.
        if key == ErrorKey::Code {
            return Dispatched::Unhandled;
        }
    }
    match registry.lookup(ErrorKey::CatchAll) {
        Some(handler) => {
            invoke(ctx, handler, error.clone()).await;
            Dispatched::CatchAll
        }
        None => Dispatched::Unhandled,
    }
}

/// Run a handler on the main context and wait for it.
async fn invoke(ctx: &LaunchContext, handler: ErrorHandler, error: RequestError) {
    if let Err(e) = with_main(ctx.main(), move || handler(&error)).await {
        tracing::error!(error = %e, "Error handler did not complete");
    }
}

fn log_failure(error: &RequestError, dispatched: Dispatched) {
    let key = error.key().map_or("none", ErrorKey::as_str);
    tracing::warn!(%key, handled_by = %dispatched, error = ?error, "Request failed");
}
