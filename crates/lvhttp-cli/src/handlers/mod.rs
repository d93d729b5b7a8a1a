//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that:
//!   1. Build the request producer from CLI input
//!   2. Launch it through one of the launch entry points
//!   3. Print the delivered payload
//!
//! Failures are printed by the handlers registered in bootstrap, not here.

use std::sync::{Arc, Mutex, PoisonError};

use lvhttp_core::{BaseResponse, ResultState};
use lvhttp_launch::{JoinOutcome, LaunchHandle, Scope};

use crate::error::CliError;

pub mod download;
pub mod fetch_all;
pub mod get;
pub mod post;
pub mod upload;

/// Envelope with an untyped JSON payload.
pub type JsonResponse = BaseResponse<serde_json::Value>;

/// Where a launch callback leaves its terminal state.
pub(crate) type Slot<T> = Arc<Mutex<Option<T>>>;

/// A callback that reports `Loading` and stores the terminal state.
pub(crate) fn capture<T>(label: &str) -> (Slot<ResultState<T>>, impl FnMut(ResultState<T>) + Send + 'static)
where
    T: Send + 'static,
{
    let slot: Slot<ResultState<T>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&slot);
    let label = label.to_string();
    let callback = move |state: ResultState<T>| {
        if state.is_loading() {
            eprintln!("{label}: loading...");
            return;
        }
        *sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(state);
    };
    (slot, callback)
}

pub(crate) fn take<T>(slot: &Slot<T>) -> Option<T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

/// Wait for `handle`, cancelling `scope` on Ctrl-C.
///
/// `Ok` means the terminal state reached the callback.
pub(crate) async fn wait(scope: &Scope, handle: LaunchHandle) -> Result<(), CliError> {
    let join = handle.join();
    tokio::pin!(join);
    tokio::select! {
        outcome = &mut join => return settle(outcome),
        _ = tokio::signal::ctrl_c() => {}
    }
    tracing::debug!(scope = scope.name(), "Interrupted, cancelling scope");
    scope.cancel();
    join.await;
    Err(CliError::Interrupted)
}

fn settle(outcome: JoinOutcome) -> Result<(), CliError> {
    match outcome {
        JoinOutcome::Delivered => Ok(()),
        JoinOutcome::Cancelled => Err(CliError::Interrupted),
        JoinOutcome::Failed(reason) => Err(CliError::Launch(reason)),
    }
}

/// Wait for a launched request and turn its terminal state into a result.
pub(crate) async fn finish<T>(
    scope: &Scope,
    handle: LaunchHandle,
    slot: &Slot<ResultState<T>>,
) -> Result<T, CliError> {
    wait(scope, handle).await?;
    let state = take(slot).ok_or(CliError::Interrupted)?;
    Ok(state.into_result()?)
}
