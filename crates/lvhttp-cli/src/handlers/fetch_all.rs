//! `fetch-all` command handler.
//!
//! Fans out one GET per path and prints every outcome in input order once
//! all of them have finished.

use std::sync::{Arc, PoisonError};

use lvhttp_core::{RequestError, ResultState};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::{JsonResponse, Slot, take, wait};
use crate::presentation::format_data;

/// GET every path concurrently.
///
/// Fails with the first failure in input order after printing every
/// outcome.
pub async fn execute(ctx: &CliContext, paths: &[String]) -> Result<(), CliError> {
    let scope = ctx.launch().lifecycle_scope("fetch-all");
    let producers = paths.iter().cloned().map(|path| {
        let client = ctx.client();
        move || async move { client.get::<JsonResponse>(&path).await }
    });

    let slot: Slot<Vec<ResultState<JsonResponse>>> = Arc::default();
    let sink = Arc::clone(&slot);
    let handle = scope.zip_af_launch(producers, move |states| {
        *sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(states);
    });

    wait(scope.scope(), handle).await?;
    let states = take(&slot).ok_or(CliError::Interrupted)?;

    let mut first_failure = None;
    for (path, state) in paths.iter().zip(states) {
        println!("{}", format_outcome(path, &state));
        if first_failure.is_none() && state.is_error() {
            first_failure = Some(
                state
                    .cause()
                    .cloned()
                    .unwrap_or_else(|| RequestError::other("request failed")),
            );
        }
    }

    match first_failure {
        Some(cause) => Err(cause.into()),
        None => Ok(()),
    }
}

/// One line per outcome: `ok <path> <data>` or `err <path> <cause>`.
pub fn format_outcome(path: &str, state: &ResultState<JsonResponse>) -> String {
    match state {
        ResultState::Success(response) => {
            let data = format_data(response.data.as_ref()).replace('\n', " ");
            format!("ok  {path} {data}")
        }
        ResultState::Error { cause, .. } => match cause {
            Some(cause) => format!("err {path} {cause}"),
            None => format!("err {path}"),
        },
        ResultState::Loading(_) => format!("... {path}"),
    }
}
