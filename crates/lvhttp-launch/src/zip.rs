//! Fan-out/fan-in.
//!
//! Every producer runs as its own task, classified independently as an
//! enveloped request. Results come back in input order, all at once, after
//! the last task finishes. One failure does not cancel the others.

use std::future::Future;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, join_all};
use lvhttp_core::{Enveloped, Envelope, RequestResult, ResultState};
use tokio_util::sync::CancellationToken;

use crate::classify::try_catch_enveloped;
use crate::context::LaunchContext;
use crate::launch::{abandoned, deliver};
use crate::scope::{JoinOutcome, LaunchHandle, LifecycleScope};

/// A type-erased producer, for zipping requests built from different
/// closures.
pub type Producer<T> = Box<dyn FnOnce() -> BoxFuture<'static, RequestResult<T>> + Send>;

/// Erase a producer's closure and future types.
pub fn boxed_producer<T, F, Fut>(producer: F) -> Producer<T>
where
    T: 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = RequestResult<T>> + Send + 'static,
{
    Box::new(move || producer().boxed())
}

async fn zip_states<E, F, Fut>(
    ctx: &LaunchContext,
    producers: Vec<F>,
    token: &CancellationToken,
) -> Vec<ResultState<E>>
where
    E: Envelope + Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = RequestResult<E>> + Send + 'static,
{
    let runtime = ctx.runtime().clone();
    let tasks: Vec<_> = producers
        .into_iter()
        .map(|producer| {
            let ctx = ctx.clone();
            let token = token.clone();
            runtime.spawn(async move {
                tokio::select! {
                    biased;
                    () = token.cancelled() => None,
                    state = try_catch_enveloped(&ctx, producer) => Some(state),
                }
            })
        })
        .collect();
    tracing::debug!(count = tasks.len(), "Zipped requests launched");

    join_all(tasks)
        .await
        .into_iter()
        .enumerate()
        .map(|(index, joined)| match joined {
            Ok(Some(state)) => state,
            Ok(None) => abandoned(ctx, &Enveloped),
            Err(e) => {
                tracing::warn!(index, error = %e, "Zipped request task did not complete");
                abandoned(ctx, &Enveloped)
            }
        })
        .collect()
}

impl LifecycleScope {
    /// Run all `producers` concurrently and hand every state, in input
    /// order, to `callback` on the main context.
    ///
    /// No `Loading` state is emitted. Cancelling the handle or the scope
    /// stops the unfinished requests and suppresses the callback.
    pub fn zip_af_launch<E, I, F, Fut, C>(&self, producers: I, callback: C) -> LaunchHandle
    where
        E: Envelope + Send + 'static,
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<E>> + Send + 'static,
        C: FnOnce(Vec<ResultState<E>>) + Send + 'static,
    {
        let producers: Vec<F> = producers.into_iter().collect();
        let token = self.scope.task_token();
        let task_token = token.clone();
        let ctx = self.scope.context().clone();
        let scope = self.scope.shared_name();
        let runtime = ctx.runtime().clone();
        tracing::debug!(scope = %scope, count = producers.len(), "Launching zipped requests");

        let task = runtime.spawn(async move {
            let states = tokio::select! {
                biased;
                () = task_token.cancelled() => None,
                states = zip_states(&ctx, producers, &task_token) => Some(states),
            };
            match states {
                Some(states) => {
                    deliver(&ctx, &scope, task_token, move || callback(states)).await
                }
                None => {
                    tracing::debug!(scope = %scope, "Zipped requests cancelled");
                    JoinOutcome::Cancelled
                }
            }
        });
        LaunchHandle::new(token, task)
    }
}

impl LaunchContext {
    /// Run all `producers` concurrently and return every state in input
    /// order.
    pub async fn zip_launch<E, I, F, Fut>(&self, producers: I) -> Vec<ResultState<E>>
    where
        E: Envelope + Send + 'static,
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<E>> + Send + 'static,
    {
        let producers: Vec<F> = producers.into_iter().collect();
        zip_states(self, producers, &CancellationToken::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvhttp_core::{BaseResponse, ErrorKey, RequestError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type Response = BaseResponse<&'static str>;

    fn context() -> LaunchContext {
        LaunchContext::builder().build().unwrap()
    }

    fn after(ms: u64, result: RequestResult<Response>) -> Producer<Response> {
        boxed_producer(move || async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            result
        })
    }

    #[tokio::test]
    async fn test_zip_launch_preserves_input_order() {
        let ctx = context();
        let states = ctx
            .zip_launch(vec![
                after(60, Ok(BaseResponse::new(200, "ok", Some("slow")))),
                after(5, Err(RequestError::connect("refused"))),
                after(30, Ok(BaseResponse::new(200, "ok", Some("medium")))),
            ])
            .await;

        assert_eq!(states.len(), 3);
        assert!(states[0].is_success());
        assert!(states[1].is_error());
        assert!(states[2].is_success());
        assert_eq!(states[0].payload().and_then(|r| r.data), Some("slow"));
        assert_eq!(states[2].payload().and_then(|r| r.data), Some("medium"));
    }

    #[tokio::test]
    async fn test_zip_launch_runs_every_producer_despite_failures() {
        let ctx = context();
        let catch_all = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&catch_all);
        ctx.registry().register(ErrorKey::CatchAll, move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
        });

        let states = ctx
            .zip_launch(vec![
                after(1, Err(RequestError::other("first"))),
                after(1, Err(RequestError::other("second"))),
                after(20, Ok(BaseResponse::new(401, "login", None))),
            ])
            .await;

        assert!(states.iter().all(ResultState::is_error));
        assert_eq!(catch_all.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zip_launch_empty() {
        let ctx = context();
        let states: Vec<ResultState<Response>> =
            ctx.zip_launch(Vec::<Producer<Response>>::new()).await;
        assert!(states.is_empty());
    }

    #[tokio::test]
    async fn test_zip_af_launch_delivers_once() {
        let ctx = context();
        let screen = ctx.lifecycle_scope("screen");
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&delivered);

        let handle = screen.zip_af_launch(
            vec![
                after(20, Ok(BaseResponse::new(200, "ok", Some("a")))),
                after(1, Ok(BaseResponse::new(200, "ok", Some("b")))),
            ],
            move |states: Vec<ResultState<Response>>| sink.lock().unwrap().push(states),
        );
        assert_eq!(handle.join().await, JoinOutcome::Delivered);

        let delivered = delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        let data: Vec<_> = delivered[0]
            .iter()
            .map(|s| s.payload().and_then(|r| r.data))
            .collect();
        assert_eq!(data, vec![Some("a"), Some("b")]);
    }

    #[tokio::test]
    async fn test_zip_af_launch_cancelled_scope_suppresses_callback() {
        let ctx = context();
        let screen = ctx.lifecycle_scope("screen");
        let called = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&called);

        let handle = screen.zip_af_launch(
            vec![after(10_000, Ok(BaseResponse::new(200, "ok", None)))],
            move |_: Vec<ResultState<Response>>| {
                inner.fetch_add(1, Ordering::SeqCst);
            },
        );
        screen.cancel();
        assert_eq!(handle.join().await, JoinOutcome::Cancelled);
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }
}
