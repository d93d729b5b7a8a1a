//! The `launch*` entry points.
//!
//! | entry point | owner | strategy | eager loading |
//! |---|---|---|---|
//! | [`LifecycleScope::launch_af`] | lifecycle scope | enveloped | placeholder |
//! | [`LifecycleScope::launch_af_http`] | lifecycle scope | unwrapped | `None` |
//! | [`ViewModelScope::launch_vm`] | view-model scope | enveloped | placeholder |
//! | [`ViewModelScope::launch_vm_http`] | view-model scope | unwrapped | `None` |
//! | [`LaunchContext::launch_http`] | caller's future | enveloped | - |
//! | [`LaunchContext::launch_http_pack`] | caller's future | unwrapped | - |
//!
//! Scoped launches call the callback at most twice: `Loading` on the
//! caller's thread before any background work is scheduled, then one
//! terminal state on the main context.

use std::future::Future;

use lvhttp_core::{
    Enveloped, Envelope, RequestError, RequestResult, ResponseStrategy, ResultState, Unwrapped,
};
use tokio_util::sync::CancellationToken;

use crate::classify::try_catch;
use crate::context::LaunchContext;
use crate::main_thread::with_main;
use crate::scope::{JoinOutcome, LaunchHandle, LifecycleScope, Scope, ViewModelScope};

/// Callback type for unwrapped launches that need no callback.
pub type NoCallback<T> = fn(ResultState<T>);

/// A typed `None` for the optional callback of
/// [`LifecycleScope::launch_af_http`] and [`ViewModelScope::launch_vm_http`].
pub const fn no_callback<T>() -> Option<NoCallback<T>> {
    None
}

impl Scope {
    fn launch_with<T, S, F, Fut, C>(
        &self,
        strategy: S,
        producer: F,
        mut callback: Option<C>,
    ) -> LaunchHandle
    where
        T: Send + 'static,
        S: ResponseStrategy<T> + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<T>> + Send + 'static,
        C: FnMut(ResultState<T>) + Send + 'static,
    {
        if let Some(cb) = callback.as_mut() {
            cb(ResultState::Loading(strategy.loading_payload()));
        }

        let token = self.task_token();
        let task_token = token.clone();
        let ctx = self.context().clone();
        let scope = self.shared_name();
        let runtime = ctx.runtime().clone();
        tracing::debug!(scope = %scope, kind = %self.kind(), "Launching request");

        let task = runtime.spawn(async move {
            let state = tokio::select! {
                biased;
                () = task_token.cancelled() => None,
                state = try_catch(&ctx, &strategy, producer) => Some(state),
            };
            let Some(state) = state else {
                tracing::debug!(scope = %scope, "Request cancelled before completion");
                return JoinOutcome::Cancelled;
            };
            match callback {
                Some(mut cb) => deliver(&ctx, &scope, task_token, move || cb(state)).await,
                None => JoinOutcome::Delivered,
            }
        });
        LaunchHandle::new(token, task)
    }
}

/// Run `job` on the main context unless `token` was cancelled first.
///
/// The cancellation check happens on the main context itself, so a scope
/// cancelled from the main thread never sees a late delivery.
pub(crate) async fn deliver<F>(
    ctx: &LaunchContext,
    scope: &str,
    token: CancellationToken,
    job: F,
) -> JoinOutcome
where
    F: FnOnce() + Send + 'static,
{
    let result = with_main(ctx.main(), move || {
        if token.is_cancelled() {
            return false;
        }
        job();
        true
    })
    .await;

    match result {
        Ok(true) => JoinOutcome::Delivered,
        Ok(false) => {
            tracing::debug!(scope, "Delivery skipped for cancelled request");
            JoinOutcome::Cancelled
        }
        Err(e) => {
            tracing::error!(scope, error = %e, "Result delivery failed");
            JoinOutcome::Failed(e.to_string())
        }
    }
}

/// State reported for a request whose task ended without producing one.
pub(crate) fn abandoned<T, S>(ctx: &LaunchContext, strategy: &S) -> ResultState<T>
where
    S: ResponseStrategy<T> + ?Sized,
{
    let error = RequestError::Cancelled;
    let payload = strategy.failure_payload(&error, &ctx.settings().network_error_message);
    ResultState::error(payload, error)
}

impl LifecycleScope {
    /// Launch a request returning an [`Envelope`].
    ///
    /// `callback` gets `Loading(placeholder)` immediately, then the
    /// terminal state on the main context.
    pub fn launch_af<E, F, Fut, C>(&self, producer: F, callback: C) -> LaunchHandle
    where
        E: Envelope + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<E>> + Send + 'static,
        C: FnMut(ResultState<E>) + Send + 'static,
    {
        self.scope.launch_with(Enveloped, producer, Some(callback))
    }

    /// Launch a request returning a bare payload. No code verification.
    ///
    /// With a callback, it gets `Loading(None)` immediately, then the
    /// terminal state on the main context. Pass [`no_callback`] to fire and
    /// forget; failures still reach the registered handlers.
    pub fn launch_af_http<T, F, Fut, C>(&self, producer: F, callback: Option<C>) -> LaunchHandle
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<T>> + Send + 'static,
        C: FnMut(ResultState<T>) + Send + 'static,
    {
        self.scope.launch_with(Unwrapped, producer, callback)
    }
}

impl ViewModelScope {
    /// Launch a request returning an [`Envelope`]. See
    /// [`LifecycleScope::launch_af`].
    pub fn launch_vm<E, F, Fut, C>(&self, producer: F, callback: C) -> LaunchHandle
    where
        E: Envelope + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<E>> + Send + 'static,
        C: FnMut(ResultState<E>) + Send + 'static,
    {
        self.scope.launch_with(Enveloped, producer, Some(callback))
    }

    /// Launch a request returning a bare payload. See
    /// [`LifecycleScope::launch_af_http`].
    pub fn launch_vm_http<T, F, Fut, C>(&self, producer: F, callback: Option<C>) -> LaunchHandle
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<T>> + Send + 'static,
        C: FnMut(ResultState<T>) + Send + 'static,
    {
        self.scope.launch_with(Unwrapped, producer, callback)
    }
}

impl LaunchContext {
    /// Run an enveloped request on the background runtime and return its
    /// classified state. Error handlers still run on the main context.
    pub async fn launch_http<E, F, Fut>(&self, producer: F) -> ResultState<E>
    where
        E: Envelope + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<E>> + Send + 'static,
    {
        self.run_in_background(Enveloped, producer).await
    }

    /// Run a bare-payload request on the background runtime and return its
    /// classified state.
    pub async fn launch_http_pack<T, F, Fut>(&self, producer: F) -> ResultState<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<T>> + Send + 'static,
    {
        self.run_in_background(Unwrapped, producer).await
    }

    async fn run_in_background<T, S, F, Fut>(&self, strategy: S, producer: F) -> ResultState<T>
    where
        T: Send + 'static,
        S: ResponseStrategy<T> + Copy + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RequestResult<T>> + Send + 'static,
    {
        let ctx = self.clone();
        let joined = self
            .runtime()
            .spawn(async move { try_catch(&ctx, &strategy, producer).await })
            .await;
        joined.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Request task did not complete");
            abandoned(self, &strategy)
        })
    }
}
