//! Launch scopes and task handles.
//!
//! A scope stands for the owner of a set of requests (a screen, a view
//! model). Every task launched from a scope is cancelled when the scope is
//! cancelled or dropped, and each launch also returns its own
//! [`LaunchHandle`]. A cancelled task never delivers its terminal state.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::context::LaunchContext;

/// What kind of owner a scope represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// A UI-lifecycle owner (screen, window).
    Lifecycle,
    /// A view-model owner that outlives individual views.
    ViewModel,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lifecycle => f.write_str("lifecycle"),
            Self::ViewModel => f.write_str("view_model"),
        }
    }
}

/// An owner of launched requests.
pub struct Scope {
    name: Arc<str>,
    kind: ScopeKind,
    token: CancellationToken,
    ctx: LaunchContext,
}

impl Scope {
    pub(crate) fn new(ctx: LaunchContext, name: impl Into<String>, kind: ScopeKind) -> Self {
        let name: Arc<str> = Arc::from(name.into());
        tracing::debug!(scope = %name, %kind, "Scope created");
        Self {
            name,
            kind,
            token: CancellationToken::new(),
            ctx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub const fn context(&self) -> &LaunchContext {
        &self.ctx
    }

    /// Cancel every task launched from this scope.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!(scope = %self.name, "Scope cancelled");
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Token for one task: cancelled by the task's handle or by the scope.
    pub(crate) fn task_token(&self) -> CancellationToken {
        self.token.child_token()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Scope bound to a UI-lifecycle owner.
///
/// Entry points: [`launch_af`](Self::launch_af),
/// [`launch_af_http`](Self::launch_af_http),
/// [`zip_af_launch`](Self::zip_af_launch).
#[derive(Debug)]
pub struct LifecycleScope {
    pub(crate) scope: Scope,
}

impl LifecycleScope {
    pub(crate) fn new(ctx: LaunchContext, name: impl Into<String>) -> Self {
        Self {
            scope: Scope::new(ctx, name, ScopeKind::Lifecycle),
        }
    }

    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Cancel every task launched from this scope.
    pub fn cancel(&self) {
        self.scope.cancel();
    }
}

/// Scope bound to a view-model owner.
///
/// Entry points: [`launch_vm`](Self::launch_vm),
/// [`launch_vm_http`](Self::launch_vm_http).
#[derive(Debug)]
pub struct ViewModelScope {
    pub(crate) scope: Scope,
}

impl ViewModelScope {
    pub(crate) fn new(ctx: LaunchContext, name: impl Into<String>) -> Self {
        Self {
            scope: Scope::new(ctx, name, ScopeKind::ViewModel),
        }
    }

    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Cancel every task launched from this scope.
    pub fn cancel(&self) {
        self.scope.cancel();
    }
}

/// How a launched request ended, as seen by [`LaunchHandle::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The terminal state was handed to the callback, or there was none.
    Delivered,
    /// The handle or the scope was cancelled before delivery.
    Cancelled,
    /// Delivery did not happen for another reason: the callback panicked,
    /// the main context went away or the task itself died.
    Failed(String),
}

impl JoinOutcome {
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Handle to one launched request.
///
/// Dropping the handle does not cancel the task; call [`cancel`](Self::cancel)
/// or cancel the owning scope.
#[derive(Debug)]
pub struct LaunchHandle {
    token: CancellationToken,
    task: JoinHandle<JoinOutcome>,
}

impl LaunchHandle {
    pub(crate) const fn new(token: CancellationToken, task: JoinHandle<JoinOutcome>) -> Self {
        Self { token, task }
    }

    /// Cancel the request. Its terminal state will not be delivered.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the background task has finished (delivered or cancelled).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task and report how it ended.
    pub async fn join(self) -> JoinOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => JoinOutcome::Cancelled,
            Err(e) => {
                tracing::warn!(error = %e, "Launch task did not complete");
                JoinOutcome::Failed(e.to_string())
            }
        }
    }
}
