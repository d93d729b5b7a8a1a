//! Launch-layer errors.
//!
//! These never reach a request's caller: request failures are reported
//! through `ResultState`. `LaunchError` covers wiring problems (building a
//! context, spawning the main thread) and main-context hand-off failures,
//! which the launch layer logs and absorbs.

use lvhttp_core::SettingsError;
use thiserror::Error;

/// Errors from building or driving the launch machinery.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The dedicated main thread could not be spawned.
    #[error("failed to spawn main thread: {0}")]
    SpawnMainThread(String),

    /// The main context shut down before a job ran.
    #[error("main context is no longer running")]
    MainContextGone,

    /// A job panicked on the main context.
    #[error("main-context job panicked: {0}")]
    JobPanicked(String),

    /// No runtime handle was supplied and none is current.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(String),

    /// Settings failed validation.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
