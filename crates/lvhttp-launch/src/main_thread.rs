//! Dedicated main-context thread.
//!
//! Results and error handlers are delivered on one serialized context. In a
//! GUI that is the UI thread; for CLI and service callers this module
//! provides an equivalent: a single named OS thread draining a FIFO channel
//! of jobs.
//!
//! The public [`MainThread`] is the `Send + Sync` handle. It implements
//! [`MainDispatcher`], so launch contexts can hold it as
//! `Arc<dyn MainDispatcher>` without knowing it is a thread.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, PoisonError, mpsc};
use std::thread::{self, ThreadId};

use lvhttp_core::{MainDispatcher, MainJob};
use tokio::sync::oneshot;

use crate::error::LaunchError;

/// Name given to the delivery thread.
pub const MAIN_THREAD_NAME: &str = "lvhttp-main";

// ── Commands ───────────────────────────────────────────────────────

/// A command sent to the main thread.
enum MainCommand {
    /// Run a job.
    Run(MainJob),

    /// Stop after everything queued before this command has run.
    Shutdown,
}

// ── Handle (Send + Sync proxy) ─────────────────────────────────────

/// `Send + Sync` handle to the dedicated main thread.
///
/// Jobs run one at a time, in dispatch order. A panicking job is logged and
/// the thread keeps serving. Dropping the handle lets queued jobs finish,
/// then stops and joins the thread.
pub struct MainThread {
    cmd_tx: mpsc::Sender<MainCommand>,
    thread_id: ThreadId,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl MainThread {
    /// Spawn the main thread and return its handle.
    pub fn spawn() -> Result<Self, LaunchError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<MainCommand>();

        let thread = thread::Builder::new()
            .name(MAIN_THREAD_NAME.into())
            .spawn(move || Self::run(&cmd_rx))
            .map_err(|e| LaunchError::SpawnMainThread(e.to_string()))?;

        Ok(Self {
            cmd_tx,
            thread_id: thread.thread().id(),
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Id of the delivery thread.
    pub const fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Stop the thread after queued jobs drain and wait for it.
    ///
    /// Called from a job running on the main thread itself, this only
    /// requests the stop; it cannot wait for its own thread.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(MainCommand::Shutdown);
        if thread::current().id() == self.thread_id {
            return;
        }
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("Main thread terminated abnormally");
            }
        }
    }

    // ── Main thread event loop ─────────────────────────────────────

    fn run(cmd_rx: &mpsc::Receiver<MainCommand>) {
        tracing::debug!("Main thread started");
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                MainCommand::Run(job) => {
                    if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
                        tracing::error!(
                            panic = %panic_message(payload.as_ref()),
                            "Main-context job panicked"
                        );
                    }
                }
                MainCommand::Shutdown => break,
            }
        }
        tracing::debug!("Main thread stopped");
    }
}

impl MainDispatcher for MainThread {
    fn dispatch(&self, job: MainJob) {
        if self.cmd_tx.send(MainCommand::Run(job)).is_err() {
            tracing::warn!("Main thread is gone; dropping job");
        }
    }

    fn is_main_context(&self) -> bool {
        thread::current().id() == self.thread_id
    }
}

impl Drop for MainThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── Hand-off helpers ───────────────────────────────────────────────

/// Run `f` on the main context and wait for its result.
///
/// If the caller already is the main context, `f` runs inline. A panic in
/// `f` is caught and reported as [`LaunchError::JobPanicked`].
pub async fn with_main<R, F>(dispatcher: &dyn MainDispatcher, f: F) -> Result<R, LaunchError>
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    if dispatcher.is_main_context() {
        return run_guarded(f);
    }

    let (tx, rx) = oneshot::channel();
    dispatcher.dispatch(Box::new(move || {
        let _ = tx.send(run_guarded(f));
    }));
    rx.await.unwrap_or(Err(LaunchError::MainContextGone))
}

fn run_guarded<R>(f: impl FnOnce() -> R) -> Result<R, LaunchError> {
    catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| LaunchError::JobPanicked(panic_message(payload.as_ref())))
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
