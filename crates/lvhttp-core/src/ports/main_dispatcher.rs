//! Main-context dispatcher port.
//!
//! Launch entry points run producers on a background runtime but deliver
//! results and invoke error handlers on a single serialized "main" context
//! (the UI thread in a GUI, a dedicated thread in a CLI). This trait keeps
//! that context pluggable.

/// A unit of work for the main context.
pub type MainJob = Box<dyn FnOnce() + Send + 'static>;

/// Trait for handing work to the main context.
///
/// # Implementations
///
/// - `InlineDispatcher` - runs jobs on the calling thread (tests, headless use)
/// - `lvhttp_launch::MainThread` - a dedicated, named delivery thread
pub trait MainDispatcher: Send + Sync {
    /// Queue `job` on the main context.
    ///
    /// Jobs run one at a time in the order they were dispatched. This method
    /// should not block.
    fn dispatch(&self, job: MainJob);

    /// Whether the calling thread is the main context.
    fn is_main_context(&self) -> bool;
}

/// A dispatcher that runs every job immediately on the caller's thread.
///
/// Every thread counts as the main context. Suitable for:
/// - Unit tests that only care about what was delivered
/// - Headless callers with no UI affinity
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl InlineDispatcher {
    /// Create a new inline dispatcher.
    pub const fn new() -> Self {
        Self
    }
}

impl MainDispatcher for InlineDispatcher {
    fn dispatch(&self, job: MainJob) {
        job();
    }

    fn is_main_context(&self) -> bool {
        true
    }
}
