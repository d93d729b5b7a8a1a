//! Port definitions (trait abstractions) for lvhttp.
//!
//! Ports describe what the orchestration layer needs from its environment
//! without naming a concrete implementation.

mod main_dispatcher;

pub use main_dispatcher::{InlineDispatcher, MainDispatcher, MainJob};
