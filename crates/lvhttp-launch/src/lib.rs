//! Request orchestration for lvhttp.
//!
//! Launch a producer on the background runtime, classify its outcome into a
//! [`ResultState`](lvhttp_core::ResultState), route failures to registered
//! handlers, and deliver the result on the serialized main context.
//!
//! # Wiring
//!
//! ```ignore
//! let main = Arc::new(MainThread::spawn()?);
//! let ctx = LaunchContext::builder().main(main).build()?;
//! ctx.registry().register(ErrorKey::Timeout, |e| eprintln!("timed out: {e}"));
//!
//! let screen = ctx.lifecycle_scope("articles");
//! let handle = screen.launch_af(move || client.get("/articles"), |state| render(state));
//! ```

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tokio_test as _;

pub mod classify;
pub mod context;
pub mod error;
pub mod launch;
pub mod main_thread;
pub mod scope;
pub mod zip;

pub use classify::{Dispatched, try_catch, try_catch_enveloped, try_catch_unwrapped};
pub use context::{LaunchContext, LaunchContextBuilder};
pub use error::LaunchError;
pub use launch::{NoCallback, no_callback};
pub use main_thread::{MAIN_THREAD_NAME, MainThread, with_main};
pub use scope::{JoinOutcome, LaunchHandle, LifecycleScope, Scope, ScopeKind, ViewModelScope};
pub use zip::{Producer, boxed_producer};
