//! Launch context: the explicitly owned configuration every launch uses.
//!
//! Holds the error registry, settings, main-context dispatcher and the
//! runtime handle background work is spawned on. Cloning is cheap; all
//! clones share the same registry and dispatcher.

use std::fmt;
use std::sync::Arc;

use lvhttp_core::{
    ErrorRegistry, InlineDispatcher, LaunchSettings, MainDispatcher, validate_settings,
};
use tokio::runtime::Handle;

use crate::error::LaunchError;
use crate::scope::{LifecycleScope, ViewModelScope};

/// Shared state for launching requests.
#[derive(Clone)]
pub struct LaunchContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    registry: Arc<ErrorRegistry>,
    settings: LaunchSettings,
    main: Arc<dyn MainDispatcher>,
    runtime: Handle,
}

impl LaunchContext {
    /// Start building a context.
    pub fn builder() -> LaunchContextBuilder {
        LaunchContextBuilder::default()
    }

    /// Error handlers consulted on failure.
    pub fn registry(&self) -> &Arc<ErrorRegistry> {
        &self.inner.registry
    }

    pub fn settings(&self) -> &LaunchSettings {
        &self.inner.settings
    }

    /// The main-context dispatcher.
    pub fn main(&self) -> &dyn MainDispatcher {
        self.inner.main.as_ref()
    }

    /// Runtime background work is spawned on.
    pub fn runtime(&self) -> &Handle {
        &self.inner.runtime
    }

    /// Create a scope tied to a UI-lifecycle owner.
    pub fn lifecycle_scope(&self, name: impl Into<String>) -> LifecycleScope {
        LifecycleScope::new(self.clone(), name)
    }

    /// Create a scope tied to a view-model owner.
    pub fn view_model_scope(&self, name: impl Into<String>) -> ViewModelScope {
        ViewModelScope::new(self.clone(), name)
    }
}

impl fmt::Debug for LaunchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchContext")
            .field("registry", &self.inner.registry)
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

/// Builder for [`LaunchContext`].
#[derive(Default)]
pub struct LaunchContextBuilder {
    registry: Option<Arc<ErrorRegistry>>,
    settings: LaunchSettings,
    main: Option<Arc<dyn MainDispatcher>>,
    runtime: Option<Handle>,
}

impl LaunchContextBuilder {
    /// Use a shared registry. Defaults to an empty one.
    #[must_use]
    pub fn registry(mut self, registry: Arc<ErrorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: LaunchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the main-context dispatcher. Defaults to [`InlineDispatcher`].
    #[must_use]
    pub fn main(mut self, main: Arc<dyn MainDispatcher>) -> Self {
        self.main = Some(main);
        self
    }

    /// Set the background runtime. Defaults to the current runtime.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Validate settings and build the context.
    pub fn build(self) -> Result<LaunchContext, LaunchError> {
        validate_settings(&self.settings)?;
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|e| LaunchError::NoRuntime(e.to_string()))?,
        };
        Ok(LaunchContext {
            inner: Arc::new(ContextInner {
                registry: self.registry.unwrap_or_default(),
                settings: self.settings,
                main: self
                    .main
                    .unwrap_or_else(|| Arc::new(InlineDispatcher::new())),
                runtime,
            }),
        })
    }
}
