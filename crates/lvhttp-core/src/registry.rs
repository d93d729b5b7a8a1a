//! Error handler registry.
//!
//! Maps an [`ErrorKey`] to a user callback. The registry is configured once
//! at startup and then read on every failure path, possibly from many
//! fanned-out tasks at once, so lookups take a shared read lock and clone
//! the handler `Arc` out before it is called.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{ErrorKey, RequestError};

/// A registered error handler.
pub type ErrorHandler = Arc<dyn Fn(&RequestError) + Send + Sync>;

/// Thread-safe `ErrorKey -> handler` map.
#[derive(Default)]
pub struct ErrorRegistry {
    handlers: RwLock<HashMap<ErrorKey, ErrorHandler>>,
}

impl ErrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `key`, replacing any previous handler.
    ///
    /// Returns `true` if a handler was replaced.
    pub fn register<F>(&self, key: ErrorKey, handler: F) -> bool
    where
        F: Fn(&RequestError) + Send + Sync + 'static,
    {
        let replaced = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::new(handler))
            .is_some();
        tracing::debug!(%key, replaced, "Registered error handler");
        replaced
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_handler<F>(self, key: ErrorKey, handler: F) -> Self
    where
        F: Fn(&RequestError) + Send + Sync + 'static,
    {
        self.register(key, handler);
        self
    }

    /// Look up the handler for `key`.
    pub fn lookup(&self, key: ErrorKey) -> Option<ErrorHandler> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Remove the handler for `key`. Returns `true` if one was registered.
    pub fn unregister(&self, key: ErrorKey) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
            .is_some()
    }

    pub fn is_registered(&self, key: ErrorKey) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered keys in classification order.
    pub fn keys(&self) -> Vec<ErrorKey> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        ErrorKey::ALL
            .into_iter()
            .filter(|k| handlers.contains_key(k))
            .collect()
    }
}

impl fmt::Debug for ErrorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_register_and_lookup() {
        let registry = ErrorRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup(ErrorKey::Timeout).is_none());

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        assert!(!registry.register(ErrorKey::Timeout, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let handler = registry.lookup(ErrorKey::Timeout).unwrap();
        handler(&RequestError::timeout("slow"));
        handler(&RequestError::timeout("slower"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(registry.is_registered(ErrorKey::Timeout));
        assert!(!registry.is_registered(ErrorKey::Connect));
    }

    #[test]
    fn test_register_replaces_previous_handler() {
        let registry = ErrorRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = Arc::clone(&first);
        registry.register(ErrorKey::CatchAll, move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        });
        let s = Arc::clone(&second);
        assert!(registry.register(ErrorKey::CatchAll, move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        }));

        registry.lookup(ErrorKey::CatchAll).unwrap()(&RequestError::Cancelled);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister() {
        let registry = ErrorRegistry::new().with_handler(ErrorKey::Code, |_| {});
        assert!(registry.unregister(ErrorKey::Code));
        assert!(!registry.unregister(ErrorKey::Code));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_keys_follow_classification_order() {
        let registry = ErrorRegistry::new()
            .with_handler(ErrorKey::CatchAll, |_| {})
            .with_handler(ErrorKey::Timeout, |_| {})
            .with_handler(ErrorKey::Code, |_| {});
        assert_eq!(
            registry.keys(),
            vec![ErrorKey::Timeout, ErrorKey::Code, ErrorKey::CatchAll]
        );
        assert!(format!("{registry:?}").contains("Timeout"));
    }

    #[test]
    fn test_concurrent_reads() {
        let registry = Arc::new(ErrorRegistry::new().with_handler(ErrorKey::Http, |_| {}));
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..100).all(|_| registry.lookup(ErrorKey::Http).is_some())
                })
            })
            .collect();
        for t in threads {
            assert!(t.join().unwrap());
        }
    }
}
