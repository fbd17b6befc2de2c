//! # Ordered subscriber registry.
//!
//! [`SubscriberRegistry`] keeps registered subscribers in insertion order and
//! deduplicates them by instance identity (the `Arc` allocation, not the type).
//!
//! ## Rules
//! - A given instance appears at most once.
//! - Reads (snapshot) and writes (register/unregister) exclude each other.
//! - The lock guards registry access only; it is never held while a
//!   subscriber runs or while the dispatcher awaits queue space.

use std::sync::{Arc, PoisonError, RwLock};

use crate::subscribers::Subscribe;

/// Returns true if both handles point at the same subscriber instance.
#[inline]
pub(crate) fn same_instance(a: &Arc<dyn Subscribe>, b: &Arc<dyn Subscribe>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Insertion-ordered set of subscribers.
#[derive(Default)]
pub struct SubscriberRegistry {
    entries: RwLock<Vec<Arc<dyn Subscribe>>>,
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `sub` unless the same instance is already registered.
    ///
    /// Returns `true` if the registry grew.
    pub fn register(&self, sub: Arc<dyn Subscribe>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|s| same_instance(s, &sub)) {
            return false;
        }
        entries.push(sub);
        true
    }

    /// Removes `sub` if present, keeping the order of the others.
    ///
    /// Returns `true` if something was removed.
    pub fn unregister(&self, sub: &Arc<dyn Subscribe>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|s| !same_instance(s, sub));
        entries.len() != before
    }

    /// Returns the current subscribers in registration order.
    pub fn snapshot(&self) -> Vec<Arc<dyn Subscribe>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns true if `sub` is registered.
    pub fn contains(&self, sub: &Arc<dyn Subscribe>) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|s| same_instance(s, sub))
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
