//! User defaults shared by an invoker lineage.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::params::ParameterSet;

/// Process-wide user defaults. Starts empty; clones refer to the same set.
#[derive(Debug, Clone, Default)]
pub struct DefaultsStore {
    /// Current defaults.
    inner: Arc<Mutex<ParameterSet>>,
}

impl DefaultsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `partial` over the current defaults. Undefined values are skipped.
    pub fn set(&self, partial: &ParameterSet) {
        let unknown = partial.unknown_keys();
        if !unknown.is_empty() {
            warn!(keys = ?unknown, "set_defaults: unknown parameter names");
        }
        let mut guard = self.inner.lock();
        guard.overlay(partial);
        debug!(count = guard.len(), "defaults updated");
    }

    /// Return to an empty set.
    pub fn reset(&self) {
        *self.inner.lock() = ParameterSet::new();
        debug!("defaults reset");
    }

    /// Copy of the current defaults.
    pub fn snapshot(&self) -> ParameterSet {
        self.inner.lock().clone()
    }

    /// Returns true when both handles refer to the same defaults.
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{HTML, Param, TITLE};

    #[test]
    fn set_merges_and_reset_empties() {
        let store = DefaultsStore::new();
        store.set(&ParameterSet::from([(HTML, "foo"), (TITLE, "t")]));
        store.set(&ParameterSet::from([(TITLE, "u")]).with(HTML, Param::Undefined));
        assert_eq!(
            store.snapshot(),
            ParameterSet::from([(HTML, "foo"), (TITLE, "u")])
        );

        let shared = store.clone();
        shared.reset();
        assert!(store.snapshot().is_empty());
        assert!(shared.same_store(&store));
    }
}
