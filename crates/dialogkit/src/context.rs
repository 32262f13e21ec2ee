//! Single-slot record of the most recent dispatch.
//!
//! Every invoker owns a [`ContextStore`]. While an invoker dispatches, its store is
//! pushed onto a per-thread scope stack; the terminal dispatch records the merged
//! parameters into every store on that stack. An invoker derived through `mixin()`
//! therefore observes calls that flowed through it, while calls made directly on
//! its base do not touch the derived invoker's slot.

use std::{cell::RefCell, mem, sync::Arc};

use parking_lot::Mutex;

use crate::params::ParameterSet;

thread_local! {
    /// Stores of the invokers currently dispatching on this thread, outermost first.
    static ACTIVE: RefCell<Vec<ContextStore>> = const { RefCell::new(Vec::new()) };
}

/// Snapshot returned by `get_current_context`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Context {
    /// Fully merged parameters of the most recent dispatch.
    pub params: ParameterSet,
}

/// Shared single-slot store. Clones refer to the same slot.
#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    /// Last recorded parameters; `None` until the first dispatch.
    slot: Arc<Mutex<Option<ParameterSet>>>,
}

impl ContextStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot.
    pub fn record(&self, params: ParameterSet) {
        *self.slot.lock() = Some(params);
    }

    /// Current context; empty parameters before the first dispatch.
    pub fn current(&self) -> Context {
        Context {
            params: self.slot.lock().clone().unwrap_or_default(),
        }
    }

    /// Returns true once something has been recorded.
    pub fn is_recorded(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Drop the recorded parameters.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// Returns true when both handles refer to the same slot.
    pub fn same_slot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    /// Enter a dispatch scope for this store. The scope ends when the guard drops.
    pub(crate) fn enter(&self) -> ScopeGuard {
        ACTIVE.with(|stack| stack.borrow_mut().push(self.clone()));
        ScopeGuard { _private: () }
    }

    /// Record `params` into this store and every store in the active dispatch scope.
    pub(crate) fn record_scoped(&self, params: &ParameterSet) {
        self.record(params.clone());
        let active = ACTIVE.with(|stack| stack.borrow().clone());
        for store in active.iter().filter(|s| !s.same_slot(self)) {
            store.record(params.clone());
        }
    }
}

/// Hide the active dispatch scope until the guard drops.
///
/// Dispatches started while suspended (for example from an `on_open` hook)
/// record only into their own invokers.
pub(crate) fn suspend() -> SuspendGuard {
    let saved = ACTIVE.with(|stack| mem::take(&mut *stack.borrow_mut()));
    SuspendGuard { saved }
}

/// Restores the suspended scope stack on drop.
pub(crate) struct SuspendGuard {
    /// Stack in effect when the scope was suspended.
    saved: Vec<ContextStore>,
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        let saved = mem::take(&mut self.saved);
        ACTIVE.with(|stack| *stack.borrow_mut() = saved);
    }
}

/// Pops the scope stack on drop, including during unwinding.
pub(crate) struct ScopeGuard {
    /// Prevents construction outside this module.
    _private: (),
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        ACTIVE.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TITLE;

    #[test]
    fn single_slot_last_write_wins() {
        let store = ContextStore::new();
        assert!(!store.is_recorded());
        assert!(store.current().params.is_empty());

        store.record(ParameterSet::from([(TITLE, "one"), ("footer", "f")]));
        store.record(ParameterSet::from([(TITLE, "two")]));
        assert_eq!(store.current().params, ParameterSet::from([(TITLE, "two")]));

        store.clear();
        assert!(!store.is_recorded());
    }

    #[test]
    fn scoped_record_reaches_enclosing_stores() {
        let outer = ContextStore::new();
        let inner = ContextStore::new();
        let bystander = ContextStore::new();
        {
            let _outer = outer.enter();
            let _inner = inner.enter();
            inner.record_scoped(&ParameterSet::from([(TITLE, "x")]));
        }
        assert_eq!(outer.current().params.get_str(TITLE), Some("x"));
        assert_eq!(inner.current().params.get_str(TITLE), Some("x"));
        assert!(!bystander.is_recorded());

        // Outside any scope only the recording store changes.
        inner.record_scoped(&ParameterSet::from([(TITLE, "y")]));
        assert_eq!(outer.current().params.get_str(TITLE), Some("x"));
        assert_eq!(inner.current().params.get_str(TITLE), Some("y"));
    }

    #[test]
    fn suspended_scope_is_restored() {
        let outer = ContextStore::new();
        let nested = ContextStore::new();
        let _outer = outer.enter();
        {
            let _hidden = suspend();
            let _nested = nested.enter();
            nested.record_scoped(&ParameterSet::from([(TITLE, "nested")]));
        }
        assert!(!outer.is_recorded());
        assert_eq!(nested.current().params.get_str(TITLE), Some("nested"));

        nested.record_scoped(&ParameterSet::from([(TITLE, "again")]));
        assert_eq!(outer.current().params.get_str(TITLE), Some("again"));
    }
}
