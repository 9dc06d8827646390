//! Debug-only reentrancy detection.
//!
//! Table operations call user code through `K: Eq` (and `K: Hash` at
//! insert) while chains are being scanned or rebuilt. If that user code
//! calls back into the same table, it can observe a half-built bucket
//! array. In debug builds the flag panics on nested entry; in release
//! builds it compiles away.

use core::cell::Cell;
use core::marker::PhantomData;

/// Embedded per-table flag. Guard method bodies with
/// `let _active = self.reentry.activate();`.
#[derive(Debug, Default)]
pub(crate) struct ReentryFlag {
    #[cfg(debug_assertions)]
    active: Cell<bool>,
    // Keep auto-traits identical across debug/release builds (!Sync either way).
    _marker: PhantomData<Cell<bool>>,
}

impl ReentryFlag {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(false),
            _marker: PhantomData,
        }
    }

    /// Mark the table busy for the scope of the returned value.
    #[inline]
    pub(crate) fn activate(&self) -> Active<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.active.replace(true),
                "reentrant call into ChainedHashMap from user Eq/Hash code"
            );
        }
        Active { flag: self }
    }
}

/// RAII scope marker; clears the flag on drop.
pub(crate) struct Active<'a> {
    flag: &'a ReentryFlag,
}

impl Drop for Active<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.flag.active.set(false);
        let _ = self.flag;
    }
}

#[cfg(test)]
mod tests {
    use super::ReentryFlag;

    #[test]
    fn sequential_activations_are_fine() {
        let f = ReentryFlag::new();
        drop(f.activate());
        drop(f.activate());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_activation_panics_in_debug() {
        let f = ReentryFlag::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = f.activate();
            let _inner = f.activate();
        }));
        assert!(res.is_err(), "nested activate must panic in debug builds");
    }

    #[test]
    fn flag_clears_after_panic_free_scope() {
        let f = ReentryFlag::new();
        {
            let _a = f.activate();
        }
        // Would panic here if the scope above leaked the flag.
        let _b = f.activate();
    }
}
