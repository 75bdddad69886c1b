//! `Memo<T>` — lazily-recomputed derived signals (§3 "Derived signal", §4.1).
//!
//! Grounded on the dirty-flag lazy-recompute model implied by the `leptos_reactive` node kinds
//! referenced in `other_examples/.../leptos_reactive-src-runtime.rs.rs`; `packages/hooks/src/
//! use_memo.rs` is the teacher's nearest analogue by name (a cached derivation invalidated by
//! its inputs) though its dependency-tracking mechanics differ enough that only the concept,
//! not the code, carries over.

use std::any::Any;
use std::marker::PhantomData;

use crate::reactive::runtime::{with_runtime, NodeId};

/// A signal whose value is the return of a pure function, recomputed lazily on first read after
/// any source invalidation (§3 "Derived signal").
pub struct Memo<T> {
    pub(crate) node: NodeId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for Memo<T> {}
impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Memo<T> {
    /// Recomputes (if dirty) and reads the cached value, registering a dependency link in the
    /// active collector frame exactly as a plain signal read would.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        with_runtime(|rt| rt.memo_read(self.node, f))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.read(|v| v.clone())
    }
}

/// Creates a derived signal (§6 public API `derived(fn, options?)`).
///
/// `compute` runs inside a fresh collector frame on first read and on every read after a source
/// it previously touched was written; its prior link set is fully replaced each run, so a
/// `compute` that conditionally reads different signals across runs tracks only what it actually
/// read last time (no stale dependencies, per §4.3's "clears previous link set" invariant, which
/// applies identically to memos).
pub fn derived<T: PartialEq + 'static>(mut compute: impl FnMut() -> T + 'static) -> Memo<T> {
    derived_with(move || compute(), |a: &T, b: &T| a == b)
}

/// As [`derived`] but with an explicit equality override, mirroring [`super::signal::signal_with`].
pub fn derived_with<T: 'static>(
    mut compute: impl FnMut() -> T + 'static,
    equals: impl Fn(&T, &T) -> bool + 'static,
) -> Memo<T> {
    let boxed_compute: Box<dyn FnMut() -> Box<dyn Any>> = Box::new(move || Box::new(compute()) as Box<dyn Any>);
    let boxed_equals: Box<dyn Fn(&dyn Any, &dyn Any) -> bool> = Box::new(move |a, b| {
        equals(
            a.downcast_ref::<T>().expect("memo type mismatch"),
            b.downcast_ref::<T>().expect("memo type mismatch"),
        )
    });
    let node = with_runtime(|rt| rt.create_memo_node(boxed_compute, boxed_equals));
    Memo {
        node,
        _marker: PhantomData,
    }
}
