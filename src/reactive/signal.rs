//! `Signal<T>` — the writable cell primitive (§3 "Signal", §4.1).
//!
//! Grounded on `packages/signals/src/signal.rs`'s shape (`Signal<T, S>` as a thin `Copy` handle
//! into shared storage) with `generational-box`'s `CopyValue`/`Storage` machinery and the
//! `Arc<RwLock<..>>` sync path dropped: the single-threaded cooperative model (SPEC_FULL.md §5)
//! needs neither, so a handle is just a [`NodeId`] into [`Runtime`].

use std::any::Any;
use std::marker::PhantomData;

use crate::error::{CoreResult, ReactivityError};
use crate::reactive::runtime::{with_runtime, NodeId};

/// Per-signal equality override. Defaults to `PartialEq::eq`; pass a custom comparator for
/// types where structural equality is too eager or too loose (the default does not special-case
/// floating-point `NaN`/`-0.0` the way `Object.is` does — supply `|a, b| a.to_bits() ==
/// b.to_bits()` if that distinction matters to a particular cell).
pub struct SignalOptions<T> {
    pub equals: Option<Box<dyn Fn(&T, &T) -> bool>>,
}

impl<T> Default for SignalOptions<T> {
    fn default() -> Self {
        SignalOptions { equals: None }
    }
}

impl<T> SignalOptions<T> {
    pub fn with_equals(equals: impl Fn(&T, &T) -> bool + 'static) -> Self {
        SignalOptions {
            equals: Some(Box::new(equals)),
        }
    }
}

/// A readable, writable reactive cell with identity (§3 "Signal").
///
/// `Copy` because the handle is just a [`NodeId`]; the value itself lives in [`Runtime`]'s node
/// arena, so cloning a `Signal` never clones `T`.
pub struct Signal<T> {
    pub(crate) node: NodeId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for Signal<T> {}
impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Signal<T> {
    /// Reads the current value. If a collector frame is active (i.e. this call happens inside
    /// an effect or memo's run), registers a dependency link; otherwise records nothing.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        with_runtime(|rt| rt.signal_read(self.node, f))
    }

    /// Convenience for `T: Clone`.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.read(|v| v.clone())
    }

    /// Overwrites the value. No-op (no dependents scheduled) if the new value compares equal
    /// under this signal's equality function.
    pub fn write(&self, next: T) {
        with_runtime(|rt| rt.signal_write(self.node, next));
    }

    /// Mutates the value in place. Unlike `write`, this always treats the value as changed
    /// (there is no prior value to compare `f`'s result against without cloning), so prefer
    /// `write` when the new value is cheap to construct and equality-check is meaningful.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        with_runtime(|rt| rt.signal_update(self.node, f));
    }
}

/// A signal created with no write half exposed to the holder (§4.1 "Writes to non-writable
/// signals fail with `ReadOnlyWrite`"). Wraps the same node as a `Signal<T>` would but only
/// exposes `read`.
pub struct ReadOnlySignal<T> {
    inner: Signal<T>,
}

impl<T> Copy for ReadOnlySignal<T> {}
impl<T> Clone for ReadOnlySignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> ReadOnlySignal<T> {
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.read(f)
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.get()
    }

    /// Always fails: a readonly handle exposes no write path.
    pub fn try_write(&self, _next: T) -> CoreResult<()> {
        Err(ReactivityError::ReadOnlyWrite.into())
    }
}

fn box_equals<T: PartialEq + 'static>(options: SignalOptions<T>) -> Box<dyn Fn(&dyn Any, &dyn Any) -> bool> {
    let custom = options.equals;
    Box::new(move |a, b| {
        let a = a.downcast_ref::<T>().expect("signal type mismatch");
        let b = b.downcast_ref::<T>().expect("signal type mismatch");
        match &custom {
            Some(eq) => eq(a, b),
            None => a == b,
        }
    })
}

/// Creates a new writable signal (§6 public API `signal(initial, options?)`).
pub fn signal<T: PartialEq + 'static>(initial: T) -> Signal<T> {
    signal_with(initial, SignalOptions::default())
}

/// As [`signal`] but with an explicit equality override.
pub fn signal_with<T: PartialEq + 'static>(initial: T, options: SignalOptions<T>) -> Signal<T> {
    let equals = box_equals(options);
    let node = with_runtime(|rt| rt.create_signal_node(Box::new(initial), equals));
    Signal {
        node,
        _marker: PhantomData,
    }
}

/// Wraps an existing signal so only `read` is reachable, per §4.1 "Writes to non-writable
/// signals fail with `ReadOnlyWrite`".
pub fn readonly_signal<T>(signal: Signal<T>) -> ReadOnlySignal<T> {
    ReadOnlySignal { inner: signal }
}

/// Runs `f` with dependency tracking suppressed: reads inside `f` register no links even if a
/// collector frame is active (§4.2 `pauseCollection`, public API `untracked(fn)`).
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    with_runtime(|rt| rt.untracked(f))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::reactive::effect::{effect, flush_sync};
    use crate::reactive::scope::scope;

    use super::{signal, signal_with, SignalOptions};

    #[test]
    fn write_reruns_subscriber_only_when_value_differs() {
        let runs = Rc::new(Cell::new(0));
        let runs_in_effect = Rc::clone(&runs);
        let (_scope, sig) = scope(|| {
            let s = signal(1);
            effect(move || {
                s.read(|_| {});
                runs_in_effect.set(runs_in_effect.get() + 1);
            });
            s
        });
        assert_eq!(runs.get(), 1, "effect runs once eagerly at creation");

        sig.write(1);
        flush_sync();
        assert_eq!(runs.get(), 1, "writing an equal value schedules nothing");

        sig.write(2);
        flush_sync();
        assert_eq!(runs.get(), 2, "writing a differing value reruns the subscriber once");

        sig.write(2);
        flush_sync();
        assert_eq!(runs.get(), 2, "repeating the same value again still reruns nothing");
    }

    #[test]
    fn custom_equals_overrides_structural_comparison() {
        let runs = Rc::new(Cell::new(0));
        let runs_in_effect = Rc::clone(&runs);
        let (_scope, sig) = scope(|| {
            // Every write compares equal under this override, however the payload differs.
            let s = signal_with(1, SignalOptions::with_equals(|_a: &i32, _b: &i32| true));
            effect(move || {
                s.read(|_| {});
                runs_in_effect.set(runs_in_effect.get() + 1);
            });
            s
        });
        assert_eq!(runs.get(), 1);

        sig.write(99);
        flush_sync();
        assert_eq!(runs.get(), 1, "custom equality vetoes the rerun despite a differing payload");
    }
}
