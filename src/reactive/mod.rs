//! The reactive signal/effect/scope graph (§3, §4.2-§4.6).
//!
//! `runtime` owns the graph arena and scheduler-facing plumbing; everything else in this module
//! is a typed, ergonomic handle over it — none of the public constructors here touch `Runtime`
//! directly except through `with_runtime`.

pub mod context;
pub mod effect;
pub mod memo;
pub mod proxy;
pub mod runtime;
pub mod scheduler;
pub mod scope;
pub mod signal;

pub use context::with_async_context;
pub use effect::{batch, effect, effect_with, flush_sync, next_tick, on_cleanup, EffectHandle, EffectOptions};
pub use memo::{derived, derived_with, Memo};
pub use proxy::{
    mark_raw, raw, reactive, reactive_array, reactive_array_shallow, reactive_map, reactive_object,
    reactive_object_shallow, reactive_set, readonly, readonly_object, ArrayTarget, MapTarget,
    ObjectTarget, RawValue, ReactiveArray, ReactiveMap, ReactiveObject, ReactiveSet, ReactiveValue,
    ScalarKey, SetTarget,
};
pub use scheduler::EffectPhase;
pub use scope::{scope, Scope};
pub use signal::{readonly_signal, signal, signal_with, untracked, ReadOnlySignal, Signal, SignalOptions};
