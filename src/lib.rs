//! A fine-grained reactive runtime core for a declarative UI framework.
//!
//! This crate implements the host-agnostic half of such a framework: a signal/effect/scope
//! dependency graph with a three-phase scheduler (§4.1-§4.4), reactive object/array/map/set
//! wrappers over plain data (§4.5), a context store for dependency injection (§4.6), a typed
//! vnode model with a normalizing construction algorithm (§4.7), a keyed-children reconciler
//! built on a longest-increasing-subsequence move count (§4.8), the component runtime that drives
//! a build function under its own render effect and bubbles its errors up the component tree
//! (§4.9), and a driver dispatch table (§4.10). None of it knows what a "browser" or a "native
//! widget" is — every effect it has on the outside world goes through the [`driver::HostDriver`]
//! trait a platform adapter implements (§6 "Host adapter (C10)").
//!
//! Grounded on `packages/hooks/src/lib.rs`'s `mod x; pub use x::*;` re-export convention (this
//! crate's single-package layout does not carry that workspace's per-package split, so every
//! module lives directly under this root instead of across `dioxus-core`/`dioxus-signals`/
//! `dioxus-hooks`).

pub mod app;
pub mod component;
pub mod dispatcher;
pub mod driver;
pub mod error;
pub mod reactive;
pub mod reconciler;
pub mod vnode;

pub use app::{create_app, App, AppConfig, MountTarget, Plugin};
pub use component::{
    begin_async_init, current_component, current_props, inject, is_suspended, on_error, on_hook,
    provide, ComponentId, ComponentProps, ComponentStateName, ErrorHookOutcome, HookStage,
    SuspenseGuard,
};
pub use dispatcher::DirectiveSpec;
pub use driver::{DriverHandle, HostDriver, HostHandle};
pub use error::{CoreError, CoreResult, ReactivityError, ShapeError};
pub use reconciler::patch;
pub use vnode::{
    create_dynamic, create_list, create_vnode, AnyAttributeValue, AttributeValue, ChildInput,
    ComponentFn, DirectiveBinding, ListenerFn, MemoKey, MountState, NodeKind, NodeType, Props,
    VMemo, VNode, VNodeInput,
};

// The reactive graph's public surface (`signal`, `derived`, `effect`, `scope`, `reactive`,
// `readonly`, `raw`, `untracked`, `batch`, `next_tick`, `flush_sync`, ...) is already flattened
// by `reactive::mod` itself (§6's "kind-level, no language signatures" public API list); this
// just lifts that flattening one level further, to the crate root.
pub use reactive::{
    batch, derived, derived_with, effect, effect_with, flush_sync, mark_raw, next_tick,
    on_cleanup, raw, reactive, reactive_array, reactive_array_shallow, reactive_map,
    reactive_object, reactive_object_shallow, reactive_set, readonly, readonly_object,
    readonly_signal, scope, signal, signal_with, untracked, with_async_context, ArrayTarget,
    EffectHandle, EffectOptions, EffectPhase, MapTarget, Memo, ObjectTarget, RawValue,
    ReactiveArray, ReactiveMap, ReactiveObject, ReactiveSet, ReactiveValue, ReadOnlySignal, Scope,
    ScalarKey, SetTarget, Signal, SignalOptions,
};
