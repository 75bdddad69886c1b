//! The component runtime (§3 "Component instance", "Hook store", §4.9 "Component runtime (C9)").
//!
//! Grounded on `packages/core/src/scope.rs`'s `ScopeState`-equivalent fields (hooks, provided
//! contexts, `schedule_update`) and `packages/hooks/src/use_shared_state.rs` for the
//! provide/inject walk; the suspense counter is grounded on `packages/core/src/scheduler/
//! suspense.rs` (name only — that file is a stub) plus SPEC_FULL.md §4.9's description of the
//! mechanism. Disposal-scope ownership (effects, cleanups, child scopes) is delegated entirely to
//! [`crate::reactive::scope::Scope`] rather than reimplemented here.

mod instance;
mod lifecycle;
mod props;

pub use instance::{ComponentId, ComponentStateName, ErrorHookOutcome, HookStage};
pub use lifecycle::{
    activate, deactivate, mount_component, report_error, unmount_component, update_component,
};
pub(crate) use lifecycle::{set_global_error_handler, sub_view_of};
pub use props::ComponentProps;

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use fxhash::FxHashMap;

use crate::reactive::context::{get_context, run_in_context, CURRENT_COMPONENT_TAG};
use crate::reactive::runtime::with_runtime;
use crate::reactive::scope::Scope;

thread_local! {
    /// The application-level provide table `inject` falls back to once no ancestor scope
    /// provides a matching key (§4.9 "or the application-level provide table"). Populated by
    /// `App::provide` (§6 `provide(name, value)` as an `App` method, not just a component one).
    static APP_PROVIDES: RefCell<FxHashMap<&'static str, Rc<dyn Any>>> = RefCell::new(FxHashMap::default());
}

pub(crate) fn app_provide(name: &'static str, value: Rc<dyn Any>) {
    APP_PROVIDES.with(|p| {
        p.borrow_mut().insert(name, value);
    });
}

fn app_inject(name: &'static str) -> Option<Rc<dyn Any>> {
    APP_PROVIDES.with(|p| p.borrow().get(name).cloned())
}

/// Returns the id of the component instance currently running its build function or a lifecycle
/// hook, if any. Backed by [`crate::reactive::context`]'s tag-stack rather than a bespoke global,
/// per §4.6's "never a global singleton map" design note.
pub fn current_component() -> Option<ComponentId> {
    get_context(CURRENT_COMPONENT_TAG).and_then(|v| v.downcast_ref::<ComponentId>().copied())
}

pub(crate) fn run_as_current<R>(id: ComponentId, f: impl FnOnce() -> R) -> R {
    run_in_context(CURRENT_COMPONENT_TAG, Rc::new(id) as Rc<dyn Any>, f)
}

/// Writes to the current instance's provide map (§4.9, §6 public API `provide(name, value)`).
///
/// # Panics
/// Panics if called with no component currently building — mirrors `effect()`'s panic on no
/// active scope, since a dangling `provide` with nowhere to attach is a programmer error.
pub fn provide<T: 'static>(name: &'static str, value: T) {
    let id = current_component().expect("provide() called with no component currently building");
    let scope = instance::with_instance(id, |inst| inst.scope).expect("component instance missing");
    with_runtime(|rt| rt.provide_context(scope.0, name, Rc::new(value) as Rc<dyn Any>));
}

/// Walks parent component scopes for `name`, falling back to `default` if no ancestor (or the
/// application-level provide table, via the root scope having no parent) provides it (§4.9, §6
/// public API `inject(name, default?)`).
pub fn inject<T: Clone + 'static>(name: &'static str, default: Option<T>) -> Option<T> {
    let id = current_component()?;
    let scope = instance::with_instance(id, |inst| inst.scope)?;
    with_runtime(|rt| rt.inject_context(scope.0, name))
        .or_else(|| app_inject(name))
        .and_then(|v| v.downcast_ref::<T>().cloned())
        .or(default)
}

/// Registers a function to run at the named lifecycle stage, scoped to the component currently
/// building (§3 "Hook store", "Hooks registered during build are scoped to the enclosing
/// component").
///
/// # Panics
/// Panics if called with no component currently building.
pub fn on_hook(stage: HookStage, f: impl FnMut() + 'static) {
    let id = current_component().expect("lifecycle hook registered with no component building");
    instance::with_instance_mut(id, |inst| inst.hooks.push(stage, Box::new(f)))
        .expect("component instance missing");
}

/// Registers this component's `onError` handler (the `error` hook stage, given a dedicated
/// entry point since its signature differs from the no-argument lifecycle hooks).
///
/// # Panics
/// Panics if called with no component currently building.
pub fn on_error(f: impl FnMut(&crate::error::CoreError, &'static str) -> ErrorHookOutcome + 'static) {
    let id = current_component().expect("on_error() registered with no component building");
    instance::with_instance_mut(id, |inst| inst.error_hook = Some(Box::new(f)))
        .expect("component instance missing");
}

/// Returns the props proxy for the component currently building, to be read from inside its
/// build function (§3 "Component instance... props (proxy)").
///
/// # Panics
/// Panics if called with no component currently building.
pub fn current_props() -> ComponentProps {
    let id = current_component().expect("current_props() called with no component building");
    instance::with_instance(id, |inst| inst.props.clone()).expect("component instance missing")
}

pub(crate) fn current_scope() -> Option<Scope> {
    let id = current_component()?;
    instance::with_instance(id, |inst| inst.scope)
}

/// An RAII marker that a component has pending async `init` work outstanding (§4.9 "suspense-
/// style async-init counter"). Held across an `await` point by the embedding host's own executor
/// (this crate drives no futures itself, see DESIGN.md §9.4); dropping it — on completion or on
/// panic-unwind out of the holding future — decrements the counter back down.
pub struct SuspenseGuard {
    id: ComponentId,
}

impl SuspenseGuard {
    fn new(id: ComponentId) -> Self {
        instance::with_instance(id, |inst| {
            inst.pending_async_init.set(inst.pending_async_init.get() + 1);
        });
        SuspenseGuard { id }
    }
}

impl Drop for SuspenseGuard {
    fn drop(&mut self) {
        instance::with_instance(self.id, |inst| {
            inst.pending_async_init.set(inst.pending_async_init.get().saturating_sub(1));
        });
    }
}

/// Marks the currently-building component as having async `init` work outstanding; returns
/// `None` with no component currently building (unlike [`on_hook`]/[`provide`], this does not
/// panic — a build function that calls it unconditionally shouldn't need to special-case a
/// root-less test harness).
pub fn begin_async_init() -> Option<SuspenseGuard> {
    current_component().map(SuspenseGuard::new)
}

/// Whether `id` still has outstanding async `init` work (§4.9).
pub fn is_suspended(id: ComponentId) -> bool {
    instance::with_instance(id, |inst| inst.pending_async_init.get() > 0).unwrap_or(false)
}
