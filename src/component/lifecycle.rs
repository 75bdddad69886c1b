//! Mount/update/activate/deactivate/unmount sequencing and error bubbling (§4.9 "Component
//! runtime (C9)").
//!
//! Grounded on `packages/core/src/scope.rs`'s render-as-an-effect model (there: `ScopeState`
//! re-runs its component function under `ensure_drop_safety`/the virtual dom's work loop) —
//! reimplemented here as a genuine reactive effect per this crate's own scheduler, created once
//! at mount and left to re-run itself on prop/signal invalidation rather than driven by an
//! external work-loop poll.

use std::cell::Cell;
use std::rc::Rc;

use tracing::error;

use crate::driver::{DriverHandle, HostHandle};
use crate::error::CoreResult;
use crate::reactive::effect::effect;
use crate::vnode::node::{MountState, NodeType, Props, VNode};

use super::instance::{self, ComponentId, ComponentStateName, ErrorHookOutcome, HookStage, HookStore, Instance};
use super::props::ComponentProps;
use super::run_as_current;

thread_local! {
    static ERROR_BUBBLE_DEPTH: Cell<u32> = Cell::new(0);
    /// Installed by `App`/`create_app` from `AppConfig::error_handler` (§4.9 step 3, §10.3).
    /// `None` means an unhandled error that reaches the root is only logged.
    static GLOBAL_ERROR_HANDLER: std::cell::RefCell<Option<Rc<dyn Fn(&crate::error::CoreError)>>> =
        std::cell::RefCell::new(None);
}

const ERROR_BUBBLE_DEPTH_BOUND: u32 = 50;

pub(crate) fn set_global_error_handler(handler: Option<Rc<dyn Fn(&crate::error::CoreError)>>) {
    GLOBAL_ERROR_HANDLER.with(|h| *h.borrow_mut() = handler);
}

/// Instantiates a mounted widget vnode's component instance, creates its scope (nested under its
/// parent component's, if any), and creates the render effect that builds and (re)patches its
/// subtree for the rest of the instance's life (§4.9 "each component runs its build function
/// under a render-effect").
pub fn mount_component(
    vnode: &VNode,
    driver: &DriverHandle,
    container: &HostHandle,
    anchor: Option<&HostHandle>,
    parent_component: Option<ComponentId>,
) {
    let (name, build, stateless) = match &vnode.node_type {
        NodeType::Component { name, build, stateless } => (*name, Rc::clone(build), *stateless),
        _ => unreachable!("mount_component called on a non-component vnode"),
    };

    let parent_scope = parent_component.and_then(|p| instance::with_instance(p, |i| i.scope));
    let scope = match parent_scope {
        Some(s) => s.child(),
        None => crate::reactive::scope::scope(|| {}).0,
    };

    let inst = Instance {
        name,
        build,
        stateless,
        public: None,
        props: ComponentProps::new(vnode.props.clone()),
        scope,
        parent: parent_component,
        hooks: HookStore::default(),
        error_hook: None,
        sub_view: std::cell::RefCell::new(None),
        state: Cell::new(ComponentStateName::Unused),
        pending_async_init: Cell::new(0),
        driver: Rc::clone(driver),
        container: Rc::clone(container),
        mounted_once: Cell::new(false),
    };
    let id = instance::insert_instance(inst);
    *vnode.mount.borrow_mut() = MountState::Widget(id);

    let first_anchor = anchor.cloned();
    run_as_current(id, || {
        scope.run(|| {
            effect(move || {
                run_as_current(id, || {
                    scope.run(|| render_effect_tick(id, first_anchor.clone()));
                });
            });
        });
    });
}

fn run_build(id: ComponentId) -> CoreResult<VNode> {
    let (build, props_snapshot) = instance::with_instance(id, |i| (Rc::clone(&i.build), i.props.snapshot_untracked()))
        .expect("run_build called on a disposed component instance");
    build(&props_snapshot)
}

/// The body of a component's render effect: builds the next subtree (which, as a side effect,
/// re-registers this tick's lifecycle hooks via `on_hook`), runs `init`/`beforeMount` or
/// `beforeUpdate` now that those hooks actually exist, then either mounts (first run) or patches
/// against the cached subtree (every later run), then runs `mounted`/`activated` or `updated`
/// accordingly (§4.9, §5, §8 testable property: updates after a write are observable exactly once
/// per batch).
///
/// Hooks are registered from inside the build closure itself (`on_hook`, called during `build`),
/// not ahead of it, so the hook store is cleared and rebuilt by every call to `run_build` — firing
/// a stage against last tick's hook store would either run against an empty store (the first
/// tick, before any `on_hook` call has happened) or accumulate one extra registration per
/// re-render (§3 "Hooks registered during build are scoped to the enclosing component").
fn render_effect_tick(id: ComponentId, anchor: Option<HostHandle>) {
    let Some((driver, container, mounted_once)) =
        instance::with_instance(id, |i| (Rc::clone(&i.driver), Rc::clone(&i.container), i.mounted_once.get()))
    else {
        return;
    };

    instance::with_instance_mut(id, |i| i.hooks.clear_all());

    let next_view = match run_build(id) {
        Ok(v) => v,
        Err(err) => {
            report_error(id, err, "render");
            return;
        }
    };

    if !mounted_once {
        instance::run_hook_stage(id, HookStage::Init);
        instance::run_hook_stage(id, HookStage::BeforeMount);
        crate::dispatcher::mount(&next_view, &driver, &container, anchor.as_ref(), Some(id));
        instance::with_instance_mut(id, |i| {
            *i.sub_view.borrow_mut() = Some(next_view);
            i.mounted_once.set(true);
            i.state.set(ComponentStateName::Activated);
        });
        instance::run_hook_stage(id, HookStage::Mounted);
        instance::run_hook_stage(id, HookStage::Activated);
    } else {
        instance::run_hook_stage(id, HookStage::BeforeUpdate);
        let prev_view = instance::with_instance(id, |i| i.sub_view.borrow().clone()).flatten();
        if let Some(prev_view) = prev_view {
            crate::reconciler::patch(&prev_view, &next_view, &driver, &container, None, Some(id));
        }
        instance::with_instance_mut(id, |i| *i.sub_view.borrow_mut() = Some(next_view));
        instance::run_hook_stage(id, HookStage::Updated);
    }
}

/// Forwards patched props into the instance's reactive [`ComponentProps`] — the component's own
/// render effect picks up the change reactively (via whichever keys it actually reads), so this
/// does not itself force a synchronous re-render (§4.8 widget-kind `patchProps`).
pub fn update_component(id: ComponentId, next_props: Props) {
    instance::with_instance(id, |i| i.props.apply_patch(next_props));
}

/// Activates a preserved (previously deactivated) subtree: children before parent (§4.9
/// "child-before on activate"). A no-op if the instance is already active or has been disposed.
pub fn activate(id: ComponentId, driver: &DriverHandle) {
    let Some(current) = instance::with_instance(id, |i| i.state.get()) else {
        return;
    };
    if current == ComponentStateName::Activated {
        return;
    }
    if let Some(sub_view) = instance::with_instance(id, |i| i.sub_view.borrow().clone()).flatten() {
        crate::dispatcher::activate(&sub_view, driver);
    }
    if let Some(scope) = instance::with_instance(id, |i| i.scope) {
        scope.resume();
    }
    instance::with_instance_mut(id, |i| i.state.set(ComponentStateName::Activated));
    instance::run_hook_stage(id, HookStage::Activated);
}

/// Deactivates a subtree destined to be preserved rather than unmounted: parent before children
/// (§4.9 "parent-before on deactivate (hooks)"); the scope is paused so accumulated
/// invalidations coalesce into a single re-render on the next [`activate`].
pub fn deactivate(id: ComponentId, driver: &DriverHandle) {
    let Some(current) = instance::with_instance(id, |i| i.state.get()) else {
        return;
    };
    if current != ComponentStateName::Activated {
        return;
    }
    instance::run_hook_stage(id, HookStage::Deactivated);
    instance::with_instance_mut(id, |i| i.state.set(ComponentStateName::Deactivated));
    if let Some(scope) = instance::with_instance(id, |i| i.scope) {
        scope.pause();
    }
    if let Some(sub_view) = instance::with_instance(id, |i| i.sub_view.borrow().clone()).flatten() {
        crate::dispatcher::deactivate(&sub_view, driver);
    }
}

/// Tears down a component instance: `beforeUnmount`, unmount its subtree, dispose its scope
/// (cascading to every child scope/effect/cleanup, §3 "Disposal cascades child→parent"),
/// `unmounted`, then removes it from the instance arena.
pub fn unmount_component(id: ComponentId, driver: &DriverHandle) {
    instance::run_hook_stage(id, HookStage::BeforeUnmount);
    if let Some(sub_view) = instance::with_instance(id, |i| i.sub_view.borrow().clone()).flatten() {
        crate::dispatcher::unmount(&sub_view, driver);
    }
    if let Some(scope) = instance::with_instance(id, |i| i.scope) {
        scope.dispose();
    }
    instance::run_hook_stage(id, HookStage::Unmounted);
    instance::with_instance_mut(id, |i| i.state.set(ComponentStateName::Unmounted));
    instance::remove_instance(id);
}

/// Routes an error up through the component tree via each ancestor's `onError` hook, in order,
/// until one handles it or the root is reached (§4.9 "Error bubbling"). A depth guard catches an
/// error handler that itself keeps raising, logging and giving up rather than recursing forever.
pub fn report_error(id: ComponentId, err: crate::error::CoreError, source_tag: &'static str) {
    bubble_error(id, id, err, source_tag);
}

/// `origin` is the component whose own build/render actually raised `err`; `id` is the instance
/// currently being asked whether it handles it. A `Replace` outcome always patches `origin`'s own
/// mount slot, not `id`'s — the failure's fallback takes the place of only the vnode that failed,
/// leaving every other child of whichever ancestor catches it untouched (§8 scenario S5).
fn bubble_error(origin: ComponentId, id: ComponentId, err: crate::error::CoreError, source_tag: &'static str) {
    let depth = ERROR_BUBBLE_DEPTH.with(|d| {
        let next = d.get() + 1;
        d.set(next);
        next
    });
    if depth > ERROR_BUBBLE_DEPTH_BOUND {
        error!(%source_tag, "error bubbling exceeded depth guard, dropping: {err}");
        ERROR_BUBBLE_DEPTH.with(|d| d.set(depth - 1));
        return;
    }

    let outcome = instance::with_instance_mut(id, |inst| inst.error_hook.as_mut().map(|f| f(&err, source_tag))).flatten();

    match outcome {
        Some(ErrorHookOutcome::Handled) => {}
        Some(ErrorHookOutcome::Replace(fallback)) => apply_fallback_view(origin, fallback),
        Some(ErrorHookOutcome::Unhandled) | None => {
            match instance::with_instance(id, |i| i.parent).flatten() {
                Some(parent) => bubble_error(origin, parent, err, source_tag),
                None => {
                    error!(%source_tag, "unhandled error reached application root: {err}");
                    let handler = GLOBAL_ERROR_HANDLER.with(|h| h.borrow().clone());
                    if let Some(handler) = handler {
                        handler(&err);
                    }
                }
            }
        }
    }

    ERROR_BUBBLE_DEPTH.with(|d| d.set(depth - 1));
}

/// The currently-mounted subtree a widget vnode's component instance produced, for the
/// reconciler to recurse into when it needs to find that widget's actual host roots (§4.8
/// "Widget vnode host roots resolve through its mounted subtree").
pub(crate) fn sub_view_of(id: ComponentId) -> Option<VNode> {
    instance::with_instance(id, |i| i.sub_view.borrow().clone()).flatten()
}

fn apply_fallback_view(id: ComponentId, fallback: VNode) {
    let Some((driver, container)) = instance::with_instance(id, |i| (Rc::clone(&i.driver), Rc::clone(&i.container))) else {
        return;
    };
    let prev_view = instance::with_instance(id, |i| i.sub_view.borrow().clone()).flatten();
    match prev_view {
        Some(prev_view) => crate::reconciler::patch(&prev_view, &fallback, &driver, &container, None, Some(id)),
        None => crate::dispatcher::mount(&fallback, &driver, &container, None, Some(id)),
    }
    instance::with_instance_mut(id, |i| *i.sub_view.borrow_mut() = Some(fallback));
}
