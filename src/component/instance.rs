//! The component instance record and its process-wide arena (§3 "Component instance").

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use slotmap::SlotMap;

use crate::error::CoreError;
use crate::reactive::scope::Scope;
use crate::vnode::node::{ComponentFn, VNode};

use super::props::ComponentProps;

slotmap::new_key_type! {
    /// A mounted component instance's identity, stable across its whole lifetime (§3
    /// "Component instance"). Stored inside a mounted widget vnode's `MountState::Widget`.
    pub struct ComponentId;
}

/// The component state machine (§7 "Component state machine": `Unused -> Rendered ->
/// Activated <-> Deactivated -> Unmounted`).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ComponentStateName {
    Unused,
    Rendered,
    Activated,
    Deactivated,
    Unmounted,
}

impl ComponentStateName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStateName::Unused => "unused",
            ComponentStateName::Rendered => "rendered",
            ComponentStateName::Activated => "activated",
            ComponentStateName::Deactivated => "deactivated",
            ComponentStateName::Unmounted => "unmounted",
        }
    }

    /// Whether `self -> to` is a legal transition per §7's state machine.
    pub(crate) fn can_transition_to(self, to: ComponentStateName) -> bool {
        use ComponentStateName::*;
        matches!(
            (self, to),
            (Unused, Rendered)
                | (Rendered, Activated)
                | (Activated, Deactivated)
                | (Deactivated, Activated)
                | (Activated, Unmounted)
                | (Deactivated, Unmounted)
                | (Rendered, Unmounted)
        )
    }
}

/// The lifecycle stages hooks may register against (§3 "Hook store"). `error` and `render` are
/// handled separately: `error` via [`Instance::error_hook`] (its signature takes an error, not
/// nothing), `render` by the component's build function itself, invoked under a render effect
/// rather than stored as a hook.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HookStage {
    Init,
    BeforeMount,
    Mounted,
    BeforeUpdate,
    Updated,
    Activated,
    Deactivated,
    BeforeUnmount,
    Unmounted,
}

const HOOK_STAGE_COUNT: usize = 9;

impl HookStage {
    fn index(self) -> usize {
        match self {
            HookStage::Init => 0,
            HookStage::BeforeMount => 1,
            HookStage::Mounted => 2,
            HookStage::BeforeUpdate => 3,
            HookStage::Updated => 4,
            HookStage::Activated => 5,
            HookStage::Deactivated => 6,
            HookStage::BeforeUnmount => 7,
            HookStage::Unmounted => 8,
        }
    }
}

/// What an `onError` hook decides to do with an error bubbling through it (§4.9 "Error
/// bubbling").
pub enum ErrorHookOutcome {
    /// Did not handle it; continue bubbling to the parent component.
    Unhandled,
    /// Handled it; stop bubbling.
    Handled,
    /// Handled it by swapping in a fallback subtree in place of the failed render.
    Replace(VNode),
}

pub(crate) type ErrorHookFn = Box<dyn FnMut(&CoreError, &'static str) -> ErrorHookOutcome>;

/// Per-instance storage for lifecycle hooks registered during a build, run in registration order
/// (§3 "Hooks registered during build are scoped to the enclosing component").
#[derive(Default)]
pub(crate) struct HookStore {
    stages: [Vec<Box<dyn FnMut()>>; HOOK_STAGE_COUNT],
}

impl HookStore {
    pub(crate) fn push(&mut self, stage: HookStage, f: Box<dyn FnMut()>) {
        self.stages[stage.index()].push(f);
    }

    /// Drops every stage's registrations (§3 "Hooks registered during build are scoped to the
    /// enclosing component"): a component's build closure re-registers them on every call via
    /// `on_hook`, so the store is cleared immediately before each build rather than accumulating
    /// one more copy of every hook per re-render.
    pub(crate) fn clear_all(&mut self) {
        for stage in &mut self.stages {
            stage.clear();
        }
    }

    fn take(&mut self, stage: HookStage) -> Vec<Box<dyn FnMut()>> {
        std::mem::take(&mut self.stages[stage.index()])
    }

    fn put_back(&mut self, stage: HookStage, fns: Vec<Box<dyn FnMut()>>) {
        self.stages[stage.index()] = fns;
    }
}

/// Runs a lifecycle stage's registered hooks without holding the component arena's borrow across
/// user code: the stage's closures are taken out of the instance, invoked against a dropped
/// borrow, then put back. A hook body that itself touches the arena (`inject`, `provide`,
/// `on_hook`, `begin_async_init` — all valid while a component is current, which hooks run under)
/// would otherwise re-enter the still-held `RefCell` and panic (§3 "Hook store").
pub(crate) fn run_hook_stage(id: ComponentId, stage: HookStage) {
    let Some(mut fns) = with_instance_mut(id, |i| i.hooks.take(stage)) else {
        return;
    };
    for f in &mut fns {
        f();
    }
    with_instance_mut(id, |i| i.hooks.put_back(stage, fns));
}

/// A single mounted (or mounting) component's state (§3 "Component instance"). Stateless
/// components (`node_type.stateless == true`) still get an `Instance` — with no `public` object
/// and an empty hook store — since the scope/props/render-effect/error-bubbling machinery is
/// identical either way; only the public-instance handle and lifecycle hooks are unavailable to
/// them (§4.9).
pub(crate) struct Instance {
    pub(crate) name: &'static str,
    pub(crate) build: ComponentFn,
    pub(crate) stateless: bool,
    pub(crate) public: Option<Rc<RefCell<dyn Any>>>,
    pub(crate) props: ComponentProps,
    pub(crate) scope: Scope,
    pub(crate) parent: Option<ComponentId>,
    pub(crate) hooks: HookStore,
    pub(crate) error_hook: Option<ErrorHookFn>,
    pub(crate) sub_view: RefCell<Option<VNode>>,
    pub(crate) state: Cell<ComponentStateName>,
    /// Count of still-pending async `init` continuations (§4.9 "suspense-style async-init
    /// counter"); the instance is considered suspended while this is nonzero.
    pub(crate) pending_async_init: Cell<u32>,
    /// Retained so the render effect (which may re-run on a later microtask, long after the
    /// call that created it returns) can still reach its host and mount point.
    pub(crate) driver: crate::driver::DriverHandle,
    pub(crate) container: crate::driver::HostHandle,
    /// Whether the first render (the one driven by the initial `build` call, as opposed to a
    /// later reactive re-render) has completed — gates `beforeUpdate`/`updated` vs. the
    /// mount-sequence hooks in the render effect (§4.9).
    pub(crate) mounted_once: Cell<bool>,
}

thread_local! {
    static COMPONENTS: RefCell<SlotMap<ComponentId, Instance>> = RefCell::new(SlotMap::with_key());
}

pub(crate) fn insert_instance(inst: Instance) -> ComponentId {
    COMPONENTS.with(|c| c.borrow_mut().insert(inst))
}

pub(crate) fn remove_instance(id: ComponentId) -> Option<Instance> {
    COMPONENTS.with(|c| c.borrow_mut().remove(id))
}

pub(crate) fn with_instance<R>(id: ComponentId, f: impl FnOnce(&Instance) -> R) -> Option<R> {
    COMPONENTS.with(|c| c.borrow().get(id).map(f))
}

pub(crate) fn with_instance_mut<R>(id: ComponentId, f: impl FnOnce(&mut Instance) -> R) -> Option<R> {
    COMPONENTS.with(|c| c.borrow_mut().get_mut(id).map(f))
}
