//! The kind → driver dispatch table (§3 "Driver dispatcher (C11)", §4.10).
//!
//! Grounded on `packages/core/src/mutations.rs`'s mutation-emission ordering (create, set
//! attributes, append children, then insert — the order this module's `mount` follows) and on
//! §4.10's directive-hook contract: "The dispatcher handles invariants around state transitions
//! ... and calls directive hooks at the documented points." Custom directive callbacks
//! (`created`/`beforeMount`/`mounted`/`beforeUpdate`/`updated`/`beforeUnmount`/`unmounted`) are
//! looked up from a name-keyed registry populated by `App::directive` (§6 public API
//! `directive(name, spec)`), since a `DirectiveBinding` on a vnode carries only a name, not the
//! callbacks themselves.

use std::cell::RefCell;
use std::rc::Rc;

use fxhash::FxHashMap;

use crate::component::ComponentId;
use crate::driver::{DriverHandle, HostDriver, HostHandle};
use crate::reconciler;
use crate::vnode::node::{DirectiveBinding, MountState, NodeKind, VNode};

/// Optional callbacks a registered directive implements (§3 "Directive binding"). `getSSRProps`
/// is part of the contract purely for the (externally-owned, §1 Non-goals) SSR sink to consume;
/// this crate never calls it itself.
#[derive(Default)]
pub struct DirectiveSpec {
    pub created: Option<Box<dyn Fn(&HostHandle, &DirectiveBinding)>>,
    pub before_mount: Option<Box<dyn Fn(&HostHandle, &DirectiveBinding)>>,
    pub mounted: Option<Box<dyn Fn(&HostHandle, &DirectiveBinding)>>,
    pub before_update: Option<Box<dyn Fn(&HostHandle, &DirectiveBinding, &DirectiveBinding)>>,
    pub updated: Option<Box<dyn Fn(&HostHandle, &DirectiveBinding, &DirectiveBinding)>>,
    pub before_unmount: Option<Box<dyn Fn(&HostHandle, &DirectiveBinding)>>,
    pub unmounted: Option<Box<dyn Fn(&HostHandle, &DirectiveBinding)>>,
    pub get_ssr_props: Option<Box<dyn Fn(&DirectiveBinding) -> crate::vnode::node::Props>>,
}

thread_local! {
    static DIRECTIVES: RefCell<FxHashMap<&'static str, Rc<DirectiveSpec>>> = RefCell::new(FxHashMap::default());
}

pub(crate) fn register_directive(name: &'static str, spec: DirectiveSpec) {
    DIRECTIVES.with(|d| d.borrow_mut().insert(name, Rc::new(spec)));
}

fn lookup_directive(name: &str) -> Option<Rc<DirectiveSpec>> {
    DIRECTIVES.with(|d| d.borrow().get(name).cloned())
}

fn run_mount_hooks(vnode: &VNode, handle: &HostHandle, stage: fn(&DirectiveSpec) -> &Option<Box<dyn Fn(&HostHandle, &DirectiveBinding)>>) {
    for binding in &vnode.directives {
        if let Some(spec) = lookup_directive(binding.name) {
            if let Some(f) = stage(&spec) {
                f(handle, binding);
            }
        }
    }
}

/// Runs `beforeUpdate`/`updated` directive hooks, invoked by the reconciler around `patchProps`
/// (§4.10 "calls directive hooks at the documented points").
pub(crate) fn run_update_hooks(prev: &VNode, next: &VNode, handle: &HostHandle, before: bool) {
    for (old_binding, new_binding) in prev.directives.iter().zip(next.directives.iter()) {
        if let Some(spec) = lookup_directive(new_binding.name) {
            let f = if before { &spec.before_update } else { &spec.updated };
            if let Some(f) = f {
                f(handle, new_binding, old_binding);
            }
        }
    }
}

/// Materializes `vnode` under `container` (before `anchor`, or appended) and recurses into its
/// children (§4.10).
pub fn mount(
    vnode: &VNode,
    driver: &DriverHandle,
    container: &HostHandle,
    anchor: Option<&HostHandle>,
    parent_component: Option<ComponentId>,
) {
    match vnode.kind {
        NodeKind::RegularElement | NodeKind::VoidElement => {
            let tag = match &vnode.node_type {
                crate::vnode::node::NodeType::Tag(name) => name.clone(),
                _ => unreachable!("element-kind vnode with a component node_type"),
            };
            let handle = driver.create_element(&tag, false);
            apply_initial_props(&handle, &vnode.props, driver);
            run_mount_hooks(vnode, &handle, |s| &s.created);
            run_mount_hooks(vnode, &handle, |s| &s.before_mount);
            if vnode.kind == NodeKind::RegularElement {
                reconciler::patch_children(&[], &vnode.children, driver, &handle, None, parent_component);
            }
            *vnode.mount.borrow_mut() = MountState::Element(handle.clone());
            driver.insert(&handle, container, anchor);
            run_mount_hooks(vnode, &handle, |s| &s.mounted);
        }
        NodeKind::Fragment | NodeKind::List => {
            let (start, end) = driver.create_fragment_anchors();
            driver.insert(&start, container, anchor);
            reconciler::patch_children(&[], &vnode.children, driver, container, anchor, parent_component);
            driver.insert(&end, container, anchor);
            *vnode.mount.borrow_mut() = MountState::Fragment { start, end };
        }
        NodeKind::Text => {
            let handle = driver.create_text(vnode.text.as_deref().unwrap_or(""));
            driver.insert(&handle, container, anchor);
            *vnode.mount.borrow_mut() = MountState::Element(handle);
        }
        NodeKind::Comment => {
            let handle = driver.create_comment(vnode.text.as_deref().unwrap_or(""));
            driver.insert(&handle, container, anchor);
            *vnode.mount.borrow_mut() = MountState::Element(handle);
        }
        NodeKind::StatefulWidget | NodeKind::StatelessWidget => {
            crate::component::mount_component(vnode, driver, container, anchor, parent_component);
        }
        NodeKind::Dynamic => {
            mount(&vnode.children[0], driver, container, anchor, parent_component);
        }
    }
}

fn apply_initial_props(handle: &HostHandle, props: &crate::vnode::node::Props, driver: &DriverHandle) {
    for (name, value) in &props.attrs {
        driver.set_attribute(handle, name, Some(value), None);
    }
    if !props.class.is_empty() {
        let joined: Rc<str> = Rc::from(props.class.join(" "));
        driver.set_attribute(handle, "class", Some(&crate::vnode::node::AttributeValue::Text(joined)), None);
    }
    if !props.style.is_empty() {
        let joined: Rc<str> = Rc::from(
            props
                .style
                .iter()
                .map(|(k, v)| format!("{k}:{v}"))
                .collect::<Vec<_>>()
                .join(";"),
        );
        driver.set_attribute(handle, "style", Some(&crate::vnode::node::AttributeValue::Text(joined)), None);
    }
}

/// Tears down `vnode`'s host presence and, recursively, every descendant's — including
/// disposing any mounted component instances, which is what actually runs `beforeUnmount`/
/// `unmounted` hooks and scope disposal (§4.9).
pub fn unmount(vnode: &VNode, driver: &DriverHandle) {
    match vnode.kind {
        NodeKind::RegularElement | NodeKind::VoidElement => {
            for child in &vnode.children {
                unmount(child, driver);
            }
            if let MountState::Element(handle) = &*vnode.mount.borrow() {
                run_mount_hooks(vnode, handle, |s| &s.before_unmount);
                driver.remove(handle);
                run_mount_hooks(vnode, handle, |s| &s.unmounted);
            }
        }
        NodeKind::Fragment | NodeKind::List => {
            for child in &vnode.children {
                unmount(child, driver);
            }
            if let MountState::Fragment { start, end } = &*vnode.mount.borrow() {
                driver.remove(start);
                driver.remove(end);
            }
        }
        NodeKind::Text | NodeKind::Comment => {
            if let MountState::Element(handle) = &*vnode.mount.borrow() {
                driver.remove(handle);
            }
        }
        NodeKind::StatefulWidget | NodeKind::StatelessWidget => {
            if let MountState::Widget(id) = &*vnode.mount.borrow() {
                crate::component::unmount_component(*id, driver);
            }
        }
        NodeKind::Dynamic => {
            unmount(&vnode.children[0], driver);
        }
    }
}

/// Activates a preserved subtree: children before parent (§4.9 "child-before on activate").
pub fn activate(vnode: &VNode, driver: &DriverHandle) {
    match vnode.kind {
        NodeKind::StatefulWidget | NodeKind::StatelessWidget => {
            if let MountState::Widget(id) = &*vnode.mount.borrow() {
                crate::component::activate(*id, driver);
            }
        }
        _ => {
            for child in &vnode.children {
                activate(child, driver);
            }
        }
    }
}

/// Deactivates a subtree destined to be preserved rather than unmounted: parent before children
/// (§4.9 "parent-before on deactivate (hooks)").
pub fn deactivate(vnode: &VNode, driver: &DriverHandle) {
    match vnode.kind {
        NodeKind::StatefulWidget | NodeKind::StatelessWidget => {
            if let MountState::Widget(id) = &*vnode.mount.borrow() {
                crate::component::deactivate(*id, driver);
            }
        }
        _ => {
            for child in &vnode.children {
                deactivate(child, driver);
            }
        }
    }
}
