//! §8 "Testable properties" not already exercised end to end by the S1-S6 scenario suites:
//! reactive proxy identity/round-tripping, and lifecycle hook ordering across a parent/child pair.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use reactive_core::{
    create_app, create_vnode, on_hook, raw, reactive_object, AppConfig, ChildInput, HookStage, MountTarget, NodeType, Props,
    RawValue, VNodeInput,
};

use common::RecordingDriver;

#[test]
fn reactive_object_identity_and_raw_roundtrip() {
    let target: reactive_core::ObjectTarget = Rc::new(RefCell::new(indexmap::IndexMap::new()));

    let a = reactive_object(target.clone());
    let b = reactive_object(target.clone());
    assert!(a == b, "two wrappers over the same target compare equal");

    let RawValue::Object(back) = raw(&reactive_core::ReactiveValue::Object(a.clone())) else {
        unreachable!()
    };
    assert!(Rc::ptr_eq(&back, &target), "raw(reactive(x)) recovers the exact same target pointer");

    let other_target: reactive_core::ObjectTarget = Rc::new(RefCell::new(indexmap::IndexMap::new()));
    let c = reactive_object(other_target);
    assert!(a != c, "wrappers over distinct targets are never equal");
}

#[test]
fn mark_raw_prevents_a_container_from_ever_being_wrapped() {
    let target: reactive_core::ObjectTarget = Rc::new(RefCell::new(indexmap::IndexMap::new()));
    target
        .borrow_mut()
        .insert(Rc::from("inner"), RawValue::Object(Rc::new(RefCell::new(indexmap::IndexMap::new()))));

    let inner_raw = target.borrow().get("inner").cloned().unwrap();
    reactive_core::mark_raw(&inner_raw);

    let outer = reactive_object(target);
    assert!(
        matches!(outer.get("inner"), Some(reactive_core::ReactiveValue::RawObject(_))),
        "a marked-raw property stays unwrapped even though the outer wrapper is deep"
    );
}

#[test]
fn mount_hooks_run_parent_before_child_and_unmount_hooks_run_child_before_parent() {
    let log = Rc::new(RefCell::new(Vec::<&'static str>::new()));

    let child_log = Rc::clone(&log);
    let child_build = Rc::new(move |_props: &Props| {
        let before = Rc::clone(&child_log);
        on_hook(HookStage::BeforeMount, move || before.borrow_mut().push("child:before_mount"));
        let mounted = Rc::clone(&child_log);
        on_hook(HookStage::Mounted, move || mounted.borrow_mut().push("child:mounted"));
        let before_unmount = Rc::clone(&child_log);
        on_hook(HookStage::BeforeUnmount, move || before_unmount.borrow_mut().push("child:before_unmount"));
        let unmounted = Rc::clone(&child_log);
        on_hook(HookStage::Unmounted, move || unmounted.borrow_mut().push("child:unmounted"));
        create_vnode(
            NodeType::Tag(Rc::from("span")),
            VNodeInput::new(),
            Props::default(),
            Vec::new(),
            || Vec::new(),
        )
    });

    let parent_log = Rc::clone(&log);
    let parent_build = Rc::new(move |_props: &Props| {
        let before = Rc::clone(&parent_log);
        on_hook(HookStage::BeforeMount, move || before.borrow_mut().push("parent:before_mount"));
        let mounted = Rc::clone(&parent_log);
        on_hook(HookStage::Mounted, move || mounted.borrow_mut().push("parent:mounted"));
        let before_unmount = Rc::clone(&parent_log);
        on_hook(HookStage::BeforeUnmount, move || before_unmount.borrow_mut().push("parent:before_unmount"));
        let unmounted = Rc::clone(&parent_log);
        on_hook(HookStage::Unmounted, move || unmounted.borrow_mut().push("parent:unmounted"));

        let child = create_vnode(
            NodeType::Component {
                name: "Child",
                build: child_build.clone(),
                stateless: false,
            },
            VNodeInput::new(),
            Props::default(),
            Vec::new(),
            || Vec::new(),
        )?;
        create_vnode(
            NodeType::Tag(Rc::from("div")),
            VNodeInput::new(),
            Props::default(),
            Vec::new(),
            move || vec![ChildInput::Node(child)],
        )
    });

    let app = create_app(parent_build, AppConfig::default());
    let driver = RecordingDriver::new();
    let container = driver.container();
    app.mount(MountTarget {
        driver: driver.clone(),
        container: container.clone(),
    });

    assert_eq!(
        *log.borrow(),
        vec!["parent:before_mount", "child:before_mount", "child:mounted", "parent:mounted"],
        "before_mount fires parent-first, mounted fires child-first"
    );

    log.borrow_mut().clear();
    app.unmount();

    assert_eq!(
        *log.borrow(),
        vec!["parent:before_unmount", "child:before_unmount", "child:unmounted", "parent:unmounted"],
        "before_unmount fires parent-first (outer teardown announced before descending), \
         unmounted still fires child-first as each instance actually finishes tearing down"
    );
}
