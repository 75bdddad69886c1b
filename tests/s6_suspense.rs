//! §8 scenario S6 — suspense is a counter-only primitive: a component marks itself suspended by
//! holding a guard across its pending async `init` work, and `is_suspended` tracks that count
//! going from zero to nonzero and back as guards are taken out and dropped (§4.9, §9.4 — this
//! crate drives no futures itself, so settling one is entirely up to the embedding host).

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use reactive_core::{begin_async_init, create_vnode, dispatcher, is_suspended, ChildInput, DriverHandle, NodeType, Props, VNodeInput};

use common::{widget_id, widget_vnode, RecordingDriver};

#[test]
fn suspense_counter_tracks_outstanding_async_init_guards() {
    let guard_slot = Rc::new(RefCell::new(None));
    let guard_slot_in_build = Rc::clone(&guard_slot);

    let build = Rc::new(move |_props: &Props| {
        let guard = begin_async_init().expect("a component is building here");
        *guard_slot_in_build.borrow_mut() = Some(guard);
        create_vnode(
            NodeType::Tag(Rc::from("div")),
            VNodeInput::new(),
            Props::default(),
            Vec::new(),
            || vec![ChildInput::Text(Rc::from("ready"))],
        )
    });

    let vnode = widget_vnode("Suspended", build);
    let driver = RecordingDriver::new();
    let container = driver.container();
    dispatcher::mount(&vnode, &(driver.clone() as DriverHandle), &container, None, None);

    let id = widget_id(&vnode);
    assert!(is_suspended(id), "the guard taken out during build keeps the component suspended");

    guard_slot.borrow_mut().take();
    assert!(!is_suspended(id), "dropping the guard settles the suspense count back to zero");
}

#[test]
fn a_second_outstanding_guard_keeps_it_suspended_until_both_settle() {
    let guards = Rc::new(RefCell::new(Vec::new()));
    let guards_in_build = Rc::clone(&guards);

    let build = Rc::new(move |_props: &Props| {
        guards_in_build
            .borrow_mut()
            .push(begin_async_init().expect("a component is building here"));
        guards_in_build
            .borrow_mut()
            .push(begin_async_init().expect("a component is building here"));
        create_vnode(
            NodeType::Tag(Rc::from("div")),
            VNodeInput::new(),
            Props::default(),
            Vec::new(),
            || Vec::new(),
        )
    });

    let vnode = widget_vnode("DoublySuspended", build);
    let driver = RecordingDriver::new();
    let container = driver.container();
    dispatcher::mount(&vnode, &(driver.clone() as DriverHandle), &container, None, None);
    let id = widget_id(&vnode);

    assert!(is_suspended(id));
    guards.borrow_mut().pop();
    assert!(is_suspended(id), "one guard still outstanding");
    guards.borrow_mut().pop();
    assert!(!is_suspended(id), "both guards settled");
}
