//! §8 scenario S4 — a parent provides a value a child injects with a default; once the parent is
//! gone, mounting a fresh, unrelated instance of the same child component falls back to that
//! default instead of seeing a stale provided value.

mod common;

use std::rc::Rc;

use reactive_core::{
    create_app, create_vnode, dispatcher, inject, provide, AppConfig, ChildInput, MountTarget, NodeType, Props, VNodeInput,
};

use common::{first_text, RecordingDriver};

fn child_build() -> reactive_core::ComponentFn {
    Rc::new(|_props: &Props| {
        let theme: Rc<str> = inject("theme", Some(Rc::from("light"))).expect("inject always yields at least the default");
        create_vnode(
            NodeType::Tag(Rc::from("span")),
            VNodeInput::new(),
            Props::default(),
            Vec::new(),
            move || vec![ChildInput::Text(theme.clone())],
        )
    })
}

fn parent_build() -> reactive_core::ComponentFn {
    Rc::new(|_props: &Props| {
        provide("theme", Rc::from("dark") as Rc<str>);
        let child = create_vnode(
            NodeType::Component {
                name: "Child",
                build: child_build(),
                stateless: false,
            },
            VNodeInput::new(),
            Props::default(),
            Vec::new(),
            || Vec::new(),
        )?;
        Ok(child)
    })
}

#[test]
fn child_sees_parent_provided_value_then_falls_back_once_detached() {
    let app = create_app(parent_build(), AppConfig::default());
    let driver = RecordingDriver::new();
    let container = driver.container();
    app.mount(MountTarget {
        driver: driver.clone(),
        container: container.clone(),
    });

    assert_eq!(first_text(&container).as_deref(), Some("dark"), "child injects the parent's provided value");

    app.unmount();

    // A fresh, unrelated mount of the same child component, with no parent in its chain: inject
    // finds nothing to walk up to and returns the caller-supplied default.
    let detached_driver = RecordingDriver::new();
    let detached_container = detached_driver.container();
    let vnode = create_vnode(
        NodeType::Component {
            name: "Child",
            build: child_build(),
            stateless: false,
        },
        VNodeInput::new(),
        Props::default(),
        Vec::new(),
        || Vec::new(),
    )
    .unwrap();
    dispatcher::mount(&vnode, &(detached_driver.clone() as reactive_core::DriverHandle), &detached_container, None, None);

    assert_eq!(
        first_text(&detached_container).as_deref(),
        Some("light"),
        "a re-mounted detached child falls back to its default, not the old provided value"
    );
}
