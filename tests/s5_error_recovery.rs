//! §8 scenario S5 — a component throws while building; the nearest ancestor's `onError` hook
//! returns a fallback vnode, which takes over only the failing component's own mount slot. A
//! sibling mounted alongside it is unaffected.

mod common;

use std::rc::Rc;

use reactive_core::{
    create_app, create_vnode, on_error, AppConfig, ChildInput, CoreError, CoreResult, ErrorHookOutcome, MountTarget, NodeType,
    Props, VNode, VNodeInput,
};

use common::{find_tag, first_text, RecordingDriver};

fn fallback_vnode() -> VNode {
    create_vnode(
        NodeType::Tag(Rc::from("p")),
        VNodeInput::new(),
        Props::default(),
        Vec::new(),
        || vec![ChildInput::Text(Rc::from("fallback"))],
    )
    .expect("fallback vnode is well-formed")
}

fn error_child_build() -> reactive_core::ComponentFn {
    Rc::new(|_props: &Props| -> CoreResult<VNode> {
        Err(CoreError::UserError {
            source_tag: "render",
            message: "boom".to_string(),
        })
    })
}

fn parent_build() -> reactive_core::ComponentFn {
    Rc::new(|_props: &Props| {
        on_error(|_err, _source_tag| ErrorHookOutcome::Replace(fallback_vnode()));

        let error_child = create_vnode(
            NodeType::Component {
                name: "ErrorChild",
                build: error_child_build(),
                stateless: false,
            },
            VNodeInput::new(),
            Props::default(),
            Vec::new(),
            || Vec::new(),
        )?;
        let stable_sibling = create_vnode(
            NodeType::Tag(Rc::from("span")),
            VNodeInput::new(),
            Props::default(),
            Vec::new(),
            || vec![ChildInput::Text(Rc::from("stable"))],
        )?;
        create_vnode(
            NodeType::Tag(Rc::from("fragment")),
            VNodeInput::new(),
            Props::default(),
            Vec::new(),
            move || vec![ChildInput::Node(error_child), ChildInput::Node(stable_sibling)],
        )
    })
}

#[test]
fn ancestor_fallback_replaces_only_the_failing_child() {
    let app = create_app(parent_build(), AppConfig::default());
    let driver = RecordingDriver::new();
    let container = driver.container();
    app.mount(MountTarget {
        driver: driver.clone(),
        container: container.clone(),
    });

    let fallback = find_tag(&container, "p").expect("the fallback vnode mounted in place of the failing child");
    assert_eq!(first_text(&fallback).as_deref(), Some("fallback"));

    let sibling = find_tag(&container, "span").expect("the stable sibling still mounted");
    assert_eq!(first_text(&sibling).as_deref(), Some("stable"), "the ancestor's other child is unaffected");
}
