//! §8 scenario S1 — a one-signal counter mounted through a real build function, driven end to
//! end through `App`/`mount`/`flush_sync` against the recording test driver.

mod common;

use std::rc::Rc;

use reactive_core::{create_app, signal, AppConfig, MountTarget};

use common::{first_text, RecordingDriver};

#[test]
fn counter_text_tracks_signal_writes_and_settles_on_no_op() {
    let counter = signal(0i64);

    let app = create_app(
        Rc::new(move |_props: &reactive_core::Props| {
            let value = counter.get();
            reactive_core::create_vnode(
                reactive_core::NodeType::Tag(Rc::from("div")),
                reactive_core::VNodeInput::new(),
                reactive_core::Props::default(),
                Vec::new(),
                move || vec![reactive_core::ChildInput::Text(Rc::from(value.to_string()))],
            )
        }),
        AppConfig::default(),
    );

    let driver = RecordingDriver::new();
    let container = driver.container();
    app.mount(MountTarget {
        driver: driver.clone(),
        container: container.clone(),
    });

    assert_eq!(first_text(&container).as_deref(), Some("0"));

    counter.write(1);
    reactive_core::flush_sync();
    assert_eq!(first_text(&container).as_deref(), Some("1"));

    let set_text_before = driver.count(|m| matches!(m, common::Mutation::SetText(_)));
    counter.write(1);
    reactive_core::flush_sync();
    assert_eq!(first_text(&container).as_deref(), Some("1"));
    let set_text_after = driver.count(|m| matches!(m, common::Mutation::SetText(_)));
    assert_eq!(set_text_before, set_text_after, "writing an equal value issues no further host mutation");
}
