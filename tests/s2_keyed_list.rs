//! §8 scenario S2 — a keyed list reorder settles with the LIS-optimal move count: exactly 2
//! `insert` moves, no `remove`, no extra `create_element` for a 4-item reorder.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use reactive_core::{create_app, reactive_array_shallow, AppConfig, ChildInput, MountTarget, NodeType, Props, RawValue, VNodeInput};

use common::{child_tags, child_texts, find_tag, RecordingDriver};

fn text_of(v: &reactive_core::ReactiveValue) -> String {
    match v {
        reactive_core::ReactiveValue::Text(t) => t.to_string(),
        _ => panic!("expected a scalar text entry"),
    }
}

#[test]
fn keyed_reorder_issues_the_minimal_move_set() {
    let target: reactive_core::ArrayTarget = Rc::new(RefCell::new(vec![
        RawValue::Text(Rc::from("a")),
        RawValue::Text(Rc::from("b")),
        RawValue::Text(Rc::from("c")),
        RawValue::Text(Rc::from("d")),
    ]));
    let items = reactive_array_shallow(target);

    let app = create_app(
        Rc::new(move |_props: &Props| {
            let len = items.len();
            let mut rows = Vec::with_capacity(len);
            for i in 0..len {
                let text: Rc<str> = Rc::from(text_of(&items.get(i).unwrap()));
                let mut input = VNodeInput::new();
                input.key = Some(text.clone());
                let row = reactive_core::create_vnode(
                    NodeType::Tag(Rc::from("li")),
                    input,
                    Props::default(),
                    Vec::new(),
                    {
                        let text = text.clone();
                        move || vec![ChildInput::Text(text)]
                    },
                )?;
                rows.push(ChildInput::Node(row));
            }
            reactive_core::create_vnode(
                NodeType::Tag(Rc::from("ul")),
                VNodeInput::new(),
                Props::default(),
                Vec::new(),
                move || rows,
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

    let ul = find_tag(&container, "ul").expect("ul mounted");
    assert_eq!(child_tags(&ul), vec!["li", "li", "li", "li"]);
    assert_eq!(child_texts(&ul), vec!["a", "b", "c", "d"]);

    driver.clear_log();

    // ["a","b","c","d"] -> ["d","b","a","c"]: b and c already appear in increasing relative
    // order (the longest run), so only "a" and "d" need to move.
    let next = ["d", "b", "a", "c"];
    for (i, value) in next.iter().enumerate() {
        items.set(i, RawValue::Text(Rc::from(*value))).unwrap();
    }
    reactive_core::flush_sync();

    assert_eq!(child_texts(&ul), vec!["d", "b", "a", "c"]);

    let inserts = driver.count(|m| matches!(m, common::Mutation::Insert));
    let removes = driver.count(|m| matches!(m, common::Mutation::Remove));
    let creates = driver.count(|m| matches!(m, common::Mutation::CreateElement(tag) if tag == "li"));

    assert_eq!(removes, 0, "no node is actually removed, only reordered");
    assert_eq!(creates, 0, "every key is reused, nothing is freshly created");
    assert_eq!(inserts, 2, "exactly the two out-of-LIS nodes (\"a\" and \"d\") move");
}
