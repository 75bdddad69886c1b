//! §8 scenario S3 — nested reactive objects: a write to a nested property, and a wholesale
//! replacement of the nested object, both reach an effect reading through the chain; disposing
//! the owning scope stops further runs.

use std::cell::RefCell;
use std::rc::Rc;

use reactive_core::{effect, flush_sync, reactive_object, scope, RawValue};

fn obj(pairs: Vec<(&str, RawValue)>) -> RawValue {
    let mut map = indexmap::IndexMap::new();
    for (k, v) in pairs {
        map.insert(Rc::from(k), v);
    }
    RawValue::Object(Rc::new(RefCell::new(map)))
}

fn number_of(v: reactive_core::ReactiveValue) -> f64 {
    match v {
        reactive_core::ReactiveValue::Number(n) => n,
        _ => panic!("expected a number"),
    }
}

#[test]
fn nested_writes_and_replacement_both_propagate_then_stop_after_disposal() {
    let RawValue::Object(root_target) = obj(vec![("a", obj(vec![("b", RawValue::Number(1.0))]))]) else {
        unreachable!()
    };

    let log = Rc::new(RefCell::new(Vec::<f64>::new()));
    let log_in_effect = Rc::clone(&log);

    let (owning_scope, s) = scope(|| {
        let s = reactive_object(root_target);
        let s_in_effect = s.clone();
        effect(move || {
            let reactive_core::ReactiveValue::Object(a) = s_in_effect.get("a").expect("a present") else {
                panic!("expected a nested object");
            };
            let b = number_of(a.get("b").expect("b present"));
            log_in_effect.borrow_mut().push(b);
        });
        s
    });

    assert_eq!(*log.borrow(), vec![1.0], "effect runs once eagerly, logging the initial nested value");

    {
        let reactive_core::ReactiveValue::Object(a) = s.get("a").unwrap() else {
            unreachable!()
        };
        a.set("b", RawValue::Number(2.0)).unwrap();
    }
    flush_sync();
    assert_eq!(*log.borrow(), vec![1.0, 2.0], "writing the nested property reruns the effect");

    let RawValue::Object(replacement) = obj(vec![("b", RawValue::Number(3.0))]) else {
        unreachable!()
    };
    s.set("a", RawValue::Object(replacement)).unwrap();
    flush_sync();
    assert_eq!(*log.borrow(), vec![1.0, 2.0, 3.0], "replacing the nested object wholesale reruns the effect with the new value");

    owning_scope.dispose();
    {
        let reactive_core::ReactiveValue::Object(a) = s.get("a").unwrap() else {
            unreachable!()
        };
        a.set("b", RawValue::Number(4.0)).unwrap();
    }
    flush_sync();
    assert_eq!(*log.borrow(), vec![1.0, 2.0, 3.0], "no further writes are observed once the owning scope is disposed");
}
