//! The reactive props view a component's build function reads from (§3 "Component instance...
//! props (proxy)").
//!
//! Grounded on `reactive/proxy.rs`'s per-target "topic" signal technique (one [`NodeId`] per
//! tracked key plus one for the key set as a whole), specialized to `vnode::node::Props`'s
//! `AttributeValue` rather than routed through the general `RawValue` tree — a component's props
//! are always a flat string-keyed map, never an arbitrary nested nested value, so the generality
//! `reactive::proxy` needs for user-facing `reactive()`/`reactive_array()` wrappers would be
//! pure overhead here.

use std::rc::Rc;

use fxhash::FxHashMap;
use std::cell::RefCell;

use crate::reactive::runtime::{with_runtime, NodeId};
use crate::vnode::node::{AttributeValue, Props};

struct PropsInner {
    current: RefCell<Props>,
    defaults: RefCell<FxHashMap<Rc<str>, AttributeValue>>,
    per_key: RefCell<FxHashMap<Rc<str>, NodeId>>,
    keys_topic: NodeId,
}

/// A cheaply-`Clone`-able handle to a component instance's props. Reading a key (or the key
/// list) from inside a render effect or hook registers a dependency on just that key, so a
/// sibling prop changing does not invalidate unrelated reads (§3 "Props are normalized at
/// construction", §8 fine-grained dependency tracking extended to props).
#[derive(Clone)]
pub struct ComponentProps(Rc<PropsInner>);

impl ComponentProps {
    pub(crate) fn new(initial: Props) -> Self {
        let keys_topic = with_runtime(|rt| rt.create_topic_node());
        ComponentProps(Rc::new(PropsInner {
            current: RefCell::new(initial),
            defaults: RefCell::new(FxHashMap::default()),
            per_key: RefCell::new(FxHashMap::default()),
            keys_topic,
        }))
    }

    fn key_topic(&self, key: &str) -> NodeId {
        if let Some(node) = self.0.per_key.borrow().get(key) {
            return *node;
        }
        let node = with_runtime(|rt| rt.create_topic_node());
        self.0.per_key.borrow_mut().insert(Rc::from(key), node);
        node
    }

    /// Reads a prop, tracking a dependency on it. Falls back to a registered default when the
    /// key is absent from the current props (§4.9 Open Question: defaults apply to `get` but
    /// not to key enumeration — a deliberately asymmetric simplification, see DESIGN.md).
    pub fn get(&self, key: &str) -> AttributeValue {
        with_runtime(|rt| rt.topic_track(self.key_topic(key)));
        self.0
            .current
            .borrow()
            .attrs
            .get(key)
            .cloned()
            .or_else(|| self.0.defaults.borrow().get(key).cloned())
            .unwrap_or(AttributeValue::None)
    }

    /// Whether `key` is present among the *actual* props (ignoring defaults), tracking the same
    /// dependency as [`ComponentProps::get`].
    pub fn has(&self, key: &str) -> bool {
        with_runtime(|rt| rt.topic_track(self.key_topic(key)));
        self.0.current.borrow().attrs.contains_key(key)
    }

    /// The ordered list of keys actually present (not defaults-only), tracking the key-set
    /// topic so additions/removals (not value changes) invalidate callers that enumerate.
    pub fn keys(&self) -> Vec<Rc<str>> {
        with_runtime(|rt| rt.topic_track(self.0.keys_topic));
        self.0.current.borrow().attrs.keys().cloned().collect()
    }

    /// Returns a plain, untracked copy of the current props — passed positionally to a
    /// component's build function alongside the reactive [`ComponentProps`] handle it can reach
    /// through [`super::current_props`], for builds that don't need per-key tracking.
    pub(crate) fn snapshot_untracked(&self) -> Props {
        self.0.current.borrow().clone()
    }

    /// Registers a fallback value returned by [`ComponentProps::get`] when `key` is absent.
    /// Used by component authors to declare prop defaults at build/registration time.
    pub fn set_default(&self, key: impl Into<Rc<str>>, value: AttributeValue) {
        self.0.defaults.borrow_mut().insert(key.into(), value);
    }

    /// Overwrites the current props with `next`, emitting the key-set topic if the set of
    /// present keys changed and each per-key topic whose value actually changed (§4.8
    /// "patchProps" extended to widget vnodes: only touched keys invalidate dependents).
    pub(crate) fn apply_patch(&self, next: Props) {
        let prev = self.0.current.borrow();
        let mut changed_keys = Vec::new();
        let mut key_set_changed = false;
        for (k, v) in &next.attrs {
            match prev.attrs.get(k) {
                Some(old) if old == v => {}
                _ => changed_keys.push(k.clone()),
            }
            if !prev.attrs.contains_key(k) {
                key_set_changed = true;
            }
        }
        for k in prev.attrs.keys() {
            if !next.attrs.contains_key(k) {
                changed_keys.push(k.clone());
                key_set_changed = true;
            }
        }
        drop(prev);
        *self.0.current.borrow_mut() = next;
        with_runtime(|rt| {
            for k in &changed_keys {
                if let Some(node) = self.0.per_key.borrow().get(k.as_ref()) {
                    rt.topic_emit(*node);
                }
            }
            if key_set_changed {
                rt.topic_emit(self.0.keys_topic);
            }
        });
    }
}
