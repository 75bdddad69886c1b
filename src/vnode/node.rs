//! The VNode model (§3 "VNode", §4.7 "VNode model (C7)").
//!
//! Grounded on `packages/core/src/nodes.rs`'s `VNode`/`DynamicNode`/`AttributeValue` shape
//! (including its `AnyValue` downcast-compare trait for opaque attribute payloads), adapted from
//! the teacher's bump-allocated `'a`-lifetime design to owned `Rc`/`Vec` storage — there is no
//! per-render arena here, so vnodes are cheaply `Clone`-able `Rc` trees instead.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::driver::HostHandle;

/// The typed kinds a vnode may be (§3 "VNode", enumerated in §4.7).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeKind {
    RegularElement,
    VoidElement,
    Fragment,
    Text,
    Comment,
    StatefulWidget,
    StatelessWidget,
    /// A `v-if`/dynamic-switch placeholder produced when a construction-time condition is false,
    /// or a runtime `Dynamic` view owning exactly one classified child (§4.8 "Dynamic (switch)
    /// view").
    Dynamic,
    /// A keyed or unkeyed list of children reconciled as a unit (§4.8 keyed children
    /// reconciliation).
    List,
}

/// An opaque attribute payload comparable for equality without knowing its concrete type,
/// mirroring `packages/core/src/nodes.rs`'s `AnyValue`/`AttributeValue::Any`.
pub trait AnyAttributeValue: Any {
    fn any_cmp(&self, other: &dyn AnyAttributeValue) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: PartialEq + Any> AnyAttributeValue for T {
    fn any_cmp(&self, other: &dyn AnyAttributeValue) -> bool {
        match other.as_any().downcast_ref::<T>() {
            Some(o) => self == o,
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An event listener callback; `UiEvent` payload type is erased to `dyn Any`, downcast by the
/// host adapter the way `packages/core/src/nodes.rs::AttributeValue::new_listener` does.
pub type ListenerFn = Rc<RefCell<dyn FnMut(&dyn Any)>>;

/// A single attribute/prop value (§3 "Props are normalized at construction").
#[derive(Clone)]
pub enum AttributeValue {
    Text(Rc<str>),
    Number(f64),
    Bool(bool),
    Listener(ListenerFn),
    Any(Rc<dyn AnyAttributeValue>),
    None,
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        use AttributeValue::*;
        match (self, other) {
            (Text(a), Text(b)) => a == b,
            (Number(a), Number(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            // Listeners always compare unequal so a patch always re-registers the latest
            // closure (per §6 "Replacement replaces the listener").
            (Listener(_), Listener(_)) => false,
            (Any(a), Any(b)) => a.any_cmp(b.as_ref()),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Normalized props: `class`/`style` get their own accumulating slots per §3's normalization
/// rule; everything else (including event listeners, by name convention e.g. `onClick`) lives in
/// `attrs`.
#[derive(Clone, Default)]
pub struct Props {
    pub attrs: IndexMap<Rc<str>, AttributeValue>,
    /// Ordered, de-duplicated class list — accumulated across `v-bind` spreads per §3.
    pub class: Vec<Rc<str>>,
    /// Keyed style mapping — accumulated across `v-bind` spreads per §3.
    pub style: IndexMap<Rc<str>, Rc<str>>,
}

impl Props {
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attrs.get(name)
    }
}

/// A directive binding attached to a vnode (§3 "Directive binding").
#[derive(Clone)]
pub struct DirectiveBinding {
    pub name: &'static str,
    pub value: Option<AttributeValue>,
    pub old_value: Option<AttributeValue>,
    pub arg: Option<Rc<str>>,
    pub modifiers: Vec<&'static str>,
}

/// What a vnode's `type` field identifies: a host tag name, or a component function along with
/// whether it's the stateless (no instance, no hooks) or stateful form (§4.7 "function types
/// branch on a stateless marker").
#[derive(Clone)]
pub enum NodeType {
    Tag(Rc<str>),
    Component {
        name: &'static str,
        build: ComponentFn,
        stateless: bool,
    },
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeType::Tag(a), NodeType::Tag(b)) => a == b,
            (
                NodeType::Component { build: a, .. },
                NodeType::Component { build: b, .. },
            ) => std::ptr::eq(
                Rc::as_ptr(a) as *const (),
                Rc::as_ptr(b) as *const (),
            ),
            _ => false,
        }
    }
}

/// A component's build function, type-erased over its props. `crate::component` gives each
/// mounted widget vnode a component instance that invokes this under a render-effect; this type
/// alone carries no lifecycle. Returns `Result` rather than a bare `VNode` as the idiomatic-Rust
/// stand-in for a thrown build-time exception (§4.9 "`UserError`... captured and bubbled via
/// `reportError`") — a build function signals failure with `?`/`Err` instead of a panic.
pub type ComponentFn = Rc<dyn Fn(&Props) -> crate::error::CoreResult<VNode>>;

/// Where a mounted vnode's host-visible state lives once the driver dispatcher (C11) has
/// materialized it. `None` before mount / after unmount.
#[derive(Clone, Default)]
pub enum MountState {
    #[default]
    Unmounted,
    Element(HostHandle),
    /// A fragment's synthetic container: a pair of anchor comments bracketing its children
    /// (§4.8 "Fragment children... a synthetic handle maintaining start/end anchor comments").
    Fragment { start: HostHandle, end: HostHandle },
    /// A mounted widget's component-instance id, owned by `component::runtime`.
    Widget(crate::component::ComponentId),
}

/// A node in the virtual tree (§3 "VNode"). `Clone` is shallow-cheap (`Rc` handles throughout)
/// and is used by `v-memo` to reuse a previously-built subtree without re-invoking its builder
/// closure (§4.7).
#[derive(Clone)]
pub struct VNode {
    pub kind: NodeKind,
    pub node_type: NodeType,
    pub key: Option<Rc<str>>,
    pub props: Props,
    pub children: Vec<VNode>,
    /// Text/comment content for `Text`/`Comment` kinds.
    pub text: Option<Rc<str>>,
    pub directives: Vec<DirectiveBinding>,
    pub mount: RefCell<MountState>,
}

impl VNode {
    pub fn key(&self) -> Option<&Rc<str>> {
        self.key.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        !matches!(*self.mount.borrow(), MountState::Unmounted)
    }

    pub fn text_node(value: impl Into<Rc<str>>) -> VNode {
        VNode {
            kind: NodeKind::Text,
            node_type: NodeType::Tag(Rc::from("#text")),
            key: None,
            props: Props::default(),
            children: Vec::new(),
            text: Some(value.into()),
            directives: Vec::new(),
            mount: RefCell::new(MountState::Unmounted),
        }
    }

    pub fn comment_node(value: impl Into<Rc<str>>) -> VNode {
        VNode {
            kind: NodeKind::Comment,
            node_type: NodeType::Tag(Rc::from("#comment")),
            key: None,
            props: Props::default(),
            children: Vec::new(),
            text: Some(value.into()),
            directives: Vec::new(),
            mount: RefCell::new(MountState::Unmounted),
        }
    }

    /// The empty placeholder produced for a `false`/`null`/`undefined` child or a failed `v-if`
    /// (§4.7, §4.9 "normalized: ... nullish/boolean -> empty placeholder").
    pub fn empty_placeholder() -> VNode {
        VNode::comment_node("")
    }
}
