//! `create_vnode` and its supporting normalization helpers (§4.7 "VNode model (C7)",
//! construction algorithm).
//!
//! There is no JSX/template compiler in this crate (§1 Non-goals) emitting object literals with
//! reserved keys mixed into a dynamic prop bag, so reserved keys (`key`, `ref`, `v-if`, `v-show`,
//! `v-memo`, `v-static`, `v-parent`, `v-bind`, debug source) are explicit fields on
//! [`VNodeInput`] rather than drained out of a runtime map — the draining *behavior* (short
//! circuit on `v-if`, memo-cache check, spread merge, child flattening) is preserved exactly,
//! only its *surface* changes to fit a statically-typed caller. Grounded on
//! `packages/core/src/factory.rs` for the "normalize then build" shape and
//! `packages/core/src/nodebuilder.rs` for the builder-style assembly of a `VNode` from parts.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fxhash::FxHashMap;
use tracing::warn;

use crate::error::{CoreResult, ShapeError};

use super::node::{AttributeValue, DirectiveBinding, MountState, NodeKind, NodeType, Props, VNode};

thread_local! {
    /// Whether a duplicate key among siblings is a hard [`ShapeError::DuplicateKey`] or a
    /// logged-and-continue diagnostic. Set once by `App`/`create_app` from `AppConfig`
    /// (DESIGN.md: default permissive, matching most template frameworks' dev-mode behavior).
    static STRICT_DUPLICATE_KEYS: Cell<bool> = Cell::new(false);

    /// Host-supplied classifier for which tag names are void elements (§4.7 "a known
    /// void-element list supplied by the host adapter"). Defaults to never-void until a driver
    /// registers one, so a crate consumer who never calls `create_app` still gets consistent
    /// (if conservative) `RegularElement` routing.
    static VOID_TAG_CLASSIFIER: RefCell<Option<Rc<dyn Fn(&str) -> bool>>> = RefCell::new(None);

    static VMEMO_CACHE: RefCell<FxHashMap<u64, (Vec<MemoKey>, Vec<VNode>)>> = RefCell::new(FxHashMap::default());
}

pub(crate) fn set_strict_duplicate_keys(strict: bool) {
    STRICT_DUPLICATE_KEYS.with(|s| s.set(strict));
}

pub(crate) fn set_void_tag_classifier(classifier: Rc<dyn Fn(&str) -> bool>) {
    VOID_TAG_CLASSIFIER.with(|c| *c.borrow_mut() = Some(classifier));
}

fn is_void_tag(tag: &str) -> bool {
    VOID_TAG_CLASSIFIER.with(|c| c.borrow().as_ref().map_or(false, |f| f(tag)))
}

/// A dependency value for a `v-memo` tuple comparison (§4.7 "check `v-memo` cache: tuple
/// equality against previous tuple for this logical slot"). Narrower than a general `AttributeValue`
/// since memo deps are meant to be cheap scalars, not listeners or opaque payloads.
#[derive(Clone, PartialEq)]
pub enum MemoKey {
    Bool(bool),
    Number(u64),
    Text(Rc<str>),
}

impl MemoKey {
    pub fn number(n: f64) -> Self {
        MemoKey::Number(n.to_bits())
    }
}

/// A `v-memo` binding: a logical slot id (stable across re-renders of the same call site) and
/// the dependency tuple compared against the previous render's.
pub struct VMemo {
    pub slot: u64,
    pub deps: Vec<MemoKey>,
}

/// The reserved construction-time fields a template/builder would otherwise mix into a dynamic
/// prop object (§3 "Reserved keys consumed at construction").
#[derive(Default)]
pub struct VNodeInput {
    pub key: Option<Rc<str>>,
    pub reference: Option<AttributeValue>,
    /// `v-if`: defaults to `true` (the caller has already evaluated its condition; `false` short
    /// circuits construction to an empty placeholder without invoking the children closure).
    pub v_if: bool,
    pub v_show: Option<bool>,
    pub v_memo: Option<VMemo>,
    /// `v-static`: marks a subtree as never needing to be re-diffed — consumed and recorded on
    /// the built vnode so the reconciler can skip it wholesale on update (§4.8 fast path).
    pub v_static: bool,
    /// `v-parent` (teleport target): a host node children mount into instead of this vnode's
    /// natural position in its parent's children list.
    pub v_parent: Option<crate::driver::HostHandle>,
    pub debug_source: Option<&'static str>,
}

impl VNodeInput {
    pub fn new() -> Self {
        VNodeInput {
            v_if: true,
            ..Default::default()
        }
    }
}

/// A raw child, as a caller would write it inline before flattening (§4.7 "children are
/// flattened depth-first, booleans/null/undefined become empty placeholders, strings/numbers
/// become text vnodes").
pub enum ChildInput {
    Node(VNode),
    Text(Rc<str>),
    Number(f64),
    Bool(bool),
    Null,
    List(Vec<ChildInput>),
}

impl From<VNode> for ChildInput {
    fn from(v: VNode) -> Self {
        ChildInput::Node(v)
    }
}

fn flatten_into(input: ChildInput, out: &mut Vec<VNode>) {
    match input {
        ChildInput::Node(v) => out.push(v),
        ChildInput::Text(t) => out.push(VNode::text_node(t)),
        ChildInput::Number(n) => out.push(VNode::text_node(format_number(n))),
        ChildInput::Bool(_) | ChildInput::Null => out.push(VNode::empty_placeholder()),
        ChildInput::List(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
    }
}

fn format_number(n: f64) -> Rc<str> {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Rc::from((n as i64).to_string())
    } else {
        Rc::from(n.to_string())
    }
}

fn flatten_children(inputs: Vec<ChildInput>) -> Vec<VNode> {
    let mut out = Vec::with_capacity(inputs.len());
    for input in inputs {
        flatten_into(input, &mut out);
    }
    out
}

/// Emits the duplicate-key diagnostic at normalization time (§4.7 last sentence), either as a
/// logged warning (default) or a hard [`ShapeError::DuplicateKey`] under `AppConfig::strict_duplicate_keys`.
fn check_duplicate_keys(children: &[VNode]) -> CoreResult<()> {
    let mut seen = fxhash::FxHashSet::default();
    for child in children {
        if let Some(key) = child.key() {
            if !seen.insert(key.clone()) {
                if STRICT_DUPLICATE_KEYS.with(Cell::get) {
                    return Err(ShapeError::DuplicateKey {
                        key: key.to_string(),
                    }
                    .into());
                }
                warn!(key = %key, "duplicate key among siblings; first match reused, later ones remounted");
            }
        }
    }
    Ok(())
}

/// Merges `own` (highest precedence for non-accumulating keys) with `spreads` in order: `class`
/// and `style` accumulate across every source, every other key keeps whichever source set it
/// first (§3 "v-bind spreads merged with per-key strategy: class/style accumulate; other keys:
/// existing wins").
fn merge_props(mut own: Props, spreads: Vec<Props>) -> Props {
    for spread in spreads {
        for class in spread.class {
            if !own.class.contains(&class) {
                own.class.push(class);
            }
        }
        for (k, v) in spread.style {
            own.style.entry(k).or_insert(v);
        }
        for (k, v) in spread.attrs {
            own.attrs.entry(k).or_insert(v);
        }
    }
    own
}

fn kind_for(node_type: &NodeType) -> NodeKind {
    match node_type {
        NodeType::Tag(name) => match name.as_ref() {
            "fragment" => NodeKind::Fragment,
            "text" => NodeKind::Text,
            "comment" => NodeKind::Comment,
            other if is_void_tag(other) => NodeKind::VoidElement,
            _ => NodeKind::RegularElement,
        },
        NodeType::Component { stateless, .. } => {
            if *stateless {
                NodeKind::StatelessWidget
            } else {
                NodeKind::StatefulWidget
            }
        }
    }
}

/// Builds a normalized [`VNode`] (§4.7's construction algorithm). `children` is a closure rather
/// than a prebuilt `Vec` so a `v-if`/`v-memo` short circuit genuinely skips building the subtree,
/// matching the teacher's own lazy-children convention (the whole reason template compilers emit
/// child arrays as thunks in the first place).
pub fn create_vnode(
    node_type: NodeType,
    input: VNodeInput,
    own_props: Props,
    spreads: Vec<Props>,
    children: impl FnOnce() -> Vec<ChildInput>,
) -> CoreResult<VNode> {
    if let NodeType::Tag(name) = &node_type {
        if name.is_empty() {
            return Err(ShapeError::InvalidType("empty tag name".to_string()).into());
        }
    }

    if !input.v_if {
        return Ok(VNode::empty_placeholder());
    }

    let built_children = match input.v_memo {
        Some(memo) => {
            let cached = VMEMO_CACHE.with(|cache| {
                cache
                    .borrow()
                    .get(&memo.slot)
                    .filter(|(deps, _)| deps == &memo.deps)
                    .map(|(_, children)| children.clone())
            });
            match cached {
                Some(children) => children,
                None => {
                    let fresh = flatten_children(children());
                    VMEMO_CACHE.with(|cache| {
                        cache.borrow_mut().insert(memo.slot, (memo.deps, fresh.clone()));
                    });
                    fresh
                }
            }
        }
        None => flatten_children(children()),
    };

    check_duplicate_keys(&built_children)?;

    let mut props = merge_props(own_props, spreads);
    if let Some(reference) = input.reference {
        props.attrs.insert(Rc::from("ref"), reference);
    }
    if let Some(v_parent) = &input.v_parent {
        props
            .attrs
            .insert(Rc::from("__reactive_core_teleport_target"), AttributeValue::Any(Rc::new(TeleportTarget(v_parent.clone()))));
    }

    let kind = kind_for(&node_type);
    let mut directives = Vec::new();
    if let Some(shown) = input.v_show {
        directives.push(DirectiveBinding {
            name: "v-show",
            value: Some(AttributeValue::Bool(shown)),
            old_value: None,
            arg: None,
            modifiers: Vec::new(),
        });
    }
    if input.v_static {
        directives.push(DirectiveBinding {
            name: "v-static",
            value: None,
            old_value: None,
            arg: None,
            modifiers: Vec::new(),
        });
    }

    Ok(VNode {
        kind,
        node_type,
        key: input.key,
        props,
        children: built_children,
        text: None,
        directives,
        mount: RefCell::new(MountState::Unmounted),
    })
}

/// A keyed-or-unkeyed list of children reconciled as a unit (§4.8 keyed children
/// reconciliation). Distinct from a plain vnode's own `children` in that the reconciler always
/// runs its full keyed-diff algorithm here, even for a single child, rather than the positional
/// fast path regular element children get.
pub fn create_list(children: impl FnOnce() -> Vec<ChildInput>) -> CoreResult<VNode> {
    let built = flatten_children(children());
    check_duplicate_keys(&built)?;
    Ok(VNode {
        kind: NodeKind::List,
        node_type: NodeType::Tag(Rc::from("#list")),
        key: None,
        props: Props::default(),
        children: built,
        text: None,
        directives: Vec::new(),
        mount: RefCell::new(MountState::Unmounted),
    })
}

/// A runtime-classified switch view owning exactly one child, whose kind (`view`/`text`/`empty`)
/// the reconciler compares across patches to decide replace-vs-patch-in-place (§4.8 "Dynamic
/// (switch) view").
pub fn create_dynamic(slot: impl FnOnce() -> Option<VNode>) -> VNode {
    let child = slot().unwrap_or_else(VNode::empty_placeholder);
    VNode {
        kind: NodeKind::Dynamic,
        node_type: NodeType::Tag(Rc::from("#dynamic")),
        key: None,
        props: Props::default(),
        children: vec![child],
        text: None,
        directives: Vec::new(),
        mount: RefCell::new(MountState::Unmounted),
    }
}

/// Wraps a host handle so it can be carried as an opaque attribute value (teleport target
/// storage on the vnode itself, read back by the dispatcher at mount time).
#[derive(Clone)]
struct TeleportTarget(pub crate::driver::HostHandle);

impl PartialEq for TeleportTarget {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

pub(crate) fn teleport_target_of(props: &Props) -> Option<crate::driver::HostHandle> {
    match props.attrs.get("__reactive_core_teleport_target") {
        Some(AttributeValue::Any(any)) => any
            .as_any()
            .downcast_ref::<TeleportTarget>()
            .map(|t| t.0.clone()),
        _ => None,
    }
}
