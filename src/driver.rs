//! The host adapter contract the core consumes from platform drivers (§6 "Host adapter (C10)").
//!
//! Grounded on `packages/core/src/mutations.rs::WriteMutations`, whose per-method doc-comment
//! convention ("Name:/Id:/Path:/M:/Value:") this trait imitates directly. Unlike `WriteMutations`
//! (a batched mutation-list sink applied after a whole diff pass), this trait is called inline by
//! the reconciler as it walks a patch — there is no template/mutation-list indirection here since
//! this crate's vnodes are not compiled templates (§1 explicitly puts the JSX compiler out of
//! scope).

use std::any::Any;
use std::rc::Rc;

use crate::vnode::node::AttributeValue;

/// An opaque handle to a host-native node (element, text, or comment). The core never inspects
/// its contents; only the driver that created it downcasts it back to its concrete type.
pub type HostHandle = Rc<dyn Any>;

/// An owned, cheaply-cloneable handle to a driver. A component's render effect must be able to
/// re-run long after the call that first mounted it returns (§4.4 "drained on a microtask"), so
/// the driver it talks to can't be a borrowed `&dyn HostDriver` scoped to that call — every
/// mount/patch/unmount entry point in this crate threads this owned form instead.
pub type DriverHandle = Rc<dyn HostDriver>;

/// The contract a platform driver implements so the reconciler (C8) and component runtime (C9)
/// can materialize a vnode tree without knowing whether the host is a browser DOM, a headless
/// test harness, or an SSR string sink.
pub trait HostDriver {
    /// Creates a new element.
    ///
    /// Tag: the element's tag name.
    /// IsSVG: whether this element (and, implicitly, its subtree) lives in the SVG namespace.
    fn create_element(&self, tag: &str, is_svg: bool) -> HostHandle;

    /// Creates a text node.
    ///
    /// Value: the text node's initial content.
    fn create_text(&self, value: &str) -> HostHandle;

    /// Creates a comment node.
    ///
    /// Value: the comment node's initial content.
    fn create_comment(&self, value: &str) -> HostHandle;

    /// Creates the pair of anchor comments a fragment uses to mark its start/end in the host
    /// tree (§4.8 "a synthetic handle maintaining start/end anchor comments").
    fn create_fragment_anchors(&self) -> (HostHandle, HostHandle);

    /// Attaches `child` to `parent`, before `anchor` if given or at the end otherwise. If
    /// `child` is already attached elsewhere in the host tree, implementations detach it first
    /// (as a native DOM `insertBefore` does) — the reconciler relies on this to reuse `insert`
    /// as its only primitive for moving an already-mounted node during keyed-list reordering
    /// (§4.8), rather than requiring a separate move operation.
    ///
    /// Child: the node to attach.
    /// Parent: the container to attach it to.
    /// Anchor: if present, `child` is inserted immediately before this node.
    fn insert(&self, child: &HostHandle, parent: &HostHandle, anchor: Option<&HostHandle>);

    /// Detaches `node` from its current parent.
    fn remove(&self, node: &HostHandle);

    /// Updates a single attribute, property, or event listener.
    ///
    /// Name: the attribute name. Event listeners use a name-suffix convention (`onClickCapture`,
    /// `onClickOnce`, `onClickPassive`, combinable) that the driver is responsible for
    /// interpreting into capture/once/passive semantics.
    /// Next: the new value, or `None` to remove the attribute/listener entirely.
    /// Prev: the previous value, so the driver can unregister a stale listener before attaching
    /// its replacement — per §6, "Replacement replaces the listener."
    /// Id: the element to update.
    fn set_attribute(&self, el: &HostHandle, name: &str, next: Option<&AttributeValue>, prev: Option<&AttributeValue>);

    /// Replaces a text node's content.
    ///
    /// Id: the text node to update.
    /// Value: its new content.
    fn set_text(&self, node: &HostHandle, value: &str);

    /// Navigates to a node's current host parent, if attached. Used to resolve anchors during
    /// keyed-child moves (§4.8).
    fn parent_of(&self, node: &HostHandle) -> Option<HostHandle>;

    /// Navigates to a node's next host sibling, if any. Used the same way as `parent_of`.
    fn next_sibling_of(&self, node: &HostHandle) -> Option<HostHandle>;

    /// Classifies a tag name as a void element (no children, self-closing in markup form) for
    /// node-kind routing during vnode construction (§4.7).
    fn is_void_tag(&self, tag: &str) -> bool;
}
