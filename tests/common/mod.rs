//! A recording, in-memory host driver shared by the integration suites, implementing the C10
//! contract (`reactive_core::HostDriver`) over a tiny owned tree instead of a real platform.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use reactive_core::{
    AttributeValue, ComponentFn, HostDriver, HostHandle, MountState, NodeKind, NodeType, Props, VNode,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateElement(String),
    CreateText(String),
    CreateComment(String),
    Insert,
    Remove,
    SetAttribute(String),
    SetText(String),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum HostKind {
    Element,
    Text,
    Comment,
}

pub struct HostNode {
    kind: HostKind,
    tag: String,
    text: RefCell<String>,
    attrs: RefCell<Vec<(String, String)>>,
    parent: RefCell<Option<Weak<HostNode>>>,
    children: RefCell<Vec<Rc<HostNode>>>,
}

impl HostNode {
    fn leaf(kind: HostKind, tag: &str, text: &str) -> Rc<HostNode> {
        Rc::new(HostNode {
            kind,
            tag: tag.to_string(),
            text: RefCell::new(text.to_string()),
            attrs: RefCell::new(Vec::new()),
            parent: RefCell::new(None),
            children: RefCell::new(Vec::new()),
        })
    }
}

fn downcast(handle: &HostHandle) -> Rc<HostNode> {
    handle
        .clone()
        .downcast::<HostNode>()
        .unwrap_or_else(|_| panic!("handle did not originate from this test driver"))
}

fn detach(node: &Rc<HostNode>) {
    if let Some(parent) = node.parent.borrow_mut().take().and_then(|p| p.upgrade()) {
        parent.children.borrow_mut().retain(|c| !Rc::ptr_eq(c, node));
    }
}

/// An in-memory tree driver that records every mutation it's asked to perform, for the
/// assertions the §8 property/S1-S6 scenario suites make against mutation order and count.
#[derive(Default)]
pub struct RecordingDriver {
    pub log: RefCell<Vec<Mutation>>,
}

impl RecordingDriver {
    pub fn new() -> Rc<RecordingDriver> {
        Rc::new(RecordingDriver::default())
    }

    pub fn container(&self) -> HostHandle {
        HostNode::leaf(HostKind::Element, "root", "") as HostHandle
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&Mutation) -> bool) -> usize {
        self.log.borrow().iter().filter(|m| pred(m)).count()
    }
}

impl HostDriver for RecordingDriver {
    fn create_element(&self, tag: &str, _is_svg: bool) -> HostHandle {
        self.log.borrow_mut().push(Mutation::CreateElement(tag.to_string()));
        HostNode::leaf(HostKind::Element, tag, "") as HostHandle
    }

    fn create_text(&self, value: &str) -> HostHandle {
        self.log.borrow_mut().push(Mutation::CreateText(value.to_string()));
        HostNode::leaf(HostKind::Text, "#text", value) as HostHandle
    }

    fn create_comment(&self, value: &str) -> HostHandle {
        self.log.borrow_mut().push(Mutation::CreateComment(value.to_string()));
        HostNode::leaf(HostKind::Comment, "#comment", value) as HostHandle
    }

    fn create_fragment_anchors(&self) -> (HostHandle, HostHandle) {
        (self.create_comment(""), self.create_comment(""))
    }

    fn insert(&self, child: &HostHandle, parent: &HostHandle, anchor: Option<&HostHandle>) {
        let child_node = downcast(child);
        let parent_node = downcast(parent);
        detach(&child_node);
        let idx = match anchor {
            Some(a) => {
                let anchor_node = downcast(a);
                let children = parent_node.children.borrow();
                children
                    .iter()
                    .position(|c| Rc::ptr_eq(c, &anchor_node))
                    .unwrap_or(children.len())
            }
            None => parent_node.children.borrow().len(),
        };
        parent_node.children.borrow_mut().insert(idx, child_node.clone());
        *child_node.parent.borrow_mut() = Some(Rc::downgrade(&parent_node));
        self.log.borrow_mut().push(Mutation::Insert);
    }

    fn remove(&self, node: &HostHandle) {
        detach(&downcast(node));
        self.log.borrow_mut().push(Mutation::Remove);
    }

    fn set_attribute(&self, el: &HostHandle, name: &str, next: Option<&AttributeValue>, _prev: Option<&AttributeValue>) {
        let node = downcast(el);
        let mut attrs = node.attrs.borrow_mut();
        attrs.retain(|(k, _)| k != name);
        if let Some(value) = next {
            let rendered = match value {
                AttributeValue::Text(t) => t.to_string(),
                AttributeValue::Number(n) => n.to_string(),
                AttributeValue::Bool(b) => b.to_string(),
                AttributeValue::Listener(_) => "#listener".to_string(),
                AttributeValue::Any(_) => "#any".to_string(),
                AttributeValue::None => String::new(),
            };
            attrs.push((name.to_string(), rendered));
        }
        self.log.borrow_mut().push(Mutation::SetAttribute(name.to_string()));
    }

    fn set_text(&self, node: &HostHandle, value: &str) {
        *downcast(node).text.borrow_mut() = value.to_string();
        self.log.borrow_mut().push(Mutation::SetText(value.to_string()));
    }

    fn parent_of(&self, node: &HostHandle) -> Option<HostHandle> {
        let parent = downcast(node).parent.borrow().as_ref()?.upgrade()?;
        Some(parent as HostHandle)
    }

    fn next_sibling_of(&self, node: &HostHandle) -> Option<HostHandle> {
        let n = downcast(node);
        let parent = n.parent.borrow().as_ref()?.upgrade()?;
        let children = parent.children.borrow();
        let idx = children.iter().position(|c| Rc::ptr_eq(c, &n))?;
        children.get(idx + 1).cloned().map(|h| h as HostHandle)
    }

    fn is_void_tag(&self, tag: &str) -> bool {
        matches!(tag, "br" | "img" | "input" | "hr")
    }
}

/// Depth-first search for the first text node's content under `handle` (elements/fragments
/// recurse into their children; a bare text/comment handle returns its own content).
pub fn first_text(handle: &HostHandle) -> Option<String> {
    let node = downcast(handle);
    if node.kind == HostKind::Text {
        return Some(node.text.borrow().clone());
    }
    for child in node.children.borrow().iter() {
        if let Some(t) = first_text(&(child.clone() as HostHandle)) {
            return Some(t);
        }
    }
    None
}

/// Depth-first search for the first descendant element with the given tag, including `handle`
/// itself.
pub fn find_tag(handle: &HostHandle, tag: &str) -> Option<HostHandle> {
    let node = downcast(handle);
    if node.kind == HostKind::Element && node.tag == tag {
        return Some(handle.clone());
    }
    for child in node.children.borrow().iter() {
        if let Some(found) = find_tag(&(child.clone() as HostHandle), tag) {
            return Some(found);
        }
    }
    None
}

pub fn child_tags(handle: &HostHandle) -> Vec<String> {
    downcast(handle)
        .children
        .borrow()
        .iter()
        .map(|c| c.tag.clone())
        .collect()
}

/// The first text content found under each direct child of `handle`, in document order — handy
/// for asserting a keyed list's rendered order without caring about each `li`'s own handle.
pub fn child_texts(handle: &HostHandle) -> Vec<String> {
    downcast(handle)
        .children
        .borrow()
        .iter()
        .map(|c| first_text(&(c.clone() as HostHandle)).unwrap_or_default())
        .collect()
}

/// Builds the widget vnode `App::mount` would build, for tests that drive the component runtime
/// directly (`reactive_core::component::mount_component`) rather than through `App`.
pub fn widget_vnode(name: &'static str, build: ComponentFn) -> VNode {
    VNode {
        kind: NodeKind::StatefulWidget,
        node_type: NodeType::Component {
            name,
            build,
            stateless: false,
        },
        key: None,
        props: Props::default(),
        children: Vec::new(),
        text: None,
        directives: Vec::new(),
        mount: RefCell::new(MountState::Unmounted),
    }
}

pub fn widget_id(vnode: &VNode) -> reactive_core::ComponentId {
    match &*vnode.mount.borrow() {
        MountState::Widget(id) => *id,
        _ => panic!("vnode has no widget mount state"),
    }
}

#[allow(unused)]
pub fn any_handle(h: &HostHandle) -> &dyn Any {
    &**h
}
