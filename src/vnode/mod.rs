//! The vnode model (§3 "VNode") and the normalizing factory that constructs it (§4.7).

pub mod factory;
pub mod node;

pub use factory::{create_dynamic, create_list, create_vnode, ChildInput, MemoKey, VMemo, VNodeInput};
pub use node::{
    AnyAttributeValue, AttributeValue, ComponentFn, DirectiveBinding, ListenerFn, MountState,
    NodeKind, NodeType, Props, VNode,
};
