//! The application entry point: `App`/`create_app`/`mount`/`unmount` (§4.9 mount sequencing,
//! §6 `createApp(root, config?)`, §10.3 `AppConfig`).
//!
//! ## Guide
//!
//! A root component is an ordinary [`ComponentFn`] with no parent, just like any other
//! component in the tree it builds — `App` exists only to give it somewhere to be mounted from
//! and a place to hang application-wide configuration (§10.3), plugins, directives, and the
//! top-level provide table (§4.9's "application-level provide table").
//!
//! ```rust, ignore
//! let app = create_app(root_component, AppConfig::default());
//! app.provide("theme", "dark".to_string());
//! app.directive("focus", focus_directive_spec());
//! app.mount(MountTarget { driver: my_driver, container: my_root_element });
//! ```
//!
//! Grounded on `packages/core/src/virtual_dom.rs`'s `VirtualDom::new`/`rebuild` doc style (a long
//! `///` block walking realistic usage) for this module's own docs; `VirtualDom`'s field layout
//! (owning the scheduler/root scope, delegating tree storage elsewhere) is the model for what
//! `App` itself owns versus what it defers to [`crate::reactive`] and [`crate::component`].

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::dispatcher;
use crate::driver::{DriverHandle, HostHandle};
use crate::error::CoreError;
use crate::reactive::runtime::with_runtime;
use crate::vnode::factory::{set_strict_duplicate_keys, set_void_tag_classifier};
use crate::vnode::node::{ComponentFn, MountState, NodeType, Props, VNode};

/// Tunables bundled by `create_app(root, config?)` (§10.3). Deliberately not a general-purpose
/// settings bag — every field corresponds to a behavior the spec names as configurable or
/// implementation-defined.
pub struct AppConfig {
    /// The scheduler's re-entrant-enqueue depth bound (§4.4, §5 "a bounded max-depth detects
    /// pathological cycles"). An effect that re-enters itself past this many times in a single
    /// drain raises `ReactivityError::ReentrantDepthExceeded` instead of looping forever.
    pub reentrant_depth_bound: usize,
    /// Resolves Open Question (i): whether a duplicate vnode key among siblings at construction
    /// time is a logged-and-continue diagnostic (`false`, the default, matching the spec's
    /// stated reference behavior) or a hard `ShapeError::DuplicateKey` (`true`).
    pub strict_duplicate_keys: bool,
    /// The application's global error handler (§4.9 step 3: "If the root is reached, invoke the
    /// application's configured global error handler"). Invoked after the unhandled-error
    /// diagnostic is logged; `None` means nothing further happens once the root is reached.
    pub error_handler: Option<Rc<dyn Fn(&CoreError)>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            reentrant_depth_bound: 1000,
            strict_duplicate_keys: false,
            error_handler: None,
        }
    }
}

/// Where an `App` mounts: the host driver it talks to and the container node its root subtree
/// attaches under (§6 "The adapter is injected at init"; here, "init" is mount time, since that
/// is the first point a concrete host container exists to inject a driver against).
pub struct MountTarget {
    pub driver: DriverHandle,
    pub container: HostHandle,
}

/// A plugin installs cross-cutting behavior (directives, app-level provided values) against an
/// `App` before it mounts. Named in §6's public API list (`use(plugin, opts?)`) without further
/// elaboration in §4; this crate gives it the minimal shape a plugin needs to do anything useful
/// against the surface `App` actually exposes.
pub trait Plugin {
    fn install(&self, app: &App);
}

/// The root of a mounted component tree (§6 `createApp(root, config?)`). Created via
/// [`create_app`]; call [`App::mount`] to materialize it against a host, [`App::unmount`] to
/// tear it down.
pub struct App {
    root: ComponentFn,
    config: AppConfig,
    root_vnode: RefCell<Option<VNode>>,
    driver: RefCell<Option<DriverHandle>>,
}

/// Creates an application wrapping `root` as the component mounted at the tree's top (§6
/// `createApp(root, config?)`). Nothing is materialized against a host until [`App::mount`] is
/// called.
pub fn create_app(root: ComponentFn, config: AppConfig) -> App {
    with_runtime(|rt| rt.set_reentrant_depth_bound(config.reentrant_depth_bound));
    set_strict_duplicate_keys(config.strict_duplicate_keys);
    crate::component::set_global_error_handler(config.error_handler.clone());
    App {
        root,
        config,
        root_vnode: RefCell::new(None),
        driver: RefCell::new(None),
    }
}

impl App {
    /// Installs a plugin against this app before mounting (§6 `use(plugin, opts?)`; this crate's
    /// `Plugin` trait carries its own options via whatever fields the concrete plugin type
    /// chooses, rather than a second untyped `opts` parameter).
    pub fn use_plugin(&self, plugin: impl Plugin) -> &Self {
        plugin.install(self);
        self
    }

    /// Registers a classifier the vnode factory (§4.7) uses to route a tag name to
    /// [`crate::vnode::node::NodeKind::VoidElement`] instead of `RegularElement`. Typically
    /// supplied once, from the same driver that will be passed to [`App::mount`].
    pub fn set_void_tag_classifier(&self, classifier: Rc<dyn Fn(&str) -> bool>) -> &Self {
        set_void_tag_classifier(classifier);
        self
    }

    /// Writes to the application-level provide table that `inject(name, default?)` falls back to
    /// once no ancestor component scope provides a matching key (§4.9, §6 `provide(name,
    /// value)`).
    pub fn provide<T: 'static>(&self, name: &'static str, value: T) -> &Self {
        crate::component::app_provide(name, Rc::new(value) as Rc<dyn Any>);
        self
    }

    /// Registers a named directive's callbacks for the dispatcher (C11) to invoke at the
    /// documented mount/update/unmount points (§4.10, §6 `directive(name, spec)`).
    pub fn directive(&self, name: &'static str, spec: dispatcher::DirectiveSpec) -> &Self {
        dispatcher::register_directive(name, spec);
        self
    }

    /// Materializes the root component's subtree against `target` (§4.9 mount sequence). A
    /// second call to `mount` on an already-mounted `App` is a no-op — call [`App::unmount`]
    /// first to remount elsewhere.
    pub fn mount(&self, target: MountTarget) {
        if self.root_vnode.borrow().is_some() {
            return;
        }
        let vnode = VNode {
            kind: crate::vnode::node::NodeKind::StatefulWidget,
            node_type: NodeType::Component {
                name: "App",
                build: Rc::clone(&self.root),
                stateless: false,
            },
            key: None,
            props: Props::default(),
            children: Vec::new(),
            text: None,
            directives: Vec::new(),
            mount: RefCell::new(MountState::Unmounted),
        };
        dispatcher::mount(&vnode, &target.driver, &target.container, None, None);
        *self.root_vnode.borrow_mut() = Some(vnode);
        *self.driver.borrow_mut() = Some(target.driver);
    }

    /// Tears down the mounted subtree: `beforeUnmount` down to `unmounted` back up, scope
    /// disposal cascading along the way (§4.9 "Unmount"). A no-op if not currently mounted.
    pub fn unmount(&self) {
        let Some(vnode) = self.root_vnode.borrow_mut().take() else {
            return;
        };
        if let Some(driver) = self.driver.borrow_mut().take() {
            dispatcher::unmount(&vnode, &driver);
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
