//! The disposal-scope tree (§3 "Scope", §4.3).
//!
//! Grounded on `packages/core/src/scope.rs`'s `Scope { parent_scope, .. }`/`height` shape,
//! reimplemented without the teacher's raw-pointer bump-frame design — see `Runtime`'s doc
//! comment for why. `leptos_reactive`'s `scope_parents`/`scope_children` secondary maps are the
//! other reference point for the parent-before-child disposal order.

use std::cell::RefCell;

use crate::reactive::runtime::{with_runtime, ScopeId};

thread_local! {
    /// The stack of scopes currently "active" for the purposes of attaching new effects,
    /// `provide`/`inject` calls, and nested `scope()` calls. Component instances push their own
    /// scope onto this stack while running build/hook code; [`scope`] does the same for
    /// standalone reactive-graph use outside any component.
    static CURRENT_SCOPE: RefCell<Vec<ScopeId>> = RefCell::new(Vec::new());
}

pub(crate) fn current_scope_id() -> Option<ScopeId> {
    CURRENT_SCOPE.with(|s| s.borrow().last().copied())
}

pub(crate) fn push_current_scope(id: ScopeId) {
    CURRENT_SCOPE.with(|s| s.borrow_mut().push(id));
}

pub(crate) fn pop_current_scope() {
    CURRENT_SCOPE.with(|s| {
        s.borrow_mut().pop();
    });
}

/// A handle to an owner of effects and child scopes (§3 "Scope"). Cheap to copy; the owned data
/// lives in [`Runtime`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Scope(pub(crate) ScopeId);

impl Scope {
    /// Creates a new scope nested under the currently-active one, if any.
    pub fn child(&self) -> Scope {
        Scope(with_runtime(|rt| rt.create_scope(Some(self.0))))
    }

    /// Runs `f` with this scope pushed as the active one, so effects/provide calls made inside
    /// attach here.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        push_current_scope(self.0);
        let result = f();
        pop_current_scope();
        result
    }

    /// Suppresses scheduling for every effect owned by this scope (and not, notably, its
    /// children's effects directly — callers that want that recurse themselves; the component
    /// runtime's activate/deactivate path does so deliberately since a deactivated subtree's
    /// descendants are deactivated individually as part of the same walk).
    pub fn pause(&self) {
        with_runtime(|rt| rt.pause_scope(self.0));
    }

    /// Resumes scheduling; any invalidation accumulated while paused triggers exactly one
    /// re-run per affected effect.
    pub fn resume(&self) {
        with_runtime(|rt| rt.resume_scope(self.0));
    }

    /// Disposes this scope and every descendant, children before parent, running registered
    /// cleanups LIFO (§3 "Disposal cascades child→parent").
    pub fn dispose(&self) {
        with_runtime(|rt| rt.dispose_scope(self.0));
    }

    pub fn parent(&self) -> Option<Scope> {
        with_runtime(|rt| rt.scope_parent(self.0)).map(Scope)
    }
}

/// Creates a new scope (nested under the currently-active one, if any) and runs `f` with it
/// active, returning both the scope handle (for manual pause/resume/dispose) and `f`'s result
/// (§6 public API `scope(fn)`).
pub fn scope<R>(f: impl FnOnce() -> R) -> (Scope, R) {
    let parent = current_scope_id();
    let id = with_runtime(|rt| rt.create_scope(parent));
    let handle = Scope(id);
    let result = handle.run(f);
    (handle, result)
}
