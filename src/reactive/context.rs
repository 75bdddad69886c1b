//! The dynamic-scope context store (§3, §4.6 "Context store (C6)").
//!
//! A stack per tag, never a single global map (§9 design note). Used internally by the
//! component runtime to track "the currently-building component" so hooks registered during a
//! build attach to the right instance, and exposed for `withAsyncContext` so user code awaiting
//! inside a component body still observes its originating component across the await point.
//! Grounded on `packages/hooks/src/use_shared_state.rs`'s walk-the-parent-chain convention for
//! the *shape* of contextual lookup, reimplemented here as the simpler tag-stack §4.6 specifies
//! rather than a scope-tree walk (that walk is what `Runtime::provide_context`/`inject_context`
//! in `reactive/runtime.rs` already implements for component `provide`/`inject`).

use std::any::Any;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context as TaskContext, Poll};

use fxhash::FxHashMap;

thread_local! {
    static CONTEXTS: RefCell<FxHashMap<&'static str, Vec<Rc<dyn Any>>>> = RefCell::new(FxHashMap::default());
}

fn push_context(tag: &'static str, value: Rc<dyn Any>) {
    CONTEXTS.with(|c| c.borrow_mut().entry(tag).or_default().push(value));
}

fn pop_context(tag: &'static str) {
    CONTEXTS.with(|c| {
        if let Some(stack) = c.borrow_mut().get_mut(tag) {
            stack.pop();
        }
    });
}

/// Pushes `value` onto `tag`'s stack, runs `f`, pops. Contexts are *not* persisted across
/// microtasks unless explicitly wrapped with [`with_async_context`].
pub(crate) fn run_in_context<R>(tag: &'static str, value: Rc<dyn Any>, f: impl FnOnce() -> R) -> R {
    push_context(tag, value);
    let result = f();
    pop_context(tag);
    result
}

/// Returns the top value on `tag`'s stack, if any.
pub(crate) fn get_context(tag: &'static str) -> Option<Rc<dyn Any>> {
    CONTEXTS.with(|c| c.borrow().get(tag).and_then(|v| v.last()).cloned())
}

/// Wraps a future so that, on every poll, the context values captured at construction time are
/// re-pushed before polling the inner future and popped afterward — so user code that awaits
/// inside a component build still sees its originating component's context on the other side of
/// the await (§4.6 `withAsyncContext`).
pub struct WithAsyncContext<T> {
    inner: Pin<Box<dyn Future<Output = T>>>,
    captured: Vec<(&'static str, Rc<dyn Any>)>,
}

impl<T> Future for WithAsyncContext<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<T> {
        for (tag, value) in &self.captured {
            push_context(tag, value.clone());
        }
        let result = self.inner.as_mut().poll(cx);
        for (tag, _) in self.captured.iter().rev() {
            pop_context(tag);
        }
        result
    }
}

/// Captures the current top value (if any) for each tag in `tags`, then wraps `fut` so that
/// continuation after every `await` point sees those values restored (§6 public API
/// `withAsyncContext(promise|fn, tagList)`).
pub fn with_async_context<T: 'static>(
    tags: &[&'static str],
    fut: impl Future<Output = T> + 'static,
) -> WithAsyncContext<T> {
    let captured = tags
        .iter()
        .filter_map(|&tag| get_context(tag).map(|value| (tag, value)))
        .collect();
    WithAsyncContext {
        inner: Box::pin(fut),
        captured,
    }
}

/// The tag used internally to track "the component instance currently running its build
/// function or a lifecycle hook" (see `component::runtime`).
pub(crate) const CURRENT_COMPONENT_TAG: &str = "__reactive_core_current_component";
