//! The process-wide reactive graph: signals, memos, effects, and the disposal-scope tree that
//! owns them.
//!
//! Shaped after the safe, `SlotMap`/`SecondaryMap`-based arena in `leptos_reactive::Runtime`
//! rather than the teacher's unsafe bump-arena `Scope` — that design is self-referential and
//! partially unfinished in the retrieval pack. Everything here lives behind a single
//! thread-local `Runtime`, consistent with the single-threaded cooperative model.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fxhash::{FxHashMap, FxHashSet};
use slotmap::{SecondaryMap, SlotMap};

use crate::error::ReactivityError;
use crate::reactive::scheduler::{EffectPhase, Scheduler};

slotmap::new_key_type! {
    /// Identifies a signal, memo, or effect in the reactive graph.
    pub struct NodeId;
    /// Identifies a disposal scope.
    pub struct ScopeId;
}

pub(crate) struct SignalState {
    pub value: RefCell<Box<dyn Any>>,
    pub equals: Box<dyn Fn(&dyn Any, &dyn Any) -> bool>,
}

pub(crate) struct MemoState {
    pub value: RefCell<Option<Box<dyn Any>>>,
    pub dirty: Cell<bool>,
    /// `Rc`-wrapped so a caller can clone the handle out from under a `nodes.borrow()` and run
    /// it after that borrow is dropped, without re-borrowing the slotmap re-entrantly.
    pub compute: Rc<RefCell<Box<dyn FnMut() -> Box<dyn Any>>>>,
    pub equals: Box<dyn Fn(&dyn Any, &dyn Any) -> bool>,
}

pub(crate) struct EffectState {
    pub run: Rc<RefCell<Box<dyn FnMut()>>>,
    pub phase: EffectPhase,
    pub running: Cell<bool>,
    pub paused: Cell<bool>,
    pub pending_while_paused: Cell<bool>,
    pub cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
}

pub(crate) enum Node {
    Signal(SignalState),
    Memo(MemoState),
    Effect(EffectState),
}

impl Node {
    fn is_effect_like(&self) -> bool {
        matches!(self, Node::Effect(_) | Node::Memo(_))
    }
}

#[derive(Default)]
struct ScopeData {
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    effects: Vec<NodeId>,
    cleanups: Vec<Box<dyn FnOnce()>>,
    contexts: FxHashMap<&'static str, Rc<dyn Any>>,
    paused: bool,
}

/// The singleton reactive graph. Accessed only through [`with_runtime`]/[`with_runtime_mut`].
pub struct Runtime {
    nodes: RefCell<SlotMap<NodeId, Node>>,
    node_scope: RefCell<SecondaryMap<NodeId, ScopeId>>,
    /// For a signal/memo: the effects/memos that read it last run.
    subscribers: RefCell<SecondaryMap<NodeId, FxHashSet<NodeId>>>,
    /// For an effect/memo: the signals/memos it read last run.
    sources: RefCell<SecondaryMap<NodeId, FxHashSet<NodeId>>>,
    disposed: RefCell<FxHashSet<NodeId>>,

    scopes: RefCell<SlotMap<ScopeId, ScopeData>>,

    /// Stack of active collector frames; `None` entries represent an `untracked` suppression.
    collector_stack: RefCell<Vec<Option<NodeId>>>,
    /// Link sets being built for the collector frame at the same stack depth.
    link_stack: RefCell<Vec<FxHashSet<NodeId>>>,

    pub(crate) scheduler: Scheduler,

    reentrant_depth_bound: Cell<usize>,
}

impl Runtime {
    fn new() -> Self {
        Runtime {
            nodes: RefCell::new(SlotMap::with_key()),
            node_scope: RefCell::new(SecondaryMap::new()),
            subscribers: RefCell::new(SecondaryMap::new()),
            sources: RefCell::new(SecondaryMap::new()),
            disposed: RefCell::new(FxHashSet::default()),
            scopes: RefCell::new(SlotMap::with_key()),
            collector_stack: RefCell::new(Vec::new()),
            link_stack: RefCell::new(Vec::new()),
            scheduler: Scheduler::new(),
            reentrant_depth_bound: Cell::new(1000),
        }
    }

    pub(crate) fn set_reentrant_depth_bound(&self, bound: usize) {
        self.reentrant_depth_bound.set(bound);
    }

    // ---- scopes -------------------------------------------------------------------------

    pub(crate) fn create_scope(&self, parent: Option<ScopeId>) -> ScopeId {
        let id = self.scopes.borrow_mut().insert(ScopeData {
            parent,
            ..Default::default()
        });
        if let Some(p) = parent {
            if let Some(data) = self.scopes.borrow_mut().get_mut(p) {
                data.children.push(id);
            }
        }
        id
    }

    pub(crate) fn scope_parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.borrow().get(scope).and_then(|d| d.parent)
    }

    pub(crate) fn scope_is_paused(&self, scope: ScopeId) -> bool {
        self.scopes.borrow().get(scope).map(|d| d.paused).unwrap_or(false)
    }

    pub(crate) fn pause_scope(&self, scope: ScopeId) {
        let effects = {
            let mut scopes = self.scopes.borrow_mut();
            if let Some(data) = scopes.get_mut(scope) {
                data.paused = true;
                data.effects.clone()
            } else {
                return;
            }
        };
        for eff in effects {
            if let Some(Node::Effect(e)) = self.nodes.borrow().get(eff) {
                e.paused.set(true);
            }
        }
    }

    pub(crate) fn resume_scope(&self, scope: ScopeId) {
        let effects = {
            let mut scopes = self.scopes.borrow_mut();
            if let Some(data) = scopes.get_mut(scope) {
                data.paused = false;
                data.effects.clone()
            } else {
                return;
            }
        };
        for eff in effects {
            let should_run = if let Some(Node::Effect(e)) = self.nodes.borrow().get(eff) {
                e.paused.set(false);
                e.pending_while_paused.replace(false)
            } else {
                false
            };
            if should_run {
                self.schedule_node(eff);
            }
        }
    }

    pub(crate) fn register_effect_in_scope(&self, scope: ScopeId, node: NodeId) {
        if let Some(data) = self.scopes.borrow_mut().get_mut(scope) {
            data.effects.push(node);
        }
        self.node_scope.borrow_mut().insert(node, scope);
    }

    pub(crate) fn push_cleanup(&self, scope: ScopeId, cleanup: Box<dyn FnOnce()>) {
        if let Some(data) = self.scopes.borrow_mut().get_mut(scope) {
            data.cleanups.push(cleanup);
        }
    }

    pub(crate) fn provide_context(&self, scope: ScopeId, key: &'static str, value: Rc<dyn Any>) {
        if let Some(data) = self.scopes.borrow_mut().get_mut(scope) {
            data.contexts.insert(key, value);
        }
    }

    pub(crate) fn inject_context(&self, scope: ScopeId, key: &'static str) -> Option<Rc<dyn Any>> {
        let mut current = Some(scope);
        while let Some(s) = current {
            let scopes = self.scopes.borrow();
            let data = scopes.get(s)?;
            if let Some(v) = data.contexts.get(key) {
                return Some(v.clone());
            }
            current = data.parent;
        }
        None
    }

    /// Disposes a scope and every descendant, children before parent, running cleanups LIFO.
    pub(crate) fn dispose_scope(&self, scope: ScopeId) {
        let children = self
            .scopes
            .borrow()
            .get(scope)
            .map(|d| d.children.clone())
            .unwrap_or_default();
        for child in children {
            self.dispose_scope(child);
        }

        let (effects, cleanups) = {
            let mut scopes = self.scopes.borrow_mut();
            match scopes.remove(scope) {
                Some(data) => (data.effects, data.cleanups),
                None => return,
            }
        };

        for eff in effects {
            self.dispose_node(eff);
        }
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    }

    fn dispose_node(&self, node: NodeId) {
        self.disposed.borrow_mut().insert(node);
        let sources = self.sources.borrow_mut().remove(node);
        if let Some(sources) = sources {
            let mut subs = self.subscribers.borrow_mut();
            for src in sources {
                if let Some(set) = subs.get_mut(src) {
                    set.remove(&node);
                }
            }
        }
        self.subscribers.borrow_mut().remove(node);
        if let Some(Node::Effect(e)) = self.nodes.borrow().get(node) {
            let cleanups: Vec<_> = e.cleanups.borrow_mut().drain(..).collect();
            for c in cleanups.into_iter().rev() {
                c();
            }
        }
        self.nodes.borrow_mut().remove(node);
        self.node_scope.borrow_mut().remove(node);
    }

    /// Disposes a single effect ahead of its owning scope's disposal, e.g. an `effect()` handle
    /// dropped explicitly by user code. Removes it from its scope's effect list too, so the
    /// scope doesn't try to clean it up again later.
    pub(crate) fn dispose_effect(&self, node: NodeId) {
        if let Some(scope) = self.node_scope.borrow().get(node).copied() {
            if let Some(data) = self.scopes.borrow_mut().get_mut(scope) {
                data.effects.retain(|&n| n != node);
            }
        }
        self.dispose_node(node);
    }

    fn is_disposed(&self, node: NodeId) -> bool {
        self.disposed.borrow().contains(&node)
    }

    // ---- node creation --------------------------------------------------------------------

    pub(crate) fn create_signal_node(
        &self,
        value: Box<dyn Any>,
        equals: Box<dyn Fn(&dyn Any, &dyn Any) -> bool>,
    ) -> NodeId {
        self.nodes.borrow_mut().insert(Node::Signal(SignalState {
            value: RefCell::new(value),
            equals,
        }))
    }

    pub(crate) fn create_memo_node(
        &self,
        compute: Box<dyn FnMut() -> Box<dyn Any>>,
        equals: Box<dyn Fn(&dyn Any, &dyn Any) -> bool>,
    ) -> NodeId {
        self.nodes.borrow_mut().insert(Node::Memo(MemoState {
            value: RefCell::new(None),
            dirty: Cell::new(true),
            compute: Rc::new(RefCell::new(compute)),
            equals,
        }))
    }

    pub(crate) fn create_effect_node(
        &self,
        scope: ScopeId,
        phase: EffectPhase,
        run: Box<dyn FnMut()>,
    ) -> NodeId {
        let id = self.nodes.borrow_mut().insert(Node::Effect(EffectState {
            run: Rc::new(RefCell::new(run)),
            phase,
            running: Cell::new(false),
            paused: Cell::new(self.scope_is_paused(scope)),
            pending_while_paused: Cell::new(false),
            cleanups: RefCell::new(Vec::new()),
        }));
        self.register_effect_in_scope(scope, id);
        id
    }

    // ---- tracking --------------------------------------------------------------------------

    /// Returns the currently active collector node, if any frame is live and not suppressed.
    fn current_collector(&self) -> Option<NodeId> {
        self.collector_stack.borrow().last().copied().flatten()
    }

    /// Records a read of `node` against the currently active collector frame, if any.
    pub(crate) fn track(&self, node: NodeId) {
        if let Some(collector) = self.current_collector() {
            if collector == node {
                return;
            }
            if let Some(frame) = self.link_stack.borrow_mut().last_mut() {
                frame.insert(node);
            }
        }
    }

    /// Runs `f` with `collector` (or no collector, for `untracked`) pushed as the active frame,
    /// then reconciles the link set: removed links are unsubscribed, added links are
    /// subscribed.
    pub(crate) fn run_with_collector<R>(&self, collector: Option<NodeId>, f: impl FnOnce() -> R) -> R {
        self.collector_stack.borrow_mut().push(collector);
        if collector.is_some() {
            self.link_stack.borrow_mut().push(FxHashSet::default());
        }
        let result = f();
        if let Some(node) = collector {
            let new_links = self.link_stack.borrow_mut().pop().unwrap_or_default();
            let old_links = self.sources.borrow_mut().insert(node, new_links.clone());
            let old_links = old_links.unwrap_or_default();
            let mut subs = self.subscribers.borrow_mut();
            for removed in old_links.difference(&new_links) {
                if let Some(set) = subs.get_mut(*removed) {
                    set.remove(&node);
                }
            }
            for added in new_links.difference(&old_links) {
                subs.entry(*added).or_insert_with(FxHashSet::default).insert(node);
            }
        }
        self.collector_stack.borrow_mut().pop();
        result
    }

    /// The node whose collector frame is currently active and non-suppressed, i.e. the effect
    /// or memo presently running. Used by `onCleanup` to find where to attach a cleanup.
    pub(crate) fn current_running_node(&self) -> Option<NodeId> {
        self.current_collector()
    }

    /// Creates a bare "topic" node: a signal with no meaningful value, used purely as a
    /// dependency carrier by the reactive-proxy layer (`reactive::proxy`), which has its own
    /// value storage (the target `RawValue` tree) and only needs `Runtime`'s link-tracking half
    /// of the signal machinery. Its equality function always reports "changed" so every
    /// `topic_emit` propagates.
    pub(crate) fn create_topic_node(&self) -> NodeId {
        self.create_signal_node(Box::new(()), Box::new(|_, _| false))
    }

    pub(crate) fn topic_track(&self, node: NodeId) {
        self.track(node);
    }

    pub(crate) fn topic_emit(&self, node: NodeId) {
        self.propagate(node);
    }

    pub(crate) fn untracked<R>(&self, f: impl FnOnce() -> R) -> R {
        // Push a frame with no collector: reads inside `f` see `current_collector() == None`.
        self.collector_stack.borrow_mut().push(None);
        let result = f();
        self.collector_stack.borrow_mut().pop();
        result
    }

    // ---- signal read/write ------------------------------------------------------------------

    pub(crate) fn signal_read<T: 'static, R>(&self, node: NodeId, f: impl FnOnce(&T) -> R) -> R {
        self.track(node);
        let nodes = self.nodes.borrow();
        match nodes.get(node) {
            Some(Node::Signal(s)) => {
                let value = s.value.borrow();
                f(value.downcast_ref::<T>().expect("signal type mismatch"))
            }
            _ => panic!("signal_read on a non-signal node"),
        }
    }

    pub(crate) fn signal_write<T: 'static>(&self, node: NodeId, next: T) {
        if self.is_disposed(node) {
            return;
        }
        let changed = {
            let nodes = self.nodes.borrow();
            match nodes.get(node) {
                Some(Node::Signal(s)) => {
                    let mut value = s.value.borrow_mut();
                    let differs = !(s.equals)(value.as_ref(), &next as &dyn Any);
                    if differs {
                        *value = Box::new(next);
                    }
                    differs
                }
                _ => panic!("signal_write on a non-signal node"),
            }
        };
        if changed {
            self.propagate(node);
        }
    }

    pub(crate) fn signal_update<T: 'static>(&self, node: NodeId, f: impl FnOnce(&mut T)) {
        if self.is_disposed(node) {
            return;
        }
        let changed = {
            let nodes = self.nodes.borrow();
            match nodes.get(node) {
                Some(Node::Signal(s)) => {
                    let mut value = s.value.borrow_mut();
                    let before_ptr = {
                        let before = value.downcast_ref::<T>().expect("signal type mismatch");
                        before as *const T as usize
                    };
                    let _ = before_ptr;
                    let cur = value.downcast_mut::<T>().expect("signal type mismatch");
                    f(cur);
                    true
                }
                _ => panic!("signal_update on a non-signal node"),
            }
        };
        if changed {
            self.propagate(node);
        }
    }

    /// Marks every transitive memo/effect dependent on `node` dirty and schedules the effects.
    fn propagate(&self, node: NodeId) {
        let direct: Vec<NodeId> = self
            .subscribers
            .borrow()
            .get(node)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();

        for dep in direct {
            if self.is_disposed(dep) {
                continue;
            }
            let is_memo = matches!(self.nodes.borrow().get(dep), Some(Node::Memo(_)));
            if is_memo {
                if let Some(Node::Memo(m)) = self.nodes.borrow().get(dep) {
                    m.dirty.set(true);
                }
                self.propagate(dep);
            } else {
                self.schedule_node(dep);
            }
        }
    }

    fn schedule_node(&self, node: NodeId) {
        let phase = match self.nodes.borrow().get(node) {
            Some(Node::Effect(e)) => {
                if e.paused.get() {
                    e.pending_while_paused.set(true);
                    return;
                }
                e.phase
            }
            _ => return,
        };
        // Sync-phase effects never sit in a queue: they run inline, at the write site, modulo
        // the self-reentrancy guard `run_effect` already applies (§4.4, §5).
        if phase == EffectPhase::Sync {
            self.run_effect(node);
        } else {
            self.scheduler.enqueue(node, phase);
        }
    }

    // ---- memo read ---------------------------------------------------------------------------

    pub(crate) fn memo_read<T: 'static, R>(&self, node: NodeId, f: impl FnOnce(&T) -> R) -> R {
        self.recompute_memo_if_dirty(node);
        self.track(node);
        let nodes = self.nodes.borrow();
        match nodes.get(node) {
            Some(Node::Memo(m)) => {
                let value = m.value.borrow();
                f(value
                    .as_ref()
                    .expect("memo computed")
                    .downcast_ref::<T>()
                    .expect("memo type mismatch"))
            }
            _ => panic!("memo_read on a non-memo node"),
        }
    }

    fn recompute_memo_if_dirty(&self, node: NodeId) {
        let dirty = match self.nodes.borrow().get(node) {
            Some(Node::Memo(m)) => m.dirty.get(),
            _ => return,
        };
        if !dirty {
            return;
        }
        let compute_cell = match self.nodes.borrow().get(node) {
            Some(Node::Memo(m)) => m.compute.clone(),
            _ => unreachable!(),
        };
        // Run the compute function under a fresh collector, replacing this node's sources.
        // The `Rc` clone above lets this run without holding `self.nodes`'s borrow, so the
        // compute function may itself read other signals/memos.
        let new_value = self.run_with_collector(Some(node), || {
            let mut compute = compute_cell.borrow_mut();
            compute()
        });
        if let Some(Node::Memo(m)) = self.nodes.borrow().get(node) {
            let mut value = m.value.borrow_mut();
            let differs = match value.as_ref() {
                Some(old) => !(m.equals)(old.as_ref(), new_value.as_ref()),
                None => true,
            };
            if differs {
                *value = Some(new_value);
            }
            m.dirty.set(false);
        }
    }

    // ---- effect running ------------------------------------------------------------------------

    /// Runs an effect's body under its own collector frame, firing queued cleanups first.
    pub(crate) fn run_effect(&self, node: NodeId) {
        if self.is_disposed(node) {
            return;
        }
        let already_running = match self.nodes.borrow().get(node) {
            Some(Node::Effect(e)) => e.running.get(),
            _ => return,
        };
        if already_running {
            // Re-entrant: the effect scheduled itself during its own run. Defer via the
            // scheduler rather than recursing synchronously (§5).
            let depth = self.scheduler.reentrant_depth(node);
            if depth > self.reentrant_depth_bound.get() {
                tracing::error!(?node, depth, "reentrant effect depth bound exceeded");
                return;
            }
            self.scheduler.requeue_for_next_drain(node);
            return;
        }

        let cleanups: Vec<Box<dyn FnOnce()>> = match self.nodes.borrow().get(node) {
            Some(Node::Effect(e)) => e.cleanups.borrow_mut().drain(..).collect(),
            _ => Vec::new(),
        };
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }

        if let Some(Node::Effect(e)) = self.nodes.borrow().get(node) {
            e.running.set(true);
        }

        let run_cell = match self.nodes.borrow().get(node) {
            Some(Node::Effect(e)) => e.run.clone(),
            _ => return,
        };

        self.run_with_collector(Some(node), || {
            let mut run = run_cell.borrow_mut();
            run();
        });

        if let Some(Node::Effect(e)) = self.nodes.borrow().get(node) {
            e.running.set(false);
        }
    }

    /// Pauses a single effect (as opposed to [`Runtime::pause_scope`], which pauses every effect
    /// owned by a scope). A paused effect's scheduled runs are suppressed; any invalidation that
    /// arrives while paused is coalesced and replayed once on [`Runtime::resume_effect`].
    pub(crate) fn pause_effect(&self, node: NodeId) {
        if let Some(Node::Effect(e)) = self.nodes.borrow().get(node) {
            e.paused.set(true);
        }
    }

    pub(crate) fn resume_effect(&self, node: NodeId) {
        let should_run = if let Some(Node::Effect(e)) = self.nodes.borrow().get(node) {
            e.paused.set(false);
            e.pending_while_paused.replace(false)
        } else {
            false
        };
        if should_run {
            self.schedule_node(node);
        }
    }

    pub(crate) fn push_effect_cleanup(&self, node: NodeId, cleanup: Box<dyn FnOnce()>) {
        if let Some(Node::Effect(e)) = self.nodes.borrow().get(node) {
            e.cleanups.borrow_mut().push(cleanup);
        }
    }

    // ---- scheduling / flush -----------------------------------------------------------------

    pub(crate) fn set_schedule_flush_hook(&self, hook: Option<Rc<dyn Fn()>>) {
        self.scheduler.set_schedule_flush_hook(hook);
    }

    /// Drains the `pre` and `post` queues (plus any sync-phase effects deferred by
    /// self-reentrancy) to quiescence, running each batch's effects in insertion order. Returns
    /// once nothing further is enqueued. Does not resolve `nextTick()` waiters — callers that
    /// want that do so explicitly (see [`Runtime::flush_sync`]).
    pub(crate) fn flush_pre_post(&self) {
        loop {
            let mut progressed = false;
            while let Some(batch) = self.scheduler.take_pre_batch() {
                for node in batch {
                    self.run_effect(node);
                }
                progressed = true;
            }
            while let Some(batch) = self.scheduler.take_sync_deferred_batch() {
                for node in batch {
                    self.run_effect(node);
                }
                progressed = true;
            }
            while let Some(batch) = self.scheduler.take_post_batch() {
                for node in batch {
                    self.run_effect(node);
                }
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
    }

    /// Drains every queue to quiescence and resolves outstanding `nextTick()` waiters. Used by
    /// tests and the SSR path to settle pending work (including resolved async-init
    /// continuations) before inspecting or serializing the tree.
    pub fn flush_sync(&self) {
        self.flush_pre_post();
        self.scheduler.settle();
    }

    pub(crate) fn push_next_tick_waiter(&self, f: Box<dyn FnOnce()>) {
        self.scheduler.push_next_tick_waiter(f);
    }

    pub(crate) fn is_quiescent(&self) -> bool {
        self.scheduler.is_quiescent()
    }

    /// Runs `f` with the pre/post queues' host-facing flush notification suppressed, then drains
    /// once if this was the outermost nested `batch()` call (§10.5 `batch(fn)`). Sync-phase
    /// writes made inside `f` still run immediately at their write site, unaffected.
    pub(crate) fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.scheduler.enter_batch();
        let result = f();
        if self.scheduler.exit_batch() {
            self.flush_pre_post();
        }
        result
    }
}

thread_local! {
    static RUNTIME: Runtime = Runtime::new();
}

/// Runs `f` with a shared reference to the process-wide runtime.
pub fn with_runtime<R>(f: impl FnOnce(&Runtime) -> R) -> R {
    RUNTIME.with(|rt| f(rt))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::reactive::effect::{effect, flush_sync};
    use crate::reactive::scope::scope;
    use crate::reactive::signal::signal;

    use super::with_runtime;

    #[test]
    fn disposing_a_scope_drops_its_effect_subscriber_links() {
        let runs = Rc::new(Cell::new(0));
        let runs_in_effect = Rc::clone(&runs);
        let (child_scope, sig) = scope(|| {
            let s = signal(0);
            effect(move || {
                s.read(|_| {});
                runs_in_effect.set(runs_in_effect.get() + 1);
            });
            s
        });
        assert_eq!(runs.get(), 1);

        // The signal's subscriber set is non-empty while the effect is alive.
        with_runtime(|rt| {
            assert!(rt.subscribers.borrow().get(sig.node).is_some_and(|s| !s.is_empty()));
        });

        child_scope.dispose();

        // Disposal tears the link down: the signal no longer lists the disposed effect as a
        // subscriber.
        with_runtime(|rt| {
            assert!(rt
                .subscribers
                .borrow()
                .get(sig.node)
                .map(|s| s.is_empty())
                .unwrap_or(true));
        });

        // A write after disposal must not resurrect the dead effect.
        sig.write(1);
        flush_sync();
        assert_eq!(runs.get(), 1, "a disposed effect never reruns, even if its signal changes");
    }
}
