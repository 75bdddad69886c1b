//! The pre/sync/post phase scheduler (§4.4).
//!
//! Grounded on `packages/core/src/scheduler.rs`'s channel-backed `SchedulerMsg` pattern and its
//! `indexmap::IndexSet`-based dedup queue (there: `PriorityLane::dirty_scopes`), but restructured
//! away from that file's unfinished 4-tier priority-lane model into the 3-phase model this crate
//! specifies. Sync-phase effects never touch these queues: [`super::runtime::Runtime`] runs them
//! immediately at the write site and only reaches here for `Pre`/`Post`, plus the narrow
//! self-reentrancy case described below.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fxhash::FxHashMap;
use indexmap::IndexSet;

use super::runtime::NodeId;

/// Which drain class an effect belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectPhase {
    /// Drained before a dependent render would observe stale output; microtask-batched.
    Pre,
    /// Drained synchronously at the write site, interleaved with user code.
    Sync,
    /// Drained after the pre-phase/render settles; microtask-batched.
    Post,
}

impl Default for EffectPhase {
    fn default() -> Self {
        EffectPhase::Pre
    }
}

/// Holds the three phase queues plus the bookkeeping needed for re-entrancy diagnostics and
/// `nextTick()`. Does not itself know how to run an effect — [`super::runtime::Runtime`] owns
/// that, since running a node requires the node arena this type doesn't have access to.
pub(crate) struct Scheduler {
    pre: RefCell<IndexSet<NodeId>>,
    post: RefCell<IndexSet<NodeId>>,
    /// Sync-phase effects that re-entered themselves mid-run get deferred here rather than
    /// looping synchronously; drained alongside `pre` on the next flush.
    sync_deferred: RefCell<IndexSet<NodeId>>,
    reentrant_counts: RefCell<FxHashMap<NodeId, usize>>,
    /// Resolved once the queues reach quiescence; used to implement the public `nextTick()`.
    next_tick_waiters: RefCell<Vec<Box<dyn FnOnce()>>>,
    /// Installed by the host (`App`) so the core can ask to be flushed on the platform's actual
    /// microtask/timer facility instead of assuming one exists. `None` means nothing auto-flushes
    /// and callers must drive `flush_sync`/`flush_pre_post` themselves (as tests do).
    schedule_flush_hook: RefCell<Option<Rc<dyn Fn()>>>,
    flush_requested: Cell<bool>,
    /// Re-entrant nesting depth of `batch()` calls (§10.5). While positive, [`Scheduler::enqueue`]
    /// still dedups into the phase queues but does not ask the host to schedule a flush; the
    /// outermost `batch()` call drains once on exit instead.
    batch_depth: Cell<usize>,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Scheduler {
            pre: RefCell::new(IndexSet::default()),
            post: RefCell::new(IndexSet::default()),
            sync_deferred: RefCell::new(IndexSet::default()),
            reentrant_counts: RefCell::new(FxHashMap::default()),
            next_tick_waiters: RefCell::new(Vec::new()),
            schedule_flush_hook: RefCell::new(None),
            flush_requested: Cell::new(false),
            batch_depth: Cell::new(0),
        }
    }

    pub(crate) fn set_schedule_flush_hook(&self, hook: Option<Rc<dyn Fn()>>) {
        *self.schedule_flush_hook.borrow_mut() = hook;
    }

    /// Adds `node` to its phase queue (dedup'd by identity via `IndexSet`) and, on the first
    /// enqueue since the last flush, asks the host to schedule a microtask flush.
    pub(crate) fn enqueue(&self, node: NodeId, phase: EffectPhase) {
        let queue = match phase {
            EffectPhase::Pre => &self.pre,
            EffectPhase::Post => &self.post,
            EffectPhase::Sync => unreachable!("sync-phase effects run inline, not via enqueue"),
        };
        queue.borrow_mut().insert(node);
        self.request_flush();
    }

    pub(crate) fn requeue_for_next_drain(&self, node: NodeId) {
        self.sync_deferred.borrow_mut().insert(node);
        self.request_flush();
    }

    fn request_flush(&self) {
        if !self.flush_requested.replace(true) {
            if self.batch_depth.get() == 0 {
                if let Some(hook) = self.schedule_flush_hook.borrow().as_ref() {
                    hook();
                }
            }
        }
    }

    /// Enters a `batch()` call, suppressing [`Scheduler::request_flush`]'s host notification
    /// until the outermost call exits (§10.5 `batch(fn)`).
    pub(crate) fn enter_batch(&self) {
        self.batch_depth.set(self.batch_depth.get() + 1);
    }

    /// Exits a `batch()` call. Returns `true` if this was the outermost call (depth dropped to
    /// zero), meaning the caller should perform the single deferred drain.
    pub(crate) fn exit_batch(&self) -> bool {
        let depth = self.batch_depth.get() - 1;
        self.batch_depth.set(depth);
        depth == 0
    }

    /// Increments and returns the number of times `node` has re-entered itself during the
    /// current outstanding drain; reset whenever the queues reach quiescence.
    pub(crate) fn reentrant_depth(&self, node: NodeId) -> usize {
        let mut counts = self.reentrant_counts.borrow_mut();
        let entry = counts.entry(node).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Takes the entire current `pre` queue, leaving a fresh empty one for anything enqueued
    /// while the caller runs this batch. Returns `None` once empty.
    pub(crate) fn take_pre_batch(&self) -> Option<Vec<NodeId>> {
        Self::take_batch(&self.pre)
    }

    pub(crate) fn take_post_batch(&self) -> Option<Vec<NodeId>> {
        Self::take_batch(&self.post)
    }

    pub(crate) fn take_sync_deferred_batch(&self) -> Option<Vec<NodeId>> {
        Self::take_batch(&self.sync_deferred)
    }

    fn take_batch(queue: &RefCell<IndexSet<NodeId>>) -> Option<Vec<NodeId>> {
        let mut q = queue.borrow_mut();
        if q.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut *q).into_iter().collect())
        }
    }

    pub(crate) fn is_quiescent(&self) -> bool {
        self.pre.borrow().is_empty() && self.post.borrow().is_empty() && self.sync_deferred.borrow().is_empty()
    }

    /// Called once the scheduler has drained to quiescence: resets reentrancy counters, clears
    /// the flush-requested flag, and resolves every outstanding `nextTick()` waiter.
    pub(crate) fn settle(&self) {
        self.reentrant_counts.borrow_mut().clear();
        self.flush_requested.set(false);
        let waiters: Vec<_> = self.next_tick_waiters.borrow_mut().drain(..).collect();
        for waiter in waiters {
            waiter();
        }
    }

    pub(crate) fn push_next_tick_waiter(&self, f: Box<dyn FnOnce()>) {
        self.next_tick_waiters.borrow_mut().push(f);
    }
}
