//! Effects — re-runnable units of work attached to a scope (§3 "Effect", §4.3).
//!
//! Grounded on `packages/core/src/scope.rs::push_effect` (type-erased effect storage attached to
//! a scope) and `other_examples/.../leptos_reactive-src-runtime.rs.rs`'s `pending_effects` queue
//! plus its cleanup-stack convention for `onCleanup`.

use std::marker::PhantomData;

use crate::reactive::runtime::{with_runtime, NodeId};
use crate::reactive::scheduler::EffectPhase;
use crate::reactive::scope::current_scope_id;

/// Configures which scheduler phase an effect's re-runs drain in (§4.4).
#[derive(Clone, Copy)]
pub struct EffectOptions {
    pub phase: EffectPhase,
}

impl Default for EffectOptions {
    fn default() -> Self {
        EffectOptions {
            phase: EffectPhase::Pre,
        }
    }
}

/// A handle to a created effect. Dropping the handle does *not* dispose the effect — disposal
/// happens when the owning scope disposes, or explicitly via [`EffectHandle::dispose`] — this
/// mirrors `packages/core/src/scope.rs`, where an effect's lifetime is scope-bound, not
/// handle-bound.
pub struct EffectHandle {
    node: NodeId,
    _not_send: PhantomData<*const ()>,
}

impl EffectHandle {
    pub fn pause(&self) {
        with_runtime(|rt| rt.pause_effect(self.node));
    }

    pub fn resume(&self) {
        with_runtime(|rt| rt.resume_effect(self.node));
    }

    pub fn dispose(&self) {
        with_runtime(|rt| rt.dispose_effect(self.node));
    }
}

/// Creates and eagerly runs an effect in the `Pre` phase, attached to the currently-active scope
/// (§6 public API `effect(fn)`).
///
/// # Panics
/// Panics if called with no scope active — effects must be created inside [`super::scope::scope`]
/// or a component's build/hook context.
pub fn effect(f: impl FnMut() + 'static) -> EffectHandle {
    effect_with(EffectOptions::default(), f)
}

/// As [`effect`] but with explicit [`EffectOptions`].
pub fn effect_with(options: EffectOptions, f: impl FnMut() + 'static) -> EffectHandle {
    let scope = current_scope_id().expect("effect() called with no scope active");
    let node = with_runtime(|rt| rt.create_effect_node(scope, options.phase, Box::new(f)));
    with_runtime(|rt| rt.run_effect(node));
    EffectHandle {
        node,
        _not_send: PhantomData,
    }
}

/// Registers a cleanup to run at the start of the current effect's *next* run, or when it (or
/// its scope) is disposed — whichever comes first (§3 "Effect", §4.3). Called outside any running
/// effect/memo, it registers against the currently-active scope instead, running once on that
/// scope's disposal (§10.5 "`on_cleanup` outside of an effect"). A no-op if neither an effect nor
/// a scope is active.
pub fn on_cleanup(f: impl FnOnce() + 'static) {
    with_runtime(|rt| {
        if let Some(node) = rt.current_running_node() {
            rt.push_effect_cleanup(node, Box::new(f));
        } else if let Some(scope) = current_scope_id() {
            rt.push_cleanup(scope, Box::new(f));
        }
    });
}

/// Drains every scheduler queue to quiescence, synchronously (§4.4 `flushSync()`).
pub fn flush_sync() {
    with_runtime(|rt| rt.flush_sync());
}

/// Holds the scheduler's pre/post queues un-drained for the duration of `f`, then performs a
/// single drain (§10.5 `batch(fn)`). Writes inside `f` still coalesce per their usual dependency
/// precision rules; this only removes the implicit per-write flush notification, guaranteeing
/// at most one re-run per affected effect across the whole batch rather than per write.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    with_runtime(|rt| rt.batch(f))
}

/// A future that resolves after the scheduler next reaches quiescence (§6 public API
/// `nextTick()`). If the scheduler is already quiescent at call time, resolves immediately.
pub fn next_tick() -> impl std::future::Future<Output = ()> {
    let (tx, rx) = futures_channel::oneshot::channel();
    with_runtime(|rt| {
        if rt.is_quiescent() {
            let _ = tx.send(());
        } else {
            rt.push_next_tick_waiter(Box::new(move || {
                let _ = tx.send(());
            }));
        }
    });
    async move {
        let _ = rx.await;
    }
}
