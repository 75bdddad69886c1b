//! Reactive object/array/map/set wrappers (§3 "Reactive object", §4.5 "Reactive proxies (C5)").
//!
//! Rust has no `Proxy` trap mechanism, so per the §9 design note this follows the "explicit
//! `get(path)`/`set(path, v)`" alternative rather than attempting to fake transparent property
//! interception. Containers are modelled as a small dynamic value tree (`RawValue`) whose
//! `Object`/`Array`/`MapCollection`/`SetCollection` variants are themselves reference types
//! (`Rc<RefCell<..>>`), mirroring JS's object/array reference semantics directly; scalars are
//! plain values. A `Reactive*` wrapper is a cheap handle over one of those containers that routes
//! every read/write through per-property "topic" signals obtained from
//! [`crate::reactive::runtime::Runtime::create_topic_node`] — the same dependency-tracking
//! primitive the rest of `reactive::*` is built on, grounded on `packages/signals/src/signal.rs`'s
//! use of a keyed cache for signal-wrapper identity.
//!
//! §8.2 ("proxy identity") is satisfied without a wrapper-identity cache: `ReactiveObject` etc.
//! are plain `Rc`-holding structs whose `PartialEq` compares the underlying target pointer, so
//! `reactive_object(x) == reactive_object(x)` holds for any two wrappers built from clones of the
//! same `Rc`. The spec's "cached in a weakly-keyed map" is one way to get there; comparing by
//! pointer is another, and avoids needing a weak-keyed map type this crate's stack doesn't carry.

use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use fxhash::FxHashMap;
use indexmap::{IndexMap, IndexSet};

use crate::error::{CoreResult, ReactivityError};
use crate::reactive::runtime::{with_runtime, NodeId};

pub type ObjectTarget = Rc<RefCell<IndexMap<Rc<str>, RawValue>>>;
pub type ArrayTarget = Rc<RefCell<Vec<RawValue>>>;
pub type MapTarget = Rc<RefCell<IndexMap<ScalarKey, RawValue>>>;
pub type SetTarget = Rc<RefCell<IndexSet<ScalarKey>>>;

/// The dynamic value tree backing reactive containers. Container variants are reference types
/// (cloning a `RawValue::Object` clones the `Rc`, not the map); scalars are by-value, matching
/// JS's primitive-vs-object distinction.
#[derive(Clone)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(Rc<str>),
    Object(ObjectTarget),
    Array(ArrayTarget),
    MapCollection(MapTarget),
    SetCollection(SetTarget),
}

impl RawValue {
    /// `Object.is` semantics: distinguishes `-0.0`/`+0.0`, treats `NaN` as equal to itself,
    /// compares containers by reference rather than structurally.
    pub fn object_is(a: &RawValue, b: &RawValue) -> bool {
        use RawValue::*;
        match (a, b) {
            (Null, Null) => true,
            (Bool(x), Bool(y)) => x == y,
            (Number(x), Number(y)) => {
                if x.is_nan() && y.is_nan() {
                    true
                } else {
                    x.to_bits() == y.to_bits()
                }
            }
            (Text(x), Text(y)) => x == y,
            (Object(x), Object(y)) => Rc::ptr_eq(x, y),
            (Array(x), Array(y)) => Rc::ptr_eq(x, y),
            (MapCollection(x), MapCollection(y)) => Rc::ptr_eq(x, y),
            (SetCollection(x), SetCollection(y)) => Rc::ptr_eq(x, y),
            _ => false,
        }
    }

    fn container_id(&self) -> Option<usize> {
        use RawValue::*;
        Some(match self {
            Object(r) => Rc::as_ptr(r) as *const () as usize,
            Array(r) => Rc::as_ptr(r) as *const () as usize,
            MapCollection(r) => Rc::as_ptr(r) as *const () as usize,
            SetCollection(r) => Rc::as_ptr(r) as *const () as usize,
            _ => return None,
        })
    }
}

/// A hashable scalar usable as a `Map`/`Set` key (real JS `Map`s key on anything, but a hashed
/// collection needs `Hash + Eq`; this covers the common case and is a deliberate narrowing of
/// the source semantics — see `DESIGN.md`).
#[derive(Clone)]
pub enum ScalarKey {
    Null,
    Bool(bool),
    Number(u64),
    Text(Rc<str>),
}

impl ScalarKey {
    pub fn number(n: f64) -> Self {
        ScalarKey::Number(n.to_bits())
    }
}

impl PartialEq for ScalarKey {
    fn eq(&self, other: &Self) -> bool {
        use ScalarKey::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Number(a), Number(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for ScalarKey {}
impl Hash for ScalarKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ScalarKey::Null => 0u8.hash(state),
            ScalarKey::Bool(b) => {
                1u8.hash(state);
                b.hash(state)
            }
            ScalarKey::Number(bits) => {
                2u8.hash(state);
                bits.hash(state)
            }
            ScalarKey::Text(s) => {
                3u8.hash(state);
                s.hash(state)
            }
        }
    }
}

/// A property key within a target: a named object property, an array index, the bound `length`
/// signal, or the "all properties" sentinel used for structural (iteration/has) dependents.
#[derive(Clone, PartialEq, Eq, Hash)]
enum PropKey {
    Name(Rc<str>),
    Index(usize),
    Length,
    AllProperties,
}

thread_local! {
    static PROPERTY_SIGNALS: RefCell<FxHashMap<(usize, PropKey), NodeId>> = RefCell::new(FxHashMap::default());
    static MARKED_RAW: RefCell<std::collections::HashSet<usize>> = RefCell::new(std::collections::HashSet::new());
}

fn property_signal(target_id: usize, key: PropKey) -> NodeId {
    PROPERTY_SIGNALS.with(|signals| {
        *signals
            .borrow_mut()
            .entry((target_id, key))
            .or_insert_with(|| with_runtime(|rt| rt.create_topic_node()))
    })
}

fn track(target_id: usize, key: PropKey) {
    let node = property_signal(target_id, key);
    with_runtime(|rt| rt.topic_track(node));
}

fn emit(target_id: usize, key: PropKey) {
    let node = property_signal(target_id, key);
    with_runtime(|rt| rt.topic_emit(node));
}

/// Marks a container so `wrap_value` never wraps it in a reactive handle, per §4.5 "a
/// marked-raw object... is returned as-is and never wrapped".
pub fn mark_raw(value: &RawValue) {
    if let Some(id) = value.container_id() {
        MARKED_RAW.with(|m| {
            m.borrow_mut().insert(id);
        });
    }
}

fn is_marked_raw(value: &RawValue) -> bool {
    value
        .container_id()
        .map(|id| MARKED_RAW.with(|m| m.borrow().contains(&id)))
        .unwrap_or(false)
}

/// What reading a property returns: a scalar as-is, a wrapped reactive handle for a nested
/// container when `deep` tracking is configured and the container isn't marked raw, or the bare
/// container handle otherwise (§4.5 invariant (b)).
#[derive(Clone)]
pub enum ReactiveValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(Rc<str>),
    Object(ReactiveObject),
    Array(ReactiveArray),
    MapCollection(ReactiveMap),
    SetCollection(ReactiveSet),
    RawObject(ObjectTarget),
    RawArray(ArrayTarget),
    RawMap(MapTarget),
    RawSet(SetTarget),
}

fn wrap_value(value: RawValue, deep: bool, readonly: bool) -> ReactiveValue {
    use RawValue::*;
    let raw = !deep || is_marked_raw(&value);
    match value {
        Null => ReactiveValue::Null,
        Bool(b) => ReactiveValue::Bool(b),
        Number(n) => ReactiveValue::Number(n),
        Text(t) => ReactiveValue::Text(t),
        Object(t) if raw => ReactiveValue::RawObject(t),
        Object(t) => ReactiveValue::Object(ReactiveObject {
            target: t,
            deep,
            readonly,
        }),
        Array(t) if raw => ReactiveValue::RawArray(t),
        Array(t) => ReactiveValue::Array(ReactiveArray {
            target: t,
            deep,
            readonly,
        }),
        MapCollection(t) if raw => ReactiveValue::RawMap(t),
        MapCollection(t) => ReactiveValue::MapCollection(ReactiveMap {
            target: t,
            readonly,
        }),
        SetCollection(t) if raw => ReactiveValue::RawSet(t),
        SetCollection(t) => ReactiveValue::SetCollection(ReactiveSet {
            target: t,
            readonly,
        }),
    }
}

/// Polymorphic entry point dispatching on the target's runtime kind (§6 `reactive(target,
/// {deep?})`). Scalars pass through unwrapped — there is nothing to make reactive about a bare
/// number or string.
pub fn reactive(target: RawValue, deep: bool) -> ReactiveValue {
    wrap_value(target, deep, false)
}

/// Wraps an already-reactive value (or a freshly `reactive()`-made one) so every write raises
/// `ReactivityError::ReadOnlyWrite` before reaching the target; reads keep tracking exactly as
/// the inner wrapper does (§10.5 "Readonly wrapper composition"). Scalars and already-raw values
/// pass through unchanged — there is nothing to make read-only about them.
pub fn readonly(target: ReactiveValue) -> ReactiveValue {
    match target {
        ReactiveValue::Object(o) => ReactiveValue::Object(ReactiveObject {
            readonly: true,
            ..o
        }),
        ReactiveValue::Array(a) => ReactiveValue::Array(ReactiveArray {
            readonly: true,
            ..a
        }),
        ReactiveValue::MapCollection(m) => ReactiveValue::MapCollection(ReactiveMap {
            readonly: true,
            ..m
        }),
        ReactiveValue::SetCollection(s) => ReactiveValue::SetCollection(ReactiveSet {
            readonly: true,
            ..s
        }),
        other => other,
    }
}

/// Unwraps any reactive/readonly/raw handle back to its underlying [`RawValue`] (§6 `raw(target)`,
/// §8.2 "`raw(reactive(x)) === x`").
pub fn raw(target: &ReactiveValue) -> RawValue {
    match target {
        ReactiveValue::Null => RawValue::Null,
        ReactiveValue::Bool(b) => RawValue::Bool(*b),
        ReactiveValue::Number(n) => RawValue::Number(*n),
        ReactiveValue::Text(t) => RawValue::Text(t.clone()),
        ReactiveValue::Object(o) => RawValue::Object(o.raw()),
        ReactiveValue::Array(a) => RawValue::Array(a.raw()),
        ReactiveValue::MapCollection(m) => RawValue::MapCollection(m.raw()),
        ReactiveValue::SetCollection(s) => RawValue::SetCollection(s.raw()),
        ReactiveValue::RawObject(t) => RawValue::Object(t.clone()),
        ReactiveValue::RawArray(t) => RawValue::Array(t.clone()),
        ReactiveValue::RawMap(t) => RawValue::MapCollection(t.clone()),
        ReactiveValue::RawSet(t) => RawValue::SetCollection(t.clone()),
    }
}

// ---- Object -----------------------------------------------------------------------------------

/// A reactive wrapper over a plain keyed object (§3 "Reactive object").
#[derive(Clone)]
pub struct ReactiveObject {
    target: ObjectTarget,
    deep: bool,
    readonly: bool,
}

impl PartialEq for ReactiveObject {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.target, &other.target)
    }
}

impl ReactiveObject {
    fn id(&self) -> usize {
        Rc::as_ptr(&self.target) as *const () as usize
    }

    /// Own-property read: creates the property signal on first access, tracks it, and wraps a
    /// nested container per `deep`.
    pub fn get(&self, key: &str) -> Option<ReactiveValue> {
        track(self.id(), PropKey::Name(key.into()));
        self.target.borrow().get(key).cloned().map(|v| wrap_value(v, self.deep, self.readonly))
    }

    /// Non-own read: "is this key present" tracked the same way a `has` trap would (§4.5).
    pub fn has(&self, key: &str) -> bool {
        track(self.id(), PropKey::Name(key.into()));
        self.target.borrow().contains_key(key)
    }

    /// Structural op: a new key's insertion emits the "all properties" sentinel (for
    /// iteration/`has` dependents) in addition to the key's own property signal; overwriting an
    /// existing key only emits that key's signal. A no-op write (`Object.is` equal) emits
    /// nothing, per §4.5 "Writes compare with `Object.is`; no-op writes do not emit."
    pub fn set(&self, key: &str, value: RawValue) -> CoreResult<()> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        let existed;
        let differs;
        {
            let map = self.target.borrow();
            existed = map.contains_key(key);
            differs = match map.get(key) {
                Some(old) => !RawValue::object_is(old, &value),
                None => true,
            };
        }
        if !differs {
            return Ok(());
        }
        self.target.borrow_mut().insert(Rc::from(key), value);
        emit(id, PropKey::Name(key.into()));
        if !existed {
            emit(id, PropKey::AllProperties);
        }
        Ok(())
    }

    pub fn delete(&self, key: &str) -> CoreResult<()> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        let removed = self.target.borrow_mut().shift_remove(key).is_some();
        if removed {
            emit(id, PropKey::Name(key.into()));
            emit(id, PropKey::AllProperties);
        }
        Ok(())
    }

    /// Enumerates only keys present in the target (§9 open question (ii)); tracks the
    /// "all properties" sentinel.
    pub fn keys(&self) -> Vec<Rc<str>> {
        track(self.id(), PropKey::AllProperties);
        self.target.borrow().keys().cloned().collect()
    }

    pub fn raw(&self) -> ObjectTarget {
        self.target.clone()
    }
}

pub fn reactive_object(target: ObjectTarget) -> ReactiveObject {
    ReactiveObject {
        target,
        deep: true,
        readonly: false,
    }
}

pub fn reactive_object_shallow(target: ObjectTarget) -> ReactiveObject {
    ReactiveObject {
        target,
        deep: false,
        readonly: false,
    }
}

pub fn readonly_object(target: ObjectTarget) -> ReactiveObject {
    ReactiveObject {
        target,
        deep: true,
        readonly: true,
    }
}

// ---- Array ------------------------------------------------------------------------------------

/// A reactive wrapper over an array, with a bound `length` signal in addition to per-index
/// property signals (§4.5).
#[derive(Clone)]
pub struct ReactiveArray {
    target: ArrayTarget,
    deep: bool,
    readonly: bool,
}

impl PartialEq for ReactiveArray {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.target, &other.target)
    }
}

impl ReactiveArray {
    fn id(&self) -> usize {
        Rc::as_ptr(&self.target) as *const () as usize
    }

    pub fn get(&self, index: usize) -> Option<ReactiveValue> {
        track(self.id(), PropKey::Index(index));
        self.target.borrow().get(index).cloned().map(|v| wrap_value(v, self.deep, self.readonly))
    }

    pub fn set(&self, index: usize, value: RawValue) -> CoreResult<()> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        let grows = index >= self.target.borrow().len();
        let differs = match self.target.borrow().get(index) {
            Some(old) => !RawValue::object_is(old, &value),
            None => true,
        };
        if !differs {
            return Ok(());
        }
        {
            let mut t = self.target.borrow_mut();
            if grows {
                t.resize(index + 1, RawValue::Null);
            }
            t[index] = value;
        }
        emit(id, PropKey::Index(index));
        if grows {
            emit(id, PropKey::Length);
            emit(id, PropKey::AllProperties);
        }
        Ok(())
    }

    pub fn push(&self, value: RawValue) -> CoreResult<()> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        self.target.borrow_mut().push(value);
        emit(id, PropKey::Length);
        emit(id, PropKey::AllProperties);
        Ok(())
    }

    pub fn delete(&self, index: usize) -> CoreResult<()> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        let mut t = self.target.borrow_mut();
        if let Some(slot) = t.get_mut(index) {
            *slot = RawValue::Null;
            drop(t);
            emit(id, PropKey::Index(index));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        track(self.id(), PropKey::Length);
        self.target.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assigning `length` must invalidate property signals for indices that become
    /// out-of-bounds (§4.5).
    pub fn set_len(&self, new_len: usize) -> CoreResult<()> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        let old_len = self.target.borrow().len();
        if new_len == old_len {
            return Ok(());
        }
        self.target.borrow_mut().resize(new_len, RawValue::Null);
        if new_len < old_len {
            for i in new_len..old_len {
                emit(id, PropKey::Index(i));
            }
        }
        emit(id, PropKey::Length);
        emit(id, PropKey::AllProperties);
        Ok(())
    }

    pub fn raw(&self) -> ArrayTarget {
        self.target.clone()
    }
}

pub fn reactive_array(target: ArrayTarget) -> ReactiveArray {
    ReactiveArray {
        target,
        deep: true,
        readonly: false,
    }
}

pub fn reactive_array_shallow(target: ArrayTarget) -> ReactiveArray {
    ReactiveArray {
        target,
        deep: false,
        readonly: false,
    }
}

// ---- Map / Set ----------------------------------------------------------------------------------

/// Shallow-only wrapper over a `Map`-like collection (§4.5: "For `Map`/`Set`/`WeakMap`/`WeakSet`:
/// shallow only"). All read ops (`get`/`has`/iteration/`size`) track, and all write ops
/// (`set`/`delete`/`clear`) emit, a single topic shared by the whole target — there is no
/// per-key tracking, matching the spec's explicit narrowing for these collection kinds.
/// `WeakMap` is not modelled separately: without the host's garbage collector there is nothing
/// for the "weak" half to do, so a `WeakMap` target simply uses this same wrapper.
#[derive(Clone)]
pub struct ReactiveMap {
    target: MapTarget,
    readonly: bool,
}

impl PartialEq for ReactiveMap {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.target, &other.target)
    }
}

impl ReactiveMap {
    fn id(&self) -> usize {
        Rc::as_ptr(&self.target) as *const () as usize
    }

    pub fn get(&self, key: &ScalarKey) -> Option<RawValue> {
        track(self.id(), PropKey::AllProperties);
        self.target.borrow().get(key).cloned()
    }

    pub fn has(&self, key: &ScalarKey) -> bool {
        track(self.id(), PropKey::AllProperties);
        self.target.borrow().contains_key(key)
    }

    pub fn size(&self) -> usize {
        track(self.id(), PropKey::AllProperties);
        self.target.borrow().len()
    }

    pub fn keys(&self) -> Vec<ScalarKey> {
        track(self.id(), PropKey::AllProperties);
        self.target.borrow().keys().cloned().collect()
    }

    pub fn set(&self, key: ScalarKey, value: RawValue) -> CoreResult<()> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        self.target.borrow_mut().insert(key, value);
        emit(id, PropKey::AllProperties);
        Ok(())
    }

    pub fn delete(&self, key: &ScalarKey) -> CoreResult<bool> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        let removed = self.target.borrow_mut().shift_remove(key).is_some();
        if removed {
            emit(id, PropKey::AllProperties);
        }
        Ok(removed)
    }

    pub fn clear(&self) -> CoreResult<()> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        let was_empty = self.target.borrow().is_empty();
        self.target.borrow_mut().clear();
        if !was_empty {
            emit(id, PropKey::AllProperties);
        }
        Ok(())
    }

    pub fn raw(&self) -> MapTarget {
        self.target.clone()
    }
}

pub fn reactive_map(target: MapTarget) -> ReactiveMap {
    ReactiveMap {
        target,
        readonly: false,
    }
}

/// Shallow wrapper over a `Set`-like collection; see [`ReactiveMap`] for the tracking model.
#[derive(Clone)]
pub struct ReactiveSet {
    target: SetTarget,
    readonly: bool,
}

impl PartialEq for ReactiveSet {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.target, &other.target)
    }
}

impl ReactiveSet {
    fn id(&self) -> usize {
        Rc::as_ptr(&self.target) as *const () as usize
    }

    pub fn has(&self, key: &ScalarKey) -> bool {
        track(self.id(), PropKey::AllProperties);
        self.target.borrow().contains(key)
    }

    pub fn size(&self) -> usize {
        track(self.id(), PropKey::AllProperties);
        self.target.borrow().len()
    }

    pub fn values(&self) -> Vec<ScalarKey> {
        track(self.id(), PropKey::AllProperties);
        self.target.borrow().iter().cloned().collect()
    }

    pub fn add(&self, key: ScalarKey) -> CoreResult<()> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        let inserted = self.target.borrow_mut().insert(key);
        if inserted {
            emit(id, PropKey::AllProperties);
        }
        Ok(())
    }

    pub fn delete(&self, key: &ScalarKey) -> CoreResult<bool> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        let removed = self.target.borrow_mut().shift_remove(key);
        if removed {
            emit(id, PropKey::AllProperties);
        }
        Ok(removed)
    }

    pub fn clear(&self) -> CoreResult<()> {
        if self.readonly {
            return Err(ReactivityError::ReadOnlyWrite.into());
        }
        let id = self.id();
        let was_empty = self.target.borrow().is_empty();
        self.target.borrow_mut().clear();
        if !was_empty {
            emit(id, PropKey::AllProperties);
        }
        Ok(())
    }

    pub fn raw(&self) -> SetTarget {
        self.target.clone()
    }
}

pub fn reactive_set(target: SetTarget) -> ReactiveSet {
    ReactiveSet {
        target,
        readonly: false,
    }
}
