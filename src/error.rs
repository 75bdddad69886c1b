//! The single error taxonomy the core returns from its fallible public entry points.
//!
//! `UserError` and `AsyncRejection` are caught by the component runtime and routed through
//! [`crate::component::report_error`] rather than propagated to callers; `ShapeError`,
//! `StateError` and `ReactivityError` are programmer errors and are allowed to propagate.

use std::fmt;

use crate::component::ComponentStateName;

/// The crate-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// An error thrown by user-supplied build/hook/getter/callback code.
    #[error("error in user code ({source_tag}): {message}")]
    UserError {
        source_tag: &'static str,
        message: String,
    },

    /// An invalid vnode shape detected at construction time.
    #[error("invalid vnode shape: {0}")]
    ShapeError(#[from] ShapeError),

    /// A driver operation was invoked while a component instance was in a disallowed state.
    #[error("invalid state transition: {from} -> {to} for {kind}")]
    StateError {
        from: ComponentStateName,
        to: ComponentStateName,
        kind: &'static str,
    },

    /// A reactivity-system invariant was violated by the caller.
    #[error("reactivity error: {0}")]
    ReactivityError(#[from] ReactivityError),

    /// An async `init` hook or async callback rejected.
    #[error("async rejection in {source_tag}: {message}")]
    AsyncRejection {
        source_tag: &'static str,
        message: String,
    },
}

/// Sub-taxonomy for vnode construction problems (§7 `ShapeError`).
#[derive(thiserror::Error, Debug)]
pub enum ShapeError {
    #[error("vnode type must be a tag name or component function, got {0}")]
    InvalidType(String),

    #[error("duplicate key {key:?} among siblings")]
    DuplicateKey { key: String },

    #[error("reserved prop {0:?} cannot be used outside its special handling")]
    ReservedPropMisuse(&'static str),
}

/// Sub-taxonomy for reactive-graph misuse (§7 `ReactivityError`).
#[derive(thiserror::Error, Debug)]
pub enum ReactivityError {
    #[error("attempted to write a read-only signal")]
    ReadOnlyWrite,

    #[error("effect re-entered itself {depth} times, exceeding the configured bound")]
    ReentrantDepthExceeded { depth: usize },
}

impl fmt::Display for ComponentStateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
