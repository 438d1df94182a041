//! Error types surfaced to the tree-diffing driver and to user callbacks.
//!
//! Structural and lifecycle errors are programming errors in the declared
//! tree and are returned to the caller. Property and callback failures are
//! recovered where they happen and routed to
//! [`Diagnostics`](crate::diagnostics::Diagnostics) instead.

use crate::element::ElementKind;
use crate::native::NativeError;

// ---------------------------------------------------------------------------
// ReconcileError
// ---------------------------------------------------------------------------

/// Errors returned by element, lifecycle and child-order operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// A lifecycle method was called after the element was destroyed.
    #[error("`{operation}` called on an element whose lifecycle already ended")]
    Destroyed { operation: &'static str },
    /// `emit_after_create` was called more than once.
    #[error("the after-create lifecycle event was already emitted")]
    AlreadyCreated,
    /// `insert_before` referenced a child that is not in the container.
    #[error("the reference child was not found in the container")]
    ChildNotFound,
    /// A container restricted to one child of a kind received a second one.
    #[error("{container} can only have one {child} child")]
    DuplicateChild {
        container: ElementKind,
        child: ElementKind,
    },
    /// A container received a child kind it cannot hold.
    #[error("{container} cannot contain a {child} element")]
    UnsupportedChild {
        container: ElementKind,
        child: ElementKind,
    },
    /// An element was constructed without a property it cannot work without.
    #[error("{kind} requires the `{property}` property")]
    MissingProperty {
        kind: ElementKind,
        property: &'static str,
    },
    /// A native primitive failed.
    #[error(transparent)]
    Native(#[from] NativeError),
}

// ---------------------------------------------------------------------------
// CallbackError
// ---------------------------------------------------------------------------

/// Failure raised by an apply, cleanup, subscriber or event handler callback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    /// Create a callback error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<NativeError> for CallbackError {
    fn from(err: NativeError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<ReconcileError> for CallbackError {
    fn from(err: ReconcileError) -> Self {
        Self::new(err.to_string())
    }
}
