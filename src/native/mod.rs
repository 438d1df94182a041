//! Seam to the native widget toolkit.
//!
//! The reconciler never constructs or inspects concrete toolkit widgets. It
//! talks to them through [`NativeWidget`], a handle modelled on GObject-style
//! toolkits: property setters, a `connect`/`disconnect` signal table and the
//! container primitives used by the child-order controller and the grid.
//! [`NativeToolkit`] is the widget factory elements create their handle from.

use std::fmt;
use std::rc::Rc;

use slotmap::new_key_type;

use crate::layout::GridCell;
use crate::props::Value;

new_key_type! {
    /// Handle returned by [`NativeWidget::connect`].
    pub struct ConnectionId;
}

/// Shared handle to a native widget.
pub type WidgetHandle = Rc<dyn NativeWidget>;

/// Native signal callback. Returning `true` stops further propagation of the
/// signal in the native layer.
pub type SignalCallback = Rc<dyn Fn(&SignalEmission) -> bool>;

// ---------------------------------------------------------------------------
// NativeError
// ---------------------------------------------------------------------------

/// Failures of native primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NativeError {
    /// The widget does not implement the requested primitive.
    #[error("native widget does not support `{operation}`")]
    Unsupported { operation: &'static str },
    /// The widget passed in is not a child of this container.
    #[error("widget is not a child of this container")]
    NotAChild,
    /// The connection id is not (or no longer) registered.
    #[error("unknown signal connection")]
    UnknownConnection,
    /// The widget was already destroyed.
    #[error("native widget was already destroyed")]
    Destroyed,
}

// ---------------------------------------------------------------------------
// WidgetClass
// ---------------------------------------------------------------------------

/// Native widget classes the built-in elements ask the toolkit for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetClass {
    Button,
    EventBox,
    Grid,
    Box,
    Popover,
}

// ---------------------------------------------------------------------------
// SignalEmission
// ---------------------------------------------------------------------------

/// One native signal emission as seen by a connected callback.
#[derive(Clone)]
pub struct SignalEmission {
    /// The widget that emitted the signal.
    pub target: WidgetHandle,
    /// Native signal arguments, in toolkit order.
    pub args: Vec<Value>,
}

impl SignalEmission {
    /// Create an emission.
    pub fn new(target: WidgetHandle, args: Vec<Value>) -> Self {
        Self { target, args }
    }
}

impl fmt::Debug for SignalEmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalEmission")
            .field("target", &self.target.class())
            .field("args", &self.args)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// NativeWidget
// ---------------------------------------------------------------------------

/// A long-lived, stateful native widget.
///
/// Methods take `&self`: native handles are reference counted and mutated
/// through the toolkit. Container primitives default to
/// [`NativeError::Unsupported`] so leaf widgets only implement what they have.
pub trait NativeWidget {
    /// The class this widget was created as.
    fn class(&self) -> WidgetClass;

    /// Set a native property.
    fn set_property(&self, name: &str, value: Value) -> Result<(), NativeError>;

    /// Reset a native property to its unset (null) state.
    fn clear_property(&self, name: &str) -> Result<(), NativeError>;

    /// Read a native property.
    fn property(&self, name: &str) -> Option<Value>;

    /// Connect a callback to a native signal.
    fn connect(&self, signal: &str, callback: SignalCallback) -> ConnectionId;

    /// Disconnect a previously connected callback.
    fn disconnect(&self, id: ConnectionId) -> Result<(), NativeError>;

    /// Append a child widget.
    fn add(&self, _child: &WidgetHandle) -> Result<(), NativeError> {
        Err(NativeError::Unsupported { operation: "add" })
    }

    /// Detach a child widget.
    fn remove(&self, _child: &WidgetHandle) -> Result<(), NativeError> {
        Err(NativeError::Unsupported { operation: "remove" })
    }

    /// Move an attached child to `position` in the native child order.
    fn reorder(&self, _child: &WidgetHandle, _position: usize) -> Result<(), NativeError> {
        Err(NativeError::Unsupported { operation: "reorder" })
    }

    /// Attach a child at a grid rectangle.
    fn attach(&self, _child: &WidgetHandle, _cell: GridCell) -> Result<(), NativeError> {
        Err(NativeError::Unsupported { operation: "attach" })
    }

    /// Remove a grid column, detaching the children placed in it.
    fn remove_column(&self, _column: usize) -> Result<(), NativeError> {
        Err(NativeError::Unsupported {
            operation: "remove_column",
        })
    }

    /// Schedule a show/redraw pass over this widget and its descendants.
    fn show_all(&self);

    /// Destroy the native widget.
    fn destroy(&self);
}

/// Widget factory.
pub trait NativeToolkit {
    /// Create a fresh widget of the given class.
    fn create_widget(&self, class: WidgetClass) -> WidgetHandle;
}

/// Identity comparison of two widget handles.
pub fn same_widget(a: &WidgetHandle, b: &WidgetHandle) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}
