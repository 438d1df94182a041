//! Element trait: the surface the tree-diffing driver talks to.
//!
//! An element owns one native widget for its whole life and keeps it in sync
//! with the props and children the driver hands it. Every method takes
//! `&self`; elements are shared as [`ElementRef`]s and mutate through interior
//! state, since parents, children and native callbacks all hold on to them.

use std::any::Any;
use std::rc::{Rc, Weak};

use crate::error::ReconcileError;
use crate::native::WidgetHandle;
use crate::props::{diff_props, DiffedProps, Props, PropsReader};

use super::base::ElementCore;
use super::kind::ElementKind;

/// Shared handle to an element.
pub type ElementRef = Rc<dyn Element>;

// ---------------------------------------------------------------------------
// Element trait
// ---------------------------------------------------------------------------

/// A node of the reconciled tree.
pub trait Element: Any {
    /// Concrete element type.
    fn kind(&self) -> ElementKind;

    /// Lifecycle, property table and native widget shared by all kinds.
    fn core(&self) -> &ElementCore;

    /// The native widget. Its identity never changes.
    fn widget(&self) -> &WidgetHandle {
        self.core().widget()
    }

    /// Apply a prop diff.
    fn update_props(&self, diff: &DiffedProps) -> Result<(), ReconcileError> {
        self.core().update(diff)
    }

    /// Append `child` as the last child.
    fn append_child(&self, child: &ElementRef) -> Result<(), ReconcileError>;

    /// Insert `child` right before `before`, moving it if already present.
    fn insert_before(&self, child: &ElementRef, before: &ElementRef) -> Result<(), ReconcileError>;

    /// Detach from `parent` and destroy this element and its native widget.
    fn remove(&self, parent: &dyn Element) -> Result<(), ReconcileError>;

    /// Called by a parent right before `self` is attached to it.
    fn notify_will_append_to(&self, parent: Weak<dyn Element>) {
        self.core().set_parent(parent);
    }

    /// Called by `child` right before it is destroyed.
    fn notify_will_unmount(&self, child: &dyn Element) -> Result<(), ReconcileError>;

    /// Ask the parent's native widget to show its subtree.
    fn render(&self) {
        self.core().render();
    }

    fn show(&self) -> Result<(), ReconcileError> {
        self.core().set_visible(true)
    }

    fn hide(&self) -> Result<(), ReconcileError> {
        self.core().set_visible(false)
    }

    /// Compute the diff between two prop sets for this element.
    fn diff_props(&self, old: &Props, new: &Props) -> DiffedProps {
        diff_props(old, new)
    }

    /// Current validated props.
    fn current_props(&self) -> PropsReader {
        self.core().mapper().current_props()
    }

    /// Downcast to `&dyn Any` for concrete-type access.
    fn as_any(&self) -> &dyn Any;
}

/// Identity comparison of two elements.
pub fn same_element(a: &dyn Element, b: &dyn Element) -> bool {
    std::ptr::eq(
        a as *const dyn Element as *const (),
        b as *const dyn Element as *const (),
    )
}
