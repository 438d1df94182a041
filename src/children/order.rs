//! Keeps a container's native child order in step with the declared order.
//!
//! The controller holds children weakly: the driver owns element lifetimes,
//! the controller only decides where their widgets sit in the container.
//! Every structural change ends with a `show_all` on the container.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::ReconcileError;
use crate::lifecycle::LifecycleController;
use crate::native::{same_widget, WidgetHandle};
use crate::element::{Element, ElementRef};

struct ChildEntry {
    element: Weak<dyn Element>,
    widget: WidgetHandle,
}

/// Ordered child list of a single-list container.
#[derive(Clone)]
pub struct ChildOrderController {
    container: WidgetHandle,
    lifecycle: LifecycleController,
    children: Rc<RefCell<Vec<ChildEntry>>>,
}

impl ChildOrderController {
    /// Create a controller for `container`. The child list is dropped when
    /// the lifecycle ends.
    pub fn new(
        lifecycle: &LifecycleController,
        container: WidgetHandle,
    ) -> Result<Self, ReconcileError> {
        let children: Rc<RefCell<Vec<ChildEntry>>> = Rc::default();
        let weak = Rc::downgrade(&children);
        lifecycle.before_destroy(move || {
            if let Some(children) = weak.upgrade() {
                children.borrow_mut().clear();
            }
        })?;
        Ok(Self {
            container,
            lifecycle: lifecycle.clone(),
            children,
        })
    }

    fn ensure_alive(&self, operation: &'static str) -> Result<(), ReconcileError> {
        if self.lifecycle.is_destroyed() {
            Err(ReconcileError::Destroyed { operation })
        } else {
            Ok(())
        }
    }

    fn position_of(&self, widget: &WidgetHandle) -> Option<usize> {
        self.children
            .borrow()
            .iter()
            .position(|entry| same_widget(&entry.widget, widget))
    }

    /// Append `child`, moving it to the end if it is already present.
    ///
    /// The list only changes once the container accepted the widget.
    pub fn add_child(&self, child: &ElementRef) -> Result<(), ReconcileError> {
        self.ensure_alive("add_child")?;
        let widget = child.widget().clone();
        match self.position_of(&widget) {
            Some(_) => self.container.reorder(&widget, self.len() - 1)?,
            None => self.container.add(&widget)?,
        }

        let mut children = self.children.borrow_mut();
        children.retain(|entry| !same_widget(&entry.widget, &widget));
        children.push(ChildEntry {
            element: Rc::downgrade(child),
            widget,
        });
        drop(children);
        self.container.show_all();
        Ok(())
    }

    /// Insert `child` right before `before`, moving it if already present.
    pub fn insert_before(
        &self,
        child: &ElementRef,
        before: &ElementRef,
    ) -> Result<(), ReconcileError> {
        self.ensure_alive("insert_before")?;
        let widget = child.widget().clone();
        let before_widget = before.widget();
        let Some(reference) = self.position_of(before_widget) else {
            return Err(ReconcileError::ChildNotFound);
        };
        if same_widget(&widget, before_widget) {
            return Ok(());
        }

        let existing = self.position_of(&widget);
        // Position of `before` once `child` is out of the list.
        let index = match existing {
            Some(current) if current < reference => reference - 1,
            _ => reference,
        };
        if existing.is_none() {
            self.container.add(&widget)?;
        }
        if let Err(err) = self.container.reorder(&widget, index) {
            if existing.is_none() {
                let _ = self.container.remove(&widget);
            }
            return Err(err.into());
        }

        let mut children = self.children.borrow_mut();
        if let Some(current) = existing {
            children.remove(current);
        }
        children.insert(
            index,
            ChildEntry {
                element: Rc::downgrade(child),
                widget,
            },
        );
        drop(children);
        self.container.show_all();
        Ok(())
    }

    /// Detach `child`. Does nothing if it is not in the list.
    pub fn remove_child(&self, child: &dyn Element) -> Result<(), ReconcileError> {
        self.ensure_alive("remove_child")?;
        let widget = child.widget();
        let Some(index) = self.position_of(widget) else {
            return Ok(());
        };
        self.container.remove(widget)?;
        self.children.borrow_mut().remove(index);
        self.container.show_all();
        Ok(())
    }

    /// Live children in order.
    pub fn children(&self) -> Vec<ElementRef> {
        self.children
            .borrow()
            .iter()
            .filter_map(|entry| entry.element.upgrade())
            .collect()
    }

    /// Position of `child` in the list.
    pub fn index_of(&self, child: &dyn Element) -> Option<usize> {
        self.position_of(child.widget())
    }

    /// Number of tracked children, live or not.
    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }
}

impl fmt::Debug for ChildOrderController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildOrderController")
            .field("container", &self.container.class())
            .field("children", &self.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
