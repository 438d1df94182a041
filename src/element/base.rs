//! State every element kind carries.

use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

use crate::error::ReconcileError;
use crate::host::HostContext;
use crate::lifecycle::LifecycleController;
use crate::native::{WidgetClass, WidgetHandle};
use crate::props::{DiffedProps, PropertyMapper};

use super::traits::{Element, ElementRef};

/// Native widget, lifecycle and property table of one element.
///
/// The property mapper is wired to the lifecycle here; elements add their
/// cases and optional event binders on top.
pub struct ElementCore {
    widget: WidgetHandle,
    lifecycle: LifecycleController,
    mapper: PropertyMapper,
    parent: RefCell<Option<Weak<dyn Element>>>,
}

impl ElementCore {
    /// Create a widget of `class` through the host toolkit and wire a fresh
    /// lifecycle and property mapper to it.
    pub fn new(ctx: &HostContext, class: WidgetClass) -> Result<Self, ReconcileError> {
        Self::with_widget(ctx, ctx.toolkit().create_widget(class))
    }

    /// Like [`new`](Self::new), for a widget created elsewhere.
    pub fn with_widget(ctx: &HostContext, widget: WidgetHandle) -> Result<Self, ReconcileError> {
        let lifecycle = LifecycleController::new(ctx.diagnostics().clone());
        let mapper = PropertyMapper::new(&lifecycle, ctx.diagnostics().clone())?;
        Ok(Self {
            widget,
            lifecycle,
            mapper,
            parent: RefCell::new(None),
        })
    }

    /// Native widget owned by the element.
    pub fn widget(&self) -> &WidgetHandle {
        &self.widget
    }

    pub fn lifecycle(&self) -> &LifecycleController {
        &self.lifecycle
    }

    pub fn mapper(&self) -> &PropertyMapper {
        &self.mapper
    }

    /// Fan `diff` out to every extender.
    pub fn update(&self, diff: &DiffedProps) -> Result<(), ReconcileError> {
        self.lifecycle.emit_update(diff)
    }

    /// Apply the initial diff and end construction.
    pub fn mount(&self, diff: &DiffedProps) -> Result<(), ReconcileError> {
        self.update(diff)?;
        self.lifecycle.emit_after_create()
    }

    /// Remember the container the element was appended to.
    pub fn set_parent(&self, parent: Weak<dyn Element>) {
        *self.parent.borrow_mut() = Some(parent);
    }

    /// The parent this element was last appended to, if it is still alive.
    pub fn parent(&self) -> Option<ElementRef> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Ask the parent container to show its children again.
    pub fn render(&self) {
        if let Some(parent) = self.parent() {
            parent.widget().show_all();
        }
    }

    pub fn set_visible(&self, visible: bool) -> Result<(), ReconcileError> {
        self.widget.set_property("visible", visible.into())?;
        Ok(())
    }

    /// Unmount `element` from `parent`, run its cleanups and destroy the
    /// widget. Fails if the element was already removed.
    pub fn remove(&self, element: &dyn Element, parent: &dyn Element) -> Result<(), ReconcileError> {
        if self.lifecycle.is_destroyed() {
            return Err(ReconcileError::Destroyed {
                operation: "remove",
            });
        }
        parent.notify_will_unmount(element)?;
        self.lifecycle.emit_before_destroy()?;
        self.widget.destroy();
        self.parent.borrow_mut().take();
        Ok(())
    }
}

impl fmt::Debug for ElementCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementCore")
            .field("class", &self.widget.class())
            .field("lifecycle", &self.lifecycle.state())
            .field("mapper", &self.mapper)
            .finish()
    }
}
