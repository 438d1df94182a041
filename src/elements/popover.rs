//! Popover with a target slot and a content slot.
//!
//! The element's own widget is a box holding the target. The popover
//! surface is a separate native widget injected through the
//! `popoverWidget` prop, made relative to that box, and holds the content.
//! Only explicitly set props are applied: defaults are not pushed on
//! creation.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::children::ChildOrderController;
use crate::element::{Element, ElementCore, ElementKind, ElementRef};
use crate::error::{CallbackError, ReconcileError};
use crate::event::EventHandlers;
use crate::host::HostContext;
use crate::native::{same_widget, WidgetClass, WidgetHandle};
use crate::props::factories::{alignment_cases, margin_cases};
use crate::props::{CaseCollector, DataType, DiffedProps, Value};

use super::button::POSITION;

/// Native popover constraint variants.
pub const CONSTRAINT: &[&str] = &["none", "window"];

/// Name of the prop carrying the native popover surface.
pub const POPOVER_WIDGET: &str = "popoverWidget";

/// The popover surface passed in `diff`, if any.
pub fn popover_widget_in(diff: &DiffedProps) -> Option<WidgetHandle> {
    diff.iter()
        .filter(|(name, _)| name == POPOVER_WIDGET)
        .find_map(|(_, update)| update.value().and_then(Value::as_widget).cloned())
}

#[derive(Default)]
struct Slots {
    target: Option<WidgetHandle>,
    content: Option<WidgetHandle>,
}

// ---------------------------------------------------------------------------
// PopoverElement
// ---------------------------------------------------------------------------

/// Popover anchored to its target child.
pub struct PopoverElement {
    core: ElementCore,
    popover: WidgetHandle,
    handlers: EventHandlers,
    slots: RefCell<Slots>,
    this: Weak<PopoverElement>,
}

impl PopoverElement {
    /// Create a popover. `diff` must set `popoverWidget`.
    pub fn new(ctx: &HostContext, diff: &DiffedProps) -> Result<Rc<Self>, ReconcileError> {
        let popover = popover_widget_in(diff).ok_or(ReconcileError::MissingProperty {
            kind: ElementKind::Popover,
            property: POPOVER_WIDGET,
        })?;

        let core = ElementCore::new(ctx, WidgetClass::Box)?;
        let widget = core.widget().clone();
        core.mapper().skip_defaults();
        core.mapper().add_cases(alignment_cases(widget.clone()));
        core.mapper().add_cases(margin_cases(widget.clone()));
        core.mapper().add_cases(popover_cases(popover.clone(), widget));

        let handlers = EventHandlers::new(core.lifecycle(), popover.clone(), ctx)?;
        handlers.bind("closed", "onClosed");

        let element = Rc::new_cyclic(|this| Self {
            core,
            popover,
            handlers,
            slots: RefCell::new(Slots::default()),
            this: this.clone(),
        });
        element.core.mount(diff)?;
        Ok(element)
    }

    /// The native popover surface.
    pub fn popover(&self) -> &WidgetHandle {
        &self.popover
    }

    pub fn handlers(&self) -> &EventHandlers {
        &self.handlers
    }

    fn attach_slot(&self, child: &ElementRef) -> Result<(), ReconcileError> {
        let kind = child.kind();
        let container = match kind {
            ElementKind::PopoverContent => &self.popover,
            ElementKind::PopoverTarget => self.core.widget(),
            _ => {
                return Err(ReconcileError::UnsupportedChild {
                    container: ElementKind::Popover,
                    child: kind,
                })
            }
        };
        let occupied = {
            let slots = self.slots.borrow();
            match kind {
                ElementKind::PopoverContent => slots.content.is_some(),
                _ => slots.target.is_some(),
            }
        };
        if occupied {
            return Err(ReconcileError::DuplicateChild {
                container: ElementKind::Popover,
                child: kind,
            });
        }

        child.notify_will_append_to(self.this.clone());
        container.add(child.widget())?;
        let mut slots = self.slots.borrow_mut();
        let slot = match kind {
            ElementKind::PopoverContent => &mut slots.content,
            _ => &mut slots.target,
        };
        *slot = Some(child.widget().clone());
        Ok(())
    }
}

impl fmt::Debug for PopoverElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        f.debug_struct("PopoverElement")
            .field("core", &self.core)
            .field("has_target", &slots.target.is_some())
            .field("has_content", &slots.content.is_some())
            .finish()
    }
}

fn popover_cases(
    popover: WidgetHandle,
    anchor: WidgetHandle,
) -> impl FnOnce(CaseCollector) -> CaseCollector {
    move |cases| {
        let (surface, modal, constraint) = (popover.clone(), popover.clone(), popover.clone());
        cases
            .setter(POPOVER_WIDGET, DataType::Widget, move |value| {
                match value.and_then(Value::as_widget) {
                    Some(widget) if same_widget(widget, &surface) => {
                        surface.set_property("relative-to", anchor.clone().into())?;
                        Ok(())
                    }
                    Some(_) => Err(CallbackError::new("popoverWidget cannot be replaced")),
                    None => Err(CallbackError::new("popoverWidget cannot be unset")),
                }
            })
            .setter("isModal", DataType::Bool, move |value| {
                let is_modal = value.and_then(Value::as_bool).unwrap_or(false);
                modal.set_property("modal", is_modal.into())?;
                Ok(())
            })
            .setter("constraint", DataType::Enum(CONSTRAINT), move |value| {
                let to = value.and_then(Value::as_str).unwrap_or("none");
                constraint.set_property("constrain-to", to.into())?;
                Ok(())
            })
            .setter("position", DataType::Enum(POSITION), move |value| {
                let side = value.and_then(Value::as_str).unwrap_or("bottom");
                popover.set_property("position", side.into())?;
                Ok(())
            })
    }
}

impl Element for PopoverElement {
    fn kind(&self) -> ElementKind {
        ElementKind::Popover
    }

    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn append_child(&self, child: &ElementRef) -> Result<(), ReconcileError> {
        self.attach_slot(child)
    }

    /// Slots have no order; same as [`append_child`](Element::append_child).
    fn insert_before(&self, child: &ElementRef, _before: &ElementRef) -> Result<(), ReconcileError> {
        self.attach_slot(child)
    }

    fn remove(&self, parent: &dyn Element) -> Result<(), ReconcileError> {
        self.core.remove(self, parent)?;
        self.popover.destroy();
        Ok(())
    }

    fn notify_will_unmount(&self, child: &dyn Element) -> Result<(), ReconcileError> {
        let widget = child.widget();
        let mut slots = self.slots.borrow_mut();
        if slots.content.as_ref().is_some_and(|w| same_widget(w, widget)) {
            slots.content = None;
            drop(slots);
            self.popover.remove(widget)?;
        } else if slots.target.as_ref().is_some_and(|w| same_widget(w, widget)) {
            slots.target = None;
            drop(slots);
            self.core.widget().remove(widget)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// `PopoverTarget` or `PopoverContent`: a box of ordered children.
#[derive(Debug)]
pub struct PopoverSlotElement {
    kind: ElementKind,
    core: ElementCore,
    children: ChildOrderController,
    this: Weak<PopoverSlotElement>,
}

impl PopoverSlotElement {
    /// The element that anchors the popover.
    pub fn target(ctx: &HostContext, diff: &DiffedProps) -> Result<Rc<Self>, ReconcileError> {
        Self::new(ElementKind::PopoverTarget, ctx, diff)
    }

    /// The element shown inside the popover.
    pub fn content(ctx: &HostContext, diff: &DiffedProps) -> Result<Rc<Self>, ReconcileError> {
        Self::new(ElementKind::PopoverContent, ctx, diff)
    }

    fn new(
        kind: ElementKind,
        ctx: &HostContext,
        diff: &DiffedProps,
    ) -> Result<Rc<Self>, ReconcileError> {
        let core = ElementCore::new(ctx, WidgetClass::Box)?;
        let widget = core.widget().clone();
        core.mapper().add_cases(alignment_cases(widget.clone()));
        core.mapper().add_cases(margin_cases(widget.clone()));
        let children = ChildOrderController::new(core.lifecycle(), widget)?;

        let element = Rc::new_cyclic(|this| Self {
            kind,
            core,
            children,
            this: this.clone(),
        });
        element.core.mount(diff)?;
        Ok(element)
    }
}

impl Element for PopoverSlotElement {
    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn append_child(&self, child: &ElementRef) -> Result<(), ReconcileError> {
        child.notify_will_append_to(self.this.clone());
        self.children.add_child(child)
    }

    fn insert_before(&self, child: &ElementRef, before: &ElementRef) -> Result<(), ReconcileError> {
        child.notify_will_append_to(self.this.clone());
        self.children.insert_before(child, before)
    }

    fn remove(&self, parent: &dyn Element) -> Result<(), ReconcileError> {
        self.core.remove(self, parent)
    }

    fn notify_will_unmount(&self, child: &dyn Element) -> Result<(), ReconcileError> {
        self.children.remove_child(child)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ===========================================================================
// Tests
// ===========================================================================
