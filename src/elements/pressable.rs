//! Pressable: an input-capturing container reporting mouse events.

use std::any::Any;
use std::rc::{Rc, Weak};

use crate::children::ChildOrderController;
use crate::element::{Element, ElementCore, ElementKind, ElementRef};
use crate::error::ReconcileError;
use crate::event::{extractor, ArgExtractor, EventHandlers, EventPayload, EventPhase, ExtractError};
use crate::host::HostContext;
use crate::native::WidgetClass;
use crate::props::factories::{alignment_cases, margin_cases};
use crate::props::{DataType, DiffedProps, Record, Value};

// ---------------------------------------------------------------------------
// Pointer event extractors
// ---------------------------------------------------------------------------

fn native_event(args: &[Value]) -> Result<&Record, ExtractError> {
    args.first()
        .and_then(Value::as_record)
        .ok_or_else(|| ExtractError::new("expected a native event record as first argument"))
}

fn coordinate(event: &Record, key: &str) -> Result<f64, ExtractError> {
    event
        .get(key)
        .and_then(Value::as_float)
        .ok_or_else(|| ExtractError::new(format!("native event has no numeric `{key}`")))
}

/// Pointer position relative to the widget and to the screen.
fn pointer_payload(event: &Record) -> Result<EventPayload, ExtractError> {
    let mut payload = EventPayload::new();
    payload.set("x".to_owned(), coordinate(event, "x")?.into());
    payload.set("y".to_owned(), coordinate(event, "y")?.into());
    payload.set("screenX".to_owned(), coordinate(event, "x_root")?.into());
    payload.set("screenY".to_owned(), coordinate(event, "y_root")?.into());
    Ok(payload)
}

/// Payload of `button-press-event` / `button-release-event`.
pub fn mouse_button_event() -> ArgExtractor {
    extractor(|args| {
        let event = native_event(args)?;
        let button = event
            .get("button")
            .and_then(Value::as_int)
            .ok_or_else(|| ExtractError::new("native event has no `button`"))?;
        let mut payload = pointer_payload(event)?;
        payload.set("button".to_owned(), button.into());
        Ok(payload)
    })
}

/// Payload of `enter-notify-event` / `leave-notify-event`.
pub fn crossing_event() -> ArgExtractor {
    extractor(|args| pointer_payload(native_event(args)?))
}

// ---------------------------------------------------------------------------
// PressableElement
// ---------------------------------------------------------------------------

/// Event box around any number of children.
#[derive(Debug)]
pub struct PressableElement {
    core: ElementCore,
    handlers: EventHandlers,
    children: ChildOrderController,
    this: Weak<PressableElement>,
}

impl PressableElement {
    /// Create the event box and apply the initial diff.
    pub fn new(ctx: &HostContext, diff: &DiffedProps) -> Result<Rc<Self>, ReconcileError> {
        let core = ElementCore::new(ctx, WidgetClass::EventBox)?;
        let widget = core.widget().clone();
        core.mapper().add_cases(alignment_cases(widget.clone()));
        core.mapper().add_cases(margin_cases(widget.clone()));
        let (above, visible) = (widget.clone(), widget.clone());
        core.mapper().add_cases(move |cases| {
            cases
                .setter("interceptChildEvents", DataType::Bool, move |value| {
                    let intercept = value.and_then(Value::as_bool).unwrap_or(false);
                    above.set_property("above-child", intercept.into())?;
                    Ok(())
                })
                .setter("draw", DataType::Bool, move |value| {
                    let draw = value.and_then(Value::as_bool).unwrap_or(false);
                    visible.set_property("visible-window", draw.into())?;
                    Ok(())
                })
        });

        let children = ChildOrderController::new(core.lifecycle(), widget.clone())?;
        let handlers = EventHandlers::new(core.lifecycle(), widget, ctx)?;
        handlers.bind_with("button-press-event", "onClick", mouse_button_event(), EventPhase::Input);
        handlers.bind_with("button-release-event", "onRelease", mouse_button_event(), EventPhase::Input);
        handlers.bind_with("enter-notify-event", "onMouseEnter", crossing_event(), EventPhase::Action);
        handlers.bind_with("leave-notify-event", "onMouseLeave", crossing_event(), EventPhase::Action);

        let element = Rc::new_cyclic(|this| Self {
            core,
            handlers,
            children,
            this: this.clone(),
        });
        element.core.mount(diff)?;
        Ok(element)
    }

    pub fn handlers(&self) -> &EventHandlers {
        &self.handlers
    }

    /// Current children in order.
    pub fn children(&self) -> Vec<ElementRef> {
        self.children.children()
    }
}

impl Element for PressableElement {
    fn kind(&self) -> ElementKind {
        ElementKind::Pressable
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
