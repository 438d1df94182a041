//! Button: a leaf element forwarding six native signals.

use std::any::Any;
use std::rc::Rc;

use crate::element::{Element, ElementCore, ElementKind, ElementRef};
use crate::error::ReconcileError;
use crate::event::EventHandlers;
use crate::host::HostContext;
use crate::native::{WidgetClass, WidgetHandle};
use crate::props::factories::{alignment_cases, margin_cases};
use crate::props::{CaseCollector, DataType, DiffedProps, Value};

/// Native image positions.
pub const POSITION: &[&str] = &["left", "right", "top", "bottom"];

const SIGNALS: [(&str, &str); 6] = [
    ("clicked", "onClick"),
    ("activate", "onActivate"),
    ("enter", "onEnter"),
    ("leave", "onLeave"),
    ("pressed", "onPressed"),
    ("released", "onReleased"),
];

// ---------------------------------------------------------------------------
// ButtonElement
// ---------------------------------------------------------------------------

/// A push button. Cannot have children.
#[derive(Debug)]
pub struct ButtonElement {
    core: ElementCore,
    handlers: EventHandlers,
}

impl ButtonElement {
    /// Create the native button and apply the initial diff.
    pub fn new(ctx: &HostContext, diff: &DiffedProps) -> Result<Rc<Self>, ReconcileError> {
        let core = ElementCore::new(ctx, WidgetClass::Button)?;
        let widget = core.widget().clone();
        core.mapper().add_cases(alignment_cases(widget.clone()));
        core.mapper().add_cases(margin_cases(widget.clone()));
        core.mapper().add_cases(button_cases(widget.clone()));

        let handlers = EventHandlers::new(core.lifecycle(), widget, ctx)?;
        for (signal, prop) in SIGNALS {
            handlers.bind(signal, prop);
        }

        let element = Rc::new(Self { core, handlers });
        element.core.mount(diff)?;
        Ok(element)
    }

    /// Event binder of the native button.
    pub fn handlers(&self) -> &EventHandlers {
        &self.handlers
    }
}

fn button_cases(widget: WidgetHandle) -> impl FnOnce(CaseCollector) -> CaseCollector {
    move |cases| {
        let (label, image, position) = (widget.clone(), widget.clone(), widget.clone());
        cases
            .setter("label", DataType::String, move |value| {
                let text = value.and_then(Value::as_str).unwrap_or("");
                label.set_property("label", text.into())?;
                Ok(())
            })
            .setter("image", DataType::Widget, move |value| {
                match value {
                    Some(child) => image.set_property("image", child.clone())?,
                    None => image.clear_property("image")?,
                }
                Ok(())
            })
            .setter("imagePosition", DataType::Enum(POSITION), move |value| {
                let side = value.and_then(Value::as_str).unwrap_or("left");
                position.set_property("image-position", side.into())?;
                Ok(())
            })
            .setter("useUnderline", DataType::Bool, move |value| {
                let enabled = value.and_then(Value::as_bool).unwrap_or(false);
                widget.set_property("use-underline", enabled.into())?;
                Ok(())
            })
    }
}

impl Element for ButtonElement {
    fn kind(&self) -> ElementKind {
        ElementKind::Button
    }

    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn append_child(&self, child: &ElementRef) -> Result<(), ReconcileError> {
        Err(ReconcileError::UnsupportedChild {
            container: ElementKind::Button,
            child: child.kind(),
        })
    }

    fn insert_before(&self, child: &ElementRef, _before: &ElementRef) -> Result<(), ReconcileError> {
        self.append_child(child)
    }

    fn remove(&self, parent: &dyn Element) -> Result<(), ReconcileError> {
        self.core.remove(self, parent)
    }

    fn notify_will_unmount(&self, _child: &dyn Element) -> Result<(), ReconcileError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;
    use crate::event::EventHandler;
    use crate::lifecycle::LifecycleState;
    use crate::native::NativeWidget;
    use crate::props::{set, unset, PropertyError};
    use crate::testing::HeadlessToolkit;
    use std::cell::Cell;

    fn setup() -> (Rc<HeadlessToolkit>, HostContext) {
        let toolkit = Rc::new(HeadlessToolkit::new());
        let ctx = HostContext::new(toolkit.clone());
        (toolkit, ctx)
    }

    #[test]
    fn first_diff_applies_defaults() {
        let (toolkit, ctx) = setup();
        let button = ButtonElement::new(&ctx, &vec![set("label", "Save")]).unwrap();
        let native = toolkit.find(button.widget()).unwrap();

        assert_eq!(native.property("label"), Some("Save".into()));
        assert_eq!(native.property("image-position"), Some("left".into()));
        assert_eq!(native.property("use-underline"), Some(false.into()));
        assert_eq!(native.property("halign"), Some("center".into()));
        assert_eq!(button.core().lifecycle().state(), LifecycleState::Mounted);
    }

    #[test]
    fn every_signal_is_bound_to_its_prop() {
        let (toolkit, ctx) = setup();
        let hits = Rc::new(Cell::new(0));
        let diff: DiffedProps = SIGNALS
            .iter()
            .map(|(_, prop)| {
                let h = hits.clone();
                set(*prop, EventHandler::new(move |_| h.set(h.get() + 1)))
            })
            .collect();
        let button = ButtonElement::new(&ctx, &diff).unwrap();
        let native = toolkit.find(button.widget()).unwrap();

        for (signal, _) in SIGNALS {
            native.emit(signal, Vec::new());
        }
        assert_eq!(hits.get(), 6);
        assert_eq!(button.handlers().connection_count(), 6);
    }

    #[test]
    fn unset_image_clears_it() {
        let (toolkit, ctx) = setup();
        let icon = ctx.toolkit().create_widget(WidgetClass::Box);
        let button = ButtonElement::new(&ctx, &vec![set("image", icon)]).unwrap();
        let native = toolkit.find(button.widget()).unwrap();
        assert!(native.property("image").is_some());

        button.update_props(&vec![unset("image")]).unwrap();
        assert!(native.property("image").is_none());
    }

    #[test]
    fn invalid_label_is_reported_and_ignored() {
        let (toolkit, ctx) = setup();
        let button = ButtonElement::new(&ctx, &vec![set("label", "ok")]).unwrap();
        button.update_props(&vec![set("label", 3)]).unwrap();

        let native = toolkit.find(button.widget()).unwrap();
        assert_eq!(native.property("label"), Some("ok".into()));
        assert_eq!(button.current_props().get_str("label"), Some("ok".to_owned()));
        assert!(matches!(
            ctx.diagnostics().drain().as_slice(),
            [Diagnostic::Property(PropertyError::InvalidType { .. })]
        ));
    }

    #[test]
    fn buttons_take_no_children() {
        let (_, ctx) = setup();
        let button = ButtonElement::new(&ctx, &Vec::new()).unwrap();
        let other: ElementRef = ButtonElement::new(&ctx, &Vec::new()).unwrap();
        assert_eq!(
            button.append_child(&other),
            Err(ReconcileError::UnsupportedChild {
                container: ElementKind::Button,
                child: ElementKind::Button,
            })
        );
    }
}
