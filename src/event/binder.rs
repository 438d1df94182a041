//! Binds callable props to native signals.
//!
//! An element declares which prop feeds which signal with
//! [`EventHandlers::bind`]. The binder then watches the element's diffs: the
//! first callable value connects the signal, later ones only swap the
//! handler, and unsetting the prop disconnects it. Each bind holds at most one
//! live native connection.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::collections::OrderedMap;
use crate::diagnostics::Diagnostic;
use crate::error::ReconcileError;
use crate::event::phase::EventPhase;
use crate::event::synthetic::{
    empty_payload, ArgExtractor, EventHandler, HandlerReturn, SyntheticEvent,
};
use crate::host::HostContext;
use crate::lifecycle::LifecycleController;
use crate::native::{ConnectionId, SignalCallback, SignalEmission, WidgetHandle};
use crate::props::{DiffedProps, PropUpdate, Value};

// ---------------------------------------------------------------------------
// EventBind
// ---------------------------------------------------------------------------

/// State reachable from the native callback.
struct BindShared {
    signal: String,
    extractor: ArgExtractor,
    phase: EventPhase,
    handler: RefCell<Option<EventHandler>>,
    async_warned: Cell<bool>,
    ctx: HostContext,
}

impl BindShared {
    /// Run the current handler for one emission. The return value is the
    /// native "stop propagation" flag.
    fn dispatch(&self, emission: &SignalEmission) -> bool {
        let Some(handler) = self.handler.borrow().clone() else {
            return false;
        };

        let payload = match (self.extractor)(&emission.args) {
            Ok(payload) => payload,
            Err(error) => {
                if self.ctx.config().report_extraction_failures {
                    self.ctx.diagnostics().report(Diagnostic::Extraction {
                        signal: self.signal.clone(),
                        error,
                    });
                }
                return true;
            }
        };

        let event = SyntheticEvent::new(payload, emission.target.clone(), emission.args.clone());
        match handler.call(&event) {
            Ok(HandlerReturn::Done) => {}
            Ok(HandlerReturn::Pending(future)) => {
                if self.ctx.config().warn_on_async_handlers && !self.async_warned.replace(true) {
                    self.ctx.diagnostics().report(Diagnostic::AsyncHandler {
                        signal: self.signal.clone(),
                    });
                }
                self.ctx.spawner().spawn(future);
            }
            Err(error) => {
                self.ctx.diagnostics().report(Diagnostic::Handler {
                    signal: self.signal.clone(),
                    error,
                });
                return true;
            }
        }
        event.is_propagation_stopped()
    }
}

struct EventBind {
    widget: WidgetHandle,
    connection: Cell<Option<ConnectionId>>,
    shared: Rc<BindShared>,
}

impl EventBind {
    fn new(
        widget: WidgetHandle,
        ctx: HostContext,
        signal: &str,
        extractor: ArgExtractor,
        phase: EventPhase,
    ) -> Self {
        Self {
            widget,
            connection: Cell::new(None),
            shared: Rc::new(BindShared {
                signal: signal.to_owned(),
                extractor,
                phase,
                handler: RefCell::new(None),
                async_warned: Cell::new(false),
                ctx,
            }),
        }
    }

    fn connect(&self) {
        if self.connection.get().is_some() {
            return;
        }
        let shared = Rc::clone(&self.shared);
        let callback: SignalCallback = Rc::new(move |emission: &SignalEmission| {
            let task = Rc::clone(&shared);
            let emission = emission.clone();
            shared
                .ctx
                .phases()
                .start_phase(shared.phase, move || task.dispatch(&emission))
        });
        let id = self.widget.connect(&self.shared.signal, callback);
        self.connection.set(Some(id));
    }

    fn update_handler(&self, handler: Option<EventHandler>) {
        match handler {
            Some(handler) => {
                self.connect();
                *self.shared.handler.borrow_mut() = Some(handler);
            }
            None => {
                self.remove();
                *self.shared.handler.borrow_mut() = None;
            }
        }
    }

    fn remove(&self) {
        if let Some(id) = self.connection.take() {
            if let Err(err) = self.widget.disconnect(id) {
                self.shared.ctx.diagnostics().report(err);
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connection.get().is_some()
    }
}

// ---------------------------------------------------------------------------
// EventHandlers
// ---------------------------------------------------------------------------

struct BinderInner {
    widget: WidgetHandle,
    ctx: HostContext,
    /// Prop name -> bind.
    binds: RefCell<OrderedMap<String, Rc<EventBind>>>,
    internal: RefCell<Vec<EventBind>>,
}

impl BinderInner {
    fn update(&self, diff: &DiffedProps) {
        for (name, update) in diff {
            let Some(bind) = self.binds.borrow().get(name.as_str()).cloned() else {
                continue;
            };
            match update {
                PropUpdate::Set(Value::Handler(handler)) => {
                    bind.update_handler(Some(handler.clone()));
                }
                PropUpdate::Unset => bind.update_handler(None),
                PropUpdate::Set(_) => {}
            }
        }
    }

    fn unbind_all(&self) {
        let binds: Vec<_> = self.binds.borrow_mut().drain().map(|(_, bind)| bind).collect();
        for bind in binds {
            bind.remove();
        }
        let internal = std::mem::take(&mut *self.internal.borrow_mut());
        for bind in internal {
            bind.remove();
        }
    }
}

/// Connects element props and internal callbacks to native signals.
#[derive(Clone)]
pub struct EventHandlers {
    inner: Rc<BinderInner>,
}

impl EventHandlers {
    /// Create a binder for `widget`, wired to `lifecycle`.
    pub fn new(
        lifecycle: &LifecycleController,
        widget: WidgetHandle,
        ctx: &HostContext,
    ) -> Result<Self, ReconcileError> {
        let inner = Rc::new(BinderInner {
            widget,
            ctx: ctx.clone(),
            binds: RefCell::new(OrderedMap::new()),
            internal: RefCell::new(Vec::new()),
        });

        let weak: Weak<BinderInner> = Rc::downgrade(&inner);
        lifecycle.on_update(move |diff| {
            if let Some(inner) = weak.upgrade() {
                inner.update(diff);
            }
            Ok(())
        })?;

        let weak = Rc::downgrade(&inner);
        lifecycle.before_destroy(move || {
            if let Some(inner) = weak.upgrade() {
                inner.unbind_all();
            }
        })?;

        Ok(Self { inner })
    }

    /// Forward `signal` to the handler found in `prop`, with an empty payload
    /// in the `Input` phase.
    pub fn bind(&self, signal: &str, prop: &str) {
        self.bind_with(signal, prop, empty_payload(), EventPhase::Input);
    }

    /// Forward `signal` to the handler found in `prop`.
    ///
    /// `extractor` builds the synthetic event payload from the native
    /// arguments. Binding a prop twice replaces the earlier bind.
    pub fn bind_with(&self, signal: &str, prop: &str, extractor: ArgExtractor, phase: EventPhase) {
        let bind = Rc::new(EventBind::new(
            self.inner.widget.clone(),
            self.inner.ctx.clone(),
            signal,
            extractor,
            phase,
        ));
        let previous = self.inner.binds.borrow_mut().set(prop.to_owned(), bind);
        if let Some(previous) = previous {
            previous.remove();
        }
    }

    /// Connect `handler` to `signal` for the element's whole lifetime.
    ///
    /// The synthetic event has an empty payload; the handler reads
    /// [`SyntheticEvent::native_args`].
    pub fn bind_internal(
        &self,
        signal: &str,
        handler: impl Fn(&SyntheticEvent) + 'static,
        phase: Option<EventPhase>,
    ) {
        let bind = EventBind::new(
            self.inner.widget.clone(),
            self.inner.ctx.clone(),
            signal,
            empty_payload(),
            phase.unwrap_or(EventPhase::Default),
        );
        bind.update_handler(Some(EventHandler::new(handler)));
        self.inner.internal.borrow_mut().push(bind);
    }

    /// Whether the bind for `prop` has a live native connection.
    pub fn is_connected(&self, prop: &str) -> bool {
        self.inner
            .binds
            .borrow()
            .get(prop)
            .is_some_and(|bind| bind.is_connected())
    }

    /// Number of live native connections, internal ones included.
    pub fn connection_count(&self) -> usize {
        let props = self
            .inner
            .binds
            .borrow()
            .values()
            .filter(|bind| bind.is_connected())
            .count();
        let internal = self
            .inner
            .internal
            .borrow()
            .iter()
            .filter(|bind| bind.is_connected())
            .count();
        props + internal
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binds = self.inner.binds.borrow();
        f.debug_struct("EventHandlers")
            .field("binds", &binds.keys().collect::<Vec<_>>())
            .field("internal", &self.inner.internal.borrow().len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
