//! Synthetic events and the handler values application code passes as props.

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::collections::OrderedMap;
use crate::error::CallbackError;
use crate::native::WidgetHandle;
use crate::props::Value;

/// Payload produced by an argument extractor.
pub type EventPayload = OrderedMap<String, Value>;

/// Turns native signal arguments into a synthetic event payload.
pub type ArgExtractor = Rc<dyn Fn(&[Value]) -> Result<EventPayload, ExtractError>>;

/// A future returned by an async handler.
pub type LocalBoxFuture = Pin<Box<dyn Future<Output = ()>>>;

/// Result of invoking a handler.
pub type HandlerResult = Result<HandlerReturn, CallbackError>;

// ---------------------------------------------------------------------------
// ExtractError
// ---------------------------------------------------------------------------

/// The native event did not have the shape an extractor expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ExtractError {
    reason: String,
}

impl ExtractError {
    /// Create an error describing why the event was rejected.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Wrap a closure as an [`ArgExtractor`].
pub fn extractor(
    f: impl Fn(&[Value]) -> Result<EventPayload, ExtractError> + 'static,
) -> ArgExtractor {
    Rc::new(f)
}

/// Extractor producing an empty payload.
pub fn empty_payload() -> ArgExtractor {
    extractor(|_| Ok(EventPayload::new()))
}

// ---------------------------------------------------------------------------
// SyntheticEvent
// ---------------------------------------------------------------------------

/// Event object delivered to application handlers.
pub struct SyntheticEvent {
    payload: EventPayload,
    target: WidgetHandle,
    args: Vec<Value>,
    propagate: Cell<bool>,
}

impl SyntheticEvent {
    /// Create an event that has not stopped propagation.
    pub fn new(payload: EventPayload, target: WidgetHandle, args: Vec<Value>) -> Self {
        Self {
            payload,
            target,
            args,
            propagate: Cell::new(true),
        }
    }

    /// A payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// The first native argument, usually the toolkit's event struct.
    pub fn original_event(&self) -> Option<&Value> {
        self.args.first()
    }

    /// The widget that emitted the signal.
    pub fn target(&self) -> &WidgetHandle {
        &self.target
    }

    /// Every native argument, unprocessed.
    pub fn native_args(&self) -> &[Value] {
        &self.args
    }

    /// Ask the native layer to stop propagating this signal.
    pub fn stop_propagation(&self) {
        self.propagate.set(false);
    }

    /// Whether a handler called [`stop_propagation`](Self::stop_propagation).
    pub fn is_propagation_stopped(&self) -> bool {
        !self.propagate.get()
    }
}

impl fmt::Debug for SyntheticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticEvent")
            .field("payload", &self.payload)
            .field("target", &self.target.class())
            .field("args", &self.args)
            .field("propagate", &self.propagate.get())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EventHandler
// ---------------------------------------------------------------------------

/// What a handler handed back.
pub enum HandlerReturn {
    /// Ran to completion synchronously.
    Done,
    /// Returned a future; it will be spawned and not awaited.
    Pending(LocalBoxFuture),
}

impl fmt::Debug for HandlerReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => f.write_str("Done"),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A callable prop value. Clones share the same callback; equality is identity.
#[derive(Clone)]
pub struct EventHandler {
    callback: Rc<dyn Fn(&SyntheticEvent) -> HandlerResult>,
}

impl EventHandler {
    /// Synchronous, infallible handler.
    pub fn new(f: impl Fn(&SyntheticEvent) + 'static) -> Self {
        Self::raw(move |event| {
            f(event);
            Ok(HandlerReturn::Done)
        })
    }

    /// Synchronous handler that may fail.
    pub fn fallible(f: impl Fn(&SyntheticEvent) -> Result<(), CallbackError> + 'static) -> Self {
        Self::raw(move |event| f(event).map(|()| HandlerReturn::Done))
    }

    /// Handler returning a future.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(&SyntheticEvent) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        Self::raw(move |event| Ok(HandlerReturn::Pending(Box::pin(f(event)))))
    }

    /// Handler with full control over the return value.
    pub fn raw(f: impl Fn(&SyntheticEvent) -> HandlerResult + 'static) -> Self {
        Self {
            callback: Rc::new(f),
        }
    }

    /// Invoke the handler.
    pub fn call(&self, event: &SyntheticEvent) -> HandlerResult {
        (self.callback)(event)
    }

    /// Whether both wrap the same closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler(..)")
    }
}
