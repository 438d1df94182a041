//! Event plumbing: native signal binding, synthetic events, phases and the
//! parent/child emitter.

pub mod binder;
pub mod emitter;
pub mod phase;
pub mod synthetic;

pub use binder::EventHandlers;
pub use emitter::{Subscription, SyntheticEmitter};
pub use phase::{EventPhase, PhaseScheduler};
pub use synthetic::{
    empty_payload, extractor, ArgExtractor, EventHandler, EventPayload, ExtractError,
    HandlerResult, HandlerReturn, LocalBoxFuture, SyntheticEvent,
};
