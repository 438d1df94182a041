//! Per-element lifecycle state machine.

pub mod controller;

pub use controller::{LifecycleController, LifecycleState};
