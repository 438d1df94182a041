//! Headless testing support.
//!
//! [`HeadlessToolkit`] stands in for a real widget library: it hands out
//! [`HeadlessWidget`]s that record every native call, so reconciliation can be
//! driven and asserted on without a display.

pub mod headless;

pub use headless::{HeadlessToolkit, HeadlessWidget};
