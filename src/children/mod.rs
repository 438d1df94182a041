//! Structural reconciliation of container children.

pub mod order;

pub use order::ChildOrderController;
