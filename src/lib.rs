//! # native-reconciler
//!
//! Keeps a declaratively described element tree in sync with a mutable,
//! stateful native widget toolkit.
//!
//! An external tree-diffing driver creates, updates and removes elements; each
//! element owns one long-lived native widget and turns prop diffs and child
//! mutations into the smallest set of native calls.
//!
//! ## Core Systems
//!
//! - **[`lifecycle`]**: Per-element state machine with update, create and destroy hooks
//! - **[`props`]**: Dynamic values, diffs, and the ordered property mapper
//! - **[`event`]**: Signal binding, synthetic events, event phases, typed emitter
//! - **[`children`]**: Child order reconciliation for list containers
//! - **[`layout`]**: First-fit grid cell assignment
//! - **[`element`]**: The `Element` trait and shared element state
//! - **[`elements`]**: Built-in kinds: Button, Pressable, Grid, GridItem, Popover
//! - **[`native`]**: Native widget and toolkit traits
//! - **[`host`]**: Host context: config, diagnostics, scheduler, spawner, toolkit
//! - **[`testing`]**: Headless toolkit recording every native call

// Foundation
pub mod collections;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod native;

// Core systems
pub mod children;
pub mod event;
pub mod layout;
pub mod lifecycle;
pub mod props;

// Elements
pub mod element;
pub mod elements;

// Host
pub mod host;
pub mod testing;

pub use config::ReconcilerConfig;
pub use element::{Element, ElementKind, ElementRef};
pub use elements::create_element;
pub use error::{CallbackError, ReconcileError};
pub use host::HostContext;
