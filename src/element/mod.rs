//! Element abstraction: kinds, the `Element` trait and shared element state.

pub mod base;
pub mod kind;
pub mod traits;

pub use base::ElementCore;
pub use kind::ElementKind;
pub use traits::{same_element, Element, ElementRef};
