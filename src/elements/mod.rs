//! Built-in element kinds and the kind → constructor table.

pub mod button;
pub mod grid;
pub mod grid_item;
pub mod popover;
pub mod pressable;

pub use button::ButtonElement;
pub use grid::GridElement;
pub use grid_item::{GridItemElement, GridItemEvent, GridItemSpans};
pub use popover::{PopoverElement, PopoverSlotElement, POPOVER_WIDGET};
pub use pressable::PressableElement;

use crate::element::{ElementKind, ElementRef};
use crate::error::ReconcileError;
use crate::host::HostContext;
use crate::native::WidgetClass;
use crate::props::{set, DiffedProps};

/// Construct an element of `kind` with its initial diff.
///
/// A popover without a `popoverWidget` in `diff` gets a fresh surface from
/// the host toolkit.
pub fn create_element(
    kind: ElementKind,
    ctx: &HostContext,
    diff: &DiffedProps,
) -> Result<ElementRef, ReconcileError> {
    match kind {
        ElementKind::Button => Ok(ButtonElement::new(ctx, diff)?),
        ElementKind::Pressable => Ok(PressableElement::new(ctx, diff)?),
        ElementKind::Grid => Ok(GridElement::new(ctx, diff)?),
        ElementKind::GridItem => Ok(GridItemElement::new(ctx, diff)?),
        ElementKind::Popover => {
            if popover::popover_widget_in(diff).is_some() {
                return Ok(PopoverElement::new(ctx, diff)?);
            }
            let mut diff = diff.clone();
            let surface = ctx.toolkit().create_widget(WidgetClass::Popover);
            diff.insert(0, set(POPOVER_WIDGET, surface));
            Ok(PopoverElement::new(ctx, &diff)?)
        }
        ElementKind::PopoverTarget => Ok(PopoverSlotElement::target(ctx, diff)?),
        ElementKind::PopoverContent => Ok(PopoverSlotElement::content(ctx, diff)?),
    }
}
