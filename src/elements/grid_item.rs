//! Grid item: a cell of a [`GridElement`](super::GridElement) with spans.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::children::ChildOrderController;
use crate::element::{Element, ElementCore, ElementKind, ElementRef};
use crate::error::ReconcileError;
use crate::event::{Subscription, SyntheticEmitter};
use crate::host::HostContext;
use crate::native::WidgetClass;
use crate::props::factories::{alignment_cases, margin_cases};
use crate::props::{DataType, DiffedProps, Value};

/// Notifications a grid item sends to its grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridItemEvent {
    /// `columnSpan` or `rowSpan` changed.
    SpanChanged,
}

// ---------------------------------------------------------------------------
// GridItemSpans
// ---------------------------------------------------------------------------

struct SpanState {
    column_span: Cell<usize>,
    row_span: Cell<usize>,
    emitter: SyntheticEmitter<GridItemEvent>,
}

/// Shared view of an item's spans, readable by the grid without holding the
/// item itself.
#[derive(Clone)]
pub struct GridItemSpans {
    state: Rc<SpanState>,
}

impl GridItemSpans {
    fn new() -> Self {
        Self {
            state: Rc::new(SpanState {
                column_span: Cell::new(1),
                row_span: Cell::new(1),
                emitter: SyntheticEmitter::new(),
            }),
        }
    }

    pub fn column_span(&self) -> usize {
        self.state.column_span.get()
    }

    pub fn row_span(&self) -> usize {
        self.state.row_span.get()
    }

    /// Listen for span changes.
    pub fn on_change(&self, callback: impl Fn() + 'static) -> Subscription {
        self.state
            .emitter
            .on(GridItemEvent::SpanChanged, move |_| callback())
    }

    fn update(&self, span: &Cell<usize>, value: usize) {
        if span.replace(value) != value {
            self.state.emitter.emit(&GridItemEvent::SpanChanged, &());
        }
    }
}

impl fmt::Debug for GridItemSpans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridItemSpans")
            .field("column_span", &self.column_span())
            .field("row_span", &self.row_span())
            .finish()
    }
}

fn span_value(value: Option<&Value>) -> usize {
    value
        .and_then(Value::as_truncated_int)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(1)
        .max(1)
}

// ---------------------------------------------------------------------------
// GridItemElement
// ---------------------------------------------------------------------------

/// Container placed by its parent grid.
#[derive(Debug)]
pub struct GridItemElement {
    core: ElementCore,
    spans: GridItemSpans,
    children: ChildOrderController,
    this: Weak<GridItemElement>,
}

impl GridItemElement {
    /// Create the item's box and apply the initial diff.
    pub fn new(ctx: &HostContext, diff: &DiffedProps) -> Result<Rc<Self>, ReconcileError> {
        let core = ElementCore::new(ctx, WidgetClass::Box)?;
        let widget = core.widget().clone();
        let spans = GridItemSpans::new();
        core.mapper().add_cases(alignment_cases(widget.clone()));
        core.mapper().add_cases(margin_cases(widget.clone()));
        let (columns, rows) = (spans.clone(), spans.clone());
        core.mapper().add_cases(move |cases| {
            cases
                .setter("columnSpan", DataType::Number, move |value| {
                    columns.update(&columns.state.column_span, span_value(value));
                    Ok(())
                })
                .setter("rowSpan", DataType::Number, move |value| {
                    rows.update(&rows.state.row_span, span_value(value));
                    Ok(())
                })
        });
        let children = ChildOrderController::new(core.lifecycle(), widget)?;

        let element = Rc::new_cyclic(|this| Self {
            core,
            spans,
            children,
            this: this.clone(),
        });
        element.core.mount(diff)?;
        Ok(element)
    }

    /// Spans the parent grid lays this item out with.
    pub fn spans(&self) -> &GridItemSpans {
        &self.spans
    }
}

impl Element for GridItemElement {
    fn kind(&self) -> ElementKind {
        ElementKind::GridItem
    }

    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn append_child(&self, child: &ElementRef) -> Result<(), ReconcileError> {
        child.notify_will_append_to(self.this.clone());
        self.children.add_child(child)
    }

    fn insert_before(&self, child: &ElementRef, before: &ElementRef) -> Result<(), ReconcileError> {
        child.notify_will_append_to(self.this.clone());
        self.children.insert_before(child, before)
    }

    fn remove(&self, parent: &dyn Element) -> Result<(), ReconcileError> {
        self.core.remove(self, parent)?;
        self.spans.state.emitter.clear();
        Ok(())
    }

    fn notify_will_unmount(&self, child: &dyn Element) -> Result<(), ReconcileError> {
        self.children.remove_child(child)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
