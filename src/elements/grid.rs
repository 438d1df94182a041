//! Grid: lays its items out with a [`GridMatrix`].
//!
//! Any structural change, span change or column-count change re-arranges
//! every item from scratch: the previous columns are removed from the native
//! grid, the matrix is rebuilt and each item is attached at its new cell.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::diagnostics::Diagnostics;
use crate::element::{Element, ElementCore, ElementKind, ElementRef};
use crate::error::{CallbackError, ReconcileError};
use crate::event::Subscription;
use crate::host::HostContext;
use crate::layout::{GridCell, GridMatrix};
use crate::native::{same_widget, NativeError, WidgetClass, WidgetHandle};
use crate::props::factories::{alignment_cases, margin_cases};
use crate::props::{CaseCollector, DataType, DiffedProps, Value};

use super::grid_item::{GridItemElement, GridItemSpans};

struct GridEntry {
    element: Weak<dyn Element>,
    widget: WidgetHandle,
    spans: GridItemSpans,
    subscription: Option<Subscription>,
}

impl GridEntry {
    fn detach(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.remove();
        }
    }
}

#[derive(Default)]
struct GridState {
    columns: usize,
    /// Column count used by the last arrangement.
    previous_columns: usize,
    items: Vec<GridEntry>,
}

// ---------------------------------------------------------------------------
// GridElement
// ---------------------------------------------------------------------------

/// Fixed-column grid of [`GridItemElement`]s.
pub struct GridElement {
    core: ElementCore,
    state: RefCell<GridState>,
    diagnostics: Diagnostics,
    this: Weak<GridElement>,
}

impl GridElement {
    /// Create the native grid and apply the initial diff.
    pub fn new(ctx: &HostContext, diff: &DiffedProps) -> Result<Rc<Self>, ReconcileError> {
        let core = ElementCore::new(ctx, WidgetClass::Grid)?;
        let widget = core.widget().clone();
        core.mapper().add_cases(alignment_cases(widget.clone()));
        core.mapper().add_cases(margin_cases(widget.clone()));

        let element = Rc::new_cyclic(|this: &Weak<GridElement>| {
            core.mapper().add_cases(grid_cases(this.clone(), widget));
            Self {
                core,
                state: RefCell::new(GridState {
                    columns: 1,
                    ..GridState::default()
                }),
                diagnostics: ctx.diagnostics().clone(),
                this: this.clone(),
            }
        });

        let weak = element.this.clone();
        element.core.lifecycle().before_destroy(move || {
            if let Some(grid) = weak.upgrade() {
                let items = std::mem::take(&mut grid.state.borrow_mut().items);
                items.into_iter().for_each(GridEntry::detach);
            }
        })?;

        element.core.mount(diff)?;
        Ok(element)
    }

    /// Current column count.
    pub fn columns(&self) -> usize {
        self.state.borrow().columns
    }

    /// Cell of every item, in item order, as the matrix assigns them.
    pub fn layout(&self) -> Vec<GridCell> {
        self.arrangement().into_iter().map(|(_, cell)| cell).collect()
    }

    /// Live items in order.
    pub fn items(&self) -> Vec<ElementRef> {
        self.state
            .borrow()
            .items
            .iter()
            .filter_map(|entry| entry.element.upgrade())
            .collect()
    }

    fn set_columns(&self, columns: usize) -> Result<(), NativeError> {
        self.state.borrow_mut().columns = columns;
        self.rearrange()
    }

    fn arrangement(&self) -> Vec<(WidgetHandle, GridCell)> {
        let state = self.state.borrow();
        let mut matrix = GridMatrix::new(state.columns);
        state
            .items
            .iter()
            .map(|entry| {
                let cell = matrix.next_element(entry.spans.column_span(), entry.spans.row_span());
                (entry.widget.clone(), cell)
            })
            .collect()
    }

    /// Detach every item and attach it again at its computed cell.
    fn rearrange(&self) -> Result<(), NativeError> {
        let widget = self.core.widget();
        let (previous, columns) = {
            let state = self.state.borrow();
            (state.previous_columns, state.columns)
        };
        for column in (0..previous).rev() {
            widget.remove_column(column)?;
        }
        for (child, cell) in self.arrangement() {
            widget.attach(&child, cell)?;
        }
        self.state.borrow_mut().previous_columns = columns;
        widget.show_all();
        Ok(())
    }

    fn entry_for(&self, child: &ElementRef) -> Result<GridEntry, ReconcileError> {
        let Some(item) = child.as_any().downcast_ref::<GridItemElement>() else {
            return Err(ReconcileError::UnsupportedChild {
                container: ElementKind::Grid,
                child: child.kind(),
            });
        };
        let spans = item.spans().clone();
        let grid = self.this.clone();
        let subscription = spans.on_change(move || {
            if let Some(grid) = grid.upgrade() {
                if let Err(err) = grid.rearrange() {
                    grid.diagnostics.report(err);
                }
            }
        });
        Ok(GridEntry {
            element: Rc::downgrade(child),
            widget: child.widget().clone(),
            spans,
            subscription: Some(subscription),
        })
    }

    fn position_of(&self, widget: &WidgetHandle) -> Option<usize> {
        self.state
            .borrow()
            .items
            .iter()
            .position(|entry| same_widget(&entry.widget, widget))
    }

    fn take_entry(&self, widget: &WidgetHandle) -> Option<GridEntry> {
        let index = self.position_of(widget)?;
        Some(self.state.borrow_mut().items.remove(index))
    }
}

fn grid_cases(
    grid: Weak<GridElement>,
    widget: WidgetHandle,
) -> impl FnOnce(CaseCollector) -> CaseCollector {
    fn int_or(value: Option<&Value>, default: i64) -> i64 {
        value.and_then(Value::as_truncated_int).unwrap_or(default)
    }

    move |cases| {
        let (column_spacing, row_spacing, same_width) =
            (widget.clone(), widget.clone(), widget.clone());
        cases
            .setter("columns", DataType::Number, move |value| {
                let columns = usize::try_from(int_or(value, 1)).unwrap_or(1).max(1);
                if let Some(grid) = grid.upgrade() {
                    grid.set_columns(columns).map_err(CallbackError::from)?;
                }
                Ok(())
            })
            .setter("columnSpacing", DataType::Number, move |value| {
                column_spacing.set_property("column-spacing", int_or(value, 0).into())?;
                Ok(())
            })
            .setter("rowSpacing", DataType::Number, move |value| {
                row_spacing.set_property("row-spacing", int_or(value, 0).into())?;
                Ok(())
            })
            .setter("sameColumnWidth", DataType::Bool, move |value| {
                let same = value.and_then(Value::as_bool).unwrap_or(true);
                same_width.set_property("column-homogeneous", same.into())?;
                Ok(())
            })
            .setter("sameRowHeight", DataType::Bool, move |value| {
                let same = value.and_then(Value::as_bool).unwrap_or(false);
                widget.set_property("row-homogeneous", same.into())?;
                Ok(())
            })
    }
}

impl Element for GridElement {
    fn kind(&self) -> ElementKind {
        ElementKind::Grid
    }

    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn append_child(&self, child: &ElementRef) -> Result<(), ReconcileError> {
        let entry = self.entry_for(child)?;
        child.notify_will_append_to(self.this.clone());
        if let Some(previous) = self.take_entry(child.widget()) {
            previous.detach();
        }
        self.state.borrow_mut().items.push(entry);
        self.rearrange()?;
        Ok(())
    }

    fn insert_before(&self, child: &ElementRef, before: &ElementRef) -> Result<(), ReconcileError> {
        if self.position_of(before.widget()).is_none() {
            return Err(ReconcileError::ChildNotFound);
        }
        if same_widget(child.widget(), before.widget()) {
            return Ok(());
        }
        let entry = self.entry_for(child)?;
        child.notify_will_append_to(self.this.clone());
        if let Some(previous) = self.take_entry(child.widget()) {
            previous.detach();
        }
        let index = self
            .position_of(before.widget())
            .ok_or(ReconcileError::ChildNotFound)?;
        self.state.borrow_mut().items.insert(index, entry);
        self.rearrange()?;
        Ok(())
    }

    fn remove(&self, parent: &dyn Element) -> Result<(), ReconcileError> {
        self.core.remove(self, parent)
    }

    fn notify_will_unmount(&self, child: &dyn Element) -> Result<(), ReconcileError> {
        if let Some(entry) = self.take_entry(child.widget()) {
            entry.detach();
            self.rearrange()?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for GridElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("GridElement")
            .field("core", &self.core)
            .field("columns", &state.columns)
            .field("items", &state.items.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ButtonElement;
    use crate::native::NativeWidget;
    use crate::props::set;
    use crate::testing::{HeadlessToolkit, HeadlessWidget};
    use pretty_assertions::assert_eq;

    struct Fixture {
        ctx: HostContext,
        grid: Rc<GridElement>,
        native: Rc<HeadlessWidget>,
    }

    fn fixture(columns: i64) -> Fixture {
        let toolkit = Rc::new(HeadlessToolkit::new());
        let ctx = HostContext::new(toolkit.clone());
        let grid = GridElement::new(&ctx, &vec![set("columns", columns)]).unwrap();
        let native = toolkit.find(grid.widget()).unwrap();
        Fixture { ctx, grid, native }
    }

    fn item(ctx: &HostContext, columns: i64, rows: i64) -> ElementRef {
        GridItemElement::new(ctx, &vec![set("columnSpan", columns), set("rowSpan", rows)]).unwrap()
    }

    fn cell(x: usize, y: usize, column_span: usize, row_span: usize) -> GridCell {
        GridCell {
            x,
            y,
            column_span,
            row_span,
        }
    }

    #[test]
    fn items_are_packed_first_fit() {
        let f = fixture(3);
        let items: Vec<ElementRef> = [(2, 1), (2, 1), (1, 1)]
            .into_iter()
            .map(|(columns, rows)| item(&f.ctx, columns, rows))
            .collect();
        for child in &items {
            f.grid.append_child(child).unwrap();
        }
        assert_eq!(
            f.grid.layout(),
            vec![cell(0, 0, 2, 1), cell(0, 1, 2, 1), cell(2, 0, 1, 1)]
        );
        insta::assert_snapshot!(f.native.render_grid(), @r"
        box#2 @ 0,0 span 2x1
        box#3 @ 0,1 span 2x1
        box#4 @ 2,0 span 1x1
        ");
    }

    #[test]
    fn column_change_rearranges_from_scratch() {
        let f = fixture(2);
        let a = item(&f.ctx, 1, 1);
        let b = item(&f.ctx, 1, 1);
        f.grid.append_child(&a).unwrap();
        f.grid.append_child(&b).unwrap();
        f.native.clear_calls();

        f.grid.update_props(&vec![set("columns", 1)]).unwrap();
        assert_eq!(
            f.native.calls(),
            vec![
                "remove_column 1",
                "remove_column 0",
                "attach box#2 @ 0,0 span 1x1",
                "attach box#3 @ 0,1 span 1x1",
                "show_all",
            ]
        );
    }

    #[test]
    fn span_change_relayouts_through_the_emitter() {
        let f = fixture(2);
        let a = item(&f.ctx, 1, 1);
        let b = item(&f.ctx, 1, 1);
        f.grid.append_child(&a).unwrap();
        f.grid.append_child(&b).unwrap();
        assert_eq!(f.grid.layout(), vec![cell(0, 0, 1, 1), cell(1, 0, 1, 1)]);

        a.update_props(&vec![set("columnSpan", 2)]).unwrap();
        assert_eq!(f.grid.layout(), vec![cell(0, 0, 2, 1), cell(0, 1, 1, 1)]);
        assert_eq!(
            f.native.attachments().last(),
            Some(&("box#3".to_owned(), cell(0, 1, 1, 1)))
        );
    }

    #[test]
    fn insert_before_and_removal() {
        let f = fixture(3);
        let a = item(&f.ctx, 1, 1);
        let b = item(&f.ctx, 1, 1);
        let c = item(&f.ctx, 1, 1);
        f.grid.append_child(&a).unwrap();
        f.grid.append_child(&c).unwrap();
        f.grid.insert_before(&b, &c).unwrap();
        assert_eq!(
            f.native.render_grid(),
            "box#2 @ 0,0 span 1x1\nbox#3 @ 1,0 span 1x1\nbox#4 @ 2,0 span 1x1"
        );

        b.remove(&*f.grid).unwrap();
        assert_eq!(f.grid.items().len(), 2);
        assert_eq!(f.grid.layout(), vec![cell(0, 0, 1, 1), cell(1, 0, 1, 1)]);
        assert_eq!(
            f.grid.insert_before(&b, &b),
            Err(ReconcileError::ChildNotFound)
        );
    }

    #[test]
    fn only_grid_items_are_accepted() {
        let f = fixture(2);
        let button: ElementRef = ButtonElement::new(&f.ctx, &Vec::new()).unwrap();
        assert_eq!(
            f.grid.append_child(&button),
            Err(ReconcileError::UnsupportedChild {
                container: ElementKind::Grid,
                child: ElementKind::Button,
            })
        );
        assert!(f.grid.items().is_empty());
    }

    #[test]
    fn defaults_reach_the_native_grid() {
        let f = fixture(4);
        assert_eq!(f.grid.columns(), 4);
        assert_eq!(f.native.property("column-homogeneous"), Some(true.into()));
        assert_eq!(f.native.property("row-homogeneous"), Some(false.into()));
        assert_eq!(f.native.property("column-spacing"), Some(0.into()));
    }

    #[test]
    fn float_columns_and_spacing_truncate() {
        let f = fixture(4);
        f.grid
            .update_props(&vec![set("columns", 2.9), set("rowSpacing", 6.0)])
            .unwrap();
        assert_eq!(f.grid.columns(), 2);
        assert_eq!(f.native.property("row-spacing"), Some(Value::Int(6)));
        assert!(f.ctx.diagnostics().is_empty());
    }
}
