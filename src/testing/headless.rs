//! Headless native toolkit that records every call.
//!
//! [`HeadlessWidget`] keeps properties, an ordered child list, grid
//! attachments and live signal connections in memory, and logs each native
//! call so tests can assert on what the reconciler did to the widget graph.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::SlotMap;

use crate::collections::OrderedMap;
use crate::layout::GridCell;
use crate::native::{
    same_widget, ConnectionId, NativeError, NativeToolkit, NativeWidget, SignalCallback,
    SignalEmission, WidgetClass, WidgetHandle,
};
use crate::props::Value;

/// Name of a widget as recorded in call logs.
fn widget_name(widget: &WidgetHandle) -> String {
    widget
        .property("name")
        .and_then(|name| name.as_str().map(str::to_owned))
        .unwrap_or_else(|| format!("{:?}", widget.class()).to_lowercase())
}

// ---------------------------------------------------------------------------
// HeadlessWidget
// ---------------------------------------------------------------------------

struct Connection {
    signal: String,
    callback: SignalCallback,
    seq: u64,
}

#[derive(Default)]
struct WidgetState {
    properties: OrderedMap<String, Value>,
    connections: SlotMap<ConnectionId, Connection>,
    next_seq: u64,
    children: Vec<WidgetHandle>,
    attachments: Vec<(WidgetHandle, GridCell)>,
    calls: Vec<String>,
    show_all_count: usize,
    destroyed: bool,
}

/// In-memory native widget.
pub struct HeadlessWidget {
    class: WidgetClass,
    this: Weak<HeadlessWidget>,
    state: RefCell<WidgetState>,
}

impl HeadlessWidget {
    /// Create a widget named after its class.
    pub fn new(class: WidgetClass) -> Rc<Self> {
        Self::named(class, &format!("{class:?}").to_lowercase())
    }

    /// Create a widget with the given `name` property.
    pub fn named(class: WidgetClass, name: &str) -> Rc<Self> {
        let mut state = WidgetState::default();
        state.properties.set("name".to_owned(), Value::from(name));
        Rc::new_cyclic(|this| Self {
            class,
            this: this.clone(),
            state: RefCell::new(state),
        })
    }

    /// The `name` property.
    pub fn name(&self) -> String {
        self.state
            .borrow()
            .properties
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    }

    /// Emit `signal` with `args`, calling connected callbacks in connection
    /// order until one returns `true`. Returns whether propagation stopped.
    pub fn emit(&self, signal: &str, args: Vec<Value>) -> bool {
        let Some(target) = self.this.upgrade() else {
            return false;
        };
        let mut callbacks: Vec<(u64, SignalCallback)> = self
            .state
            .borrow()
            .connections
            .values()
            .filter(|connection| connection.signal == signal)
            .map(|connection| (connection.seq, connection.callback.clone()))
            .collect();
        callbacks.sort_by_key(|(seq, _)| *seq);

        let emission = SignalEmission::new(target, args);
        callbacks.into_iter().any(|(_, callback)| callback(&emission))
    }

    /// Live connections.
    pub fn connection_count(&self) -> usize {
        self.state.borrow().connections.len()
    }

    /// Live connections for `signal`.
    pub fn connections_for(&self, signal: &str) -> usize {
        self.state
            .borrow()
            .connections
            .values()
            .filter(|connection| connection.signal == signal)
            .count()
    }

    /// Every recorded call, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Native children in native order.
    pub fn children(&self) -> Vec<WidgetHandle> {
        self.state.borrow().children.clone()
    }

    /// Names of the native children in native order.
    pub fn child_names(&self) -> Vec<String> {
        self.children().iter().map(widget_name).collect()
    }

    /// Grid attachments in attach order.
    pub fn attachments(&self) -> Vec<(String, GridCell)> {
        self.state
            .borrow()
            .attachments
            .iter()
            .map(|(child, cell)| (widget_name(child), *cell))
            .collect()
    }

    /// One line per grid attachment: `name @ x,y span columns x rows`.
    pub fn render_grid(&self) -> String {
        self.attachments()
            .iter()
            .map(|(name, cell)| {
                format!(
                    "{name} @ {},{} span {}x{}",
                    cell.x, cell.y, cell.column_span, cell.row_span
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// How many times `show_all` was called.
    pub fn show_all_count(&self) -> usize {
        self.state.borrow().show_all_count
    }

    /// Whether `destroy` was called.
    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }

    fn ensure_alive(&self) -> Result<(), NativeError> {
        if self.is_destroyed() {
            Err(NativeError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn ensure_container(&self, operation: &'static str) -> Result<(), NativeError> {
        self.ensure_alive()?;
        match self.class {
            WidgetClass::Grid => Err(NativeError::Unsupported { operation }),
            _ => Ok(()),
        }
    }

    fn ensure_grid(&self, operation: &'static str) -> Result<(), NativeError> {
        self.ensure_alive()?;
        match self.class {
            WidgetClass::Grid => Ok(()),
            _ => Err(NativeError::Unsupported { operation }),
        }
    }

    fn child_position(&self, child: &WidgetHandle) -> Option<usize> {
        self.state
            .borrow()
            .children
            .iter()
            .position(|c| same_widget(c, child))
    }
}

impl NativeWidget for HeadlessWidget {
    fn class(&self) -> WidgetClass {
        self.class
    }

    fn set_property(&self, name: &str, value: Value) -> Result<(), NativeError> {
        self.ensure_alive()?;
        self.record(format!("set {name} = {value:?}"));
        self.state
            .borrow_mut()
            .properties
            .set(name.to_owned(), value);
        Ok(())
    }

    fn clear_property(&self, name: &str) -> Result<(), NativeError> {
        self.ensure_alive()?;
        self.record(format!("clear {name}"));
        self.state.borrow_mut().properties.remove(name);
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.state.borrow().properties.get(name).cloned()
    }

    fn connect(&self, signal: &str, callback: SignalCallback) -> ConnectionId {
        self.record(format!("connect {signal}"));
        let mut state = self.state.borrow_mut();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.connections.insert(Connection {
            signal: signal.to_owned(),
            callback,
            seq,
        })
    }

    fn disconnect(&self, id: ConnectionId) -> Result<(), NativeError> {
        let removed = self.state.borrow_mut().connections.remove(id);
        match removed {
            Some(connection) => {
                self.record(format!("disconnect {}", connection.signal));
                Ok(())
            }
            None => Err(NativeError::UnknownConnection),
        }
    }

    fn add(&self, child: &WidgetHandle) -> Result<(), NativeError> {
        self.ensure_container("add")?;
        self.record(format!("add {}", widget_name(child)));
        if self.child_position(child).is_none() {
            self.state.borrow_mut().children.push(child.clone());
        }
        Ok(())
    }

    fn remove(&self, child: &WidgetHandle) -> Result<(), NativeError> {
        self.ensure_container("remove")?;
        let position = self.child_position(child).ok_or(NativeError::NotAChild)?;
        self.record(format!("remove {}", widget_name(child)));
        self.state.borrow_mut().children.remove(position);
        Ok(())
    }

    fn reorder(&self, child: &WidgetHandle, position: usize) -> Result<(), NativeError> {
        self.ensure_container("reorder")?;
        let current = self.child_position(child).ok_or(NativeError::NotAChild)?;
        self.record(format!("reorder {} -> {position}", widget_name(child)));
        let mut state = self.state.borrow_mut();
        let widget = state.children.remove(current);
        let position = position.min(state.children.len());
        state.children.insert(position, widget);
        Ok(())
    }

    fn attach(&self, child: &WidgetHandle, cell: GridCell) -> Result<(), NativeError> {
        self.ensure_grid("attach")?;
        self.record(format!(
            "attach {} @ {},{} span {}x{}",
            widget_name(child),
            cell.x,
            cell.y,
            cell.column_span,
            cell.row_span
        ));
        let mut state = self.state.borrow_mut();
        state.attachments.retain(|(c, _)| !same_widget(c, child));
        state.attachments.push((child.clone(), cell));
        Ok(())
    }

    fn remove_column(&self, column: usize) -> Result<(), NativeError> {
        self.ensure_grid("remove_column")?;
        self.record(format!("remove_column {column}"));
        let mut state = self.state.borrow_mut();
        state.attachments.retain_mut(|(_, cell)| {
            let spans_column = cell.x <= column && column < cell.x + cell.column_span;
            if spans_column {
                if cell.column_span == 1 {
                    return false;
                }
                cell.column_span -= 1;
            } else if cell.x > column {
                cell.x -= 1;
            }
            true
        });
        Ok(())
    }

    fn show_all(&self) {
        self.record("show_all".to_owned());
        self.state.borrow_mut().show_all_count += 1;
    }

    fn destroy(&self) {
        self.record("destroy".to_owned());
        let mut state = self.state.borrow_mut();
        state.destroyed = true;
        state.connections.clear();
        state.children.clear();
        state.attachments.clear();
    }
}

impl fmt::Debug for HeadlessWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HeadlessWidget")
            .field("class", &self.class)
            .field("properties", &state.properties)
            .field("children", &state.children.len())
            .field("connections", &state.connections.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// HeadlessToolkit
// ---------------------------------------------------------------------------

/// Toolkit creating [`HeadlessWidget`]s named `class#n`.
#[derive(Default)]
pub struct HeadlessToolkit {
    widgets: RefCell<Vec<Rc<HeadlessWidget>>>,
    counter: Cell<usize>,
}

impl HeadlessToolkit {
    /// Create a toolkit with no widgets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every widget created so far, in creation order.
    pub fn widgets(&self) -> Vec<Rc<HeadlessWidget>> {
        self.widgets.borrow().clone()
    }

    /// The headless widget behind `handle`, if this toolkit created it.
    pub fn find(&self, handle: &WidgetHandle) -> Option<Rc<HeadlessWidget>> {
        self.widgets
            .borrow()
            .iter()
            .find(|widget| {
                let candidate: WidgetHandle = Rc::clone(widget) as WidgetHandle;
                same_widget(&candidate, handle)
            })
            .cloned()
    }

    /// Widgets of `class`, in creation order.
    pub fn widgets_of(&self, class: WidgetClass) -> Vec<Rc<HeadlessWidget>> {
        self.widgets
            .borrow()
            .iter()
            .filter(|widget| widget.class == class)
            .cloned()
            .collect()
    }
}

impl NativeToolkit for HeadlessToolkit {
    fn create_widget(&self, class: WidgetClass) -> WidgetHandle {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        let widget = HeadlessWidget::named(class, &format!("{class:?}#{n}").to_lowercase());
        self.widgets.borrow_mut().push(widget.clone());
        widget
    }
}

impl fmt::Debug for HeadlessToolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessToolkit")
            .field("widgets", &self.widgets.borrow().len())
            .finish()
    }
}
