//! Dynamically typed property values and their validators.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::collections::OrderedMap;
use crate::event::EventHandler;
use crate::native::{same_widget, WidgetHandle};

/// String-keyed ordered record, used for structured native event payloads
/// and record-shaped props.
pub type Record = OrderedMap<String, Value>;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A declared property value.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Record(Record),
    /// A callable event handler.
    Handler(EventHandler),
    /// A native widget reference.
    Widget(WidgetHandle),
    /// Anything else the application wants to pass through.
    Opaque(Rc<dyn Any>),
}

impl Value {
    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Record(_) => "record",
            Self::Handler(_) => "function",
            Self::Widget(_) => "widget",
            Self::Opaque(_) => "opaque",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Numeric view truncated toward zero. Out-of-range floats saturate and
    /// NaN becomes `0`.
    pub fn as_truncated_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => Some(v.trunc() as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Self::Handler(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_widget(&self) -> Option<&WidgetHandle> {
        match self {
            Self::Widget(v) => Some(v),
            _ => None,
        }
    }

    /// Downcast an opaque value.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Opaque(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a.ptr_eq(b),
            (Self::Widget(a), Self::Widget(b)) => same_widget(a, b),
            (Self::Opaque(a), Self::Opaque(b)) => {
                std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Str(v) => write!(f, "{v:?}"),
            Self::List(v) => f.debug_list().entries(v).finish(),
            Self::Record(v) => write!(f, "{v:?}"),
            Self::Handler(_) => write!(f, "<function>"),
            Self::Widget(w) => write!(f, "<widget {:?}>", w.class()),
            Self::Opaque(_) => write!(f, "<opaque>"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl From<EventHandler> for Value {
    fn from(v: EventHandler) -> Self {
        Self::Handler(v)
    }
}

impl From<WidgetHandle> for Value {
    fn from(v: WidgetHandle) -> Self {
        Self::Widget(v)
    }
}

// ---------------------------------------------------------------------------
// DataType
// ---------------------------------------------------------------------------

/// Type validator attached to each property case.
#[derive(Clone)]
pub enum DataType {
    /// Accepts anything.
    Unknown,
    Bool,
    /// Integers only.
    Int,
    /// Integers or floats.
    Number,
    String,
    /// A string from a fixed set of variants.
    Enum(&'static [&'static str]),
    Function,
    Widget,
    Record,
    /// A list whose every item matches the inner type.
    ListOf(Box<DataType>),
    /// Any of the listed types.
    OneOf(Vec<DataType>),
    /// A named predicate.
    Custom(&'static str, fn(&Value) -> bool),
}

impl DataType {
    /// Whether `value` is acceptable for this type.
    pub fn validate(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Unknown, _) => true,
            (Self::Bool, Value::Bool(_)) => true,
            (Self::Int, Value::Int(_)) => true,
            (Self::Number, Value::Int(_) | Value::Float(_)) => true,
            (Self::String, Value::Str(_)) => true,
            (Self::Enum(variants), Value::Str(s)) => variants.contains(&s.as_str()),
            (Self::Function, Value::Handler(_)) => true,
            (Self::Widget, Value::Widget(_)) => true,
            (Self::Record, Value::Record(_)) => true,
            (Self::ListOf(item), Value::List(items)) => items.iter().all(|v| item.validate(v)),
            (Self::OneOf(types), v) => types.iter().any(|t| t.validate(v)),
            (Self::Custom(_, predicate), v) => predicate(v),
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::Enum(variants) => write!(f, "enum({})", variants.join(" | ")),
            Self::Function => write!(f, "function"),
            Self::Widget => write!(f, "widget"),
            Self::Record => write!(f, "record"),
            Self::ListOf(item) => write!(f, "list<{item}>"),
            Self::OneOf(types) => {
                let names: Vec<String> = types.iter().map(ToString::to_string).collect();
                write!(f, "{}", names.join(" | "))
            }
            Self::Custom(name, _) => write!(f, "{name}"),
        }
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({self})")
    }
}
