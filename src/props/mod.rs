//! Property values, diffs and the property mapper.

pub mod diff;
pub mod factories;
pub mod mapper;
pub mod value;

pub use diff::{diff_props, initial_diff, set, unset, DiffedProps, PropUpdate, Props};
pub use mapper::{
    ApplyResult, CaseCollector, Cleanup, PropertyError, PropertyMapper, PropsReader, Redirect,
};
pub use value::{DataType, Record, Value};
