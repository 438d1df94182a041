//! Reusable property-case groups shared by many element kinds.

use crate::error::CallbackError;
use crate::native::WidgetHandle;

use super::mapper::CaseCollector;
use super::value::{DataType, Value};

/// Native alignment variants.
pub const ALIGN: &[&str] = &["fill", "start", "end", "center", "baseline"];

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Defaults applied when an alignment prop is absent or unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignDefaults {
    pub horizontal: &'static str,
    pub vertical: &'static str,
}

impl Default for AlignDefaults {
    fn default() -> Self {
        Self {
            horizontal: "center",
            vertical: "start",
        }
    }
}

/// `horizontalAlign` / `verticalAlign` → native `halign` / `valign`.
pub fn alignment_cases(widget: WidgetHandle) -> impl FnOnce(CaseCollector) -> CaseCollector {
    alignment_cases_with(widget, AlignDefaults::default())
}

/// Alignment cases with element-specific defaults.
pub fn alignment_cases_with(
    widget: WidgetHandle,
    defaults: AlignDefaults,
) -> impl FnOnce(CaseCollector) -> CaseCollector {
    move |cases| {
        let h = widget.clone();
        let v = widget;
        cases
            .setter("horizontalAlign", DataType::Enum(ALIGN), move |value| {
                let align = value.and_then(Value::as_str).unwrap_or(defaults.horizontal);
                h.set_property("halign", align.into())?;
                Ok(())
            })
            .setter("verticalAlign", DataType::Enum(ALIGN), move |value| {
                let align = value.and_then(Value::as_str).unwrap_or(defaults.vertical);
                v.set_property("valign", align.into())?;
                Ok(())
            })
    }
}

// ---------------------------------------------------------------------------
// Margin
// ---------------------------------------------------------------------------

/// Resolved per-side margin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl ElementMargin {
    /// Parse `n`, `[vertical, horizontal]` or `[top, right, bottom, left]`.
    pub fn parse(value: &Value) -> Result<Self, CallbackError> {
        if let Some(all) = value.as_float() {
            return Ok(Self {
                top: all,
                right: all,
                bottom: all,
                left: all,
            });
        }
        let sides: Option<Vec<f64>> = value
            .as_list()
            .and_then(|items| items.iter().map(Value::as_float).collect());
        match sides.as_deref() {
            Some([v, h]) => Ok(Self {
                top: *v,
                right: *h,
                bottom: *v,
                left: *h,
            }),
            Some([top, right, bottom, left]) => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(CallbackError::new(format!(
                "margin must be a number or a list of 2 or 4 numbers, got {value:?}"
            ))),
        }
    }
}

/// Validator accepted by the `margin` case. Malformed lists are rejected here
/// so they never reach the stored props.
pub fn margin_type() -> DataType {
    DataType::Custom("number | [v, h] | [t, r, b, l]", |value| {
        ElementMargin::parse(value).is_ok()
    })
}

/// `margin` → native `margin-top` / `margin-end` / `margin-bottom` / `margin-start`.
pub fn margin_cases(widget: WidgetHandle) -> impl FnOnce(CaseCollector) -> CaseCollector {
    move |cases| {
        cases.setter("margin", margin_type(), move |value| {
            let margin = match value {
                Some(v) => ElementMargin::parse(v)?,
                None => ElementMargin::default(),
            };
            widget.set_property("margin-top", margin.top.into())?;
            widget.set_property("margin-end", margin.right.into())?;
            widget.set_property("margin-bottom", margin.bottom.into())?;
            widget.set_property("margin-start", margin.left.into())?;
            Ok(())
        })
    }
}
