//! Property mapper: an ordered case table of typed property handlers.
//!
//! Each element declares, once, which properties it understands, how to
//! validate them and how to push them into its native widget. The mapper
//! subscribes to the element's [`LifecycleController`] and replays every
//! incoming diff against that table:
//!
//! - the first cycle applies every case (absent ones receive `None`) so the
//!   native widget starts from a known baseline, unless
//!   [`PropertyMapper::skip_defaults`] was called;
//! - later cycles apply only the cases present in the diff;
//! - cases always run in table order, never in diff order;
//! - a cleanup returned by the previous apply runs before the next one;
//! - [`Redirect::instead`] re-applies another case with its current value.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::collections::OrderedMap;
use crate::diagnostics::Diagnostics;
use crate::error::{CallbackError, ReconcileError};
use crate::lifecycle::LifecycleController;

use super::diff::{DiffedProps, PropUpdate, Props};
use super::value::{DataType, Value};

/// What an apply callback returns: an optional cleanup for the next cycle.
pub type ApplyResult = Result<Option<Cleanup>, CallbackError>;

type ApplyFn = Box<dyn FnMut(Option<&Value>, &PropsReader, &mut Redirect) -> ApplyResult>;

// ---------------------------------------------------------------------------
// PropertyError
// ---------------------------------------------------------------------------

/// Locally recovered property failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The value did not pass the case's validator; nothing was applied.
    #[error("Invalid prop type. ({name}) Expected {expected}, received value: {received}")]
    InvalidType {
        name: String,
        expected: String,
        received: String,
    },
    /// The apply callback failed.
    #[error("Failed to apply a property update. ({name}) {source}")]
    Apply { name: String, source: CallbackError },
    /// A cleanup callback failed.
    #[error("Failed to clean up a property. ({name}) {source}")]
    Cleanup { name: String, source: CallbackError },
    /// A redirect named a property that has no case.
    #[error("Property ({from}) redirected to unknown property ({to})")]
    UnknownRedirect { from: String, to: String },
    /// A case was asked to apply while its own apply was still running.
    #[error("Property ({name}) is already being applied")]
    Reentrant { name: String },
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

/// Teardown returned by an apply callback, run before the next apply of the
/// same case or when the element is destroyed.
pub struct Cleanup(Box<dyn FnOnce() -> Result<(), CallbackError>>);

impl Cleanup {
    /// Create an infallible cleanup.
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Box::new(move || {
            f();
            Ok(())
        }))
    }

    /// Create a cleanup whose error is reported as a cleanup failure.
    pub fn fallible(f: impl FnOnce() -> Result<(), CallbackError> + 'static) -> Self {
        Self(Box::new(f))
    }

    fn run(self) -> Result<(), CallbackError> {
        (self.0)()
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cleanup(..)")
    }
}

// ---------------------------------------------------------------------------
// PropsReader / Redirect
// ---------------------------------------------------------------------------

/// Read-only view of the element's current, validated property values.
#[derive(Clone, Default)]
pub struct PropsReader {
    values: Rc<RefCell<Props>>,
}

impl PropsReader {
    /// Current value of `name`, or `None` when unset or never valid.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.borrow().get(name).cloned()
    }

    /// Whether `name` currently holds a value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.borrow().contains_key(name)
    }

    /// Typed accessors. `None` when the value is missing or of another type.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.as_bool())
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.as_int())
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.as_float())
    }

    pub fn get_str(&self, name: &str) -> Option<String> {
        self.get(name).and_then(|v| v.as_str().map(str::to_owned))
    }

    /// Copy of every current value, in table-update order.
    pub fn snapshot(&self) -> Props {
        self.values.borrow().clone()
    }
}

impl fmt::Debug for PropsReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropsReader({:?})", self.values.borrow())
    }
}

/// Handed to apply callbacks to request re-application of another case.
#[derive(Debug)]
pub struct Redirect {
    enabled: bool,
    targets: Vec<String>,
}

impl Redirect {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            targets: Vec::new(),
        }
    }

    /// Re-apply `name` with its current value once this apply returns.
    ///
    /// No-op if `name` was already updated or redirected in this cycle, and
    /// during the first-cycle defaults pass.
    pub fn instead(&mut self, name: &str) {
        if self.enabled {
            self.targets.push(name.to_owned());
        }
    }
}

// ---------------------------------------------------------------------------
// CaseCollector
// ---------------------------------------------------------------------------

struct PropertyCase {
    data_type: DataType,
    /// Taken out while the callback runs.
    apply: Option<ApplyFn>,
    cleanup: Option<Cleanup>,
}

/// Method-chain builder for property cases. Registration order is table order.
#[derive(Default)]
pub struct CaseCollector {
    cases: Vec<(String, PropertyCase)>,
}

impl CaseCollector {
    /// Create an empty case table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a case with full access to current props and redirects.
    pub fn case<F>(mut self, name: &str, data_type: DataType, apply: F) -> Self
    where
        F: FnMut(Option<&Value>, &PropsReader, &mut Redirect) -> ApplyResult + 'static,
    {
        self.cases.push((
            name.to_owned(),
            PropertyCase {
                data_type,
                apply: Some(Box::new(apply)),
                cleanup: None,
            },
        ));
        self
    }

    /// Register a case that only forwards the value and never needs cleanup.
    pub fn setter<F>(self, name: &str, data_type: DataType, mut apply: F) -> Self
    where
        F: FnMut(Option<&Value>) -> Result<(), CallbackError> + 'static,
    {
        self.case(name, data_type, move |value, _, _| {
            apply(value)?;
            Ok(None)
        })
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl fmt::Debug for CaseCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.cases.iter().map(|(name, _)| name))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// PropertyMapper
// ---------------------------------------------------------------------------

struct Cycle {
    /// Cases present in the diff, with their accepted value.
    updated: OrderedMap<String, Option<Value>>,
    redirected: HashSet<String>,
}

struct MapperInner {
    cases: RefCell<OrderedMap<String, PropertyCase>>,
    first_update: Cell<bool>,
    props: PropsReader,
    diagnostics: Diagnostics,
}

/// Applies diffs against an ordered case table.
#[derive(Clone)]
pub struct PropertyMapper {
    inner: Rc<MapperInner>,
}

impl PropertyMapper {
    /// Create an empty mapper wired to `lifecycle`.
    pub fn new(
        lifecycle: &LifecycleController,
        diagnostics: Diagnostics,
    ) -> Result<Self, ReconcileError> {
        let inner = Rc::new(MapperInner {
            cases: RefCell::new(OrderedMap::new()),
            first_update: Cell::new(true),
            props: PropsReader::default(),
            diagnostics,
        });

        let weak: Weak<MapperInner> = Rc::downgrade(&inner);
        lifecycle.on_update(move |diff| {
            if let Some(inner) = weak.upgrade() {
                inner.update(diff);
            }
            Ok(())
        })?;

        let weak = Rc::downgrade(&inner);
        lifecycle.before_destroy(move || {
            if let Some(inner) = weak.upgrade() {
                inner.cleanup_all();
            }
        })?;

        Ok(Self { inner })
    }

    /// Append the cases built by `build` to the table (builder).
    pub fn with_cases(self, build: impl FnOnce(CaseCollector) -> CaseCollector) -> Self {
        self.add_cases(build);
        self
    }

    /// Append the cases built by `build` to the table.
    ///
    /// Re-registering a name replaces its callback but keeps its slot.
    pub fn add_cases(&self, build: impl FnOnce(CaseCollector) -> CaseCollector) {
        let collected = build(CaseCollector::new());
        let mut cases = self.inner.cases.borrow_mut();
        for (name, case) in collected.cases {
            cases.set(name, case);
        }
    }

    /// Opt out of the first-cycle defaults pass.
    pub fn skip_defaults(&self) {
        self.inner.first_update.set(false);
    }

    /// Read-only view of the current values.
    pub fn current_props(&self) -> PropsReader {
        self.inner.props.clone()
    }

    /// Case names in table order.
    pub fn case_names(&self) -> Vec<String> {
        self.inner.cases.borrow().keys().cloned().collect()
    }
}

impl fmt::Debug for PropertyMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMapper")
            .field("cases", &self.case_names())
            .field("first_update", &self.inner.first_update.get())
            .finish()
    }
}

impl MapperInner {
    fn update(&self, diff: &DiffedProps) {
        let mut updated = OrderedMap::new();
        {
            let cases = self.cases.borrow();
            let mut values = self.props.values.borrow_mut();
            for (name, update) in diff {
                let Some(case) = cases.get(name.as_str()) else {
                    continue;
                };
                match update {
                    PropUpdate::Unset => {
                        values.remove(name.as_str());
                        updated.set(name.clone(), None);
                    }
                    PropUpdate::Set(value) if case.data_type.validate(value) => {
                        values.set(name.clone(), value.clone());
                        updated.set(name.clone(), Some(value.clone()));
                    }
                    PropUpdate::Set(value) => {
                        self.diagnostics.report(PropertyError::InvalidType {
                            name: name.clone(),
                            expected: case.data_type.to_string(),
                            received: format!("{value:?}"),
                        });
                    }
                }
            }
        }

        let first = self.first_update.replace(false);
        let order: Vec<String> = self.cases.borrow().keys().cloned().collect();
        let mut cycle = Cycle {
            updated,
            redirected: HashSet::new(),
        };

        for name in &order {
            if cycle.redirected.contains(name) {
                continue;
            }
            if let Some(value) = cycle.updated.get(name.as_str()).cloned() {
                self.apply_case(name, value.as_ref(), true, &mut cycle);
            } else if first {
                self.apply_case(name, None, false, &mut cycle);
            }
        }
    }

    fn apply_case(&self, name: &str, value: Option<&Value>, redirects: bool, cycle: &mut Cycle) {
        let taken = {
            let mut cases = self.cases.borrow_mut();
            let Some(case) = cases.get_mut(name) else {
                return;
            };
            case.apply.take().map(|apply| (apply, case.cleanup.take()))
        };
        let Some((mut apply, cleanup)) = taken else {
            self.diagnostics.report(PropertyError::Reentrant {
                name: name.to_owned(),
            });
            return;
        };

        if let Some(cleanup) = cleanup {
            self.run_cleanup(name, cleanup);
        }

        let mut redirect = Redirect::new(redirects);
        let next_cleanup = match apply(value, &self.props, &mut redirect) {
            Ok(cleanup) => cleanup,
            Err(source) => {
                self.diagnostics.report(PropertyError::Apply {
                    name: name.to_owned(),
                    source,
                });
                None
            }
        };

        // The table may have been torn down while the callback ran.
        let orphaned = {
            let mut cases = self.cases.borrow_mut();
            match cases.get_mut(name) {
                Some(case) => {
                    case.apply = Some(apply);
                    case.cleanup = next_cleanup;
                    None
                }
                None => next_cleanup,
            }
        };
        if let Some(cleanup) = orphaned {
            self.run_cleanup(name, cleanup);
        }

        for target in redirect.targets {
            if cycle.updated.contains_key(target.as_str()) || cycle.redirected.contains(&target) {
                continue;
            }
            if !self.cases.borrow().contains_key(target.as_str()) {
                self.diagnostics.report(PropertyError::UnknownRedirect {
                    from: name.to_owned(),
                    to: target,
                });
                continue;
            }
            cycle.redirected.insert(target.clone());
            let current = self.props.get(&target);
            self.apply_case(&target, current.as_ref(), true, cycle);
        }
    }

    fn run_cleanup(&self, name: &str, cleanup: Cleanup) {
        if let Err(source) = cleanup.run() {
            self.diagnostics.report(PropertyError::Cleanup {
                name: name.to_owned(),
                source,
            });
        }
    }

    fn cleanup_all(&self) {
        let cases: Vec<(String, PropertyCase)> = self.cases.borrow_mut().drain().collect();
        for (name, case) in cases {
            if let Some(cleanup) = case.cleanup {
                self.run_cleanup(&name, cleanup);
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;
    use crate::props::diff::{set, unset};
    use pretty_assertions::assert_eq;

    type Log = Rc<RefCell<Vec<String>>>;

    fn setup() -> (LifecycleController, PropertyMapper, Diagnostics) {
        let diagnostics = Diagnostics::default();
        let lifecycle = LifecycleController::new(diagnostics.clone());
        let mapper = PropertyMapper::new(&lifecycle, diagnostics.clone()).unwrap();
        (lifecycle, mapper, diagnostics)
    }

    /// Case that logs `name=value` on every apply.
    fn logging(log: &Log, names: &[&'static str]) -> impl FnOnce(CaseCollector) -> CaseCollector {
        let log = log.clone();
        let names = names.to_vec();
        move |mut cases| {
            for name in names {
                let log = log.clone();
                cases = cases.setter(name, DataType::Unknown, move |v| {
                    log.borrow_mut().push(format!("{name}={v:?}"));
                    Ok(())
                });
            }
            cases
        }
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn first_update_applies_every_default_once() {
        let (lc, mapper, _) = setup();
        let log = Log::default();
        mapper.add_cases(logging(&log, &["a", "b", "c"]));

        lc.emit_update(&DiffedProps::new()).unwrap();
        assert_eq!(take(&log), vec!["a=None", "b=None", "c=None"]);

        lc.emit_update(&DiffedProps::new()).unwrap();
        assert!(take(&log).is_empty());
    }

    #[test]
    fn first_update_mixes_values_and_defaults() {
        let (lc, mapper, _) = setup();
        let log = Log::default();
        mapper.add_cases(logging(&log, &["a", "b"]));

        lc.emit_update(&vec![set("b", 2)]).unwrap();
        assert_eq!(take(&log), vec!["a=None", "b=Some(2)"]);
    }

    #[test]
    fn applies_in_table_order_not_diff_order() {
        let (lc, mapper, _) = setup();
        let log = Log::default();
        mapper.add_cases(logging(&log, &["a", "b", "c"]));
        lc.emit_update(&DiffedProps::new()).unwrap();
        take(&log);

        lc.emit_update(&vec![set("c", 3), set("a", 1)]).unwrap();
        assert_eq!(take(&log), vec!["a=Some(1)", "c=Some(3)"]);
    }

    #[test]
    fn unknown_props_are_ignored() {
        let (lc, mapper, diagnostics) = setup();
        let log = Log::default();
        mapper.add_cases(logging(&log, &["a"]));
        mapper.skip_defaults();

        lc.emit_update(&vec![set("onClick", 1), set("a", 1)]).unwrap();
        assert_eq!(take(&log), vec!["a=Some(1)"]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn unset_applies_none_and_clears_value() {
        let (lc, mapper, _) = setup();
        let log = Log::default();
        mapper.add_cases(logging(&log, &["a"]));
        lc.emit_update(&vec![set("a", 1)]).unwrap();
        take(&log);
        assert_eq!(mapper.current_props().get_int("a"), Some(1));

        lc.emit_update(&vec![unset("a")]).unwrap();
        assert_eq!(take(&log), vec!["a=None"]);
        assert!(!mapper.current_props().contains("a"));
    }

    #[test]
    fn invalid_value_is_rejected_and_state_kept() {
        let (lc, mapper, diagnostics) = setup();
        let log = Log::default();
        let sink = log.clone();
        mapper.add_cases(move |cases| {
            cases.setter("label", DataType::String, move |v| {
                sink.borrow_mut().push(format!("label={v:?}"));
                Ok(())
            })
        });
        lc.emit_update(&vec![set("label", "ok")]).unwrap();
        take(&log);

        lc.emit_update(&vec![set("label", 5)]).unwrap();
        assert!(take(&log).is_empty());
        assert_eq!(mapper.current_props().get_str("label"), Some("ok".to_owned()));
        assert_eq!(
            diagnostics.drain(),
            vec![Diagnostic::Property(PropertyError::InvalidType {
                name: "label".to_owned(),
                expected: "string".to_owned(),
                received: "5".to_owned(),
            })]
        );
    }

    #[test]
    fn previous_cleanup_runs_before_reapply() {
        let (lc, mapper, _) = setup();
        let log = Log::default();
        let sink = log.clone();
        mapper.add_cases(move |cases| {
            cases.case("a", DataType::Int, move |v, _, _| {
                let n = v.and_then(Value::as_int).unwrap_or(0);
                sink.borrow_mut().push(format!("apply {n}"));
                let sink = sink.clone();
                Ok(Some(Cleanup::new(move || {
                    sink.borrow_mut().push(format!("cleanup {n}"))
                })))
            })
        });

        lc.emit_update(&vec![set("a", 1)]).unwrap();
        lc.emit_update(&vec![set("a", 2)]).unwrap();
        assert_eq!(take(&log), vec!["apply 1", "cleanup 1", "apply 2"]);
    }

    #[test]
    fn destroy_runs_remaining_cleanups_in_table_order() {
        let (lc, mapper, _) = setup();
        let log = Log::default();
        let (l1, l2) = (log.clone(), log.clone());
        mapper.add_cases(move |cases| {
            cases
                .case("a", DataType::Unknown, move |_, _, _| {
                    let l1 = l1.clone();
                    Ok(Some(Cleanup::new(move || l1.borrow_mut().push("a".into()))))
                })
                .case("b", DataType::Unknown, move |_, _, _| {
                    let l2 = l2.clone();
                    Ok(Some(Cleanup::new(move || l2.borrow_mut().push("b".into()))))
                })
        });
        lc.emit_update(&DiffedProps::new()).unwrap();

        lc.emit_before_destroy().unwrap();
        assert_eq!(take(&log), vec!["a", "b"]);
        assert!(mapper.case_names().is_empty());
    }

    #[test]
    fn redirect_skips_case_already_updated_this_cycle() {
        let (lc, mapper, _) = setup();
        let log = Log::default();
        let (la, lb) = (log.clone(), log.clone());
        mapper.add_cases(move |cases| {
            cases
                .case("a", DataType::Unknown, move |_, _, redirect| {
                    la.borrow_mut().push("a".into());
                    redirect.instead("b");
                    Ok(None)
                })
                .case("b", DataType::Unknown, move |_, _, _| {
                    lb.borrow_mut().push("b".into());
                    Ok(None)
                })
        });
        mapper.skip_defaults();

        lc.emit_update(&vec![set("b", 1), set("a", 1)]).unwrap();
        assert_eq!(take(&log), vec!["a", "b"]);
    }

    #[test]
    fn redirect_reapplies_current_value() {
        let (lc, mapper, _) = setup();
        let log = Log::default();
        let (la, lb) = (log.clone(), log.clone());
        mapper.add_cases(move |cases| {
            cases
                .case("margin", DataType::Unknown, move |v, _, _| {
                    la.borrow_mut().push(format!("margin={v:?}"));
                    Ok(None)
                })
                .case("align", DataType::Unknown, move |_, _, redirect| {
                    lb.borrow_mut().push("align".into());
                    redirect.instead("margin");
                    Ok(None)
                })
        });
        lc.emit_update(&vec![set("margin", 4)]).unwrap();
        take(&log);

        lc.emit_update(&vec![set("align", "end")]).unwrap();
        assert_eq!(take(&log), vec!["align", "margin=Some(4)"]);
    }

    #[test]
    fn mutual_redirects_terminate() {
        let (lc, mapper, _) = setup();
        let log = Log::default();
        let (la, lb, lc_) = (log.clone(), log.clone(), log.clone());
        mapper.add_cases(move |cases| {
            cases
                .case("a", DataType::Unknown, move |_, _, r| {
                    la.borrow_mut().push("a".into());
                    r.instead("b");
                    Ok(None)
                })
                .case("b", DataType::Unknown, move |_, _, r| {
                    lb.borrow_mut().push("b".into());
                    r.instead("c");
                    Ok(None)
                })
                .case("c", DataType::Unknown, move |_, _, r| {
                    lc_.borrow_mut().push("c".into());
                    r.instead("b");
                    Ok(None)
                })
        });
        mapper.skip_defaults();

        lc.emit_update(&vec![set("a", 1)]).unwrap();
        assert_eq!(take(&log), vec!["a", "b", "c"]);
    }

    #[test]
    fn redirects_are_inert_during_defaults_pass() {
        let (lc, mapper, _) = setup();
        let log = Log::default();
        let (la, lb) = (log.clone(), log.clone());
        mapper.add_cases(move |cases| {
            cases
                .case("a", DataType::Unknown, move |_, _, r| {
                    la.borrow_mut().push("a".into());
                    r.instead("b");
                    Ok(None)
                })
                .case("b", DataType::Unknown, move |_, _, _| {
                    lb.borrow_mut().push("b".into());
                    Ok(None)
                })
        });

        lc.emit_update(&DiffedProps::new()).unwrap();
        assert_eq!(take(&log), vec!["a", "b"]);
    }

    #[test]
    fn unknown_redirect_is_reported() {
        let (lc, mapper, diagnostics) = setup();
        mapper.add_cases(|cases| {
            cases.case("a", DataType::Unknown, |_, _, r| {
                r.instead("nope");
                Ok(None)
            })
        });
        mapper.skip_defaults();

        lc.emit_update(&vec![set("a", 1)]).unwrap();
        assert_eq!(
            diagnostics.drain(),
            vec![Diagnostic::Property(PropertyError::UnknownRedirect {
                from: "a".into(),
                to: "nope".into(),
            })]
        );
    }

    #[test]
    fn apply_error_does_not_abort_cycle() {
        let (lc, mapper, diagnostics) = setup();
        let log = Log::default();
        let sink = log.clone();
        mapper.add_cases(move |cases| {
            cases
                .setter("a", DataType::Unknown, |_| Err(CallbackError::new("broken")))
                .setter("b", DataType::Unknown, move |_| {
                    sink.borrow_mut().push("b".into());
                    Ok(())
                })
        });

        lc.emit_update(&DiffedProps::new()).unwrap();
        assert_eq!(take(&log), vec!["b"]);
        assert_eq!(
            diagnostics.drain(),
            vec![Diagnostic::Property(PropertyError::Apply {
                name: "a".into(),
                source: CallbackError::new("broken"),
            })]
        );
    }

    #[test]
    fn skip_defaults_only_applies_diff() {
        let (lc, mapper, _) = setup();
        let log = Log::default();
        mapper.add_cases(logging(&log, &["a", "b"]));
        mapper.skip_defaults();

        lc.emit_update(&vec![set("b", true)]).unwrap();
        assert_eq!(take(&log), vec!["b=Some(true)"]);
    }

    #[test]
    fn apply_sees_current_props() {
        let (lc, mapper, _) = setup();
        let seen = Rc::new(RefCell::new(None));
        let slot = seen.clone();
        mapper.add_cases(move |cases| {
            cases
                .setter("columns", DataType::Int, |_| Ok(()))
                .case("spacing", DataType::Int, move |_, props, _| {
                    *slot.borrow_mut() = props.get_int("columns");
                    Ok(None)
                })
        });

        lc.emit_update(&vec![set("spacing", 2), set("columns", 3)]).unwrap();
        assert_eq!(*seen.borrow(), Some(3));
    }

    #[test]
    fn reentrant_update_from_apply_is_reported_not_recursed() {
        let (lc, mapper, diagnostics) = setup();
        let inner = lc.clone();
        mapper.add_cases(move |cases| {
            cases.setter("a", DataType::Unknown, move |_| {
                inner.emit_update(&vec![set("a", 2)])?;
                Ok(())
            })
        });
        mapper.skip_defaults();

        lc.emit_update(&vec![set("a", 1)]).unwrap();
        assert_eq!(
            diagnostics.drain(),
            vec![Diagnostic::Property(PropertyError::Reentrant { name: "a".into() })]
        );
        assert_eq!(mapper.current_props().get_int("a"), Some(2));
    }

    #[test]
    fn re_registering_keeps_slot() {
        let (_, mapper, _) = setup();
        mapper.add_cases(|c| {
            c.setter("a", DataType::Unknown, |_| Ok(()))
                .setter("b", DataType::Unknown, |_| Ok(()))
        });
        mapper.add_cases(|c| c.setter("a", DataType::Bool, |_| Ok(())));
        assert_eq!(mapper.case_names(), vec!["a", "b"]);
    }
}
