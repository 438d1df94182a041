//! Element lifecycle: construct, mount, update, destroy.
//!
//! Every element owns one [`LifecycleController`]. The property mapper, the
//! event binder and the child controllers subscribe to it independently, so
//! the element itself only ever emits lifecycle events and never needs to
//! know which extenders it has.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{CallbackError, ReconcileError};
use crate::props::DiffedProps;

type UpdateSubscriber = Rc<dyn Fn(&DiffedProps) -> Result<(), CallbackError>>;
type Hook = Box<dyn FnOnce()>;

// ---------------------------------------------------------------------------
// LifecycleState
// ---------------------------------------------------------------------------

/// States of an element's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructor wiring in progress; the initial diff may already be applied.
    Constructing,
    /// Fully created and idle.
    Mounted,
    /// A diff is being fanned out. Updates may nest.
    Updating,
    /// Terminal.
    Destroyed,
}

// ---------------------------------------------------------------------------
// LifecycleController
// ---------------------------------------------------------------------------

struct Inner {
    state: LifecycleState,
    created: bool,
    /// Nesting depth of `emit_update` calls.
    depth: usize,
    update: Vec<UpdateSubscriber>,
    after_create: Vec<Hook>,
    before_destroy: Vec<Hook>,
}

/// Lifecycle state machine with subscription points.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct LifecycleController {
    inner: Rc<RefCell<Inner>>,
    diagnostics: Diagnostics,
}

impl LifecycleController {
    /// Create a controller in the `Constructing` state.
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                state: LifecycleState::Constructing,
                created: false,
                depth: 0,
                update: Vec::new(),
                after_create: Vec::new(),
                before_destroy: Vec::new(),
            })),
            diagnostics,
        }
    }

    /// Current state.
    /// Current state.
    pub fn state(&self) -> LifecycleState {
        self.inner.borrow().state
    }

    /// Whether `emit_before_destroy` has run. Every later call fails with
    /// [`ReconcileError::Destroyed`].
    pub fn is_destroyed(&self) -> bool {
        self.state() == LifecycleState::Destroyed
    }

    fn ensure_alive(&self, operation: &'static str) -> Result<(), ReconcileError> {
        if self.is_destroyed() {
            Err(ReconcileError::Destroyed { operation })
        } else {
            Ok(())
        }
    }

    /// Register a callback run on every diff, after the ones registered before it.
    pub fn on_update<F>(&self, callback: F) -> Result<(), ReconcileError>
    where
        F: Fn(&DiffedProps) -> Result<(), CallbackError> + 'static,
    {
        self.ensure_alive("on_update")?;
        self.inner.borrow_mut().update.push(Rc::new(callback));
        Ok(())
    }

    /// Register a first-paint hook.
    ///
    /// Hooks registered after creation never run.
    pub fn after_create<F>(&self, callback: F) -> Result<(), ReconcileError>
    where
        F: FnOnce() + 'static,
    {
        self.ensure_alive("after_create")?;
        self.inner.borrow_mut().after_create.push(Box::new(callback));
        Ok(())
    }

    /// Register a cleanup run when the element is destroyed.
    pub fn before_destroy<F>(&self, callback: F) -> Result<(), ReconcileError>
    where
        F: FnOnce() + 'static,
    {
        self.ensure_alive("before_destroy")?;
        self.inner.borrow_mut().before_destroy.push(Box::new(callback));
        Ok(())
    }

    /// Mark constructor wiring as finished and run the first-paint hooks.
    pub fn emit_after_create(&self) -> Result<(), ReconcileError> {
        self.ensure_alive("emit_after_create")?;
        let hooks = {
            let mut inner = self.inner.borrow_mut();
            if inner.created {
                return Err(ReconcileError::AlreadyCreated);
            }
            inner.created = true;
            if inner.depth == 0 {
                inner.state = LifecycleState::Mounted;
            }
            std::mem::take(&mut inner.after_create)
        };
        for hook in hooks {
            hook();
        }
        Ok(())
    }

    /// Fan a diff out to every update subscriber, in registration order.
    ///
    /// A subscriber error is reported and the remaining subscribers still run.
    /// Subscribers may call `emit_update` again.
    pub fn emit_update(&self, diff: &DiffedProps) -> Result<(), ReconcileError> {
        self.ensure_alive("emit_update")?;
        let subscribers = {
            let mut inner = self.inner.borrow_mut();
            inner.depth += 1;
            inner.state = LifecycleState::Updating;
            inner.update.clone()
        };

        for subscriber in subscribers {
            if let Err(err) = subscriber(diff) {
                self.diagnostics.report(Diagnostic::Subscriber(err));
            }
        }

        let mut inner = self.inner.borrow_mut();
        inner.depth -= 1;
        if inner.depth == 0 && inner.state != LifecycleState::Destroyed {
            inner.state = if inner.created {
                LifecycleState::Mounted
            } else {
                LifecycleState::Constructing
            };
        }
        Ok(())
    }

    /// Run every cleanup in registration order, then enter `Destroyed`.
    pub fn emit_before_destroy(&self) -> Result<(), ReconcileError> {
        self.ensure_alive("emit_before_destroy")?;
        let cleanups = {
            let mut inner = self.inner.borrow_mut();
            inner.update.clear();
            inner.after_create.clear();
            std::mem::take(&mut inner.before_destroy)
        };
        for cleanup in cleanups {
            cleanup();
        }
        self.inner.borrow_mut().state = LifecycleState::Destroyed;
        Ok(())
    }
}

impl fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LifecycleController")
            .field("state", &inner.state)
            .field("update_subscribers", &inner.update.len())
            .field("before_destroy", &inner.before_destroy.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::diff::set;
    use std::cell::{Cell, RefCell};

    fn controller() -> LifecycleController {
        LifecycleController::new(Diagnostics::default())
    }

    #[test]
    fn starts_constructing() {
        assert_eq!(controller().state(), LifecycleState::Constructing);
    }

    #[test]
    fn update_subscribers_run_in_registration_order() {
        let lc = controller();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["mapper", "handlers", "children"] {
            let log = log.clone();
            lc.on_update(move |_| {
                log.borrow_mut().push(name);
                Ok(())
            })
            .unwrap();
        }
        lc.emit_update(&vec![set("a", 1)]).unwrap();
        assert_eq!(*log.borrow(), vec!["mapper", "handlers", "children"]);
    }

    #[test]
    fn failing_subscriber_does_not_block_others() {
        let diagnostics = Diagnostics::default();
        let lc = LifecycleController::new(diagnostics.clone());
        let ran = Rc::new(Cell::new(false));
        lc.on_update(|_| Err(CallbackError::new("boom"))).unwrap();
        let flag = ran.clone();
        lc.on_update(move |_| {
            flag.set(true);
            Ok(())
        })
        .unwrap();

        lc.emit_update(&DiffedProps::new()).unwrap();
        assert!(ran.get());
        assert_eq!(
            diagnostics.drain(),
            vec![Diagnostic::Subscriber(CallbackError::new("boom"))]
        );
    }

    #[test]
    fn state_during_and_after_update() {
        let lc = controller();
        let seen = Rc::new(Cell::new(None));
        let observer = lc.clone();
        let slot = seen.clone();
        lc.on_update(move |_| {
            slot.set(Some(observer.state()));
            Ok(())
        })
        .unwrap();

        lc.emit_update(&DiffedProps::new()).unwrap();
        assert_eq!(seen.get(), Some(LifecycleState::Updating));
        assert_eq!(lc.state(), LifecycleState::Constructing);

        lc.emit_after_create().unwrap();
        lc.emit_update(&DiffedProps::new()).unwrap();
        assert_eq!(lc.state(), LifecycleState::Mounted);
    }

    #[test]
    fn nested_updates_are_allowed() {
        let lc = controller();
        let count = Rc::new(Cell::new(0));
        let inner = lc.clone();
        let counter = count.clone();
        lc.on_update(move |diff| {
            counter.set(counter.get() + 1);
            if !diff.is_empty() {
                inner.emit_update(&DiffedProps::new()).map_err(CallbackError::from)?;
            }
            Ok(())
        })
        .unwrap();

        lc.emit_update(&vec![set("x", 1)]).unwrap();
        assert_eq!(count.get(), 2);
        assert_eq!(lc.state(), LifecycleState::Constructing);
    }

    #[test]
    fn after_create_runs_hooks_once() {
        let lc = controller();
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        lc.after_create(move || counter.set(counter.get() + 1)).unwrap();

        lc.emit_after_create().unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(lc.state(), LifecycleState::Mounted);
        assert_eq!(lc.emit_after_create(), Err(ReconcileError::AlreadyCreated));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn destroy_runs_cleanups_in_order_once() {
        let lc = controller();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["first", "second"] {
            let log = log.clone();
            lc.before_destroy(move || log.borrow_mut().push(name)).unwrap();
        }

        lc.emit_before_destroy().unwrap();
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert!(lc.is_destroyed());

        assert_eq!(
            lc.emit_before_destroy(),
            Err(ReconcileError::Destroyed {
                operation: "emit_before_destroy"
            })
        );
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn every_call_after_destroy_is_rejected() {
        let lc = controller();
        lc.emit_before_destroy().unwrap();

        assert!(lc.on_update(|_| Ok(())).is_err());
        assert!(lc.before_destroy(|| {}).is_err());
        assert!(lc.after_create(|| {}).is_err());
        assert!(lc.emit_after_create().is_err());
        assert_eq!(
            lc.emit_update(&DiffedProps::new()),
            Err(ReconcileError::Destroyed {
                operation: "emit_update"
            })
        );
    }
}
