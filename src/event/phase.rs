//! Event phases: ordering of handlers reacting to one native event.
//!
//! A single native input event usually makes the toolkit emit several
//! signals, child first. A container that wants to intercept its children's
//! events therefore cannot rely on emission order. The host wraps each native
//! event dispatch in [`PhaseScheduler::cycle`]; handlers started inside a
//! cycle are queued and run when the outermost cycle ends, every `Input`
//! handler first, then `Action`, then `Default`, each phase in FIFO order.
//! Outside a cycle, handlers run immediately.
//!
//! A deferred handler cannot answer the native signal that started it, so the
//! cycle collects their stop flags instead. [`PhaseScheduler::dispatch`]
//! returns that flag for the host to hand back to the toolkit.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Task = Box<dyn FnOnce() -> bool>;

// ---------------------------------------------------------------------------
// EventPhase
// ---------------------------------------------------------------------------

/// Scheduling slot of a bound handler. Earlier variants run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EventPhase {
    /// Direct input reactions (presses, releases). Default for property binds.
    #[default]
    Input,
    /// Reactions that build on input having been handled (hover, activation).
    Action,
    /// Everything else. Default for internal binds.
    Default,
}

impl EventPhase {
    /// All phases in run order.
    pub const ALL: [EventPhase; 3] = [EventPhase::Input, EventPhase::Action, EventPhase::Default];

    fn index(self) -> usize {
        match self {
            Self::Input => 0,
            Self::Action => 1,
            Self::Default => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// PhaseScheduler
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SchedulerState {
    /// When > 0 we are inside a `cycle()` call; handlers are deferred.
    depth: usize,
    queues: [VecDeque<Task>; 3],
    /// Set when a handler flushed in the current outermost cycle stopped
    /// propagation.
    stopped: bool,
}

/// Defers and orders handler invocations within a native event cycle.
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone, Default)]
pub struct PhaseScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl PhaseScheduler {
    /// Create a scheduler with no open cycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a cycle is open.
    pub fn in_cycle(&self) -> bool {
        self.state.borrow().depth > 0
    }

    /// Number of queued handler invocations.
    pub fn pending(&self) -> usize {
        self.state.borrow().queues.iter().map(VecDeque::len).sum()
    }

    /// Run `task` in `phase`.
    ///
    /// Outside a cycle the task runs now and its result is returned. Inside a
    /// cycle it is queued and `false` is returned; its result is folded into
    /// the flag reported by [`dispatch`](Self::dispatch).
    pub fn start_phase(&self, phase: EventPhase, task: impl FnOnce() -> bool + 'static) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.depth > 0 {
                state.queues[phase.index()].push_back(Box::new(task));
                return false;
            }
        }
        task()
    }

    /// Group every handler started by `f` into one cycle.
    ///
    /// Cycles nest; queued handlers run when the outermost one ends.
    pub fn cycle<R>(&self, f: impl FnOnce() -> R) -> R {
        {
            let mut state = self.state.borrow_mut();
            if state.depth == 0 {
                state.stopped = false;
            }
            state.depth += 1;
        }
        let result = f();
        let outermost = {
            let mut state = self.state.borrow_mut();
            state.depth -= 1;
            state.depth == 0
        };
        if outermost {
            self.flush();
        }
        result
    }

    /// Run `f` as one native event cycle and report whether any handler run
    /// by it stopped propagation.
    ///
    /// Only the outermost cycle knows the outcome; nested calls return
    /// `false`.
    pub fn dispatch(&self, f: impl FnOnce()) -> bool {
        let outermost = !self.in_cycle();
        self.cycle(f);
        outermost && self.state.borrow().stopped
    }

    /// Whether a handler flushed by the last outermost cycle stopped
    /// propagation.
    pub fn propagation_stopped(&self) -> bool {
        self.state.borrow().stopped
    }

    /// Run queued handlers in phase order. Handlers started while flushing
    /// are queued too and picked up in order.
    fn flush(&self) {
        self.state.borrow_mut().depth += 1;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                state.queues.iter_mut().find_map(VecDeque::pop_front)
            };
            match next {
                Some(task) => {
                    if task() {
                        self.state.borrow_mut().stopped = true;
                    }
                }
                None => break,
            }
        }
        self.state.borrow_mut().depth -= 1;
    }
}

impl fmt::Debug for PhaseScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("PhaseScheduler")
            .field("depth", &state.depth)
            .field("stopped", &state.stopped)
            .field(
                "pending",
                &state.queues.iter().map(VecDeque::len).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce() -> bool>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |name: &'static str| {
            let sink = sink.clone();
            Box::new(move || {
                sink.borrow_mut().push(name);
                true
            }) as Box<dyn FnOnce() -> bool>
        };
        (log, make)
    }

    #[test]
    fn phases_are_ordered() {
        assert!(EventPhase::Input < EventPhase::Action);
        assert!(EventPhase::Action < EventPhase::Default);
        assert_eq!(EventPhase::default(), EventPhase::Input);
    }

    #[test]
    fn outside_cycle_runs_immediately() {
        let scheduler = PhaseScheduler::new();
        let (log, make) = recorder();
        let stop = scheduler.start_phase(EventPhase::Default, make("now"));
        assert!(stop);
        assert_eq!(*log.borrow(), vec!["now"]);
    }

    #[test]
    fn cycle_flushes_in_phase_order() {
        let scheduler = PhaseScheduler::new();
        let (log, make) = recorder();

        scheduler.cycle(|| {
            assert!(!scheduler.start_phase(EventPhase::Default, make("child default")));
            assert!(!scheduler.start_phase(EventPhase::Action, make("child action")));
            assert!(!scheduler.start_phase(EventPhase::Input, make("container input")));
            assert!(!scheduler.start_phase(EventPhase::Input, make("second input")));
            assert_eq!(scheduler.pending(), 4);
            assert!(log.borrow().is_empty());
        });

        assert_eq!(
            *log.borrow(),
            vec!["container input", "second input", "child action", "child default"]
        );
        assert_eq!(scheduler.pending(), 0);
        assert!(!scheduler.in_cycle());
    }

    #[test]
    fn nested_cycles_flush_once_at_outermost() {
        let scheduler = PhaseScheduler::new();
        let (log, make) = recorder();

        scheduler.cycle(|| {
            scheduler.cycle(|| {
                scheduler.start_phase(EventPhase::Default, make("inner"));
            });
            assert!(log.borrow().is_empty());
            scheduler.start_phase(EventPhase::Input, make("outer"));
        });

        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn handlers_started_while_flushing_keep_phase_order() {
        let scheduler = PhaseScheduler::new();
        let (log, make) = recorder();
        let inner = scheduler.clone();
        let late = make("late input");
        let sink = log.clone();

        scheduler.cycle(|| {
            scheduler.start_phase(EventPhase::Action, move || {
                sink.borrow_mut().push("action");
                inner.start_phase(EventPhase::Input, late);
                false
            });
            scheduler.start_phase(EventPhase::Default, make("default"));
        });

        assert_eq!(*log.borrow(), vec!["action", "late input", "default"]);
    }

    #[test]
    fn dispatch_reports_a_deferred_stop() {
        let scheduler = PhaseScheduler::new();
        let inner = scheduler.clone();

        let stopped = scheduler.dispatch(|| {
            assert!(!inner.start_phase(EventPhase::Input, || false));
            assert!(!inner.start_phase(EventPhase::Default, || true));
        });
        assert!(stopped);
        assert!(scheduler.propagation_stopped());

        let stopped = scheduler.dispatch(|| {
            inner.start_phase(EventPhase::Action, || false);
        });
        assert!(!stopped, "the flag resets with each outermost cycle");
        assert!(!scheduler.propagation_stopped());
    }

    #[test]
    fn nested_dispatch_defers_to_the_outermost() {
        let scheduler = PhaseScheduler::new();
        let inner = scheduler.clone();

        let stopped = scheduler.dispatch(|| {
            let nested = inner.dispatch(|| {
                inner.start_phase(EventPhase::Input, || true);
            });
            assert!(!nested);
        });
        assert!(stopped);
    }
}
