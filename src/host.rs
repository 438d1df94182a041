//! Host context shared by every element of one rendered tree.
//!
//! [`HostContext`] bundles what elements need from their environment: the
//! configuration, the diagnostic channel, the phase scheduler used by event
//! binders, the spawner that runs async handlers, and the native toolkit that
//! creates widgets.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use tokio::task::LocalSet;

use crate::config::ReconcilerConfig;
use crate::diagnostics::Diagnostics;
use crate::event::PhaseScheduler;
use crate::native::NativeToolkit;

// ---------------------------------------------------------------------------
// TaskSpawner
// ---------------------------------------------------------------------------

/// Fire-and-forget executor for futures returned by event handlers.
///
/// Futures are queued on a [`LocalSet`] and make progress whenever the host
/// drives it, e.g. with [`LocalSet::run_until`] inside its event loop.
#[derive(Clone, Default)]
pub struct TaskSpawner {
    tasks: Rc<LocalSet>,
}

impl TaskSpawner {
    /// Create a spawner with an empty `LocalSet`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a future. Its output is discarded.
    pub fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        // The join handle is dropped: handlers are fire-and-forget.
        drop(self.tasks.spawn_local(future));
    }

    /// The local set the futures are queued on.
    pub fn local_set(&self) -> &LocalSet {
        &self.tasks
    }
}

impl fmt::Debug for TaskSpawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TaskSpawner(..)")
    }
}

// ---------------------------------------------------------------------------
// HostContext
// ---------------------------------------------------------------------------

struct HostInner {
    config: ReconcilerConfig,
    diagnostics: Diagnostics,
    phases: PhaseScheduler,
    spawner: TaskSpawner,
    toolkit: Rc<dyn NativeToolkit>,
}

/// Cheaply clonable environment handed to every element constructor.
#[derive(Clone)]
pub struct HostContext {
    inner: Rc<HostInner>,
}

impl HostContext {
    /// Create a context with the default configuration.
    pub fn new(toolkit: Rc<dyn NativeToolkit>) -> Self {
        Self::with_config(toolkit, ReconcilerConfig::default())
    }

    /// Create a context with an explicit configuration.
    pub fn with_config(toolkit: Rc<dyn NativeToolkit>, config: ReconcilerConfig) -> Self {
        let diagnostics = Diagnostics::new(config.diagnostic_capacity);
        Self {
            inner: Rc::new(HostInner {
                config,
                diagnostics,
                phases: PhaseScheduler::new(),
                spawner: TaskSpawner::new(),
                toolkit,
            }),
        }
    }

    /// Configuration the context was built with.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.inner.config
    }

    /// Shared diagnostic channel. Every element of this context reports here.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.inner.diagnostics
    }

    /// Scheduler the host wraps native event dispatch in.
    pub fn phases(&self) -> &PhaseScheduler {
        &self.inner.phases
    }

    /// Runs futures returned by asynchronous handlers.
    pub fn spawner(&self) -> &TaskSpawner {
        &self.inner.spawner
    }

    /// Native toolkit used to create widgets.
    pub fn toolkit(&self) -> &dyn NativeToolkit {
        self.inner.toolkit.as_ref()
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("config", &self.inner.config)
            .field("diagnostics", &self.inner.diagnostics.len())
            .field("phases", &self.inner.phases)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::HeadlessToolkit;
    use std::cell::Cell;

    #[test]
    fn diagnostics_capacity_comes_from_config() {
        let ctx = HostContext::with_config(
            Rc::new(HeadlessToolkit::new()),
            ReconcilerConfig::new().with_diagnostic_capacity(1),
        );
        ctx.diagnostics()
            .report(crate::diagnostics::Diagnostic::AsyncHandler {
                signal: "a".into(),
            });
        ctx.diagnostics()
            .report(crate::diagnostics::Diagnostic::AsyncHandler {
                signal: "b".into(),
            });
        assert_eq!(ctx.diagnostics().len(), 1);
    }

    #[test]
    fn spawned_futures_run_when_the_local_set_is_driven() {
        let spawner = TaskSpawner::new();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        spawner.spawn(async move { flag.set(true) });
        assert!(!ran.get());

        tokio_test::block_on(spawner.local_set().run_until(tokio::task::yield_now()));
        assert!(ran.get());
    }
}
