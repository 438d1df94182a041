//! Diagnostic channel for locally recovered failures.
//!
//! Validation failures, callback errors and advisories never abort a
//! reconciliation cycle. They are logged through the [`log`] facade under
//! [`LOG_TARGET`] and kept in a bounded buffer so hosts and tests can inspect
//! what happened.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::Level;

use crate::error::CallbackError;
use crate::event::ExtractError;
use crate::native::NativeError;
use crate::props::PropertyError;

/// `log` target used for every diagnostic.
pub const LOG_TARGET: &str = "native_reconciler";

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// A single recovered failure or advisory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    /// A property was rejected or its apply/cleanup callback failed.
    #[error(transparent)]
    Property(#[from] PropertyError),
    /// A lifecycle subscriber returned an error.
    #[error("lifecycle subscriber failed: {0}")]
    Subscriber(CallbackError),
    /// An event handler returned an error.
    #[error("event handler for `{signal}` failed: {error}")]
    Handler { signal: String, error: CallbackError },
    /// An argument extractor rejected the native event; the event was dropped.
    #[error("event `{signal}` dropped: {error}")]
    Extraction { signal: String, error: ExtractError },
    /// A handler returned a future.
    #[error(
        "Provided an async function as an event handler for `{signal}`. It is advised to only use synchronous functions as event handlers."
    )]
    AsyncHandler { signal: String },
    /// A native primitive failed during cleanup.
    #[error("native cleanup failed: {0}")]
    Native(#[from] NativeError),
}

impl Diagnostic {
    /// Log level this diagnostic is reported at.
    pub fn level(&self) -> Level {
        match self {
            Self::AsyncHandler { .. } => Level::Warn,
            Self::Extraction { .. } => Level::Debug,
            _ => Level::Error,
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct DiagnosticBuffer {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
}

/// Shared, cheaply clonable diagnostic sink.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    buffer: Rc<RefCell<DiagnosticBuffer>>,
}

impl Diagnostics {
    /// Create a sink that retains at most `capacity` diagnostics.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(DiagnosticBuffer {
                entries: VecDeque::new(),
                capacity,
            })),
        }
    }

    /// Log a diagnostic and retain it, evicting the oldest when full.
    pub fn report(&self, diagnostic: impl Into<Diagnostic>) {
        let diagnostic = diagnostic.into();
        log::log!(target: LOG_TARGET, diagnostic.level(), "{diagnostic}");

        let mut buffer = self.buffer.borrow_mut();
        if buffer.capacity == 0 {
            return;
        }
        if buffer.entries.len() == buffer.capacity {
            buffer.entries.pop_front();
        }
        buffer.entries.push_back(diagnostic);
    }

    /// Remove and return every retained diagnostic, oldest first.
    pub fn drain(&self) -> Vec<Diagnostic> {
        self.buffer.borrow_mut().entries.drain(..).collect()
    }

    /// Number of retained diagnostics.
    pub fn len(&self) -> usize {
        self.buffer.borrow().entries.len()
    }

    /// Whether nothing has been reported since the last drain.
    pub fn is_empty(&self) -> bool {
        self.buffer.borrow().entries.is_empty()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_DIAGNOSTIC_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscriber(msg: &str) -> Diagnostic {
        Diagnostic::Subscriber(CallbackError::new(msg))
    }

    #[test]
    fn report_and_drain() {
        let diagnostics = Diagnostics::new(4);
        diagnostics.report(subscriber("a"));
        diagnostics.report(subscriber("b"));
        assert_eq!(diagnostics.len(), 2);

        let drained = diagnostics.drain();
        assert_eq!(drained, vec![subscriber("a"), subscriber("b")]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn oldest_is_evicted_when_full() {
        let diagnostics = Diagnostics::new(2);
        diagnostics.report(subscriber("a"));
        diagnostics.report(subscriber("b"));
        diagnostics.report(subscriber("c"));
        assert_eq!(diagnostics.drain(), vec![subscriber("b"), subscriber("c")]);
    }

    #[test]
    fn zero_capacity_only_logs() {
        let diagnostics = Diagnostics::new(0);
        diagnostics.report(subscriber("a"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn clones_share_the_buffer() {
        let diagnostics = Diagnostics::default();
        let clone = diagnostics.clone();
        clone.report(subscriber("shared"));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn levels() {
        assert_eq!(subscriber("x").level(), Level::Error);
        let warn = Diagnostic::AsyncHandler {
            signal: "clicked".to_owned(),
        };
        assert_eq!(warn.level(), Level::Warn);
    }
}
