//! Reconciler configuration.

/// Default number of diagnostics retained in memory.
pub const DEFAULT_DIAGNOSTIC_CAPACITY: usize = 256;

/// Tunables shared by every element created through one
/// [`HostContext`](crate::host::HostContext).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Emit a one-time advisory when an event handler returns a future.
    pub warn_on_async_handlers: bool,
    /// Report argument-extraction failures to the diagnostic channel instead
    /// of swallowing them silently. The event is dropped either way.
    pub report_extraction_failures: bool,
    /// Maximum number of diagnostics kept for [`drain`](crate::diagnostics::Diagnostics::drain).
    pub diagnostic_capacity: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            warn_on_async_handlers: true,
            report_extraction_failures: false,
            diagnostic_capacity: DEFAULT_DIAGNOSTIC_CAPACITY,
        }
    }
}

impl ReconcilerConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the async handler advisory (builder).
    pub fn with_async_handler_warning(mut self, enabled: bool) -> Self {
        self.warn_on_async_handlers = enabled;
        self
    }

    /// Toggle reporting of swallowed extraction failures (builder).
    pub fn with_extraction_failure_reports(mut self, enabled: bool) -> Self {
        self.report_extraction_failures = enabled;
        self
    }

    /// Set the in-memory diagnostic capacity (builder).
    pub fn with_diagnostic_capacity(mut self, capacity: usize) -> Self {
        self.diagnostic_capacity = capacity;
        self
    }
}
