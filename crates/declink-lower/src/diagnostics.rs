//! The diagnostics collaborator interface.
//!
//! The lowering core never aborts on an override conflict; it reports the
//! conflict here and continues with a deterministic choice.

use declink_common::Diagnostic;
use parking_lot::Mutex;
use tracing::warn;

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Collects reported diagnostics in arrival order.
#[derive(Default)]
pub struct DiagnosticCollector {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }

    /// Copy of everything reported so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Drain everything reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

/// Forwards diagnostics to the log only.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        warn!(code = diagnostic.code, subject = %diagnostic.subject, "{}", diagnostic.message_text);
    }
}
