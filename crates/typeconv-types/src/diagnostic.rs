//! Diagnostics produced when a raw value does not convert.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A single conversion failure, positioned within the owning document.
///
/// Offsets count characters and are absolute: `start` already includes the
/// offset at which the raw value begins in its document. `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Diagnostic {
    /// Message supplied by the conversion capability, not synthesized here.
    pub message: String,
    /// Identifier of the producer, e.g. `typeconv`.
    pub source: String,
    /// Machine-readable code.
    pub code: String,
    pub start: usize,
    pub end: usize,
}

impl Diagnostic {
    pub fn new(
        message: impl Into<String>,
        source: impl Into<String>,
        code: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            message: message.into(),
            source: source.into(),
            code: code.into(),
            start,
            end,
        }
    }

    /// The `[start, end)` range covered by this diagnostic.
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}] {}: {}",
            self.start, self.end, self.code, self.message
        )
    }
}

/// Sink receiving diagnostics in the order they are produced.
///
/// Editors implement this to translate offsets into their own protocol.
pub trait DiagnosticsCollector {
    fn collect(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticsCollector for Vec<Diagnostic> {
    fn collect(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<C: DiagnosticsCollector + ?Sized> DiagnosticsCollector for &mut C {
    fn collect(&mut self, diagnostic: Diagnostic) {
        (**self).collect(diagnostic);
    }
}
