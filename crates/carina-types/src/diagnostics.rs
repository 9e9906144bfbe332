//! Diagnostic model shared by every checking entry point.
//!
//! Message text is a stable contract: downstream tooling matches on the
//! formatted strings, so the `check_*` and resolution entry points reproduce
//! the exact wording, with type names rendered by [`crate::format_type`].

use std::fmt;

use serde::Serialize;

/// A byte-span into a source string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
        }
    }
}

/// Append-only accumulator for one compilation unit.
///
/// Errors abort type-assignment for the enclosing expression only; callers
/// keep checking independent declarations against the same sink.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticSink {
    items: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// Recoverable findings attached to an otherwise successful resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TypeWarning {
    Unchecked(UncheckedReason),
    UnnecessaryCast,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UncheckedReason {
    /// Variable-arity invocation creating an array of a non-reifiable type.
    UncheckedVarargs,
    /// Member access through a raw receiver; the signature was erased.
    RawMemberAccess,
    /// Raw-to-parameterized assignment treated as if checked.
    RawConversion,
    /// Cast into a parameterized type that cannot be verified at runtime.
    UncheckedCast,
}
