//! Diagnostics — stylesheet problem reporting.
//!
//! Diagnostics are append-only: processing records them on the Meta, the
//! transformer records them on a fresh sink per pass, and neither ever throws
//! them at the caller. Callers inspect the collection after the call returns.

use std::sync::Arc;

use crate::base::Span;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message with an optional source location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Error/warning code (e.g., "E0103").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            span: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            code: None,
            message: message.into(),
            span: None,
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the source span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
///
/// ## Code Ranges
///
/// - **E0100-E0199**: structural errors (imports, directives, resolution)
/// - **W0100-W0199**: warnings (unknown references, dropped values)
#[allow(dead_code)]
pub mod codes {
    // ========================================================================
    // STRUCTURAL ERRORS (E0100-E0199)
    // ========================================================================

    /// `:import` block without `-st-from`.
    pub const MISSING_FROM: &str = "E0101";
    /// Directive used on a selector shape where it is not allowed.
    pub const INVALID_DIRECTIVE_TARGET: &str = "E0102";
    /// Symbol name declared twice with conflicting kinds.
    pub const REDECLARED_SYMBOL: &str = "E0103";
    /// `.root` used after a descendant combinator.
    pub const ROOT_AFTER_SPACE: &str = "E0104";
    /// Forward reference inside `:vars`.
    pub const FORWARD_VAR_REFERENCE: &str = "E0105";
    /// Keyframe name collides with a reserved CSS keyword.
    pub const RESERVED_KEYFRAME_NAME: &str = "E0106";
    /// Non-directive declaration inside a non-theme `:import`.
    pub const UNEXPECTED_IMPORT_DECLARATION: &str = "E0107";
    /// Circular resolution detected while walking imports/extends.
    pub const CIRCULAR_RESOLUTION: &str = "E0120";

    // ========================================================================
    // WARNINGS (W0100-W0199)
    // ========================================================================

    /// `value()` references an unknown name.
    pub const UNKNOWN_VALUE_REFERENCE: &str = "W0101";
    /// Unknown pseudo-class (not a declared state, not native).
    pub const UNKNOWN_STATE: &str = "W0102";
    /// Unknown pseudo-element (not a known part, not native).
    pub const UNKNOWN_PSEUDO_ELEMENT: &str = "W0103";
    /// Class/element/extends/compose reference could not be resolved.
    pub const UNRESOLVED_REFERENCE: &str = "W0104";
    /// Mixin could not be resolved or applied.
    pub const MIXIN_FAILED: &str = "W0105";
    /// A mixin or stylesheet symbol used where a value is expected.
    pub const INVALID_VALUE_KIND: &str = "W0106";
    /// Directive re-declared on the same symbol (later wins).
    pub const REDECLARED_DIRECTIVE: &str = "W0107";
    /// Cyclic `value()` chain replaced by the literal `cyclic value`.
    pub const CYCLIC_VALUE: &str = "W0108";
    /// Implicit import alias dropped because the name is already taken.
    pub const ALIAS_CONFLICT: &str = "W0109";
    /// Export name already taken; entry dropped.
    pub const EXPORT_COLLISION: &str = "W0110";
    /// Override declarations on a non-theme import.
    pub const OVERRIDE_WITHOUT_THEME: &str = "W0111";
    /// Custom-selector macro expands into itself; expansion stopped.
    pub const RECURSIVE_CUSTOM_SELECTOR: &str = "W0112";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during processing or transformation.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// True if any diagnostic carries the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.code.as_deref() == Some(code))
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
