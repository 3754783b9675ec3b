pub mod diagnostic;

pub use diagnostic::{Diagnostic, DiagnosticCollector, Severity, codes};
