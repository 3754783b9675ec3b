//! # stylark
//!
//! Compiler core for a CSS superset: per-file symbol tables, cross-file
//! symbol resolution, and selector scoping into plain namespaced CSS plus a
//! runtime export table.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project   → File loading, the caching meta provider, sessions
//!   ↓
//! semantic  → Processor, resolver, transformer, symbol model
//!   ↓
//! parser    → Logos lexer, tolerant CSS parser, selector model
//!   ↓
//! base      → Primitives (FileKey, Span/Position, ProcessError)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → semantic → project)
// ============================================================================

/// Foundation types: FileKey, Span/Position, ProcessError
pub mod base;

/// Parser: Logos lexer, tolerant CSS parser, structural selector model
pub mod parser;

/// Semantic analysis: symbol tables, cross-file resolution, transformation
pub mod semantic;

/// Project management: file loading, meta caching, compilation sessions
pub mod project;

// Re-export foundation types
pub use base::{FileKey, Position, ProcessError, Span};

// Re-export the pipeline surface
pub use semantic::{
    Diagnostic, DiagnosticCollector, JsExport, JsModule, Meta, MetaProvider, ModuleRegistry,
    ModuleResolver, NullModuleResolver, ProcessorOptions, Severity, StSymbol,
    StylesheetTransformer, TransformOutput, process, transform,
};

pub use project::{DiskLoader, FileLoader, FileProcessor, MemoryLoader, Project};
