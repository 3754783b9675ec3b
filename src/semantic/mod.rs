//! Semantic analysis: the symbol-resolution and selector-scoping engine.
//!
//! The pipeline mirrors the data flow: [`processor`] builds a per-file
//! [`Meta`] from parsed CSS, [`resolver`] walks import/extends/alias edges
//! across metas, and [`transformer`] rewrites selectors and values into
//! their final namespaced form and computes the export table. [`modules`]
//! is the seam to non-stylesheet collaborators (function mixins, value
//! exports).

pub mod meta;
pub mod modules;
pub mod processor;
pub mod resolver;
pub mod symbols;
pub mod transformer;
pub mod types;
pub mod value_expander;

pub use meta::{Meta, ROOT};
pub use modules::{JsExport, JsModule, ModuleRegistry, ModuleResolver, NullModuleResolver};
pub use processor::{MixinRef, NamespaceBuilder, ProcessorOptions, process};
pub use resolver::{CssResolve, MetaProvider, Resolution, Resolver};
pub use symbols::{
    ClassSymbol, ElementSymbol, ImportKind, ImportRecord, ImportSymbol, ImportTarget, StSymbol,
    StateMap, VarSymbol,
};
pub use transformer::{StylesheetTransformer, TransformOutput, transform};
pub use types::{Diagnostic, DiagnosticCollector, Severity, codes};
