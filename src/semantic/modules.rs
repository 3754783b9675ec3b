//! Non-stylesheet module collaborator (`requireModule`).
//!
//! Function mixins and value exports come from modules outside the stylesheet
//! graph. The core only needs an opaque record per module: a default export
//! and named exports, each either a plain value or a callable mixin. Hosts
//! register implementations; the [`ModuleRegistry`] is the in-process one.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// A declaration object returned by a function mixin.
///
/// Keys are either property names (mapping to [`MixinValue::Decl`]) or
/// selector fragments (mapping to [`MixinValue::Nested`] blocks).
pub type MixinObject = IndexMap<String, MixinValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum MixinValue {
    Decl(String),
    Nested(MixinObject),
}

/// A callable mixin: arguments in, declaration object out. Errors are
/// reported as diagnostics by the transformer, never propagated as faults.
pub type MixinFn = dyn Fn(&[String]) -> Result<MixinObject, String> + Send + Sync;

#[derive(Clone)]
pub enum JsExport {
    Value(String),
    Mixin(Arc<MixinFn>),
}

impl fmt::Debug for JsExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsExport::Value(v) => f.debug_tuple("Value").field(v).finish(),
            JsExport::Mixin(_) => f.write_str("Mixin(..)"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsModule {
    pub default: Option<JsExport>,
    pub named: FxHashMap<String, JsExport>,
}

impl JsModule {
    pub fn with_default(export: JsExport) -> Self {
        Self {
            default: Some(export),
            named: FxHashMap::default(),
        }
    }

    pub fn with_named(mut self, name: impl Into<String>, export: JsExport) -> Self {
        self.named.insert(name.into(), export);
        self
    }
}

/// The `requireModule` capability the core needs from its environment.
pub trait ModuleResolver: Send + Sync {
    fn require(&self, request: &str) -> Option<Arc<JsModule>>;
}

/// Resolver that knows no modules; every non-stylesheet import fails to
/// resolve (and surfaces as a diagnostic at use sites).
#[derive(Debug, Default)]
pub struct NullModuleResolver;

impl ModuleResolver for NullModuleResolver {
    fn require(&self, _request: &str) -> Option<Arc<JsModule>> {
        None
    }
}

/// In-process module registry keyed by request string.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: FxHashMap<String, Arc<JsModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, request: impl Into<String>, module: JsModule) {
        self.modules.insert(request.into(), Arc::new(module));
    }
}

impl ModuleResolver for ModuleRegistry {
    fn require(&self, request: &str) -> Option<Arc<JsModule>> {
        self.modules.get(request).cloned()
    }
}
