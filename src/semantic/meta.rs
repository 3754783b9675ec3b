//! The per-file Meta record: symbol tables plus the retained rule tree.
//!
//! A Meta is built once by the processor, cached by the file processor, and
//! treated as immutable from then on (resolvers read it, the transformer
//! clones its tree). Cross-file state is only ever observed through resolver
//! results, never by mutating a foreign Meta.

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;

use crate::base::FileKey;
use crate::parser::Stylesheet;

use super::symbols::{ClassSymbol, ImportRecord, StSymbol, VarSymbol};
use super::types::DiagnosticCollector;

/// Name of the class symbol every stylesheet has.
pub const ROOT: &str = "root";

#[derive(Debug, Clone)]
pub struct Meta {
    pub source: FileKey,
    /// Unique per-file scoping prefix; assigned once, never recomputed.
    pub namespace: String,
    /// The processed rule tree (`:import`/`:vars`/`@namespace` removed).
    pub ast: Stylesheet,
    /// The union namespace of classes, elements, vars and import bindings,
    /// keyed by the name visible inside this file. This is the single
    /// lookup table used for everything; symbols are stored here exactly
    /// once. First insertion wins, except that a class/element introduced
    /// over an import takes the slot and carries the import as its alias.
    pub mapped_symbols: IndexMap<SmolStr, StSymbol>,
    /// Names of classes used locally (subset of `mapped_symbols` keys).
    pub classes: IndexSet<SmolStr>,
    /// Names of element selectors used locally.
    pub elements: IndexSet<SmolStr>,
    /// Var symbols in declaration order.
    pub vars: Vec<VarSymbol>,
    /// Import records in declaration order.
    pub imports: Vec<ImportRecord>,
    /// `@custom-selector` macro name (without `:--`) -> selector text.
    pub custom_selectors: IndexMap<SmolStr, String>,
    /// `@keyframes` names in document order.
    pub keyframes: Vec<SmolStr>,
    /// Processing-time diagnostics, append-only.
    pub diagnostics: DiagnosticCollector,
}

impl Meta {
    pub fn new(source: FileKey, namespace: String) -> Self {
        let mut mapped_symbols = IndexMap::new();
        mapped_symbols.insert(
            SmolStr::new(ROOT),
            StSymbol::Class(ClassSymbol {
                name: SmolStr::new(ROOT),
                is_root: true,
                ..Default::default()
            }),
        );
        let mut classes = IndexSet::new();
        classes.insert(SmolStr::new(ROOT));
        Self {
            source,
            namespace,
            ast: Stylesheet::default(),
            mapped_symbols,
            classes,
            elements: IndexSet::new(),
            vars: Vec::new(),
            imports: Vec::new(),
            custom_selectors: IndexMap::new(),
            keyframes: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// The always-present root class symbol.
    pub fn root(&self) -> &ClassSymbol {
        match self.mapped_symbols.get(ROOT) {
            Some(StSymbol::Class(class)) if class.is_root => class,
            // `root` is inserted at construction and never removed
            _ => unreachable!("meta without a root class symbol"),
        }
    }

    pub fn symbol(&self, name: &str) -> Option<&StSymbol> {
        self.mapped_symbols.get(name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassSymbol> {
        self.mapped_symbols.get(name).and_then(StSymbol::as_class)
    }

    /// Local class symbols (including root) in insertion order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassSymbol> {
        self.classes.iter().filter_map(|name| self.class(name))
    }

    /// The scoped name of a local class/element/keyframe.
    pub fn scoped_name(&self, name: &str) -> String {
        format!("{}--{}", self.namespace, name)
    }

    /// The scoped root class name.
    pub fn scoped_root(&self) -> String {
        self.scoped_name(ROOT)
    }
}
