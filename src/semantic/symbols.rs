//! Symbol model for Stylark stylesheets.
//!
//! Every named entity visible inside a file is an [`StSymbol`]: a class, an
//! element, an import binding, or a variable. The union lives in the Meta's
//! `mapped_symbols` table; resolvers and the transformer dispatch on the
//! variant with exhaustive matches.

use std::path::PathBuf;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::Span;
use crate::parser::Declaration;

/// A named entity in a stylesheet's symbol space.
#[derive(Debug, Clone, PartialEq)]
pub enum StSymbol {
    Class(ClassSymbol),
    Element(ElementSymbol),
    Import(ImportSymbol),
    Var(VarSymbol),
}

/// State name -> optional literal selector override (`None` renders as a
/// synthesized `[data-<ns>-<state>]` attribute).
pub type StateMap = IndexMap<SmolStr, Option<String>>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassSymbol {
    pub name: SmolStr,
    pub is_root: bool,
    /// Implicit import alias: set when a capitalized element/class name
    /// matches an import binding.
    pub alias: Option<ImportSymbol>,
    /// `-st-extends` target, a name in the owning meta's `mapped_symbols`.
    pub extends: Option<SmolStr>,
    pub states: Option<StateMap>,
    /// `-st-global` escaped selector fragment.
    pub global: Option<String>,
    /// `-st-compose` targets, names in the owning meta's `mapped_symbols`.
    pub compose: Vec<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementSymbol {
    pub name: SmolStr,
    pub alias: Option<ImportSymbol>,
    pub extends: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    Default,
    Named { source_name: SmolStr },
}

/// A single binding introduced by an `:import` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSymbol {
    /// Name visible inside the importing file.
    pub name: SmolStr,
    pub kind: ImportKind,
    /// Index into the owning meta's `imports` list.
    pub import_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarSymbol {
    pub name: SmolStr,
    /// Value with local `value()` references expanded.
    pub value: String,
    /// Raw declaration text as written.
    pub text: String,
}

/// Where an import request points after path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// Another stylesheet, keyed by its resolved absolute path.
    Stylesheet(PathBuf),
    /// A non-stylesheet module (function mixins, value exports).
    Module(String),
}

/// One `:import` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    /// The request exactly as written in `-st-from`.
    pub request: String,
    pub target: ImportTarget,
    pub default_alias: Option<SmolStr>,
    /// local alias -> exported source name
    pub named: IndexMap<SmolStr, SmolStr>,
    pub theme: bool,
    /// Override declarations (theme imports only).
    pub overrides: Vec<Declaration>,
    pub span: Span,
}

impl StSymbol {
    pub fn name(&self) -> &SmolStr {
        match self {
            StSymbol::Class(s) => &s.name,
            StSymbol::Element(s) => &s.name,
            StSymbol::Import(s) => &s.name,
            StSymbol::Var(s) => &s.name,
        }
    }

    /// Human-readable kind for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            StSymbol::Class(_) => "class",
            StSymbol::Element(_) => "element",
            StSymbol::Import(_) => "import",
            StSymbol::Var(_) => "var",
        }
    }

    pub fn as_class(&self) -> Option<&ClassSymbol> {
        match self {
            StSymbol::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_import(&self) -> Option<&ImportSymbol> {
        match self {
            StSymbol::Import(import) => Some(import),
            _ => None,
        }
    }

    /// `-st-extends` edge, for the variants that carry one.
    pub fn extends(&self) -> Option<&SmolStr> {
        match self {
            StSymbol::Class(s) => s.extends.as_ref(),
            StSymbol::Element(s) => s.extends.as_ref(),
            StSymbol::Import(_) | StSymbol::Var(_) => None,
        }
    }

    /// Implicit import alias, for the variants that carry one.
    pub fn alias(&self) -> Option<&ImportSymbol> {
        match self {
            StSymbol::Class(s) => s.alias.as_ref(),
            StSymbol::Element(s) => s.alias.as_ref(),
            StSymbol::Import(_) | StSymbol::Var(_) => None,
        }
    }

    /// States declared directly on this symbol.
    pub fn states(&self) -> Option<&StateMap> {
        match self {
            StSymbol::Class(s) => s.states.as_ref(),
            StSymbol::Element(_) | StSymbol::Import(_) | StSymbol::Var(_) => None,
        }
    }
}

impl ImportRecord {
    /// Decide whether a request points at a stylesheet or a module.
    pub fn classify_target(request: &str, resolve_relative: impl FnOnce(&str) -> PathBuf) -> ImportTarget {
        let is_path = request.starts_with('.') || request.starts_with('/');
        if is_path && request.ends_with(".css") {
            ImportTarget::Stylesheet(resolve_relative(request))
        } else {
            ImportTarget::Module(request.to_string())
        }
    }
}
