//! Cross-file symbol resolution.
//!
//! The resolver walks import bindings across the stylesheet graph without
//! ever mutating a foreign [`Meta`]: every answer is an owned
//! [`CssResolve`] (an `Arc<Meta>` plus a cloned symbol) or a module export.
//! Metas come from a [`MetaProvider`] so the resolver stays independent of
//! how files are loaded and cached.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::FileKey;

use super::meta::{Meta, ROOT};
use super::modules::{JsExport, JsModule, ModuleResolver};
use super::symbols::{ClassSymbol, ImportKind, ImportSymbol, ImportTarget, StSymbol};
use super::types::{Diagnostic, DiagnosticCollector, codes};

/// Supplies processed metas by file identity.
pub trait MetaProvider: Send + Sync {
    fn meta_for(&self, key: &FileKey) -> Option<Arc<Meta>>;
}

/// A symbol located in a specific stylesheet.
#[derive(Debug, Clone)]
pub struct CssResolve {
    pub meta: Arc<Meta>,
    pub symbol: StSymbol,
}

impl CssResolve {
    pub fn as_class(&self) -> Option<&ClassSymbol> {
        self.symbol.as_class()
    }
}

/// Where an import binding ends up after full resolution.
#[derive(Debug, Clone)]
pub enum Resolution {
    Css(CssResolve),
    Js {
        module: Arc<JsModule>,
        /// `None` for default imports.
        export: Option<SmolStr>,
    },
}

impl Resolution {
    pub fn as_css(&self) -> Option<&CssResolve> {
        match self {
            Resolution::Css(resolve) => Some(resolve),
            Resolution::Js { .. } => None,
        }
    }

    /// The module export this resolution names, if it is a module one.
    pub fn js_export(&self) -> Option<JsExport> {
        match self {
            Resolution::Css(_) => None,
            Resolution::Js { module, export } => match export {
                None => module.default.clone(),
                Some(name) => module.named.get(name.as_str()).cloned(),
            },
        }
    }
}

pub struct Resolver<'a> {
    files: &'a dyn MetaProvider,
    modules: &'a dyn ModuleResolver,
}

impl<'a> Resolver<'a> {
    pub fn new(files: &'a dyn MetaProvider, modules: &'a dyn ModuleResolver) -> Self {
        Self { files, modules }
    }

    /// Follow an import binding one hop to the symbol it names in its
    /// target. `None` when the target file, module, or symbol is missing.
    pub fn resolve_import(&self, meta: &Meta, import: &ImportSymbol) -> Option<Resolution> {
        let record = meta.imports.get(import.import_index)?;
        match &record.target {
            ImportTarget::Stylesheet(path) => {
                let key = FileKey::new(path).ok()?;
                let target = self.files.meta_for(&key)?;
                let source_name = match &import.kind {
                    ImportKind::Default => ROOT,
                    ImportKind::Named { source_name } => source_name.as_str(),
                };
                let symbol = target.symbol(source_name)?.clone();
                Some(Resolution::Css(CssResolve { meta: target, symbol }))
            }
            ImportTarget::Module(request) => {
                let module = self.modules.require(request)?;
                let export = match &import.kind {
                    ImportKind::Default => None,
                    ImportKind::Named { source_name } => Some(source_name.clone()),
                };
                Some(Resolution::Js { module, export })
            }
        }
    }

    /// Follow chained import bindings until a concrete symbol or a module
    /// export. Cycles are cut with a diagnostic and resolve to `None`.
    pub fn deep_resolve(
        &self,
        meta: &Arc<Meta>,
        import: &ImportSymbol,
        diagnostics: &mut DiagnosticCollector,
    ) -> Option<Resolution> {
        let mut visited: FxHashSet<(FileKey, SmolStr)> = FxHashSet::default();
        visited.insert((meta.source.clone(), import.name.clone()));

        let mut current = self.resolve_import(meta, import)?;
        loop {
            match &current {
                Resolution::Js { .. } => return Some(current),
                Resolution::Css(resolve) => {
                    let StSymbol::Import(next) = &resolve.symbol else {
                        return Some(current);
                    };
                    let step = (resolve.meta.source.clone(), next.name.clone());
                    if !visited.insert(step) {
                        diagnostics.add(
                            Diagnostic::error(format!(
                                "circular import resolution through '{}'",
                                next.name
                            ))
                            .with_code(codes::CIRCULAR_RESOLUTION),
                        );
                        return None;
                    }
                    trace!(
                        file = %resolve.meta.source,
                        symbol = %next.name,
                        "following import hop"
                    );
                    let next = next.clone();
                    let meta = resolve.meta.clone();
                    current = self.resolve_import(&meta, &next)?;
                }
            }
        }
    }

    /// Resolve a name visible in `meta` to the concrete stylesheet symbol it
    /// denotes, following imports as needed.
    pub fn resolve_name(
        &self,
        meta: &Arc<Meta>,
        name: &str,
        diagnostics: &mut DiagnosticCollector,
    ) -> Option<CssResolve> {
        match meta.symbol(name)? {
            StSymbol::Import(import) => {
                let import = import.clone();
                match self.deep_resolve(meta, &import, diagnostics)? {
                    Resolution::Css(resolve)
                        if matches!(
                            resolve.symbol,
                            StSymbol::Class(_) | StSymbol::Element(_) | StSymbol::Var(_)
                        ) =>
                    {
                        Some(resolve)
                    }
                    _ => None,
                }
            }
            symbol => Some(CssResolve {
                meta: meta.clone(),
                symbol: symbol.clone(),
            }),
        }
    }

    /// `resolve_name` restricted to class symbols.
    pub fn resolve_class(
        &self,
        meta: &Arc<Meta>,
        name: &str,
        diagnostics: &mut DiagnosticCollector,
    ) -> Option<CssResolve> {
        self.resolve_name(meta, name, diagnostics)
            .filter(|resolve| matches!(resolve.symbol, StSymbol::Class(_)))
    }

    /// `resolve_name` accepting class or element symbols (extends targets).
    pub fn resolve_extend_target(
        &self,
        meta: &Arc<Meta>,
        name: &str,
        diagnostics: &mut DiagnosticCollector,
    ) -> Option<CssResolve> {
        self.resolve_name(meta, name, diagnostics)
            .filter(|resolve| {
                matches!(resolve.symbol, StSymbol::Class(_) | StSymbol::Element(_))
            })
    }

    /// The full inheritance chain of a class or element, most-derived first.
    /// Entry zero is the symbol itself; each next entry is what the previous
    /// one extends (or, absent an extends, what its alias imports).
    pub fn resolve_extends(
        &self,
        meta: &Arc<Meta>,
        name: &str,
        diagnostics: &mut DiagnosticCollector,
    ) -> Vec<CssResolve> {
        let mut chain = Vec::new();
        let Some(first) = self.resolve_name(meta, name, diagnostics) else {
            return chain;
        };
        let mut visited: FxHashSet<(FileKey, SmolStr)> = FxHashSet::default();
        visited.insert((first.meta.source.clone(), SmolStr::new(first.symbol.name())));
        chain.push(first);

        loop {
            let current = chain.last().map(|r| (r.meta.clone(), r.symbol.clone()));
            let Some((current_meta, symbol)) = current else {
                break;
            };
            let next = match &symbol {
                StSymbol::Class(class) => match (&class.extends, &class.alias) {
                    (Some(parent), _) => {
                        self.resolve_extend_target(&current_meta, parent, diagnostics)
                    }
                    (None, Some(alias)) => {
                        let alias = alias.clone();
                        self.deep_resolve(&current_meta, &alias, diagnostics)
                            .and_then(|r| match r {
                                Resolution::Css(resolve)
                                    if matches!(
                                        resolve.symbol,
                                        StSymbol::Class(_) | StSymbol::Element(_)
                                    ) =>
                                {
                                    Some(resolve)
                                }
                                _ => None,
                            })
                    }
                    (None, None) => None,
                },
                StSymbol::Element(element) => match (&element.extends, &element.alias) {
                    (Some(parent), _) => {
                        self.resolve_extend_target(&current_meta, parent, diagnostics)
                    }
                    (None, Some(alias)) => {
                        let alias = alias.clone();
                        self.deep_resolve(&current_meta, &alias, diagnostics)
                            .and_then(|r| r.as_css().cloned())
                    }
                    (None, None) => None,
                },
                _ => None,
            };
            let Some(next) = next else { break };
            let step = (next.meta.source.clone(), SmolStr::new(next.symbol.name()));
            if !visited.insert(step) {
                diagnostics.add(
                    Diagnostic::error(format!(
                        "circular extends chain through '{}'",
                        next.symbol.name()
                    ))
                    .with_code(codes::CIRCULAR_RESOLUTION),
                );
                break;
            }
            chain.push(next);
        }
        chain
    }

    /// The final replacement text of a var visible in `meta`, following
    /// imported vars and module value exports.
    pub fn resolve_var_value(
        &self,
        meta: &Arc<Meta>,
        name: &str,
        diagnostics: &mut DiagnosticCollector,
    ) -> Option<String> {
        match meta.symbol(name)? {
            StSymbol::Var(var) => Some(var.value.clone()),
            StSymbol::Import(import) => {
                let import = import.clone();
                match self.deep_resolve(meta, &import, diagnostics)? {
                    Resolution::Css(CssResolve {
                        symbol: StSymbol::Var(var),
                        ..
                    }) => Some(var.value),
                    resolution @ Resolution::Js { .. } => match resolution.js_export()? {
                        JsExport::Value(value) => Some(value),
                        JsExport::Mixin(_) => None,
                    },
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::modules::NullModuleResolver;
    use crate::semantic::processor::{ProcessorOptions, process};
    use rustc_hash::FxHashMap;

    struct MapProvider(FxHashMap<FileKey, Arc<Meta>>);

    impl MapProvider {
        fn build(files: &[(&str, &str)]) -> Self {
            let options = ProcessorOptions::seed_only();
            let map = files
                .iter()
                .map(|(path, css)| {
                    let key = FileKey::new(path).unwrap();
                    let meta = Arc::new(process(key.clone(), css, &options));
                    (key, meta)
                })
                .collect();
            Self(map)
        }

        fn meta(&self, path: &str) -> Arc<Meta> {
            self.0[&FileKey::new(path).unwrap()].clone()
        }
    }

    impl MetaProvider for MapProvider {
        fn meta_for(&self, key: &FileKey) -> Option<Arc<Meta>> {
            self.0.get(key).cloned()
        }
    }

    #[test]
    fn test_default_import_resolves_to_root() {
        let provider = MapProvider::build(&[
            (
                "/p/entry.st.css",
                ":import { -st-from: \"./inner.st.css\"; -st-default: Inner; }",
            ),
            ("/p/inner.st.css", ".x {}"),
        ]);
        let modules = NullModuleResolver;
        let resolver = Resolver::new(&provider, &modules);
        let entry = provider.meta("/p/entry.st.css");
        let mut diagnostics = DiagnosticCollector::new();

        let resolve = resolver
            .resolve_name(&entry, "Inner", &mut diagnostics)
            .unwrap();
        assert_eq!(resolve.symbol.name(), ROOT);
        assert!(resolve.as_class().is_some_and(|c| c.is_root));
        assert_eq!(resolve.meta.namespace, "inner");
    }

    #[test]
    fn test_named_import_follows_reexport_chain() {
        let provider = MapProvider::build(&[
            (
                "/p/entry.st.css",
                ":import { -st-from: \"./mid.st.css\"; -st-named: btn; }",
            ),
            (
                "/p/mid.st.css",
                ":import { -st-from: \"./leaf.st.css\"; -st-named: btn; }",
            ),
            ("/p/leaf.st.css", ".btn {}"),
        ]);
        let modules = NullModuleResolver;
        let resolver = Resolver::new(&provider, &modules);
        let entry = provider.meta("/p/entry.st.css");
        let mut diagnostics = DiagnosticCollector::new();

        let resolve = resolver
            .resolve_name(&entry, "btn", &mut diagnostics)
            .unwrap();
        assert_eq!(resolve.meta.namespace, "leaf");
        assert_eq!(resolve.symbol.name(), "btn");
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_circular_imports_cut_with_diagnostic() {
        let provider = MapProvider::build(&[
            (
                "/p/a.st.css",
                ":import { -st-from: \"./b.st.css\"; -st-named: thing; }",
            ),
            (
                "/p/b.st.css",
                ":import { -st-from: \"./a.st.css\"; -st-named: thing; }",
            ),
        ]);
        let modules = NullModuleResolver;
        let resolver = Resolver::new(&provider, &modules);
        let a = provider.meta("/p/a.st.css");
        let mut diagnostics = DiagnosticCollector::new();

        assert!(resolver.resolve_name(&a, "thing", &mut diagnostics).is_none());
        assert!(diagnostics.has_code(codes::CIRCULAR_RESOLUTION));
    }

    #[test]
    fn test_extends_chain_most_derived_first() {
        let provider = MapProvider::build(&[
            (
                "/p/entry.st.css",
                ":import { -st-from: \"./base.st.css\"; -st-default: Base; }\n.btn { -st-extends: Base; }",
            ),
            ("/p/base.st.css", ".root {}"),
        ]);
        let modules = NullModuleResolver;
        let resolver = Resolver::new(&provider, &modules);
        let entry = provider.meta("/p/entry.st.css");
        let mut diagnostics = DiagnosticCollector::new();

        let chain = resolver.resolve_extends(&entry, "btn", &mut diagnostics);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].symbol.name(), "btn");
        assert_eq!(chain[1].meta.namespace, "base");
        assert_eq!(chain[1].symbol.name(), ROOT);
    }

    #[test]
    fn test_imported_var_value() {
        let provider = MapProvider::build(&[
            (
                "/p/entry.st.css",
                ":import { -st-from: \"./vars.st.css\"; -st-named: color1; }",
            ),
            ("/p/vars.st.css", ":vars { color1: gold; }"),
        ]);
        let modules = NullModuleResolver;
        let resolver = Resolver::new(&provider, &modules);
        let entry = provider.meta("/p/entry.st.css");
        let mut diagnostics = DiagnosticCollector::new();

        assert_eq!(
            resolver.resolve_var_value(&entry, "color1", &mut diagnostics),
            Some("gold".to_string())
        );
    }

    #[test]
    fn test_module_import_resolution() {
        use crate::semantic::modules::{JsExport, JsModule, ModuleRegistry};

        let provider = MapProvider::build(&[(
            "/p/entry.st.css",
            ":import { -st-from: \"theme\"; -st-named: accent; }",
        )]);
        let mut registry = ModuleRegistry::new();
        registry.register(
            "theme",
            JsModule::default().with_named("accent", JsExport::Value("#07c".into())),
        );
        let resolver = Resolver::new(&provider, &registry);
        let entry = provider.meta("/p/entry.st.css");
        let mut diagnostics = DiagnosticCollector::new();

        assert_eq!(
            resolver.resolve_var_value(&entry, "accent", &mut diagnostics),
            Some("#07c".to_string())
        );
    }

    #[test]
    fn test_missing_target_symbol() {
        let provider = MapProvider::build(&[
            (
                "/p/entry.st.css",
                ":import { -st-from: \"./inner.st.css\"; -st-named: ghost; }",
            ),
            ("/p/inner.st.css", ".x {}"),
        ]);
        let modules = NullModuleResolver;
        let resolver = Resolver::new(&provider, &modules);
        let entry = provider.meta("/p/entry.st.css");
        let mut diagnostics = DiagnosticCollector::new();

        assert!(resolver.resolve_name(&entry, "ghost", &mut diagnostics).is_none());
    }
}
