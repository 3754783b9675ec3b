//! Stylesheet transformation: resolved symbols -> plain namespaced CSS.
//!
//! Consumes a processed [`Meta`] (read-only, via `Arc`) and produces a fresh
//! output tree plus the export table. The pipeline is strictly ordered:
//! keyframes scoping, mixin application, selector scoping with root
//! anchoring, declaration value rewriting, theme override rule emission, and
//! finally export construction. Diagnostics go to a per-pass collector that
//! travels with the output.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::parser::{Declaration, Node, Rule, Stylesheet, stylesheet_to_css};

use super::meta::Meta;
use super::modules::{JsExport, ModuleResolver};
use super::resolver::{CssResolve, MetaProvider, Resolution, Resolver};
use super::symbols::{ImportTarget, StSymbol};
use super::types::{Diagnostic, DiagnosticCollector, codes};
use super::value_expander::{ValueHooks, expand_value};

mod exports;
mod mixin;
mod selector_scope;

pub use selector_scope::ScopeEngine;

/// Keyframe names that are CSS keywords and must not be scoped.
const RESERVED_KEYFRAME_NAMES: &[&str] = &["inherit", "initial", "none", "revert", "unset"];

/// The result of one transform pass.
#[derive(Debug)]
pub struct TransformOutput {
    pub stylesheet: Stylesheet,
    /// Local symbol name -> space-separated scoped identifiers (or the
    /// resolved value, for vars).
    pub exports: IndexMap<String, String>,
    pub diagnostics: DiagnosticCollector,
}

impl TransformOutput {
    /// Serialize the output tree to CSS text.
    pub fn css(&self) -> String {
        stylesheet_to_css(&self.stylesheet)
    }
}

pub struct StylesheetTransformer<'a> {
    meta: Arc<Meta>,
    files: &'a dyn MetaProvider,
    modules: &'a dyn ModuleResolver,
}

impl<'a> StylesheetTransformer<'a> {
    pub fn new(
        meta: Arc<Meta>,
        files: &'a dyn MetaProvider,
        modules: &'a dyn ModuleResolver,
    ) -> Self {
        Self {
            meta,
            files,
            modules,
        }
    }

    pub fn transform(&self) -> TransformOutput {
        let mut diagnostics = DiagnosticCollector::new();
        let resolver = Resolver::new(self.files, self.modules);
        let mut nodes = self.meta.ast.nodes.clone();
        debug!(source = %self.meta.source, "transforming stylesheet");

        let keyframes = self.scope_keyframes(&mut nodes, &mut diagnostics);
        self.rewrite_animations(&mut nodes, &keyframes);

        let applier = mixin::MixinApplier {
            meta: self.meta.clone(),
            resolver: &resolver,
        };
        applier.apply(&mut nodes, &mut diagnostics);

        let engine = ScopeEngine::new(self.meta.clone(), &resolver);
        self.rewrite_nodes(&mut nodes, &engine, &resolver, false, &mut diagnostics);

        self.append_theme_overrides(&mut nodes, &resolver, &mut diagnostics);

        let mut resolve_var = |name: &str, diags: &mut DiagnosticCollector| {
            let raw = format!("value({name})");
            let expanded = self.expand_declaration_value(&raw, &resolver, None, diags);
            (expanded != raw).then_some(expanded)
        };
        let exports = exports::build_exports(
            &self.meta,
            self.files,
            &resolver,
            &mut resolve_var,
            &mut diagnostics,
        );

        TransformOutput {
            stylesheet: Stylesheet { nodes },
            exports,
            diagnostics,
        }
    }

    // ------------------------------------------------------------
    // step 1: keyframes
    // ------------------------------------------------------------

    fn scope_keyframes(
        &self,
        nodes: &mut [Node],
        diagnostics: &mut DiagnosticCollector,
    ) -> FxHashMap<SmolStr, String> {
        let mut scoped = FxHashMap::default();
        self.walk_keyframes(nodes, &mut scoped, diagnostics);
        scoped
    }

    fn walk_keyframes(
        &self,
        nodes: &mut [Node],
        scoped: &mut FxHashMap<SmolStr, String>,
        diagnostics: &mut DiagnosticCollector,
    ) {
        for node in nodes {
            let Node::AtRule(at) = node else { continue };
            if at.name != "keyframes" {
                if let Some(body) = &mut at.body {
                    self.walk_keyframes(body, scoped, diagnostics);
                }
                continue;
            }
            let Some(name) = at.params.split_whitespace().next().map(str::to_owned) else {
                continue;
            };
            if RESERVED_KEYFRAME_NAMES.contains(&name.as_str()) {
                diagnostics.add(
                    Diagnostic::error(format!("keyframes '{name}' is a reserved name"))
                        .with_code(codes::RESERVED_KEYFRAME_NAME)
                        .with_span(at.span),
                );
                continue;
            }
            let replacement = self.meta.scoped_name(&name);
            at.params = at.params.replacen(&name, &replacement, 1);
            scoped.insert(SmolStr::new(&name), replacement);
        }
    }

    fn rewrite_animations(&self, nodes: &mut [Node], scoped: &FxHashMap<SmolStr, String>) {
        if scoped.is_empty() {
            return;
        }
        for node in nodes {
            match node {
                Node::Rule(rule) => {
                    for decl in &mut rule.declarations {
                        if decl.prop == "animation" || decl.prop == "animation-name" {
                            decl.value = rewrite_tokens(&decl.value, scoped);
                        }
                    }
                }
                Node::AtRule(at) => {
                    if let Some(body) = &mut at.body {
                        self.rewrite_animations(body, scoped);
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------
    // steps 3-5: selectors, values, directive stripping
    // ------------------------------------------------------------

    fn rewrite_nodes(
        &self,
        nodes: &mut [Node],
        engine: &ScopeEngine<'_>,
        resolver: &Resolver<'_>,
        in_keyframes: bool,
        diagnostics: &mut DiagnosticCollector,
    ) {
        for node in nodes {
            match node {
                Node::Rule(rule) => {
                    if !in_keyframes {
                        rule.selector =
                            engine.scope_selector_list(&rule.selector, true, diagnostics);
                    }
                    rule.declarations.retain(|d| !d.prop.starts_with("-st-"));
                    for decl in &mut rule.declarations {
                        decl.value = self.expand_declaration_value(
                            &decl.value,
                            resolver,
                            None,
                            diagnostics,
                        );
                    }
                }
                Node::AtRule(at) => {
                    if at.name == "media" {
                        at.params =
                            self.expand_declaration_value(&at.params, resolver, None, diagnostics);
                    }
                    let nested_keyframes = at.name == "keyframes";
                    if let Some(body) = &mut at.body {
                        self.rewrite_nodes(
                            body,
                            engine,
                            resolver,
                            in_keyframes || nested_keyframes,
                            diagnostics,
                        );
                    }
                }
            }
        }
    }

    /// Resolver-backed `value()` expansion for declaration values, `@media`
    /// params, and export values. `overrides` (theme processing) shadows
    /// every other lookup.
    fn expand_declaration_value(
        &self,
        text: &str,
        resolver: &Resolver<'_>,
        overrides: Option<&FxHashMap<SmolStr, String>>,
        diagnostics: &mut DiagnosticCollector,
    ) -> String {
        self.expand_in_meta(text, &self.meta, resolver, overrides, diagnostics)
    }

    fn expand_in_meta(
        &self,
        text: &str,
        meta: &Arc<Meta>,
        resolver: &Resolver<'_>,
        overrides: Option<&FxHashMap<SmolStr, String>>,
        diagnostics: &mut DiagnosticCollector,
    ) -> String {
        struct Hooks<'h> {
            meta: &'h Arc<Meta>,
            resolver: &'h Resolver<'h>,
            overrides: Option<&'h FxHashMap<SmolStr, String>>,
            diagnostics: &'h mut DiagnosticCollector,
        }

        impl ValueHooks for Hooks<'_> {
            fn lookup(&mut self, name: &str) -> Option<String> {
                if let Some(overrides) = self.overrides {
                    if let Some(value) = overrides.get(name) {
                        return Some(value.clone());
                    }
                }
                match self.meta.symbol(name)? {
                    StSymbol::Var(var) => Some(var.text.clone()),
                    StSymbol::Import(import) => {
                        let import = import.clone();
                        let mut inner = DiagnosticCollector::new();
                        let resolved = self.resolver.deep_resolve(self.meta, &import, &mut inner);
                        for diag in inner.take() {
                            self.diagnostics.add(diag);
                        }
                        match resolved? {
                            Resolution::Css(CssResolve {
                                symbol: StSymbol::Var(var),
                                ..
                            }) => Some(var.value),
                            Resolution::Css(_) => {
                                self.diagnostics.add(
                                    Diagnostic::warning(format!(
                                        "stylesheet symbol '{name}' cannot be used as a value"
                                    ))
                                    .with_code(codes::INVALID_VALUE_KIND),
                                );
                                None
                            }
                            resolution @ Resolution::Js { .. } => match resolution.js_export() {
                                Some(JsExport::Value(value)) => Some(value),
                                Some(JsExport::Mixin(_)) => {
                                    self.diagnostics.add(
                                        Diagnostic::warning(format!(
                                            "mixin '{name}' cannot be used as a value"
                                        ))
                                        .with_code(codes::INVALID_VALUE_KIND),
                                    );
                                    None
                                }
                                None => None,
                            },
                        }
                    }
                    _ => None,
                }
            }

            fn cyclic(&mut self, path: &[SmolStr]) {
                self.diagnostics.add(
                    Diagnostic::warning(format!(
                        "cyclic value reference: {}",
                        path.iter()
                            .map(SmolStr::as_str)
                            .collect::<Vec<_>>()
                            .join(" -> ")
                    ))
                    .with_code(codes::CYCLIC_VALUE),
                );
            }
        }

        let mut hooks = Hooks {
            meta,
            resolver,
            overrides,
            diagnostics,
        };
        expand_value(text, &mut hooks)
    }

    // ------------------------------------------------------------
    // step 6: theme override rules
    // ------------------------------------------------------------

    /// Vars overridden through a `theme:true` import re-emit the theme's
    /// affected rules, re-anchored on this file's root, with the overridden
    /// values substituted.
    fn append_theme_overrides(
        &self,
        nodes: &mut Vec<Node>,
        resolver: &Resolver<'_>,
        diagnostics: &mut DiagnosticCollector,
    ) {
        for record in &self.meta.imports {
            if !record.theme || record.overrides.is_empty() {
                continue;
            }
            let ImportTarget::Stylesheet(path) = &record.target else {
                continue;
            };
            let Ok(key) = crate::base::FileKey::new(path) else {
                continue;
            };
            let Some(theme) = self.files.meta_for(&key) else {
                diagnostics.add(
                    Diagnostic::warning(format!("theme '{}' could not be loaded", record.request))
                        .with_code(codes::UNRESOLVED_REFERENCE)
                        .with_span(record.span),
                );
                continue;
            };

            let overrides: FxHashMap<SmolStr, String> = record
                .overrides
                .iter()
                .map(|d| (d.prop.clone(), d.value.clone()))
                .collect();
            let theme_engine = ScopeEngine::new(theme.clone(), resolver);
            let theme_anchor = format!(".{}", theme.scoped_root());
            let own_anchor = format!(".{}", self.meta.scoped_root());

            for node in &theme.ast.nodes {
                let Node::Rule(rule) = node else { continue };
                let mut changed = Vec::new();
                for decl in &rule.declarations {
                    if decl.prop.starts_with("-st-") {
                        continue;
                    }
                    let base =
                        self.expand_in_meta(&decl.value, &theme, resolver, None, diagnostics);
                    let with_override = self.expand_in_meta(
                        &decl.value,
                        &theme,
                        resolver,
                        Some(&overrides),
                        diagnostics,
                    );
                    if base != with_override {
                        changed.push(Declaration {
                            prop: decl.prop.clone(),
                            value: with_override,
                            span: decl.span,
                        });
                    }
                }
                if changed.is_empty() {
                    continue;
                }
                let scoped = theme_engine.scope_selector_list(&rule.selector, true, diagnostics);
                // re-anchor under the importing root
                let selector = match scoped.strip_prefix(&theme_anchor) {
                    Some(rest) => format!("{own_anchor}{rest}"),
                    None => format!("{own_anchor} {scoped}"),
                };
                nodes.push(Node::Rule(Rule {
                    selector,
                    declarations: changed,
                    span: record.span,
                }));
            }
        }
    }
}

/// Replace whole identifier tokens per the map, leaving separators alone.
fn rewrite_tokens(value: &str, map: &FxHashMap<SmolStr, String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut token = String::new();
    for c in value.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            token.push(c);
        } else {
            flush_token(&mut out, &mut token, map);
            out.push(c);
        }
    }
    flush_token(&mut out, &mut token, map);
    out
}

fn flush_token(out: &mut String, token: &mut String, map: &FxHashMap<SmolStr, String>) {
    if token.is_empty() {
        return;
    }
    match map.get(token.as_str()) {
        Some(scoped) => out.push_str(scoped),
        None => out.push_str(token),
    }
    token.clear();
}

/// Convenience entry point mirroring the processor's `process`.
pub fn transform(
    meta: Arc<Meta>,
    files: &dyn MetaProvider,
    modules: &dyn ModuleResolver,
) -> TransformOutput {
    StylesheetTransformer::new(meta, files, modules).transform()
}
