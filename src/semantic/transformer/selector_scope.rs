//! The selector scoping state machine.
//!
//! Walks a parsed selector left to right carrying `(current meta, current
//! symbol)` as context, rewriting each node into its final namespaced form.
//! Context changes when a node crosses into another file (alias forwarding,
//! `-st-extends`, pseudo-element parts) and resets at combinators. There is
//! no backtracking: a node is rewritten once, against the context in effect
//! when it is reached.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::parser::selector::{
    Combinator, Selector, SelectorNode, parse_selectors,
};
use crate::semantic::meta::{Meta, ROOT};
use crate::semantic::resolver::{CssResolve, Resolution, Resolver};
use crate::semantic::symbols::StSymbol;
use crate::semantic::types::{Diagnostic, DiagnosticCollector, codes};

/// Pseudo-classes passed through untouched when no state matches.
const NATIVE_PSEUDO_CLASSES: &[&str] = &[
    "active", "any", "checked", "default", "dir", "disabled", "empty",
    "enabled", "first", "first-child", "first-of-type", "focus", "focus-within",
    "fullscreen", "hover", "indeterminate", "in-range", "invalid", "lang",
    "last-child", "last-of-type", "left", "link", "matches", "not", "nth-child",
    "nth-last-child", "nth-last-of-type", "nth-of-type", "only-child",
    "only-of-type", "optional", "out-of-range", "read-only", "read-write",
    "required", "right", "root", "scope", "target", "valid", "visited",
];

/// Pseudo-elements passed through untouched when no part matches.
const NATIVE_PSEUDO_ELEMENTS: &[&str] = &[
    "after", "backdrop", "before", "cue", "first-letter", "first-line",
    "placeholder", "selection",
];

/// Expansion bound for `@custom-selector` macros referenced as
/// pseudo-elements, matching the textual pre-expansion bound.
const MAX_MACRO_DEPTH: usize = 16;

/// Scopes selectors of one stylesheet against the resolved symbol graph.
pub struct ScopeEngine<'a> {
    pub origin: Arc<Meta>,
    pub resolver: &'a Resolver<'a>,
    macro_depth: usize,
}

/// What a simple node resolved to, as far as root anchoring cares.
#[derive(Clone, Copy, PartialEq)]
enum NodeEmit {
    Plain,
    /// `-st-global` escape or `:global(...)` splice, exempt from anchoring.
    Global,
    /// The file's own root class, already an anchor.
    Root,
}

/// Walk context: the meta whose symbol space the next name is looked up in,
/// and the most recently resolved symbol (states attach to it).
#[derive(Clone)]
struct Context {
    meta: Arc<Meta>,
    symbol: StSymbol,
    /// The node's own symbol when `symbol` was retargeted to an extends
    /// parent; its declared states are checked before the parent's.
    declared: Option<(Arc<Meta>, StSymbol)>,
}

impl<'a> ScopeEngine<'a> {
    pub fn new(origin: Arc<Meta>, resolver: &'a Resolver<'a>) -> Self {
        Self {
            origin,
            resolver,
            macro_depth: 0,
        }
    }

    /// Scope a comma-separated selector list. With `prefix_root`, every
    /// resulting selector whose first compound is not already anchored to
    /// this file's root (or a global escape) gets the scoped root prepended
    /// as a descendant ancestor.
    pub fn scope_selector_list(
        &self,
        text: &str,
        prefix_root: bool,
        diagnostics: &mut DiagnosticCollector,
    ) -> String {
        let mut out = Vec::new();
        for selector in parse_selectors(text) {
            let (scoped, anchored) = self.scope_one(&selector, diagnostics);
            if prefix_root && !anchored {
                out.push(format!("{} {scoped}", self.root_anchor()));
            } else {
                out.push(scoped);
            }
        }
        out.join(", ")
    }

    /// The text every scoped selector must be anchored under: the scoped
    /// root class, or the root's `-st-global` escape when one is declared.
    fn root_anchor(&self) -> String {
        match &self.origin.root().global {
            Some(global) => global.clone(),
            None => format!(".{}", self.origin.scoped_root()),
        }
    }

    fn scope_one(
        &self,
        selector: &Selector,
        diagnostics: &mut DiagnosticCollector,
    ) -> (String, bool) {
        let mut out = String::new();
        let mut context = self.origin_context();
        // set once, by the first simple node
        let mut first_emit: Option<NodeEmit> = None;

        for node in &selector.nodes {
            let before = out.len();
            let mut emitted = NodeEmit::Plain;
            match node {
                SelectorNode::Class(name) => {
                    emitted = self.scope_named(name, false, &mut context, &mut out, diagnostics);
                }
                SelectorNode::Element(name) => {
                    emitted = self.scope_named(name, true, &mut context, &mut out, diagnostics);
                }
                SelectorNode::PseudoClass { name, inner } => {
                    if self.scope_pseudo_class(name, inner.as_deref(), &context, &mut out, diagnostics)
                    {
                        emitted = NodeEmit::Global;
                    }
                }
                SelectorNode::PseudoElement(name) => {
                    self.scope_pseudo_element(name, &mut context, &mut out, diagnostics);
                }
                SelectorNode::Attribute(inner) => {
                    out.push('[');
                    out.push_str(inner);
                    out.push(']');
                }
                SelectorNode::Universal => out.push('*'),
                SelectorNode::Invalid(text) => out.push_str(text),
                SelectorNode::Combinator(combinator) => {
                    out.push_str(match combinator {
                        Combinator::Descendant => " ",
                        Combinator::Child => " > ",
                        Combinator::Adjacent => " + ",
                        Combinator::Sibling => " ~ ",
                    });
                    context = self.origin_context();
                    continue;
                }
            }
            if first_emit.is_none() && out.len() > before {
                first_emit = Some(emitted);
            }
        }

        // anchoring is decided by what the first node resolved to, never by
        // the emitted text (a scoped class name may share the root's prefix)
        let anchored = matches!(first_emit, Some(NodeEmit::Global | NodeEmit::Root));
        (out, anchored)
    }

    fn origin_context(&self) -> Context {
        Context {
            meta: self.origin.clone(),
            symbol: StSymbol::Class(self.origin.root().clone()),
            declared: None,
        }
    }

    // ------------------------------------------------------------
    // class / element nodes
    // ------------------------------------------------------------

    /// Reports what the node resolved to, for the anchoring decision.
    fn scope_named(
        &self,
        name: &SmolStr,
        is_element: bool,
        context: &mut Context,
        out: &mut String,
        diagnostics: &mut DiagnosticCollector,
    ) -> NodeEmit {
        let symbol = context.meta.symbol(name).cloned();
        context.declared = None;
        match symbol {
            Some(StSymbol::Class(class)) => {
                if let Some(global) = &class.global {
                    out.push_str(global);
                    context.symbol = StSymbol::Class(class.clone());
                    return NodeEmit::Global;
                }
                if class.extends.is_none() {
                    if let Some(alias) = &class.alias {
                        if self.forward_alias(alias, context, out, diagnostics) {
                            return NodeEmit::Plain;
                        }
                        diagnostics.add(
                            Diagnostic::warning(format!("could not resolve '{name}'"))
                                .with_code(codes::UNRESOLVED_REFERENCE),
                        );
                    }
                }
                out.push('.');
                out.push_str(&context.meta.scoped_name(name));
                context.symbol = StSymbol::Class(class.clone());
                if let Some(parent) = &class.extends {
                    let declared = (context.meta.clone(), StSymbol::Class(class.clone()));
                    self.append_extends(parent, context, out, diagnostics);
                    context.declared = Some(declared);
                }
                if class.is_root {
                    NodeEmit::Root
                } else {
                    NodeEmit::Plain
                }
            }
            Some(StSymbol::Element(element)) => {
                if element.extends.is_none() {
                    match &element.alias {
                        Some(alias) => {
                            if self.forward_alias(alias, context, out, diagnostics) {
                                return NodeEmit::Plain;
                            }
                            diagnostics.add(
                                Diagnostic::warning(format!("could not resolve '{name}'"))
                                    .with_code(codes::UNRESOLVED_REFERENCE),
                            );
                        }
                        None => {
                            // capitalized tags are component references and
                            // must resolve; lowercase tags are plain markup
                            let capitalized =
                                name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
                            if capitalized {
                                diagnostics.add(
                                    Diagnostic::warning(format!("could not resolve '{name}'"))
                                        .with_code(codes::UNRESOLVED_REFERENCE),
                                );
                            }
                        }
                    }
                }
                out.push_str(name);
                context.symbol = StSymbol::Element(element.clone());
                if let Some(parent) = &element.extends {
                    let declared = (context.meta.clone(), StSymbol::Element(element.clone()));
                    self.append_extends(parent, context, out, diagnostics);
                    context.declared = Some(declared);
                }
                NodeEmit::Plain
            }
            Some(StSymbol::Import(import)) => {
                let mut resolver_diags = DiagnosticCollector::new();
                let resolved = self
                    .resolver
                    .deep_resolve(&context.meta, &import, &mut resolver_diags)
                    .and_then(|r| r.as_css().cloned());
                for diag in resolver_diags.take() {
                    diagnostics.add(diag);
                }
                match resolved {
                    Some(resolve)
                        if matches!(resolve.symbol, StSymbol::Class(_) | StSymbol::Element(_)) =>
                    {
                        self.emit_resolved(&resolve, out);
                        *context = Context {
                            meta: resolve.meta,
                            symbol: resolve.symbol,
                            declared: None,
                        };
                    }
                    _ => {
                        diagnostics.add(
                            Diagnostic::warning(format!("could not resolve '{name}'"))
                                .with_code(codes::UNRESOLVED_REFERENCE),
                        );
                        self.emit_raw(name, is_element, out);
                    }
                }
                NodeEmit::Plain
            }
            Some(StSymbol::Var(_)) => {
                diagnostics.add(
                    Diagnostic::warning(format!("'{name}' is a var, not a selector"))
                        .with_code(codes::UNRESOLVED_REFERENCE),
                );
                self.emit_raw(name, is_element, out);
                NodeEmit::Plain
            }
            None => {
                // Unknown lowercase tags are plain markup names; anything
                // else should have resolved.
                let capitalized = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
                if !is_element || capitalized {
                    diagnostics.add(
                        Diagnostic::warning(format!("could not resolve '{name}'"))
                            .with_code(codes::UNRESOLVED_REFERENCE),
                    );
                }
                self.emit_raw(name, is_element, out);
                NodeEmit::Plain
            }
        }
    }

    /// Transparent alias forwarding: substitute the alias target's scoped
    /// name and retarget the context. Returns false when the alias dead-ends.
    fn forward_alias(
        &self,
        alias: &crate::semantic::symbols::ImportSymbol,
        context: &mut Context,
        out: &mut String,
        diagnostics: &mut DiagnosticCollector,
    ) -> bool {
        let mut resolver_diags = DiagnosticCollector::new();
        let resolved = self
            .resolver
            .deep_resolve(&context.meta, alias, &mut resolver_diags)
            .and_then(|r| match r {
                Resolution::Css(resolve)
                    if matches!(resolve.symbol, StSymbol::Class(_) | StSymbol::Element(_)) =>
                {
                    Some(resolve)
                }
                _ => None,
            });
        for diag in resolver_diags.take() {
            diagnostics.add(diag);
        }
        match resolved {
            Some(resolve) => {
                self.emit_resolved(&resolve, out);
                *context = Context {
                    meta: resolve.meta,
                    symbol: resolve.symbol,
                    declared: None,
                };
                true
            }
            None => false,
        }
    }

    /// `-st-extends` on the matched symbol: emit the resolved target as an
    /// additional compound and retarget the context, so following pseudo
    /// nodes apply to the extended type.
    fn append_extends(
        &self,
        parent: &SmolStr,
        context: &mut Context,
        out: &mut String,
        diagnostics: &mut DiagnosticCollector,
    ) {
        let mut resolver_diags = DiagnosticCollector::new();
        let resolved =
            self.resolver
                .resolve_extend_target(&context.meta, parent, &mut resolver_diags);
        for diag in resolver_diags.take() {
            diagnostics.add(diag);
        }
        match resolved {
            Some(resolve) => {
                self.emit_resolved(&resolve, out);
                *context = Context {
                    meta: resolve.meta,
                    symbol: resolve.symbol,
                    declared: None,
                };
            }
            None => diagnostics.add(
                Diagnostic::warning(format!("could not resolve extends target '{parent}'"))
                    .with_code(codes::UNRESOLVED_REFERENCE),
            ),
        }
    }

    fn emit_resolved(&self, resolve: &CssResolve, out: &mut String) {
        match &resolve.symbol {
            StSymbol::Class(class) => match &class.global {
                Some(global) => out.push_str(global),
                None => {
                    out.push('.');
                    out.push_str(&resolve.meta.scoped_name(&class.name));
                }
            },
            StSymbol::Element(element) => out.push_str(&element.name),
            // deep_resolve never yields these here
            StSymbol::Import(s) => out.push_str(&s.name),
            StSymbol::Var(s) => out.push_str(&s.name),
        }
    }

    fn emit_raw(&self, name: &str, is_element: bool, out: &mut String) {
        if !is_element {
            out.push('.');
        }
        out.push_str(name);
    }

    // ------------------------------------------------------------
    // pseudo-class nodes (states)
    // ------------------------------------------------------------

    /// Returns true for a `:global(...)` splice.
    fn scope_pseudo_class(
        &self,
        name: &SmolStr,
        inner: Option<&str>,
        context: &Context,
        out: &mut String,
        diagnostics: &mut DiagnosticCollector,
    ) -> bool {
        if name == "global" {
            if let Some(inner) = inner {
                // contents are a literal fragment, excluded from scoping
                out.push_str(inner);
                return true;
            }
        }
        if name == "matches" {
            if let Some(inner) = inner {
                let scoped = self
                    .for_meta(context.meta.clone())
                    .scope_selector_list(inner, false, diagnostics);
                out.push_str(":matches(");
                out.push_str(&scoped);
                out.push(')');
                return false;
            }
        }
        if inner.is_none() {
            if let Some(state) = self.state_selector(context, name, diagnostics) {
                out.push_str(&state);
                return false;
            }
        }
        if !NATIVE_PSEUDO_CLASSES.contains(&name.as_str()) {
            diagnostics.add(
                Diagnostic::warning(format!(
                    "unknown pseudo-class ':{name}' on '{}'",
                    context.symbol.name()
                ))
                .with_code(codes::UNKNOWN_STATE),
            );
        }
        out.push(':');
        out.push_str(name);
        if let Some(inner) = inner {
            out.push('(');
            out.push_str(inner);
            out.push(')');
        }
        false
    }

    /// A declared state on the context symbol or its extends chain, rendered
    /// in the owning file's namespace. A symbol retargeted to its extends
    /// parent keeps its own states, checked ahead of the parent's.
    fn state_selector(
        &self,
        context: &Context,
        state: &str,
        diagnostics: &mut DiagnosticCollector,
    ) -> Option<String> {
        if let Some((meta, symbol)) = &context.declared {
            if let Some(states) = symbol.states() {
                if let Some(mapping) = states.get(state) {
                    return Some(render_state(&meta.namespace, state, mapping));
                }
            }
        }
        if let Some(states) = context.symbol.states() {
            if let Some(mapping) = states.get(state) {
                return Some(render_state(&context.meta.namespace, state, mapping));
            }
        }
        let mut resolver_diags = DiagnosticCollector::new();
        let chain = self.resolver.resolve_extends(
            &context.meta,
            context.symbol.name(),
            &mut resolver_diags,
        );
        for diag in resolver_diags.take() {
            diagnostics.add(diag);
        }
        for owner in chain.iter().skip(1) {
            if let Some(states) = owner.symbol.states() {
                if let Some(mapping) = states.get(state) {
                    return Some(render_state(&owner.meta.namespace, state, mapping));
                }
            }
        }
        None
    }

    // ------------------------------------------------------------
    // pseudo-element nodes (parts)
    // ------------------------------------------------------------

    fn scope_pseudo_element(
        &self,
        name: &SmolStr,
        context: &mut Context,
        out: &mut String,
        diagnostics: &mut DiagnosticCollector,
    ) {
        // custom-selector macros take priority over declared parts
        if let Some(expansion) = context.meta.custom_selectors.get(name).cloned() {
            if self.macro_depth >= MAX_MACRO_DEPTH {
                diagnostics.add(
                    Diagnostic::warning(format!(
                        "custom selector '::{name}' expansion did not settle"
                    ))
                    .with_code(codes::RECURSIVE_CUSTOM_SELECTOR),
                );
                out.push_str("::");
                out.push_str(name);
                return;
            }
            let engine = ScopeEngine {
                origin: context.meta.clone(),
                resolver: self.resolver,
                macro_depth: self.macro_depth + 1,
            };
            let scoped = engine.scope_selector_list(&expansion, false, diagnostics);
            out.push_str(" :matches(");
            out.push_str(&scoped);
            out.push(')');
            return;
        }

        if let Some(part) = self.find_part(&context.meta, name, diagnostics) {
            out.push_str(" .");
            out.push_str(&part.meta.scoped_name(name));
            // one extra hop, so later nodes see the true defining meta
            let retarget = match part.symbol.extends() {
                Some(parent) => {
                    let mut resolver_diags = DiagnosticCollector::new();
                    let hop = self.resolver.resolve_extend_target(
                        &part.meta,
                        parent,
                        &mut resolver_diags,
                    );
                    for diag in resolver_diags.take() {
                        diagnostics.add(diag);
                    }
                    hop.unwrap_or_else(|| part.clone())
                }
                None => part.clone(),
            };
            *context = Context {
                meta: retarget.meta,
                symbol: retarget.symbol,
                declared: Some((part.meta, part.symbol)),
            };
            return;
        }

        if !NATIVE_PSEUDO_ELEMENTS.contains(&name.as_str()) {
            diagnostics.add(
                Diagnostic::warning(format!("unknown pseudo-element '::{name}'"))
                    .with_code(codes::UNKNOWN_PSEUDO_ELEMENT),
            );
        }
        out.push_str("::");
        out.push_str(name);
    }

    /// A part named by a pseudo-element: a class/element in the context meta,
    /// or in any ancestor meta along the root's extends chain.
    fn find_part(
        &self,
        meta: &Arc<Meta>,
        name: &str,
        diagnostics: &mut DiagnosticCollector,
    ) -> Option<CssResolve> {
        if let Some(symbol) = meta.symbol(name) {
            if matches!(symbol, StSymbol::Class(_) | StSymbol::Element(_)) {
                return Some(CssResolve {
                    meta: meta.clone(),
                    symbol: symbol.clone(),
                });
            }
        }
        let mut resolver_diags = DiagnosticCollector::new();
        let chain = self.resolver.resolve_extends(meta, ROOT, &mut resolver_diags);
        for diag in resolver_diags.take() {
            diagnostics.add(diag);
        }
        for ancestor in chain.iter().skip(1) {
            if let Some(symbol) = ancestor.meta.symbol(name) {
                if matches!(symbol, StSymbol::Class(_) | StSymbol::Element(_)) {
                    return Some(CssResolve {
                        meta: ancestor.meta.clone(),
                        symbol: symbol.clone(),
                    });
                }
            }
        }
        None
    }

    /// The same engine re-anchored on another file (macro and `:matches`
    /// recursion).
    fn for_meta(&self, meta: Arc<Meta>) -> ScopeEngine<'a> {
        ScopeEngine {
            origin: meta,
            resolver: self.resolver,
            macro_depth: self.macro_depth,
        }
    }
}

fn render_state(namespace: &str, state: &str, mapping: &Option<String>) -> String {
    match mapping {
        Some(literal) => literal.clone(),
        None => format!(
            "[data-{}-{}]",
            namespace.to_lowercase(),
            state.to_lowercase()
        ),
    }
}

/// Rendered selector fragment per state (used by tests asserting the
/// synthesized naming scheme).
#[cfg(test)]
pub(crate) fn rendered_states(
    namespace: &str,
    states: &crate::semantic::symbols::StateMap,
) -> Vec<String> {
    states
        .iter()
        .map(|(name, mapping)| render_state(namespace, name, mapping))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileKey;
    use crate::semantic::modules::NullModuleResolver;
    use crate::semantic::processor::{ProcessorOptions, process};
    use crate::semantic::resolver::MetaProvider;
    use crate::semantic::symbols::StateMap;
    use rustc_hash::FxHashMap;

    struct MapProvider(FxHashMap<FileKey, Arc<Meta>>);

    impl MapProvider {
        fn build(files: &[(&str, &str)]) -> Self {
            let options = ProcessorOptions::seed_only();
            Self(
                files
                    .iter()
                    .map(|(path, css)| {
                        let key = FileKey::new(path).unwrap();
                        (key.clone(), Arc::new(process(key, css, &options)))
                    })
                    .collect(),
            )
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

    fn scope(provider: &MapProvider, path: &str, selector: &str) -> String {
        let modules = NullModuleResolver;
        let resolver = Resolver::new(provider, &modules);
        let engine = ScopeEngine::new(provider.meta(path), &resolver);
        let mut diagnostics = DiagnosticCollector::new();
        engine.scope_selector_list(selector, true, &mut diagnostics)
    }

    #[test]
    fn test_basic_class_scoping_with_root_prefix() {
        let provider = MapProvider::build(&[("/p/entry.st.css", ".b { color: green; }")]);
        assert_eq!(
            scope(&provider, "/p/entry.st.css", ".b"),
            ".entry--root .entry--b"
        );
    }

    #[test]
    fn test_class_sharing_root_name_prefix_is_anchored() {
        let provider = MapProvider::build(&[("/p/entry.st.css", ".rooty { color: red; }")]);
        assert_eq!(
            scope(&provider, "/p/entry.st.css", ".rooty"),
            ".entry--root .entry--rooty"
        );
    }

    #[test]
    fn test_root_not_double_prefixed() {
        let provider = MapProvider::build(&[("/p/entry.st.css", ".root {} .x {}")]);
        assert_eq!(
            scope(&provider, "/p/entry.st.css", ".root .x"),
            ".entry--root .entry--x"
        );
    }

    #[test]
    fn test_extends_emits_double_compound() {
        let provider = MapProvider::build(&[(
            "/p/entry.st.css",
            ".a {} .b { -st-extends: a; }",
        )]);
        assert_eq!(
            scope(&provider, "/p/entry.st.css", ".b"),
            ".entry--root .entry--b.entry--a"
        );
    }

    #[test]
    fn test_unmapped_state_becomes_data_attribute() {
        let provider = MapProvider::build(&[(
            "/p/ns.st.css",
            ".my-class { -st-states: state1, state2(\"[data-mapped]\"); }",
        )]);
        assert_eq!(
            scope(&provider, "/p/ns.st.css", ".my-class:state1"),
            ".ns--root .ns--my-class[data-ns-state1]"
        );
        assert_eq!(
            scope(&provider, "/p/ns.st.css", ".my-class:state2"),
            ".ns--root .ns--my-class[data-mapped]"
        );
    }

    #[test]
    fn test_inherited_state_uses_owner_namespace() {
        let provider = MapProvider::build(&[
            (
                "/p/entry.st.css",
                ":import { -st-from: \"./base.st.css\"; -st-default: Base; }\n.b { -st-extends: Base; }",
            ),
            ("/p/base.st.css", ".root { -st-states: loading; }"),
        ]);
        assert_eq!(
            scope(&provider, "/p/entry.st.css", ".b:loading"),
            ".entry--root .entry--b.base--root[data-base-loading]"
        );
    }

    #[test]
    fn test_own_state_kept_when_extends_retargets() {
        let provider = MapProvider::build(&[
            (
                "/p/entry.st.css",
                ":import { -st-from: \"./base.st.css\"; -st-default: Base; }\n.b { -st-extends: Base; -st-states: mine; }",
            ),
            ("/p/base.st.css", ".root { -st-states: loading; }"),
        ]);
        assert_eq!(
            scope(&provider, "/p/entry.st.css", ".b:mine"),
            ".entry--root .entry--b.base--root[data-entry-mine]"
        );
        assert_eq!(
            scope(&provider, "/p/entry.st.css", ".b:loading"),
            ".entry--root .entry--b.base--root[data-base-loading]"
        );
    }

    #[test]
    fn test_self_referential_macro_pseudo_element_terminates() {
        let provider = MapProvider::build(&[(
            "/p/entry.st.css",
            "@custom-selector :--boom ::boom;\n.x { color: red; }",
        )]);
        let modules = NullModuleResolver;
        let resolver = Resolver::new(&provider, &modules);
        let engine = ScopeEngine::new(provider.meta("/p/entry.st.css"), &resolver);

        let mut diagnostics = DiagnosticCollector::new();
        engine.scope_selector_list(".x::boom", true, &mut diagnostics);
        assert!(diagnostics.has_code(codes::RECURSIVE_CUSTOM_SELECTOR));
    }

    #[test]
    fn test_element_alias_forwards_to_imported_root() {
        let provider = MapProvider::build(&[
            (
                "/p/a.st.css",
                ":import { -st-from: \"./b.st.css\"; -st-default: EntryB; }\nEntryB { color: red; }",
            ),
            ("/p/b.st.css", ".root {}"),
        ]);
        assert_eq!(scope(&provider, "/p/a.st.css", "EntryB"), ".a--root .b--root");
    }

    #[test]
    fn test_global_escape_skips_scoping_and_anchor() {
        let provider = MapProvider::build(&[(
            "/p/entry.st.css",
            ".x { -st-global: \".legacy\"; }",
        )]);
        assert_eq!(scope(&provider, "/p/entry.st.css", ".x"), ".legacy");
    }

    #[test]
    fn test_global_pseudo_contents_left_alone() {
        let provider = MapProvider::build(&[("/p/entry.st.css", ".x {}")]);
        assert_eq!(
            scope(&provider, "/p/entry.st.css", ":global(.raw) .x"),
            ".raw .entry--x"
        );
    }

    #[test]
    fn test_pseudo_element_part_lookup() {
        let provider = MapProvider::build(&[
            (
                "/p/entry.st.css",
                ":import { -st-from: \"./gallery.st.css\"; -st-default: Gallery; }\n.g { -st-extends: Gallery; }",
            ),
            ("/p/gallery.st.css", ".nav {}"),
        ]);
        assert_eq!(
            scope(&provider, "/p/entry.st.css", ".g::nav"),
            ".entry--root .entry--g.gallery--root .gallery--nav"
        );
    }

    #[test]
    fn test_native_pseudo_passthrough_and_unknown_warns() {
        let provider = MapProvider::build(&[("/p/entry.st.css", ".x {}")]);
        let modules = NullModuleResolver;
        let resolver = Resolver::new(&provider, &modules);
        let engine = ScopeEngine::new(provider.meta("/p/entry.st.css"), &resolver);

        let mut diagnostics = DiagnosticCollector::new();
        let scoped = engine.scope_selector_list(".x:hover", true, &mut diagnostics);
        assert_eq!(scoped, ".entry--root .entry--x:hover");
        assert!(!diagnostics.has_code(codes::UNKNOWN_STATE));

        let mut diagnostics = DiagnosticCollector::new();
        engine.scope_selector_list(".x:madeup", true, &mut diagnostics);
        assert!(diagnostics.has_code(codes::UNKNOWN_STATE));
    }

    #[test]
    fn test_plain_elements_stay_bare() {
        let provider = MapProvider::build(&[("/p/entry.st.css", "div {}")]);
        assert_eq!(scope(&provider, "/p/entry.st.css", "div"), ".entry--root div");
    }

    #[test]
    fn test_rendered_state_naming() {
        let mut states = StateMap::new();
        states.insert("Loading".into(), None);
        states.insert("on".into(), Some("[data-x]".to_string()));
        assert_eq!(
            rendered_states("MyNs", &states),
            vec!["[data-myns-loading]".to_string(), "[data-x]".to_string()]
        );
    }
}
