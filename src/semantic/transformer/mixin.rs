//! `-st-mixin` application.
//!
//! Runs before selector scoping. A class mixin splices the source class's
//! declarations into the host rule and turns the source's nested rules into
//! sibling rules right after the host; a function mixin is invoked through
//! the [`ModuleResolver`] and its returned declaration object is spliced the
//! same way. Every failure is a diagnostic, never a fault, and the
//! `-st-mixin` declaration itself is always stripped later with the rest of
//! the directives.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::parser::selector::{SelectorNode, parse_selectors};
use crate::parser::{Declaration, Node, Rule};
use crate::semantic::meta::Meta;
use crate::semantic::modules::{JsExport, MixinObject, MixinValue};
use crate::semantic::processor::{MixinRef, parse_mixin_refs};
use crate::semantic::resolver::{Resolution, Resolver};
use crate::semantic::symbols::StSymbol;
use crate::semantic::types::{Diagnostic, DiagnosticCollector, codes};

use super::selector_scope::ScopeEngine;

pub(super) struct MixinApplier<'a> {
    pub meta: Arc<Meta>,
    pub resolver: &'a Resolver<'a>,
}

impl MixinApplier<'_> {
    pub fn apply(&self, nodes: &mut Vec<Node>, diagnostics: &mut DiagnosticCollector) {
        let mut i = 0;
        while i < nodes.len() {
            if let Node::AtRule(at) = &mut nodes[i] {
                if let Some(body) = &mut at.body {
                    self.apply(body, diagnostics);
                }
                i += 1;
                continue;
            }
            let siblings = self.apply_to_rule(&mut nodes[i], diagnostics);
            let advance = 1 + siblings.len();
            for (offset, sibling) in siblings.into_iter().enumerate() {
                nodes.insert(i + 1 + offset, sibling);
            }
            i += advance;
        }
    }

    fn apply_to_rule(&self, node: &mut Node, diagnostics: &mut DiagnosticCollector) -> Vec<Node> {
        let Node::Rule(rule) = node else {
            return Vec::new();
        };
        // later -st-mixin declarations win, matching directive semantics
        let Some(refs) = rule
            .declarations
            .iter()
            .rev()
            .find(|d| d.prop == "-st-mixin")
            .map(|d| parse_mixin_refs(&d.value).0)
        else {
            return Vec::new();
        };

        let mut siblings = Vec::new();
        for mixin in refs {
            self.apply_one(&mixin, rule, &mut siblings, diagnostics);
        }
        siblings
    }

    fn apply_one(
        &self,
        mixin: &MixinRef,
        host: &mut Rule,
        siblings: &mut Vec<Node>,
        diagnostics: &mut DiagnosticCollector,
    ) {
        match self.meta.symbol(&mixin.name) {
            Some(StSymbol::Class(_)) => {
                self.apply_class_mixin(&self.meta.clone(), &mixin.name, host, siblings, diagnostics);
            }
            Some(StSymbol::Import(import)) => {
                let import = import.clone();
                let mut resolver_diags = DiagnosticCollector::new();
                let resolved = self
                    .resolver
                    .deep_resolve(&self.meta, &import, &mut resolver_diags);
                for diag in resolver_diags.take() {
                    diagnostics.add(diag);
                }
                match resolved {
                    Some(Resolution::Css(resolve)) => match &resolve.symbol {
                        StSymbol::Class(class) => {
                            let name = class.name.clone();
                            self.apply_class_mixin(
                                &resolve.meta,
                                &name,
                                host,
                                siblings,
                                diagnostics,
                            );
                        }
                        other => self.fail(mixin, diagnostics, other.kind_name()),
                    },
                    Some(resolution @ Resolution::Js { .. }) => match resolution.js_export() {
                        Some(JsExport::Mixin(f)) => {
                            self.apply_function_mixin(f.as_ref(), mixin, host, siblings, diagnostics);
                        }
                        Some(JsExport::Value(_)) => self.fail(mixin, diagnostics, "value"),
                        None => self.fail(mixin, diagnostics, "missing export"),
                    },
                    None => self.fail(mixin, diagnostics, "unresolved import"),
                }
            }
            Some(other) => self.fail(mixin, diagnostics, other.kind_name()),
            None => self.fail(mixin, diagnostics, "unknown name"),
        }
    }

    fn fail(&self, mixin: &MixinRef, diagnostics: &mut DiagnosticCollector, what: &str) {
        diagnostics.add(
            Diagnostic::warning(format!("mixin '{}' cannot be applied ({what})", mixin.name))
                .with_code(codes::MIXIN_FAILED),
        );
    }

    // ------------------------------------------------------------
    // class mixins
    // ------------------------------------------------------------

    fn apply_class_mixin(
        &self,
        source: &Arc<Meta>,
        class: &SmolStr,
        host: &mut Rule,
        siblings: &mut Vec<Node>,
        diagnostics: &mut DiagnosticCollector,
    ) {
        let engine = ScopeEngine::new(source.clone(), self.resolver);
        let scoped_class = format!(".{}", source.scoped_name(class));

        for node in &source.ast.nodes {
            let Node::Rule(rule) = node else { continue };
            for selector in parse_selectors(&rule.selector) {
                let leads = matches!(
                    selector.nodes.first(),
                    Some(SelectorNode::Class(name)) if name == class
                );
                if !leads {
                    continue;
                }
                if selector.nodes.len() == 1 {
                    splice_declarations(host, &rule.declarations);
                    continue;
                }
                // nested rule: re-anchor the remainder on the host selector,
                // pre-scoped in the source file so the host pass leaves it be
                let scoped = engine.scope_selector_list(&rule.selector, false, diagnostics);
                let Some(remainder) = scoped.strip_prefix(&scoped_class) else {
                    continue;
                };
                let selector = if let Some(descendant) = remainder.strip_prefix(' ') {
                    format!("{} :global({})", host.selector, descendant)
                } else {
                    format!("{}:global({})", host.selector, remainder)
                };
                siblings.push(Node::Rule(Rule {
                    selector,
                    declarations: rule
                        .declarations
                        .iter()
                        .filter(|d| !d.prop.starts_with("-st-"))
                        .cloned()
                        .collect(),
                    span: host.span,
                }));
            }
        }
    }

    // ------------------------------------------------------------
    // function mixins
    // ------------------------------------------------------------

    fn apply_function_mixin(
        &self,
        f: &crate::semantic::modules::MixinFn,
        mixin: &MixinRef,
        host: &mut Rule,
        siblings: &mut Vec<Node>,
        diagnostics: &mut DiagnosticCollector,
    ) {
        let args: Vec<String> = mixin
            .args
            .iter()
            .map(|arg| self.expand_arg(arg, diagnostics))
            .collect();
        match f(&args) {
            Ok(object) => {
                let selector = host.selector.clone();
                let span = host.span;
                self.splice_object(&object, &selector, &mut host.declarations, span, siblings);
            }
            Err(message) => diagnostics.add(
                Diagnostic::warning(format!("mixin '{}' failed: {message}", mixin.name))
                    .with_code(codes::MIXIN_FAILED),
            ),
        }
    }

    /// Mixin arguments support `value()` references against the host file.
    fn expand_arg(&self, arg: &str, diagnostics: &mut DiagnosticCollector) -> String {
        use crate::semantic::value_expander::{ValueHooks, expand_value};

        struct Hooks<'a, 'b> {
            applier: &'a MixinApplier<'b>,
            diagnostics: &'a mut DiagnosticCollector,
        }
        impl ValueHooks for Hooks<'_, '_> {
            fn lookup(&mut self, name: &str) -> Option<String> {
                let mut inner = DiagnosticCollector::new();
                let value =
                    self.applier
                        .resolver
                        .resolve_var_value(&self.applier.meta, name, &mut inner);
                for diag in inner.take() {
                    self.diagnostics.add(diag);
                }
                value
            }
        }
        let mut hooks = Hooks {
            applier: self,
            diagnostics,
        };
        expand_value(arg, &mut hooks)
    }

    fn splice_object(
        &self,
        object: &MixinObject,
        selector: &str,
        target: &mut Vec<Declaration>,
        span: crate::base::Span,
        siblings: &mut Vec<Node>,
    ) {
        for (key, value) in object {
            match value {
                MixinValue::Decl(text) => target.push(Declaration {
                    prop: SmolStr::new(key),
                    value: text.clone(),
                    span,
                }),
                MixinValue::Nested(nested) => {
                    let nested_selector = if key.contains('&') {
                        key.replace('&', selector)
                    } else {
                        format!("{selector} {key}")
                    };
                    let mut rule = Rule {
                        selector: nested_selector.clone(),
                        declarations: Vec::new(),
                        span,
                    };
                    let mut deeper = Vec::new();
                    self.splice_object(
                        nested,
                        &nested_selector,
                        &mut rule.declarations,
                        span,
                        &mut deeper,
                    );
                    siblings.push(Node::Rule(rule));
                    siblings.extend(deeper);
                }
            }
        }
    }
}

fn splice_declarations(host: &mut Rule, declarations: &[Declaration]) {
    for decl in declarations {
        if decl.prop.starts_with("-st-") {
            continue;
        }
        host.declarations.push(decl.clone());
    }
}
