//! Symbol table builder: parsed stylesheet -> [`Meta`].
//!
//! Builds the per-file meta-model in a single document-order pass:
//! `@namespace` extraction, keyframe and custom-selector collection, macro
//! pre-expansion, rule dispatch (`:import` / `:vars` / plain rules), directive
//! attachment, and the local `value()` scan. Nothing here is fatal: the build
//! always returns a Meta and problems accumulate as diagnostics.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::FileKey;
use crate::parser::selector::{
    self, Selector, SelectorNode, parse_selectors, split_top_level,
};
use crate::parser::{Declaration, Node, Rule, Stylesheet, parse_stylesheet};

use super::meta::Meta;
use super::symbols::{
    ClassSymbol, ElementSymbol, ImportKind, ImportRecord, ImportSymbol, StSymbol, StateMap,
    VarSymbol,
};
use super::types::{Diagnostic, codes};
use super::value_expander::{ValueHooks, collect_value_names, expand_value};

/// Bound on textual custom-selector macro expansion.
const MAX_MACRO_DEPTH: usize = 16;

/// Builds the per-file namespace string from a seed and the source identity.
pub type NamespaceBuilder = Arc<dyn Fn(&str, &FileKey) -> String + Send + Sync>;

#[derive(Clone)]
pub struct ProcessorOptions {
    pub namespace_builder: NamespaceBuilder,
}

impl ProcessorOptions {
    /// Default: `<seed><stable hash of the absolute source path>`.
    pub fn hashed() -> Self {
        Self {
            namespace_builder: Arc::new(|seed, source| {
                let mut hasher = FxHasher::default();
                source.as_path().hash(&mut hasher);
                format!("{seed}{:012x}", hasher.finish() & 0xffff_ffff_ffff)
            }),
        }
    }

    /// Namespace is the seed alone. Useful for hosts that guarantee unique
    /// seeds themselves, and for predictable output in tests.
    pub fn seed_only() -> Self {
        Self {
            namespace_builder: Arc::new(|seed, _| seed.to_string()),
        }
    }
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self::hashed()
    }
}

impl std::fmt::Debug for ProcessorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorOptions").finish_non_exhaustive()
    }
}

/// A single `-st-mixin` reference: `name` or `name(arg1, arg2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinRef {
    pub name: SmolStr,
    pub args: Vec<String>,
}

/// Build a [`Meta`] from stylesheet text.
pub fn process(source: FileKey, css: &str, options: &ProcessorOptions) -> Meta {
    StylesheetProcessor::new(source, css, options).run()
}

struct StylesheetProcessor {
    meta: Meta,
    nodes: Vec<Node>,
}

impl StylesheetProcessor {
    fn new(source: FileKey, css: &str, options: &ProcessorOptions) -> Self {
        let parse = parse_stylesheet(css);
        let mut nodes = parse.stylesheet.nodes;

        // 1. @namespace: last valid quoted value wins; the at-rules are
        // removed either way.
        let mut declared: Option<String> = None;
        let mut invalid_namespace = None;
        nodes.retain(|node| match node {
            Node::AtRule(at) if at.name == "namespace" => {
                match quoted(&at.params).filter(|ns| is_ident(ns)) {
                    Some(ns) => declared = Some(ns),
                    None => invalid_namespace = Some(at.span),
                }
                false
            }
            _ => true,
        });
        let seed = declared.unwrap_or_else(|| source.basename_seed());
        let namespace = (options.namespace_builder)(&seed, &source);
        trace!(source = %source, %namespace, "processing stylesheet");

        let mut meta = Meta::new(source, namespace);
        for error in &parse.errors {
            meta.diagnostics
                .add(Diagnostic::warning(error.message.clone()).with_span(error.span));
        }
        if let Some(span) = invalid_namespace {
            meta.diagnostics
                .add(Diagnostic::warning("invalid @namespace value").with_span(span));
        }

        Self { meta, nodes }
    }

    fn run(mut self) -> Meta {
        self.collect_keyframes();
        self.collect_custom_selectors();
        self.expand_custom_selector_usages();

        let nodes = std::mem::take(&mut self.nodes);
        let nodes = self.process_nodes(nodes, false);
        self.meta.ast = Stylesheet { nodes };
        self.meta
    }

    // ============================================================
    // At-rule collection
    // ============================================================

    fn collect_keyframes(&mut self) {
        fn walk(nodes: &[Node], out: &mut Vec<SmolStr>) {
            for node in nodes {
                if let Node::AtRule(at) = node {
                    if at.name == "keyframes" {
                        if let Some(name) = at.params.split_whitespace().next() {
                            out.push(SmolStr::new(name));
                        }
                    } else if let Some(body) = &at.body {
                        walk(body, out);
                    }
                }
            }
        }
        let mut names = Vec::new();
        walk(&self.nodes, &mut names);
        self.meta.keyframes = names;
    }

    fn collect_custom_selectors(&mut self) {
        let mut macros = Vec::new();
        self.nodes.retain(|node| match node {
            Node::AtRule(at) if at.name == "custom-selector" => {
                // Params look like `:--name <selector>`. Names that do not
                // match the pattern are dropped without a report.
                if let Some(rest) = at.params.strip_prefix(":--") {
                    let name_end = rest
                        .find(|c: char| c.is_whitespace())
                        .unwrap_or(rest.len());
                    let (name, selector_text) = rest.split_at(name_end);
                    if is_ident(name) && !selector_text.trim().is_empty() {
                        macros.push((SmolStr::new(name), selector_text.trim().to_string()));
                    }
                }
                false
            }
            _ => true,
        });
        for (name, text) in macros {
            self.meta.custom_selectors.insert(name, text);
        }
    }

    /// Textual pre-pass: rewrite `:--name` usages into `:matches(...)` in
    /// every rule selector, before any structural selector parsing. Bounded,
    /// so self-expanding macros terminate with a diagnostic.
    fn expand_custom_selector_usages(&mut self) {
        if self.meta.custom_selectors.is_empty() {
            return;
        }
        fn walk(nodes: &mut [Node], meta: &mut Meta) {
            for node in nodes {
                match node {
                    Node::Rule(rule) => {
                        let mut depth = 0;
                        loop {
                            let expanded = expand_macros_once(&rule.selector, meta);
                            match expanded {
                                Some(next) => rule.selector = next,
                                None => break,
                            }
                            depth += 1;
                            if depth >= MAX_MACRO_DEPTH {
                                meta.diagnostics.add(
                                    Diagnostic::warning(format!(
                                        "custom selector expansion did not settle in '{}'",
                                        rule.selector
                                    ))
                                    .with_code(codes::RECURSIVE_CUSTOM_SELECTOR)
                                    .with_span(rule.span),
                                );
                                break;
                            }
                        }
                    }
                    Node::AtRule(at) => {
                        if let Some(body) = &mut at.body {
                            walk(body, meta);
                        }
                    }
                }
            }
        }
        let mut nodes = std::mem::take(&mut self.nodes);
        walk(&mut nodes, &mut self.meta);
        self.nodes = nodes;
    }

    // ============================================================
    // Rule dispatch
    // ============================================================

    fn process_nodes(&mut self, nodes: Vec<Node>, in_keyframes: bool) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Rule(rule) => {
                    if in_keyframes {
                        // Frame selectors (from/to/percentages) declare nothing
                        out.push(Node::Rule(rule));
                    } else if let Some(rule) = self.process_rule(rule) {
                        out.push(Node::Rule(rule));
                    }
                }
                Node::AtRule(mut at) => {
                    let nested_keyframes = at.name == "keyframes";
                    if let Some(body) = at.body.take() {
                        at.body = Some(self.process_nodes(body, in_keyframes || nested_keyframes));
                    }
                    out.push(Node::AtRule(at));
                }
            }
        }
        out
    }

    /// Returns the rule to retain in the tree, or `None` when consumed
    /// (`:import`, `:vars`).
    fn process_rule(&mut self, rule: Rule) -> Option<Rule> {
        let selectors = parse_selectors(&rule.selector);

        if selectors.len() == 1 {
            match selector::as_simple_pseudo_class(&selectors[0]).map(SmolStr::as_str) {
                Some("import") => {
                    self.process_import(&rule);
                    return None;
                }
                Some("vars") => {
                    self.process_vars(&rule);
                    return None;
                }
                _ => {}
            }
        }
        // `:import`/`:vars` anywhere but as the entire selector is misuse
        for sel in &selectors {
            for node in &sel.nodes {
                if let SelectorNode::PseudoClass { name, .. } = node {
                    if name == "import" || name == "vars" {
                        self.meta.diagnostics.add(
                            Diagnostic::error(format!(
                                "':{name}' is allowed only as the entire selector"
                            ))
                            .with_code(codes::INVALID_DIRECTIVE_TARGET)
                            .with_span(rule.span),
                        );
                    }
                }
            }
        }

        for sel in &selectors {
            self.check_root_position(sel, &rule);
            self.register_selector_symbols(sel);
        }
        self.process_declarations(&rule, &selectors);
        Some(rule)
    }

    fn check_root_position(&mut self, sel: &Selector, rule: &Rule) {
        let mut after_combinator = false;
        for node in &sel.nodes {
            match node {
                SelectorNode::Combinator(_) => after_combinator = true,
                SelectorNode::Class(name) if name == "root" && after_combinator => {
                    self.meta.diagnostics.add(
                        Diagnostic::error("'.root' is only allowed at the selector start")
                            .with_code(codes::ROOT_AFTER_SPACE)
                            .with_span(rule.span),
                    );
                }
                _ => {}
            }
        }
    }

    fn register_selector_symbols(&mut self, sel: &Selector) {
        for node in &sel.nodes {
            match node {
                SelectorNode::Class(name) => self.register_class(name),
                SelectorNode::Element(name) => self.register_element(name),
                SelectorNode::PseudoClass {
                    inner: Some(inner), ..
                } => {
                    // Functional pseudo-classes may nest full selectors
                    for nested in parse_selectors(inner) {
                        self.register_selector_symbols(&nested);
                    }
                }
                _ => {}
            }
        }
    }

    fn register_class(&mut self, name: &SmolStr) {
        if self.meta.classes.contains(name) {
            return;
        }
        let alias = match self.meta.mapped_symbols.get(name) {
            None => None,
            Some(StSymbol::Import(import)) => Some(import.clone()),
            Some(other) => {
                self.meta.diagnostics.add(
                    Diagnostic::error(format!(
                        "'{name}' is already declared as a {}",
                        other.kind_name()
                    ))
                    .with_code(codes::REDECLARED_SYMBOL),
                );
                return;
            }
        };
        self.meta.classes.insert(name.clone());
        self.meta.mapped_symbols.insert(
            name.clone(),
            StSymbol::Class(ClassSymbol {
                name: name.clone(),
                alias,
                ..Default::default()
            }),
        );
    }

    fn register_element(&mut self, name: &SmolStr) {
        if self.meta.elements.contains(name) {
            return;
        }
        let capitalized = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        let alias = match self.meta.mapped_symbols.get(name) {
            Some(StSymbol::Import(import)) if capitalized => Some(import.clone()),
            Some(StSymbol::Import(_)) => {
                // Lowercase tags never alias imports; keep the import binding
                return;
            }
            Some(other) if capitalized => {
                self.meta.diagnostics.add(
                    Diagnostic::warning(format!(
                        "element '{name}' conflicts with a {} of the same name",
                        other.kind_name()
                    ))
                    .with_code(codes::ALIAS_CONFLICT),
                );
                return;
            }
            Some(_) => return,
            None => None,
        };
        self.meta.elements.insert(name.clone());
        self.meta.mapped_symbols.insert(
            name.clone(),
            StSymbol::Element(ElementSymbol {
                name: name.clone(),
                alias,
                extends: None,
            }),
        );
    }

    // ============================================================
    // :import
    // ============================================================

    fn process_import(&mut self, rule: &Rule) {
        let mut request: Option<String> = None;
        let mut default_alias: Option<SmolStr> = None;
        let mut named = indexmap::IndexMap::new();
        let mut theme = false;
        let mut overrides: Vec<Declaration> = Vec::new();

        for decl in &rule.declarations {
            match decl.prop.as_str() {
                "-st-from" => request = Some(quoted(&decl.value).unwrap_or(decl.value.clone())),
                "-st-default" => default_alias = Some(SmolStr::new(decl.value.trim())),
                "-st-named" => {
                    for part in split_top_level(&decl.value, ',') {
                        let part = part.trim();
                        if part.is_empty() {
                            continue;
                        }
                        let mut words = part.split_whitespace();
                        match (words.next(), words.next(), words.next(), words.next()) {
                            (Some(source), Some("as"), Some(alias), None) => {
                                named.insert(SmolStr::new(alias), SmolStr::new(source));
                            }
                            (Some(source), None, ..) => {
                                named.insert(SmolStr::new(source), SmolStr::new(source));
                            }
                            _ => self.meta.diagnostics.add(
                                Diagnostic::warning(format!("invalid -st-named entry '{part}'"))
                                    .with_span(decl.span),
                            ),
                        }
                    }
                }
                "-st-theme" => theme = decl.value.trim() == "true",
                _ => overrides.push(decl.clone()),
            }
        }

        let Some(request) = request else {
            self.meta.diagnostics.add(
                Diagnostic::error("':import' is missing '-st-from'")
                    .with_code(codes::MISSING_FROM)
                    .with_span(rule.span),
            );
            return;
        };
        if !theme && !overrides.is_empty() {
            for decl in &overrides {
                self.meta.diagnostics.add(
                    Diagnostic::warning(format!(
                        "'{}' is not allowed inside a non-theme ':import'",
                        decl.prop
                    ))
                    .with_code(codes::OVERRIDE_WITHOUT_THEME)
                    .with_span(decl.span),
                );
            }
            overrides.clear();
        }

        let source = self.meta.source.clone();
        let target = ImportRecord::classify_target(&request, |r| source.join_request(r));
        let record = ImportRecord {
            request,
            target,
            default_alias: default_alias.clone(),
            named: named.clone(),
            theme,
            overrides,
            span: rule.span,
        };
        let import_index = self.meta.imports.len();
        self.meta.imports.push(record);

        if let Some(alias) = default_alias {
            self.register_import_symbol(alias, ImportKind::Default, import_index);
        }
        for (alias, source_name) in named {
            self.register_import_symbol(
                alias,
                ImportKind::Named {
                    source_name: source_name.clone(),
                },
                import_index,
            );
        }
    }

    fn register_import_symbol(&mut self, name: SmolStr, kind: ImportKind, import_index: usize) {
        if let Some(existing) = self.meta.mapped_symbols.get(&name) {
            self.meta.diagnostics.add(
                Diagnostic::error(format!(
                    "import '{name}' shadowed by an existing {}",
                    existing.kind_name()
                ))
                .with_code(codes::REDECLARED_SYMBOL),
            );
            return;
        }
        self.meta.mapped_symbols.insert(
            name.clone(),
            StSymbol::Import(ImportSymbol {
                name,
                kind,
                import_index,
            }),
        );
    }

    // ============================================================
    // :vars
    // ============================================================

    fn process_vars(&mut self, rule: &Rule) {
        for decl in &rule.declarations {
            let name = decl.prop.clone();

            struct LocalHooks<'m> {
                meta: &'m mut Meta,
                span: crate::base::Span,
            }
            impl ValueHooks for LocalHooks<'_> {
                fn lookup(&mut self, name: &str) -> Option<String> {
                    match self.meta.mapped_symbols.get(name) {
                        Some(StSymbol::Var(var)) => Some(var.value.clone()),
                        // Imported values resolve at transform time
                        Some(StSymbol::Import(_)) => None,
                        _ => None,
                    }
                }
                fn unknown(&mut self, name: &str) {
                    if self.meta.mapped_symbols.contains_key(name) {
                        return;
                    }
                    self.meta.diagnostics.add(
                        Diagnostic::error(format!(
                            "'value({name})' refers to an undeclared var (forward references are not allowed)"
                        ))
                        .with_code(codes::FORWARD_VAR_REFERENCE)
                        .with_span(self.span),
                    );
                }
                fn cyclic(&mut self, path: &[SmolStr]) {
                    self.meta.diagnostics.add(
                        Diagnostic::warning(format!(
                            "cyclic value reference: {}",
                            path.iter()
                                .map(SmolStr::as_str)
                                .collect::<Vec<_>>()
                                .join(" -> ")
                        ))
                        .with_code(codes::CYCLIC_VALUE)
                        .with_span(self.span),
                    );
                }
            }

            let value = {
                let mut hooks = LocalHooks {
                    meta: &mut self.meta,
                    span: decl.span,
                };
                expand_value(&decl.value, &mut hooks)
            };

            if self.meta.mapped_symbols.contains_key(&name) {
                self.meta.diagnostics.add(
                    Diagnostic::error(format!("var '{name}' is already declared"))
                        .with_code(codes::REDECLARED_SYMBOL)
                        .with_span(decl.span),
                );
                continue;
            }
            let var = VarSymbol {
                name: name.clone(),
                value,
                text: decl.value.clone(),
            };
            self.meta.vars.push(var.clone());
            self.meta.mapped_symbols.insert(name, StSymbol::Var(var));
        }
    }

    // ============================================================
    // Directives and the value scan
    // ============================================================

    fn process_declarations(&mut self, rule: &Rule, selectors: &[Selector]) {
        let directives: Vec<&Declaration> = rule
            .declarations
            .iter()
            .filter(|d| d.prop.starts_with("-st-"))
            .collect();

        if !directives.is_empty() {
            self.attach_directives(rule, selectors, &directives);
        }

        for decl in &rule.declarations {
            if decl.prop.starts_with("-st-") {
                continue;
            }
            for name in collect_value_names(&decl.value) {
                if !self.meta.mapped_symbols.contains_key(&name) {
                    self.meta.diagnostics.add(
                        Diagnostic::warning(format!("unknown var '{name}'"))
                            .with_code(codes::UNKNOWN_VALUE_REFERENCE)
                            .with_span(decl.span),
                    );
                }
            }
        }
    }

    fn attach_directives(&mut self, rule: &Rule, selectors: &[Selector], directives: &[&Declaration]) {
        // Directives only make sense on a simple class/element selector
        let target = match selectors {
            [single] => match single.nodes.as_slice() {
                [SelectorNode::Class(name)] => Some(name.clone()),
                [SelectorNode::Element(name)] => Some(name.clone()),
                _ => None,
            },
            _ => None,
        };
        let Some(name) = target else {
            self.meta.diagnostics.add(
                Diagnostic::error(format!(
                    "directives require a simple class selector, got '{}'",
                    rule.selector
                ))
                .with_code(codes::INVALID_DIRECTIVE_TARGET)
                .with_span(rule.span),
            );
            return;
        };

        for decl in directives {
            self.attach_directive(&name, decl);
        }
    }

    fn attach_directive(&mut self, name: &SmolStr, decl: &Declaration) {
        let mut redeclared = false;
        let mut invalid_on_element = false;

        match self.meta.mapped_symbols.get_mut(name) {
            Some(StSymbol::Class(class)) => match decl.prop.as_str() {
                "-st-states" => {
                    redeclared = class.states.is_some();
                    class.states = Some(parse_states(&decl.value));
                }
                "-st-extends" => {
                    redeclared = class.extends.is_some();
                    class.extends = parse_ident(&decl.value);
                }
                "-st-global" => {
                    redeclared = class.global.is_some();
                    class.global = Some(quoted(&decl.value).unwrap_or(decl.value.clone()));
                }
                "-st-compose" => {
                    redeclared = !class.compose.is_empty();
                    class.compose = split_top_level(&decl.value, ',')
                        .iter()
                        .filter_map(|part| parse_ident(part))
                        .collect();
                }
                "-st-mixin" => {
                    // Stored on the rule; validated here, applied by the transformer
                    for invalid in parse_mixin_refs(&decl.value).1 {
                        self.meta.diagnostics.add(
                            Diagnostic::warning(format!("invalid mixin reference '{invalid}'"))
                                .with_code(codes::MIXIN_FAILED)
                                .with_span(decl.span),
                        );
                    }
                }
                "-st-variant" => {
                    if decl.value.trim() != "true" && decl.value.trim() != "false" {
                        self.meta.diagnostics.add(
                            Diagnostic::warning("'-st-variant' expects true or false")
                                .with_span(decl.span),
                        );
                    }
                }
                other => self.meta.diagnostics.add(
                    Diagnostic::warning(format!("unknown directive '{other}'")).with_span(decl.span),
                ),
            },
            Some(StSymbol::Element(element)) => match decl.prop.as_str() {
                "-st-extends" => {
                    redeclared = element.extends.is_some();
                    element.extends = parse_ident(&decl.value);
                }
                "-st-states" | "-st-global" | "-st-compose" => invalid_on_element = true,
                "-st-mixin" | "-st-variant" => {}
                other => self.meta.diagnostics.add(
                    Diagnostic::warning(format!("unknown directive '{other}'")).with_span(decl.span),
                ),
            },
            _ => return,
        }

        if invalid_on_element {
            self.meta.diagnostics.add(
                Diagnostic::error(format!(
                    "'{}' is not allowed on an element selector",
                    decl.prop
                ))
                .with_code(codes::INVALID_DIRECTIVE_TARGET)
                .with_span(decl.span),
            );
        }
        if redeclared {
            self.meta.diagnostics.add(
                Diagnostic::warning(format!("'{}' re-declared on '{name}'", decl.prop))
                    .with_code(codes::REDECLARED_DIRECTIVE)
                    .with_span(decl.span),
            );
        }
    }
}

// ============================================================
// Small parse helpers
// ============================================================

fn expand_macros_once(selector_text: &str, meta: &Meta) -> Option<String> {
    let mut out = String::with_capacity(selector_text.len());
    let mut changed = false;
    let mut rest = selector_text;
    while let Some(pos) = rest.find(":--") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 3..];
        let name_end = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(after.len());
        let name = &after[..name_end];
        match meta.custom_selectors.get(name) {
            Some(expansion) => {
                out.push_str(":matches(");
                out.push_str(expansion);
                out.push(')');
                changed = true;
            }
            None => {
                out.push_str(":--");
                out.push_str(name);
            }
        }
        rest = &after[name_end..];
    }
    out.push_str(rest);
    changed.then_some(out)
}

/// Strip one layer of matching quotes.
fn quoted(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0]
    {
        Some(trimmed[1..trimmed.len() - 1].to_string())
    } else {
        None
    }
}

fn is_ident(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !text.starts_with(|c: char| c.is_ascii_digit())
}

fn parse_ident(text: &str) -> Option<SmolStr> {
    let trimmed = text.trim();
    is_ident(trimmed).then(|| SmolStr::new(trimmed))
}

/// Parse `-st-states`: `a, b("[data-mapped]")`.
fn parse_states(value: &str) -> StateMap {
    let mut states = StateMap::new();
    for part in split_top_level(value, ',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.find('(') {
            Some(open) if part.ends_with(')') => {
                let name = part[..open].trim();
                let inner = part[open + 1..part.len() - 1].trim();
                let mapped = quoted(inner).unwrap_or_else(|| inner.to_string());
                if is_ident(name) {
                    states.insert(SmolStr::new(name), Some(mapped));
                }
            }
            _ => {
                if is_ident(part) {
                    states.insert(SmolStr::new(part), None);
                }
            }
        }
    }
    states
}

/// Parse `-st-mixin` into references plus the unparsable leftovers.
pub fn parse_mixin_refs(value: &str) -> (Vec<MixinRef>, Vec<String>) {
    let mut refs = Vec::new();
    let mut invalid = Vec::new();
    for part in split_top_level(value, ',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.find('(') {
            None => {
                if is_ident(part) {
                    refs.push(MixinRef {
                        name: SmolStr::new(part),
                        args: Vec::new(),
                    });
                } else {
                    invalid.push(part.to_string());
                }
            }
            Some(open) if part.ends_with(')') => {
                let name = part[..open].trim();
                let args_text = &part[open + 1..part.len() - 1];
                if !is_ident(name) {
                    invalid.push(part.to_string());
                    continue;
                }
                let args = split_top_level(args_text, ',')
                    .iter()
                    .map(|arg| {
                        let arg = arg.trim();
                        quoted(arg).unwrap_or_else(|| arg.to_string())
                    })
                    .filter(|arg| !arg.is_empty())
                    .collect();
                refs.push(MixinRef {
                    name: SmolStr::new(name),
                    args,
                });
            }
            Some(_) => invalid.push(part.to_string()),
        }
    }
    (refs, invalid)
}
