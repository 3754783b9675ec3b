//! Plain-data tree for parsed stylesheets.
//!
//! The semantic layer never mutates a stored tree in place; the transformer
//! clones the whole `Stylesheet` and rewrites the clone. Cloning is cheap:
//! every node is owned data with no sharing.

use smol_str::SmolStr;

use crate::base::Span;

/// A parsed stylesheet: rules and at-rules in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
}

/// A style rule: selector text plus declarations.
///
/// The selector is kept as text here; the structural selector model lives in
/// [`super::selector`] and is parsed on demand by the semantic layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub prop: SmolStr,
    pub value: String,
    pub span: Span,
}

/// An at-rule (`@namespace`, `@keyframes`, `@media`, `@custom-selector`, ...).
///
/// `body` is `None` for statement at-rules terminated by `;`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: SmolStr,
    pub params: String,
    pub body: Option<Vec<Node>>,
    pub span: Span,
}

impl Node {
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Node::Rule(rule) => Some(rule),
            Node::AtRule(_) => None,
        }
    }

    pub fn as_rule_mut(&mut self) -> Option<&mut Rule> {
        match self {
            Node::Rule(rule) => Some(rule),
            Node::AtRule(_) => None,
        }
    }
}

impl Rule {
    pub fn new(selector: impl Into<String>, span: Span) -> Self {
        Self {
            selector: selector.into(),
            declarations: Vec::new(),
            span,
        }
    }

    /// The last declaration with the given property, if any (later wins).
    pub fn declaration(&self, prop: &str) -> Option<&Declaration> {
        self.declarations.iter().rev().find(|d| d.prop == prop)
    }
}

impl Declaration {
    pub fn new(prop: impl Into<SmolStr>, value: impl Into<String>, span: Span) -> Self {
        Self {
            prop: prop.into(),
            value: value.into(),
            span,
        }
    }
}

impl Stylesheet {
    /// Iterate all rules in document order, descending into at-rule bodies.
    pub fn all_rules(&self) -> impl Iterator<Item = &Rule> {
        fn walk<'a>(nodes: &'a [Node], out: &mut Vec<&'a Rule>) {
            for node in nodes {
                match node {
                    Node::Rule(rule) => out.push(rule),
                    Node::AtRule(at) => {
                        if let Some(body) = &at.body {
                            walk(body, out);
                        }
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out.into_iter()
    }
}
