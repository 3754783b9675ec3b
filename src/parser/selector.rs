//! Structural selector model.
//!
//! Selectors are kept as text in the rule tree and parsed into node
//! sequences on demand: the processor classifies rules with it, and the
//! transformer rewrites node-by-node. The model is flat per selector: a
//! compound is a run of non-combinator nodes between combinators.

use smol_str::SmolStr;

/// One selector out of a comma-separated selector list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    pub nodes: Vec<SelectorNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorNode {
    Class(SmolStr),
    Element(SmolStr),
    /// `:name` or `:name(<raw inner>)`
    PseudoClass {
        name: SmolStr,
        inner: Option<String>,
    },
    /// `::name`
    PseudoElement(SmolStr),
    /// `[<raw content>]`
    Attribute(String),
    Combinator(Combinator),
    Universal,
    /// Anything unrecognized, passed through verbatim
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    Adjacent,
    Sibling,
}

/// Parse a comma-separated selector list.
pub fn parse_selectors(text: &str) -> Vec<Selector> {
    let mut selectors = Vec::new();
    for part in split_top_level(text, ',') {
        let trimmed = part.trim();
        if !trimmed.is_empty() {
            selectors.push(parse_single(trimmed));
        }
    }
    selectors
}

fn parse_single(text: &str) -> Selector {
    let mut nodes = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut pending_ws = false;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                pending_ws = !nodes.is_empty();
                i += 1;
                continue;
            }
            '>' | '+' | '~' => {
                let combinator = match c {
                    '>' => Combinator::Child,
                    '+' => Combinator::Adjacent,
                    _ => Combinator::Sibling,
                };
                nodes.push(SelectorNode::Combinator(combinator));
                pending_ws = false;
                i += 1;
                continue;
            }
            _ => {}
        }

        if pending_ws {
            nodes.push(SelectorNode::Combinator(Combinator::Descendant));
            pending_ws = false;
        }

        match c {
            '.' => {
                let (name, next) = read_ident(&chars, i + 1);
                if name.is_empty() {
                    nodes.push(SelectorNode::Invalid(".".into()));
                    i += 1;
                } else {
                    nodes.push(SelectorNode::Class(name));
                    i = next;
                }
            }
            ':' => {
                let double = chars.get(i + 1) == Some(&':');
                let name_start = if double { i + 2 } else { i + 1 };
                let (name, next) = read_ident(&chars, name_start);
                if name.is_empty() {
                    nodes.push(SelectorNode::Invalid(c.to_string()));
                    i += 1;
                } else if double {
                    nodes.push(SelectorNode::PseudoElement(name));
                    i = next;
                } else if chars.get(next) == Some(&'(') {
                    let (inner, after) = read_balanced(&chars, next);
                    nodes.push(SelectorNode::PseudoClass {
                        name,
                        inner: Some(inner),
                    });
                    i = after;
                } else {
                    nodes.push(SelectorNode::PseudoClass { name, inner: None });
                    i = next;
                }
            }
            '[' => {
                let (inner, after) = read_bracketed(&chars, i);
                nodes.push(SelectorNode::Attribute(inner));
                i = after;
            }
            '*' => {
                nodes.push(SelectorNode::Universal);
                i += 1;
            }
            _ if is_ident_start(c) => {
                let (name, next) = read_ident(&chars, i);
                nodes.push(SelectorNode::Element(name));
                i = next;
            }
            _ => {
                nodes.push(SelectorNode::Invalid(c.to_string()));
                i += 1;
            }
        }
    }

    Selector { nodes }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn read_ident(chars: &[char], from: usize) -> (SmolStr, usize) {
    let mut i = from;
    while i < chars.len() && is_ident_char(chars[i]) {
        i += 1;
    }
    (chars[from..i].iter().collect::<String>().into(), i)
}

/// Read a `(...)` group starting at the opening paren; returns the inner text
/// and the index after the closing paren.
fn read_balanced(chars: &[char], open: usize) -> (String, usize) {
    let mut depth = 0;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let inner: String = chars[open + 1..i].iter().collect();
                    return (inner.trim().to_string(), i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    let inner: String = chars[open + 1..].iter().collect();
    (inner.trim().to_string(), chars.len())
}

fn read_bracketed(chars: &[char], open: usize) -> (String, usize) {
    let mut i = open + 1;
    while i < chars.len() && chars[i] != ']' {
        i += 1;
    }
    let inner: String = chars[open + 1..i].iter().collect();
    (inner, (i + 1).min(chars.len()))
}

/// Split on a separator, respecting paren and bracket nesting.
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            _ => {}
        }
        if c == separator && depth == 0 {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

// ============================================================
// Stringification
// ============================================================

pub fn stringify(selectors: &[Selector]) -> String {
    selectors
        .iter()
        .map(stringify_one)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn stringify_one(selector: &Selector) -> String {
    let mut out = String::new();
    for node in &selector.nodes {
        match node {
            SelectorNode::Class(name) => {
                out.push('.');
                out.push_str(name);
            }
            SelectorNode::Element(name) => out.push_str(name),
            SelectorNode::PseudoClass { name, inner } => {
                out.push(':');
                out.push_str(name);
                if let Some(inner) = inner {
                    out.push('(');
                    out.push_str(inner);
                    out.push(')');
                }
            }
            SelectorNode::PseudoElement(name) => {
                out.push_str("::");
                out.push_str(name);
            }
            SelectorNode::Attribute(inner) => {
                out.push('[');
                out.push_str(inner);
                out.push(']');
            }
            SelectorNode::Combinator(Combinator::Descendant) => out.push(' '),
            SelectorNode::Combinator(Combinator::Child) => out.push_str(" > "),
            SelectorNode::Combinator(Combinator::Adjacent) => out.push_str(" + "),
            SelectorNode::Combinator(Combinator::Sibling) => out.push_str(" ~ "),
            SelectorNode::Universal => out.push('*'),
            SelectorNode::Invalid(text) => out.push_str(text),
        }
    }
    out
}

// ============================================================
// Classification helpers for the processor
// ============================================================

/// The first compound of a selector (nodes before the first combinator).
pub fn first_compound(selector: &Selector) -> &[SelectorNode] {
    let end = selector
        .nodes
        .iter()
        .position(|n| matches!(n, SelectorNode::Combinator(_)))
        .unwrap_or(selector.nodes.len());
    &selector.nodes[..end]
}

/// True when the selector is a single compound (no combinators).
pub fn is_single_compound(selector: &Selector) -> bool {
    !selector
        .nodes
        .iter()
        .any(|n| matches!(n, SelectorNode::Combinator(_)))
}

/// `Some(name)` when the selector is exactly one class node.
pub fn as_simple_class(selector: &Selector) -> Option<&SmolStr> {
    match selector.nodes.as_slice() {
        [SelectorNode::Class(name)] => Some(name),
        _ => None,
    }
}

/// `Some(name)` when the selector is exactly one element node.
pub fn as_simple_element(selector: &Selector) -> Option<&SmolStr> {
    match selector.nodes.as_slice() {
        [SelectorNode::Element(name)] => Some(name),
        _ => None,
    }
}

/// `Some(name)` when the selector is exactly one pseudo-class node
/// (`:import`, `:vars`).
pub fn as_simple_pseudo_class(selector: &Selector) -> Option<&SmolStr> {
    match selector.nodes.as_slice() {
        [SelectorNode::PseudoClass { name, inner: None }] => Some(name),
        _ => None,
    }
}
