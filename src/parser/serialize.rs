//! Stylesheet-to-CSS text serialization.
//!
//! Deterministic output formatting: one declaration per line, four-space
//! indentation, nested at-rule bodies indented one level.

use super::ast::{Node, Stylesheet};

pub fn stylesheet_to_css(stylesheet: &Stylesheet) -> String {
    let mut out = String::new();
    write_nodes(&stylesheet.nodes, 0, &mut out);
    out
}

fn write_nodes(nodes: &[Node], depth: usize, out: &mut String) {
    for node in nodes {
        match node {
            Node::Rule(rule) => {
                indent(depth, out);
                out.push_str(&rule.selector);
                out.push_str(" {\n");
                for decl in &rule.declarations {
                    indent(depth + 1, out);
                    out.push_str(&decl.prop);
                    out.push_str(": ");
                    out.push_str(&decl.value);
                    out.push_str(";\n");
                }
                indent(depth, out);
                out.push_str("}\n");
            }
            Node::AtRule(at) => {
                indent(depth, out);
                out.push('@');
                out.push_str(&at.name);
                if !at.params.is_empty() {
                    out.push(' ');
                    out.push_str(&at.params);
                }
                match &at.body {
                    Some(body) => {
                        out.push_str(" {\n");
                        write_nodes(body, depth + 1, out);
                        indent(depth, out);
                        out.push_str("}\n");
                    }
                    None => out.push_str(";\n"),
                }
            }
        }
    }
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("    ");
    }
}
