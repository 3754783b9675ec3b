//! Tolerant recursive-descent parser over the token stream.
//!
//! The parser never fails: malformed constructs are skipped and recorded as
//! [`SyntaxError`]s, and whatever parsed cleanly is returned. This mirrors
//! how the semantic layer treats user content: diagnostics, not exceptions.

use smol_str::SmolStr;

use crate::base::{Position, Span};

use super::ast::{AtRule, Declaration, Node, Rule, Stylesheet};
use super::lexer::{Token, TokenKind, tokenize};

/// A parse-level problem with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

/// Result of parsing: the tree plus any recoverable errors.
#[derive(Debug, Clone)]
pub struct Parse {
    pub stylesheet: Stylesheet,
    pub errors: Vec<SyntaxError>,
}

pub fn parse_stylesheet(input: &str) -> Parse {
    let mut parser = Parser::new(input);
    let nodes = parser.parse_nodes(true);
    Parse {
        stylesheet: Stylesheet { nodes },
        errors: parser.errors,
    }
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    input: &'a str,
    line_starts: Vec<usize>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(input.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            tokens: tokenize(input),
            pos: 0,
            input,
            line_starts,
            errors: Vec::new(),
        }
    }

    // ============================================================
    // Token access
    // ============================================================

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens[self.pos..]
            .iter()
            .find(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::Comment))
    }

    fn skip_trivia(&mut self) {
        while let Some(t) = self.tokens.get(self.pos) {
            if matches!(t.kind, TokenKind::Whitespace | TokenKind::Comment) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        self.skip_trivia();
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn current_offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.offset)
            .unwrap_or(self.input.len())
    }

    fn position_at(&self, offset: usize) -> Position {
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1);
        Position::new(line, offset - self.line_starts[line])
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.position_at(start), self.position_at(end))
    }

    /// Collect token text (comments dropped) from a token index range.
    fn text_between(&self, from: usize, to: usize) -> String {
        self.tokens[from..to]
            .iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .map(|t| t.text)
            .collect::<String>()
            .trim()
            .to_string()
    }

    fn error(&mut self, message: impl Into<String>, start: usize, end: usize) {
        self.errors.push(SyntaxError {
            message: message.into(),
            span: self.span(start, end),
        });
    }

    // ============================================================
    // Grammar
    // ============================================================

    fn parse_nodes(&mut self, top_level: bool) -> Vec<Node> {
        let mut nodes = Vec::new();
        loop {
            self.skip_trivia();
            let Some(token) = self.tokens.get(self.pos).cloned() else {
                break;
            };
            match token.kind {
                TokenKind::RBrace => {
                    if top_level {
                        self.error("unexpected '}'", token.offset, token.offset + 1);
                        self.pos += 1;
                        continue;
                    }
                    break;
                }
                TokenKind::AtKeyword => {
                    if let Some(at) = self.parse_at_rule() {
                        nodes.push(Node::AtRule(at));
                    }
                }
                _ => {
                    if let Some(rule) = self.parse_rule() {
                        nodes.push(Node::Rule(rule));
                    }
                }
            }
        }
        nodes
    }

    fn parse_at_rule(&mut self) -> Option<AtRule> {
        let at_token = self.bump()?;
        let start = at_token.offset;
        let name = SmolStr::new(at_token.text.trim_start_matches('@'));

        let params_from = self.pos;
        loop {
            self.skip_trivia();
            match self.tokens.get(self.pos).map(|t| t.kind) {
                Some(TokenKind::LBrace) => {
                    let params = self.text_between(params_from, self.pos);
                    self.pos += 1; // consume '{'
                    let body = self.parse_nodes(false);
                    match self.peek().map(|t| t.kind) {
                        Some(TokenKind::RBrace) => {
                            self.bump();
                        }
                        _ => self.error(
                            format!("unclosed @{name} block"),
                            start,
                            self.current_offset(),
                        ),
                    }
                    let span = self.span(start, self.current_offset());
                    return Some(AtRule {
                        name,
                        params,
                        body: Some(body),
                        span,
                    });
                }
                Some(TokenKind::Semicolon) => {
                    let params = self.text_between(params_from, self.pos);
                    self.pos += 1; // consume ';'
                    let span = self.span(start, self.current_offset());
                    return Some(AtRule {
                        name,
                        params,
                        body: None,
                        span,
                    });
                }
                Some(_) => {
                    self.pos += 1;
                }
                None => {
                    let params = self.text_between(params_from, self.pos);
                    self.error(format!("unterminated @{name}"), start, self.input.len());
                    let span = self.span(start, self.input.len());
                    return Some(AtRule {
                        name,
                        params,
                        body: None,
                        span,
                    });
                }
            }
        }
    }

    fn parse_rule(&mut self) -> Option<Rule> {
        self.skip_trivia();
        let start = self.current_offset();
        let selector_from = self.pos;
        loop {
            match self.tokens.get(self.pos).map(|t| t.kind) {
                Some(TokenKind::LBrace) => break,
                Some(TokenKind::Semicolon) => {
                    // Stray statement outside a block: skip it
                    let end = self.current_offset();
                    self.error("statement outside of a rule", start, end);
                    self.pos += 1;
                    return None;
                }
                Some(TokenKind::RBrace) | None => {
                    self.error("selector without a block", start, self.current_offset());
                    return None;
                }
                Some(_) => self.pos += 1,
            }
        }
        let selector = self.text_between(selector_from, self.pos);
        self.pos += 1; // consume '{'

        let declarations = self.parse_declarations();
        let span = self.span(start, self.current_offset());
        Some(Rule {
            selector,
            declarations,
            span,
        })
    }

    fn parse_declarations(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        loop {
            self.skip_trivia();
            let Some(token) = self.tokens.get(self.pos).cloned() else {
                self.error("unclosed rule", self.current_offset(), self.input.len());
                break;
            };
            match token.kind {
                TokenKind::RBrace => {
                    self.pos += 1;
                    break;
                }
                TokenKind::Semicolon => {
                    self.pos += 1;
                }
                TokenKind::Ident => {
                    if let Some(decl) = self.parse_declaration(token) {
                        declarations.push(decl);
                    }
                }
                _ => {
                    self.error(
                        format!("expected property, found '{}'", token.text),
                        token.offset,
                        token.offset + token.text.len(),
                    );
                    self.recover_declaration();
                }
            }
        }
        declarations
    }

    fn parse_declaration(&mut self, prop_token: Token<'a>) -> Option<Declaration> {
        let start = prop_token.offset;
        self.pos += 1; // consume property ident
        self.skip_trivia();
        match self.tokens.get(self.pos).map(|t| t.kind) {
            Some(TokenKind::Colon) => self.pos += 1,
            _ => {
                self.error("expected ':' after property", start, self.current_offset());
                self.recover_declaration();
                return None;
            }
        }
        self.skip_trivia();
        let value_from = self.pos;
        loop {
            match self.tokens.get(self.pos).map(|t| t.kind) {
                Some(TokenKind::Semicolon) | Some(TokenKind::RBrace) | None => break,
                Some(_) => self.pos += 1,
            }
        }
        let value = self.text_between(value_from, self.pos);
        let span = self.span(start, self.current_offset());
        Some(Declaration {
            prop: SmolStr::new(prop_token.text),
            value,
            span,
        })
    }

    /// Skip to the next ';' or '}' after a malformed declaration.
    fn recover_declaration(&mut self) {
        while let Some(kind) = self.tokens.get(self.pos).map(|t| t.kind) {
            match kind {
                TokenKind::Semicolon => {
                    self.pos += 1;
                    break;
                }
                TokenKind::RBrace => break,
                _ => self.pos += 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(parse: &Parse) -> Vec<&Rule> {
        parse.stylesheet.all_rules().collect()
    }

    #[test]
    fn test_simple_rule() {
        let parse = parse_stylesheet(".a { color: red; }");
        assert!(parse.errors.is_empty());
        let rules = rules(&parse);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, ".a");
        assert_eq!(rules[0].declarations.len(), 1);
        assert_eq!(rules[0].declarations[0].prop, "color");
        assert_eq!(rules[0].declarations[0].value, "red");
    }

    #[test]
    fn test_directive_declarations() {
        let parse = parse_stylesheet(
            ":import { -st-from: \"./other.st.css\"; -st-default: Other; }",
        );
        let rules = rules(&parse);
        assert_eq!(rules[0].selector, ":import");
        assert_eq!(rules[0].declarations[0].prop, "-st-from");
        assert_eq!(rules[0].declarations[0].value, "\"./other.st.css\"");
        assert_eq!(rules[0].declarations[1].prop, "-st-default");
    }

    #[test]
    fn test_statement_at_rules() {
        let parse = parse_stylesheet("@namespace \"entry\";\n@custom-selector :--btn .btn;");
        assert_eq!(parse.stylesheet.nodes.len(), 2);
        let Node::AtRule(ns) = &parse.stylesheet.nodes[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(ns.name, "namespace");
        assert_eq!(ns.params, "\"entry\"");
        assert!(ns.body.is_none());
        let Node::AtRule(cs) = &parse.stylesheet.nodes[1] else {
            panic!("expected at-rule");
        };
        assert_eq!(cs.params, ":--btn .btn");
    }

    #[test]
    fn test_block_at_rules_nest() {
        let parse = parse_stylesheet("@media screen { .a { width: 50%; } }");
        let Node::AtRule(media) = &parse.stylesheet.nodes[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(media.name, "media");
        assert_eq!(media.params, "screen");
        let body = media.body.as_ref().unwrap();
        assert_eq!(body.len(), 1);
        assert!(matches!(body[0], Node::Rule(_)));
    }

    #[test]
    fn test_keyframes_frames_are_rules() {
        let parse = parse_stylesheet("@keyframes slide { from { left: 0; } to { left: 100%; } }");
        let Node::AtRule(kf) = &parse.stylesheet.nodes[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(kf.params, "slide");
        assert_eq!(kf.body.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_recovers_from_malformed_declaration() {
        let parse = parse_stylesheet(".a { color red; width: 10px; }");
        let rules = rules(&parse);
        assert_eq!(rules[0].declarations.len(), 1);
        assert_eq!(rules[0].declarations[0].prop, "width");
        assert!(!parse.errors.is_empty());
    }

    #[test]
    fn test_selector_with_functional_pseudo() {
        let parse = parse_stylesheet(".a:not(.b) > .c { color: red; }");
        let rules = rules(&parse);
        assert_eq!(rules[0].selector, ".a:not(.b) > .c");
    }

    #[test]
    fn test_spans_are_zero_indexed() {
        let parse = parse_stylesheet("\n.a { color: red; }");
        let rules = rules(&parse);
        assert_eq!(rules[0].span.start.line, 1);
        assert_eq!(rules[0].span.start.column, 0);
    }
}
