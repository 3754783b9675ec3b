//! CSS parser for Stylark stylesheets
//!
//! This module provides the generic rule/declaration/at-rule tree the
//! semantic layer consumes:
//! - **logos** for fast lexing
//! - a tolerant recursive-descent parser over the token stream
//!
//! The parser is deliberately lossy about trivia (comments and whitespace are
//! not preserved) but positioned: every rule and declaration carries a span
//! so diagnostics can point at source. Malformed constructs are skipped and
//! recorded as [`SyntaxError`]s; parsing always produces a tree.

pub mod ast;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;
pub mod selector;
mod serialize;

pub use ast::{AtRule, Declaration, Node, Rule, Stylesheet};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parse, SyntaxError, parse_stylesheet};
pub use serialize::stylesheet_to_css;
