//! Logos-based lexer for Stylark CSS
//!
//! Fast tokenization using the logos crate. The token set is coarse: the
//! rule parser reconstructs selector and value text from source offsets, so
//! the lexer only has to find block structure, strings and identifiers
//! reliably.

use logos::Logos;

/// A token with its kind, text, and byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    Comment,
    Ident,
    AtKeyword,
    String,
    Number,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Colon,
    Comma,
    /// Any single character the grammar above does not claim
    Delim,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = self.offset;
        self.offset += text.len();

        let kind = match logos_token {
            Ok(t) => t.into(),
            // Unmatched byte: surface it as a one-character delim token
            Err(()) => TokenKind::Delim,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to TokenKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"")] // Don't skip anything, we want all tokens
enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    Comment,

    // =========================================================================
    // WORDS AND LITERALS
    // =========================================================================
    // CSS identifiers may start with one or two dashes (`-st-from`, `--x`)
    #[regex(r"--?[a-zA-Z_][a-zA-Z0-9_-]*")]
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    #[regex(r"@[a-zA-Z-][a-zA-Z0-9-]*")]
    AtKeyword,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    String,

    // Numbers and dimensions lex as one token (`12`, `1.5em`, `100%`)
    #[regex(r"[0-9]+(\.[0-9]+)?[a-zA-Z%]*")]
    Number,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => TokenKind::Whitespace,
            LogosToken::Comment => TokenKind::Comment,
            LogosToken::Ident => TokenKind::Ident,
            LogosToken::AtKeyword => TokenKind::AtKeyword,
            LogosToken::String => TokenKind::String,
            LogosToken::Number => TokenKind::Number,
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::LParen => TokenKind::LParen,
            LogosToken::RParen => TokenKind::RParen,
            LogosToken::LBracket => TokenKind::LBracket,
            LogosToken::RBracket => TokenKind::RBracket,
            LogosToken::Semicolon => TokenKind::Semicolon,
            LogosToken::Colon => TokenKind::Colon,
            LogosToken::Comma => TokenKind::Comma,
        }
    }
}
