//! TQL lexer using logos
//!
//! Turns a statement into a lazy stream of tokens. Tokens carry their
//! kind and the exact source text; whitespace is insignificant outside
//! quoted regions.

use logos::Logos;

use chronograph_core::{Error, Result};

/// The token alphabet of the query language.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // Keywords
    #[token("select", ignore(ascii_case))]
    Select,

    #[token("from", ignore(ascii_case))]
    From,

    #[token("where", ignore(ascii_case))]
    Where,

    #[token("insert", ignore(ascii_case))]
    Insert,

    #[token("delete", ignore(ascii_case))]
    Delete,

    #[token("data", ignore(ascii_case))]
    Data,

    #[token("into", ignore(ascii_case))]
    Into,

    #[token("create", ignore(ascii_case))]
    Create,

    #[token("drop", ignore(ascii_case))]
    Drop,

    #[token("graph", ignore(ascii_case))]
    Graph,

    #[token("group", ignore(ascii_case))]
    Group,

    #[token("order", ignore(ascii_case))]
    Order,

    #[token("by", ignore(ascii_case))]
    By,

    #[token("having", ignore(ascii_case))]
    Having,

    #[token("before", ignore(ascii_case))]
    Before,

    #[token("after", ignore(ascii_case))]
    After,

    #[token("between", ignore(ascii_case))]
    Between,

    #[token("count", ignore(ascii_case))]
    Count,

    #[token("sum", ignore(ascii_case))]
    Sum,

    #[token("limit", ignore(ascii_case))]
    Limit,

    #[token("as", ignore(ascii_case))]
    As,

    #[token("type", ignore(ascii_case))]
    Type,

    #[token("id", ignore(ascii_case))]
    Id,

    #[token("at", ignore(ascii_case))]
    At,

    #[token("asc", ignore(ascii_case))]
    Asc,

    #[token("desc", ignore(ascii_case))]
    Desc,

    #[token("not", ignore(ascii_case))]
    Not,

    #[token("and", ignore(ascii_case))]
    And,

    #[token("or", ignore(ascii_case))]
    Or,

    #[token("distinct", ignore(ascii_case))]
    Distinct,

    // Punctuation
    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token(";")]
    Semicolon,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("=")]
    Eq,

    // Value tokens
    #[regex(r"\?[a-zA-Z_][a-zA-Z0-9_]*")]
    Binding,

    #[regex(r"/[a-zA-Z0-9_]+(/[a-zA-Z0-9_]+)*<[^<>]*>")]
    Node,

    #[regex(r#""([^"\\]|\\.)*"@\[[^\],]*\]"#)]
    Predicate,

    #[regex(r#""([^"\\]|\\.)*"@\[[^\]]*,[^\]]*\]"#)]
    PredicateBound,

    #[regex(r#""([^"\\]|\\.)*"\^\^type:[a-zA-Z0-9]+"#)]
    Literal,
}

/// A lexed token: its kind plus the exact source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, text: S) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({})", self.kind, self.text)
    }
}

/// A lazy token stream over a statement's source text.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            Ok(kind) => Some(Ok(Token::new(kind, self.inner.slice()))),
            Err(()) => Some(Err(Error::Lex(format!(
                "{:?} at byte {}",
                self.inner.slice(),
                self.inner.span().start
            )))),
        }
    }
}

/// Tokenize a full statement eagerly.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).collect()
}
