use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Parse error [{}:{}] at '{}': {msg}", .token.line, .token.col, .token.kind)]
    Error { msg: String, token: Token },
}

/// Single-pass recursive-descent parser over a pre-lexed token vector.
/// Fail-fast: the grammar has no resync points, so parsing halts on the
/// first error.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

mod core;
mod expr;
mod types;
