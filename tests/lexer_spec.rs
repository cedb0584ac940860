/// Spec tests for the Opal lexer.
///
/// The lexer is pure and deterministic: every test feeds a source snippet
/// and asserts the resulting token kinds (and, where it matters, positions).
use opal::lexer::{Lexer, Token, TokenKind};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lex(src: &str) -> Vec<Token> {
    Lexer::new(src).tokenize().expect("lex failed")
}

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src).into_iter().map(|t| t.kind).collect()
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

#[test]
fn int_literal() {
    assert_eq!(kinds("42"), vec![TokenKind::Int(42), TokenKind::Eof]);
}

#[test]
fn float_literal() {
    assert_eq!(kinds("3.25"), vec![TokenKind::Float(3.25), TokenKind::Eof]);
}

#[test]
fn dot_after_int_is_not_a_float() {
    // `1.add` must lex as Int Dot Ident so method calls on literals work
    assert_eq!(
        kinds("1.add"),
        vec![
            TokenKind::Int(1),
            TokenKind::Dot,
            TokenKind::Ident("add".to_string()),
            TokenKind::Eof
        ]
    );
}

#[test]
fn string_literal() {
    assert_eq!(
        kinds("\"hello\""),
        vec![TokenKind::Str("hello".to_string()), TokenKind::Eof]
    );
}

#[test]
fn string_escapes() {
    assert_eq!(
        kinds("\"a\\nb\\t\\\"c\\\"\""),
        vec![TokenKind::Str("a\nb\t\"c\"".to_string()), TokenKind::Eof]
    );
}

#[test]
fn unterminated_string_fails() {
    assert!(Lexer::new("\"oops").tokenize().is_err());
}

#[test]
fn char_literal() {
    assert_eq!(kinds("'x'"), vec![TokenKind::Char('x'), TokenKind::Eof]);
}

#[test]
fn char_escape() {
    assert_eq!(kinds("'\\n'"), vec![TokenKind::Char('\n'), TokenKind::Eof]);
}

#[test]
fn bool_literals() {
    assert_eq!(
        kinds("true false"),
        vec![TokenKind::True, TokenKind::False, TokenKind::Eof]
    );
}

// ---------------------------------------------------------------------------
// Keywords and identifiers
// ---------------------------------------------------------------------------

#[test]
fn keywords() {
    assert_eq!(
        kinds("let mut if else return as is and or struct type extend"),
        vec![
            TokenKind::Let,
            TokenKind::Mut,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::Return,
            TokenKind::As,
            TokenKind::Is,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Struct,
            TokenKind::Type,
            TokenKind::Extend,
            TokenKind::Eof
        ]
    );
}

#[test]
fn identifier_with_underscore() {
    assert_eq!(
        kinds("_private_name"),
        vec![TokenKind::Ident("_private_name".to_string()), TokenKind::Eof]
    );
}

#[test]
fn keyword_prefix_is_an_identifier() {
    assert_eq!(
        kinds("letter"),
        vec![TokenKind::Ident("letter".to_string()), TokenKind::Eof]
    );
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

#[test]
fn compound_operators() {
    assert_eq!(
        kinds("-> => == != <= >="),
        vec![
            TokenKind::Arrow,
            TokenKind::FatArrow,
            TokenKind::Eq,
            TokenKind::Neq,
            TokenKind::Lte,
            TokenKind::Gte,
            TokenKind::Eof
        ]
    );
}

#[test]
fn single_char_operators() {
    assert_eq!(
        kinds("+ - * / % = < > ! | & . , : ;"),
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Assign,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Bang,
            TokenKind::Pipe,
            TokenKind::Amp,
            TokenKind::Dot,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::Semicolon,
            TokenKind::Eof
        ]
    );
}

#[test]
fn delimiters() {
    assert_eq!(
        kinds("( ) { } [ ]"),
        vec![
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Eof
        ]
    );
}

#[test]
fn unknown_character_fails() {
    assert!(Lexer::new("let x = @").tokenize().is_err());
}

// ---------------------------------------------------------------------------
// Newlines and comments
// ---------------------------------------------------------------------------

#[test]
fn consecutive_newlines_collapse() {
    assert_eq!(
        kinds("a\n\n\nb"),
        vec![
            TokenKind::Ident("a".to_string()),
            TokenKind::Newline,
            TokenKind::Ident("b".to_string()),
            TokenKind::Eof
        ]
    );
}

#[test]
fn leading_newlines_are_dropped() {
    assert_eq!(
        kinds("\n\na"),
        vec![TokenKind::Ident("a".to_string()), TokenKind::Eof]
    );
}

#[test]
fn comment_runs_to_end_of_line() {
    assert_eq!(
        kinds("a // a comment\nb"),
        vec![
            TokenKind::Ident("a".to_string()),
            TokenKind::Newline,
            TokenKind::Ident("b".to_string()),
            TokenKind::Eof
        ]
    );
}

// ---------------------------------------------------------------------------
// Positions: 1-indexed line, 0-indexed column
// ---------------------------------------------------------------------------

#[test]
fn token_positions() {
    let tokens = lex("let x = 1\nx");
    let positions: Vec<(usize, usize)> = tokens.iter().map(|t| (t.line, t.col)).collect();
    assert_eq!(
        positions,
        vec![(1, 0), (1, 4), (1, 6), (1, 8), (1, 9), (2, 0), (2, 1)]
    );
}

#[test]
fn final_token_is_eof() {
    let tokens = lex("1 + 2");
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
}
