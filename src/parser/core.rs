use super::*;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let tokens = if tokens.is_empty() {
            vec![Token::eof()]
        } else {
            tokens
        };
        Parser { tokens, pos: 0 }
    }

    /// A parser with no input yet — for REPL reuse via `reset`.
    pub fn empty() -> Self {
        Parser::new(Vec::new())
    }

    pub fn reset(&mut self, tokens: Vec<Token>) {
        self.tokens = if tokens.is_empty() {
            vec![Token::eof()]
        } else {
            tokens
        };
        self.pos = 0;
    }

    pub(super) fn error(&self, msg: impl Into<String>) -> ParseError {
        ParseError::Error {
            msg: msg.into(),
            token: self.current().clone(),
        }
    }

    pub(super) fn error_at(&self, msg: impl Into<String>, token: Token) -> ParseError {
        ParseError::Error {
            msg: msg.into(),
            token,
        }
    }

    pub(super) fn current(&self) -> &Token {
        if self.pos < self.tokens.len() {
            &self.tokens[self.pos]
        } else {
            self.tokens.last().unwrap()
        }
    }

    pub(super) fn peek(&self, offset: usize) -> &Token {
        let idx = self.pos + offset;
        if idx < self.tokens.len() {
            &self.tokens[idx]
        } else {
            self.tokens.last().unwrap()
        }
    }

    pub(super) fn previous(&self) -> &Token {
        if self.pos == 0 {
            &self.tokens[0]
        } else {
            &self.tokens[self.pos - 1]
        }
    }

    pub(super) fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub(super) fn reverse(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
        }
    }

    /// Kind check by discriminant — payloads are ignored.
    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    /// Advance over the expected kind, or fail with `msg`.
    pub(super) fn expect(&mut self, kind: &TokenKind, msg: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("{}: found '{}'", msg, self.current().kind)))
        }
    }

    pub(super) fn expect_ident(&mut self, msg: &str) -> Result<String, ParseError> {
        let tok = self.expect(&TokenKind::Ident(String::new()), msg)?;
        match tok.kind {
            TokenKind::Ident(name) => Ok(name),
            _ => unreachable!(),
        }
    }

    /// Advance if the current token matches, report whether it did.
    pub(super) fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    pub(super) fn is_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    pub(super) fn at_statement_end(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        )
    }

    /// Skip statement separators (newlines and semicolons).
    pub(super) fn clean_newlines(&mut self) {
        while matches!(
            self.current().kind,
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }

    pub fn parse(&mut self) -> (Vec<Stmt>, Vec<ParseError>) {
        let mut stmts = Vec::new();
        let mut errors = Vec::new();

        self.clean_newlines();
        while !self.is_eof() {
            match self.statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    errors.push(e);
                    break;
                }
            }
            self.clean_newlines();
        }

        (stmts, errors)
    }

    pub(super) fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current().kind {
            TokenKind::Let => self.declaration(),
            TokenKind::Struct => self.struct_def(),
            TokenKind::Type => self.type_def(),
            TokenKind::Extend => self.extend_block(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::LBrace => {
                if self.brace_starts_map() {
                    self.expr_statement()
                } else {
                    Ok(Stmt::Block(self.block_statements()?))
                }
            }
            _ => self.expr_statement(),
        }
    }

    pub(super) fn expr_statement(&mut self) -> Result<Stmt, ParseError> {
        Ok(Stmt::Expression(self.expression()?))
    }

    pub(super) fn declaration(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Let, "Expected 'let'")?;
        let mutable = self.match_kind(&TokenKind::Mut);
        let name = self.expect_ident("Expected variable name")?;
        let declared_type = if self.match_kind(&TokenKind::Colon) {
            Some(self.type_contract_definable()?)
        } else {
            None
        };
        self.expect(&TokenKind::Assign, "Expected '=' in declaration")?;
        let value = self.expression()?;
        Ok(Stmt::Declaration {
            mutable,
            name,
            declared_type,
            value,
        })
    }

    pub(super) fn struct_def(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Struct, "Expected 'struct'")?;
        let name = self.expect_ident("Expected struct name")?;
        self.expect(&TokenKind::LBrace, "Expected '{' after struct name")?;
        self.clean_newlines();

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            let field_name = self.expect_ident("Expected struct field name")?;
            self.expect(&TokenKind::Colon, "Expected ':' after struct field name")?;
            let contract = self.type_contract()?;
            let default = if self.match_kind(&TokenKind::Assign) {
                Some(self.expression()?)
            } else {
                None
            };
            fields.push(FieldDef {
                name: field_name,
                contract,
                default,
            });
            self.match_kind(&TokenKind::Comma);
            self.clean_newlines();
        }
        self.expect(&TokenKind::RBrace, "Expected '}' to close struct definition")?;
        Ok(Stmt::StructDef { name, fields })
    }

    pub(super) fn type_def(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Type, "Expected 'type'")?;
        let name = self.expect_ident("Expected type name")?;
        self.expect(&TokenKind::Assign, "Expected '=' in type definition")?;
        let contract = self.type_contract_definable()?;
        Ok(Stmt::TypeDef { name, contract })
    }

    pub(super) fn extend_block(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Extend, "Expected 'extend'")?;
        let target = self.expect_ident("Expected type name after 'extend'")?;
        self.expect(&TokenKind::LBrace, "Expected '{' after extend target")?;
        self.clean_newlines();

        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            if !self.check(&TokenKind::Let) {
                return Err(self.error("Expected declaration in extend block"));
            }
            members.push(self.declaration()?);
            self.clean_newlines();
        }
        self.expect(&TokenKind::RBrace, "Expected '}' to close extend block")?;
        Ok(Stmt::Extend { target, members })
    }

    pub(super) fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Return, "Expected 'return'")?;
        if self.at_statement_end() {
            Ok(Stmt::Return(None))
        } else {
            Ok(Stmt::Return(Some(self.expression()?)))
        }
    }

    /// `{ statements }`
    pub(super) fn block_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace, "Expected '{' at beginning of block")?;
        self.clean_newlines();
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            stmts.push(self.statement()?);
            self.clean_newlines();
        }
        self.expect(&TokenKind::RBrace, "Expected '}' to close block")?;
        Ok(stmts)
    }
}
