use std::rc::Rc;

use super::*;

impl Parser {
    pub(super) fn expression(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::If) {
            return self.if_else_expression();
        }
        self.assignment()
    }

    pub(super) fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.type_cast()?;

        if self.check(&TokenKind::Assign) {
            let eq_tok = self.advance();
            let rhs = self.type_cast()?;

            return match expr {
                Expr::Variable(name) => Ok(Expr::Assignment {
                    context: None,
                    name,
                    value: Box::new(rhs),
                }),
                Expr::Context(target, field) => Ok(Expr::Assignment {
                    context: Some(target),
                    name: field,
                    value: Box::new(rhs),
                }),
                _ => Err(self.error_at("Invalid assignment target", eq_tok)),
            };
        }
        Ok(expr)
    }

    fn type_cast(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.type_check()?;
        while self.match_kind(&TokenKind::As) {
            let contract = self.type_contract_definable()?;
            expr = Expr::TypeCast(Box::new(expr), contract);
        }
        Ok(expr)
    }

    fn type_check(&mut self) -> Result<Expr, ParseError> {
        let expr = self.type_check_operand()?;
        if self.match_kind(&TokenKind::Is) {
            let contract = self.type_contract_definable()?;
            return Ok(Expr::TypeCheck(Box::new(expr), contract));
        }
        Ok(expr)
    }

    fn type_check_operand(&mut self) -> Result<Expr, ParseError> {
        self.logical_or()
    }

    pub(super) fn logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.logical_and()?;
        while self.match_kind(&TokenKind::Or) {
            let rhs = self.logical_and()?;
            expr = Expr::Binary(Box::new(expr), BinaryOp::Or, Box::new(rhs));
        }
        Ok(expr)
    }

    fn logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.ref_equality()?;
        while self.match_kind(&TokenKind::And) {
            let rhs = self.ref_equality()?;
            expr = Expr::Binary(Box::new(expr), BinaryOp::And, Box::new(rhs));
        }
        Ok(expr)
    }

    fn ref_equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::Neq => BinaryOp::Neq,
                _ => break,
            };
            self.advance();
            let rhs = self.comparison()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.addition()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Lte => BinaryOp::Lte,
                TokenKind::Gte => BinaryOp::Gte,
                _ => break,
            };
            self.advance();
            let rhs = self.addition()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
        }
        Ok(expr)
    }

    fn addition(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.multiplication()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.multiplication()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
        }
        Ok(expr)
    }

    fn multiplication(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.unary()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current().kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let rhs = self.unary()?;
            return Ok(Expr::Unary(op, Box::new(rhs)));
        }
        self.invoke()
    }

    /// Left-associative postfix chain: `f(args)`, `x.field`, `xs[index]`.
    fn invoke(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.fun_def()?;

        loop {
            match self.current().kind {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.invocation_args()?;
                    self.expect(&TokenKind::RParen, "Expected ')' after invocation arguments")?;
                    expr = Expr::Invocation(Box::new(expr), args);
                }
                TokenKind::Dot => {
                    self.advance();
                    let field = self.expect_ident("Expected identifier after '.'")?;
                    expr = Expr::Context(Box::new(expr), field);
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(&TokenKind::RBracket, "Expected ']' after access index")?;
                    expr = Expr::Access(Box::new(expr), Box::new(index));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn invocation_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        loop {
            self.clean_newlines();
            if self.check(&TokenKind::RParen) || self.is_eof() {
                break;
            }
            if self.match_kind(&TokenKind::Comma) {
                continue;
            }
            args.push(self.expression()?);
        }
        Ok(args)
    }

    /// Function definitions share their delimiters with grouping (`(`),
    /// maps and blocks (`{`), so this production is driven by bounded
    /// lookahead.
    fn fun_def(&mut self) -> Result<Expr, ParseError> {
        match self.current().kind {
            TokenKind::LParen if self.params_ahead() => self.parenthesized_fun_def(),
            TokenKind::LBrace => {
                if self.brace_starts_map() {
                    return self.map_literal();
                }
                if matches!(self.previous().kind, TokenKind::Arrow) {
                    return Err(self
                        .error("Single-line function expected, found block function"));
                }
                let body = Stmt::Block(self.block_statements()?);
                Ok(Expr::FuncDef {
                    params: Vec::new(),
                    return_type: None,
                    body: Rc::new(body),
                })
            }
            TokenKind::Arrow => {
                self.advance();
                let body = self.expr_statement()?;
                Ok(Expr::FuncDef {
                    params: Vec::new(),
                    return_type: None,
                    body: Rc::new(body),
                })
            }
            _ => self.collection(),
        }
    }

    fn parenthesized_fun_def(&mut self) -> Result<Expr, ParseError> {
        let params = self.function_params()?;
        self.expect(&TokenKind::Arrow, "Expected arrow at function definition")?;

        let return_type = if self.check(&TokenKind::Ident(String::new())) && self.body_follows() {
            Some(self.type_contract()?)
        } else {
            None
        };

        let body = if self.match_kind(&TokenKind::FatArrow) {
            self.expr_statement()?
        } else {
            self.statement()?
        };

        Ok(Expr::FuncDef {
            params,
            return_type,
            body: Rc::new(body),
        })
    }

    fn function_params(&mut self) -> Result<Vec<Parameter>, ParseError> {
        self.expect(&TokenKind::LParen, "Expected '(' before parameters")?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_eof() {
            if self.match_kind(&TokenKind::Comma) {
                continue;
            }
            let name = self.expect_ident("Expected parameter name")?;
            let contract = if self.match_kind(&TokenKind::Colon) {
                Some(self.type_contract()?)
            } else {
                None
            };
            params.push(Parameter { name, contract });
        }
        self.expect(&TokenKind::RParen, "Expected ')' after parameters")?;
        Ok(params)
    }

    /// Does the `(` at the cursor open a parameter list? True when an
    /// arrow follows the matching `)`.
    fn params_ahead(&self) -> bool {
        let mut depth = 0usize;
        let mut offset = 0usize;
        loop {
            match self.peek(offset).kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(self.peek(offset + 1).kind, TokenKind::Arrow);
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            offset += 1;
        }
    }

    /// After the arrow of a function definition, an identifier is a return
    /// type only when a body indicator (`=>` or `{`) appears later on the
    /// line; otherwise it already is the body.
    fn body_follows(&self) -> bool {
        let mut offset = 0usize;
        loop {
            match self.peek(offset).kind {
                TokenKind::FatArrow | TokenKind::LBrace => return true,
                TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::Eof => return false,
                _ => {}
            }
            offset += 1;
        }
    }

    /// Bounded lookahead behind `{`: a `:` at nesting depth 0 before the
    /// matching `}` means a map literal, otherwise a block. The lookahead
    /// is rewound token-by-token regardless of outcome.
    pub(super) fn brace_starts_map(&mut self) -> bool {
        let start = self.pos;
        self.advance(); // consume {

        let mut seen_colon = false;
        let mut depth = 0usize;
        loop {
            match self.current().kind {
                TokenKind::Eof => break,
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.advance();
                }
                TokenKind::Colon => {
                    if depth == 0 {
                        seen_colon = true;
                        break;
                    }
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }

        while self.pos > start {
            self.reverse();
        }
        seen_colon
    }

    pub(super) fn map_literal(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LBrace, "Expected '{' in map literal")?;
        self.clean_newlines();

        let mut entries = Vec::new();
        loop {
            if self.check(&TokenKind::RBrace) {
                break;
            }
            let key = self.expression()?;
            self.expect(&TokenKind::Colon, "Expected ':' between map key and value")?;
            let value = self.expression()?;
            entries.push(MapEntry { key, value });
            self.match_kind(&TokenKind::Comma);
            self.clean_newlines();
        }
        self.expect(&TokenKind::RBrace, "Expected '}' to close map literal")?;
        Ok(Expr::Map(entries))
    }

    fn collection(&mut self) -> Result<Expr, ParseError> {
        if self.match_kind(&TokenKind::LBracket) {
            let mut elements = Vec::new();
            loop {
                self.clean_newlines();
                if self.check(&TokenKind::RBracket) || self.is_eof() {
                    break;
                }
                elements.push(self.expression()?);
                self.clean_newlines();
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RBracket, "Expected ']' at end of collection literal")?;
            return Ok(Expr::Collection(elements));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.current().kind.clone() {
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::Char(c) => {
                self.advance();
                Ok(Expr::Char(c))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Int(i) => {
                self.advance();
                Ok(Expr::Int(i))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::Float(f))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Variable(name))
            }
            TokenKind::If => self.if_else_expression(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(&TokenKind::RParen, "Expected ')' after grouped expression")?;
                Ok(Expr::Group(Box::new(inner)))
            }
            _ => Err(self.error("Invalid expression")),
        }
    }

    /// `if cond -> a else -> b`, or block branches whose last statement is
    /// lifted into the branch result. `else if` recurses.
    pub(super) fn if_else_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::If, "Expected 'if' at beginning of if expression")?;
        let condition = self.logical_or()?;

        if self.match_kind(&TokenKind::Arrow) {
            let if_result = self.expression()?;
            let (else_branch, else_result) = self.else_expression()?;
            return Ok(Expr::IfElse {
                condition: Box::new(condition),
                if_branch: Vec::new(),
                if_result: Box::new(if_result),
                else_branch,
                else_result: Box::new(else_result),
            });
        }

        let (if_branch, if_result) =
            self.branch_block("Last line in an `if` block must be an expression")?;
        let (else_branch, else_result) = self.else_expression()?;
        Ok(Expr::IfElse {
            condition: Box::new(condition),
            if_branch,
            if_result: Box::new(if_result),
            else_branch,
            else_result: Box::new(else_result),
        })
    }

    fn else_expression(&mut self) -> Result<(Vec<Stmt>, Expr), ParseError> {
        self.clean_newlines();
        self.expect(
            &TokenKind::Else,
            "if expression must be followed by an else expression",
        )?;
        if self.match_kind(&TokenKind::Arrow) {
            return Ok((Vec::new(), self.expression()?));
        }
        if self.check(&TokenKind::If) {
            return Ok((Vec::new(), self.if_else_expression()?));
        }
        self.branch_block("Last line in an `else` block must be an expression")
    }

    /// Parse a `{ ... }` branch and lift the trailing expression statement
    /// out as the branch result.
    fn branch_block(&mut self, msg: &str) -> Result<(Vec<Stmt>, Expr), ParseError> {
        let mut stmts = self.block_statements()?;
        match stmts.pop() {
            Some(Stmt::Expression(result)) => Ok((stmts, result)),
            _ => Err(self.error_at(msg, self.previous().clone())),
        }
    }
}
