use super::*;

impl Parser {
    /// Type contracts appearing in parameter lists, return positions and
    /// declarations: elementary names, invocables, collections, maps and
    /// `|`/`&` combinations.
    pub(super) fn type_contract(&mut self) -> Result<TypeContract, ParseError> {
        let mut lhs = self.type_primary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Pipe => TypeOp::Or,
                TokenKind::Amp => TypeOp::And,
                _ => break,
            };
            self.advance();
            let rhs = self.type_primary()?;
            lhs = TypeContract::Binary(Box::new(lhs), op, Box::new(rhs));
        }
        Ok(lhs)
    }

    /// Contracts in definable positions (`as`/`is` operands, `type`
    /// definitions) additionally allow the structural `{ field: T }` form.
    pub(super) fn type_contract_definable(&mut self) -> Result<TypeContract, ParseError> {
        if self.check(&TokenKind::LBrace) {
            return self.defined_contract();
        }
        self.type_contract()
    }

    fn type_primary(&mut self) -> Result<TypeContract, ParseError> {
        match self.current().kind.clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(TypeContract::Elementary(name))
            }
            TokenKind::LParen => {
                self.advance();
                let mut args = Vec::new();
                while !self.check(&TokenKind::RParen) && !self.is_eof() {
                    if self.match_kind(&TokenKind::Comma) {
                        continue;
                    }
                    args.push(self.type_contract()?);
                }
                self.expect(&TokenKind::RParen, "Expected ')' in function type")?;
                self.expect(&TokenKind::Arrow, "Expected '->' in function type")?;
                let ret = self.type_contract()?;
                Ok(TypeContract::Invocable(args, Box::new(ret)))
            }
            TokenKind::LBracket => {
                self.advance();
                let first = self.type_contract()?;
                if self.match_kind(&TokenKind::Colon) {
                    let value = self.type_contract()?;
                    self.expect(&TokenKind::RBracket, "Expected ']' in map type")?;
                    return Ok(TypeContract::Map(Box::new(first), Box::new(value)));
                }
                self.expect(&TokenKind::RBracket, "Expected ']' in collection type")?;
                Ok(TypeContract::Collection(Box::new(first)))
            }
            _ => Err(self.error("Expected type")),
        }
    }

    fn defined_contract(&mut self) -> Result<TypeContract, ParseError> {
        self.expect(&TokenKind::LBrace, "Expected '{' in type definition")?;
        self.clean_newlines();

        let mut parts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            let name = self.expect_ident("Expected field name in type definition")?;
            self.expect(&TokenKind::Colon, "Expected ':' after field name")?;
            let contract = self.type_contract()?;
            parts.push((name, contract));
            self.match_kind(&TokenKind::Comma);
            self.clean_newlines();
        }
        self.expect(&TokenKind::RBrace, "Expected '}' to close type definition")?;
        Ok(TypeContract::Defined(parts))
    }
}
