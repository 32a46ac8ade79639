use thiserror::Error;

use crate::{
    ast::{BinOp, Body, Expr, Lambda, Statement, Token, UnaryOp},
    lexer::{LexError, Lexer, Position},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, found {found:?} at position {position}")]
    Unexpected {
        expected: &'static str,
        found: Token,
        position: Position,
    },

    #[error("a custom function must be a function literal such as `(a, b) => a + b`")]
    NotAFunction,

    #[error("expression nested too deeply at position {position}")]
    TooDeep { position: Position },
}

/// Deepest nesting the parser accepts. Sub-expressions, prefix operators and
/// each link of an operator or member chain count one level.
pub const MAX_DEPTH: usize = 128;

/// Recursive-descent parser for the custom-function language.
///
/// The whole input is tokenized up front so arrow functions can be told
/// apart from parenthesised expressions by looking ahead for `=>`.
pub struct Parser {
    tokens: Vec<(Token, Position)>,
    index: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, SyntaxError> {
        let tokens = lexer.tokenize()?;
        Ok(Parser {
            tokens,
            index: 0,
            depth: 0,
        })
    }

    /// Goes one level deeper. Callers restore `depth` once their node is built.
    fn descend(&mut self) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(SyntaxError::TooDeep {
                position: self.position(),
            });
        }
        Ok(())
    }

    fn current_token(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.index + offset)
            .or(self.tokens.last())
            .map_or(&Token::Eof, |(token, _)| token)
    }

    fn position(&self) -> Position {
        self.tokens
            .get(self.index)
            .or(self.tokens.last())
            .map_or(0, |(_, position)| *position)
    }

    fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current_token()) == std::mem::discriminant(token)
    }

    /// Consumes `token` if it is next.
    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &'static str) -> SyntaxError {
        SyntaxError::Unexpected {
            expected,
            found: self.current_token().clone(),
            position: self.position(),
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), SyntaxError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        match self.current_token() {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Parses the input as a single expression.
    pub fn parse(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_expression()?;
        while self.eat(&Token::Semicolon) {}
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(expr)
    }

    /// Parses the input as a function literal.
    pub fn parse_function(&mut self) -> Result<Lambda, SyntaxError> {
        match self.parse()? {
            Expr::Function(lambda) => Ok(lambda),
            _ => Err(SyntaxError::NotAFunction),
        }
    }

    pub fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        let depth = self.depth;
        self.descend()?;
        let expr = if self.check(&Token::Function) {
            self.parse_function_expression()?
        } else if let Some(params) = self.arrow_params() {
            self.parse_arrow(params)?
        } else {
            self.parse_conditional()?
        };
        self.depth = depth;
        Ok(expr)
    }

    /// Returns the parameter list when the upcoming tokens start an arrow
    /// function, without consuming anything.
    fn arrow_params(&self) -> Option<Vec<String>> {
        match (self.peek(0), self.peek(1)) {
            (Token::Identifier(name), Token::Arrow) => Some(vec![name.clone()]),
            (Token::LParen, _) => {
                let mut params = Vec::new();
                let mut offset = 1;
                if matches!(self.peek(offset), Token::RParen) {
                    return matches!(self.peek(offset + 1), Token::Arrow).then_some(params);
                }
                loop {
                    match self.peek(offset) {
                        Token::Identifier(name) => params.push(name.clone()),
                        _ => return None,
                    }
                    offset += 1;
                    match self.peek(offset) {
                        Token::Comma => offset += 1,
                        Token::RParen => break,
                        _ => return None,
                    }
                }
                matches!(self.peek(offset + 1), Token::Arrow).then_some(params)
            }
            _ => None,
        }
    }

    fn parse_arrow(&mut self, params: Vec<String>) -> Result<Expr, SyntaxError> {
        // Skip the parameter list, already collected by lookahead
        while !self.check(&Token::Arrow) {
            self.advance();
        }
        self.advance();

        let body = if self.check(&Token::LBrace) {
            Body::Block(self.parse_block()?)
        } else {
            Body::Expr(Box::new(self.parse_expression()?))
        };
        Ok(Expr::Function(Lambda { params, body }))
    }

    fn parse_function_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(Token::Function, "function")?;
        // Optional name, never bound
        if matches!(self.current_token(), Token::Identifier(_)) {
            self.advance();
        }
        self.expect(Token::LParen, "(")?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                params.push(self.expect_identifier()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen, ")")?;
        let body = Body::Block(self.parse_block()?);
        Ok(Expr::Function(Lambda { params, body }))
    }

    fn parse_block(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        self.expect(Token::LBrace, "{")?;
        let mut statements = Vec::new();
        loop {
            while self.eat(&Token::Semicolon) {}
            if self.eat(&Token::RBrace) {
                return Ok(statements);
            }
            if self.check(&Token::Eof) {
                return Err(self.unexpected("}"));
            }
            statements.push(self.parse_statement()?);
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        match self.current_token() {
            Token::Declare => {
                self.advance();
                let name = self.expect_identifier()?;
                let value = if self.eat(&Token::Assign) {
                    self.parse_expression()?
                } else {
                    Expr::Null
                };
                Ok(Statement::Declare { name, value })
            }
            Token::Return => {
                self.advance();
                if matches!(
                    self.current_token(),
                    Token::Semicolon | Token::RBrace | Token::Eof
                ) {
                    Ok(Statement::Return(Expr::Null))
                } else {
                    Ok(Statement::Return(self.parse_expression()?))
                }
            }
            _ => Ok(Statement::Expression(self.parse_expression()?)),
        }
    }

    /// cond ? a : b
    fn parse_conditional(&mut self) -> Result<Expr, SyntaxError> {
        let condition = self.parse_nullish()?;
        if !self.eat(&Token::Question) {
            return Ok(condition);
        }
        let then = self.parse_expression()?;
        self.expect(Token::Colon, ":")?;
        let otherwise = self.parse_expression()?;
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn parse_nullish(&mut self) -> Result<Expr, SyntaxError> {
        let depth = self.depth;
        let mut left = self.parse_or()?;
        while self.eat(&Token::QuestionQuestion) {
            self.descend()?;
            let right = self.parse_or()?;
            left = Self::binary(BinOp::NullCoalesce, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let depth = self.depth;
        let mut left = self.parse_and()?;
        while self.eat(&Token::OrOr) {
            self.descend()?;
            let right = self.parse_and()?;
            left = Self::binary(BinOp::Or, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let depth = self.depth;
        let mut left = self.parse_equality()?;
        while self.eat(&Token::AndAnd) {
            self.descend()?;
            let right = self.parse_equality()?;
            left = Self::binary(BinOp::And, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        let depth = self.depth;
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.current_token() {
                Token::EqEq => BinOp::Equal,
                Token::NotEq => BinOp::NotEqual,
                Token::EqEqEq => BinOp::StrictEqual,
                Token::NotEqEq => BinOp::StrictNotEqual,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.parse_relational()?;
            left = Self::binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, SyntaxError> {
        let depth = self.depth;
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current_token() {
                Token::Lt => BinOp::LessThan,
                Token::Gt => BinOp::GreaterThan,
                Token::LtEq => BinOp::LessEqual,
                Token::GtEq => BinOp::GreaterEqual,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.parse_additive()?;
            left = Self::binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let depth = self.depth;
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current_token() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.parse_multiplicative()?;
            left = Self::binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let depth = self.depth;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current_token() {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                Token::Percent => BinOp::Modulo,
                _ => break,
            };
            self.advance();
            self.descend()?;
            let right = self.parse_unary()?;
            left = Self::binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.current_token() {
            Token::Bang => UnaryOp::Not,
            Token::Minus => UnaryOp::Negate,
            Token::Plus => UnaryOp::Plus,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let depth = self.depth;
        self.descend()?;
        let operand = self.parse_unary()?;
        self.depth = depth;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.expect(Token::LParen, "(")?;
        let mut args = Vec::new();
        while !self.check(&Token::RParen) {
            args.push(self.parse_expression()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, ")")?;
        Ok(args)
    }

    /// Member access, indexing and calls, left to right.
    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let depth = self.depth;
        let mut expr = self.parse_primary()?;
        loop {
            if matches!(
                self.current_token(),
                Token::Dot | Token::LBracket | Token::LParen
            ) {
                self.descend()?;
            }
            match self.current_token() {
                Token::Dot => {
                    self.advance();
                    let property = self.expect_identifier()?;
                    if self.check(&Token::LParen) {
                        let args = self.parse_args()?;
                        expr = Expr::MethodCall {
                            object: Box::new(expr),
                            method: property,
                            args,
                        };
                    } else {
                        expr = Expr::Member {
                            object: Box::new(expr),
                            property,
                        };
                    }
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(Token::RBracket, "]")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                Token::LParen => match expr {
                    Expr::Identifier(callee) => {
                        let args = self.parse_args()?;
                        expr = Expr::Call { callee, args };
                    }
                    _ => return Err(self.unexpected("operator")),
                },
                _ => break,
            }
        }
        self.depth = depth;
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let expr = match self.current_token() {
            Token::Float(n) => Expr::Float(*n),
            Token::Integer(n) => Expr::Integer(*n),
            Token::String(s) => Expr::String(s.clone()),
            Token::Boolean(b) => Expr::Boolean(*b),
            Token::Null | Token::Undefined => Expr::Null,
            Token::Identifier(name) => Expr::Identifier(name.clone()),
            Token::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(Token::RParen, ")")?;
                return Ok(expr);
            }
            Token::LBracket => return self.parse_array(),
            Token::LBrace => return self.parse_object(),
            Token::Function => return self.parse_function_expression(),
            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        Ok(expr)
    }

    fn parse_array(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(Token::LBracket, "[")?;
        let mut elements = Vec::new();
        while !self.check(&Token::RBracket) {
            elements.push(self.parse_expression()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBracket, "]")?;
        Ok(Expr::Array(elements))
    }

    fn parse_object(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(Token::LBrace, "{")?;
        let mut fields = Vec::new();
        while !self.check(&Token::RBrace) {
            let key = match self.current_token() {
                Token::Identifier(name) | Token::String(name) => name.clone(),
                Token::Integer(n) => n.to_string(),
                _ => return Err(self.unexpected("object key")),
            };
            self.advance();
            let value = if self.eat(&Token::Colon) {
                self.parse_expression()?
            } else {
                // Shorthand `{a}`
                Expr::Identifier(key.clone())
            };
            fields.push((key, value));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace, "}")?;
        Ok(Expr::Object(fields))
    }
}
