use crate::ast::{ArithOp, CompareOp, Expr};
use crate::error::{CelError, Span};
use crate::lexer::{Token, TokenType};
use crate::value::Value;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse a single expression; trailing tokens are a syntax error. This is
    /// also what rejects chained comparisons like `1 < 2 < 3`.
    pub fn parse(&mut self) -> Result<Expr, CelError> {
        let expr = self.comparison()?;

        if !self.is_at_end() {
            let token = self.peek();
            return Err(CelError::syntax_error_with_help(
                token.span.clone(),
                format!("Expected end of expression, found '{}'", token.lexeme),
                "An expression contains at most one comparison operator; comparisons cannot be chained.".to_string(),
            ));
        }

        Ok(expr)
    }

    /// comparison := additive (compareOp additive)?  -- non-associative
    fn comparison(&mut self) -> Result<Expr, CelError> {
        let expr = self.additive()?;

        if self.match_types(&[
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
            TokenType::EqualEqual,
            TokenType::BangEqual,
            TokenType::In,
        ]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Greater => CompareOp::Greater,
                TokenType::GreaterEqual => CompareOp::GreaterEqual,
                TokenType::Less => CompareOp::Less,
                TokenType::LessEqual => CompareOp::LessEqual,
                TokenType::EqualEqual => CompareOp::Equal,
                TokenType::BangEqual => CompareOp::NotEqual,
                TokenType::In => CompareOp::In,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.additive().map_err(|_| {
                CelError::syntax_error_with_help(
                    operator_token.span.clone(),
                    format!("Expected expression after '{}'", operator_token.lexeme),
                    "Comparison operators require expressions on both sides.".to_string(),
                )
            })?;
            let end = right.span().end;

            return Ok(Expr::Comparison {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            });
        }

        Ok(expr)
    }

    /// additive := postfix (('+' | '-') postfix)*  -- left-associative
    fn additive(&mut self) -> Result<Expr, CelError> {
        let mut expr = self.postfix()?;

        while self.match_types(&[TokenType::Minus, TokenType::Plus]) {
            let operator_token = self.previous().clone();
            let operator = match operator_token.token_type {
                TokenType::Minus => ArithOp::Subtract,
                TokenType::Plus => ArithOp::Add,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.postfix().map_err(|_| {
                CelError::syntax_error_with_help(
                    operator_token.span.clone(),
                    format!("Expected expression after '{}'", operator_token.lexeme),
                    "Arithmetic operators like '+' and '-' require expressions on both sides."
                        .to_string(),
                )
            })?;
            let end = right.span().end;

            expr = Expr::Additive {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            };
        }

        Ok(expr)
    }

    /// postfix := primary ('.' Identifier | '[' comparison ']')*
    fn postfix(&mut self) -> Result<Expr, CelError> {
        let mut expr = self.primary()?;

        loop {
            if self.match_types(&[TokenType::Dot]) {
                let name_token = self
                    .consume(TokenType::Identifier, "Expected property name after '.'")?
                    .clone();

                let start = expr.span().start;
                let end = name_token.span.end;
                expr = Expr::Member {
                    object: Box::new(expr),
                    name: name_token.lexeme,
                    span: Span::new(start, end),
                };
            } else if self.match_types(&[TokenType::LeftBracket]) {
                let index = self.comparison()?;
                let end_token = self.consume_with_help(
                    TokenType::RightBracket,
                    "Expected ']' after index expression",
                    "Index accesses must be closed with ']'. Example: items[0]".to_string(),
                )?;

                let start = expr.span().start;
                let end = end_token.span.end;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    span: Span::new(start, end),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, CelError> {
        if self.is_at_end() {
            return Err(CelError::syntax_error_with_help(
                self.peek().span.clone(),
                "Unexpected end of input".to_string(),
                "Expected an expression here. Check for unmatched parentheses, brackets, or a trailing operator.".to_string(),
            ));
        }

        let token = self.advance().clone();

        match token.token_type {
            TokenType::Integer => {
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    CelError::syntax_error(token.span.clone(), "Invalid integer literal".to_string())
                })?;
                Ok(Expr::Literal {
                    value: Value::Int(value),
                    span: token.span,
                })
            }
            TokenType::HexInteger => {
                let value = i64::from_str_radix(&token.lexeme, 16).map_err(|_| {
                    CelError::syntax_error(token.span.clone(), "Invalid hex literal".to_string())
                })?;
                Ok(Expr::Literal {
                    value: Value::Int(value),
                    span: token.span,
                })
            }
            TokenType::UnsignedInteger => {
                let value = token.lexeme.parse::<u64>().map_err(|_| {
                    CelError::syntax_error(token.span.clone(), "Invalid integer literal".to_string())
                })?;
                Ok(Expr::Literal {
                    value: Value::Uint(value),
                    span: token.span,
                })
            }
            TokenType::UnsignedHexInteger => {
                let value = u64::from_str_radix(&token.lexeme, 16).map_err(|_| {
                    CelError::syntax_error(token.span.clone(), "Invalid hex literal".to_string())
                })?;
                Ok(Expr::Literal {
                    value: Value::Uint(value),
                    span: token.span,
                })
            }
            TokenType::String => Ok(Expr::Literal {
                value: Value::String(token.lexeme),
                span: token.span,
            }),
            TokenType::Identifier => Ok(Expr::Identifier {
                name: token.lexeme,
                span: token.span,
            }),
            TokenType::ReservedIdentifier => Ok(Expr::Reserved {
                name: token.lexeme,
                span: token.span,
            }),
            TokenType::LeftParen => {
                let expr = self.comparison()?;
                let end_token = self.consume_with_help(
                    TokenType::RightParen,
                    "Expected ')' after expression",
                    "Every opening parenthesis '(' must have a matching closing parenthesis ')'."
                        .to_string(),
                )?;
                Ok(Expr::Grouping {
                    expr: Box::new(expr),
                    span: Span::new(token.span.start, end_token.span.end),
                })
            }
            TokenType::LeftBracket => self.list_literal(token.span),
            TokenType::LeftBrace => self.map_literal(token.span),
            _ => {
                let help_msg = match token.token_type {
                    TokenType::RightParen => {
                        "Found ')' without matching '('. Check for unbalanced parentheses."
                    }
                    TokenType::RightBrace => {
                        "Found '}' without matching '{'. Check for unbalanced braces."
                    }
                    TokenType::RightBracket => {
                        "Found ']' without matching '['. Check for unbalanced brackets."
                    }
                    TokenType::Eof => "Reached end of input while expecting an expression.",
                    _ => "Expected a literal, identifier, list, map, or parenthesized expression here.",
                };

                Err(CelError::syntax_error_with_help(
                    token.span,
                    format!("Expected expression, found '{}'", token.lexeme),
                    help_msg.to_string(),
                ))
            }
        }
    }

    fn list_literal(&mut self, start_span: Span) -> Result<Expr, CelError> {
        let mut elements = Vec::new();

        if !self.check(&TokenType::RightBracket) {
            loop {
                elements.push(self.comparison()?);
                if !self.match_types(&[TokenType::Comma]) {
                    break;
                }
            }
        }

        let end_token = self.consume_with_help(
            TokenType::RightBracket,
            "Expected ']' after list elements",
            "List literals must be closed with ']'. Example: [1, 2, 3]".to_string(),
        )?;
        Ok(Expr::List {
            elements,
            span: Span::new(start_span.start, end_token.span.end),
        })
    }

    fn map_literal(&mut self, start_span: Span) -> Result<Expr, CelError> {
        let mut entries = Vec::new();

        if !self.check(&TokenType::RightBrace) {
            loop {
                let key_token = self
                    .consume_with_help(
                        TokenType::String,
                        "Expected string key in map literal",
                        "Map keys must be string literals. Example: {\"key\": 1}".to_string(),
                    )?
                    .clone();
                self.consume_with_help(
                    TokenType::Colon,
                    "Expected ':' after map key",
                    "Map entries require a colon between key and value. Example: {\"key\": 1}"
                        .to_string(),
                )?;
                let value = self.comparison()?;
                entries.push((key_token.lexeme, value));

                if !self.match_types(&[TokenType::Comma]) {
                    break;
                }
            }
        }

        let end_token = self.consume_with_help(
            TokenType::RightBrace,
            "Expected '}' after map entries",
            "Map literals must be closed with '}'. Example: {\"key\": 1}".to_string(),
        )?;
        Ok(Expr::Map {
            entries,
            span: Span::new(start_span.start, end_token.span.end),
        })
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            &self.peek().token_type == token_type
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<&Token, CelError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            Err(CelError::syntax_error(self.error_span(), message.to_string()))
        }
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: String,
    ) -> Result<&Token, CelError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            Err(CelError::syntax_error_with_help(
                self.error_span(),
                message.to_string(),
                help,
            ))
        }
    }

    // At EOF, point just past the last real token instead of at the
    // zero-width EOF token.
    fn error_span(&self) -> Span {
        if self.is_at_end() && self.current > 0 {
            let last_token = &self.tokens[self.current - 1];
            Span::single(last_token.span.end)
        } else {
            self.peek().span.clone()
        }
    }
}
