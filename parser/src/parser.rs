//! FILENAME: parser/src/parser.rs
//! PURPOSE: Recursive descent parser that converts a stream of Tokens into an AST.
//! CONTEXT: This is the second stage of the parsing pipeline. It takes tokens
//! from the Lexer and builds an Expression tree that can be evaluated
//! against a source row.
//!
//! GRAMMAR:
//!   field_list     --> field ("," field)*
//!   field          --> expression ("AS" IDENTIFIER)?
//!   expression     --> or
//!   or             --> and ("OR" and)*
//!   and            --> not ("AND" not)*
//!   not            --> "NOT" not | comparison
//!   comparison     --> concatenation ( ("=" | "<>" | "!=" | "<" | ">" | "<=" | ">=") concatenation )*
//!   concatenation  --> additive ( "||" additive )*
//!   additive       --> multiplicative ( ("+" | "-") multiplicative )*
//!   multiplicative --> unary ( ("*" | "/") unary )*
//!   unary          --> "-" unary | primary
//!   primary        --> NUMBER | STRING | BOOLEAN | NULL | column | case_expr | "(" expression ")"
//!   column         --> IDENTIFIER | QUOTED_IDENTIFIER
//!   case_expr      --> "CASE" expression? ("WHEN" expression "THEN" expression)+ ("ELSE" expression)? "END"

use crate::ast::{BinaryOperator, Expression, FieldExpr, Literal, UnaryOperator};
use crate::lexer::Lexer;
use crate::token::{Keyword, Token};

/// Parser errors with descriptive messages.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// The Parser struct holds the lexer and current token state.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
}

impl<'a> Parser<'a> {
    /// Creates a new parser from an input string.
    /// Automatically advances to the first token.
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
        }
    }

    /// Parses the entire input as a single expression.
    pub fn parse(&mut self) -> ParseResult<Expression> {
        if self.current_token == Token::EOF {
            return Err(ParseError::new("Empty expression"));
        }

        let expr = self.parse_expression()?;

        // Ensure we consumed all tokens
        if self.current_token != Token::EOF {
            if let Token::Illegal(ch) = self.current_token {
                return Err(ParseError::new(format!("Illegal character: {}", ch)));
            }
            return Err(ParseError::new(format!(
                "Unexpected token after expression: {}",
                self.current_token
            )));
        }

        Ok(expr)
    }

    /// Parses the entire input as a comma-separated field list, each element
    /// being an expression with an optional `AS alias` suffix.
    pub fn parse_fields(&mut self) -> ParseResult<Vec<FieldExpr>> {
        if self.current_token == Token::EOF {
            return Err(ParseError::new("Empty field specification"));
        }

        let mut fields = Vec::new();
        loop {
            let expr = self.parse_expression()?;
            let alias = if self.current_token == Token::Keyword(Keyword::As) {
                self.advance();
                match self.current_token.clone() {
                    Token::Identifier(name) | Token::QuotedIdentifier(name) => {
                        self.advance();
                        Some(name)
                    }
                    token => {
                        return Err(ParseError::new(format!(
                            "Expected alias name after AS, found {}",
                            token
                        )))
                    }
                }
            } else {
                None
            };
            fields.push(FieldExpr { expr, alias });

            if self.current_token == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }

        if self.current_token != Token::EOF {
            if let Token::Illegal(ch) = self.current_token {
                return Err(ParseError::new(format!("Illegal character: {}", ch)));
            }
            return Err(ParseError::new(format!(
                "Unexpected token after field list: {}",
                self.current_token
            )));
        }

        Ok(fields)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    /// Checks if the current token matches the expected token.
    /// If it matches, advances and returns Ok. Otherwise returns an error.
    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.current_token == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "Expected {}, found {}",
                expected, self.current_token
            )))
        }
    }

    /// Entry point for expression parsing.
    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_or()
    }

    /// Parses OR expressions (lowest precedence).
    fn parse_or(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_and()?;

        while self.current_token == Token::Keyword(Keyword::Or) {
            self.advance();
            let right = self.parse_and()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op: BinaryOperator::Or,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses AND expressions.
    fn parse_and(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_not()?;

        while self.current_token == Token::Keyword(Keyword::And) {
            self.advance();
            let right = self.parse_not()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op: BinaryOperator::And,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses NOT expressions.
    fn parse_not(&mut self) -> ParseResult<Expression> {
        if self.current_token == Token::Keyword(Keyword::Not) {
            self.advance();
            let operand = self.parse_not()?;
            return Ok(Expression::UnaryOp {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
            });
        }

        self.parse_comparison()
    }

    /// Parses comparison expressions (=, <>, !=, <, >, <=, >=).
    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_concatenation()?;

        loop {
            let op = match &self.current_token {
                Token::Equals => BinaryOperator::Equal,
                Token::NotEqual => BinaryOperator::NotEqual,
                Token::LessThan => BinaryOperator::LessThan,
                Token::GreaterThan => BinaryOperator::GreaterThan,
                Token::LessEqual => BinaryOperator::LessEqual,
                Token::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };

            self.advance();
            let right = self.parse_concatenation()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses concatenation expressions (||).
    fn parse_concatenation(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_additive()?;

        while self.current_token == Token::Concat {
            self.advance();
            let right = self.parse_additive()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op: BinaryOperator::Concat,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses additive expressions (+ and -).
    fn parse_additive(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current_token {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses multiplicative expressions (* and /).
    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current_token {
                Token::Asterisk => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary()?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses unary expressions (negation).
    fn parse_unary(&mut self) -> ParseResult<Expression> {
        if self.current_token == Token::Minus {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expression::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(operand),
            });
        }

        self.parse_primary()
    }

    /// Parses primary expressions (literals, column refs, CASE, parentheses).
    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.current_token.clone() {
            Token::Integer(n) => {
                self.advance();
                Ok(Expression::Literal(Literal::Integer(n)))
            }

            Token::Float(n) => {
                self.advance();
                Ok(Expression::Literal(Literal::Float(n)))
            }

            Token::String(s) => {
                self.advance();
                Ok(Expression::Literal(Literal::String(s)))
            }

            Token::Boolean(b) => {
                self.advance();
                Ok(Expression::Literal(Literal::Boolean(b)))
            }

            Token::Null => {
                self.advance();
                Ok(Expression::Literal(Literal::Null))
            }

            // Column references, quoted or bare
            Token::Identifier(name) | Token::QuotedIdentifier(name) => {
                self.advance();
                Ok(Expression::Column(name))
            }

            Token::Keyword(Keyword::Case) => {
                self.advance();
                self.parse_case()
            }

            // Parenthesized expression
            Token::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }

            // Error cases
            Token::EOF => Err(ParseError::new("Unexpected end of expression")),

            Token::Illegal(ch) => Err(ParseError::new(format!("Illegal character: {}", ch))),

            token => Err(ParseError::new(format!("Unexpected token: {}", token))),
        }
    }

    /// Parses a CASE expression after the CASE keyword has been consumed.
    /// Handles both the simple form (with an operand before the first WHEN)
    /// and the searched form (WHEN holds a condition).
    fn parse_case(&mut self) -> ParseResult<Expression> {
        let operand = if self.current_token == Token::Keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        let mut branches = Vec::new();
        while self.current_token == Token::Keyword(Keyword::When) {
            self.advance();
            let when = self.parse_expression()?;
            self.expect(Token::Keyword(Keyword::Then))?;
            let then = self.parse_expression()?;
            branches.push((when, then));
        }

        if branches.is_empty() {
            return Err(ParseError::new("CASE requires at least one WHEN branch"));
        }

        let else_branch = if self.current_token == Token::Keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.expect(Token::Keyword(Keyword::End))?;

        Ok(Expression::Case {
            operand,
            branches,
            else_branch,
        })
    }
}

/// Convenience function to parse a single field expression directly.
pub fn parse(input: &str) -> ParseResult<Expression> {
    let mut parser = Parser::new(input);
    parser.parse()
}

/// Convenience function to parse a comma-separated field list directly.
pub fn parse_field_list(input: &str) -> ParseResult<Vec<FieldExpr>> {
    let mut parser = Parser::new(input);
    parser.parse_fields()
}
