//! FILENAME: parser/src/lexer.rs
//! PURPOSE: Scans a raw field specification and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. It handles
//! whitespace skipping, integer/decimal parsing, single-quoted string
//! literals, double-quoted column identifiers, and multi-character
//! operators like <= and ||.
//!
//! SUPPORTED OPERATORS:
//! - Single char: + - * / ( ) , = < >
//! - Multi char: <= >= <> != ||
//! - String literals: 'it''s' (doubled quote escape)
//! - Quoted identifiers: "Unit Price"

use crate::token::{Keyword, Token};
use std::iter::Peekable;
use std::str::Chars;

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
        }
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.input.next() {
            Some('+') => Token::Plus,
            Some('-') => Token::Minus,
            Some('*') => Token::Asterisk,
            Some('/') => Token::Slash,
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,
            Some(',') => Token::Comma,
            Some('=') => Token::Equals,

            // Handle | which is only valid as the || concatenation operator
            Some('|') => match self.input.peek() {
                Some('|') => {
                    self.input.next();
                    Token::Concat
                }
                _ => Token::Illegal('|'),
            },

            // Handle ! which is only valid as the != alternative spelling
            Some('!') => match self.input.peek() {
                Some('=') => {
                    self.input.next();
                    Token::NotEqual
                }
                _ => Token::Illegal('!'),
            },

            // Handle < and potentially <= or <>
            Some('<') => self.read_less_than_operator(),

            // Handle > and potentially >=
            Some('>') => self.read_greater_than_operator(),

            // Handle single quotes for string literals
            Some('\'') => self.read_string(),

            // Handle double quotes for quoted column identifiers
            Some('"') => self.read_quoted_identifier(),

            // Handle numbers (starts with digit or dot)
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.read_number(ch),

            // Handle identifiers and keywords (starts with letter)
            Some(ch) if is_letter(ch) => self.read_identifier(ch),

            // End of input
            None => Token::EOF,

            // Unknown character
            Some(ch) => Token::Illegal(ch),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.input.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.input.next();
        }
    }

    /// Handles operators starting with '<': <, <=, <>
    fn read_less_than_operator(&mut self) -> Token {
        match self.input.peek() {
            Some('=') => {
                self.input.next();
                Token::LessEqual
            }
            Some('>') => {
                self.input.next();
                Token::NotEqual
            }
            _ => Token::LessThan,
        }
    }

    /// Handles operators starting with '>': >, >=
    fn read_greater_than_operator(&mut self) -> Token {
        match self.input.peek() {
            Some('=') => {
                self.input.next();
                Token::GreaterEqual
            }
            _ => Token::GreaterThan,
        }
    }

    /// Reads a single-quoted string literal: 'it''s' (escaped quote).
    fn read_string(&mut self) -> Token {
        let mut result = String::new();
        while let Some(&ch) = self.input.peek() {
            if ch == '\'' {
                // Check for escaped single quote ('')
                self.input.next();
                if self.input.peek() == Some(&'\'') {
                    result.push('\'');
                    self.input.next();
                } else {
                    return Token::String(result);
                }
            } else {
                result.push(ch);
                self.input.next();
            }
        }
        // If we hit EOF without closing quote, return what we have.
        Token::String(result)
    }

    /// Reads a double-quoted column identifier: "Unit Price"
    fn read_quoted_identifier(&mut self) -> Token {
        let mut result = String::new();
        while let Some(&ch) = self.input.peek() {
            if ch == '"' {
                // Check for escaped double quote ("")
                self.input.next();
                if self.input.peek() == Some(&'"') {
                    result.push('"');
                    self.input.next();
                } else {
                    return Token::QuotedIdentifier(result);
                }
            } else {
                result.push(ch);
                self.input.next();
            }
        }
        // If we hit EOF without closing quote, return what we have
        Token::QuotedIdentifier(result)
    }

    fn read_number(&mut self, first_char: char) -> Token {
        let mut number_str = String::from(first_char);
        let mut has_dot = first_char == '.';

        while let Some(&ch) = self.input.peek() {
            if ch.is_ascii_digit() {
                number_str.push(ch);
                self.input.next();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                number_str.push(ch);
                self.input.next();
            } else {
                break;
            }
        }

        if has_dot {
            if let Ok(n) = number_str.parse::<f64>() {
                return Token::Float(n);
            }
        } else if let Ok(n) = number_str.parse::<i64>() {
            return Token::Integer(n);
        }

        // Fallback if parsing fails (e.g. just ".")
        Token::Illegal(first_char)
    }

    fn read_identifier(&mut self, first_char: char) -> Token {
        let mut ident = String::from(first_char);

        while let Some(&ch) = self.input.peek() {
            if is_letter(ch) || ch.is_ascii_digit() {
                ident.push(ch);
                self.input.next();
            } else {
                break;
            }
        }

        match ident.to_uppercase().as_str() {
            "TRUE" => Token::Boolean(true),
            "FALSE" => Token::Boolean(false),
            "NULL" => Token::Null,
            "CASE" => Token::Keyword(Keyword::Case),
            "WHEN" => Token::Keyword(Keyword::When),
            "THEN" => Token::Keyword(Keyword::Then),
            "ELSE" => Token::Keyword(Keyword::Else),
            "END" => Token::Keyword(Keyword::End),
            "AS" => Token::Keyword(Keyword::As),
            "AND" => Token::Keyword(Keyword::And),
            "OR" => Token::Keyword(Keyword::Or),
            "NOT" => Token::Keyword(Keyword::Not),
            // Column names keep their original spelling; the relation layer
            // resolves unquoted references case-insensitively.
            _ => Token::Identifier(ident),
        }
    }
}

/// Returns true if `ch` can start or continue an identifier.
fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}
