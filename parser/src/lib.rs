//! FILENAME: parser/src/lib.rs
//! PURPOSE: Library root for the field-expression parser.
//! CONTEXT: This module exposes the lexer, parser, and AST components
//! needed to convert field specifications into evaluatable expression trees.
//!
//! PIPELINE: Field Spec String --> Lexer --> Tokens --> Parser --> AST --> Evaluator
//!
//! SUPPORTED FEATURES:
//! - Arithmetic: +, -, *, /
//! - Comparison: =, <>, !=, <, >, <=, >=
//! - Logic: AND, OR, NOT
//! - String concatenation: ||
//! - Column references: price, "Unit Price"
//! - CASE expressions (simple and searched)
//! - Comma-separated field lists with AS aliases
//! - Parentheses for grouping
//! - Unary negation: -5

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;


// Re-export commonly used types for convenience
pub use ast::{BinaryOperator, Expression, FieldExpr, Literal, UnaryOperator};
pub use lexer::Lexer;
pub use parser::{parse, parse_field_list, ParseError, ParseResult, Parser};
pub use token::{Keyword, Token};
