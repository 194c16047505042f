//! FILENAME: parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for field expressions.
//! CONTEXT: After the Lexer tokenizes a field specification, the Parser
//! converts those tokens into this tree structure. The relation evaluator
//! then traverses this tree against one source row to compute a value.
//!
//! SUPPORTED EXPRESSIONS:
//! - Literals: integers, decimals, strings, booleans, NULL
//! - Column references: price, "Unit Price"
//! - Binary operations: +, -, *, /, ||, =, <>, <, >, <=, >=, AND, OR
//! - Unary operations: - (negation), NOT
//! - CASE expressions, both simple and searched forms

use std::fmt;

/// Represents a parsed field expression.
/// This is the core data structure that the evaluator will traverse.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    /// A literal value: number, string, boolean or NULL.
    Literal(Literal),

    /// A reference to a column of the bound source relation.
    /// Unquoted names are matched case-insensitively; quoted names keep
    /// their exact spelling.
    Column(String),

    /// A binary operation: left op right (e.g., price * 2, genre = 'Pop').
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },

    /// A unary operation: op operand (e.g., -price, NOT sold).
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// A CASE expression. When `operand` is present this is the simple form
    /// (CASE x WHEN v THEN r ... END, branches compare against x); otherwise
    /// it is the searched form (CASE WHEN cond THEN r ... END).
    Case {
        operand: Option<Box<Expression>>,
        branches: Vec<(Expression, Expression)>,
        else_branch: Option<Box<Expression>>,
    },
}

/// Literal values that can appear in field expressions.
#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Null,
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

/// Binary operators for expressions.
/// Listed in order of precedence groups (OR is lowest).
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BinaryOperator {
    // Logic (lowest precedence)
    Or,
    And,

    // Comparison operators
    Equal,        // =
    NotEqual,     // <> or !=
    LessThan,     // <
    GreaterThan,  // >
    LessEqual,    // <=
    GreaterEqual, // >=

    // String concatenation
    Concat, // ||

    // Arithmetic operators
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // / (highest precedence among binary ops)
}

/// Unary operators.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum UnaryOperator {
    Negate, // -
    Not,    // NOT
}

/// One element of a field specification list: an expression plus its
/// optional `AS alias` suffix. A single registration call may carry several
/// of these, separated by commas.
#[derive(Debug, PartialEq, Clone)]
pub struct FieldExpr {
    pub expr: Expression,
    pub alias: Option<String>,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOperator::Or => write!(f, "OR"),
            BinaryOperator::And => write!(f, "AND"),
            BinaryOperator::Equal => write!(f, "="),
            BinaryOperator::NotEqual => write!(f, "<>"),
            BinaryOperator::LessThan => write!(f, "<"),
            BinaryOperator::GreaterThan => write!(f, ">"),
            BinaryOperator::LessEqual => write!(f, "<="),
            BinaryOperator::GreaterEqual => write!(f, ">="),
            BinaryOperator::Concat => write!(f, "||"),
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Subtract => write!(f, "-"),
            BinaryOperator::Multiply => write!(f, "*"),
            BinaryOperator::Divide => write!(f, "/"),
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
            UnaryOperator::Not => write!(f, "NOT"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// Renders nested binary operands inside parentheses so the printed form
/// round-trips through the parser with the same structure.
fn fmt_operand(expr: &Expression, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        Expression::BinaryOp { .. } => write!(f, "({})", expr),
        other => write!(f, "{}", other),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(lit) => write!(f, "{}", lit),
            Expression::Column(name) => {
                let plain = name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
                if plain && !name.is_empty() {
                    write!(f, "{}", name)
                } else {
                    write!(f, "\"{}\"", name)
                }
            }
            Expression::BinaryOp { left, op, right } => {
                fmt_operand(left, f)?;
                write!(f, " {} ", op)?;
                fmt_operand(right, f)
            }
            Expression::UnaryOp { op, operand } => match op {
                UnaryOperator::Negate => {
                    write!(f, "-")?;
                    fmt_operand(operand, f)
                }
                UnaryOperator::Not => {
                    write!(f, "NOT ")?;
                    fmt_operand(operand, f)
                }
            },
            Expression::Case {
                operand,
                branches,
                else_branch,
            } => {
                write!(f, "CASE")?;
                if let Some(op) = operand {
                    write!(f, " {}", op)?;
                }
                for (when, then) in branches {
                    write!(f, " WHEN {} THEN {}", when, then)?;
                }
                if let Some(e) = else_branch {
                    write!(f, " ELSE {}", e)?;
                }
                write!(f, " END")
            }
        }
    }
}
