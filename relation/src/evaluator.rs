//! FILENAME: relation/src/evaluator.rs
//! PURPOSE: Evaluates a parsed field expression against one table row.
//! CONTEXT: The pivot engine evaluates every registered field expression
//! once per source row, first for row/column keys and then for data
//! contributions. Evaluation follows SQL conventions: NULL propagates
//! through operators, integer arithmetic is checked, and mixing an
//! integer with a decimal promotes the result to a Double.

use crate::table::Table;
use crate::value::Value;
use parser::{BinaryOperator, Expression, Literal, UnaryOperator};
use thiserror::Error;

/// Errors raised while checking or evaluating a field expression.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum EvalError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric overflow")]
    NumericOverflow,

    #[error("operator {op} cannot combine {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluator bound to one source table. Column references resolve against
/// that table's schema; the row data arrives per call.
pub struct Evaluator<'a> {
    table: &'a Table,
}

impl<'a> Evaluator<'a> {
    pub fn new(table: &'a Table) -> Self {
        Evaluator { table }
    }

    /// Validates that every column reference in the expression exists in
    /// the bound table. Used at field registration time so that a bad
    /// reference fails fast instead of during populate.
    pub fn check(&self, expr: &Expression) -> EvalResult<()> {
        match expr {
            Expression::Literal(_) => Ok(()),
            Expression::Column(name) => {
                if self.table.column_index(name).is_some() {
                    Ok(())
                } else {
                    Err(EvalError::UnknownColumn(name.clone()))
                }
            }
            Expression::BinaryOp { left, right, .. } => {
                self.check(left)?;
                self.check(right)
            }
            Expression::UnaryOp { operand, .. } => self.check(operand),
            Expression::Case {
                operand,
                branches,
                else_branch,
            } => {
                if let Some(op) = operand {
                    self.check(op)?;
                }
                for (when, then) in branches {
                    self.check(when)?;
                    self.check(then)?;
                }
                if let Some(e) = else_branch {
                    self.check(e)?;
                }
                Ok(())
            }
        }
    }

    /// Evaluates the expression against the given row. The row slice must
    /// follow the bound table's column order.
    pub fn evaluate(&self, expr: &Expression, row: &[Value]) -> EvalResult<Value> {
        match expr {
            Expression::Literal(lit) => Ok(literal_value(lit)),

            Expression::Column(name) => {
                let index = self
                    .table
                    .column_index(name)
                    .ok_or_else(|| EvalError::UnknownColumn(name.clone()))?;
                Ok(row.get(index).cloned().unwrap_or(Value::Null))
            }

            Expression::BinaryOp { left, op, right } => match op {
                BinaryOperator::And | BinaryOperator::Or => {
                    self.evaluate_logic(left, *op, right, row)
                }
                _ => {
                    let lhs = self.evaluate(left, row)?;
                    let rhs = self.evaluate(right, row)?;
                    apply_binary(*op, lhs, rhs)
                }
            },

            Expression::UnaryOp { op, operand } => {
                let value = self.evaluate(operand, row)?;
                apply_unary(*op, value)
            }

            Expression::Case {
                operand,
                branches,
                else_branch,
            } => self.evaluate_case(operand.as_deref(), branches, else_branch.as_deref(), row),
        }
    }

    /// AND/OR with SQL three-valued shortcuts: FALSE AND x is FALSE and
    /// TRUE OR x is TRUE even when x is NULL.
    fn evaluate_logic(
        &self,
        left: &Expression,
        op: BinaryOperator,
        right: &Expression,
        row: &[Value],
    ) -> EvalResult<Value> {
        let lhs = self.evaluate(left, row)?;
        let lhs_bool = as_bool(&lhs, logic_op_name(op))?;

        match (op, lhs_bool) {
            (BinaryOperator::And, Some(false)) => return Ok(Value::Bool(false)),
            (BinaryOperator::Or, Some(true)) => return Ok(Value::Bool(true)),
            _ => {}
        }

        let rhs = self.evaluate(right, row)?;
        let rhs_bool = as_bool(&rhs, logic_op_name(op))?;

        match (op, lhs_bool, rhs_bool) {
            (BinaryOperator::And, Some(false), _) | (BinaryOperator::And, _, Some(false)) => {
                Ok(Value::Bool(false))
            }
            (BinaryOperator::Or, Some(true), _) | (BinaryOperator::Or, _, Some(true)) => {
                Ok(Value::Bool(true))
            }
            (_, None, _) | (_, _, None) => Ok(Value::Null),
            (BinaryOperator::And, Some(a), Some(b)) => Ok(Value::Bool(a && b)),
            (BinaryOperator::Or, Some(a), Some(b)) => Ok(Value::Bool(a || b)),
            _ => unreachable!("evaluate_logic called with a non-logic operator"),
        }
    }

    fn evaluate_case(
        &self,
        operand: Option<&Expression>,
        branches: &[(Expression, Expression)],
        else_branch: Option<&Expression>,
        row: &[Value],
    ) -> EvalResult<Value> {
        match operand {
            // Simple form: compare the operand against each WHEN value.
            // Per SQL equality, NULL never matches anything.
            Some(op_expr) => {
                let subject = self.evaluate(op_expr, row)?;
                for (when, then) in branches {
                    let candidate = self.evaluate(when, row)?;
                    if let Value::Bool(true) = compare_equal(&subject, &candidate) {
                        return self.evaluate(then, row);
                    }
                }
            }
            // Searched form: take the first branch whose condition is TRUE.
            None => {
                for (when, then) in branches {
                    if self.evaluate(when, row)? == Value::Bool(true) {
                        return self.evaluate(then, row);
                    }
                }
            }
        }

        match else_branch {
            Some(e) => self.evaluate(e, row),
            None => Ok(Value::Null),
        }
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Integer(n) => Value::Int64(*n),
        Literal::Float(n) => Value::Double(*n),
        Literal::String(s) => Value::Text(s.clone()),
        Literal::Boolean(b) => Value::Bool(*b),
    }
}

fn logic_op_name(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::And => "AND",
        BinaryOperator::Or => "OR",
        _ => "logic",
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Int8(_)
        | Value::Int16(_)
        | Value::Int32(_)
        | Value::Int64(_)
        | Value::UInt8(_)
        | Value::UInt16(_)
        | Value::UInt32(_)
        | Value::UInt64(_) => "integer",
        Value::Float(_) | Value::Double(_) => "decimal",
        Value::Text(_) => "text",
        Value::Bytes(_) => "bytes",
        Value::Bool(_) => "boolean",
    }
}

/// Interprets a value as a nullable boolean for AND/OR/NOT.
fn as_bool(value: &Value, op: &'static str) -> EvalResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        other => Err(EvalError::TypeMismatch {
            op,
            left: type_name(other),
            right: "boolean",
        }),
    }
}

fn apply_unary(op: UnaryOperator, value: Value) -> EvalResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match op {
        UnaryOperator::Negate => match &value {
            Value::Double(n) => Ok(Value::Double(-n)),
            Value::Float(n) => Ok(Value::Double(-(*n as f64))),
            _ => match value.as_i64() {
                Some(n) => n
                    .checked_neg()
                    .map(Value::Int64)
                    .ok_or(EvalError::NumericOverflow),
                None => Err(EvalError::TypeMismatch {
                    op: "-",
                    left: type_name(&value),
                    right: "number",
                }),
            },
        },
        UnaryOperator::Not => match as_bool(&value, "NOT")? {
            Some(b) => Ok(Value::Bool(!b)),
            None => Ok(Value::Null),
        },
    }
}

fn apply_binary(op: BinaryOperator, lhs: Value, rhs: Value) -> EvalResult<Value> {
    // NULL in, NULL out for every non-logic operator.
    if lhs.is_null() || rhs.is_null() {
        return Ok(Value::Null);
    }

    match op {
        BinaryOperator::Add
        | BinaryOperator::Subtract
        | BinaryOperator::Multiply
        | BinaryOperator::Divide => apply_arithmetic(op, lhs, rhs),

        BinaryOperator::Concat => match (&lhs, &rhs) {
            (Value::Bytes(_), _) | (_, Value::Bytes(_)) => Err(EvalError::TypeMismatch {
                op: "||",
                left: type_name(&lhs),
                right: type_name(&rhs),
            }),
            _ => Ok(Value::Text(format!("{}{}", lhs, rhs))),
        },

        BinaryOperator::Equal => Ok(compare_equal(&lhs, &rhs)),
        BinaryOperator::NotEqual => match compare_equal(&lhs, &rhs) {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Ok(other),
        },

        BinaryOperator::LessThan
        | BinaryOperator::GreaterThan
        | BinaryOperator::LessEqual
        | BinaryOperator::GreaterEqual => {
            let ordering = compare_order(&lhs, &rhs).ok_or(EvalError::TypeMismatch {
                op: order_op_name(op),
                left: type_name(&lhs),
                right: type_name(&rhs),
            })?;
            let result = match op {
                BinaryOperator::LessThan => ordering.is_lt(),
                BinaryOperator::GreaterThan => ordering.is_gt(),
                BinaryOperator::LessEqual => ordering.is_le(),
                BinaryOperator::GreaterEqual => ordering.is_ge(),
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }

        BinaryOperator::And | BinaryOperator::Or => {
            unreachable!("logic operators are handled by evaluate_logic")
        }
    }
}

fn order_op_name(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::LessThan => "<",
        BinaryOperator::GreaterThan => ">",
        BinaryOperator::LessEqual => "<=",
        BinaryOperator::GreaterEqual => ">=",
        _ => "compare",
    }
}

fn apply_arithmetic(op: BinaryOperator, lhs: Value, rhs: Value) -> EvalResult<Value> {
    let op_name = match op {
        BinaryOperator::Add => "+",
        BinaryOperator::Subtract => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        _ => unreachable!(),
    };

    let mismatch = || EvalError::TypeMismatch {
        op: op_name,
        left: type_name(&lhs),
        right: type_name(&rhs),
    };

    let float_involved = matches!(lhs, Value::Float(_) | Value::Double(_))
        || matches!(rhs, Value::Float(_) | Value::Double(_));

    if float_involved {
        let a = lhs.as_f64().ok_or_else(&mismatch)?;
        let b = rhs.as_f64().ok_or_else(&mismatch)?;
        let result = match op {
            BinaryOperator::Add => a + b,
            BinaryOperator::Subtract => a - b,
            BinaryOperator::Multiply => a * b,
            BinaryOperator::Divide => {
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                a / b
            }
            _ => unreachable!(),
        };
        return Ok(Value::Double(result));
    }

    let a = lhs.as_i64().ok_or_else(&mismatch)?;
    let b = rhs.as_i64().ok_or_else(&mismatch)?;
    let result = match op {
        BinaryOperator::Add => a.checked_add(b),
        BinaryOperator::Subtract => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        BinaryOperator::Divide => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_div(b)
        }
        _ => unreachable!(),
    };
    result.map(Value::Int64).ok_or(EvalError::NumericOverflow)
}

/// Equality for = and the simple CASE form. Numeric values compare across
/// width and family; everything else requires matching variants.
fn compare_equal(lhs: &Value, rhs: &Value) -> Value {
    if lhs.is_null() || rhs.is_null() {
        return Value::Null;
    }
    match compare_order(lhs, rhs) {
        Some(ordering) => Value::Bool(ordering.is_eq()),
        None => Value::Bool(false),
    }
}

/// Ordering for comparison operators. Returns None when the two values
/// are not comparable (e.g. text against a number).
fn compare_order(lhs: &Value, rhs: &Value) -> Option<std::cmp::Ordering> {
    use std::cmp::Ordering;

    match (lhs, rhs) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
        _ => {
            // Numeric cross-family comparison. Exact within integers,
            // via f64 when a decimal is involved.
            match (lhs.as_i64(), rhs.as_i64()) {
                (Some(a), Some(b))
                    if !matches!(lhs, Value::Float(_) | Value::Double(_))
                        && !matches!(rhs, Value::Float(_) | Value::Double(_)) =>
                {
                    Some(a.cmp(&b))
                }
                _ => {
                    let a = lhs.as_f64()?;
                    let b = rhs.as_f64()?;
                    if a < b {
                        Some(Ordering::Less)
                    } else if a > b {
                        Some(Ordering::Greater)
                    } else if a == b {
                        Some(Ordering::Equal)
                    } else {
                        None
                    }
                }
            }
        }
    }
}
