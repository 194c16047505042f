//! FILENAME: relation/src/tests.rs
//! PURPOSE: Consolidated unit tests for the relation crate.

use crate::evaluator::{EvalError, Evaluator};
use crate::table::{ColumnInfo, Table};
use crate::value::{GroupKey, Value, ValueType};
use parser::parse;

fn sales_table() -> Table {
    let mut table = Table::new(vec![
        ColumnInfo::new("city", ValueType::Text),
        ColumnInfo::new("qty", ValueType::Int32),
        ColumnInfo::new("price", ValueType::Double),
        ColumnInfo::new("Unit Price", ValueType::Double),
        ColumnInfo::new("sold", ValueType::Bool),
    ]);
    table.push_row(vec![
        Value::Text("Paris".to_string()),
        Value::Int32(3),
        Value::Double(9.5),
        Value::Double(2.0),
        Value::Bool(true),
    ]);
    table.push_row(vec![
        Value::Text("Lyon".to_string()),
        Value::Int32(7),
        Value::Null,
        Value::Double(4.0),
        Value::Bool(false),
    ]);
    table
}

fn eval(table: &Table, input: &str, row: usize) -> Result<Value, EvalError> {
    let expr = parse(input).unwrap();
    let evaluator = Evaluator::new(table);
    let row = table.row(row).unwrap();
    evaluator.evaluate(&expr, row)
}

// ========================================
// TABLE TESTS
// ========================================

#[test]
fn table_resolves_columns_case_insensitively() {
    let table = sales_table();
    assert_eq!(table.column_index("city"), Some(0));
    assert_eq!(table.column_index("CITY"), Some(0));
    assert_eq!(table.column_index("Qty"), Some(1));
    assert_eq!(table.column_index("missing"), None);
}

#[test]
fn table_reports_shape_and_values() {
    let table = sales_table();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.column_count(), 5);
    assert_eq!(
        table.value_at(0, 0),
        Some(&Value::Text("Paris".to_string()))
    );
    assert_eq!(table.value_at(1, 2), Some(&Value::Null));
    assert_eq!(table.value_at(5, 0), None);
}

#[test]
fn column_info_defaults_description_to_name() {
    let info = ColumnInfo::new("total", ValueType::Int64);
    assert_eq!(info.description, "total");
}

#[test]
fn table_round_trips_through_serde() {
    let table = sales_table();
    let json = serde_json::to_string(&table).unwrap();
    let parsed: Table = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, table);
}

#[test]
fn value_round_trips_through_serde() {
    let values = vec![
        Value::Null,
        Value::Int8(-7),
        Value::UInt64(u64::MAX),
        Value::Double(2.5),
        Value::Text("héllo".to_string()),
        Value::Bytes(vec![0, 255]),
        Value::Bool(true),
    ];
    let json = serde_json::to_string(&values).unwrap();
    let parsed: Vec<Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, values);
}

// ========================================
// GROUP KEY TESTS
// ========================================

#[test]
fn group_key_unifies_integer_widths() {
    assert_eq!(Value::Int8(5).group_key(), Value::Int64(5).group_key());
    assert_eq!(Value::UInt16(5).group_key(), Value::Int32(5).group_key());
    assert_eq!(Value::Int8(5).group_key(), GroupKey::Int(5));
}

#[test]
fn group_key_normalizes_float_zero_and_nan() {
    assert_eq!(
        Value::Double(0.0).group_key(),
        Value::Double(-0.0).group_key()
    );
    assert_eq!(
        Value::Double(f64::NAN).group_key(),
        Value::Float(f32::NAN).group_key()
    );
}

#[test]
fn group_key_keeps_floats_apart_from_integers() {
    assert_ne!(Value::Double(1.0).group_key(), Value::Int64(1).group_key());
}

// ========================================
// EVALUATOR TESTS - ARITHMETIC
// ========================================

#[test]
fn evaluator_computes_integer_arithmetic() {
    let table = sales_table();
    assert_eq!(eval(&table, "qty * 2 + 1", 0), Ok(Value::Int64(7)));
    assert_eq!(eval(&table, "10 / 3", 0), Ok(Value::Int64(3)));
}

#[test]
fn evaluator_promotes_mixed_arithmetic_to_double() {
    let table = sales_table();
    assert_eq!(eval(&table, "qty * price", 0), Ok(Value::Double(28.5)));
    assert_eq!(eval(&table, "1 + 0.5", 0), Ok(Value::Double(1.5)));
}

#[test]
fn evaluator_detects_integer_overflow() {
    let table = sales_table();
    let result = eval(&table, "9223372036854775807 + 1", 0);
    assert_eq!(result, Err(EvalError::NumericOverflow));
}

#[test]
fn evaluator_rejects_division_by_zero() {
    let table = sales_table();
    assert_eq!(eval(&table, "qty / 0", 0), Err(EvalError::DivisionByZero));
    assert_eq!(eval(&table, "price / 0.0", 0), Err(EvalError::DivisionByZero));
}

#[test]
fn evaluator_negates_values() {
    let table = sales_table();
    assert_eq!(eval(&table, "-qty", 0), Ok(Value::Int64(-3)));
    assert_eq!(eval(&table, "-price", 0), Ok(Value::Double(-9.5)));
}

// ========================================
// EVALUATOR TESTS - NULL HANDLING
// ========================================

#[test]
fn evaluator_propagates_null_through_operators() {
    let table = sales_table();
    assert_eq!(eval(&table, "price + 1", 1), Ok(Value::Null));
    assert_eq!(eval(&table, "price = 9.5", 1), Ok(Value::Null));
    assert_eq!(eval(&table, "-price", 1), Ok(Value::Null));
    assert_eq!(eval(&table, "price || 'x'", 1), Ok(Value::Null));
}

#[test]
fn evaluator_shortcuts_logic_around_null() {
    let table = sales_table();
    // FALSE AND NULL is FALSE, TRUE OR NULL is TRUE
    assert_eq!(eval(&table, "FALSE AND NULL", 0), Ok(Value::Bool(false)));
    assert_eq!(eval(&table, "TRUE OR NULL", 0), Ok(Value::Bool(true)));
    // TRUE AND NULL stays unknown
    assert_eq!(eval(&table, "TRUE AND NULL", 0), Ok(Value::Null));
    assert_eq!(eval(&table, "NOT NULL", 0), Ok(Value::Null));
}

// ========================================
// EVALUATOR TESTS - COMPARISON AND TEXT
// ========================================

#[test]
fn evaluator_compares_across_numeric_widths() {
    let table = sales_table();
    assert_eq!(eval(&table, "qty = 3", 0), Ok(Value::Bool(true)));
    assert_eq!(eval(&table, "qty < price", 0), Ok(Value::Bool(true)));
    assert_eq!(eval(&table, "qty >= 7", 1), Ok(Value::Bool(true)));
}

#[test]
fn evaluator_compares_text() {
    let table = sales_table();
    assert_eq!(eval(&table, "city = 'Paris'", 0), Ok(Value::Bool(true)));
    assert_eq!(eval(&table, "city <> 'Paris'", 1), Ok(Value::Bool(true)));
}

#[test]
fn evaluator_concatenates_and_stringifies() {
    let table = sales_table();
    assert_eq!(
        eval(&table, "city || '-' || qty", 0),
        Ok(Value::Text("Paris-3".to_string()))
    );
}

#[test]
fn evaluator_rejects_ordering_text_against_number() {
    let table = sales_table();
    assert!(matches!(
        eval(&table, "city < 3", 0),
        Err(EvalError::TypeMismatch { .. })
    ));
}

// ========================================
// EVALUATOR TESTS - COLUMNS AND CASE
// ========================================

#[test]
fn evaluator_resolves_quoted_columns() {
    let table = sales_table();
    assert_eq!(eval(&table, "\"Unit Price\" * qty", 0), Ok(Value::Double(6.0)));
}

#[test]
fn evaluator_check_reports_unknown_columns() {
    let table = sales_table();
    let evaluator = Evaluator::new(&table);
    let expr = parse("qty + missing").unwrap();
    assert_eq!(
        evaluator.check(&expr),
        Err(EvalError::UnknownColumn("missing".to_string()))
    );
    let good = parse("qty * price").unwrap();
    assert_eq!(evaluator.check(&good), Ok(()));
}

#[test]
fn evaluator_handles_searched_case() {
    let table = sales_table();
    let expr = "CASE WHEN qty > 5 THEN 'bulk' ELSE 'single' END";
    assert_eq!(eval(&table, expr, 0), Ok(Value::Text("single".to_string())));
    assert_eq!(eval(&table, expr, 1), Ok(Value::Text("bulk".to_string())));
}

#[test]
fn evaluator_handles_simple_case() {
    let table = sales_table();
    let expr = "CASE city WHEN 'Paris' THEN 1 WHEN 'Lyon' THEN 2 END";
    assert_eq!(eval(&table, expr, 0), Ok(Value::Int64(1)));
    assert_eq!(eval(&table, expr, 1), Ok(Value::Int64(2)));
}

#[test]
fn evaluator_simple_case_never_matches_null() {
    let table = sales_table();
    // price is NULL on row 1; CASE price WHEN NULL never fires
    let expr = "CASE price WHEN NULL THEN 'yes' ELSE 'no' END";
    assert_eq!(eval(&table, expr, 1), Ok(Value::Text("no".to_string())));
}

#[test]
fn evaluator_case_without_match_or_else_is_null() {
    let table = sales_table();
    let expr = "CASE city WHEN 'Nice' THEN 1 END";
    assert_eq!(eval(&table, expr, 0), Ok(Value::Null));
}
