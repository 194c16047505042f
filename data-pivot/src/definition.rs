//! FILENAME: data-pivot/src/definition.rs
//! PURPOSE: Serializable description of a pivot configuration.
//! CONTEXT: Field registrations are captured as FieldSpec records so a
//! pivot setup can be stored or sent over the wire and replayed against
//! a freshly bound source table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate function applied to a data field's contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregate {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Aggregate::Min => "min",
            Aggregate::Max => "max",
            Aggregate::Sum => "sum",
            Aggregate::Avg => "avg",
            Aggregate::Count => "count",
        };
        write!(f, "{}", name)
    }
}

/// Where a registered field participates in the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRole {
    /// Distinct values become output rows.
    Row,
    /// Distinct values become synthesized output columns.
    Column,
    /// Values feed an aggregate in the cells.
    Data,
}

/// One registered field: its role, the expression text it was created
/// from, the sanitized alias if one was given, and the aggregate for
/// data fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub role: FieldRole,
    pub text: String,
    pub alias: Option<String>,
    pub aggregate: Option<Aggregate>,
}
