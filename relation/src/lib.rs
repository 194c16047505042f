//! FILENAME: relation/src/lib.rs
//! PURPOSE: Main library entry point for the tabular data layer.
//! CONTEXT: Re-exports the Value model, the Table container, and the
//! row-level expression evaluator for use by the pivot engine.

pub mod evaluator;
pub mod table;
pub mod value;

#[cfg(test)]
mod tests;

// Re-export commonly used types at the crate root
pub use evaluator::{EvalError, EvalResult, Evaluator};
pub use table::{ColumnInfo, Table};
pub use value::{GroupKey, Value, ValueType};
