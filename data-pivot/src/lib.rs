//! FILENAME: data-pivot/src/lib.rs
//! PURPOSE: Main library entry point for the cross-tabulation engine.
//! CONTEXT: Re-exports the DataPivot engine, the field definition types,
//! and the error surface for use by applications.
//!
//! PIPELINE: bind(Table) --> add_*_field(...) --> populate() --> output()

pub mod accumulator;
pub mod definition;
pub mod engine;
pub mod error;


// Re-export commonly used types at the crate root
pub use accumulator::CellAccumulator;
pub use definition::{Aggregate, FieldRole, FieldSpec};
pub use engine::DataPivot;
pub use error::{CellError, PivotError, PivotResult};
