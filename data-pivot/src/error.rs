//! FILENAME: data-pivot/src/error.rs
//! PURPOSE: Error types for pivot configuration, population, and cells.
//! CONTEXT: PivotError is the public error surface of the engine.
//! CellError is the per-cell failure kind recorded by accumulators; in
//! lenient mode it only nulls the affected cell, in strict mode populate
//! converts it into a PivotError.

use thiserror::Error;

/// Errors returned by the pivot engine's public operations.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum PivotError {
    /// A failure that should not happen with a well-formed source, such
    /// as an expression erroring mid-populate after validating at
    /// registration time.
    #[error("internal error: {0}")]
    Internal(String),

    /// The source table is missing or unusable.
    #[error("{0}")]
    SourceModel(String),

    /// A field specification failed to parse or validate.
    #[error("wrong field format: {0}")]
    FieldFormat(String),

    /// The engine was used out of order, e.g. reading results before
    /// populate.
    #[error("{0}")]
    Usage(String),

    /// An aggregate overflowed in strict mode.
    #[error("data summation overflow")]
    Overflow,
}

pub type PivotResult<T> = Result<T, PivotError>;

/// Failure recorded against one output cell during accumulation.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CellError {
    /// A contribution's type family did not match earlier contributions.
    #[error("inconsistent data type")]
    InconsistentType,

    /// The contribution's type cannot feed the requested aggregate.
    #[error("data type does not support requested computation")]
    UnsupportedType,

    /// The running aggregate left the representable range.
    #[error("data summation overflow")]
    Overflow,
}
