//! FILENAME: data-pivot/src/accumulator.rs
//! PURPOSE: Per-cell aggregation state for MIN, MAX, SUM, AVG and COUNT.
//! CONTEXT: Every output cell owns one CellAccumulator. Contributions are
//! pushed during populate; once a cell records an error it stays errored
//! and finalizes to Null in lenient mode. Arithmetic runs in a widened
//! type (i128, u128 or f64) and SUM checks each step against the range of
//! the contribution's original type, so an Int8 column overflows at 127
//! even though the running sum itself cannot wrap.

use crate::definition::Aggregate;
use crate::error::CellError;
use relation::Value;

/// A numeric cell type together with its widened accumulation type.
trait Numeric: Copy + PartialOrd {
    type Wide: Copy + PartialOrd + std::fmt::Debug;

    fn widen(self) -> Self::Wide;

    /// Adds two widened values. None means the widened type itself
    /// overflowed, which only happens long after the narrow check would
    /// have failed anyway.
    fn wide_add(a: Self::Wide, b: Self::Wide) -> Option<Self::Wide>;

    /// Narrows back to the original type, None when out of range.
    fn narrow(wide: Self::Wide) -> Option<Self>;

    /// Whether a widened AVG sum is still within the 64-bit range of its
    /// family (i64, u64 or finite f64).
    fn wide_in_avg_range(wide: Self::Wide) -> bool;

    fn wide_to_f64(wide: Self::Wide) -> f64;

    fn wrap(self) -> Value;
}

macro_rules! impl_numeric_int {
    ($ty:ty, $wide:ty, $range:ty, $variant:ident) => {
        impl Numeric for $ty {
            type Wide = $wide;

            fn widen(self) -> $wide {
                self as $wide
            }

            fn wide_add(a: $wide, b: $wide) -> Option<$wide> {
                a.checked_add(b)
            }

            fn narrow(wide: $wide) -> Option<$ty> {
                <$ty>::try_from(wide).ok()
            }

            fn wide_in_avg_range(wide: $wide) -> bool {
                <$range>::try_from(wide).is_ok()
            }

            fn wide_to_f64(wide: $wide) -> f64 {
                wide as f64
            }

            fn wrap(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

impl_numeric_int!(i8, i128, i64, Int8);
impl_numeric_int!(i16, i128, i64, Int16);
impl_numeric_int!(i32, i128, i64, Int32);
impl_numeric_int!(i64, i128, i64, Int64);
impl_numeric_int!(u8, u128, u64, UInt8);
impl_numeric_int!(u16, u128, u64, UInt16);
impl_numeric_int!(u32, u128, u64, UInt32);
impl_numeric_int!(u64, u128, u64, UInt64);

impl Numeric for f32 {
    type Wide = f64;

    fn widen(self) -> f64 {
        self as f64
    }

    fn wide_add(a: f64, b: f64) -> Option<f64> {
        Some(a + b)
    }

    fn narrow(wide: f64) -> Option<f32> {
        if wide.is_nan() || wide.abs() <= f32::MAX as f64 {
            Some(wide as f32)
        } else {
            None
        }
    }

    fn wide_in_avg_range(wide: f64) -> bool {
        wide.is_nan() || wide.is_finite()
    }

    fn wide_to_f64(wide: f64) -> f64 {
        wide
    }

    fn wrap(self) -> Value {
        Value::Float(self)
    }
}

impl Numeric for f64 {
    type Wide = f64;

    fn widen(self) -> f64 {
        self
    }

    fn wide_add(a: f64, b: f64) -> Option<f64> {
        Some(a + b)
    }

    fn narrow(wide: f64) -> Option<f64> {
        if wide.is_nan() || wide.is_finite() {
            Some(wide)
        } else {
            None
        }
    }

    fn wide_in_avg_range(wide: f64) -> bool {
        wide.is_nan() || wide.is_finite()
    }

    fn wide_to_f64(wide: f64) -> f64 {
        wide
    }

    fn wrap(self) -> Value {
        Value::Double(self)
    }
}

/// Running state for one scalar aggregate over one numeric type.
#[derive(Debug, Clone, Copy)]
struct Running<T: Numeric> {
    acc: T::Wide,
    count: u64,
}

impl<T: Numeric> Running<T> {
    fn seed(value: T) -> Self {
        Running {
            acc: value.widen(),
            count: 1,
        }
    }

    fn update(&mut self, aggregate: Aggregate, value: T) -> Result<(), CellError> {
        let wide = value.widen();
        match aggregate {
            Aggregate::Min => {
                if wide < self.acc {
                    self.acc = wide;
                }
            }
            Aggregate::Max => {
                if wide > self.acc {
                    self.acc = wide;
                }
            }
            Aggregate::Sum => {
                let next = T::wide_add(self.acc, wide).ok_or(CellError::Overflow)?;
                // Range check against the original type on every step
                if T::narrow(next).is_none() {
                    return Err(CellError::Overflow);
                }
                self.acc = next;
            }
            Aggregate::Avg => {
                let next = T::wide_add(self.acc, wide).ok_or(CellError::Overflow)?;
                if !T::wide_in_avg_range(next) {
                    return Err(CellError::Overflow);
                }
                self.acc = next;
            }
            Aggregate::Count => unreachable!("COUNT never reaches a scalar accumulator"),
        }
        self.count += 1;
        Ok(())
    }

    fn finalize(&self, aggregate: Aggregate) -> Value {
        match aggregate {
            Aggregate::Min | Aggregate::Max | Aggregate::Sum => match T::narrow(self.acc) {
                Some(v) => v.wrap(),
                None => Value::Null,
            },
            Aggregate::Avg => Value::Double(T::wide_to_f64(self.acc) / self.count as f64),
            Aggregate::Count => unreachable!("COUNT never reaches a scalar accumulator"),
        }
    }
}

/// Type-dispatched scalar accumulator. The variant is fixed by the first
/// contribution; later contributions of a different type error the cell.
#[derive(Debug, Clone, Copy)]
enum ScalarAccum {
    I8(Running<i8>),
    I16(Running<i16>),
    I32(Running<i32>),
    I64(Running<i64>),
    U8(Running<u8>),
    U16(Running<u16>),
    U32(Running<u32>),
    U64(Running<u64>),
    F32(Running<f32>),
    F64(Running<f64>),
}

impl ScalarAccum {
    /// Seeds from the first non-null contribution. None for non-numeric
    /// values, which scalar aggregates cannot process.
    fn seed(value: &Value) -> Option<ScalarAccum> {
        match value {
            Value::Int8(n) => Some(ScalarAccum::I8(Running::seed(*n))),
            Value::Int16(n) => Some(ScalarAccum::I16(Running::seed(*n))),
            Value::Int32(n) => Some(ScalarAccum::I32(Running::seed(*n))),
            Value::Int64(n) => Some(ScalarAccum::I64(Running::seed(*n))),
            Value::UInt8(n) => Some(ScalarAccum::U8(Running::seed(*n))),
            Value::UInt16(n) => Some(ScalarAccum::U16(Running::seed(*n))),
            Value::UInt32(n) => Some(ScalarAccum::U32(Running::seed(*n))),
            Value::UInt64(n) => Some(ScalarAccum::U64(Running::seed(*n))),
            Value::Float(n) => Some(ScalarAccum::F32(Running::seed(*n))),
            Value::Double(n) => Some(ScalarAccum::F64(Running::seed(*n))),
            _ => None,
        }
    }

    fn update(&mut self, aggregate: Aggregate, value: &Value) -> Result<(), CellError> {
        match (self, value) {
            (ScalarAccum::I8(r), Value::Int8(n)) => r.update(aggregate, *n),
            (ScalarAccum::I16(r), Value::Int16(n)) => r.update(aggregate, *n),
            (ScalarAccum::I32(r), Value::Int32(n)) => r.update(aggregate, *n),
            (ScalarAccum::I64(r), Value::Int64(n)) => r.update(aggregate, *n),
            (ScalarAccum::U8(r), Value::UInt8(n)) => r.update(aggregate, *n),
            (ScalarAccum::U16(r), Value::UInt16(n)) => r.update(aggregate, *n),
            (ScalarAccum::U32(r), Value::UInt32(n)) => r.update(aggregate, *n),
            (ScalarAccum::U64(r), Value::UInt64(n)) => r.update(aggregate, *n),
            (ScalarAccum::F32(r), Value::Float(n)) => r.update(aggregate, *n),
            (ScalarAccum::F64(r), Value::Double(n)) => r.update(aggregate, *n),
            _ => Err(CellError::InconsistentType),
        }
    }

    fn finalize(&self, aggregate: Aggregate) -> Value {
        match self {
            ScalarAccum::I8(r) => r.finalize(aggregate),
            ScalarAccum::I16(r) => r.finalize(aggregate),
            ScalarAccum::I32(r) => r.finalize(aggregate),
            ScalarAccum::I64(r) => r.finalize(aggregate),
            ScalarAccum::U8(r) => r.finalize(aggregate),
            ScalarAccum::U16(r) => r.finalize(aggregate),
            ScalarAccum::U32(r) => r.finalize(aggregate),
            ScalarAccum::U64(r) => r.finalize(aggregate),
            ScalarAccum::F32(r) => r.finalize(aggregate),
            ScalarAccum::F64(r) => r.finalize(aggregate),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Empty,
    Count(u64),
    Scalar(ScalarAccum),
    Errored(CellError),
}

/// Aggregation state for one output cell.
#[derive(Debug, Clone)]
pub struct CellAccumulator {
    aggregate: Aggregate,
    state: State,
}

impl CellAccumulator {
    pub fn new(aggregate: Aggregate) -> Self {
        CellAccumulator {
            aggregate,
            state: State::Empty,
        }
    }

    /// Feeds one contribution. Null contributions are ignored; once the
    /// cell errors, further contributions are ignored too.
    pub fn push(&mut self, value: &Value) {
        if value.is_null() {
            return;
        }

        match &mut self.state {
            State::Errored(_) => {}

            State::Empty => {
                if self.aggregate == Aggregate::Count {
                    self.state = State::Count(1);
                } else {
                    self.state = match ScalarAccum::seed(value) {
                        Some(accum) => State::Scalar(accum),
                        None => State::Errored(CellError::UnsupportedType),
                    };
                }
            }

            State::Count(n) => {
                self.state = match n.checked_add(1) {
                    Some(next) => State::Count(next),
                    None => State::Errored(CellError::Overflow),
                };
            }

            State::Scalar(accum) => {
                if let Err(e) = accum.update(self.aggregate, value) {
                    self.state = State::Errored(e);
                }
            }
        }
    }

    /// The error recorded against this cell, if any.
    pub fn error(&self) -> Option<CellError> {
        match self.state {
            State::Errored(e) => Some(e),
            _ => None,
        }
    }

    /// The final cell value. Errored cells finalize to Null.
    pub fn finalize(&self) -> Value {
        match &self.state {
            State::Empty => Self::empty_value(self.aggregate),
            State::Count(n) => Value::UInt64(*n),
            State::Scalar(accum) => accum.finalize(self.aggregate),
            State::Errored(_) => Value::Null,
        }
    }

    /// The value a cell shows when no contribution ever reached it.
    pub fn empty_value(aggregate: Aggregate) -> Value {
        match aggregate {
            Aggregate::Count => Value::UInt64(0),
            _ => Value::Null,
        }
    }
}
