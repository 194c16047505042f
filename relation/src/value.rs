//! FILENAME: relation/src/value.rs
//! PURPOSE: The dynamic Value type carried by table cells, plus the
//! normalized GroupKey form used when values act as grouping keys.
//! CONTEXT: Source tables, field evaluation, and aggregation all exchange
//! values through this enum. GroupKey exists because f32/f64 do not
//! implement Eq/Hash and because 1_i32 and 1_i64 must land in the same
//! group.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value. Each numeric width is its own variant so that
/// aggregation can detect overflow against the value's original type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
    Bool(bool),
}

/// Type tag for a column or a value, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Null,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    Text,
    Bytes,
    Bool,
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Int8(_) => ValueType::Int8,
            Value::Int16(_) => ValueType::Int16,
            Value::Int32(_) => ValueType::Int32,
            Value::Int64(_) => ValueType::Int64,
            Value::UInt8(_) => ValueType::UInt8,
            Value::UInt16(_) => ValueType::UInt16,
            Value::UInt32(_) => ValueType::UInt32,
            Value::UInt64(_) => ValueType::UInt64,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::Text(_) => ValueType::Text,
            Value::Bytes(_) => ValueType::Bytes,
            Value::Bool(_) => ValueType::Bool,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as an f64 when it carries any numeric payload.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int8(n) => Some(*n as f64),
            Value::Int16(n) => Some(*n as f64),
            Value::Int32(n) => Some(*n as f64),
            Value::Int64(n) => Some(*n as f64),
            Value::UInt8(n) => Some(*n as f64),
            Value::UInt16(n) => Some(*n as f64),
            Value::UInt32(n) => Some(*n as f64),
            Value::UInt64(n) => Some(*n as f64),
            Value::Float(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as an i64 when it carries an integer payload
    /// that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(n) => Some(*n as i64),
            Value::Int16(n) => Some(*n as i64),
            Value::Int32(n) => Some(*n as i64),
            Value::Int64(n) => Some(*n),
            Value::UInt8(n) => Some(*n as i64),
            Value::UInt16(n) => Some(*n as i64),
            Value::UInt32(n) => Some(*n as i64),
            Value::UInt64(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Converts the value into its canonical grouping form. Numeric values
    /// of the same magnitude map to the same key regardless of their
    /// original width.
    pub fn group_key(&self) -> GroupKey {
        match self {
            Value::Null => GroupKey::Null,
            Value::Int8(n) => GroupKey::Int(*n as i128),
            Value::Int16(n) => GroupKey::Int(*n as i128),
            Value::Int32(n) => GroupKey::Int(*n as i128),
            Value::Int64(n) => GroupKey::Int(*n as i128),
            Value::UInt8(n) => GroupKey::Int(*n as i128),
            Value::UInt16(n) => GroupKey::Int(*n as i128),
            Value::UInt32(n) => GroupKey::Int(*n as i128),
            Value::UInt64(n) => GroupKey::Int(*n as i128),
            Value::Float(n) => GroupKey::from_f64(*n as f64),
            Value::Double(n) => GroupKey::from_f64(*n),
            Value::Text(s) => GroupKey::Text(s.clone()),
            Value::Bytes(b) => GroupKey::Bytes(b.clone()),
            Value::Bool(b) => GroupKey::Bool(*b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int8(n) => write!(f, "{}", n),
            Value::Int16(n) => write!(f, "{}", n),
            Value::Int32(n) => write!(f, "{}", n),
            Value::Int64(n) => write!(f, "{}", n),
            Value::UInt8(n) => write!(f, "{}", n),
            Value::UInt16(n) => write!(f, "{}", n),
            Value::UInt32(n) => write!(f, "{}", n),
            Value::UInt64(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bytes(b) => {
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// Canonical, hashable form of a Value used for grouping. An integer that
/// happens to equal a whole float still keys differently; within floats,
/// -0.0 and 0.0 collapse and every NaN shares one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Null,
    Int(i128),
    /// Normalized bit pattern of an f64.
    Float(u64),
    Text(String),
    Bytes(Vec<u8>),
    Bool(bool),
}

impl GroupKey {
    fn from_f64(n: f64) -> GroupKey {
        let normalized = if n == 0.0 {
            0.0_f64
        } else if n.is_nan() {
            f64::NAN
        } else {
            n
        };
        GroupKey::Float(normalized.to_bits())
    }
}
