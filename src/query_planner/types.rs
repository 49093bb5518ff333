//! Scalar types and values shared by literals, the variable catalog and the
//! coercion performed during default substitution.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Boolean,
    Int8,
    Int32,
    Int64,
    #[serde(rename = "uint64")]
    UInt64,
    Float64,
    Text,
    LongText,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Boolean => f.write_str("BOOLEAN"),
            ScalarType::Int8 => f.write_str("TINYINT"),
            ScalarType::Int32 => f.write_str("INT"),
            ScalarType::Int64 => f.write_str("BIGINT"),
            ScalarType::UInt64 => f.write_str("BIGINT UNSIGNED"),
            ScalarType::Float64 => f.write_str("DOUBLE"),
            ScalarType::Text => f.write_str("TEXT"),
            ScalarType::LongText => f.write_str("LONGTEXT"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Int8(i8),
    Int32(i32),
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl Value {
    /// Human readable name of the value's natural representation, used in
    /// coercion error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int8(_) => "int8",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::UInt64(_) => "uint64",
            Value::Float64(_) => "float64",
            Value::Text(_) => "text",
        }
    }

    fn as_integer(&self) -> Option<i128> {
        match self {
            Value::Int8(v) => Some(i128::from(*v)),
            Value::Int32(v) => Some(i128::from(*v)),
            Value::Int64(v) => Some(i128::from(*v)),
            Value::UInt64(v) => Some(i128::from(*v)),
            Value::Boolean(b) => Some(i128::from(*b)),
            Value::Float64(f) if f.is_finite() && f.fract() == 0.0 => {
                if *f >= i128::MIN as f64 && *f <= i128::MAX as f64 {
                    Some(*f as i128)
                } else {
                    None
                }
            }
            Value::Text(s) => s.trim().parse::<i128>().ok(),
            Value::Null | Value::Float64(_) => None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    #[error("value {value} is out of range for type {target}")]
    OutOfRange { value: String, target: ScalarType },

    #[error("cannot convert {kind} value {value} to type {target}")]
    Mismatch {
        kind: &'static str,
        value: String,
        target: ScalarType,
    },
}

impl ScalarType {
    /// Convert `value` into this type's representation.
    ///
    /// The result always uses the variant that matches `self`, regardless of
    /// how wide the input was, so a default stored as `Int64(2147483647)` for
    /// an `Int32` variable comes back as `Int32(2147483647)`.
    pub fn coerce(&self, value: &Value) -> Result<Value, TypeError> {
        if matches!(value, Value::Null) {
            return Ok(Value::Null);
        }

        match self {
            ScalarType::Int8 | ScalarType::Int32 | ScalarType::Int64 | ScalarType::UInt64 => {
                let wide = value.as_integer().ok_or_else(|| self.mismatch(value))?;
                self.narrow_integer(wide, value)
            }
            ScalarType::Boolean => match value {
                Value::Boolean(b) => Ok(Value::Boolean(*b)),
                Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "on" | "true" | "1" => Ok(Value::Boolean(true)),
                    "off" | "false" | "0" => Ok(Value::Boolean(false)),
                    _ => Err(self.mismatch(value)),
                },
                Value::Float64(_) => Err(self.mismatch(value)),
                _ => match value.as_integer() {
                    Some(0) => Ok(Value::Boolean(false)),
                    Some(1) => Ok(Value::Boolean(true)),
                    Some(_) => Err(TypeError::OutOfRange {
                        value: value.to_string(),
                        target: *self,
                    }),
                    None => Err(self.mismatch(value)),
                },
            },
            ScalarType::Float64 => match value {
                Value::Float64(f) => Ok(Value::Float64(*f)),
                Value::Text(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float64)
                    .map_err(|_| self.mismatch(value)),
                Value::Boolean(_) => Err(self.mismatch(value)),
                _ => value
                    .as_integer()
                    .map(|i| Value::Float64(i as f64))
                    .ok_or_else(|| self.mismatch(value)),
            },
            ScalarType::Text | ScalarType::LongText => match value {
                Value::Text(s) => Ok(Value::Text(s.clone())),
                _ => Err(self.mismatch(value)),
            },
        }
    }

    fn narrow_integer(&self, wide: i128, original: &Value) -> Result<Value, TypeError> {
        let out_of_range = || TypeError::OutOfRange {
            value: original.to_string(),
            target: *self,
        };
        match self {
            ScalarType::Int8 => i8::try_from(wide).map(Value::Int8).map_err(|_| out_of_range()),
            ScalarType::Int32 => i32::try_from(wide)
                .map(Value::Int32)
                .map_err(|_| out_of_range()),
            ScalarType::Int64 => i64::try_from(wide)
                .map(Value::Int64)
                .map_err(|_| out_of_range()),
            ScalarType::UInt64 => u64::try_from(wide)
                .map(Value::UInt64)
                .map_err(|_| out_of_range()),
            _ => Err(self.mismatch(original)),
        }
    }

    fn mismatch(&self, value: &Value) -> TypeError {
        TypeError::Mismatch {
            kind: value.kind(),
            value: value.to_string(),
            target: *self,
        }
    }
}
