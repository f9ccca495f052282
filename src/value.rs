use serde::{Serialize, Serializer};
use std::fmt;

/// Runtime value produced by the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Boolean(bool),
    String(String),
    Number(Number),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Number {
    Byte(u8),
    Integer(i32),
    Float(#[serde(serialize_with = "serialize_f32")] f32),
    Long(i64),
    Double(#[serde(serialize_with = "serialize_f64")] f64),
    Char(char),
}

/// JSON has no infinity or NaN, so non-finite floats are written as their
/// textual form (`inf`, `-inf`, `NaN`).
pub(crate) fn serialize_f32<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f32(*value)
    } else {
        serializer.collect_str(value)
    }
}

pub(crate) fn serialize_f64<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.collect_str(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumberKind {
    Byte,
    Integer,
    Float,
    Long,
    Double,
    Char,
}

impl NumberKind {
    pub const ALL: [NumberKind; 6] = [
        NumberKind::Byte,
        NumberKind::Integer,
        NumberKind::Float,
        NumberKind::Long,
        NumberKind::Double,
        NumberKind::Char,
    ];

    /// Row/column of this kind in the promotion tables.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            NumberKind::Byte => "Byte",
            NumberKind::Integer => "Integer",
            NumberKind::Float => "Float",
            NumberKind::Long => "Long",
            NumberKind::Double => "Double",
            NumberKind::Char => "Char",
        }
    }
}

impl Number {
    pub fn kind(&self) -> NumberKind {
        match self {
            Number::Byte(_) => NumberKind::Byte,
            Number::Integer(_) => NumberKind::Integer,
            Number::Float(_) => NumberKind::Float,
            Number::Long(_) => NumberKind::Long,
            Number::Double(_) => NumberKind::Double,
            Number::Char(_) => NumberKind::Char,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Number::Byte(v) => v as i32,
            Number::Integer(v) => v,
            Number::Float(v) => v as i32,
            Number::Long(v) => v as i32,
            Number::Double(v) => v as i32,
            Number::Char(v) => v as u32 as i32,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Number::Long(v) => v,
            Number::Float(v) => v as i64,
            Number::Double(v) => v as i64,
            other => other.as_i32() as i64,
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            Number::Float(v) => v,
            Number::Long(v) => v as f32,
            Number::Double(v) => v as f32,
            other => other.as_i32() as f32,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Float(v) => v as f64,
            Number::Long(v) => v as f64,
            Number::Double(v) => v,
            other => other.as_i32() as f64,
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::String(_) => "String",
            Value::Number(number) => number.kind().name(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Byte(v) => write!(f, "{}", v),
            Number::Integer(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
            Number::Long(v) => write!(f, "{}", v),
            Number::Double(v) => write!(f, "{}", v),
            Number::Char(v) => write!(f, "{}", v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
            Value::Number(number) => write!(f, "{}", number),
        }
    }
}
