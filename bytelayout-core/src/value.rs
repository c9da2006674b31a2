//! Dynamic decoded values

use crate::error::LayoutError;
use crate::primitive::EnumValue;
use crate::Result;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Value decoded from, or assigned to, a typed region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Single bit or flag
    Bool(bool),
    /// Any integer primitive
    Int(i128),
    /// Any float primitive
    Float(f64),
    /// Single-byte character
    Char(char),
    /// Raw bytes (blobs, whole-region data)
    Bytes(Vec<u8>),
    /// One boolean per bit, bit 0 first
    Bits(Vec<bool>),
    /// Enum-backed integer
    Enum(EnumValue),
    /// Fixed-length string
    Str(String),
    /// Array items in order
    List(Vec<Value>),
    /// Structure or union members in declaration order
    Record(Vec<(String, Value)>),
}

impl Value {
    /// Short name of the variant for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Bytes(_) => "bytes",
            Value::Bits(_) => "bits",
            Value::Enum(_) => "enum",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Integer content, if any
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Enum(e) => Some(e.value()),
            _ => None,
        }
    }

    /// Boolean content, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Float content, if any
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Character content, if any
    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Byte content, if any
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Bit content, if any
    pub fn as_bits(&self) -> Option<&[bool]> {
        match self {
            Value::Bits(b) => Some(b),
            _ => None,
        }
    }

    /// String content, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Enum content, if any
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// List items, if any
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Record member by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(members) => members.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Coerce to an integer for assignment to `target`
    ///
    /// Booleans count as 0/1, enum values as their raw integer and finite
    /// floats are truncated toward zero.
    pub(crate) fn to_integer(&self, target: &str) -> Result<i128> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(*b as i128),
            Value::Enum(e) => Ok(e.value()),
            Value::Float(f) if f.is_finite() => Ok(*f as i128),
            other => Err(LayoutError::TypeMismatch(format!(
                "{} cannot hold {}",
                target,
                other.kind_name()
            ))),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(v as i128)
                }
            }

            impl TryFrom<Value> for $t {
                type Error = LayoutError;

                fn try_from(value: Value) -> Result<Self> {
                    let raw = value.to_integer(stringify!($t))?;
                    <$t>::try_from(raw).map_err(|_| {
                        if raw < 0 {
                            LayoutError::Underflow { value: raw, min: <$t>::MIN as i128 }
                        } else {
                            LayoutError::Overflow { value: raw, max: <$t>::MAX as i128 }
                        }
                    })
                }
            }
        )*
    };
}

impl_from_int!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize);

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(v: [u8; N]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<bool>> for Value {
    fn from(v: Vec<bool>) -> Self {
        Value::Bits(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

impl TryFrom<Value> for i128 {
    type Error = LayoutError;

    fn try_from(value: Value) -> Result<Self> {
        value.to_integer("i128")
    }
}

impl TryFrom<Value> for bool {
    type Error = LayoutError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(LayoutError::TypeMismatch(format!(
                "expected bool, got {}",
                other.kind_name()
            ))),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = LayoutError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => Err(LayoutError::TypeMismatch(format!(
                "expected float, got {}",
                other.kind_name()
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = LayoutError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            Value::Char(c) => Ok(c.into()),
            other => Err(LayoutError::TypeMismatch(format!(
                "expected str, got {}",
                other.kind_name()
            ))),
        }
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = LayoutError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(LayoutError::TypeMismatch(format!(
                "expected bytes, got {}",
                other.kind_name()
            ))),
        }
    }
}
