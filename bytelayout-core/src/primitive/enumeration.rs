//! Enum-backed integers

use super::int::IntKind;
use crate::byte_order::ByteOrder;
use crate::error::LayoutError;
use crate::member::validate_name;
use crate::value::Value;
use crate::Result;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Symbol shown for values missing from the symbol table
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// Decoded enum value
///
/// Wire data routinely carries reserved or future values, so an unmapped
/// integer decodes to `Unknown` instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnumValue {
    /// Value with a declared symbol
    Known {
        /// Symbol name
        symbol: String,
        /// Raw integer
        value: i128,
    },
    /// Valid integer without a symbol
    Unknown(i128),
}

impl EnumValue {
    /// Raw integer regardless of whether a symbol exists
    pub fn value(&self) -> i128 {
        match self {
            EnumValue::Known { value, .. } => *value,
            EnumValue::Unknown(raw) => *raw,
        }
    }

    /// Symbol name, if known
    pub fn symbol(&self) -> Option<&str> {
        match self {
            EnumValue::Known { symbol, .. } => Some(symbol),
            EnumValue::Unknown(_) => None,
        }
    }

    /// Returns true if the value maps to a declared symbol
    pub fn is_known(&self) -> bool {
        matches!(self, EnumValue::Known { .. })
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Known { symbol, .. } => f.write_str(symbol),
            EnumValue::Unknown(_) => f.write_str(UNKNOWN_SYMBOL),
        }
    }
}

/// Symbol table over an integer representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    name: String,
    repr: IntKind,
    symbols: Vec<(String, i128)>,
}

impl EnumSpec {
    /// Start declaring an enum stored as `repr`
    pub fn builder(name: impl Into<String>, repr: IntKind) -> EnumBuilder {
        EnumBuilder {
            name: name.into(),
            repr,
            symbols: Vec::new(),
        }
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying integer kind
    pub fn repr(&self) -> IntKind {
        self.repr
    }

    /// Declared `(symbol, value)` pairs in declaration order
    pub fn symbols(&self) -> impl Iterator<Item = (&str, i128)> {
        self.symbols.iter().map(|(s, v)| (s.as_str(), *v))
    }

    /// Map a raw integer to its first declared symbol
    pub fn lookup_value(&self, value: i128) -> EnumValue {
        match self.symbols.iter().find(|(_, v)| *v == value) {
            Some((symbol, _)) => EnumValue::Known {
                symbol: symbol.clone(),
                value,
            },
            None => EnumValue::Unknown(value),
        }
    }

    /// Raw value of a symbol
    pub fn lookup_symbol(&self, symbol: &str) -> Option<i128> {
        self.symbols
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, v)| *v)
    }

    /// Raw integer for an assignment: a symbol name, an [`EnumValue`] or an integer
    pub fn resolve(&self, value: &Value) -> Result<i128> {
        match value {
            Value::Str(symbol) => self
                .lookup_symbol(symbol)
                .ok_or_else(|| LayoutError::UnknownMember(format!("{}.{}", self.name, symbol))),
            Value::Enum(EnumValue::Known { symbol, .. }) => self
                .lookup_symbol(symbol)
                .ok_or_else(|| LayoutError::UnknownMember(format!("{}.{}", self.name, symbol))),
            Value::Enum(EnumValue::Unknown(raw)) => Ok(*raw),
            other => other.to_integer(&self.name),
        }
    }

    /// Decode the stored integer and map it to a symbol
    pub fn decode(&self, bytes: &[u8], order: ByteOrder) -> Result<EnumValue> {
        let raw = self.repr.decode(bytes, order)?;
        Ok(self.lookup_value(raw))
    }

    /// Encode a symbol, [`EnumValue`] or raw integer
    pub fn encode(&self, bytes: &mut [u8], order: ByteOrder, value: &Value) -> Result<()> {
        let raw = self.resolve(value)?;
        self.repr.encode(bytes, order, raw, false)
    }
}

/// Builder for [`EnumSpec`]
#[derive(Debug, Clone)]
pub struct EnumBuilder {
    name: String,
    repr: IntKind,
    symbols: Vec<(String, i128)>,
}

impl EnumBuilder {
    /// Declare a symbol
    pub fn symbol(mut self, name: impl Into<String>, value: i128) -> Self {
        self.symbols.push((name.into(), value));
        self
    }

    /// Validate symbol names and values against the representation
    pub fn build(self) -> Result<Arc<EnumSpec>> {
        for (i, (symbol, value)) in self.symbols.iter().enumerate() {
            validate_name(symbol)?;
            if self.symbols[..i].iter().any(|(s, _)| s == symbol) {
                return Err(LayoutError::InvalidMember(format!(
                    "duplicate symbol {} in {}",
                    symbol, self.name
                )));
            }
            self.repr.bound(*value, false)?;
        }

        Ok(Arc::new(EnumSpec {
            name: self.name,
            repr: self.repr,
            symbols: self.symbols,
        }))
    }
}
