//! Member declarations
//!
//! A member is declared once per collection type. Its concrete type is either
//! fixed, or produced by a factory called with the byte order of the
//! enclosing collection each time the layout is (re)bound.

use crate::byte_order::ByteOrder;
use crate::error::LayoutError;
use crate::layout::FieldType;
use crate::Result;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Builds a member type for the byte order of the enclosing collection
pub type Factory = Arc<dyn Fn(ByteOrder) -> Result<FieldType> + Send + Sync>;

/// How a member obtains its type
#[derive(Clone)]
pub enum MemberType {
    /// Type known at declaration
    Fixed(FieldType),
    /// Type built per byte order
    Factory(Factory),
}

impl fmt::Debug for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberType::Fixed(ty) => f.debug_tuple("Fixed").field(ty).finish(),
            MemberType::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Named, typed field declaration
#[derive(Debug, Clone)]
pub struct Member {
    name: String,
    ty: MemberType,
    metadata: BTreeMap<String, String>,
}

impl Member {
    /// Member with a fixed type
    pub fn new(name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            ty: MemberType::Fixed(ty.into()),
            metadata: BTreeMap::new(),
        }
    }

    /// Member whose type is built from the enclosing byte order
    pub fn with_factory<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(ByteOrder) -> Result<FieldType> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            ty: MemberType::Factory(Arc::new(factory)),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry (carried to introspection)
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    pub fn member_type(&self) -> &MemberType {
        &self.ty
    }

    /// Metadata entries
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Returns true if the type comes from a factory
    pub fn is_factory(&self) -> bool {
        matches!(self.ty, MemberType::Factory(_))
    }

    /// Concrete type for a collection declared with `order`
    pub fn resolve(&self, order: ByteOrder) -> Result<FieldType> {
        match &self.ty {
            MemberType::Fixed(ty) => Ok(ty.clone()),
            MemberType::Factory(factory) => {
                #[cfg(feature = "logging")]
                trace!("Building member {} for byte order {}", self.name, order.name());

                factory(order)
            }
        }
    }
}

const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Check that `name` is a plain identifier
pub fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if !valid || RESERVED.contains(&name) {
        return Err(LayoutError::InvalidMember(format!(
            "{:?} is not a valid member name",
            name
        )));
    }
    Ok(())
}

/// Reject invalid or duplicated names within one declaration list
pub fn validate_members(members: &[Member]) -> Result<()> {
    for (i, member) in members.iter().enumerate() {
        validate_name(&member.name)?;
        if members[..i].iter().any(|m| m.name == member.name) {
            return Err(LayoutError::InvalidMember(format!(
                "duplicate member {}",
                member.name
            )));
        }
    }
    Ok(())
}

/// Merge `derived` declarations over inherited ones
///
/// Inherited members keep their positions; a derived member with the same
/// name replaces the inherited one in place; new members are appended.
pub fn merge_inherited(inherited: &[Member], derived: Vec<Member>) -> Vec<Member> {
    let mut merged: Vec<Member> = inherited.to_vec();
    for member in derived {
        match merged.iter().position(|m| m.name == member.name) {
            Some(idx) => {
                #[cfg(feature = "logging")]
                debug!("Member {} overrides inherited declaration", member.name);

                merged[idx] = member;
            }
            None => merged.push(member),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::IntKind;
    use alloc::vec;

    #[test]
    fn test_name_validation() {
        assert!(validate_name("src_ip").is_ok());
        assert!(validate_name("_reserved1").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("1st").is_err());
        assert!(validate_name("has space").is_err());
        assert!(validate_name("self").is_err());
    }

    #[test]
    fn test_duplicates_rejected() {
        let members = vec![
            Member::new("a", IntKind::U8),
            Member::new("a", IntKind::U16),
        ];
        assert!(matches!(
            validate_members(&members),
            Err(LayoutError::InvalidMember(_))
        ));
    }

    #[test]
    fn test_merge_keeps_base_order() {
        let base = vec![
            Member::new("a", IntKind::U8),
            Member::new("b", IntKind::U8),
            Member::new("c", IntKind::U8),
        ];
        let derived = vec![Member::new("d", IntKind::U8), Member::new("b", IntKind::U32)];
        let merged = merge_inherited(&base, derived);

        let names: Vec<&str> = merged.iter().map(|m| m.name()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
        let b = merged[1].resolve(ByteOrder::Native).unwrap();
        assert_eq!(b.byte_len(), 4);
    }

    #[test]
    fn test_factory_sees_order() {
        let member = Member::with_factory("x", |order| {
            Ok(FieldType::from(if order == ByteOrder::Big {
                IntKind::U32
            } else {
                IntKind::U16
            }))
        });
        assert!(member.is_factory());
        assert_eq!(member.resolve(ByteOrder::Big).unwrap().byte_len(), 4);
        assert_eq!(member.resolve(ByteOrder::Little).unwrap().byte_len(), 2);
    }
}
