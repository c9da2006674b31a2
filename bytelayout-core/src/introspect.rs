//! Ordered member listings for inspection tools

use crate::byte_order::ByteOrder;
use crate::layout::{FieldType, Layout, LayoutKindTag, Slot};
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// One member as seen by an inspection tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// Member name; dotted for flattened listings
    pub name: String,
    /// Type name, e.g. `UInt16` or a layout name
    pub type_name: String,
    /// Collection kind for nested collections
    pub kind: Option<LayoutKindTag>,
    /// Offset from the start of the listed layout
    pub offset: usize,
    /// Length in bytes
    pub byte_len: usize,
    /// Byte order the member is encoded with
    pub byte_order: ByteOrder,
    /// Declaration metadata
    pub metadata: BTreeMap<String, String>,
}

impl MemberInfo {
    fn from_slot(slot: &Slot, name: String, base: usize) -> Self {
        Self {
            name,
            type_name: slot.field_type().type_name().into_owned(),
            kind: slot.field_type().as_layout().map(|l| l.kind_tag()),
            offset: base + slot.offset(),
            byte_len: slot.byte_len(),
            byte_order: slot.byte_order(),
            metadata: slot.metadata().clone(),
        }
    }
}

impl Layout {
    /// Direct members in slot order
    pub fn members_info(&self) -> Vec<MemberInfo> {
        self.slots()
            .iter()
            .map(|slot| MemberInfo::from_slot(slot, slot.name().into(), 0))
            .collect()
    }

    /// Every primitive leaf with its dotted path and absolute offset
    ///
    /// Strings are listed as a single leaf rather than one entry per character.
    pub fn flatten(&self) -> Vec<MemberInfo> {
        let mut out = Vec::new();
        flatten_into(self, "", 0, &mut out);
        out
    }
}

fn flatten_into(layout: &Layout, prefix: &str, base: usize, out: &mut Vec<MemberInfo>) {
    for slot in layout.slots() {
        let name = if prefix.is_empty() {
            String::from(slot.name())
        } else {
            format!("{}.{}", prefix, slot.name())
        };
        match slot.field_type() {
            FieldType::Layout(nested) if nested.kind_tag() != LayoutKindTag::String => {
                flatten_into(nested, &name, base + slot.offset(), out)
            }
            _ => out.push(MemberInfo::from_slot(slot, name, base)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutBuilder;
    use crate::member::Member;
    use crate::primitive::IntKind;

    #[test]
    fn test_members_info() {
        let layout = LayoutBuilder::structure("Rec")
            .packed(true)
            .push(Member::new("tag", IntKind::U8).with_metadata("doc", "record tag"))
            .member("size", IntKind::U32)
            .build()
            .unwrap();
        let info = layout.members_info();
        assert_eq!(info.len(), 2);
        assert_eq!(info[1].name, "size");
        assert_eq!(info[1].type_name, "UInt32");
        assert_eq!(info[1].offset, 1);
        assert_eq!(info[0].metadata.get("doc").map(String::as_str), Some("record tag"));
    }

    #[test]
    fn test_flatten_nested() {
        let octets = Layout::array(IntKind::U8, 4, ByteOrder::Network).unwrap();
        let header = LayoutBuilder::structure("Hdr")
            .byte_order(ByteOrder::Network)
            .member("ver", IntKind::U8)
            .member("src", octets)
            .member("tag", Layout::string(3, true).unwrap())
            .build()
            .unwrap();
        let names: Vec<String> = header.flatten().into_iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            ["ver", "src.0", "src.1", "src.2", "src.3", "tag"]
        );
        let flat = header.flatten();
        assert_eq!(flat[1].offset, 4);
        assert_eq!(flat[4].offset, 7);
        assert_eq!(flat[5].kind, Some(LayoutKindTag::String));
    }
}
