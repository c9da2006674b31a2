//! Fuzzing entry points for bytelayout-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_decode

use bytelayout_core::{
    mask_to_bitpos, BitFieldSpec, ByteOrder, EnumSpec, Instance, IntKind, Layout, LayoutBuilder,
};
use std::sync::Arc;

fn target_layout() -> Option<Arc<Layout>> {
    let flags = BitFieldSpec::builder(1)
        .flag("a", 0)
        .range("b", 1, 3)
        .mask("c", 0xF0)
        .build()
        .ok()?;
    let kind = EnumSpec::builder("Kind", IntKind::U16)
        .symbol("ONE", 1)
        .build()
        .ok()?;
    LayoutBuilder::structure("Target")
        .byte_order(ByteOrder::Big)
        .member("flags", flags)
        .member("kind", kind)
        .member("name", Layout::string(5, true).ok()?)
        .member("values", Layout::array(IntKind::I32, 2, ByteOrder::Little).ok()?)
        .build()
        .ok()
}

/// Decode arbitrary bytes as a fixed layout
pub fn fuzz_decode(data: &[u8]) {
    let Some(layout) = target_layout() else {
        return;
    };
    // Wrong lengths must be rejected, never panic
    if let Ok(inst) = Instance::from_bytes(layout, data) {
        let _ = inst.value();
        let _ = inst.get("values.-1");
    }
}

/// Attach to arbitrary bytes and write through the attached instance
pub fn fuzz_attach(data: &[u8]) {
    let Some(layout) = target_layout() else {
        return;
    };
    let template = Instance::new(layout);
    let mut storage = data.to_vec();
    if let Ok(mut inst) = template.attach(&mut storage[..], false) {
        let _ = inst.set("name", "fuzz!");
        let _ = inst.set("flags.b", i128::from(data[0]));
        let _ = inst.set("kind", i128::from(data[1]) << 8);
        let _ = inst.value();
    }
}

/// Feed arbitrary masks to the mask converter
pub fn fuzz_bits(data: &[u8]) {
    for chunk in data.chunks(8) {
        let mut raw = [0u8; 8];
        raw[..chunk.len()].copy_from_slice(chunk);
        let _ = mask_to_bitpos(u64::from_le_bytes(raw));
    }
}
