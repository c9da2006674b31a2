//! ELF64 program header table example

use bytelayout_core::{
    mask_to_bitpos, BitFieldSpec, ByteOrder, EnumSpec, Instance, IntKind, LayoutBuilder, Value,
};

const PF_X: u64 = 0x1;
const PF_W: u64 = 0x2;
const PF_R: u64 = 0x4;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("ELF Program Header Example\n");

    let segment = EnumSpec::builder("SegmentType", IntKind::U32)
        .symbol("PT_NULL", 0)
        .symbol("PT_LOAD", 1)
        .symbol("PT_DYNAMIC", 2)
        .symbol("PT_INTERP", 3)
        .symbol("PT_NOTE", 4)
        .build()?;
    let flags = BitFieldSpec::builder(4)
        .mask("x", PF_X)
        .mask("w", PF_W)
        .mask("r", PF_R)
        .build()?;

    let phdr = LayoutBuilder::structure("Elf64Phdr")
        .byte_order(ByteOrder::Little)
        .member("p_type", segment)
        .member("p_flags", flags)
        .member("p_offset", IntKind::U64)
        .member("p_vaddr", IntKind::U64)
        .member("p_paddr", IntKind::U64)
        .member("p_filesz", IntKind::U64)
        .member("p_memsz", IntKind::U64)
        .member("p_align", IntKind::U64)
        .build()?;

    for (name, mask) in [("PF_X", PF_X), ("PF_W", PF_W), ("PF_R", PF_R)] {
        let (start, width) = mask_to_bitpos(mask)?;
        println!("{} = {:#x} -> bit {} width {}", name, mask, start, width);
    }

    // A table of three segments, written in place
    let template = Instance::new(phdr.clone());
    let mut table = vec![0u8; phdr.byte_len() * 3];
    let segments = [
        ("PT_LOAD", 0x40_0000u64, 0x1000u64, true, false, true),
        ("PT_LOAD", 0x60_0000, 0x200, true, true, false),
        ("PT_NOTE", 0x40_0238, 0x44, true, false, false),
    ];

    for (chunk, (kind, vaddr, size, r, w, x)) in
        table.chunks_exact_mut(phdr.byte_len()).zip(segments)
    {
        let mut entry = template.attach(chunk, false)?;
        entry.set("p_type", kind)?;
        entry.set("p_flags.r", r)?;
        entry.set("p_flags.w", w)?;
        entry.set("p_flags.x", x)?;
        entry.set("p_vaddr", vaddr)?;
        entry.set("p_paddr", vaddr)?;
        entry.set("p_filesz", size)?;
        entry.set("p_memsz", size)?;
        entry.set("p_align", 0x1000)?;
    }

    for (i, chunk) in table.chunks_exact(phdr.byte_len()).enumerate() {
        let entry = Instance::over(phdr.clone(), chunk)?;
        let perms: String = ["r", "w", "x"]
            .iter()
            .map(|f| match entry.get(&format!("p_flags.{}", f)) {
                Ok(Value::Bool(true)) => *f,
                _ => "-",
            })
            .collect();
        println!(
            "[{}] {:<10} {} vaddr={:#010x} size={:#x}",
            i,
            entry.get("p_type")?.as_enum().map(|e| e.to_string()).unwrap_or_default(),
            perms,
            entry.get_as::<u64>("p_vaddr")?,
            entry.get_as::<u64>("p_filesz")?
        );
    }

    println!("\nTable: {} bytes", table.len());
    Ok(())
}
