//! IPv4 header example
//!
//! Run with `RUST_LOG=debug` to see layout registration.

use bytelayout_core::{
    BitFieldSpec, ByteOrder, EnumSpec, FieldType, Instance, IntKind, Layout, LayoutBuilder,
};
use tracing_subscriber::EnvFilter;

fn ipv4_addr(order: ByteOrder) -> bytelayout_core::Result<FieldType> {
    let addr = LayoutBuilder::union("IPv4Addr")
        .byte_order(order)
        .member("octets", Layout::array(IntKind::U8, 4, order)?)
        .member("uint32", IntKind::U32)
        .build()?;
    Ok(addr.into())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("IPv4 Header Example\n");

    let version_ihl = BitFieldSpec::builder(1)
        .range("ihl", 0, 4)
        .range("version", 4, 4)
        .build()?;
    let protocol = EnumSpec::builder("IpProtocol", IntKind::U8)
        .symbol("ICMP", 1)
        .symbol("TCP", 6)
        .symbol("UDP", 17)
        .build()?;

    let header = LayoutBuilder::structure("IPv4Header")
        .byte_order(ByteOrder::Network)
        .member("version_ihl", version_ihl)
        .member("tos", IntKind::U8)
        .member("total_length", IntKind::U16)
        .member("identification", IntKind::U16)
        .member("flags_fragment", IntKind::U16)
        .member("ttl", IntKind::U8)
        .member("protocol", protocol)
        .member("checksum", IntKind::U16)
        .member_with_factory("src", ipv4_addr)
        .member_with_factory("dst", ipv4_addr)
        .build()?;

    println!("{} is {} bytes:", header.name(), header.byte_len());
    for info in header.flatten() {
        println!(
            "  {:>3}  {:<22} {:<10} {:?}",
            info.offset, info.name, info.type_name, info.byte_order
        );
    }

    let mut inst = Instance::new(header);
    inst.set("version_ihl.version", 4)?;
    inst.set("version_ihl.ihl", 5)?;
    inst.set("total_length", 84)?;
    inst.set("ttl", 64)?;
    inst.set("protocol", "ICMP")?;
    inst.set("src.uint32", 0x0A00_0001u32)?;
    inst.set("dst.octets.0", 10)?;
    inst.set("dst.octets.3", 2)?;

    println!("\nEncoded: {}", hex::encode(inst.as_bytes()));

    // Overlay the same header on a captured datagram without copying
    let mut datagram = inst.to_bytes().to_vec();
    datagram.extend_from_slice(b"payload");
    let mut captured = inst.attach(&mut datagram[..20], false)?;
    captured.set("ttl", 63)?;
    println!(
        "Forwarded: ttl={} protocol={} dst={:?}",
        captured.get_as::<u8>("ttl")?,
        captured.get("protocol")?.as_enum().map(|e| e.to_string()).unwrap_or_default(),
        captured.get("dst.octets")?
    );

    Ok(())
}
