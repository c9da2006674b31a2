//! Integration tests for declare → construct → attach → access flows

use bytelayout_core::{
    BitFieldSpec, ByteOrder, EnumSpec, EnumValue, FieldType, Instance, IntKind, Layout,
    LayoutBuilder, LayoutError, Value,
};
use std::sync::Arc;

fn mixed(packed: bool, order: ByteOrder) -> Arc<Layout> {
    LayoutBuilder::structure("Mixed")
        .byte_order(order)
        .packed(packed)
        .member("a", IntKind::U8)
        .member("b", IntKind::I16)
        .member("c", IntKind::U64)
        .build()
        .unwrap()
}

fn wide_union(order: ByteOrder) -> Arc<Layout> {
    LayoutBuilder::union("Wide")
        .byte_order(order)
        .member("uint64", IntKind::U64)
        .member("uint32", IntKind::U32)
        .member("uint16", IntKind::U16)
        .member("uint8", IntKind::U8)
        .build()
        .unwrap()
}

#[test]
fn test_packed_and_unpacked_structure_bytes() {
    let mut packed = Instance::new(mixed(true, ByteOrder::Little));
    packed.set("a", 1).unwrap();
    packed.set("b", 2).unwrap();
    packed.set("c", 3).unwrap();
    assert_eq!(packed.byte_len(), 11);
    assert_eq!(
        packed.as_bytes(),
        &[0x01, 0x02, 0x00, 0x03, 0, 0, 0, 0, 0, 0, 0]
    );

    let mut unpacked = Instance::new(mixed(false, ByteOrder::Little));
    unpacked.set("a", 1).unwrap();
    unpacked.set("b", 2).unwrap();
    unpacked.set("c", 3).unwrap();
    assert_eq!(unpacked.byte_len(), 16);
    assert_eq!(
        unpacked.as_bytes(),
        &[0x01, 0x00, 0x02, 0x00, 0, 0, 0, 0, 0x03, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn test_union_aliasing_per_byte_order() {
    let mut le = Instance::new(wide_union(ByteOrder::Little));
    assert_eq!(le.byte_len(), 8);
    le.set("uint8", 0xFF).unwrap();
    assert_eq!(le.get("uint64").unwrap(), Value::Int(0xFF));

    let mut be = Instance::new(wide_union(ByteOrder::Big));
    be.set("uint8", 0xFF).unwrap();
    assert_eq!(
        be.get("uint64").unwrap(),
        Value::Int(0xFF00_0000_0000_0000)
    );
    assert_eq!(be.get("uint16").unwrap(), Value::Int(0xFF00));
}

#[test]
fn test_attach_retain_relocates_value() {
    let mut inst = Instance::new(mixed(true, ByteOrder::Big));
    inst.set("c", 0x0102_0304_0506_0708u64).unwrap();
    let before = inst.value().unwrap();

    let mut target = vec![0xAAu8; 11];
    let attached = inst.attach(&mut target[..], true).unwrap();
    assert_eq!(attached.value().unwrap(), before);
    drop(attached);
    assert_eq!(&target[3..], &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_attach_into_larger_buffer_region() {
    let header = mixed(true, ByteOrder::Little);
    let mut file = vec![0u8; 64];
    file[20] = 9;

    let inst = Instance::new(header);
    let mut view = inst.attach(&mut file[20..31], false).unwrap();
    assert_eq!(view.get("a").unwrap(), Value::Int(9));
    view.set("b", -1).unwrap();
    drop(view);
    assert_eq!(&file[21..23], &[0xFF, 0xFF]);
    assert!(inst.attach(&mut file[20..40], false).is_err());
}

#[test]
fn test_nested_members_share_root_buffer() {
    let addr = LayoutBuilder::union("Addr")
        .byte_order(ByteOrder::Network)
        .member("octets", Layout::array(IntKind::U8, 4, ByteOrder::Network).unwrap())
        .member("value", IntKind::U32)
        .build()
        .unwrap();
    let packet = LayoutBuilder::structure("Packet")
        .byte_order(ByteOrder::Little)
        .packed(true)
        .member("len", IntKind::U16)
        .member("src", &addr)
        .member("dst", &addr)
        .build()
        .unwrap();

    let mut storage = [0u8; 10];
    {
        let mut inst = Instance::over(packet.clone(), &mut storage[..]).unwrap();
        inst.set("len", 10).unwrap();
        inst.set("src.value", 0xC0A8_0001u32).unwrap();
        inst.set("dst.octets.3", 7).unwrap();
        assert_eq!(inst.get("src.octets.0").unwrap(), Value::Int(0xC0));
        assert_eq!(inst.get("dst.value").unwrap(), Value::Int(7));
    }
    assert_eq!(storage, [10, 0, 0xC0, 0xA8, 0x00, 0x01, 0, 0, 0, 7]);

    let view = Instance::over(packet, &storage[..]).unwrap();
    let src = view.view().field("src").unwrap();
    assert_eq!(src.as_bytes(), &[0xC0, 0xA8, 0x00, 0x01]);
}

#[test]
fn test_failed_assignment_keeps_state() {
    let mut inst = Instance::new(mixed(false, ByteOrder::Little));
    inst.set("a", 5).unwrap();
    let before = inst.to_bytes();

    assert!(matches!(
        inst.set("a", 256),
        Err(LayoutError::Overflow { value: 256, max: 255 })
    ));
    assert!(matches!(
        inst.set("a", -1),
        Err(LayoutError::Underflow { value: -1, min: 0 })
    ));
    assert!(matches!(
        inst.set("b", "text"),
        Err(LayoutError::TypeMismatch(_))
    ));
    assert!(matches!(
        inst.set("missing", 1),
        Err(LayoutError::UnknownMember(_))
    ));
    assert_eq!(inst.to_bytes(), before);
}

#[test]
fn test_wrapping_integers() {
    let layout = LayoutBuilder::structure("Counter")
        .member("tick", IntKind::U8.wrapping())
        .member("delta", IntKind::I8.wrapping())
        .build()
        .unwrap();
    let mut inst = Instance::new(layout);
    inst.set("tick", 256).unwrap();
    inst.set("delta", 200).unwrap();
    assert_eq!(inst.get("tick").unwrap(), Value::Int(0));
    assert_eq!(inst.get("delta").unwrap(), Value::Int(-56));
    inst.set("tick", -1).unwrap();
    assert_eq!(inst.get("tick").unwrap(), Value::Int(255));
}

#[test]
fn test_inheritance_overrides_in_place() {
    let base = LayoutBuilder::structure("Base")
        .byte_order(ByteOrder::Big)
        .packed(true)
        .member("magic", IntKind::U32)
        .member("version", IntKind::U8)
        .member("flags", IntKind::U8)
        .build()
        .unwrap();
    let derived = LayoutBuilder::structure("Derived")
        .inherit(&base)
        .member("version", IntKind::U16)
        .member("count", IntKind::U32)
        .build()
        .unwrap();

    let names: Vec<_> = derived.slots().iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, ["magic", "version", "flags", "count"]);
    assert!(derived.is_packed());
    assert_eq!(derived.byte_len(), 11);

    let mut inst = Instance::new(derived);
    inst.set("version", 0x0102).unwrap();
    assert_eq!(&inst.as_bytes()[4..6], &[1, 2]);
}

#[test]
fn test_factory_member_follows_parent_order() {
    let ipv4 = |order: ByteOrder| -> bytelayout_core::Result<FieldType> {
        let octets = Layout::array(IntKind::U8, 4, order)?;
        let addr = LayoutBuilder::union("IPv4Addr")
            .byte_order(order)
            .member("octets", octets)
            .member("uint32", IntKind::U32)
            .build()?;
        Ok(FieldType::from(addr))
    };

    let header = LayoutBuilder::structure("Header")
        .byte_order(ByteOrder::Network)
        .member_with_factory("src", ipv4)
        .build()
        .unwrap();
    let mut inst = Instance::new(header.clone());
    inst.set("src.uint32", 0x7F00_0001u32).unwrap();
    assert_eq!(inst.as_bytes(), &[0x7F, 0, 0, 1]);

    let mut little = Instance::with_byte_order(header, ByteOrder::Little).unwrap();
    little.set("src.uint32", 0x7F00_0001u32).unwrap();
    assert_eq!(little.as_bytes(), &[1, 0, 0, 0x7F]);
}

#[test]
fn test_enum_and_bit_field_members() {
    let kind = EnumSpec::builder("Kind", IntKind::U16)
        .symbol("DATA", 1)
        .symbol("CONTROL", 2)
        .build()
        .unwrap();
    let flags = BitFieldSpec::builder(1)
        .flag("ack", 0)
        .flag("syn", 1)
        .mask("prio", 0b1110_0000)
        .build()
        .unwrap();
    let msg = LayoutBuilder::structure("Msg")
        .byte_order(ByteOrder::Big)
        .member("kind", kind)
        .member("flags", flags)
        .build()
        .unwrap();

    let mut inst = Instance::from_bytes(msg, &[0x00, 0x09, 0b0100_0001]).unwrap();
    assert_eq!(
        inst.get("kind").unwrap(),
        Value::Enum(EnumValue::Unknown(9))
    );
    assert_eq!(inst.get("flags.ack").unwrap(), Value::Bool(true));
    assert_eq!(inst.get("flags.prio").unwrap(), Value::Int(2));

    inst.set("kind", "CONTROL").unwrap();
    inst.set("flags.syn", true).unwrap();
    assert_eq!(
        inst.get("kind").unwrap().as_enum().and_then(|e| e.symbol()),
        Some("CONTROL")
    );
    assert_eq!(inst.as_bytes()[..3], [0x00, 0x02, 0b0100_0011]);
}

#[test]
fn test_whole_value_round_trip() {
    let layout = mixed(false, ByteOrder::Little);
    let mut src = Instance::new(layout.clone());
    src.set_value(Value::Record(vec![
        ("a".into(), Value::Int(7)),
        ("b".into(), Value::Int(-300)),
        ("c".into(), Value::Int(1 << 40)),
    ]))
    .unwrap();

    let copy = Instance::from_bytes(layout, &src.to_bytes()).unwrap();
    assert_eq!(copy.value().unwrap(), src.value().unwrap());
    assert_eq!(copy.get_as::<i16>("b").unwrap(), -300);
}

#[test]
fn test_string_member() {
    let layout = LayoutBuilder::structure("Named")
        .member("name", Layout::string(8, true).unwrap())
        .member("raw", Layout::string(8, false).unwrap())
        .build()
        .unwrap();
    let mut inst = Instance::new(layout);
    inst.set("name", "longvalue").unwrap();
    inst.set("raw", "longvalue").unwrap();
    assert_eq!(&inst.as_bytes()[..8], b"longval\x00");
    assert_eq!(&inst.as_bytes()[8..], b"longvalu");
    assert_eq!(inst.get("name").unwrap(), Value::from("longval"));
}

#[test]
fn test_arrays_of_collections() {
    let point = LayoutBuilder::structure("Point")
        .byte_order(ByteOrder::Big)
        .member("x", IntKind::I16)
        .member("y", IntKind::I16)
        .build()
        .unwrap();
    let path = Layout::array(&point, 3, ByteOrder::Little).unwrap();
    assert_eq!(path.byte_len(), 12);

    let mut inst = Instance::new(path);
    inst.set("2.y", -2).unwrap();
    assert_eq!(&inst.as_bytes()[10..], &[0xFF, 0xFE]);
    assert!(matches!(
        inst.set("3.x", 0),
        Err(LayoutError::IndexOutOfRange { index: 3, len: 3 })
    ));
    assert_eq!(inst.view().item(-1).unwrap().get("y").unwrap(), Value::Int(-2));
}
