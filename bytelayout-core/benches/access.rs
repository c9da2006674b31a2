use bytelayout_core::{BitFieldSpec, ByteOrder, Instance, IntKind, Layout, LayoutBuilder, Value};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn record() -> std::sync::Arc<Layout> {
    let flags = BitFieldSpec::builder(2)
        .flag("valid", 0)
        .range("level", 4, 3)
        .build()
        .unwrap();
    LayoutBuilder::structure("Record")
        .byte_order(ByteOrder::Big)
        .member("id", IntKind::U32)
        .member("flags", flags)
        .member("value", IntKind::I64)
        .build()
        .unwrap()
}

fn bench_member_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("member_access");
    let mut inst = Instance::new(record());
    inst.set("id", 42).unwrap();

    group.bench_function("get_int", |b| {
        b.iter(|| inst.get(black_box("value")).unwrap());
    });
    group.bench_function("get_bit_pos", |b| {
        b.iter(|| inst.get(black_box("flags.level")).unwrap());
    });
    group.bench_function("set_int", |b| {
        b.iter(|| inst.set(black_box("value"), black_box(-7)).unwrap());
    });
    group.bench_function("set_bit_pos", |b| {
        b.iter(|| inst.set(black_box("flags.level"), black_box(5)).unwrap());
    });

    group.finish();
}

fn bench_array_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_decode");

    for count in [16, 256, 4096] {
        let layout = Layout::array(&record(), count, ByteOrder::Big).unwrap();
        let inst = Instance::new(layout);

        group.throughput(Throughput::Bytes(inst.byte_len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &inst, |b, inst| {
            b.iter(|| black_box(inst.value().unwrap()));
        });
    }

    group.finish();
}

fn bench_attach(c: &mut Criterion) {
    let mut group = c.benchmark_group("attach");
    let template = Instance::new(record());
    let mut storage = vec![0u8; template.byte_len() * 1024];
    let len = template.byte_len();

    group.throughput(Throughput::Bytes(storage.len() as u64));
    group.bench_function("walk_1024_records", |b| {
        b.iter(|| {
            let mut sum = 0i128;
            for chunk in storage.chunks_exact_mut(len) {
                let mut rec = template.attach(chunk, false).unwrap();
                rec.set("id", 1).unwrap();
                if let Value::Int(v) = rec.get("id").unwrap() {
                    sum += v;
                }
            }
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_member_access, bench_array_decode, bench_attach);
criterion_main!(benches);
