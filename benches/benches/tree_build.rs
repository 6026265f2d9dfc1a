// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use loupe_path::{
    Attribute, MemberDesc, Object, ObjectStore, Resolver, TypeDesc, TypeRef, TypeRegistry, Value,
};
use loupe_view::testing::RecordingSurface;
use loupe_view::{Inspector, attributes};

fn types(page: Option<i64>) -> Arc<TypeRegistry> {
    let mut items = MemberDesc::field("items", TypeRef::list(TypeRef::named("Item")));
    if let Some(page) = page {
        items = items.with_attribute(Attribute::new(attributes::PAGED).with_arg(page));
    }
    Arc::new(
        TypeRegistry::builder()
            .with_type(
                TypeDesc::structure("Item")
                    .member(MemberDesc::field("label", TypeRef::string()))
                    .member(MemberDesc::field("weight", TypeRef::float()))
                    .member(
                        MemberDesc::field("note", TypeRef::string())
                            .with_attribute(Attribute::new(attributes::SHOW_IF).with_arg("$enabled")),
                    )
                    .member(MemberDesc::field("enabled", TypeRef::bool())),
            )
            .with_type(TypeDesc::structure("Inventory").member(items))
            .build(),
    )
}

fn inventory(n: usize) -> Object {
    let items: Vec<Value> = (0..n)
        .map(|i| {
            Object::new(TypeRef::named("Item"))
                .with("label", format!("item {i}"))
                .with("weight", 1.0)
                .with("note", "")
                .with("enabled", i % 2 == 0)
                .into()
        })
        .collect();
    Object::new(TypeRef::named("Inventory")).with("items", items)
}

fn inspector(n: usize, page: Option<i64>) -> Inspector {
    let types = types(page);
    let store = ObjectStore::new(&types, inventory(n));
    Inspector::standard(Resolver::new(types, store))
}

fn bench_first_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_pass");
    for &n in &[32usize, 256] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("unpaged_n{n}"), |b| {
            b.iter_batched(
                || inspector(n, None),
                |mut ins| {
                    let mut surface = RecordingSurface::new(400.0);
                    black_box(ins.draw_root(&mut surface).is_ok());
                    black_box(surface.cursor());
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("paged_n{n}"), |b| {
            b.iter_batched(
                || inspector(n, Some(16)),
                |mut ins| {
                    let mut surface = RecordingSurface::new(400.0);
                    black_box(ins.draw_root(&mut surface).is_ok());
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_steady_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("steady_pass");
    let n = 256;
    group.throughput(Throughput::Elements(n as u64));
    group.bench_function(format!("cached_n{n}"), |b| {
        let mut ins = inspector(n, None);
        let mut surface = RecordingSurface::new(400.0);
        let _ = ins.draw_root(&mut surface);
        b.iter(|| {
            ins.new_frame();
            surface.reset();
            black_box(ins.draw_root(&mut surface).is_ok());
        });
    });
    group.bench_function(format!("height_n{n}"), |b| {
        let mut ins = inspector(n, None);
        b.iter(|| {
            ins.new_frame();
            black_box(ins.height_at("").ok());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_first_pass, bench_steady_pass);
criterion_main!(benches);
