// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use loupe_path::{
    MemberDesc, Object, ObjectStore, PropertyStore, Resolver, TypeDesc, TypeRef, TypeRegistry,
    Value,
};

fn types() -> Arc<TypeRegistry> {
    Arc::new(
        TypeRegistry::builder()
            .with_type(
                TypeDesc::structure("Point")
                    .member(MemberDesc::field("x", TypeRef::float()))
                    .member(MemberDesc::field("y", TypeRef::float())),
            )
            .with_type(
                TypeDesc::structure("Node")
                    .member(MemberDesc::field("name", TypeRef::string()))
                    .member(MemberDesc::field("pos", TypeRef::named("Point"))),
            )
            .with_type(
                TypeDesc::structure("Graph")
                    .member(MemberDesc::field("nodes", TypeRef::list(TypeRef::named("Node")))),
            )
            .build(),
    )
}

fn graph(n: usize) -> Object {
    let nodes: Vec<Value> = (0..n)
        .map(|i| {
            let pos = Object::new(TypeRef::named("Point"))
                .with("x", i as f64)
                .with("y", 0.0);
            Object::new(TypeRef::named("Node"))
                .with("name", format!("n{i}"))
                .with("pos", pos)
                .into()
        })
        .collect();
    Object::new(TypeRef::named("Graph")).with("nodes", nodes)
}

fn paths(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("nodes[{i}].pos.x")).collect()
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    for &n in &[64usize, 512] {
        let types = types();
        let paths = paths(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("cold_object_n{n}"), |b| {
            b.iter_batched(
                || Resolver::new(types.clone(), ObjectStore::new(&types, graph(n))),
                |mut r| {
                    for p in &paths {
                        black_box(r.resolve(p).ok());
                    }
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("warm_object_n{n}"), |b| {
            let mut r = Resolver::new(types.clone(), ObjectStore::new(&types, graph(n)));
            for p in &paths {
                let _ = r.resolve(p);
            }
            b.iter(|| {
                for p in &paths {
                    black_box(r.resolve(p).ok());
                }
            });
        });
        group.bench_function(format!("cold_structured_n{n}"), |b| {
            b.iter_batched(
                || Resolver::new(types.clone(), PropertyStore::new(graph(n))),
                |mut r| {
                    for p in &paths {
                        black_box(r.resolve(p).ok());
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_get_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_value");
    let n = 512;
    let types = types();
    let mut r = Resolver::new(types.clone(), ObjectStore::new(&types, graph(n)));
    let ids: Vec<_> = paths(n).iter().filter_map(|p| r.resolve(p).ok()).collect();
    group.throughput(Throughput::Elements(ids.len() as u64));
    group.bench_function("leaf_per_frame", |b| {
        b.iter(|| {
            r.new_frame();
            for &id in &ids {
                black_box(r.get_value(id).ok());
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_resolve, bench_get_value);
criterion_main!(benches);
