// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collection editing.
//!
//! Page through a list of shapes held in a structured store, add an element of a chosen
//! subtype and remove another, all through scripted surface interaction.
//!
//! Run:
//! - `cargo run -p loupe_demos --example collection_editing`

use std::sync::Arc;

use loupe_path::{
    Attribute, MemberDesc, Object, PropertyStore, Resolver, TypeDesc, TypeRef, TypeRegistry, Value,
};
use loupe_view::testing::{Op, RecordingSurface};
use loupe_view::{ELEMENT_TYPE_LABEL, Inspector, attributes};

fn shape_count(inspector: &mut Inspector) -> usize {
    let resolver = inspector.resolver_mut();
    let shapes = resolver.resolve("shapes").unwrap();
    resolver.len(shapes).unwrap()
}

fn pass(inspector: &mut Inspector, surface: &mut RecordingSurface) {
    inspector.new_frame();
    surface.reset();
    inspector.draw_root(surface).unwrap();
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let types = Arc::new(
        TypeRegistry::builder()
            .with_type(TypeDesc::structure("Shape").abstract_type())
            .with_type(
                TypeDesc::structure("Circle")
                    .extends("Shape")
                    .member(MemberDesc::field("radius", TypeRef::float()).with_default(1.0)),
            )
            .with_type(
                TypeDesc::structure("Square")
                    .extends("Shape")
                    .member(MemberDesc::field("side", TypeRef::float()).with_default(2.0)),
            )
            .with_type(
                TypeDesc::structure("Scene").member(
                    MemberDesc::field("shapes", TypeRef::list(TypeRef::named("Shape")))
                        .with_attribute(Attribute::new(attributes::PAGED).with_arg(3)),
                ),
            )
            .build(),
    );

    let shapes: Vec<Value> = (1..=7)
        .map(|r| {
            Object::new(TypeRef::named("Circle"))
                .with("radius", f64::from(r))
                .into()
        })
        .collect();
    let scene = Object::new(TypeRef::named("Scene")).with("shapes", shapes);
    let mut inspector = Inspector::standard(Resolver::new(types, PropertyStore::new(scene)));
    let mut surface = RecordingSurface::new(360.0);

    pass(&mut inspector, &mut surface);
    println!("page 1 buttons: {:?}", surface.buttons());
    println!("page 1 labels:  {:?}", surface.labels());

    surface.press("Next");
    pass(&mut inspector, &mut surface);
    pass(&mut inspector, &mut surface);
    println!("page 2 labels:  {:?}", surface.labels());

    // Shape is abstract with two concrete subtypes, so Add asks which one.
    surface.press("Add");
    pass(&mut inspector, &mut surface);
    for op in surface.ops() {
        if let Op::Select { label, options, .. } = op {
            println!("{label}: {options:?}");
        }
    }
    surface.pick(ELEMENT_TYPE_LABEL, 1);
    pass(&mut inspector, &mut surface);
    println!("after adding a square: {} shapes", shape_count(&mut inspector));
    assert_eq!(shape_count(&mut inspector), 8);

    surface.press("Remove 3");
    pass(&mut inspector, &mut surface);
    println!("after removing element 3: {} shapes", shape_count(&mut inspector));
    assert_eq!(shape_count(&mut inspector), 7);

    let resolver = inspector.resolver_mut();
    let last = resolver.resolve("shapes[6]").unwrap();
    let ty = resolver.location(last).unwrap().resolved_type().clone();
    println!("last element is a {}", ty.name().unwrap_or("?"));
}
