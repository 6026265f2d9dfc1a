// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inspector basics.
//!
//! Describe a few types, draw an object graph through a recording surface, edit a field and
//! watch a `ShowIf` member appear on the next pass.
//!
//! Run:
//! - `cargo run -p loupe_demos --example inspector_basics`

use std::sync::Arc;

use loupe_path::{
    Attribute, AttributeDecl, MemberDesc, Object, ObjectStore, Resolver, TypeDesc, TypeRef,
    TypeRegistry, Value,
};
use loupe_view::testing::{Op, RecordingSurface};
use loupe_view::{Inspector, attributes};

fn print_ops(title: &str, surface: &RecordingSurface) {
    println!("-- {title}");
    for op in surface.ops() {
        match op {
            Op::Claim(_) => {}
            Op::Label { rect, text } => println!("{:>6.1}  label   {text}", rect.y0),
            Op::Field { rect, label, value, read_only } => {
                let lock = if *read_only { " (read-only)" } else { "" };
                println!("{:>6.1}  field   {label} = {value}{lock}", rect.y0);
            }
            Op::Foldout { rect, label, expanded } => {
                let mark = if *expanded { "v" } else { ">" };
                println!("{:>6.1}  {mark}       {label}", rect.y0);
            }
            Op::Button { rect, text } => println!("{:>6.1}  button  [{text}]", rect.y0),
            Op::Select { rect, label, options, current } => {
                println!("{:>6.1}  select  {label} {options:?} @ {current:?}", rect.y0);
            }
            Op::Error { message, .. } => println!("        error   {message}"),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    // `Advanced` bundles `ShowIf($expert)` and an info line; members tagged with it get both.
    let types = Arc::new(
        TypeRegistry::builder()
            .with_attribute(
                AttributeDecl::new("Advanced")
                    .self_including()
                    .implies(Attribute::new(attributes::SHOW_IF).with_arg("$root.expert"))
                    .implies(Attribute::new(attributes::INFO_BOX).with_arg("Expert setting")),
            )
            .with_type(TypeDesc::enumeration("Quality", ["Low", "Medium", "High"]))
            .with_type(
                TypeDesc::structure("Tuning")
                    .member(MemberDesc::field("gain", TypeRef::float()))
                    .member(
                        MemberDesc::field("bias", TypeRef::float())
                            .with_attribute(Attribute::new("Advanced")),
                    ),
            )
            .with_type(
                TypeDesc::structure("Settings")
                    .member(MemberDesc::field("name", TypeRef::string()))
                    .member(MemberDesc::field("quality", TypeRef::named("Quality")))
                    .member(MemberDesc::field("expert", TypeRef::bool()))
                    .member(MemberDesc::field("tuning", TypeRef::named("Tuning")))
                    .member(
                        MemberDesc::field("version", TypeRef::int())
                            .with_attribute(Attribute::new(attributes::READ_ONLY)),
                    ),
            )
            .build(),
    );

    let settings = Object::new(TypeRef::named("Settings"))
        .with("name", "default")
        .with("quality", Value::Enum("Medium".into()))
        .with("expert", false)
        .with(
            "tuning",
            Object::new(TypeRef::named("Tuning"))
                .with("gain", 1.0)
                .with("bias", 0.0),
        )
        .with("version", 3);
    let store = ObjectStore::new(&types, settings);
    let mut inspector = Inspector::standard(Resolver::new(types, store));

    let mut surface = RecordingSurface::new(320.0);
    inspector.draw_root(&mut surface).unwrap();
    print_ops("first pass", &surface);

    // The user ticks `expert` and picks a higher quality.
    inspector.new_frame();
    surface.reset();
    surface.edit("expert", true).pick("quality", 2);
    inspector.draw_root(&mut surface).unwrap();

    inspector.new_frame();
    surface.reset();
    inspector.draw_root(&mut surface).unwrap();
    print_ops("after enabling expert mode", &surface);
}
