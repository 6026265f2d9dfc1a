// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Member bindings.
//!
//! Evaluate `$` bindings by hand with a [`MemberHelper`], then install a small `@` expression
//! evaluator and let a `LabelText` wrapper compute a label from the drawn value.
//!
//! Run:
//! - `cargo run -p loupe_demos --example member_bindings`

use std::sync::Arc;

use loupe_binding::{
    CompiledExpression, ExpressionContext, ExpressionEvaluator, MemberHelper, Scope,
};
use loupe_path::{
    Attribute, MemberDesc, Object, ObjectStore, Resolver, TypeDesc, TypeRef, TypeRegistry, Value,
};
use loupe_view::testing::RecordingSurface;
use loupe_view::{Inspector, attributes};

/// Understands `upper` (the drawn string, upper-cased) and `len` (its length).
#[derive(Debug)]
struct TinyEvaluator;

impl ExpressionEvaluator for TinyEvaluator {
    fn compile(&self, source: &str) -> Result<Box<dyn CompiledExpression>, String> {
        match source.trim() {
            "upper" => Ok(Box::new(|cx: &ExpressionContext<'_>| -> Result<Value, String> {
                cx.value
                    .as_str()
                    .map(|s| Value::Str(s.to_uppercase()))
                    .ok_or_else(|| format!("`{}` is not a string", cx.path))
            })),
            "len" => Ok(Box::new(|cx: &ExpressionContext<'_>| -> Result<Value, String> {
                let n = cx.value.as_str().map_or(0, str::len);
                Ok(Value::Str(format!("{n} chars")))
            })),
            other => Err(format!("unknown expression `{other}`")),
        }
    }
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let types = Arc::new(
        TypeRegistry::builder()
            .with_type(
                TypeDesc::structure("Track")
                    .member(
                        MemberDesc::field("title", TypeRef::string())
                            .with_attribute(Attribute::new(attributes::LABEL_TEXT).with_arg("@upper")),
                    )
                    .member(MemberDesc::field("muted", TypeRef::bool())),
            )
            .with_type(
                TypeDesc::structure("Mix")
                    .member(MemberDesc::field("name", TypeRef::string()))
                    .member(MemberDesc::field("tracks", TypeRef::list(TypeRef::named("Track")))),
            )
            .build(),
    );
    let track = |title: &str| {
        Value::from(
            Object::new(TypeRef::named("Track"))
                .with("title", title)
                .with("muted", false),
        )
    };
    let mix = Object::new(TypeRef::named("Mix"))
        .with("name", "night set")
        .with("tracks", vec![track("intro"), track("drop")]);
    let store = ObjectStore::new(&types, mix);
    let mut resolver = Resolver::new(types, store);

    // Bindings by hand, evaluated from `tracks[1].title`.
    let title = resolver.resolve("tracks[1].title").unwrap();
    let mut scope = Scope::new(&mut resolver);
    let mut sibling = MemberHelper::<bool>::new("$muted");
    let mut owner = MemberHelper::<String>::new("$parent.parent.name");
    let mut broken = MemberHelper::<String>::new("$volume");
    println!("$muted              = {}", sibling.get_value(&mut scope, title));
    println!("$parent.parent.name = {}", owner.get_value(&mut scope, title));
    let _ = broken.get_value(&mut scope, title);
    println!("$volume             -> {}", broken.error_message().unwrap_or_default());

    // The same graph through an inspector with an evaluator installed.
    let mut inspector = Inspector::standard(resolver).with_evaluator(Box::new(TinyEvaluator));
    let mut surface = RecordingSurface::new(320.0);
    inspector.draw_root(&mut surface).unwrap();
    println!("fields: {:?}", surface.fields());
    assert!(surface.fields().contains(&"INTRO"));
    assert!(surface.fields().contains(&"DROP"));
}
