// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in wrapper nodes.
//!
//! A wrapper decorates the node built for a location. It forwards layout and drawing to the
//! inner node unless it suppresses rendering or substitutes its own control. Substituted
//! controls still read and write through the inner node's location.

use kurbo::Rect;
use loupe_binding::MemberHelper;
use loupe_path::{Attribute, FromValue, Value};

use crate::collection::CollectionNode;
use crate::error::DrawResult;
use crate::node::{Cx, DrawFlags, NodeSeed, Target, ViewNode};
use crate::surface::{RenderSurface, split_top};

/// Binding for the first argument of `attr`.
///
/// String arguments are parsed as binding text; other arguments are taken literally when
/// they convert to `T`.
fn binding<T: FromValue>(attr: &Attribute) -> MemberHelper<T> {
    match attr.arg(0) {
        Some(Value::Str(text)) => MemberHelper::new(text),
        Some(value) => match T::from_value(value) {
            Some(literal) => MemberHelper::literal(literal),
            None => MemberHelper::new(&value.to_string()),
        },
        None => MemberHelper::new(""),
    }
}

macro_rules! forward_to_inner {
    () => {
        fn target(&self) -> &Target {
            self.inner.target()
        }

        fn order(&self) -> f32 {
            self.inner.order()
        }

        fn children(&self) -> Vec<&dyn ViewNode> {
            self.inner.children()
        }

        fn inner(&self) -> Option<&dyn ViewNode> {
            Some(&*self.inner)
        }

        fn as_collection(&self) -> Option<&CollectionNode> {
            self.inner.as_collection()
        }

        fn as_collection_mut(&mut self) -> Option<&mut CollectionNode> {
            self.inner.as_collection_mut()
        }
    };
}

/// Draw `inner` below an error line for a binding that failed.
fn draw_with_error<T: FromValue + core::fmt::Debug>(
    cx: &mut Cx<'_>,
    surface: &mut dyn RenderSurface,
    rect: Rect,
    helper: &MemberHelper<T>,
    inner: &mut dyn ViewNode,
) -> DrawResult {
    let (line, rest) = split_top(rect, cx.line());
    helper.draw_error(surface, Some(line))?;
    inner.draw_in(cx, surface, rest)
}

/// Shows the inner node only while a bound bool is true (or false, for `HideIf`).
///
/// A binding error keeps the inner node visible below the error line.
#[derive(Debug)]
pub struct ShowIf {
    inner: Box<dyn ViewNode>,
    condition: MemberHelper<bool>,
    negate: bool,
}

impl ShowIf {
    /// Show `inner` while `condition` holds.
    pub fn new(inner: Box<dyn ViewNode>, condition: MemberHelper<bool>) -> Self {
        Self {
            inner,
            condition,
            negate: false,
        }
    }

    /// Hide `inner` while `condition` holds.
    pub fn hide(inner: Box<dyn ViewNode>, condition: MemberHelper<bool>) -> Self {
        Self {
            inner,
            condition,
            negate: true,
        }
    }

    fn failed(&self) -> bool {
        self.condition.error().is_some()
    }
}

impl ViewNode for ShowIf {
    forward_to_inner!();

    fn kind(&self) -> &'static str {
        if self.negate { "hide-if" } else { "show-if" }
    }

    fn is_visible(&mut self, cx: &mut Cx<'_>) -> bool {
        let context = self.inner.target().location;
        let holds = self.condition.get_smart_value(&mut cx.scope(), context);
        if self.failed() {
            return true;
        }
        holds != self.negate && self.inner.is_visible(cx)
    }

    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        let inner = self.inner.element_height(cx);
        if self.failed() { cx.line() + inner } else { inner }
    }

    fn draw_in(
        &mut self,
        cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Rect,
    ) -> DrawResult {
        if self.failed() {
            return draw_with_error(cx, surface, rect, &self.condition, &mut *self.inner);
        }
        self.inner.draw_in(cx, surface, rect)
    }

    fn set_label(&mut self, label: Option<String>) {
        self.inner.set_label(label);
    }
}

/// Draws the inner node with edits and collection mutations dropped.
#[derive(Debug)]
pub struct ReadOnly {
    inner: Box<dyn ViewNode>,
}

impl ReadOnly {
    /// Make `inner` read-only.
    pub fn new(inner: Box<dyn ViewNode>) -> Self {
        Self { inner }
    }
}

impl ViewNode for ReadOnly {
    forward_to_inner!();

    fn kind(&self) -> &'static str {
        "read-only"
    }

    fn is_visible(&mut self, cx: &mut Cx<'_>) -> bool {
        self.inner.is_visible(cx)
    }

    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        let inner = &mut self.inner;
        cx.with_flags(DrawFlags::READ_ONLY, |cx| inner.element_height(cx))
    }

    fn draw_in(
        &mut self,
        cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Rect,
    ) -> DrawResult {
        let inner = &mut self.inner;
        cx.with_flags(DrawFlags::READ_ONLY, |cx| inner.draw_in(cx, surface, rect))
    }

    fn set_label(&mut self, label: Option<String>) {
        self.inner.set_label(label);
    }
}

/// Replaces the inner editor with a selection list over a bound option list.
///
/// The picked option is written through the inner node's location.
#[derive(Debug)]
pub struct Dropdown {
    inner: Box<dyn ViewNode>,
    options: MemberHelper<Vec<Value>>,
    label: Option<String>,
}

impl Dropdown {
    /// Offer `options` in place of `inner`'s editor.
    pub fn new(inner: Box<dyn ViewNode>, options: MemberHelper<Vec<Value>>) -> Self {
        Self {
            inner,
            options,
            label: None,
        }
    }
}

impl ViewNode for Dropdown {
    forward_to_inner!();

    fn kind(&self) -> &'static str {
        "dropdown"
    }

    fn is_visible(&mut self, cx: &mut Cx<'_>) -> bool {
        self.inner.is_visible(cx)
    }

    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        let context = self.inner.target().location;
        self.options.get_value(&mut cx.scope(), context);
        if self.options.error().is_some() {
            cx.line() + self.inner.element_height(cx)
        } else {
            cx.line()
        }
    }

    fn draw_in(
        &mut self,
        cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Rect,
    ) -> DrawResult {
        let target = self.inner.target().clone();
        let options = self.options.get_value(&mut cx.scope(), target.location);
        if self.options.error().is_some() {
            return draw_with_error(cx, surface, rect, &self.options, &mut *self.inner);
        }
        let label = self.label.as_deref().unwrap_or(&target.label);
        let current = match cx.resolver.get_value(target.location) {
            Ok(value) => value,
            Err(err) => return surface.error_line(Some(rect), &format!("{label}: {err}")),
        };
        if cx.is_read_only(target.location) {
            surface.field(rect, label, &current, true)?;
            return Ok(());
        }
        let names: Vec<String> = options.iter().map(ToString::to_string).collect();
        let selected = options.iter().position(|o| *o == current);
        if let Some(pick) = surface.select(rect, label, &names, selected)? {
            if let Some(value) = options.get(pick) {
                if let Err(err) = cx.resolver.set_value(target.location, value.clone()) {
                    tracing::warn!(path = %target.path, %err, "dropdown selection rejected");
                }
            }
        }
        Ok(())
    }

    fn set_label(&mut self, label: Option<String>) {
        self.label.clone_from(&label);
        self.inner.set_label(label);
    }
}

/// Replaces the inner node's label with bound text; empty text hides the label.
#[derive(Debug)]
pub struct LabelText {
    inner: Box<dyn ViewNode>,
    text: MemberHelper<String>,
}

impl LabelText {
    /// Label `inner` with `text`.
    pub fn new(inner: Box<dyn ViewNode>, text: MemberHelper<String>) -> Self {
        Self { inner, text }
    }

    fn relabel(&mut self, cx: &mut Cx<'_>) -> bool {
        let context = self.inner.target().location;
        let text = self.text.get_smart_value(&mut cx.scope(), context);
        if self.text.error().is_some() {
            self.inner.set_label(None);
            false
        } else {
            self.inner.set_label(Some(text));
            true
        }
    }
}

impl ViewNode for LabelText {
    forward_to_inner!();

    fn kind(&self) -> &'static str {
        "label-text"
    }

    fn is_visible(&mut self, cx: &mut Cx<'_>) -> bool {
        self.inner.is_visible(cx)
    }

    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        let inner = self.inner.element_height(cx);
        if self.relabel(cx) { inner } else { cx.line() + inner }
    }

    fn draw_in(
        &mut self,
        cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Rect,
    ) -> DrawResult {
        if self.relabel(cx) {
            self.inner.draw_in(cx, surface, rect)
        } else {
            draw_with_error(cx, surface, rect, &self.text, &mut *self.inner)
        }
    }

    fn set_label(&mut self, _label: Option<String>) {}
}

/// A message line above the inner node; an empty message takes no space.
#[derive(Debug)]
pub struct InfoBox {
    inner: Box<dyn ViewNode>,
    message: MemberHelper<String>,
}

impl InfoBox {
    /// Show `message` above `inner`.
    pub fn new(inner: Box<dyn ViewNode>, message: MemberHelper<String>) -> Self {
        Self { inner, message }
    }

    fn has_line(&mut self, cx: &mut Cx<'_>) -> Option<String> {
        let context = self.inner.target().location;
        let text = self.message.get_smart_value(&mut cx.scope(), context);
        (self.message.error().is_some() || !text.is_empty()).then_some(text)
    }
}

impl ViewNode for InfoBox {
    forward_to_inner!();

    fn kind(&self) -> &'static str {
        "info-box"
    }

    fn is_visible(&mut self, cx: &mut Cx<'_>) -> bool {
        self.inner.is_visible(cx)
    }

    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        let inner = self.inner.element_height(cx);
        match self.has_line(cx) {
            Some(_) => cx.line() + inner,
            None => inner,
        }
    }

    fn draw_in(
        &mut self,
        cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Rect,
    ) -> DrawResult {
        let Some(text) = self.has_line(cx) else {
            return self.inner.draw_in(cx, surface, rect);
        };
        if self.message.error().is_some() {
            return draw_with_error(cx, surface, rect, &self.message, &mut *self.inner);
        }
        let (line, rest) = split_top(rect, cx.line());
        surface.label(line, &text)?;
        self.inner.draw_in(cx, surface, rest)
    }

    fn set_label(&mut self, label: Option<String>) {
        self.inner.set_label(label);
    }
}

pub(crate) fn show_if(
    attr: &Attribute,
    _seed: &NodeSeed,
    inner: Box<dyn ViewNode>,
) -> Box<dyn ViewNode> {
    Box::new(ShowIf::new(inner, binding(attr)))
}

pub(crate) fn hide_if(
    attr: &Attribute,
    _seed: &NodeSeed,
    inner: Box<dyn ViewNode>,
) -> Box<dyn ViewNode> {
    Box::new(ShowIf::hide(inner, binding(attr)))
}

pub(crate) fn read_only(
    _attr: &Attribute,
    _seed: &NodeSeed,
    inner: Box<dyn ViewNode>,
) -> Box<dyn ViewNode> {
    Box::new(ReadOnly::new(inner))
}

pub(crate) fn dropdown(
    attr: &Attribute,
    _seed: &NodeSeed,
    inner: Box<dyn ViewNode>,
) -> Box<dyn ViewNode> {
    Box::new(Dropdown::new(inner, binding(attr)))
}

pub(crate) fn label_text(
    attr: &Attribute,
    _seed: &NodeSeed,
    inner: Box<dyn ViewNode>,
) -> Box<dyn ViewNode> {
    Box::new(LabelText::new(inner, binding(attr)))
}

pub(crate) fn info_box(
    attr: &Attribute,
    _seed: &NodeSeed,
    inner: Box<dyn ViewNode>,
) -> Box<dyn ViewNode> {
    Box::new(InfoBox::new(inner, binding(attr)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use loupe_path::{MemberDesc, Object, ObjectStore, Resolver, TypeDesc, TypeRef, TypeRegistry};

    use super::*;
    use crate::attributes::{DROPDOWN, HIDE_IF, INFO_BOX, LABEL_TEXT, READ_ONLY, SHOW_IF};
    use crate::error::Abort;
    use crate::inspector::Inspector;
    use crate::testing::{Op, RecordingSurface};

    fn int_with(name: &str, attr: Attribute) -> MemberDesc {
        MemberDesc::field(name, TypeRef::int()).with_attribute(attr)
    }

    fn inspector() -> Inspector {
        let types = Arc::new(
            TypeRegistry::builder()
                .with_type(
                    TypeDesc::structure("Panel")
                        .member(MemberDesc::field("enabled", TypeRef::bool()))
                        .member(MemberDesc::field("choices", TypeRef::list(TypeRef::string())))
                        .member(MemberDesc::field("note", TypeRef::string()))
                        .member(int_with("gated", Attribute::new(SHOW_IF).with_arg("$enabled")))
                        .member(int_with("shy", Attribute::new(HIDE_IF).with_arg("$enabled")))
                        .member(int_with("broken", Attribute::new(SHOW_IF).with_arg("$missing")))
                        .member(int_with("frozen", Attribute::new(READ_ONLY)))
                        .member(
                            MemberDesc::field("mode", TypeRef::string())
                                .with_attribute(Attribute::new(DROPDOWN).with_arg("$choices")),
                        )
                        .member(int_with("renamed", Attribute::new(LABEL_TEXT).with_arg("Speed")))
                        .member(int_with("unlabeled", Attribute::new(LABEL_TEXT).with_arg("")))
                        .member(int_with("noted", Attribute::new(INFO_BOX).with_arg("$note"))),
                )
                .build(),
        );
        let panel = Object::new(TypeRef::named("Panel"))
            .with("enabled", false)
            .with("choices", vec![Value::from("low"), Value::from("high")])
            .with("note", "Careful")
            .with("gated", 1)
            .with("shy", 2)
            .with("broken", 3)
            .with("frozen", 4)
            .with("mode", "low")
            .with("renamed", 5)
            .with("unlabeled", 6)
            .with("noted", 7);
        let store = ObjectStore::new(&types, panel);
        Inspector::standard(Resolver::new(types, store))
    }

    fn set(insp: &mut Inspector, path: &str, value: impl Into<Value>) {
        let resolver = insp.resolver_mut();
        let id = resolver.resolve(path).unwrap();
        resolver.set_value(id, value.into()).unwrap();
        insp.new_frame();
    }

    fn get(insp: &mut Inspector, path: &str) -> Value {
        let resolver = insp.resolver_mut();
        let id = resolver.resolve(path).unwrap();
        resolver.get_value(id).unwrap()
    }

    #[test]
    fn show_if_and_hide_if_follow_the_bound_flag() {
        let mut insp = inspector();
        let mut surface = RecordingSurface::new(300.0);
        insp.draw_path("gated", &mut surface).unwrap();
        insp.draw_path("shy", &mut surface).unwrap();
        assert_eq!(surface.fields(), ["shy"]);

        set(&mut insp, "enabled", true);
        surface.reset();
        insp.draw_path("gated", &mut surface).unwrap();
        insp.draw_path("shy", &mut surface).unwrap();
        assert_eq!(surface.fields(), ["gated"]);
        assert_eq!(insp.node_at("gated").unwrap().kind(), "show-if");
        assert_eq!(insp.node_at("shy").unwrap().kind(), "hide-if");
    }

    #[test]
    fn failed_condition_shows_the_error_above_the_member() {
        let mut insp = inspector();
        let line = insp.config().line_height;
        let mut surface = RecordingSurface::new(300.0);
        insp.draw_path("broken", &mut surface).unwrap();
        assert_eq!(surface.fields(), ["broken"]);
        let errors = surface.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("no member `missing`"), "{errors:?}");
        assert_eq!(surface.cursor(), 2.0 * line);
    }

    #[test]
    fn read_only_draws_but_drops_edits() {
        let mut insp = inspector();
        let mut surface = RecordingSurface::new(300.0);
        surface.edit("frozen", 40);
        insp.draw_path("frozen", &mut surface).unwrap();
        assert!(matches!(
            surface.ops().last(),
            Some(Op::Field { read_only: true, .. })
        ));
        assert_eq!(get(&mut insp, "frozen"), Value::Int(4));
    }

    #[test]
    fn dropdown_selects_from_bound_options() {
        let mut insp = inspector();
        let mut surface = RecordingSurface::new(300.0);
        surface.pick("mode", 1);
        insp.draw_path("mode", &mut surface).unwrap();
        assert!(surface.ops().iter().any(|op| matches!(
            op,
            Op::Select { label, options, current: Some(0), .. }
                if label == "mode" && options == &["low", "high"]
        )));
        assert_eq!(get(&mut insp, "mode"), Value::from("high"));
        assert!(surface.fields().is_empty());
    }

    #[test]
    fn label_text_replaces_or_hides_the_label() {
        let mut insp = inspector();
        let mut surface = RecordingSurface::new(300.0);
        insp.draw_path("renamed", &mut surface).unwrap();
        insp.draw_path("unlabeled", &mut surface).unwrap();
        assert_eq!(surface.fields(), ["Speed", ""]);
        assert_eq!(insp.node_at("renamed").unwrap().target().label, "renamed");
    }

    #[test]
    fn info_box_adds_a_line_only_for_non_empty_text() {
        let mut insp = inspector();
        let line = insp.config().line_height;
        let mut surface = RecordingSurface::new(300.0);
        insp.draw_path("noted", &mut surface).unwrap();
        assert_eq!(surface.labels(), ["Careful"]);
        assert_eq!(surface.cursor(), 2.0 * line);

        set(&mut insp, "note", "");
        surface.reset();
        insp.draw_path("noted", &mut surface).unwrap();
        assert!(surface.labels().is_empty());
        assert_eq!(surface.cursor(), line);
    }

    #[test]
    fn abort_passes_through_wrappers() {
        let mut insp = inspector();
        let mut surface = RecordingSurface::new(300.0);
        surface.abort_at(1);
        assert_eq!(insp.draw_path("renamed", &mut surface), Err(Abort));
        surface.abort_at(2);
        surface.reset();
        assert_eq!(insp.draw_path("noted", &mut surface), Err(Abort));
    }

    #[test]
    fn whole_panel_skips_hidden_members() {
        let mut insp = inspector();
        let mut surface = RecordingSurface::new(300.0);
        insp.draw_root(&mut surface).unwrap();
        let fields = surface.fields();
        assert!(!fields.contains(&"gated"));
        assert!(fields.contains(&"shy"));
        assert!(fields.contains(&"Speed"));
        let height = insp.height_at("").unwrap();
        assert_eq!(surface.cursor(), height);
    }
}
