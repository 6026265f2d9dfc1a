// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View nodes: the composed units of an inspector tree.

use core::fmt;

use kurbo::Rect;
use loupe_binding::{ExpressionEvaluator, Scope};
use loupe_path::{Attribute, LocationId, ObjectId, Resolver, TypeRef, Value};

use crate::builder::TreeBuilder;
use crate::collection::CollectionNode;
use crate::config::InspectorConfig;
use crate::error::DrawResult;
use crate::surface::{RenderSurface, indented, split_top};

bitflags::bitflags! {
    /// Flags inherited by every node drawn below the node that sets them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DrawFlags: u8 {
        /// Controls are drawn but edits and collection mutations are dropped.
        const READ_ONLY = 0b0000_0001;
    }
}

/// Everything a node needs besides the render surface.
#[derive(Debug)]
pub struct Cx<'a> {
    /// Resolver for reading and writing locations.
    pub resolver: &'a mut Resolver,
    /// Builder for (re)building child nodes.
    pub builder: &'a TreeBuilder,
    /// Layout and paging defaults.
    pub config: &'a InspectorConfig,
    /// Evaluator for `@` bindings.
    pub evaluator: Option<&'a dyn ExpressionEvaluator>,
    /// Inherited flags.
    pub flags: DrawFlags,
}

impl<'a> Cx<'a> {
    /// Context without an expression evaluator or flags.
    pub fn new(
        resolver: &'a mut Resolver,
        builder: &'a TreeBuilder,
        config: &'a InspectorConfig,
    ) -> Self {
        Self {
            resolver,
            builder,
            config,
            evaluator: None,
            flags: DrawFlags::empty(),
        }
    }

    /// Binding scope borrowing this context's resolver.
    pub fn scope(&mut self) -> Scope<'_> {
        Scope {
            resolver: &mut *self.resolver,
            evaluator: self.evaluator,
        }
    }

    /// Height of one control line.
    pub fn line(&self) -> f64 {
        self.config.line_height
    }

    /// Run `f` with `flags` added, restoring the previous flags afterwards.
    pub fn with_flags<R>(&mut self, flags: DrawFlags, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.flags;
        self.flags |= flags;
        let out = f(self);
        self.flags = saved;
        out
    }

    /// Whether edits to `location` must be dropped.
    pub fn is_read_only(&self, location: LocationId) -> bool {
        self.flags.contains(DrawFlags::READ_ONLY)
            || self
                .resolver
                .location(location)
                .is_some_and(loupe_path::Location::is_read_only)
    }
}

/// The location a node draws, by reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    /// Location id; never owned by the node.
    pub location: LocationId,
    /// Location path at build time.
    pub path: String,
    /// Default label.
    pub label: String,
    /// Sibling sort key.
    pub order: f32,
}

/// Input to node factories.
#[derive(Clone, Debug)]
pub struct NodeSeed {
    /// The location to draw.
    pub target: Target,
    /// Resolved type of the location's value.
    pub ty: TypeRef,
    /// Expanded attributes in declaration order.
    pub attributes: Vec<Attribute>,
}

impl NodeSeed {
    /// First attribute of `kind`.
    pub fn attribute(&self, kind: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is(kind))
    }
}

/// A node in the materialized inspector tree.
///
/// A node either claims its own space ([`ViewNode::draw`] without a rectangle) or renders
/// exactly inside the rectangle it is given. [`ViewNode::element_height`] must agree with
/// what [`ViewNode::draw_in`] lays out during the same pass.
pub trait ViewNode: fmt::Debug {
    /// Short name of the node kind.
    fn kind(&self) -> &'static str;

    /// The location this node draws.
    fn target(&self) -> &Target;

    /// Sibling sort key.
    fn order(&self) -> f32 {
        self.target().order
    }

    /// Whether the node currently renders at all.
    fn is_visible(&mut self, _cx: &mut Cx<'_>) -> bool {
        true
    }

    /// Height the node needs this pass.
    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64;

    /// Render inside `rect`.
    fn draw_in(
        &mut self,
        cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Rect,
    ) -> DrawResult;

    /// Render inside `rect`, or claim [`ViewNode::element_height`] from the surface.
    fn draw(
        &mut self,
        cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Option<Rect>,
    ) -> DrawResult {
        if !self.is_visible(cx) {
            return Ok(());
        }
        let rect = match rect {
            Some(rect) => rect,
            None => {
                let height = self.element_height(cx);
                surface.claim(height)?
            }
        };
        self.draw_in(cx, surface, rect)
    }

    /// Replace the label; `Some("")` hides it, `None` restores the default.
    fn set_label(&mut self, label: Option<String>);

    /// Child nodes, if any.
    fn children(&self) -> Vec<&dyn ViewNode> {
        Vec::new()
    }

    /// The decorated node, for wrappers.
    fn inner(&self) -> Option<&dyn ViewNode> {
        None
    }

    /// Collection view, looking through wrappers.
    fn as_collection(&self) -> Option<&CollectionNode> {
        None
    }

    /// Mutable collection view, looking through wrappers.
    fn as_collection_mut(&mut self) -> Option<&mut CollectionNode> {
        None
    }
}

fn effective<'a>(label: &'a Option<String>, target: &'a Target) -> &'a str {
    label.as_deref().unwrap_or(&target.label)
}

/// Editor for a scalar value.
#[derive(Debug)]
pub struct FieldNode {
    target: Target,
    label: Option<String>,
}

impl FieldNode {
    /// Field editor for `seed`.
    pub fn new(seed: NodeSeed) -> Self {
        Self {
            target: seed.target,
            label: None,
        }
    }
}

impl ViewNode for FieldNode {
    fn kind(&self) -> &'static str {
        "field"
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        cx.line()
    }

    fn draw_in(
        &mut self,
        cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Rect,
    ) -> DrawResult {
        let label = effective(&self.label, &self.target);
        let location = self.target.location;
        let value = match cx.resolver.get_value(location) {
            Ok(value) => value,
            Err(err) => return surface.error_line(Some(rect), &format!("{label}: {err}")),
        };
        let read_only = cx.is_read_only(location);
        if let Some(edited) = surface.field(rect, label, &value, read_only)? {
            if read_only {
                tracing::debug!(path = %self.target.path, "edit dropped on read-only field");
            } else if let Err(err) = cx.resolver.set_value(location, edited) {
                tracing::warn!(path = %self.target.path, %err, "edit rejected");
            }
        }
        Ok(())
    }

    fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }
}

/// Selection list over the variants of an enum.
#[derive(Debug)]
pub struct EnumNode {
    target: Target,
    label: Option<String>,
    variants: Vec<String>,
}

impl EnumNode {
    /// Enum selector offering `variants`.
    pub fn new(seed: NodeSeed, variants: Vec<String>) -> Self {
        Self {
            target: seed.target,
            label: None,
            variants,
        }
    }
}

impl ViewNode for EnumNode {
    fn kind(&self) -> &'static str {
        "enum"
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        cx.line()
    }

    fn draw_in(
        &mut self,
        cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Rect,
    ) -> DrawResult {
        let label = effective(&self.label, &self.target);
        let location = self.target.location;
        let value = match cx.resolver.get_value(location) {
            Ok(value) => value,
            Err(err) => return surface.error_line(Some(rect), &format!("{label}: {err}")),
        };
        let current = match &value {
            Value::Enum(v) => self.variants.iter().position(|o| o == v),
            _ => None,
        };
        if cx.is_read_only(location) {
            surface.field(rect, label, &value, true)?;
            return Ok(());
        }
        if let Some(pick) = surface.select(rect, label, &self.variants, current)? {
            if let Some(variant) = self.variants.get(pick) {
                if let Err(err) = cx.resolver.set_value(location, Value::Enum(variant.clone())) {
                    tracing::warn!(path = %self.target.path, %err, "selection rejected");
                }
            }
        }
        Ok(())
    }

    fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }
}

/// Read-only fallback showing the value as text.
#[derive(Debug)]
pub struct LabelNode {
    target: Target,
    label: Option<String>,
}

impl LabelNode {
    /// Fallback label for `seed`.
    pub fn new(seed: NodeSeed) -> Self {
        Self {
            target: seed.target,
            label: None,
        }
    }
}

impl ViewNode for LabelNode {
    fn kind(&self) -> &'static str {
        "label"
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        cx.line()
    }

    fn draw_in(
        &mut self,
        cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Rect,
    ) -> DrawResult {
        let label = effective(&self.label, &self.target);
        let text = match cx.resolver.get_value(self.target.location) {
            Ok(value) if label.is_empty() => value.to_string(),
            Ok(value) => format!("{label}: {value}"),
            Err(err) => format!("{label}: {err}"),
        };
        surface.label(rect, &text)
    }

    fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }
}

/// Inline error in place of a member that could not be built.
#[derive(Debug)]
pub struct ErrorNode {
    target: Target,
    message: String,
}

impl ErrorNode {
    /// Error node showing `message`.
    pub fn new(target: Target, message: impl Into<String>) -> Self {
        Self {
            target,
            message: message.into(),
        }
    }

    /// The message shown.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ViewNode for ErrorNode {
    fn kind(&self) -> &'static str {
        "error"
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        cx.line()
    }

    fn draw_in(
        &mut self,
        _cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Rect,
    ) -> DrawResult {
        surface.error_line(Some(rect), &self.message)
    }

    fn set_label(&mut self, _label: Option<String>) {}
}

/// A struct value drawn as its members.
///
/// With more than one visible member a foldout header is shown and the members are indented
/// below it; a folded composite is one line high. With one visible member the member is drawn
/// in place of the composite, and with none a single label line remains.
#[derive(Debug)]
pub struct CompositeNode {
    target: Target,
    label: Option<String>,
    ty: TypeRef,
    identity: Option<ObjectId>,
    children: Vec<Box<dyn ViewNode>>,
    expanded: bool,
}

impl CompositeNode {
    /// Composite over already built member nodes.
    pub fn new(
        seed: NodeSeed,
        identity: Option<ObjectId>,
        children: Vec<Box<dyn ViewNode>>,
    ) -> Self {
        let mut this = Self {
            target: seed.target,
            label: None,
            ty: seed.ty,
            identity,
            children,
            expanded: true,
        };
        this.sort();
        this
    }

    fn sort(&mut self) {
        self.children.sort_by(|a, b| a.order().total_cmp(&b.order()));
    }

    /// Whether the members are shown below the header.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Fold or unfold.
    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    /// Rebuild the members when the value was replaced by a different instance or type.
    fn refresh(&mut self, cx: &mut Cx<'_>) {
        let location = self.target.location;
        if cx.resolver.ensure_valid(location).is_err() {
            return;
        }
        let Some(loc) = cx.resolver.location(location) else {
            return;
        };
        if loc.identity() == self.identity && *loc.resolved_type() == self.ty {
            return;
        }
        self.identity = loc.identity();
        self.ty = loc.resolved_type().clone();
        tracing::debug!(path = %self.target.path, "instance changed, rebuilding members");
        let builder = cx.builder;
        self.children = builder.build_members(cx.resolver, location);
        self.sort();
    }

    fn visible(&mut self, cx: &mut Cx<'_>) -> Vec<usize> {
        (0..self.children.len())
            .filter(|&i| self.children[i].is_visible(cx))
            .collect()
    }
}

impl ViewNode for CompositeNode {
    fn kind(&self) -> &'static str {
        "composite"
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        self.refresh(cx);
        let visible = self.visible(cx);
        let body = || visible.iter().copied();
        match visible.len() {
            0 => cx.line(),
            1 => body().map(|i| self.children[i].element_height(cx)).sum(),
            _ if !self.expanded => cx.line(),
            _ => {
                let mut height = cx.line();
                for i in body() {
                    height += self.children[i].element_height(cx);
                }
                height
            }
        }
    }

    fn draw_in(
        &mut self,
        cx: &mut Cx<'_>,
        surface: &mut dyn RenderSurface,
        rect: Rect,
    ) -> DrawResult {
        self.refresh(cx);
        let visible = self.visible(cx);
        let label = effective(&self.label, &self.target).to_owned();
        let mut rest = rect;
        match visible.len() {
            0 => {
                let text = if label.is_empty() {
                    self.ty.to_string()
                } else {
                    format!("{label}: {}", self.ty)
                };
                return surface.label(rect, &text);
            }
            1 => {}
            _ => {
                let (header, body) = split_top(rect, cx.line());
                self.expanded = surface.foldout(header, &label, self.expanded)?;
                if !self.expanded {
                    return Ok(());
                }
                rest = indented(body, cx.config.indent);
            }
        }
        for i in visible {
            let child = &mut self.children[i];
            let height = child.element_height(cx);
            let (row, below) = split_top(rest, height);
            child.draw_in(cx, surface, row)?;
            rest = below;
        }
        Ok(())
    }

    fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    fn children(&self) -> Vec<&dyn ViewNode> {
        self.children.iter().map(|c| &**c).collect()
    }
}
