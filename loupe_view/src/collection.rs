// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lists and arrays: paged element nodes plus add, remove and reorder.

use core::ops::Range;
use std::collections::BTreeMap;

use kurbo::Rect;
use loupe_path::{AccessError, LocationId, Resolver, StoreKind, TypeRef, Value};

use crate::error::DrawResult;
use crate::node::{Cx, ErrorNode, NodeSeed, Target, ViewNode};
use crate::surface::{RenderSurface, indented, split_right, split_top};

/// Width of the per-element remove button and of the pager buttons.
const BUTTON_WIDTH: f64 = 64.0;

/// Label of the subtype selection list.
pub const ELEMENT_TYPE_LABEL: &str = "Element type";

/// A structural edit of a collection.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// Append a default element, asking for the type when several can be constructed.
    Add,
    /// Append a default instance of the given element type.
    AddTyped(TypeRef),
    /// Remove the element at the index.
    Remove(usize),
    /// Move the element at `from` so it ends up at `to`.
    Reorder {
        /// Current index.
        from: usize,
        /// Target index.
        to: usize,
    },
}

/// Where a collection node is in its edit cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CollectionState {
    /// No edit in progress.
    #[default]
    Idle,
    /// Queued mutations are being applied.
    Mutating,
    /// Add is waiting for the user to pick one of these element types.
    ChoosingType(Vec<TypeRef>),
}

/// View node for a list or fixed-size array.
///
/// One child node per element is built lazily and cached by index; only the current page is
/// materialized. Any mutation drops the whole per-index cache. Mutations requested while
/// drawing are queued and applied once the node's draw returns.
#[derive(Debug)]
pub struct CollectionNode {
    target: Target,
    label: Option<String>,
    children: BTreeMap<usize, Box<dyn ViewNode>>,
    known_len: Option<usize>,
    page: usize,
    page_size: Option<usize>,
    pending: Vec<Mutation>,
    state: CollectionState,
    diagnostic: Option<String>,
    expanded: bool,
}

impl CollectionNode {
    /// Collection node paging `page_size` elements, or the configured default when `None`.
    pub fn new(seed: NodeSeed, page_size: Option<usize>) -> Self {
        Self {
            target: seed.target,
            label: None,
            children: BTreeMap::new(),
            known_len: None,
            page: 0,
            page_size,
            pending: Vec::new(),
            state: CollectionState::Idle,
            diagnostic: None,
            expanded: true,
        }
    }

    /// Edit-cycle state.
    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    /// Message of the last failed mutation, cleared by the next successful one.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Element count seen by the last sync.
    pub fn known_len(&self) -> Option<usize> {
        self.known_len
    }

    /// Indices that currently have a materialized child node.
    pub fn materialized_indices(&self) -> Vec<usize> {
        self.children.keys().copied().collect()
    }

    /// Current page, zero based.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Number of pages for the last seen length; at least one.
    pub fn page_count(&self, cx: &Cx<'_>) -> usize {
        let len = self.known_len.unwrap_or(0);
        len.div_ceil(self.page_size(cx)).max(1)
    }

    /// Jump to `page`; clamped to the last page on the next sync.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Advance one page.
    pub fn next_page(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    /// Go back one page.
    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Whether elements are shown below the header.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Fold or unfold.
    pub fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    /// Queue `mutation` for the next [`CollectionNode::flush`].
    pub fn request(&mut self, mutation: Mutation) {
        self.pending.push(mutation);
    }

    /// Answer a pending type choice; returns whether `ty` was one of the offered types.
    pub fn choose_type(&mut self, ty: &TypeRef) -> bool {
        let CollectionState::ChoosingType(options) = &self.state else {
            return false;
        };
        if !options.contains(ty) {
            return false;
        }
        self.pending.push(Mutation::AddTyped(ty.clone()));
        self.state = CollectionState::Idle;
        true
    }

    /// Drop a pending type choice.
    pub fn cancel_choice(&mut self) {
        if matches!(self.state, CollectionState::ChoosingType(_)) {
            self.state = CollectionState::Idle;
        }
    }

    fn page_size(&self, cx: &Cx<'_>) -> usize {
        self.page_size.unwrap_or(cx.config.max_items_per_page).max(1)
    }

    fn page_range(&self, cx: &Cx<'_>, len: usize) -> Range<usize> {
        let size = self.page_size(cx);
        let start = (self.page * size).min(len);
        start..(start + size).min(len)
    }

    /// Re-read the element count and materialize the current page.
    ///
    /// A changed count drops every cached element node. Nodes outside the current page are
    /// released so at most one page is materialized.
    pub fn sync(&mut self, cx: &mut Cx<'_>) -> usize {
        let location = self.target.location;
        let len = match cx.resolver.len(location) {
            Ok(len) => len,
            Err(err) => {
                tracing::trace!(path = %self.target.path, %err, "collection unreadable");
                0
            }
        };
        if self.known_len != Some(len) {
            if self.known_len.is_some() {
                tracing::trace!(path = %self.target.path, len, "element count changed");
            }
            self.children.clear();
            self.known_len = Some(len);
        }
        let pages = len.div_ceil(self.page_size(cx)).max(1);
        self.page = self.page.min(pages - 1);
        let range = self.page_range(cx, len);
        self.children.retain(|i, child| {
            range.contains(i) && cx.resolver.is_alive(child.target().location)
        });
        for index in range {
            if self.children.contains_key(&index) {
                continue;
            }
            let node = match cx.resolver.element(location, index) {
                Ok(id) => {
                    let builder = cx.builder;
                    builder.build(cx.resolver, id)
                }
                Err(err) => {
                    let target = Target {
                        location,
                        path: loupe_path::path::index(&self.target.path, index),
                        label: format!("Element {index}"),
                        order: 0.0,
                    };
                    Box::new(ErrorNode::new(target, err.to_string())) as Box<dyn ViewNode>
                }
            };
            self.children.insert(index, node);
        }
        len
    }

    fn has_pager(&self, cx: &Cx<'_>) -> bool {
        self.page_count(cx) > 1
    }

    /// Apply queued mutations in request order.
    ///
    /// Failures are a no-op for that mutation; the message is kept as the node's diagnostic
    /// and logged.
    pub fn flush(&mut self, cx: &mut Cx<'_>) {
        if self.pending.is_empty() {
            return;
        }
        for mutation in core::mem::take(&mut self.pending) {
            self.state = CollectionState::Mutating;
            match self.apply(cx, &mutation) {
                Ok(changed) => {
                    self.diagnostic = None;
                    if changed {
                        self.children.clear();
                        self.known_len = None;
                    }
                }
                Err(message) => {
                    tracing::warn!(path = %self.target.path, ?mutation, %message, "collection mutation failed");
                    self.diagnostic = Some(message);
                }
            }
            if self.state == CollectionState::Mutating {
                self.state = CollectionState::Idle;
            }
        }
    }

    /// Returns whether the collection changed.
    fn apply(&mut self, cx: &mut Cx<'_>, mutation: &Mutation) -> Result<bool, String> {
        let location = self.target.location;
        let path = self.target.path.clone();
        if cx.is_read_only(location) {
            return Err(AccessError::ReadOnly { path }.to_string());
        }
        cx.resolver.ensure_valid(location).map_err(|e| e.to_string())?;
        let declared = cx
            .resolver
            .location(location)
            .map(|l| l.declared_type().clone())
            .ok_or_else(|| AccessError::Stale.to_string())?;
        let element_type = declared
            .element_type()
            .cloned()
            .ok_or_else(|| format!("`{path}` is not a collection"))?;
        let fixed = declared.fixed_len();
        if let (Some(len), Mutation::Add | Mutation::AddTyped(_) | Mutation::Remove(_)) =
            (fixed, mutation)
        {
            return Err(AccessError::FixedSize { path, len }.to_string());
        }
        let len = cx.resolver.len(location).map_err(|e| e.to_string())?;
        let out_of_range = |index: usize| format!("index {index} out of range for `{path}` (length {len})");
        let edit = match *mutation {
            Mutation::Add => {
                let mut options = cx.resolver.registry().constructible_subtypes(&element_type);
                match options.len() {
                    0 => return Err(format!("no constructible element type for `{element_type}`")),
                    1 => Edit::Append(construct(cx.resolver, &options.remove(0))?),
                    n => {
                        tracing::debug!(%path, options = n, "choosing element type");
                        self.state = CollectionState::ChoosingType(options);
                        return Ok(false);
                    }
                }
            }
            Mutation::AddTyped(ref ty) => Edit::Append(construct(cx.resolver, ty)?),
            Mutation::Remove(index) if index >= len => return Err(out_of_range(index)),
            Mutation::Remove(index) => Edit::Remove(index),
            Mutation::Reorder { from, to } if from >= len || to >= len => {
                return Err(out_of_range(from.max(to)));
            }
            Mutation::Reorder { from, to } if from == to => return Ok(false),
            Mutation::Reorder { from, to } => Edit::Move(from, to),
        };
        tracing::debug!(%path, ?edit, "mutating collection");
        let result = if cx.resolver.store_kind() == StoreKind::Structured && fixed.is_none() {
            edit.apply_bracketed(cx.resolver, location, len)
        } else {
            edit.apply_in_memory(cx.resolver, location)
        };
        result.map_err(|e| e.to_string())?;
        Ok(true)
    }

    fn body_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        let mut height = 0.0;
        for child in self.children.values_mut() {
            if child.is_visible(cx) {
                height += child.element_height(cx);
            }
        }
        if self.has_pager(cx) {
            height += cx.line();
        }
        if self.diagnostic.is_some() {
            height += cx.line();
        }
        if matches!(self.state, CollectionState::ChoosingType(_)) {
            height += cx.line();
        }
        if cx.config.show_collection_footer {
            height += cx.line();
        }
        height
    }
}

/// A mutation reduced to the store edit it performs.
#[derive(Debug)]
enum Edit {
    Append(Value),
    Remove(usize),
    Move(usize, usize),
}

impl Edit {
    /// Structured stores: explicit size plus element writes inside one edit bracket.
    fn apply_bracketed(
        self,
        resolver: &mut Resolver,
        location: LocationId,
        len: usize,
    ) -> Result<(), AccessError> {
        let items = match &self {
            Self::Append(_) => Vec::new(),
            Self::Remove(_) | Self::Move(..) => list(resolver, location)?,
        };
        resolver.begin_edit();
        let result = self.write_elements(resolver, location, len, items);
        resolver.end_edit();
        result
    }

    fn write_elements(
        self,
        resolver: &mut Resolver,
        location: LocationId,
        len: usize,
        items: Vec<Value>,
    ) -> Result<(), AccessError> {
        match self {
            Self::Append(value) => {
                resolver.set_len(location, len + 1)?;
                resolver.set_element(location, len, value)
            }
            Self::Remove(index) => {
                for (i, item) in items.into_iter().enumerate().skip(index + 1) {
                    resolver.set_element(location, i - 1, item)?;
                }
                resolver.set_len(location, len - 1)
            }
            Self::Move(from, to) => {
                let mut moved = items.clone();
                let item = moved.remove(from);
                moved.insert(to, item);
                for (i, (new, old)) in moved.into_iter().zip(items).enumerate() {
                    if new != old {
                        resolver.set_element(location, i, new)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Plain lists and arrays: edit a copy, then write it back through the location.
    fn apply_in_memory(self, resolver: &mut Resolver, location: LocationId) -> Result<(), AccessError> {
        let mut items = list(resolver, location)?;
        match self {
            Self::Append(value) => items.push(value),
            Self::Remove(index) => {
                items.remove(index);
            }
            Self::Move(from, to) => {
                let item = items.remove(from);
                items.insert(to, item);
            }
        }
        resolver.set_value(location, Value::List(items))?;
        if resolver.store_kind() == StoreKind::Structured {
            resolver.apply();
        }
        Ok(())
    }
}

fn construct(resolver: &Resolver, ty: &TypeRef) -> Result<Value, String> {
    resolver
        .registry()
        .default_value(ty)
        .ok_or_else(|| format!("cannot construct `{ty}`"))
}

fn list(resolver: &mut Resolver, location: LocationId) -> Result<Vec<Value>, AccessError> {
    match resolver.get_value(location)? {
        Value::List(items) => Ok(items),
        _ => Err(AccessError::Unreachable {
            path: resolver
                .location(location)
                .map(|l| l.path().to_owned())
                .unwrap_or_default(),
        }),
    }
}

impl ViewNode for CollectionNode {
    fn kind(&self) -> &'static str {
        "collection"
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn element_height(&mut self, cx: &mut Cx<'_>) -> f64 {
        self.sync(cx);
        if self.expanded {
            cx.line() + self.body_height(cx)
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
        let len = self.sync(cx);
        let line = cx.line();
        let label = self.label.as_deref().unwrap_or(&self.target.label);
        let header_text = if label.is_empty() {
            format!("[{len}]")
        } else {
            format!("{label} [{len}]")
        };
        let (header, body) = split_top(rect, line);
        self.expanded = surface.foldout(header, &header_text, self.expanded)?;
        if self.expanded {
            let mut rest = indented(body, cx.config.indent);
            for (&index, child) in &mut self.children {
                if !child.is_visible(cx) {
                    continue;
                }
                let height = child.element_height(cx);
                let (row, below) = split_top(rest, height);
                rest = below;
                let (content, side) = split_right(row, BUTTON_WIDTH);
                child.draw_in(cx, surface, content)?;
                let button = Rect::new(side.x0, side.y0, side.x1, side.y0 + line);
                if surface.button(button, &format!("Remove {index}"))? {
                    self.pending.push(Mutation::Remove(index));
                }
            }
            if self.has_pager(cx) {
                let (row, below) = split_top(rest, line);
                rest = below;
                let (left, next) = split_right(row, BUTTON_WIDTH);
                let prev = Rect::new(left.x0, left.y0, (left.x0 + BUTTON_WIDTH).min(left.x1), left.y1);
                let text = Rect::new(prev.x1, left.y0, left.x1, left.y1);
                if surface.button(prev, "Prev")? {
                    self.prev_page();
                }
                surface.label(text, &format!("Page {}/{}", self.page + 1, self.page_count(cx)))?;
                if surface.button(next, "Next")? {
                    self.next_page();
                }
            }
            if let Some(message) = &self.diagnostic {
                let (row, below) = split_top(rest, line);
                rest = below;
                surface.error_line(Some(row), message)?;
            }
            if let CollectionState::ChoosingType(options) = &self.state {
                let (row, below) = split_top(rest, line);
                rest = below;
                let names: Vec<String> = options.iter().map(ToString::to_string).collect();
                if let Some(pick) = surface.select(row, ELEMENT_TYPE_LABEL, &names, None)? {
                    if let Some(ty) = options.get(pick).cloned() {
                        self.choose_type(&ty);
                    }
                }
            }
            if cx.config.show_collection_footer {
                let (row, _) = split_top(rest, line);
                let (_, add) = split_right(row, BUTTON_WIDTH);
                if surface.button(add, "Add")? {
                    self.pending.push(Mutation::Add);
                }
            }
        }
        self.flush(cx);
        Ok(())
    }

    fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    fn children(&self) -> Vec<&dyn ViewNode> {
        self.children.values().map(|c| &**c).collect()
    }

    fn as_collection(&self) -> Option<&CollectionNode> {
        Some(self)
    }

    fn as_collection_mut(&mut self) -> Option<&mut CollectionNode> {
        Some(self)
    }
}
