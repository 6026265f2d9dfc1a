// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render surface boundary.
//!
//! Loupe does not draw pixels. Nodes describe what to show through [`RenderSurface`], which a
//! toolkit implements on top of its own controls. Every call may return [`Abort`] to abandon
//! the pass.

use kurbo::Rect;
use loupe_binding::ErrorSink;
use loupe_path::Value;

use crate::error::{Abort, DrawResult};

/// Layout and control primitives consumed by view nodes.
pub trait RenderSurface: ErrorSink<Error = Abort> {
    /// Claim the next rectangle of `height` from the surface's layout cursor.
    fn claim(&mut self, height: f64) -> DrawResult<Rect>;

    /// Static text.
    fn label(&mut self, rect: Rect, text: &str) -> DrawResult;

    /// Editor for a scalar value; returns the edited value when the user changed it.
    fn field(
        &mut self,
        rect: Rect,
        label: &str,
        value: &Value,
        read_only: bool,
    ) -> DrawResult<Option<Value>>;

    /// Foldout header; returns the new expanded state.
    fn foldout(&mut self, rect: Rect, label: &str, expanded: bool) -> DrawResult<bool>;

    /// Push button; returns whether it was pressed.
    fn button(&mut self, rect: Rect, text: &str) -> DrawResult<bool>;

    /// Selection list; returns the picked option index when the selection changed.
    fn select(
        &mut self,
        rect: Rect,
        label: &str,
        options: &[String],
        current: Option<usize>,
    ) -> DrawResult<Option<usize>>;
}

impl core::fmt::Debug for dyn RenderSurface + '_ {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("RenderSurface")
    }
}

/// Split `rect` into a top row of `height` and the remainder below it.
pub fn split_top(rect: Rect, height: f64) -> (Rect, Rect) {
    let cut = (rect.y0 + height).min(rect.y1);
    (
        Rect::new(rect.x0, rect.y0, rect.x1, cut),
        Rect::new(rect.x0, cut, rect.x1, rect.y1),
    )
}

/// Split `rect` into a left part and a right part of `width`.
pub fn split_right(rect: Rect, width: f64) -> (Rect, Rect) {
    let cut = (rect.x1 - width).max(rect.x0);
    (
        Rect::new(rect.x0, rect.y0, cut, rect.y1),
        Rect::new(cut, rect.y0, rect.x1, rect.y1),
    )
}

/// `rect` shifted right by `indent`, keeping its right edge.
pub fn indented(rect: Rect, indent: f64) -> Rect {
    Rect::new((rect.x0 + indent).min(rect.x1), rect.y0, rect.x1, rect.y1)
}
