// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scriptable [`RenderSurface`] that records every call.
//!
//! Useful for tests and headless demos: script edits, picks, presses and foldout changes by
//! label, then inspect the recorded [`Op`]s.

use std::collections::{HashMap, HashSet};

use kurbo::Rect;
use loupe_binding::ErrorSink;
use loupe_path::Value;

use crate::error::{Abort, DrawResult};
use crate::surface::RenderSurface;

/// One recorded surface call.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    /// Space claimed from the layout cursor.
    Claim(Rect),
    /// Static text.
    Label {
        /// Where.
        rect: Rect,
        /// What.
        text: String,
    },
    /// Value editor.
    Field {
        /// Where.
        rect: Rect,
        /// Field label.
        label: String,
        /// Shown value.
        value: Value,
        /// Whether edits were accepted.
        read_only: bool,
    },
    /// Foldout header.
    Foldout {
        /// Where.
        rect: Rect,
        /// Header label.
        label: String,
        /// State passed in.
        expanded: bool,
    },
    /// Push button.
    Button {
        /// Where.
        rect: Rect,
        /// Caption.
        text: String,
    },
    /// Selection list.
    Select {
        /// Where.
        rect: Rect,
        /// List label.
        label: String,
        /// Offered options.
        options: Vec<String>,
        /// Selected option passed in.
        current: Option<usize>,
    },
    /// Inline error line.
    Error {
        /// Where, if given.
        rect: Option<Rect>,
        /// Message.
        message: String,
    },
}

/// Recording, scriptable surface of a fixed width.
///
/// Scripted interactions are one-shot: each fires on the first matching call and is consumed.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    width: f64,
    cursor: f64,
    ops: Vec<Op>,
    edits: HashMap<String, Value>,
    picks: HashMap<String, usize>,
    presses: HashSet<String>,
    folds: HashMap<String, bool>,
    abort_at: Option<usize>,
}

impl RecordingSurface {
    /// Surface `width` wide with the cursor at the top.
    pub fn new(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Answer the next field labelled `label` with `value`.
    pub fn edit(&mut self, label: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.edits.insert(label.into(), value.into());
        self
    }

    /// Answer the next selection list labelled `label` with option `index`.
    pub fn pick(&mut self, label: impl Into<String>, index: usize) -> &mut Self {
        self.picks.insert(label.into(), index);
        self
    }

    /// Report the next button captioned `text` as pressed.
    pub fn press(&mut self, text: impl Into<String>) -> &mut Self {
        self.presses.insert(text.into());
        self
    }

    /// Answer the next foldout labelled `label` with `expanded`.
    pub fn fold(&mut self, label: impl Into<String>, expanded: bool) -> &mut Self {
        self.folds.insert(label.into(), expanded);
        self
    }

    /// Abort the pass on the call that would record op number `n` (zero based).
    pub fn abort_at(&mut self, n: usize) -> &mut Self {
        self.abort_at = Some(n);
        self
    }

    /// Recorded calls, oldest first.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Forget recorded calls and move the cursor back to the top; scripts are kept.
    pub fn reset(&mut self) {
        self.ops.clear();
        self.cursor = 0.0;
    }

    /// Current layout cursor.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Texts of the recorded labels.
    pub fn labels(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Labels of the recorded fields.
    pub fn fields(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Field { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Captions of the recorded buttons.
    pub fn buttons(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Button { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Messages of the recorded error lines.
    pub fn errors(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Error { message, .. } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, op: Op) -> DrawResult {
        if self.abort_at == Some(self.ops.len()) {
            self.abort_at = None;
            return Err(Abort);
        }
        self.ops.push(op);
        Ok(())
    }
}

impl ErrorSink for RecordingSurface {
    type Error = Abort;

    fn error_line(&mut self, rect: Option<Rect>, message: &str) -> Result<(), Abort> {
        self.record(Op::Error {
            rect,
            message: message.to_owned(),
        })
    }
}

impl RenderSurface for RecordingSurface {
    fn claim(&mut self, height: f64) -> DrawResult<Rect> {
        let rect = Rect::new(0.0, self.cursor, self.width, self.cursor + height);
        self.record(Op::Claim(rect))?;
        self.cursor += height;
        Ok(rect)
    }

    fn label(&mut self, rect: Rect, text: &str) -> DrawResult {
        self.record(Op::Label {
            rect,
            text: text.to_owned(),
        })
    }

    fn field(
        &mut self,
        rect: Rect,
        label: &str,
        value: &Value,
        read_only: bool,
    ) -> DrawResult<Option<Value>> {
        self.record(Op::Field {
            rect,
            label: label.to_owned(),
            value: value.clone(),
            read_only,
        })?;
        Ok(self.edits.remove(label))
    }

    fn foldout(&mut self, rect: Rect, label: &str, expanded: bool) -> DrawResult<bool> {
        self.record(Op::Foldout {
            rect,
            label: label.to_owned(),
            expanded,
        })?;
        Ok(self.folds.remove(label).unwrap_or(expanded))
    }

    fn button(&mut self, rect: Rect, text: &str) -> DrawResult<bool> {
        self.record(Op::Button {
            rect,
            text: text.to_owned(),
        })?;
        Ok(self.presses.remove(text))
    }

    fn select(
        &mut self,
        rect: Rect,
        label: &str,
        options: &[String],
        current: Option<usize>,
    ) -> DrawResult<Option<usize>> {
        self.record(Op::Select {
            rect,
            label: label.to_owned(),
            options: options.to_vec(),
            current,
        })?;
        Ok(self.picks.remove(label))
    }
}
