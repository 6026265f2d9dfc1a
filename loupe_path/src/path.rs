// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path text and the store-level steps a location is made of.
//!
//! A path is a `.`-separated list of segments. Each segment is a member name followed by
//! zero or more index suffixes: `items[3]`, `grid[1][2]`. The first segment may omit the
//! name when the root itself is a collection (`[0].name`). The empty path addresses the root.

use std::fmt;

use crate::error::{ResolveError, ResolveResult};
use crate::registry::Getter;

/// One parsed path segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Member name; empty for a bare index on the root.
    pub name: String,
    /// Index suffixes in order.
    pub indices: Vec<usize>,
}

/// Parse `path` into segments.
pub fn parse(path: &str) -> ResolveResult<Vec<Segment>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for (i, raw) in path.split('.').enumerate() {
        let (name, mut rest) = match raw.find('[') {
            Some(at) => (&raw[..at], &raw[at..]),
            None => (raw, ""),
        };
        if name.contains(']') {
            return Err(ResolveError::invalid(path, "unbalanced `]`"));
        }
        let mut indices = Vec::new();
        while !rest.is_empty() {
            let Some(body) = rest.strip_prefix('[') else {
                return Err(ResolveError::invalid(path, "text after index suffix"));
            };
            let Some(close) = body.find(']') else {
                return Err(ResolveError::invalid(path, "unterminated index suffix"));
            };
            let index = body[..close]
                .trim()
                .parse::<usize>()
                .map_err(|_| ResolveError::invalid(path, "index is not a non-negative integer"))?;
            indices.push(index);
            rest = &body[close + 1..];
        }
        let name = name.trim();
        if name.is_empty() && (indices.is_empty() || i > 0) {
            return Err(ResolveError::invalid(path, "empty segment"));
        }
        out.push(Segment {
            name: name.to_owned(),
            indices,
        });
    }
    Ok(out)
}

/// Path of member `name` below `parent`.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_owned()
    } else {
        format!("{parent}.{name}")
    }
}

/// Path of element `index` of the collection at `parent`.
pub fn index(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// How a member is reached by the store.
#[derive(Clone)]
pub enum MemberAccess {
    /// A field stored in the owning object.
    Stored,
    /// A static member of `owner`, held once per store.
    Static {
        /// Declaring type.
        owner: String,
    },
    /// A read-only member derived from the owning object.
    Computed(Getter),
}

impl fmt::Debug for MemberAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored => f.write_str("Stored"),
            Self::Static { owner } => f.debug_struct("Static").field("owner", owner).finish(),
            Self::Computed(_) => f.write_str("Computed"),
        }
    }
}

/// One store-level step from a value to a nested value.
#[derive(Clone, Debug)]
pub enum Step {
    /// Member access by canonical name.
    Field {
        /// Canonical member name.
        name: String,
        /// How the member is reached.
        access: MemberAccess,
    },
    /// Collection element.
    Index(usize),
}

impl Step {
    /// Whether this step reads a computed member.
    pub fn is_computed(&self) -> bool {
        matches!(
            self,
            Self::Field {
                access: MemberAccess::Computed(_),
                ..
            }
        )
    }
}

/// Render steps back into path text, for diagnostics.
pub fn render(steps: &[Step]) -> String {
    let mut out = String::new();
    for step in steps {
        match step {
            Step::Field { name, .. } => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            Step::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
        }
    }
    out
}
