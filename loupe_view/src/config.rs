// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inspector configuration.

/// Layout and paging defaults for an inspector.
///
/// Per-member overrides come from attributes, e.g. `Paged(n)` on a collection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InspectorConfig {
    /// Height of one control line.
    pub line_height: f64,
    /// Horizontal offset of nested members.
    pub indent: f64,
    /// Elements materialized per collection page.
    pub max_items_per_page: usize,
    /// Show the Add footer below collections.
    pub show_collection_footer: bool,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            line_height: 18.0,
            indent: 15.0,
            max_items_per_page: 10,
            show_collection_footer: true,
        }
    }
}
