// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute kinds understood by the built-in nodes and wrappers.

/// `ShowIf(binding)`: draw only while the bound bool is true.
pub const SHOW_IF: &str = "ShowIf";
/// `HideIf(binding)`: draw only while the bound bool is false.
pub const HIDE_IF: &str = "HideIf";
/// `ReadOnly`: draw without accepting edits.
pub const READ_ONLY: &str = "ReadOnly";
/// `Dropdown(binding)`: pick the value from a bound option list.
pub const DROPDOWN: &str = "Dropdown";
/// `LabelText(binding)`: replace the label; an empty text hides it.
pub const LABEL_TEXT: &str = "LabelText";
/// `InfoBox(binding)`: message line above the member.
pub const INFO_BOX: &str = "InfoBox";
/// `Hidden`: skip the member in composites.
pub const HIDDEN: &str = "Hidden";
/// `Order(f)`: sibling sort key.
pub const ORDER: &str = "Order";
/// `Paged(n)`: collection page size.
pub const PAGED: &str = "Paged";
