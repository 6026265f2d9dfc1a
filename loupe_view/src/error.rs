// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View-layer errors.

/// The render surface asked to abandon the current pass.
///
/// Every layer returns it unchanged; no node swallows it.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("render pass aborted")]
pub struct Abort;

/// Result of a draw or layout call.
pub type DrawResult<T = ()> = Result<T, Abort>;

/// An attribute kind was re-entered while its own implied attributes were being expanded.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("cyclic attribute implication: {}", chain.join(" -> "))]
pub struct CyclicAttributeImplication {
    /// Kinds from the outermost expansion to the re-entered kind.
    pub chain: Vec<String>,
}
