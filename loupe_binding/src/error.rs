// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binding errors.

use loupe_path::{AccessError, ResolveError};

/// Message reported when an `@` binding is used without an evaluator.
pub const EXPRESSIONS_UNSUPPORTED: &str =
    "Expressions are only supported with an expression evaluator enabled";

/// Why a binding could not produce a value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The bound member does not exist where the binding looked for it.
    #[error("no member `{member}` found from `{from}`")]
    MemberNotFound {
        /// Path of the location the lookup started from.
        from: String,
        /// The member path that failed.
        member: String,
    },
    /// The produced value does not fit the requested type.
    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        /// Requested type.
        expected: &'static str,
        /// What was found instead.
        found: String,
    },
    /// An `@` binding was used but no evaluator is installed.
    #[error("{}", EXPRESSIONS_UNSUPPORTED)]
    ExpressionUnsupported,
    /// The evaluator rejected or failed the expression.
    #[error("expression `{expression}` failed: {message}")]
    Expression {
        /// Expression text without the `@` prefix.
        expression: String,
        /// Evaluator message.
        message: String,
    },
    /// The binding text is malformed.
    #[error("invalid binding `{0}`")]
    Syntax(String),
    /// The bound path could not be resolved.
    #[error(transparent)]
    Resolve(ResolveError),
    /// Reading the bound value failed.
    #[error(transparent)]
    Access(#[from] AccessError),
}
