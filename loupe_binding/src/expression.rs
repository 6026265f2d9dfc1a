// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pluggable compiled-expression capability behind `@` bindings.

use core::fmt;

use loupe_path::{LocationId, Value};

/// Implicit context handed to a compiled expression.
#[derive(Clone, Copy, Debug)]
pub struct ExpressionContext<'a> {
    /// The location the binding is evaluated for.
    pub location: LocationId,
    /// Path of that location.
    pub path: &'a str,
    /// Current value of that location.
    pub value: &'a Value,
}

/// A compiled expression, evaluated once per fetch.
pub trait CompiledExpression {
    /// Evaluate against `cx`.
    fn evaluate(&self, cx: &ExpressionContext<'_>) -> Result<Value, String>;
}

impl<F> CompiledExpression for F
where
    F: Fn(&ExpressionContext<'_>) -> Result<Value, String>,
{
    fn evaluate(&self, cx: &ExpressionContext<'_>) -> Result<Value, String> {
        self(cx)
    }
}

/// Compiles `@` expression text.
///
/// No evaluator ships with Loupe; embedders install one through
/// [`Scope::with_evaluator`](crate::Scope::with_evaluator).
pub trait ExpressionEvaluator {
    /// Compile `source` (without the `@` prefix).
    fn compile(&self, source: &str) -> Result<Box<dyn CompiledExpression>, String>;
}

impl fmt::Debug for dyn ExpressionEvaluator + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExpressionEvaluator")
    }
}

impl fmt::Debug for dyn CompiledExpression + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompiledExpression")
    }
}
