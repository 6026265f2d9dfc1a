// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=loupe_binding --heading-base-level=0

//! Loupe Binding: dynamic attribute arguments bound to the inspected object graph.
//!
//! Attributes often need values that depend on the object being drawn: a visibility flag
//! stored in a sibling member, a label computed from the owning element, an option list kept
//! on the root. A [`MemberHelper<T>`] turns one attribute argument string into such a value.
//!
//! ## Grammar
//!
//! - `@expr`: compiled-expression mode. The text is handed to the [`ExpressionEvaluator`]
//!   installed on the [`Scope`]. Loupe ships no evaluator; without one the binding reports
//!   [`EXPRESSIONS_UNSUPPORTED`] and never produces a value.
//! - `$path`: parameter mode. Leading `parent`, `root`, `property` and `value` keywords move
//!   the starting location; the remainder is a member path resolved with the usual
//!   [`loupe_path`] rules. Without keywords the path is resolved on the object that owns
//!   the drawn member.
//! - Anything else: a literal. Only types that hold strings accept literal text; use
//!   [`MemberHelper::literal`] for other types.
//!
//! ## Errors
//!
//! Failures never panic. They are stored as a sticky [`BindingError`]; fetches return
//! `T::default()` while it is set. Show it with [`MemberHelper::draw_error`] or read it with
//! [`MemberHelper::error_message`]. The error is cleared when the context location's resolved
//! type changes and the binding is rebuilt.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use loupe_binding::{MemberHelper, Scope};
//! use loupe_path::{MemberDesc, Object, ObjectStore, Resolver, TypeDesc, TypeRef, TypeRegistry};
//!
//! let registry = Arc::new(
//!     TypeRegistry::builder()
//!         .with_type(
//!             TypeDesc::structure("Light")
//!                 .member(MemberDesc::field("enabled", TypeRef::bool()))
//!                 .member(MemberDesc::field("intensity", TypeRef::float())),
//!         )
//!         .build(),
//! );
//! let light = Object::new(TypeRef::named("Light"))
//!     .with("enabled", false)
//!     .with("intensity", 1.0);
//! let store = ObjectStore::new(&registry, light);
//! let mut resolver = Resolver::new(registry, store);
//! let intensity = resolver.resolve("intensity").unwrap();
//!
//! // Should `intensity` be shown? Ask its sibling.
//! let mut show_if = MemberHelper::<bool>::new("$enabled");
//! assert!(!show_if.get_value(&mut Scope::new(&mut resolver), intensity));
//! ```

mod error;
mod expression;
mod helper;

pub use error::{BindingError, EXPRESSIONS_UNSUPPORTED};
pub use expression::{CompiledExpression, ExpressionContext, ExpressionEvaluator};
pub use helper::{ErrorSink, Hop, MemberHelper, Scope, Source, owner};
