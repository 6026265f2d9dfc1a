// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=loupe_path --heading-base-level=0

//! Loupe Path: path-addressable locations over a reflected object graph.
//!
//! Loupe Path is the bottom layer of the Loupe inspector stack.
//!
//! - Describes types, members, inheritance, generics and attributes in an immutable
//!   [`TypeRegistry`], the stand-in for runtime reflection.
//! - Models the inspected object graph as dynamic [`Value`]s.
//! - Resolves dotted, indexed paths such as `items[3].label` into [`LocationId`]s whose
//!   values can be read and written through a [`Resolver`].
//!
//! ## Backing stores
//!
//! A resolver delegates every read and write to one [`Store`]:
//!
//! - [`ObjectStore`] (reflective): a plain in-memory graph. Static, non-public and computed
//!   members are all reachable.
//! - [`PropertyStore`] (structured): an externally owned representation that exposes only
//!   stored instance fields. Writes inside a [`Resolver::begin_edit`]/[`Resolver::end_edit`]
//!   bracket are buffered, and reads inside the bracket observe the pre-bracket snapshot.
//!
//! ## Caching
//!
//! Locations are created lazily on first resolution and cached by path. Values are cached for
//! one frame. Call [`Resolver::new_frame`] at the start of every render pass; any write through
//! the resolver also drops the value cache. Once per frame each location on an accessed chain
//! is re-validated: if a collection changed length or an object was replaced by a different
//! instance, the cached locations below it are dropped, and stale ids report
//! [`AccessError::Stale`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use loupe_path::{MemberDesc, Object, ObjectStore, Resolver, TypeDesc, TypeRef, TypeRegistry, Value};
//!
//! let registry = Arc::new(
//!     TypeRegistry::builder()
//!         .with_type(TypeDesc::structure("Item").member(MemberDesc::field("label", TypeRef::string())))
//!         .with_type(
//!             TypeDesc::structure("Root")
//!                 .member(MemberDesc::field("items", TypeRef::list(TypeRef::named("Item")))),
//!         )
//!         .build(),
//! );
//! let item = Object::new(TypeRef::named("Item")).with("label", "a");
//! let root = Object::new(TypeRef::named("Root")).with("items", vec![Value::from(item)]);
//! let store = ObjectStore::new(&registry, root);
//! let mut resolver = Resolver::new(registry, store);
//!
//! let label = resolver.resolve("items[0].label").unwrap();
//! assert_eq!(resolver.location(label).unwrap().path(), "items[0].label");
//! resolver.set_value(label, Value::from("b")).unwrap();
//! assert_eq!(resolver.get_value(label).unwrap(), Value::from("b"));
//! ```

pub mod error;
pub mod location;
pub mod path;
pub mod registry;
pub mod resolver;
pub mod store;
pub mod types;
pub mod value;

pub use error::{AccessError, AccessResult, ResolveError, ResolveResult};
pub use location::{Location, LocationId, MemberInfo};
pub use path::{MemberAccess, Segment, Step};
pub use registry::{
    AttributeDecl, Getter, MemberDesc, MemberRef, TypeDesc, TypeKind, TypeRegistry,
    TypeRegistryBuilder,
};
pub use resolver::Resolver;
pub use store::{ObjectStore, PropertyStore, Store, StoreKind};
pub use types::{Attribute, TypeRef, Visibility};
pub use value::{FromValue, Object, ObjectId, Value};
