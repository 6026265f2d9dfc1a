// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=loupe_view --heading-base-level=0

//! Loupe View: composed, cached view-node trees for inspecting and editing object graphs.
//!
//! Loupe View sits on top of [`loupe_path`] and [`loupe_binding`]. It turns a resolved
//! location into a tree of [`ViewNode`]s and renders that tree through a toolkit-provided
//! [`RenderSurface`].
//!
//! ## Building
//!
//! A [`TreeBuilder`] picks a node for each location from a [`ViewRegistry`]: an exact-type
//! leaf, an open-generic node, a [`CollectionNode`], a [`CompositeNode`] over the members of a
//! struct, or a read-only [`LabelNode`]. Attributes on the member are first expanded (see
//! [`implication`]) and then every attribute with a registered wrapper decorates the node,
//! first declared innermost. The built-ins cover [`attributes::SHOW_IF`],
//! [`attributes::HIDE_IF`], [`attributes::READ_ONLY`], [`attributes::DROPDOWN`],
//! [`attributes::LABEL_TEXT`] and [`attributes::INFO_BOX`].
//!
//! ## Drawing
//!
//! Nodes either claim their own height from the surface or draw inside a rectangle handed to
//! them, never outside it. Composites with more than one shown member get a foldout header.
//! Collections page their elements and queue add, remove and reorder requests until their draw
//! returns. The surface can abandon a pass by returning [`Abort`] from any call; it propagates
//! unchanged.
//!
//! ## Caching
//!
//! The [`Inspector`] keeps built trees keyed by location path, so foldout, page and binding
//! state survive between passes. Call [`Inspector::new_frame`] at the start of each pass.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use loupe_path::{Attribute, MemberDesc, Object, ObjectStore, Resolver, TypeDesc, TypeRef, TypeRegistry};
//! use loupe_view::{Inspector, attributes};
//! use loupe_view::testing::RecordingSurface;
//!
//! let types = Arc::new(
//!     TypeRegistry::builder()
//!         .with_type(
//!             TypeDesc::structure("Light")
//!                 .member(MemberDesc::field("enabled", TypeRef::bool()))
//!                 .member(
//!                     MemberDesc::field("intensity", TypeRef::float())
//!                         .with_attribute(Attribute::new(attributes::SHOW_IF).with_arg("$enabled")),
//!                 ),
//!         )
//!         .build(),
//! );
//! let light = Object::new(TypeRef::named("Light"))
//!     .with("enabled", false)
//!     .with("intensity", 1.0);
//! let store = ObjectStore::new(&types, light);
//! let mut inspector = Inspector::standard(Resolver::new(types, store));
//!
//! let mut surface = RecordingSurface::new(320.0);
//! inspector.draw_root(&mut surface).unwrap();
//! assert_eq!(surface.fields(), ["enabled"]);
//!
//! // Switch the light on; the intensity shows up on the next pass.
//! inspector.new_frame();
//! surface.reset();
//! surface.edit("enabled", true);
//! inspector.draw_root(&mut surface).unwrap();
//! inspector.new_frame();
//! surface.reset();
//! inspector.draw_root(&mut surface).unwrap();
//! assert_eq!(surface.fields(), ["enabled", "intensity"]);
//! ```

pub mod attributes;
mod builder;
mod collection;
mod config;
mod error;
pub mod implication;
mod inspector;
mod node;
mod registry;
pub mod surface;
pub mod testing;
mod wrappers;

pub use builder::TreeBuilder;
pub use collection::{CollectionNode, CollectionState, ELEMENT_TYPE_LABEL, Mutation};
pub use config::InspectorConfig;
pub use error::{Abort, CyclicAttributeImplication, DrawResult};
pub use inspector::Inspector;
pub use node::{
    CompositeNode, Cx, DrawFlags, EnumNode, ErrorNode, FieldNode, LabelNode, NodeSeed, Target,
    ViewNode,
};
pub use registry::{GenericFactory, LeafFactory, ViewRegistry, ViewRegistryBuilder, WrapperFactory};
pub use surface::RenderSurface;
pub use wrappers::{Dropdown, InfoBox, LabelText, ReadOnly, ShowIf};
