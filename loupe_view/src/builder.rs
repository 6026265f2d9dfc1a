// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree building: pick a node for a location, recurse into composites, then wrap.

use std::sync::Arc;

use loupe_path::{LocationId, Resolver, Value, path};

use crate::attributes::{HIDDEN, ORDER, PAGED};
use crate::collection::CollectionNode;
use crate::implication;
use crate::node::{CompositeNode, ErrorNode, LabelNode, NodeSeed, Target, ViewNode};
use crate::registry::ViewRegistry;

/// Builds view-node trees from resolved locations.
///
/// Base selection, in order:
/// 1. a leaf registered for the exact resolved type;
/// 2. a node registered for the open generic definition of the resolved type;
/// 3. a [`CollectionNode`] for lists and arrays;
/// 4. a [`CompositeNode`] for struct values with at least one shown member;
/// 5. a read-only [`LabelNode`].
///
/// Wrappers registered for the location's attributes are applied afterwards in declaration
/// order, so the first declared attribute wraps innermost.
#[derive(Clone, Debug)]
pub struct TreeBuilder {
    views: Arc<ViewRegistry>,
}

impl TreeBuilder {
    /// Builder drawing from `views`.
    pub fn new(views: Arc<ViewRegistry>) -> Self {
        Self { views }
    }

    /// The node factories in use.
    pub fn views(&self) -> &Arc<ViewRegistry> {
        &self.views
    }

    /// Build the node for `id`.
    ///
    /// Never fails: locations that cannot be read and attributes that cannot be expanded turn
    /// into an [`ErrorNode`] in place of the member.
    pub fn build(&self, resolver: &mut Resolver, id: LocationId) -> Box<dyn ViewNode> {
        match seed(resolver, id) {
            Ok(seed) => self.compose(resolver, seed),
            Err(error) => error,
        }
    }

    /// Build nodes for the shown members of the struct at `id`, in declaration order.
    ///
    /// Members carrying `Hidden` are skipped. A member that fails to resolve becomes an
    /// [`ErrorNode`].
    pub fn build_members(&self, resolver: &mut Resolver, id: LocationId) -> Vec<Box<dyn ViewNode>> {
        let parent_path = resolver
            .location(id)
            .map(|l| l.path().to_owned())
            .unwrap_or_default();
        let mut out: Vec<Box<dyn ViewNode>> = Vec::new();
        for name in resolver.member_names(id) {
            let child = match resolver.member(id, &name) {
                Ok(child) => child,
                Err(err) => {
                    let target = Target {
                        location: id,
                        path: path::join(&parent_path, &name),
                        label: name.clone(),
                        order: 0.0,
                    };
                    out.push(Box::new(ErrorNode::new(target, format!("{name}: {err}"))));
                    continue;
                }
            };
            match seed(resolver, child) {
                Ok(seed) if seed.attribute(HIDDEN).is_some() => {
                    tracing::trace!(path = %seed.target.path, "hidden member skipped");
                }
                Ok(seed) => out.push(self.compose(resolver, seed)),
                Err(error) => out.push(error),
            }
        }
        out
    }

    fn compose(&self, resolver: &mut Resolver, seed: NodeSeed) -> Box<dyn ViewNode> {
        let node = self.base(resolver, &seed);
        tracing::debug!(path = %seed.target.path, ty = %seed.ty, kind = node.kind(), "built node");
        seed.attributes.iter().fold(node, |node, attr| {
            match self.views.wrapper(&attr.kind) {
                Some(wrap) => wrap(attr, &seed, node),
                None => node,
            }
        })
    }

    fn base(&self, resolver: &mut Resolver, seed: &NodeSeed) -> Box<dyn ViewNode> {
        if let Some(leaf) = self.views.leaf(&seed.ty) {
            return leaf(seed.clone());
        }
        if let Some((open, args)) = self.views.open_generic(&seed.ty) {
            return open(seed.clone(), args);
        }
        if seed.ty.is_collection() {
            let page_size = seed
                .attribute(PAGED)
                .and_then(|a| a.arg(0))
                .and_then(Value::as_int)
                .and_then(|n| usize::try_from(n).ok())
                .filter(|&n| n > 0);
            return Box::new(CollectionNode::new(seed.clone(), page_size));
        }
        let location = seed.target.location;
        let identity = match resolver.get_value(location) {
            Ok(Value::Object(obj)) => Some(obj.id()),
            _ => None,
        };
        if identity.is_some() && resolver.registry().is_struct(&seed.ty) {
            let members = self.build_members(resolver, location);
            if !members.is_empty() {
                return Box::new(CompositeNode::new(seed.clone(), identity, members));
            }
        }
        Box::new(LabelNode::new(seed.clone()))
    }
}

/// Target and expanded attributes of `id`, or the error node standing in for it.
fn seed(resolver: &mut Resolver, id: LocationId) -> Result<NodeSeed, Box<dyn ViewNode>> {
    let valid = resolver.ensure_valid(id);
    let Some(loc) = resolver.location(id) else {
        let target = Target {
            location: id,
            path: String::new(),
            label: String::new(),
            order: 0.0,
        };
        let message = match valid {
            Err(err) => err.to_string(),
            Ok(()) => "location is no longer valid".to_owned(),
        };
        return Err(Box::new(ErrorNode::new(target, message)));
    };
    let mut target = Target {
        location: id,
        path: loc.path().to_owned(),
        label: loc.label(),
        order: 0.0,
    };
    let ty = loc.resolved_type().clone();
    let raw = loc.attributes().to_vec();
    let attributes = match implication::expand(resolver.registry(), &raw) {
        Ok(attributes) => attributes,
        Err(err) => {
            tracing::warn!(path = %target.path, %err, "attribute expansion failed");
            let message = format!("{}: {err}", target.label);
            return Err(Box::new(ErrorNode::new(target, message)));
        }
    };
    if let Some(order) = attributes
        .iter()
        .find(|a| a.is(ORDER))
        .and_then(|a| a.arg(0))
        .and_then(Value::as_float)
    {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Sort keys do not need double precision."
        )]
        {
            target.order = order as f32;
        }
    }
    Ok(NodeSeed {
        target,
        ty,
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use loupe_path::registry::INCLUDE_MY_ATTRIBUTES;
    use loupe_path::{
        Attribute, AttributeDecl, MemberDesc, Object, ObjectStore, PropertyStore, TypeDesc, TypeRef,
        TypeRegistry,
    };

    use super::*;
    use crate::config::InspectorConfig;
    use crate::node::Cx;
    use crate::testing::RecordingSurface;

    fn types() -> Arc<TypeRegistry> {
        Arc::new(
            TypeRegistry::builder()
                .with_attribute(AttributeDecl::new("Ping").self_including().implies(Attribute::new("Pong")))
                .with_attribute(AttributeDecl::new("Pong").self_including().implies(Attribute::new("Ping")))
                .with_attribute(
                    AttributeDecl::new("Locked")
                        .implies(Attribute::new(INCLUDE_MY_ATTRIBUTES))
                        .implies(Attribute::new("ReadOnly")),
                )
                .with_type(TypeDesc::enumeration("Mode", ["Off", "On"]))
                .with_type(TypeDesc::structure("Pair").generic(2))
                .with_type(TypeDesc::structure("Empty"))
                .with_type(
                    TypeDesc::structure("Inner")
                        .member(MemberDesc::field("a", TypeRef::int()))
                        .member(MemberDesc::field("b", TypeRef::int())),
                )
                .with_type(
                    TypeDesc::structure("Root")
                        .member(MemberDesc::field("count", TypeRef::int()))
                        .member(MemberDesc::field("mode", TypeRef::named("Mode")))
                        .member(MemberDesc::field("inner", TypeRef::named("Inner")))
                        .member(MemberDesc::field("items", TypeRef::list(TypeRef::int())))
                        .member(MemberDesc::field("empty", TypeRef::named("Empty")))
                        .member(MemberDesc::field(
                            "pair",
                            TypeRef::generic("Pair", vec![TypeRef::int(), TypeRef::string()]),
                        ))
                        .member(
                            MemberDesc::field("secret", TypeRef::int())
                                .with_attribute(Attribute::new(HIDDEN)),
                        )
                        .member(
                            MemberDesc::field("first", TypeRef::int())
                                .with_attribute(Attribute::new(ORDER).with_arg(-1.0)),
                        )
                        .member(
                            MemberDesc::field("loop", TypeRef::int())
                                .with_attribute(Attribute::new("Ping")),
                        )
                        .member(
                            MemberDesc::field("locked", TypeRef::int())
                                .with_attribute(Attribute::new("Locked"))
                                .with_attribute(Attribute::new("InfoBox").with_arg("careful")),
                        )
                        .member(MemberDesc::field("hidden_store", TypeRef::int()).static_member()),
                )
                .build(),
        )
    }

    fn root_value() -> Object {
        Object::new(TypeRef::named("Root"))
            .with("count", 1)
            .with("mode", Value::Enum("On".into()))
            .with("inner", Object::new(TypeRef::named("Inner")).with("a", 1).with("b", 2))
            .with("items", vec![Value::Int(1), Value::Int(2)])
            .with("empty", Object::new(TypeRef::named("Empty")))
            .with("pair", Object::new(TypeRef::generic("Pair", vec![TypeRef::int(), TypeRef::string()])))
            .with("secret", 7)
            .with("first", 0)
            .with("loop", 0)
            .with("locked", 0)
    }

    fn builder(types: &TypeRegistry) -> TreeBuilder {
        TreeBuilder::new(Arc::new(ViewRegistry::standard(types)))
    }

    fn kinds(node: &dyn ViewNode) -> Vec<(String, &'static str)> {
        node.children()
            .into_iter()
            .map(|c| (c.target().label.clone(), c.kind()))
            .collect()
    }

    #[test]
    fn selects_nodes_by_type() {
        let types = types();
        let store = ObjectStore::new(&types, root_value());
        let mut resolver = Resolver::new(Arc::clone(&types), store);
        let builder = builder(&types);
        let root = resolver.root();
        let tree = builder.build(&mut resolver, root);
        assert_eq!(tree.kind(), "composite");
        assert_eq!(
            kinds(&*tree),
            [
                ("first".to_owned(), "field"),
                ("count".to_owned(), "field"),
                ("mode".to_owned(), "enum"),
                ("inner".to_owned(), "composite"),
                ("items".to_owned(), "collection"),
                ("empty".to_owned(), "label"),
                ("pair".to_owned(), "label"),
                ("loop".to_owned(), "error"),
                ("locked".to_owned(), "info-box"),
                ("hidden_store".to_owned(), "field"),
            ]
        );
    }

    #[test]
    fn open_generic_node_receives_arguments() {
        let types = types();
        let store = ObjectStore::new(&types, root_value());
        let mut resolver = Resolver::new(Arc::clone(&types), store);
        let views = ViewRegistry::builder()
            .open_generic("Pair", |seed, args| {
                let names: Vec<_> = args.iter().map(ToString::to_string).collect();
                let mut node = LabelNode::new(seed);
                node.set_label(Some(format!("pair of {}", names.join(" and "))));
                Box::new(node)
            })
            .with_builtins()
            .build(&types);
        let builder = TreeBuilder::new(Arc::new(views));
        let pair = resolver.resolve("pair").unwrap();
        let mut node = builder.build(&mut resolver, pair);
        assert_eq!(node.kind(), "label");

        let config = InspectorConfig::default();
        let mut surface = RecordingSurface::new(200.0);
        node.draw(&mut Cx::new(&mut resolver, &builder, &config), &mut surface, None)
            .unwrap();
        let labels = surface.labels();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].starts_with("pair of int and string: "));
        assert!(builder.views().leaf(&TypeRef::int()).is_some());
    }

    #[test]
    fn cyclic_attributes_become_an_error_node() {
        let types = types();
        let store = ObjectStore::new(&types, root_value());
        let mut resolver = Resolver::new(Arc::clone(&types), store);
        let looped = resolver.resolve("loop").unwrap();
        let node = builder(&types).build(&mut resolver, looped);
        assert_eq!(node.kind(), "error");
    }

    #[test]
    fn wrappers_apply_in_declaration_order() {
        let types = types();
        let store = ObjectStore::new(&types, root_value());
        let mut resolver = Resolver::new(Arc::clone(&types), store);
        let locked = resolver.resolve("locked").unwrap();
        let node = builder(&types).build(&mut resolver, locked);
        // Locked expands to ReadOnly, declared before InfoBox, so InfoBox is outermost.
        assert_eq!(node.kind(), "info-box");
        let inner = node.inner().unwrap();
        assert_eq!(inner.kind(), "read-only");
        assert_eq!(inner.inner().unwrap().kind(), "field");
    }

    #[test]
    fn structured_store_hides_static_members() {
        let types = types();
        let store = PropertyStore::new(root_value());
        let mut resolver = Resolver::new(Arc::clone(&types), store);
        let root = resolver.root();
        let tree = builder(&types).build(&mut resolver, root);
        assert!(
            tree.children()
                .iter()
                .all(|c| c.target().label != "hidden_store")
        );
    }

    #[test]
    fn stale_location_builds_an_error_node() {
        let types = types();
        let store = ObjectStore::new(&types, root_value());
        let mut resolver = Resolver::new(Arc::clone(&types), store);
        let a = resolver.resolve("inner.a").unwrap();
        let inner = resolver.resolve("inner").unwrap();
        resolver.invalidate(inner);
        let node = builder(&types).build(&mut resolver, a);
        assert_eq!(node.kind(), "error");
    }
}
