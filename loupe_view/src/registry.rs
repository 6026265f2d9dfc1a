// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed factory registry for view nodes.
//!
//! Nodes are looked up by exact concrete type, then by open generic definition. Wrappers are
//! looked up by attribute kind. The registry is built once and shared; it holds no globals.

use std::collections::HashMap;
use std::sync::Arc;

use loupe_path::types::{BOOL, FLOAT, INT, STRING};
use loupe_path::{Attribute, TypeRef, TypeRegistry};

use crate::attributes;
use crate::node::{EnumNode, FieldNode, NodeSeed, ViewNode};
use crate::wrappers;

/// Builds the node for one concrete type.
pub type LeafFactory = Arc<dyn Fn(NodeSeed) -> Box<dyn ViewNode> + Send + Sync>;

/// Builds the node for an instantiation of an open generic definition, given its arguments.
pub type GenericFactory = Arc<dyn Fn(NodeSeed, &[TypeRef]) -> Box<dyn ViewNode> + Send + Sync>;

/// Wraps an already built node for one attribute instance.
pub type WrapperFactory =
    Arc<dyn Fn(&Attribute, &NodeSeed, Box<dyn ViewNode>) -> Box<dyn ViewNode> + Send + Sync>;

/// Immutable node and wrapper factories.
#[derive(Clone, Default)]
pub struct ViewRegistry {
    leaves: HashMap<TypeRef, LeafFactory>,
    generics: HashMap<String, GenericFactory>,
    wrappers: HashMap<String, WrapperFactory>,
}

impl core::fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut leaves: Vec<_> = self.leaves.keys().map(ToString::to_string).collect();
        leaves.sort();
        let mut generics: Vec<_> = self.generics.keys().collect();
        generics.sort();
        let mut wrappers: Vec<_> = self.wrappers.keys().collect();
        wrappers.sort();
        f.debug_struct("ViewRegistry")
            .field("leaves", &leaves)
            .field("generics", &generics)
            .field("wrappers", &wrappers)
            .finish()
    }
}

/// Collects factories before freezing them into a [`ViewRegistry`].
#[derive(Default)]
pub struct ViewRegistryBuilder {
    inner: ViewRegistry,
    builtins: bool,
}

impl core::fmt::Debug for ViewRegistryBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewRegistryBuilder")
            .field("inner", &self.inner)
            .field("builtins", &self.builtins)
            .finish()
    }
}

impl ViewRegistryBuilder {
    /// Register the node for an exact concrete type; replaces earlier registrations.
    pub fn leaf(
        mut self,
        ty: TypeRef,
        factory: impl Fn(NodeSeed) -> Box<dyn ViewNode> + Send + Sync + 'static,
    ) -> Self {
        self.inner.leaves.insert(ty, Arc::new(factory));
        self
    }

    /// Register the node for every instantiation of the generic `definition`.
    pub fn open_generic(
        mut self,
        definition: impl Into<String>,
        factory: impl Fn(NodeSeed, &[TypeRef]) -> Box<dyn ViewNode> + Send + Sync + 'static,
    ) -> Self {
        self.inner
            .generics
            .insert(definition.into(), Arc::new(factory));
        self
    }

    /// Register the wrapper applied for attributes of `kind`.
    pub fn wrapper(
        mut self,
        kind: impl Into<String>,
        factory: impl Fn(&Attribute, &NodeSeed, Box<dyn ViewNode>) -> Box<dyn ViewNode>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.inner.wrappers.insert(kind.into(), Arc::new(factory));
        self
    }

    /// Add the scalar editors, enum selectors and built-in wrappers at build time.
    ///
    /// Explicit registrations win over built-ins.
    pub fn with_builtins(mut self) -> Self {
        self.builtins = true;
        self
    }

    /// Freeze the registry; enum selectors are derived from the enum types in `types`.
    pub fn build(self, types: &TypeRegistry) -> ViewRegistry {
        let Self { mut inner, builtins } = self;
        if builtins {
            for name in [BOOL, INT, FLOAT, STRING] {
                let factory: LeafFactory = Arc::new(field_leaf);
                inner.leaves.entry(TypeRef::named(name)).or_insert(factory);
            }
            for desc in types.types() {
                let Some(variants) = desc.variants() else {
                    continue;
                };
                let variants = variants.to_vec();
                let factory: LeafFactory = Arc::new(move |seed: NodeSeed| -> Box<dyn ViewNode> {
                    Box::new(EnumNode::new(seed, variants.clone()))
                });
                inner
                    .leaves
                    .entry(TypeRef::named(desc.name.clone()))
                    .or_insert(factory);
            }
            let defaults: [(&str, WrapperFactory); 6] = [
                (attributes::SHOW_IF, Arc::new(wrappers::show_if)),
                (attributes::HIDE_IF, Arc::new(wrappers::hide_if)),
                (attributes::READ_ONLY, Arc::new(wrappers::read_only)),
                (attributes::DROPDOWN, Arc::new(wrappers::dropdown)),
                (attributes::LABEL_TEXT, Arc::new(wrappers::label_text)),
                (attributes::INFO_BOX, Arc::new(wrappers::info_box)),
            ];
            for (kind, factory) in defaults {
                inner.wrappers.entry(kind.to_owned()).or_insert(factory);
            }
        }
        tracing::debug!(
            leaves = inner.leaves.len(),
            generics = inner.generics.len(),
            wrappers = inner.wrappers.len(),
            "view registry built"
        );
        inner
    }
}

fn field_leaf(seed: NodeSeed) -> Box<dyn ViewNode> {
    Box::new(FieldNode::new(seed))
}

impl ViewRegistry {
    /// Start collecting factories.
    pub fn builder() -> ViewRegistryBuilder {
        ViewRegistryBuilder::default()
    }

    /// Registry with only the built-in nodes and wrappers.
    pub fn standard(types: &TypeRegistry) -> Self {
        Self::builder().with_builtins().build(types)
    }

    /// Factory registered for exactly `ty`.
    pub fn leaf(&self, ty: &TypeRef) -> Option<&LeafFactory> {
        self.leaves.get(ty)
    }

    /// Factory registered for the open definition of `ty`, with its arguments.
    pub fn open_generic<'t>(&self, ty: &'t TypeRef) -> Option<(&GenericFactory, &'t [TypeRef])> {
        match ty {
            TypeRef::Generic { definition, args } => {
                self.generics.get(definition).map(|f| (f, args.as_slice()))
            }
            _ => None,
        }
    }

    /// Wrapper registered for `kind`.
    pub fn wrapper(&self, kind: &str) -> Option<&WrapperFactory> {
        self.wrappers.get(kind)
    }
}

#[cfg(test)]
mod tests {
    use loupe_path::{Object, ObjectStore, Resolver, TypeDesc};

    use super::*;
    use crate::node::{LabelNode, Target};

    fn types() -> TypeRegistry {
        TypeRegistry::builder()
            .with_type(TypeDesc::enumeration("Mode", ["Off", "On"]))
            .with_type(TypeDesc::structure("Pair").generic(2))
            .with_type(TypeDesc::structure("Host"))
            .build()
    }

    fn seed(ty: TypeRef) -> NodeSeed {
        let types = Arc::new(types());
        let store = ObjectStore::new(&types, Object::new(TypeRef::named("Host")));
        let resolver = Resolver::new(types, store);
        NodeSeed {
            target: Target {
                location: resolver.root(),
                path: "x".into(),
                label: "x".into(),
                order: 0.0,
            },
            ty,
            attributes: Vec::new(),
        }
    }

    #[test]
    fn builtins_cover_scalars_enums_and_wrappers() {
        let reg = ViewRegistry::standard(&types());
        for ty in [TypeRef::bool(), TypeRef::int(), TypeRef::float(), TypeRef::string()] {
            let node = reg.leaf(&ty).unwrap()(seed(ty.clone()));
            assert_eq!(node.kind(), "field");
        }
        let mode = TypeRef::named("Mode");
        assert_eq!(reg.leaf(&mode).unwrap()(seed(mode.clone())).kind(), "enum");
        for kind in ["ShowIf", "HideIf", "ReadOnly", "Dropdown", "LabelText", "InfoBox"] {
            assert!(reg.wrapper(kind).is_some(), "{kind}");
        }
        assert!(reg.wrapper("Hidden").is_none());
    }

    #[test]
    fn explicit_leaf_beats_builtin() {
        let reg = ViewRegistry::builder()
            .leaf(TypeRef::int(), |seed| Box::new(LabelNode::new(seed)))
            .with_builtins()
            .build(&types());
        let node = reg.leaf(&TypeRef::int()).unwrap()(seed(TypeRef::int()));
        assert_eq!(node.kind(), "label");
    }

    #[test]
    fn open_generic_lookup_hands_out_arguments() {
        let reg = ViewRegistry::builder()
            .open_generic("Pair", |seed, args| {
                assert_eq!(args.len(), 2);
                Box::new(LabelNode::new(seed))
            })
            .build(&types());
        let ty = TypeRef::generic("Pair", vec![TypeRef::int(), TypeRef::string()]);
        let (factory, args) = reg.open_generic(&ty).unwrap();
        assert_eq!(args, [TypeRef::int(), TypeRef::string()]);
        assert_eq!(factory(seed(ty.clone()), args).kind(), "label");
        assert!(reg.open_generic(&TypeRef::int()).is_none());
    }
}
