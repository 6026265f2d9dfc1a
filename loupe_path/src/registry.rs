// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type registry: the reflection substrate.
//!
//! ## Overview
//!
//! The registry describes every type the inspector can traverse: scalars, structs (with an
//! optional base type and optional generic parameters), enums, and attribute declarations.
//! It is assembled once through [`TypeRegistry::builder`] and is immutable afterwards; share
//! it behind an `Arc`.
//!
//! Member lookup follows host reflection rules: the inheritance chain is searched derived
//! first, an exact-case match wins over a case-insensitive one, and public, non-public,
//! static and instance members are all candidates.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::types::{Attribute, BOOL, FLOAT, INT, STRING, TypeRef, Visibility};
use crate::value::{Object, Value};

/// Marker attribute: an attribute kind that carries it is replaced by its own declared
/// attributes during implication expansion.
pub const INCLUDE_MY_ATTRIBUTES: &str = "IncludeMyAttributes";

/// Usage metadata attribute; never spliced into members.
pub const ATTRIBUTE_USAGE: &str = "AttributeUsage";

/// Read-only derived member: computes a value from the owning object.
pub type Getter = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A field or property of a type.
#[derive(Clone)]
pub struct MemberDesc {
    /// Declared member name (canonical case).
    pub name: String,
    /// Declared type, possibly mentioning generic parameters.
    pub ty: TypeRef,
    /// Public or non-public.
    pub visibility: Visibility,
    /// Static members live once per type, not per instance.
    pub is_static: bool,
    /// Writes are rejected.
    pub read_only: bool,
    /// Present for computed members.
    pub getter: Option<Getter>,
    /// Default used when constructing instances.
    pub default: Option<Value>,
    /// Raw attributes in declaration order.
    pub attributes: Vec<Attribute>,
}

impl fmt::Debug for MemberDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDesc")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("read_only", &self.read_only)
            .field("computed", &self.getter.is_some())
            .field("default", &self.default)
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl MemberDesc {
    /// A public, stored instance field.
    pub fn field(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Public,
            is_static: false,
            read_only: false,
            getter: None,
            default: None,
            attributes: Vec::new(),
        }
    }

    /// A read-only member computed from the owning object.
    pub fn computed(
        name: impl Into<String>,
        ty: TypeRef,
        getter: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            read_only: true,
            getter: Some(Arc::new(getter)),
            ..Self::field(name, ty)
        }
    }

    /// Mark non-public.
    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    /// Mark static.
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Set the construction default.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Append an attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Whether the member stores a value in its owner (not computed, not static).
    pub fn is_stored(&self) -> bool {
        self.getter.is_none() && !self.is_static
    }
}

/// Shape of a registered type.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    /// Built-in scalar.
    Scalar,
    /// Struct with members.
    Struct,
    /// Enum with named variants.
    Enum(Vec<String>),
}

/// Description of one registered type.
#[derive(Clone, Debug)]
pub struct TypeDesc {
    /// Type name.
    pub name: String,
    /// Scalar, struct or enum.
    pub kind: TypeKind,
    /// Base type name for structs.
    pub base: Option<String>,
    /// Number of generic parameters; non-zero makes this an open generic definition.
    pub params: usize,
    /// Abstract types cannot be constructed.
    pub is_abstract: bool,
    /// Sealed types cannot be subclassed.
    pub is_sealed: bool,
    /// Members declared on this type (not inherited ones).
    pub members: Vec<MemberDesc>,
    /// Type-level attributes.
    pub attributes: Vec<Attribute>,
}

impl TypeDesc {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            base: None,
            params: 0,
            is_abstract: false,
            is_sealed: false,
            members: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// A struct type.
    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Struct)
    }

    /// An enum type with the given variants.
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut desc = Self::new(
            name,
            TypeKind::Enum(variants.into_iter().map(Into::into).collect()),
        );
        desc.is_sealed = true;
        desc
    }

    fn scalar(name: &str) -> Self {
        let mut desc = Self::new(name, TypeKind::Scalar);
        desc.is_sealed = true;
        desc
    }

    /// Derive from `base`.
    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Declare `params` generic parameters.
    pub fn generic(mut self, params: usize) -> Self {
        self.params = params;
        self
    }

    /// Mark abstract.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark sealed.
    pub fn sealed(mut self) -> Self {
        self.is_sealed = true;
        self
    }

    /// Append a member.
    pub fn member(mut self, member: MemberDesc) -> Self {
        self.members.push(member);
        self
    }

    /// Append a type-level attribute.
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Enum variants, if this is an enum.
    pub fn variants(&self) -> Option<&[String]> {
        match &self.kind {
            TypeKind::Enum(v) => Some(v),
            _ => None,
        }
    }
}

/// Declaration of an attribute kind.
#[derive(Clone, Debug, Default)]
pub struct AttributeDecl {
    /// Attribute kind name.
    pub kind: String,
    /// Meta attributes describe other attributes and are never spliced into members.
    pub meta: bool,
    /// Attributes declared on the attribute kind itself.
    pub attributes: Vec<Attribute>,
}

impl AttributeDecl {
    /// Declare an attribute kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Mark as a meta attribute.
    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Mark as self-including: expansion replaces it by its own attributes.
    pub fn self_including(mut self) -> Self {
        self.attributes.push(Attribute::new(INCLUDE_MY_ATTRIBUTES));
        self
    }

    /// Declare an attribute on this attribute kind.
    pub fn implies(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Whether this kind carries the self-including marker.
    pub fn is_self_including(&self) -> bool {
        self.attributes.iter().any(|a| a.is(INCLUDE_MY_ATTRIBUTES))
    }
}

/// A member found by lookup, with its type specialized for the owning instantiation.
#[derive(Clone, Copy, Debug)]
pub struct MemberRef<'a> {
    /// The member declaration.
    pub desc: &'a MemberDesc,
    /// Name of the type that declares the member.
    pub declaring: &'a str,
}

/// Immutable registry of types and attribute declarations.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDesc>,
    order: Vec<String>,
    attributes: HashMap<String, AttributeDecl>,
}

/// Builder for [`TypeRegistry`].
#[derive(Debug)]
pub struct TypeRegistryBuilder {
    inner: TypeRegistry,
}

impl TypeRegistryBuilder {
    /// Register a type; a later registration with the same name replaces the earlier one.
    pub fn with_type(mut self, desc: TypeDesc) -> Self {
        if !self.inner.types.contains_key(&desc.name) {
            self.inner.order.push(desc.name.clone());
        }
        self.inner.types.insert(desc.name.clone(), desc);
        self
    }

    /// Register an attribute declaration.
    pub fn with_attribute(mut self, decl: AttributeDecl) -> Self {
        self.inner.attributes.insert(decl.kind.clone(), decl);
        self
    }

    /// Finish building.
    pub fn build(self) -> TypeRegistry {
        self.inner
    }
}

impl TypeRegistry {
    /// Start a registry pre-populated with the built-in scalars and meta attributes.
    pub fn builder() -> TypeRegistryBuilder {
        let mut b = TypeRegistryBuilder {
            inner: Self::default(),
        };
        for s in [BOOL, INT, FLOAT, STRING] {
            b = b.with_type(TypeDesc::scalar(s));
        }
        b.with_attribute(AttributeDecl::new(ATTRIBUTE_USAGE).meta())
            .with_attribute(AttributeDecl::new(INCLUDE_MY_ATTRIBUTES).meta())
    }

    /// Type by name.
    pub fn get(&self, name: &str) -> Option<&TypeDesc> {
        self.types.get(name)
    }

    /// Registered types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDesc> + '_ {
        self.order.iter().filter_map(|n| self.types.get(n))
    }

    /// Description of a named type or of a generic instantiation's definition.
    pub fn describe(&self, ty: &TypeRef) -> Option<&TypeDesc> {
        ty.name().and_then(|n| self.get(n))
    }

    /// Attribute declaration by kind.
    pub fn attribute(&self, kind: &str) -> Option<&AttributeDecl> {
        self.attributes.get(kind)
    }

    /// Whether `ty` is a registered enum.
    pub fn is_enum(&self, ty: &TypeRef) -> bool {
        self.describe(ty).and_then(TypeDesc::variants).is_some()
    }

    /// Whether `ty` is a struct (or generic struct instantiation).
    pub fn is_struct(&self, ty: &TypeRef) -> bool {
        self.describe(ty)
            .is_some_and(|d| matches!(d.kind, TypeKind::Struct))
    }

    /// Walk `ty` and its bases, derived first.
    fn chain<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a TypeDesc> + 'a {
        let mut next = self.get(name);
        let mut guard = self.types.len();
        core::iter::from_fn(move || {
            let cur = next?;
            guard = guard.checked_sub(1)?;
            next = cur.base.as_deref().and_then(|b| self.get(b));
            Some(cur)
        })
    }

    /// Find a member of `ty` by name.
    ///
    /// Searches the inheritance chain; an exact-case match anywhere in the chain wins over a
    /// case-insensitive one.
    pub fn find_member(&self, ty: &TypeRef, name: &str) -> Option<MemberRef<'_>> {
        let root = ty.name()?;
        let exact = self.chain(root).find_map(|t| {
            t.members.iter().find(|m| m.name == name).map(|m| MemberRef {
                desc: m,
                declaring: &t.name,
            })
        });
        exact.or_else(|| {
            self.chain(root).find_map(|t| {
                t.members
                    .iter()
                    .find(|m| m.name.eq_ignore_ascii_case(name))
                    .map(|m| MemberRef {
                        desc: m,
                        declaring: &t.name,
                    })
            })
        })
    }

    /// All members of `ty`, base members first; a redeclared member replaces the base one
    /// in place.
    pub fn members_of(&self, ty: &TypeRef) -> Vec<MemberRef<'_>> {
        let Some(root) = ty.name() else {
            return Vec::new();
        };
        let mut chain: Vec<&TypeDesc> = self.chain(root).collect();
        chain.reverse();
        let mut out: Vec<MemberRef<'_>> = Vec::new();
        for t in chain {
            for m in &t.members {
                let r = MemberRef {
                    desc: m,
                    declaring: &t.name,
                };
                match out
                    .iter_mut()
                    .find(|e| e.desc.name.eq_ignore_ascii_case(&m.name))
                {
                    Some(slot) => *slot = r,
                    None => out.push(r),
                }
            }
        }
        out
    }

    /// Type of a member specialized for the instantiation `owner`.
    pub fn member_type(&self, owner: &TypeRef, member: &MemberDesc) -> TypeRef {
        match owner {
            TypeRef::Generic { args, .. } => member.ty.substitute(args),
            _ => member.ty.clone(),
        }
    }

    /// Whether `sub` is `base` or derives from it.
    pub fn is_subtype_of(&self, sub: &str, base: &str) -> bool {
        self.chain(sub).any(|t| t.name == base)
    }

    /// Whether values of `ty` may hold instances of other registered types.
    ///
    /// Sealed structs and generic definitions are closed.
    pub fn is_open(&self, ty: &TypeRef) -> bool {
        self.describe(ty).is_some_and(|d| {
            matches!(d.kind, TypeKind::Struct) && !d.is_sealed && d.params == 0
        })
    }

    /// Concrete, constructible types assignable to `ty`, in registration order.
    ///
    /// A closed type offers only itself, and nothing when it has no default.
    pub fn constructible_subtypes(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let desc = match self.describe(ty) {
            Some(desc) if self.is_open(ty) => desc,
            _ => {
                return match self.default_value(ty) {
                    Some(_) => vec![ty.clone()],
                    None => Vec::new(),
                };
            }
        };
        self.types()
            .filter(|t| {
                matches!(t.kind, TypeKind::Struct)
                    && !t.is_abstract
                    && t.params == 0
                    && self.is_subtype_of(&t.name, &desc.name)
            })
            .map(|t| TypeRef::named(t.name.clone()))
            .collect()
    }

    /// Runtime type of `value` stored in a slot declared as `declared`.
    pub fn runtime_type(&self, value: &Value, declared: &TypeRef) -> TypeRef {
        match value {
            Value::Object(o) if self.describe(o.ty()).is_some() => o.ty().clone(),
            _ => declared.clone(),
        }
    }

    /// Whether `value` may be stored in a slot declared as `ty`.
    pub fn accepts_value(&self, ty: &TypeRef, value: &Value) -> bool {
        match (ty, value) {
            (TypeRef::Param(_), _) => true,
            (TypeRef::List(e), Value::List(items)) => items.iter().all(|v| self.accepts_value(e, v)),
            (TypeRef::Array(e, n), Value::List(items)) => {
                items.len() == *n && items.iter().all(|v| self.accepts_value(e, v))
            }
            (TypeRef::Named(n), v) => match n.as_str() {
                BOOL => matches!(v, Value::Bool(_)),
                INT => matches!(v, Value::Int(_)),
                FLOAT => matches!(v, Value::Float(_) | Value::Int(_)),
                STRING => matches!(v, Value::Str(_)),
                other => match (self.get(other), v) {
                    (Some(d), Value::Enum(variant)) => {
                        d.variants().is_some_and(|vs| vs.contains(variant))
                    }
                    (Some(d), Value::Null) => matches!(d.kind, TypeKind::Struct),
                    (Some(_), Value::Object(o)) => o
                        .ty()
                        .name()
                        .is_some_and(|sub| self.is_subtype_of(sub, other)),
                    _ => false,
                },
            },
            (TypeRef::Generic { .. }, Value::Object(o)) => o.ty() == ty,
            (TypeRef::Generic { .. }, Value::Null) => true,
            _ => false,
        }
    }

    /// Default instance of `ty`; `None` for abstract or unknown types.
    pub fn default_value(&self, ty: &TypeRef) -> Option<Value> {
        self.default_value_guarded(ty, &mut Vec::new())
    }

    fn default_value_guarded(&self, ty: &TypeRef, building: &mut Vec<String>) -> Option<Value> {
        match ty {
            TypeRef::Param(_) => None,
            TypeRef::List(_) => Some(Value::List(Vec::new())),
            TypeRef::Array(e, n) => {
                let item = self
                    .default_value_guarded(e, building)
                    .unwrap_or(Value::Null);
                Some(Value::List(vec![item; *n]))
            }
            TypeRef::Named(n) => match n.as_str() {
                BOOL => Some(Value::Bool(false)),
                INT => Some(Value::Int(0)),
                FLOAT => Some(Value::Float(0.0)),
                STRING => Some(Value::Str(String::new())),
                _ => self.default_instance(ty, building),
            },
            TypeRef::Generic { .. } => self.default_instance(ty, building),
        }
    }

    fn default_instance(&self, ty: &TypeRef, building: &mut Vec<String>) -> Option<Value> {
        let desc = self.describe(ty)?;
        match &desc.kind {
            TypeKind::Scalar => None,
            TypeKind::Enum(variants) => variants.first().cloned().map(Value::Enum),
            TypeKind::Struct => {
                if desc.is_abstract {
                    return None;
                }
                let key = ty.to_string();
                if building.contains(&key) {
                    // Self-referential struct: break the cycle with a null reference.
                    return Some(Value::Null);
                }
                building.push(key);
                let mut obj = Object::new(ty.clone());
                for m in self.members_of(ty) {
                    if !m.desc.is_stored() {
                        continue;
                    }
                    let value = match &m.desc.default {
                        Some(v) => v.clone(),
                        None => {
                            let mty = self.member_type(ty, m.desc);
                            self.default_value_guarded(&mty, building)
                                .unwrap_or(Value::Null)
                        }
                    };
                    obj.set_field(m.desc.name.clone(), value);
                }
                building.pop();
                Some(Value::Object(obj))
            }
        }
    }
}
