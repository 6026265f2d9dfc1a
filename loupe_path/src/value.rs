// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic values: the object graph being inspected.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{FLOAT, INT, STRING, TypeRef};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an object instance.
///
/// Every [`Object::new`] call yields a fresh identity; clones keep it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn fresh() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A struct instance with a runtime type and ordered fields.
#[derive(Clone, Debug)]
pub struct Object {
    id: ObjectId,
    ty: TypeRef,
    fields: Vec<(String, Value)>,
}

impl Object {
    /// Create an empty instance of `ty` with a fresh identity.
    pub fn new(ty: TypeRef) -> Self {
        Self {
            id: ObjectId::fresh(),
            ty,
            fields: Vec::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(name, value.into());
        self
    }

    /// Identity of this instance.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Runtime type of this instance.
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Field by exact name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Mutable field by exact name.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Replace a field's value, appending the field if it does not exist yet.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.field_mut(&name) {
            Some(slot) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }
}

/// Structural equality; identity is compared with [`Object::id`].
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.fields == other.fields
    }
}

/// A dynamically typed value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absent reference.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating point scalar.
    Float(f64),
    /// String scalar.
    Str(String),
    /// Enum variant by name.
    Enum(String),
    /// Ordered collection.
    List(Vec<Value>),
    /// Struct instance.
    Object(Object),
}

impl Value {
    /// Short name of the value's shape, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => INT,
            Self::Float(_) => FLOAT,
            Self::Str(_) => STRING,
            Self::Enum(_) => "enum",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }

    /// Boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float payload; integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            #[allow(
                clippy::cast_precision_loss,
                reason = "Widening for display and coercion only."
            )]
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// String payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// List payload.
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Mutable list payload.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Self>> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Object payload.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Mutable object payload.
    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Identity of an object value.
    pub fn identity(&self) -> Option<ObjectId> {
        self.as_object().map(Object::id)
    }

    /// Length of a list value.
    pub fn len(&self) -> Option<usize> {
        self.as_list().map(<[Self]>::len)
    }

    /// Widen an integer to a float; anything else is returned unchanged.
    pub fn widened(self) -> Self {
        match self {
            Self::Int(_) => self.as_float().map_or(self, Self::Float),
            other => other,
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) | Self::Enum(s) => f.write_str(s),
            Self::List(l) => write!(f, "[{} items]", l.len()),
            Self::Object(o) => write!(f, "{}", o.ty()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

/// Typed extraction from a [`Value`].
///
/// `from_value` is strict: the value must already have the requested shape.
/// `coerce` is lenient: numbers widen and scalars render to strings.
pub trait FromValue: Sized + Clone + Default {
    /// Name used in diagnostics.
    const TYPE_NAME: &'static str;

    /// Strict conversion.
    fn from_value(value: &Value) -> Option<Self>;

    /// Lenient conversion; defaults to [`FromValue::from_value`].
    fn coerce(value: &Value) -> Option<Self> {
        Self::from_value(value)
    }

    /// Whether a member declared as `ty` can produce this type.
    fn accepts(ty: &TypeRef) -> bool;
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::Null => Some(false),
            Value::Object(_) => Some(true),
            Value::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn accepts(ty: &TypeRef) -> bool {
        *ty == TypeRef::bool()
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }

    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Only integral floats are coerced."
            )]
            Value::Float(f) if f.fract() == 0.0 => Some(*f as Self),
            Value::Bool(b) => Some((*b).into()),
            Value::Str(s) => s.parse().ok(),
            Value::List(l) => Self::try_from(l.len()).ok(),
            _ => None,
        }
    }

    fn accepts(ty: &TypeRef) -> bool {
        *ty == TypeRef::int()
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => s.parse().ok(),
            other => other.as_float(),
        }
    }

    fn accepts(ty: &TypeRef) -> bool {
        *ty == TypeRef::float() || *ty == TypeRef::int()
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::List(_) | Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    fn accepts(ty: &TypeRef) -> bool {
        matches!(ty, TypeRef::Named(_))
    }
}

impl FromValue for Vec<Value> {
    const TYPE_NAME: &'static str = "list";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list().map(<[Value]>::to_vec)
    }

    fn accepts(ty: &TypeRef) -> bool {
        ty.is_collection()
    }
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn accepts(_ty: &TypeRef) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objects_get_fresh_identities_and_clones_keep_them() {
        let a = Object::new(TypeRef::named("Item"));
        let b = Object::new(TypeRef::named("Item"));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
        // Structural equality ignores identity.
        assert_eq!(a, b);
    }

    #[test]
    fn set_field_replaces_or_appends() {
        let mut o = Object::new(TypeRef::named("Item")).with("label", "a");
        o.set_field("label", Value::from("b"));
        o.set_field("name", Value::from("n"));
        assert_eq!(o.fields().len(), 2);
        assert_eq!(o.field("label"), Some(&Value::from("b")));
        assert_eq!(o.field("missing"), None);
    }

    #[test]
    fn strict_and_lenient_conversion() {
        assert_eq!(f64::from_value(&Value::Int(2)), None);
        assert_eq!(f64::coerce(&Value::Int(2)), Some(2.0));
        assert_eq!(String::from_value(&Value::Int(7)), None);
        assert_eq!(String::coerce(&Value::Int(7)), Some("7".to_owned()));
        assert_eq!(i64::coerce(&Value::Float(3.0)), Some(3));
        assert_eq!(i64::coerce(&Value::Float(3.5)), None);
        assert_eq!(bool::coerce(&Value::Null), Some(false));
        assert_eq!(
            Vec::<Value>::from_value(&Value::List(vec![Value::Int(1)])),
            Some(vec![Value::Int(1)])
        );
    }

    #[test]
    fn accepts_by_declared_type() {
        assert!(bool::accepts(&TypeRef::bool()));
        assert!(!bool::accepts(&TypeRef::int()));
        assert!(f64::accepts(&TypeRef::int()));
        assert!(String::accepts(&TypeRef::named("Mode")));
        assert!(!String::accepts(&TypeRef::list(TypeRef::string())));
        assert!(Vec::<Value>::accepts(&TypeRef::array(TypeRef::int(), 2)));
    }
}
