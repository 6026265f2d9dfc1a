// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type references and attribute instances.
//!
//! ## Overview
//!
//! A [`TypeRef`] names a type known to the [`TypeRegistry`](crate::registry::TypeRegistry):
//! a scalar, struct or enum by name, a collection of some element type, or a generic
//! definition instantiated with concrete arguments.
//! An [`Attribute`] is one piece of metadata attached to a member or to another attribute
//! declaration.

use std::fmt;

use crate::value::Value;

/// Name of the built-in boolean scalar.
pub const BOOL: &str = "bool";
/// Name of the built-in integer scalar.
pub const INT: &str = "int";
/// Name of the built-in floating point scalar.
pub const FLOAT: &str = "float";
/// Name of the built-in string scalar.
pub const STRING: &str = "string";

/// Reference to a type, possibly a collection or a generic instantiation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A registered scalar, struct or enum type.
    Named(String),
    /// A growable list of elements.
    List(Box<TypeRef>),
    /// A fixed-size array of elements.
    Array(Box<TypeRef>, usize),
    /// A generic definition instantiated with concrete type arguments.
    Generic {
        /// Name of the registered generic definition.
        definition: String,
        /// Concrete arguments, one per declared parameter.
        args: Vec<TypeRef>,
    },
    /// The `n`th type parameter of the enclosing generic definition.
    Param(usize),
}

impl TypeRef {
    /// Reference a registered type by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// A growable list of `element`.
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    /// A fixed-size array of `len` elements.
    pub fn array(element: Self, len: usize) -> Self {
        Self::Array(Box::new(element), len)
    }

    /// Instantiate the generic `definition` with `args`.
    pub fn generic(definition: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Generic {
            definition: definition.into(),
            args,
        }
    }

    /// The built-in boolean type.
    pub fn bool() -> Self {
        Self::named(BOOL)
    }

    /// The built-in integer type.
    pub fn int() -> Self {
        Self::named(INT)
    }

    /// The built-in float type.
    pub fn float() -> Self {
        Self::named(FLOAT)
    }

    /// The built-in string type.
    pub fn string() -> Self {
        Self::named(STRING)
    }

    /// Name of a [`TypeRef::Named`] type, or the definition name of a generic instantiation.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(n) => Some(n),
            Self::Generic { definition, .. } => Some(definition),
            _ => None,
        }
    }

    /// Whether this type has collection semantics (list or array).
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Array(..))
    }

    /// Whether this is a built-in scalar.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Named(n) if is_scalar_name(n))
    }

    /// Element type of a collection.
    pub fn element_type(&self) -> Option<&Self> {
        match self {
            Self::List(e) | Self::Array(e, _) => Some(e),
            _ => None,
        }
    }

    /// Length of a fixed-size array type.
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            Self::Array(_, n) => Some(*n),
            _ => None,
        }
    }

    /// Replace every [`TypeRef::Param`] with the matching entry of `args`.
    ///
    /// Parameters without a matching argument are left in place.
    pub fn substitute(&self, args: &[Self]) -> Self {
        match self {
            Self::Param(i) => args.get(*i).cloned().unwrap_or(Self::Param(*i)),
            Self::Named(_) => self.clone(),
            Self::List(e) => Self::List(Box::new(e.substitute(args))),
            Self::Array(e, n) => Self::Array(Box::new(e.substitute(args)), *n),
            Self::Generic {
                definition,
                args: inner,
            } => Self::Generic {
                definition: definition.clone(),
                args: inner.iter().map(|a| a.substitute(args)).collect(),
            },
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => f.write_str(n),
            Self::List(e) => write!(f, "List<{e}>"),
            Self::Array(e, n) => write!(f, "{e}[{n}]"),
            Self::Generic { definition, args } => {
                write!(f, "{definition}<")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(">")
            }
            Self::Param(i) => write!(f, "T{i}"),
        }
    }
}

pub(crate) fn is_scalar_name(name: &str) -> bool {
    matches!(name, BOOL | INT | FLOAT | STRING)
}

/// Member visibility, mirroring the public/non-public split of host reflection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible to any caller.
    #[default]
    Public,
    /// Private or internal; still resolvable by path.
    NonPublic,
}

/// One attribute instance: a kind name plus positional arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    /// Attribute kind, e.g. `"ShowIf"`.
    pub kind: String,
    /// Positional arguments in declaration order.
    pub args: Vec<Value>,
}

impl Attribute {
    /// Create an attribute without arguments.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Whether this attribute is of `kind`.
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Positional argument `i`.
    pub fn arg(&self, i: usize) -> Option<&Value> {
        self.args.get(i)
    }

    /// Positional argument `i` as a string.
    pub fn str_arg(&self, i: usize) -> Option<&str> {
        self.arg(i).and_then(Value::as_str)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            for (i, a) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{a:?}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}
