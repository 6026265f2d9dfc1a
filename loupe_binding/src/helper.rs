// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`MemberHelper`]: a typed value that is either a literal or bound to the object graph.

use core::fmt;

use kurbo::Rect;
use loupe_path::{FromValue, LocationId, ResolveError, Resolver, TypeRef, Value};

use crate::error::BindingError;
use crate::expression::{CompiledExpression, ExpressionContext, ExpressionEvaluator};

/// What a binding evaluates against: the resolver and, optionally, an expression evaluator.
#[derive(Debug)]
pub struct Scope<'a> {
    /// The resolver owning the context location.
    pub resolver: &'a mut Resolver,
    /// Evaluator for `@` bindings.
    pub evaluator: Option<&'a dyn ExpressionEvaluator>,
}

impl<'a> Scope<'a> {
    /// A scope without an expression evaluator.
    pub fn new(resolver: &'a mut Resolver) -> Self {
        Self {
            resolver,
            evaluator: None,
        }
    }

    /// Install an expression evaluator.
    pub fn with_evaluator(mut self, evaluator: &'a dyn ExpressionEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }
}

/// Where binding errors are shown.
pub trait ErrorSink {
    /// Error the sink may raise, e.g. a pass abort.
    type Error;

    /// Show `message` inside `rect`, or in freshly claimed space when `rect` is `None`.
    fn error_line(&mut self, rect: Option<Rect>, message: &str) -> Result<(), Self::Error>;
}

/// A leading keyword of a `$` binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Hop {
    /// `parent`: one level up.
    Parent,
    /// `root`: the chain root.
    Root,
    /// `property` or `value`: the context location itself.
    Value,
}

impl Hop {
    fn keyword(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "parent" => Some(Self::Parent),
            "root" => Some(Self::Root),
            "property" | "value" => Some(Self::Value),
            _ => None,
        }
    }
}

/// Parsed binding source.
#[derive(Clone, Debug, PartialEq)]
pub enum Source<T> {
    /// A fixed value.
    Literal(T),
    /// `$hops.remainder`.
    Parameter {
        /// Leading keywords in order.
        hops: Vec<Hop>,
        /// Member path resolved after the hops; may be empty.
        remainder: String,
    },
    /// `@expression`.
    Expression(String),
}

fn parse_parameter(text: &str) -> Result<(Vec<Hop>, String), BindingError> {
    let mut parts = text.split('.').peekable();
    let mut hops = Vec::new();
    while let Some(hop) = parts.peek().and_then(|p| Hop::keyword(p)) {
        hops.push(hop);
        parts.next();
    }
    let remainder = parts.collect::<Vec<_>>().join(".");
    if hops.is_empty() && remainder.is_empty() {
        return Err(BindingError::Syntax(format!("${text}")));
    }
    Ok((hops, remainder))
}

enum Bound {
    Location(LocationId),
    Expression(Box<dyn CompiledExpression>),
}

/// Identity of what a binding was resolved against.
#[derive(Clone, Debug, PartialEq)]
struct BindKey {
    context: LocationId,
    ty: loupe_path::TypeRef,
}

/// A typed value declared by an attribute argument.
///
/// The input string selects the mode:
///
/// - `@expr` compiles `expr` with the scope's [`ExpressionEvaluator`].
/// - `$name` reads the sibling member `name` of the drawn member. Leading keywords move the
///   starting point first: `$parent.x`, `$root.x`, `$value.x` (alias `$property.x`).
///   A bare `$parent`, `$root` or `$value` binds to that location itself.
/// - Anything else is a literal, which only works when `T` holds strings.
///
/// Errors are sticky: once set, fetches return `T::default()` until the context location's
/// resolved type changes, which rebinds and clears the error. Malformed input never recovers.
///
/// Strict fetches also check the bound member's declared type with [`FromValue::accepts`];
/// lenient fetches only require the value to coerce.
pub struct MemberHelper<T> {
    source: Source<T>,
    error: Option<BindingError>,
    malformed: bool,
    key: Option<BindKey>,
    bound: Option<Bound>,
    cache: Option<(u64, LocationId, Value)>,
}

impl<T: fmt::Debug> fmt::Debug for MemberHelper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberHelper")
            .field("source", &self.source)
            .field("error", &self.error)
            .field("bound", &self.bound.is_some())
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: FromValue> MemberHelper<T> {
    /// Parse `input` into a binding.
    pub fn new(input: &str) -> Self {
        let (source, error) = if let Some(expr) = input.strip_prefix('@') {
            (Source::Expression(expr.trim().to_owned()), None)
        } else if let Some(param) = input.strip_prefix('$') {
            match parse_parameter(param.trim()) {
                Ok((hops, remainder)) => (Source::Parameter { hops, remainder }, None),
                Err(err) => (
                    Source::Parameter {
                        hops: Vec::new(),
                        remainder: String::new(),
                    },
                    Some(err),
                ),
            }
        } else {
            match T::from_value(&Value::Str(input.to_owned())) {
                Some(v) => (Source::Literal(v), None),
                None => (
                    Source::Literal(T::default()),
                    Some(BindingError::TypeMismatch {
                        expected: T::TYPE_NAME,
                        found: format!("string literal {input:?}"),
                    }),
                ),
            }
        };
        if let Some(err) = &error {
            tracing::warn!(%err, input, "binding rejected");
        }
        Self {
            source,
            malformed: error.is_some(),
            error,
            key: None,
            bound: None,
            cache: None,
        }
    }

    /// A literal of any type.
    pub fn literal(value: T) -> Self {
        Self {
            source: Source::Literal(value),
            error: None,
            malformed: false,
            key: None,
            bound: None,
            cache: None,
        }
    }

    /// The parsed source.
    pub fn source(&self) -> &Source<T> {
        &self.source
    }

    /// Whether the value is computed from the graph (`$` or `@` input).
    pub fn is_dynamic_string(&self) -> bool {
        !matches!(self.source, Source::Literal(_))
    }

    /// The sticky error message, if resolution failed.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// The sticky error, if resolution failed.
    pub fn error(&self) -> Option<&BindingError> {
        self.error.as_ref()
    }

    /// The location a `$` binding is currently bound to.
    pub fn target(&self) -> Option<LocationId> {
        match self.bound {
            Some(Bound::Location(id)) => Some(id),
            _ => None,
        }
    }

    /// Strictly typed value for `context`, cached for the frame.
    pub fn get_value(&mut self, scope: &mut Scope<'_>, context: LocationId) -> T {
        self.typed(scope, context, false, true)
    }

    /// Leniently coerced value for `context`, cached for the frame.
    pub fn get_smart_value(&mut self, scope: &mut Scope<'_>, context: LocationId) -> T {
        self.typed(scope, context, false, false)
    }

    /// Strictly typed value for `context`, bypassing the frame cache.
    pub fn force_get_value(&mut self, scope: &mut Scope<'_>, context: LocationId) -> T {
        self.typed(scope, context, true, true)
    }

    /// Show the sticky error through `sink`; returns whether anything was shown.
    pub fn draw_error<S: ErrorSink + ?Sized>(
        &self,
        sink: &mut S,
        rect: Option<Rect>,
    ) -> Result<bool, S::Error> {
        match &self.error {
            Some(err) => {
                sink.error_line(rect, &err.to_string())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn typed(
        &mut self,
        scope: &mut Scope<'_>,
        context: LocationId,
        force: bool,
        strict: bool,
    ) -> T {
        if let Source::Literal(v) = &self.source {
            return if self.error.is_some() {
                T::default()
            } else {
                v.clone()
            };
        }
        let Some(raw) = self.fetch(scope, context, force) else {
            return T::default();
        };
        if strict {
            if let Some(declared) = self.rejected_declared_type(scope) {
                self.fail(BindingError::TypeMismatch {
                    expected: T::TYPE_NAME,
                    found: format!("member of type `{declared}`"),
                });
                return T::default();
            }
        }
        let convert = if strict { T::from_value } else { T::coerce };
        match convert(&raw) {
            Some(v) => v,
            None => {
                self.fail(BindingError::TypeMismatch {
                    expected: T::TYPE_NAME,
                    found: raw.kind_name().to_owned(),
                });
                T::default()
            }
        }
    }

    /// Declared type of the bound member when it cannot produce `T`.
    fn rejected_declared_type(&self, scope: &Scope<'_>) -> Option<TypeRef> {
        let Some(Bound::Location(id)) = self.bound else {
            return None;
        };
        let declared = scope.resolver.location(id)?.declared_type();
        if matches!(declared, TypeRef::Param(_)) || T::accepts(declared) {
            None
        } else {
            Some(declared.clone())
        }
    }

    fn fail(&mut self, err: BindingError) {
        tracing::warn!(%err, "binding failed");
        self.error = Some(err);
        self.cache = None;
    }

    /// Raw value of a dynamic binding, honoring the sticky error and the frame cache.
    fn fetch(&mut self, scope: &mut Scope<'_>, context: LocationId, force: bool) -> Option<Value> {
        if self.malformed {
            return None;
        }
        if let Err(err) = scope.resolver.ensure_valid(context) {
            self.fail(err.into());
            self.key = None;
            return None;
        }
        let key = scope.resolver.location(context).map(|l| BindKey {
            context,
            ty: l.resolved_type().clone(),
        });
        if key != self.key {
            if self.key.is_some() {
                tracing::debug!("context changed, rebinding");
            }
            self.key = key;
            self.bound = None;
            self.cache = None;
            self.error = None;
        }
        if self.error.is_some() {
            return None;
        }
        let frame = scope.resolver.frame();
        if !force {
            if let Some((f, c, v)) = &self.cache {
                if *f == frame && *c == context {
                    return Some(v.clone());
                }
            }
        }
        match self.evaluate(scope, context) {
            Ok(v) => {
                self.cache = Some((frame, context, v.clone()));
                Some(v)
            }
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn evaluate(&mut self, scope: &mut Scope<'_>, context: LocationId) -> Result<Value, BindingError> {
        let stale = match &self.bound {
            Some(Bound::Location(id)) => !scope.resolver.is_alive(*id),
            Some(Bound::Expression(_)) => false,
            None => true,
        };
        if stale {
            self.bound = Some(self.bind(scope, context)?);
        }
        match &self.bound {
            Some(Bound::Location(id)) => Ok(scope.resolver.get_value(*id)?),
            Some(Bound::Expression(expr)) => {
                let value = scope.resolver.get_value(context)?;
                let path = scope
                    .resolver
                    .location(context)
                    .map(|l| l.path().to_owned())
                    .unwrap_or_default();
                let cx = ExpressionContext {
                    location: context,
                    path: &path,
                    value: &value,
                };
                expr.evaluate(&cx).map_err(|message| BindingError::Expression {
                    expression: self.expression_text(),
                    message,
                })
            }
            None => Err(BindingError::Syntax(String::new())),
        }
    }

    fn expression_text(&self) -> String {
        match &self.source {
            Source::Expression(e) => e.clone(),
            _ => String::new(),
        }
    }

    fn bind(&self, scope: &mut Scope<'_>, context: LocationId) -> Result<Bound, BindingError> {
        match &self.source {
            Source::Literal(_) => Err(BindingError::Syntax(String::new())),
            Source::Expression(text) => {
                let evaluator = scope.evaluator.ok_or(BindingError::ExpressionUnsupported)?;
                evaluator
                    .compile(text)
                    .map(Bound::Expression)
                    .map_err(|message| BindingError::Expression {
                        expression: text.clone(),
                        message,
                    })
            }
            Source::Parameter { hops, remainder } => {
                let resolver = &mut *scope.resolver;
                let mut cursor = if hops.is_empty() {
                    owner(resolver, context)
                } else {
                    context
                };
                for hop in hops {
                    cursor = match hop {
                        Hop::Parent => owner(resolver, cursor),
                        Hop::Root => resolver.root(),
                        Hop::Value => cursor,
                    };
                }
                if remainder.is_empty() {
                    return Ok(Bound::Location(cursor));
                }
                match resolver.resolve_from(cursor, remainder) {
                    Ok(id) => Ok(Bound::Location(id)),
                    Err(ResolveError::MemberNotFound { .. }) => Err(BindingError::MemberNotFound {
                        from: resolver
                            .location(cursor)
                            .map(|l| l.path().to_owned())
                            .unwrap_or_default(),
                        member: remainder.clone(),
                    }),
                    Err(err) => Err(BindingError::Resolve(err)),
                }
            }
        }
    }
}

/// The location that owns `id`, one level up.
///
/// An element whose type equals its collection's declared element type sits below a
/// synthetic collection level; that level is skipped. Elements that are themselves
/// collections do not skip.
pub fn owner(resolver: &Resolver, id: LocationId) -> LocationId {
    let Some(loc) = resolver.location(id) else {
        return id;
    };
    let Some(parent) = loc.parent() else {
        return id;
    };
    if loc.array_index().is_some() && !loc.declared_type().is_collection() {
        if let Some(container) = resolver.location(parent) {
            let same = container.declared_type().element_type() == Some(loc.declared_type());
            if same {
                return container.parent().unwrap_or(parent);
            }
        }
    }
    parent
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use loupe_path::{MemberDesc, Object, ObjectStore, TypeDesc, TypeRef, TypeRegistry};

    use super::*;
    use crate::error::EXPRESSIONS_UNSUPPORTED;

    fn registry() -> Arc<TypeRegistry> {
        Arc::new(
            TypeRegistry::builder()
                .with_type(
                    TypeDesc::structure("Item")
                        .member(MemberDesc::field("label", TypeRef::string()))
                        .member(MemberDesc::field("name", TypeRef::string()))
                        .member(MemberDesc::field("count", TypeRef::int())),
                )
                .with_type(TypeDesc::structure("Shape").abstract_type())
                .with_type(
                    TypeDesc::structure("Circle")
                        .extends("Shape")
                        .member(MemberDesc::field("radius", TypeRef::float())),
                )
                .with_type(
                    TypeDesc::structure("Square")
                        .extends("Shape")
                        .member(MemberDesc::field("side", TypeRef::float())),
                )
                .with_type(
                    TypeDesc::structure("Root")
                        .member(MemberDesc::field("name", TypeRef::string()))
                        .member(MemberDesc::field("items", TypeRef::list(TypeRef::named("Item"))))
                        .member(MemberDesc::field("shape", TypeRef::named("Shape")))
                        .member(MemberDesc::field("visible", TypeRef::bool())),
                )
                .build(),
        )
    }

    fn circle() -> Value {
        Object::new(TypeRef::named("Circle")).with("radius", 2.0).into()
    }

    fn resolver() -> Resolver {
        let reg = registry();
        let item = Object::new(TypeRef::named("Item"))
            .with("label", "a")
            .with("name", "root")
            .with("count", 3);
        let root = Object::new(TypeRef::named("Root"))
            .with("name", "top")
            .with("items", vec![Value::from(item)])
            .with("shape", circle())
            .with("visible", true);
        let store = ObjectStore::new(&reg, root);
        Resolver::new(reg, store)
    }

    #[test]
    fn parent_reaches_owning_element() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let mut scope = Scope::new(&mut r);
        let mut helper = MemberHelper::<String>::new("$parent.name");
        assert!(helper.is_dynamic_string());
        assert_eq!(helper.get_value(&mut scope, label), "root");
        assert_eq!(helper.error_message(), None);
    }

    #[test]
    fn bare_member_is_a_sibling() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let mut scope = Scope::new(&mut r);
        let mut helper = MemberHelper::<String>::new("$name");
        assert_eq!(helper.get_value(&mut scope, label), "root");
    }

    #[test]
    fn parent_skips_the_collection_level() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let mut scope = Scope::new(&mut r);
        let mut up2 = MemberHelper::<String>::new("$parent.parent.name");
        assert_eq!(up2.get_value(&mut scope, label), "top");
        let mut root = MemberHelper::<String>::new("$root.name");
        assert_eq!(root.get_value(&mut scope, label), "top");
    }

    #[test]
    fn bare_keywords_bind_to_locations() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let element = r.resolve("items[0]").unwrap();
        let mut scope = Scope::new(&mut r);
        let mut value = MemberHelper::<String>::new("$value");
        assert_eq!(value.get_value(&mut scope, label), "a");
        let mut parent = MemberHelper::<Value>::new("$parent");
        parent.get_value(&mut scope, label);
        assert_eq!(parent.target(), Some(element));
    }

    #[test]
    fn literal_strings_are_static() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let mut scope = Scope::new(&mut r);
        let mut helper = MemberHelper::<String>::new("Hello");
        assert!(!helper.is_dynamic_string());
        assert_eq!(helper.get_value(&mut scope, label), "Hello");
        assert_eq!(helper.force_get_value(&mut scope, label), "Hello");
    }

    #[test]
    fn literal_of_non_string_type_is_a_type_mismatch() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let mut scope = Scope::new(&mut r);
        let mut helper = MemberHelper::<bool>::new("true");
        assert!(matches!(helper.error(), Some(BindingError::TypeMismatch { .. })));
        assert!(!helper.get_value(&mut scope, label));
        let mut typed = MemberHelper::literal(true);
        assert!(typed.get_value(&mut scope, label));
    }

    #[test]
    fn expressions_need_an_evaluator() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let mut scope = Scope::new(&mut r);
        let mut helper = MemberHelper::<String>::new("@value.ToUpper()");
        assert!(helper.is_dynamic_string());
        assert_eq!(helper.get_value(&mut scope, label), "");
        assert_eq!(
            helper.error_message().as_deref(),
            Some(EXPRESSIONS_UNSUPPORTED)
        );
    }

    struct Upper;

    impl ExpressionEvaluator for Upper {
        fn compile(&self, source: &str) -> Result<Box<dyn CompiledExpression>, String> {
            if source != "upper" {
                return Err(format!("unknown expression {source}"));
            }
            Ok(Box::new(
                |cx: &ExpressionContext<'_>| -> Result<Value, String> {
                    Ok(Value::from(cx.value.to_string().to_uppercase()))
                },
            ))
        }
    }

    #[test]
    fn expressions_evaluate_against_the_context() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let upper = Upper;
        let mut scope = Scope::new(&mut r).with_evaluator(&upper);
        let mut helper = MemberHelper::<String>::new("@upper");
        assert_eq!(helper.get_value(&mut scope, label), "A");
        let mut broken = MemberHelper::<String>::new("@nope");
        assert_eq!(broken.get_value(&mut scope, label), "");
        assert!(matches!(broken.error(), Some(BindingError::Expression { .. })));
    }

    #[test]
    fn errors_are_sticky() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let mut helper = MemberHelper::<String>::new("$missing");
        {
            let mut scope = Scope::new(&mut r);
            assert_eq!(helper.get_value(&mut scope, label), "");
        }
        assert!(matches!(
            helper.error(),
            Some(BindingError::MemberNotFound { .. })
        ));
        r.new_frame();
        let mut scope = Scope::new(&mut r);
        assert_eq!(helper.get_value(&mut scope, label), "");
        assert!(helper.error().is_some());
    }

    #[test]
    fn smart_value_coerces_and_strict_does_not() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let mut scope = Scope::new(&mut r);
        let mut smart = MemberHelper::<String>::new("$count");
        assert_eq!(smart.get_smart_value(&mut scope, label), "3");
        let mut strict = MemberHelper::<String>::new("$count");
        assert_eq!(strict.get_value(&mut scope, label), "");
        assert!(matches!(strict.error(), Some(BindingError::TypeMismatch { .. })));
        let mut wide = MemberHelper::<f64>::new("$count");
        assert_eq!(wide.get_smart_value(&mut scope, label), 3.0);
    }

    #[test]
    fn values_are_cached_per_frame() {
        let mut r = resolver();
        let visible = r.resolve("visible").unwrap();
        let name = r.resolve("name").unwrap();
        let mut helper = MemberHelper::<bool>::new("$visible");
        assert!(helper.get_value(&mut Scope::new(&mut r), name));
        r.set_value(visible, Value::Bool(false)).unwrap();
        assert!(helper.get_value(&mut Scope::new(&mut r), name));
        assert!(!helper.force_get_value(&mut Scope::new(&mut r), name));
        r.set_value(visible, Value::Bool(true)).unwrap();
        r.new_frame();
        assert!(helper.get_value(&mut Scope::new(&mut r), name));
    }

    #[test]
    fn rebinds_when_the_context_type_changes() {
        let mut r = resolver();
        let shape = r.resolve("shape").unwrap();
        let mut helper = MemberHelper::<f64>::new("$value.radius");
        assert_eq!(helper.get_value(&mut Scope::new(&mut r), shape), 2.0);

        let square = Object::new(TypeRef::named("Square")).with("side", 1.0);
        r.set_value(shape, square.into()).unwrap();
        r.new_frame();
        assert_eq!(helper.get_value(&mut Scope::new(&mut r), shape), 0.0);
        assert!(matches!(
            helper.error(),
            Some(BindingError::MemberNotFound { .. })
        ));

        r.set_value(shape, circle()).unwrap();
        r.new_frame();
        assert_eq!(helper.get_value(&mut Scope::new(&mut r), shape), 2.0);
        assert!(helper.error().is_none());
    }

    struct Lines(Vec<String>);

    impl ErrorSink for Lines {
        type Error = ();

        fn error_line(&mut self, _rect: Option<Rect>, message: &str) -> Result<(), ()> {
            self.0.push(message.to_owned());
            Ok(())
        }
    }

    #[test]
    fn draw_error_reports_through_the_sink() {
        let helper = MemberHelper::<String>::new("$");
        let mut sink = Lines(Vec::new());
        assert_eq!(helper.draw_error(&mut sink, None), Ok(true));
        assert_eq!(sink.0, ["invalid binding `$`"]);
        let ok = MemberHelper::<String>::new("fine");
        assert_eq!(ok.draw_error(&mut sink, None), Ok(false));
    }

    #[test]
    fn malformed_input_never_binds() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let mut helper = MemberHelper::<Value>::new("$");
        for _ in 0..2 {
            assert_eq!(helper.get_value(&mut Scope::new(&mut r), label), Value::Null);
            assert!(matches!(helper.error(), Some(BindingError::Syntax(_))));
            assert_eq!(helper.target(), None);
            r.new_frame();
        }
        assert_eq!(helper.force_get_value(&mut Scope::new(&mut r), label), Value::Null);
        assert_eq!(helper.error_message().as_deref(), Some("invalid binding `$`"));
    }

    #[test]
    fn strict_fetch_checks_the_declared_type() {
        let mut r = resolver();
        let label = r.resolve("items[0].label").unwrap();
        let mut strict = MemberHelper::<bool>::new("$count");
        assert!(!strict.get_value(&mut Scope::new(&mut r), label));
        assert_eq!(
            strict.error_message().as_deref(),
            Some("expected a bool value, found member of type `int`")
        );
        let mut lenient = MemberHelper::<bool>::new("$count");
        assert!(lenient.get_smart_value(&mut Scope::new(&mut r), label));
        assert_eq!(lenient.error(), None);
    }
}
