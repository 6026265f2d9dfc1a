// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path resolution, location caching and value access.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AccessError, AccessResult, ResolveError, ResolveResult};
use crate::location::{Arena, Location, LocationId, MemberInfo, Stamp};
use crate::path::{self, MemberAccess, Segment, Step};
use crate::registry::TypeRegistry;
use crate::store::{Store, StoreKind};
use crate::types::{FLOAT, TypeRef};
use crate::value::Value;

/// Resolves paths into locations over one backing store and reads/writes through them.
///
/// Locations are created lazily, cached by path, and re-validated once per frame: when the
/// length of a collection or the identity of an object along a chain changes, the cached
/// locations below it are dropped and rebuilt on next resolution.
pub struct Resolver {
    registry: Arc<TypeRegistry>,
    store: Box<dyn Store>,
    arena: Arena,
    by_path: HashMap<String, LocationId>,
    root: LocationId,
    frame: u64,
    epoch: u64,
    values: HashMap<LocationId, Value>,
}

impl core::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resolver")
            .field("store", &self.store)
            .field("locations", &self.arena.alive())
            .field("frame", &self.frame)
            .field("cached_values", &self.values.len())
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create a resolver over `store`.
    pub fn new(registry: Arc<TypeRegistry>, store: impl Store + 'static) -> Self {
        let mut arena = Arena::default();
        let root_type = store.root_type().clone();
        let root = arena.insert(None, Location::new(String::new(), None, None, root_type, Vec::new()));
        let mut by_path = HashMap::new();
        by_path.insert(String::new(), root);
        let mut this = Self {
            registry,
            store: Box::new(store),
            arena,
            by_path,
            root,
            frame: 1,
            epoch: 1,
            values: HashMap::new(),
        };
        this.refresh(root);
        this
    }

    /// The type registry.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The backing store.
    pub fn store(&self) -> &dyn Store {
        &*self.store
    }

    /// Which store model backs this resolver.
    pub fn store_kind(&self) -> StoreKind {
        self.store.kind()
    }

    /// Current frame counter.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Start a new frame: drop the value cache and schedule location re-validation.
    pub fn new_frame(&mut self) {
        self.frame += 1;
        self.touch();
    }

    fn touch(&mut self) {
        self.epoch += 1;
        self.values.clear();
    }

    /// The root location.
    pub fn root(&self) -> LocationId {
        self.root
    }

    /// Location by id.
    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.arena.get(id)
    }

    /// Whether `id` refers to a live location.
    pub fn is_alive(&self, id: LocationId) -> bool {
        self.arena.is_alive(id)
    }

    /// Parent of `id`.
    pub fn parent(&self, id: LocationId) -> Option<LocationId> {
        self.arena.get(id).and_then(Location::parent)
    }

    /// Chain from the root to `id`, inclusive.
    pub fn chain(&self, id: LocationId) -> Vec<LocationId> {
        self.arena.path_to_root(id)
    }

    /// Number of live cached locations.
    pub fn location_count(&self) -> usize {
        self.arena.alive()
    }

    /// Resolve `path` from the root.
    pub fn resolve(&mut self, path: &str) -> ResolveResult<LocationId> {
        self.resolve_from(self.root, path)
    }

    /// Resolve `path` relative to `base`.
    pub fn resolve_from(&mut self, base: LocationId, path: &str) -> ResolveResult<LocationId> {
        self.ensure_valid(base).map_err(|_| ResolveError::StaleLocation)?;
        let segments = path::parse(path)?;
        let mut cur = base;
        for segment in &segments {
            cur = self.segment(cur, segment)?;
        }
        Ok(cur)
    }

    /// Resolve one more segment (name plus optional index suffixes) below `parent`.
    pub fn child(&mut self, parent: LocationId, segment: &str) -> ResolveResult<LocationId> {
        if segment.contains('.') {
            return Err(ResolveError::invalid(segment, "expected a single segment"));
        }
        self.resolve_from(parent, segment)
    }

    fn segment(&mut self, parent: LocationId, segment: &Segment) -> ResolveResult<LocationId> {
        let mut cur = if segment.name.is_empty() {
            parent
        } else {
            self.member(parent, &segment.name)?
        };
        for &i in &segment.indices {
            cur = self.element(cur, i)?;
        }
        Ok(cur)
    }

    /// Location of member `name` of the value at `parent`.
    pub fn member(&mut self, parent: LocationId, name: &str) -> ResolveResult<LocationId> {
        self.validate(parent);
        let loc = self.arena.get(parent).ok_or(ResolveError::StaleLocation)?;
        let owner = loc.resolved_type.clone();
        let not_found = || ResolveError::MemberNotFound {
            ty: owner.to_string(),
            member: name.to_owned(),
        };
        let found = self
            .registry
            .find_member(&owner, name)
            .filter(|m| self.store.exposes(m.desc))
            .ok_or_else(not_found)?;
        let desc = found.desc;
        let child_path = path::join(&loc.path, &desc.name);
        if let Some(&id) = self.by_path.get(&child_path) {
            if self.arena.is_alive(id) {
                return Ok(id);
            }
        }

        let access = match (&desc.getter, desc.is_static) {
            (Some(g), _) => MemberAccess::Computed(Arc::clone(g)),
            (None, true) => MemberAccess::Static {
                owner: found.declaring.to_owned(),
            },
            (None, false) => MemberAccess::Stored,
        };
        let mut steps = loc.steps.clone();
        steps.push(Step::Field {
            name: desc.name.clone(),
            access,
        });
        let declared = self.registry.member_type(&owner, desc);
        let info = MemberInfo {
            name: desc.name.clone(),
            declared: declared.clone(),
            declaring: found.declaring.to_owned(),
            read_only: desc.read_only,
            is_static: desc.is_static,
            attributes: desc.attributes.clone(),
        };
        let location = Location::new(child_path.clone(), Some(info), None, declared, steps);
        Ok(self.adopt(parent, child_path, location))
    }

    /// Location of element `index` of the collection at `parent`.
    pub fn element(&mut self, parent: LocationId, index: usize) -> ResolveResult<LocationId> {
        self.validate(parent);
        let loc = self.arena.get(parent).ok_or(ResolveError::StaleLocation)?;
        let Some(element_type) = loc.resolved_type.element_type().cloned() else {
            return Err(ResolveError::NotACollection {
                path: loc.path.clone(),
            });
        };
        let len = self.store.array_size(&loc.steps).unwrap_or(0);
        if index >= len {
            return Err(ResolveError::IndexOutOfRange {
                path: loc.path.clone(),
                index,
                len,
            });
        }
        let child_path = path::index(&loc.path, index);
        if let Some(&id) = self.by_path.get(&child_path) {
            if self.arena.is_alive(id) {
                return Ok(id);
            }
        }
        let mut steps = loc.steps.clone();
        steps.push(Step::Index(index));
        let location = Location::new(
            child_path.clone(),
            loc.member.clone(),
            Some(index),
            element_type,
            steps,
        );
        Ok(self.adopt(parent, child_path, location))
    }

    fn adopt(&mut self, parent: LocationId, path: String, location: Location) -> LocationId {
        let id = self.arena.insert(Some(parent), location);
        self.by_path.insert(path, id);
        self.refresh(id);
        tracing::trace!(path = %self.arena.get(id).map_or("", Location::path), "location created");
        id
    }

    /// Re-read the value at `id` and record its runtime type and stamp.
    fn refresh(&mut self, id: LocationId) -> Option<Stamp> {
        let loc = self.arena.get(id)?;
        let value = self.store.read(&loc.steps).unwrap_or_default();
        let stamp = Stamp::of(&value);
        let resolved = self.registry.runtime_type(&value, &loc.declared_type);
        let previous = loc.stamp;
        let epoch = self.epoch;
        let loc = self.arena.get_mut(id)?;
        loc.stamp = stamp;
        loc.resolved_type = resolved;
        loc.validated = epoch;
        self.values.insert(id, value);
        Some(previous)
    }

    /// Validate `id` once per epoch; drop its cached descendants on a structural change.
    fn validate(&mut self, id: LocationId) {
        let Some(loc) = self.arena.get(id) else {
            return;
        };
        if loc.validated == self.epoch {
            return;
        }
        let children = loc.children.clone();
        let Some(previous) = self.refresh(id) else {
            return;
        };
        let current = self.arena.get(id).map(|l| l.stamp);
        if current != Some(previous) && !children.is_empty() {
            tracing::trace!(
                path = %self.arena.get(id).map_or("", Location::path),
                dropped = children.len(),
                "structure changed, dropping cached locations"
            );
            self.drop_children(id);
        }
    }

    fn drop_children(&mut self, id: LocationId) {
        let children = self
            .arena
            .get(id)
            .map(|l| l.children.clone())
            .unwrap_or_default();
        let mut removed = Vec::new();
        for child in children {
            self.arena.remove(child, &mut removed);
        }
        for path in removed {
            self.by_path.remove(&path);
        }
        self.values.retain(|id, _| self.arena.is_alive(*id));
    }

    /// Validate the chain from the root down to `id` for the current frame.
    ///
    /// Fails with [`AccessError::Stale`] when `id` was dropped, now or earlier.
    pub fn ensure_valid(&mut self, id: LocationId) -> AccessResult<()> {
        if !self.arena.is_alive(id) {
            return Err(AccessError::Stale);
        }
        for link in self.arena.path_to_root(id) {
            self.validate(link);
        }
        if self.arena.is_alive(id) {
            Ok(())
        } else {
            Err(AccessError::Stale)
        }
    }

    /// Drop every cached location below `id`.
    pub fn invalidate(&mut self, id: LocationId) {
        self.drop_children(id);
        self.touch();
    }

    /// Current value at `id`, cached for the rest of the frame.
    pub fn get_value(&mut self, id: LocationId) -> AccessResult<Value> {
        self.ensure_valid(id)?;
        if let Some(v) = self.values.get(&id) {
            return Ok(v.clone());
        }
        let loc = self.arena.get(id).ok_or(AccessError::Stale)?;
        let value = self.store.read(&loc.steps)?;
        self.values.insert(id, value.clone());
        Ok(value)
    }

    /// Write `value` at `id`.
    ///
    /// Fails when the location is read-only or the value does not fit the declared type.
    /// Integers written to float slots are widened.
    pub fn set_value(&mut self, id: LocationId, value: Value) -> AccessResult<()> {
        self.ensure_valid(id)?;
        let loc = self.arena.get(id).ok_or(AccessError::Stale)?;
        if loc.is_read_only() {
            return Err(AccessError::read_only(loc.path.clone()));
        }
        let declared = &loc.declared_type;
        let value = match declared {
            TypeRef::Named(n) if n == FLOAT => value.widened(),
            _ => value,
        };
        if !self.registry.accepts_value(declared, &value) {
            return Err(AccessError::TypeMismatch {
                expected: declared.to_string(),
                found: value.kind_name(),
            });
        }
        let steps = loc.steps.clone();
        self.store.write(&steps, value)?;
        self.touch();
        Ok(())
    }

    /// Like [`Resolver::set_value`], reporting failure as `false`.
    pub fn try_set_value(&mut self, id: LocationId, value: Value) -> bool {
        match self.set_value(id, value) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, "write rejected");
                false
            }
        }
    }

    /// Write element `index` of the collection at `id` without resolving it.
    ///
    /// Inside an edit bracket the element may not exist in the committed snapshot yet.
    pub fn set_element(&mut self, id: LocationId, index: usize, value: Value) -> AccessResult<()> {
        self.ensure_valid(id)?;
        let loc = self.arena.get(id).ok_or(AccessError::Stale)?;
        if loc.is_read_only() {
            return Err(AccessError::read_only(loc.path.clone()));
        }
        let Some(element_type) = loc.declared_type.element_type() else {
            return Err(AccessError::unreachable(loc.path.clone()));
        };
        if !self.registry.accepts_value(element_type, &value) {
            return Err(AccessError::TypeMismatch {
                expected: element_type.to_string(),
                found: value.kind_name(),
            });
        }
        let mut steps = loc.steps.clone();
        steps.push(Step::Index(index));
        self.store.write(&steps, value)?;
        self.touch();
        Ok(())
    }

    /// Length of the collection at `id`.
    pub fn len(&mut self, id: LocationId) -> AccessResult<usize> {
        self.ensure_valid(id)?;
        let loc = self.arena.get(id).ok_or(AccessError::Stale)?;
        self.store.array_size(&loc.steps)
    }

    /// Resize the collection at `id`, padding with default elements.
    pub fn set_len(&mut self, id: LocationId, len: usize) -> AccessResult<()> {
        self.ensure_valid(id)?;
        let loc = self.arena.get(id).ok_or(AccessError::Stale)?;
        if let Some(fixed) = loc.declared_type.fixed_len() {
            return Err(AccessError::FixedSize {
                path: loc.path.clone(),
                len: fixed,
            });
        }
        if loc.is_read_only() {
            return Err(AccessError::read_only(loc.path.clone()));
        }
        let filler = loc
            .declared_type
            .element_type()
            .and_then(|e| self.registry.default_value(e))
            .unwrap_or_default();
        let steps = loc.steps.clone();
        self.store.set_array_size(&steps, len, &filler)?;
        self.touch();
        Ok(())
    }

    /// Open an edit bracket on the store.
    pub fn begin_edit(&mut self) {
        self.store.begin_edit();
    }

    /// Close an edit bracket on the store.
    pub fn end_edit(&mut self) {
        self.store.end_edit();
        self.touch();
    }

    /// Whether an edit bracket is open.
    pub fn in_edit(&self) -> bool {
        self.store.in_edit()
    }

    /// Flush buffered writes to the store.
    pub fn apply(&mut self) {
        self.store.apply();
        self.touch();
    }

    /// Names of the members of the value at `id` that the store exposes, base members first.
    pub fn member_names(&mut self, id: LocationId) -> Vec<String> {
        self.validate(id);
        let Some(loc) = self.arena.get(id) else {
            return Vec::new();
        };
        self.registry
            .members_of(&loc.resolved_type)
            .into_iter()
            .filter(|m| self.store.exposes(m.desc))
            .map(|m| m.desc.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MemberDesc, TypeDesc};
    use crate::store::{ObjectStore, PropertyStore};
    use crate::types::Attribute;
    use crate::value::Object;

    fn registry() -> Arc<TypeRegistry> {
        Arc::new(
            TypeRegistry::builder()
                .with_type(
                    TypeDesc::structure("Item")
                        .member(MemberDesc::field("label", TypeRef::string()))
                        .member(MemberDesc::field("name", TypeRef::string())),
                )
                .with_type(
                    TypeDesc::structure("Shape")
                        .abstract_type()
                        .member(MemberDesc::field("name", TypeRef::string())),
                )
                .with_type(
                    TypeDesc::structure("Circle")
                        .extends("Shape")
                        .member(MemberDesc::field("radius", TypeRef::float())),
                )
                .with_type(
                    TypeDesc::structure("Root")
                        .member(
                            MemberDesc::field("items", TypeRef::list(TypeRef::named("Item")))
                                .with_attribute(Attribute::new("Paged").with_arg(5)),
                        )
                        .member(MemberDesc::field("shape", TypeRef::named("Shape")))
                        .member(MemberDesc::field("grid", TypeRef::list(TypeRef::list(TypeRef::int()))))
                        .member(MemberDesc::field("fixed", TypeRef::array(TypeRef::int(), 2)))
                        .member(MemberDesc::field("secret", TypeRef::int()).non_public())
                        .member(MemberDesc::field("version", TypeRef::int()).read_only())
                        .member(
                            MemberDesc::field("instances", TypeRef::int())
                                .static_member()
                                .with_default(3),
                        )
                        .member(MemberDesc::computed("count", TypeRef::int(), |v| {
                            v.as_object()
                                .and_then(|o| o.field("items"))
                                .and_then(Value::len)
                                .and_then(|n| i64::try_from(n).ok())
                                .map_or(Value::Null, Value::Int)
                        })),
                )
                .build(),
        )
    }

    fn item(label: &str, name: &str) -> Value {
        Object::new(TypeRef::named("Item"))
            .with("label", label)
            .with("name", name)
            .into()
    }

    fn root() -> Object {
        Object::new(TypeRef::named("Root"))
            .with("items", vec![item("a", "root"), item("b", "second")])
            .with(
                "shape",
                Object::new(TypeRef::named("Circle"))
                    .with("name", "c")
                    .with("radius", 2.0),
            )
            .with(
                "grid",
                vec![
                    Value::List(vec![Value::Int(1), Value::Int(2)]),
                    Value::List(vec![Value::Int(3), Value::Int(4), Value::Int(5)]),
                ],
            )
            .with("fixed", vec![Value::Int(0), Value::Int(0)])
            .with("secret", 42)
            .with("version", 1)
    }

    fn object_resolver() -> Resolver {
        let reg = registry();
        let store = ObjectStore::new(&reg, root());
        Resolver::new(reg, store)
    }

    #[test]
    fn resolves_chains_with_prefix_paths() {
        let mut r = object_resolver();
        let label = r.resolve("items[0].label").unwrap();
        let chain: Vec<_> = r
            .chain(label)
            .into_iter()
            .map(|id| r.location(id).unwrap().path().to_owned())
            .collect();
        assert_eq!(chain, ["", "items", "items[0]", "items[0].label"]);
        assert_eq!(r.get_value(label).unwrap(), Value::from("a"));
        let elem = r.parent(label).unwrap();
        assert_eq!(r.location(elem).unwrap().array_index(), Some(0));
        assert_eq!(r.location(elem).unwrap().label(), "Element 0");
    }

    #[test]
    fn resolution_is_deterministic_and_case_insensitive() {
        let mut r = object_resolver();
        let a = r.resolve("Items[1].LABEL").unwrap();
        let b = r.resolve("items[1].label").unwrap();
        assert_eq!(a, b);
        assert_eq!(r.location(a).unwrap().path(), "items[1].label");
    }

    #[test]
    fn reports_resolution_errors_as_values() {
        let mut r = object_resolver();
        assert!(matches!(
            r.resolve("items[0].missing"),
            Err(ResolveError::MemberNotFound { .. })
        ));
        assert!(matches!(
            r.resolve("items[9]"),
            Err(ResolveError::IndexOutOfRange { index: 9, len: 2, .. })
        ));
        assert!(matches!(
            r.resolve("secret[0]"),
            Err(ResolveError::NotACollection { .. })
        ));
        assert!(matches!(
            r.resolve("items[x]"),
            Err(ResolveError::InvalidPath { .. })
        ));
    }

    #[test]
    fn resolved_type_follows_runtime_subtype() {
        let mut r = object_resolver();
        let shape = r.resolve("shape").unwrap();
        let loc = r.location(shape).unwrap();
        assert_eq!(loc.declared_type(), &TypeRef::named("Shape"));
        assert_eq!(loc.resolved_type(), &TypeRef::named("Circle"));
        let radius = r.resolve("shape.radius").unwrap();
        assert_eq!(r.get_value(radius).unwrap(), Value::Float(2.0));
    }

    #[test]
    fn nested_indices() {
        let mut r = object_resolver();
        let cell = r.resolve("grid[1][2]").unwrap();
        assert_eq!(r.get_value(cell).unwrap(), Value::Int(5));
        assert_eq!(r.location(cell).unwrap().path(), "grid[1][2]");
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut r = object_resolver();
        let label = r.resolve("items[1].label").unwrap();
        r.set_value(label, Value::from("new")).unwrap();
        assert_eq!(r.get_value(label).unwrap(), Value::from("new"));

        let radius = r.resolve("shape.radius").unwrap();
        r.set_value(radius, Value::Int(3)).unwrap();
        assert_eq!(r.get_value(radius).unwrap(), Value::Float(3.0));
    }

    #[test]
    fn rejects_read_only_and_mismatched_writes() {
        let mut r = object_resolver();
        let version = r.resolve("version").unwrap();
        assert!(matches!(
            r.set_value(version, Value::Int(2)),
            Err(AccessError::ReadOnly { .. })
        ));
        let label = r.resolve("items[0].label").unwrap();
        assert!(matches!(
            r.set_value(label, Value::Int(2)),
            Err(AccessError::TypeMismatch { .. })
        ));
        assert!(!r.try_set_value(version, Value::Int(2)));
        assert!(r.try_set_value(label, Value::from("ok")));
    }

    #[test]
    fn reflective_store_reaches_statics_private_and_computed() {
        let mut r = object_resolver();
        let secret = r.resolve("secret").unwrap();
        assert_eq!(r.get_value(secret).unwrap(), Value::Int(42));
        let instances = r.resolve("instances").unwrap();
        assert_eq!(r.get_value(instances).unwrap(), Value::Int(3));
        r.set_value(instances, Value::Int(4)).unwrap();
        assert_eq!(r.get_value(instances).unwrap(), Value::Int(4));
        let count = r.resolve("count").unwrap();
        assert_eq!(r.get_value(count).unwrap(), Value::Int(2));
        assert!(!r.location(count).unwrap().is_stable());
        assert!(r.set_value(count, Value::Int(0)).is_err());
    }

    #[test]
    fn structured_store_hides_non_stored_members() {
        let reg = registry();
        let mut r = Resolver::new(reg, PropertyStore::new(root()));
        assert!(r.resolve("secret").is_ok());
        assert!(matches!(
            r.resolve("instances"),
            Err(ResolveError::MemberNotFound { .. })
        ));
        assert!(r.resolve("count").is_err());
        let root = r.root();
        assert!(!r.member_names(root).contains(&"count".to_owned()));
    }

    #[test]
    fn value_cache_is_per_frame() {
        let mut r = object_resolver();
        let label = r.resolve("items[0].label").unwrap();
        let items = r.resolve("items").unwrap();
        let before = r.get_value(items).unwrap();
        r.set_value(label, Value::from("z")).unwrap();
        // Writes drop the cache, so the parent sees the new element value.
        let after = r.get_value(items).unwrap();
        assert_ne!(before, after);
        r.new_frame();
        assert_eq!(r.get_value(label).unwrap(), Value::from("z"));
    }

    #[test]
    fn count_change_drops_element_locations() {
        let mut r = object_resolver();
        let items = r.resolve("items").unwrap();
        let second = r.resolve("items[1].label").unwrap();
        r.set_len(items, 1).unwrap();
        r.new_frame();
        assert!(matches!(
            r.resolve("items[1]"),
            Err(ResolveError::IndexOutOfRange { len: 1, .. })
        ));
        assert!(!r.is_alive(second));
        assert!(matches!(r.get_value(second), Err(AccessError::Stale)));
        // Surviving indices are rebuilt on demand.
        assert!(r.resolve("items[0].label").is_ok());
    }

    #[test]
    fn identity_change_rebuilds_subtree() {
        let mut r = object_resolver();
        let shape = r.resolve("shape").unwrap();
        let radius = r.resolve("shape.radius").unwrap();
        let square = Object::new(TypeRef::named("Shape")).with("name", "s");
        r.set_value(shape, square.into()).unwrap();
        assert!(r.resolve("shape.radius").is_err());
        assert!(!r.is_alive(radius));
        assert_eq!(
            r.location(shape).unwrap().resolved_type(),
            &TypeRef::named("Shape")
        );
    }

    #[test]
    fn fixed_size_arrays_refuse_resize() {
        let mut r = object_resolver();
        let fixed = r.resolve("fixed").unwrap();
        assert!(matches!(
            r.set_len(fixed, 3),
            Err(AccessError::FixedSize { len: 2, .. })
        ));
    }

    #[test]
    fn edit_bracket_defers_structured_writes() {
        let reg = registry();
        let mut r = Resolver::new(reg, PropertyStore::new(root()));
        let items = r.resolve("items").unwrap();
        r.begin_edit();
        r.set_len(items, 3).unwrap();
        r.set_element(items, 2, item("c", "third")).unwrap();
        assert_eq!(r.len(items).unwrap(), 2);
        r.end_edit();
        assert_eq!(r.len(items).unwrap(), 3);
        let label = r.resolve("items[2].label").unwrap();
        assert_eq!(r.get_value(label).unwrap(), Value::from("c"));
    }

    #[test]
    fn element_attributes_are_not_inherited() {
        let mut r = object_resolver();
        let items = r.resolve("items").unwrap();
        let first = r.resolve("items[0]").unwrap();
        assert_eq!(r.location(items).unwrap().attributes().len(), 1);
        assert!(r.location(first).unwrap().attributes().is_empty());
    }
}
