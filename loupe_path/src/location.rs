// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Locations and the generational arena that owns them.

use crate::path::Step;
use crate::types::{Attribute, TypeRef};
use crate::value::{ObjectId, Value};

/// Identifier for a location owned by a [`Resolver`](crate::Resolver).
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On removal, the slot is freed; any `LocationId` that pointed to it is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a distinct id.
///
/// Stale ids never alias a different live location because the generation must match.
/// Use [`Resolver::is_alive`](crate::Resolver::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct LocationId(u32, u32);

impl LocationId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// The member a location was reached through.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberInfo {
    /// Canonical member name.
    pub name: String,
    /// Declared member type, specialized for the owning instantiation.
    pub declared: TypeRef,
    /// Type that declares the member.
    pub declaring: String,
    /// Writes are rejected.
    pub read_only: bool,
    /// Static member.
    pub is_static: bool,
    /// Raw attributes in declaration order.
    pub attributes: Vec<Attribute>,
}

/// Snapshot of the structural facts a location's descendants depend on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Stamp {
    pub(crate) identity: Option<ObjectId>,
    pub(crate) len: Option<usize>,
}

impl Stamp {
    pub(crate) fn of(value: &Value) -> Self {
        Self {
            identity: value.identity(),
            len: value.len(),
        }
    }
}

/// A resolved, path-addressable point in the object graph.
#[derive(Clone, Debug)]
pub struct Location {
    generation: u32,
    pub(crate) path: String,
    pub(crate) member: Option<MemberInfo>,
    pub(crate) array_index: Option<usize>,
    pub(crate) parent: Option<LocationId>,
    pub(crate) children: Vec<LocationId>,
    pub(crate) declared_type: TypeRef,
    pub(crate) resolved_type: TypeRef,
    pub(crate) steps: Vec<Step>,
    pub(crate) stamp: Stamp,
    pub(crate) validated: u64,
}

impl Location {
    pub(crate) fn new(
        path: String,
        member: Option<MemberInfo>,
        array_index: Option<usize>,
        declared_type: TypeRef,
        steps: Vec<Step>,
    ) -> Self {
        Self {
            generation: 0,
            path,
            member,
            array_index,
            parent: None,
            children: Vec::new(),
            resolved_type: declared_type.clone(),
            declared_type,
            steps,
            stamp: Stamp::default(),
            validated: 0,
        }
    }

    /// Path from the root; the root itself has the empty path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The member this location was reached through; `None` for the root and for elements
    /// of a root collection.
    pub fn member(&self) -> Option<&MemberInfo> {
        self.member.as_ref()
    }

    /// Element index, when this location is a collection element.
    pub fn array_index(&self) -> Option<usize> {
        self.array_index
    }

    /// Parent location.
    pub fn parent(&self) -> Option<LocationId> {
        self.parent
    }

    /// Declared type of the slot.
    pub fn declared_type(&self) -> &TypeRef {
        &self.declared_type
    }

    /// Runtime type of the current value, or the declared type.
    pub fn resolved_type(&self) -> &TypeRef {
        &self.resolved_type
    }

    /// Store-level steps from the root.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Identity of the object held at this location when it was last validated.
    pub fn identity(&self) -> Option<ObjectId> {
        self.stamp.identity
    }

    /// Attributes that apply to this location. Elements do not inherit the attributes of
    /// their collection member.
    pub fn attributes(&self) -> &[Attribute] {
        match (&self.member, self.array_index) {
            (Some(m), None) => &m.attributes,
            _ => &[],
        }
    }

    /// Display label: the member name, `Element i` for elements, or the type for the root.
    pub fn label(&self) -> String {
        match (&self.member, self.array_index) {
            (_, Some(i)) => format!("Element {i}"),
            (Some(m), None) => m.name.clone(),
            (None, None) => self.declared_type.to_string(),
        }
    }

    /// Whether this location is the root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether the path is a stable identity: no computed member along the chain.
    pub fn is_stable(&self) -> bool {
        !self.steps.iter().any(Step::is_computed)
    }

    /// Whether writes are rejected for this location.
    pub fn is_read_only(&self) -> bool {
        self.steps.iter().any(Step::is_computed)
            || (self.array_index.is_none() && self.member.as_ref().is_some_and(|m| m.read_only))
    }
}

/// Slot arena for locations.
#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Option<Location>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl Arena {
    pub(crate) fn insert(&mut self, parent: Option<LocationId>, mut loc: Location) -> LocationId {
        loc.parent = parent;
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            loc.generation = generation;
            self.slots[idx] = Some(loc);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "LocationId uses 32-bit indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            loc.generation = generation;
            self.slots.push(Some(loc));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "LocationId uses 32-bit indices."
            )]
            ((self.slots.len() - 1) as u32, generation)
        };
        let id = LocationId::new(idx, generation);
        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.push(id);
        }
        id
    }

    /// Remove `id` and its subtree; returns the removed paths.
    pub(crate) fn remove(&mut self, id: LocationId, removed: &mut Vec<String>) {
        if !self.is_alive(id) {
            return;
        }
        let parent = self.get(id).and_then(|l| l.parent);
        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        self.remove_subtree(id, removed);
    }

    fn remove_subtree(&mut self, id: LocationId, removed: &mut Vec<String>) {
        let Some(loc) = self.slots.get_mut(id.idx()).and_then(Option::take) else {
            return;
        };
        self.free_list.push(id.idx());
        removed.push(loc.path);
        for child in loc.children {
            self.remove_subtree(child, removed);
        }
    }

    pub(crate) fn is_alive(&self, id: LocationId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn get(&self, id: LocationId) -> Option<&Location> {
        self.slots
            .get(id.idx())
            .and_then(Option::as_ref)
            .filter(|l| l.generation == id.1)
    }

    pub(crate) fn get_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.slots
            .get_mut(id.idx())
            .and_then(Option::as_mut)
            .filter(|l| l.generation == id.1)
    }

    pub(crate) fn path_to_root(&self, mut id: LocationId) -> Vec<LocationId> {
        let mut out = Vec::new();
        while let Some(loc) = self.get(id) {
            out.push(id);
            match loc.parent {
                Some(p) => id = p,
                None => break,
            }
        }
        out.reverse();
        out
    }

    pub(crate) fn alive(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
