// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backing stores: where location values actually live.
//!
//! ## Overview
//!
//! A [`Store`] owns a root value and reads or writes nested values addressed by
//! [`Step`]s. Two stores are provided:
//!
//! - [`ObjectStore`] walks an in-memory value graph directly. It reaches everything the
//!   type registry describes: static members (held in a per-store table), non-public
//!   members and computed members.
//! - [`PropertyStore`] models an externally owned, structured representation. Only stored
//!   instance fields are exposed, collection sizes are explicit, and writes made inside a
//!   [`Store::begin_edit`]/[`Store::end_edit`] bracket are buffered until the outermost
//!   bracket closes. Reads always observe the committed snapshot.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::error::{AccessError, AccessResult};
use crate::path::{MemberAccess, Step, render};
use crate::registry::{MemberDesc, TypeRegistry};
use crate::types::TypeRef;
use crate::value::{Object, Value};

/// Which store model backs a resolver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StoreKind {
    /// Direct access to an in-memory value graph.
    Reflective,
    /// Structured representation with bracketed edits.
    Structured,
}

/// Read/write access to a value graph addressed by steps.
pub trait Store: fmt::Debug {
    /// Which model this store implements.
    fn kind(&self) -> StoreKind;

    /// Declared type of the root value.
    fn root_type(&self) -> &TypeRef;

    /// Whether `member` is reachable through this store.
    fn exposes(&self, member: &MemberDesc) -> bool;

    /// Read the value at `steps`.
    fn read(&self, steps: &[Step]) -> AccessResult<Value>;

    /// Write the value at `steps`.
    fn write(&mut self, steps: &[Step], value: Value) -> AccessResult<()>;

    /// Length of the collection at `steps`.
    fn array_size(&self, steps: &[Step]) -> AccessResult<usize> {
        self.read(steps)?
            .len()
            .ok_or_else(|| AccessError::unreachable(render(steps)))
    }

    /// Resize the collection at `steps`, padding with `filler`.
    fn set_array_size(&mut self, steps: &[Step], len: usize, filler: &Value) -> AccessResult<()> {
        let mut list = self.read(steps)?;
        let items = list
            .as_list_mut()
            .ok_or_else(|| AccessError::unreachable(render(steps)))?;
        items.resize(len, filler.clone());
        self.write(steps, list)
    }

    /// Open an edit bracket. Brackets nest.
    fn begin_edit(&mut self) {}

    /// Close an edit bracket; the outermost close commits buffered writes.
    fn end_edit(&mut self) {}

    /// Whether an edit bracket is open.
    fn in_edit(&self) -> bool {
        false
    }

    /// Commit any buffered writes.
    fn apply(&mut self) {}
}

/// Values of static members, one per declaring type and member.
#[derive(Clone, Debug, Default)]
struct Statics(HashMap<(String, String), Value>);

impl Statics {
    fn seed(registry: &TypeRegistry) -> Self {
        let mut table = HashMap::new();
        for ty in registry.types() {
            for m in ty.members.iter().filter(|m| m.is_static && m.getter.is_none()) {
                let value = m
                    .default
                    .clone()
                    .or_else(|| registry.default_value(&m.ty))
                    .unwrap_or_default();
                table.insert((ty.name.clone(), m.name.clone()), value);
            }
        }
        Self(table)
    }

    fn get(&self, owner: &str, name: &str) -> Option<&Value> {
        self.0.get(&(owner.to_owned(), name.to_owned()))
    }

    fn get_mut(&mut self, owner: &str, name: &str) -> Option<&mut Value> {
        self.0.get_mut(&(owner.to_owned(), name.to_owned()))
    }
}

fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.as_object().and_then(|o| o.field(name))
}

fn element(value: &Value, index: usize) -> Option<&Value> {
    value.as_list().and_then(|l| l.get(index))
}

/// Walk `steps` from `root`, borrowing where possible.
fn read_steps<'a>(root: &'a Value, statics: &'a Statics, steps: &[Step]) -> AccessResult<Value> {
    let mut cur: Cow<'a, Value> = Cow::Borrowed(root);
    for (depth, step) in steps.iter().enumerate() {
        let lost = || AccessError::unreachable(render(&steps[..=depth]));
        cur = match step {
            Step::Field {
                name,
                access: MemberAccess::Stored,
            } => match cur {
                Cow::Borrowed(v) => Cow::Borrowed(field(v, name).ok_or_else(lost)?),
                Cow::Owned(v) => Cow::Owned(field(&v, name).ok_or_else(lost)?.clone()),
            },
            Step::Field {
                name,
                access: MemberAccess::Static { owner },
            } => Cow::Borrowed(statics.get(owner, name).ok_or_else(lost)?),
            Step::Field {
                access: MemberAccess::Computed(getter),
                ..
            } => {
                if cur.is_null() {
                    return Err(lost());
                }
                Cow::Owned(getter(&*cur))
            }
            Step::Index(i) => match cur {
                Cow::Borrowed(v) => Cow::Borrowed(element(v, *i).ok_or_else(lost)?),
                Cow::Owned(v) => Cow::Owned(element(&v, *i).ok_or_else(lost)?.clone()),
            },
        };
    }
    Ok(cur.into_owned())
}

/// Mutable slot at `steps` inside `root`, which must not contain static or computed steps.
fn slot_mut<'a>(root: &'a mut Value, steps: &[Step]) -> AccessResult<&'a mut Value> {
    let mut cur = root;
    for (depth, step) in steps.iter().enumerate() {
        let lost = || AccessError::unreachable(render(&steps[..=depth]));
        cur = match step {
            Step::Field {
                name,
                access: MemberAccess::Stored,
            } => cur
                .as_object_mut()
                .and_then(|o| o.field_mut(name))
                .ok_or_else(lost)?,
            Step::Index(i) => cur
                .as_list_mut()
                .and_then(|l| l.get_mut(*i))
                .ok_or_else(lost)?,
            Step::Field { .. } => return Err(lost()),
        };
    }
    Ok(cur)
}

/// Reflective store over an in-memory value graph.
#[derive(Clone, Debug)]
pub struct ObjectStore {
    root_type: TypeRef,
    root: Value,
    statics: Statics,
}

impl ObjectStore {
    /// Store rooted at `root`, seeding static members from `registry`.
    pub fn new(registry: &TypeRegistry, root: Object) -> Self {
        let ty = root.ty().clone();
        Self::from_value(registry, ty, Value::Object(root))
    }

    /// Store rooted at an arbitrary value declared as `root_type`.
    pub fn from_value(registry: &TypeRegistry, root_type: TypeRef, root: Value) -> Self {
        Self {
            root_type,
            root,
            statics: Statics::seed(registry),
        }
    }

    /// The root value.
    pub fn value(&self) -> &Value {
        &self.root
    }
}

impl Store for ObjectStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Reflective
    }

    fn root_type(&self) -> &TypeRef {
        &self.root_type
    }

    fn exposes(&self, _member: &MemberDesc) -> bool {
        true
    }

    fn read(&self, steps: &[Step]) -> AccessResult<Value> {
        read_steps(&self.root, &self.statics, steps)
    }

    fn write(&mut self, steps: &[Step], value: Value) -> AccessResult<()> {
        if steps.iter().any(Step::is_computed) {
            return Err(AccessError::read_only(render(steps)));
        }
        // Anything before the last static step is irrelevant to where the value lives.
        let last_static = steps.iter().rposition(|s| {
            matches!(
                s,
                Step::Field {
                    access: MemberAccess::Static { .. },
                    ..
                }
            )
        });
        let slot = match last_static {
            Some(at) => {
                let Step::Field {
                    name,
                    access: MemberAccess::Static { owner },
                } = &steps[at]
                else {
                    return Err(AccessError::unreachable(render(steps)));
                };
                let base = self
                    .statics
                    .get_mut(owner, name)
                    .ok_or_else(|| AccessError::unreachable(render(&steps[..=at])))?;
                slot_mut(base, &steps[at + 1..])?
            }
            None => slot_mut(&mut self.root, steps)?,
        };
        *slot = value;
        Ok(())
    }
}

#[derive(Clone, Debug)]
enum PendingEdit {
    Set(Vec<Step>, Value),
    Resize(Vec<Step>, usize, Value),
}

/// Structured store with explicit sizes and bracketed edits.
#[derive(Clone, Debug)]
pub struct PropertyStore {
    root_type: TypeRef,
    committed: Value,
    pending: Vec<PendingEdit>,
    depth: usize,
    empty: Statics,
}

impl PropertyStore {
    /// Structured representation of `root`.
    pub fn new(root: Object) -> Self {
        let ty = root.ty().clone();
        Self::from_value(ty, Value::Object(root))
    }

    /// Structured representation of an arbitrary value declared as `root_type`.
    pub fn from_value(root_type: TypeRef, root: Value) -> Self {
        Self {
            root_type,
            committed: root,
            pending: Vec::new(),
            depth: 0,
            empty: Statics::default(),
        }
    }

    /// The committed value.
    pub fn value(&self) -> &Value {
        &self.committed
    }

    /// Number of buffered edits.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn commit(&mut self, edit: PendingEdit) -> AccessResult<()> {
        match edit {
            PendingEdit::Set(steps, value) => {
                *slot_mut(&mut self.committed, &steps)? = value;
            }
            PendingEdit::Resize(steps, len, filler) => {
                let slot = slot_mut(&mut self.committed, &steps)?;
                let items = slot
                    .as_list_mut()
                    .ok_or_else(|| AccessError::unreachable(render(&steps)))?;
                items.resize(len, filler);
            }
        }
        Ok(())
    }

    fn submit(&mut self, edit: PendingEdit) -> AccessResult<()> {
        if self.depth > 0 {
            self.pending.push(edit);
            Ok(())
        } else {
            self.commit(edit)
        }
    }

    fn flush(&mut self) {
        for edit in core::mem::take(&mut self.pending) {
            if let Err(err) = self.commit(edit) {
                tracing::warn!(%err, "dropping buffered edit");
            }
        }
    }
}

impl Store for PropertyStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Structured
    }

    fn root_type(&self) -> &TypeRef {
        &self.root_type
    }

    fn exposes(&self, member: &MemberDesc) -> bool {
        member.is_stored()
    }

    fn read(&self, steps: &[Step]) -> AccessResult<Value> {
        read_steps(&self.committed, &self.empty, steps)
    }

    fn write(&mut self, steps: &[Step], value: Value) -> AccessResult<()> {
        if self.depth == 0 {
            // Validate eagerly so immediate writes report unreachable targets.
            slot_mut(&mut self.committed, steps)?;
        }
        self.submit(PendingEdit::Set(steps.to_vec(), value))
    }

    fn set_array_size(&mut self, steps: &[Step], len: usize, filler: &Value) -> AccessResult<()> {
        if self.read(steps)?.as_list().is_none() {
            return Err(AccessError::unreachable(render(steps)));
        }
        self.submit(PendingEdit::Resize(steps.to_vec(), len, filler.clone()))
    }

    fn begin_edit(&mut self) {
        self.depth += 1;
    }

    fn end_edit(&mut self) {
        match self.depth {
            0 => tracing::warn!("end_edit without matching begin_edit"),
            1 => {
                self.depth = 0;
                self.flush();
            }
            _ => self.depth -= 1,
        }
    }

    fn in_edit(&self) -> bool {
        self.depth > 0
    }

    fn apply(&mut self) {
        self.flush();
    }
}
