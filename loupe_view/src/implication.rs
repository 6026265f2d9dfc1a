// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attribute implication expansion.
//!
//! An attribute kind declared self-including stands for the attributes declared on the kind
//! itself. Expansion replaces each such instance, in place, with those attributes, recursing
//! into implied kinds that are self-including too. Meta attributes (usage metadata and the
//! marker itself) are never spliced in.

use loupe_path::registry::{INCLUDE_MY_ATTRIBUTES, TypeRegistry};
use loupe_path::Attribute;

use crate::error::CyclicAttributeImplication;

/// Expand self-including attributes in `attributes`.
///
/// Non-self-including attributes keep their relative order. An implied attribute equal to
/// one written out explicitly is dropped, wherever the explicit one sits. One spliced in more
/// than once (through different implying kinds) is kept at its first position. Re-running on
/// an expanded list returns it unchanged.
pub fn expand(
    registry: &TypeRegistry,
    attributes: &[Attribute],
) -> Result<Vec<Attribute>, CyclicAttributeImplication> {
    let explicit: Vec<&Attribute> = attributes
        .iter()
        .filter(|a| !is_self_including(registry, &a.kind))
        .collect();
    let mut splicer = Splicer {
        registry,
        explicit: &explicit,
        visiting: Vec::new(),
        out: Vec::with_capacity(attributes.len()),
    };
    for attr in attributes {
        splicer.splice(attr, false)?;
    }
    Ok(splicer.out)
}

fn is_self_including(registry: &TypeRegistry, kind: &str) -> bool {
    registry
        .attribute(kind)
        .is_some_and(loupe_path::AttributeDecl::is_self_including)
}

fn is_meta(registry: &TypeRegistry, kind: &str) -> bool {
    kind == INCLUDE_MY_ATTRIBUTES || registry.attribute(kind).is_some_and(|d| d.meta)
}

struct Splicer<'a> {
    registry: &'a TypeRegistry,
    explicit: &'a [&'a Attribute],
    visiting: Vec<String>,
    out: Vec<Attribute>,
}

impl Splicer<'_> {
    fn splice(&mut self, attr: &Attribute, implied: bool) -> Result<(), CyclicAttributeImplication> {
        let registry = self.registry;
        if !is_self_including(registry, &attr.kind) {
            let shadowed = implied && (self.explicit.contains(&attr) || self.out.contains(attr));
            if !shadowed {
                self.out.push(attr.clone());
            }
            return Ok(());
        }
        if self.visiting.contains(&attr.kind) {
            let mut chain = self.visiting.clone();
            chain.push(attr.kind.clone());
            return Err(CyclicAttributeImplication { chain });
        }
        self.visiting.push(attr.kind.clone());
        let declared = registry
            .attribute(&attr.kind)
            .map(|d| d.attributes.as_slice())
            .unwrap_or_default();
        for inner in declared.iter().filter(|a| !is_meta(registry, &a.kind)) {
            self.splice(inner, true)?;
        }
        self.visiting.pop();
        tracing::trace!(kind = %attr.kind, "expanded self-including attribute");
        Ok(())
    }
}
