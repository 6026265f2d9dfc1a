// Copyright 2025 the Loupe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inspector: resolver, builder and tree cache behind one handle.

use std::collections::HashMap;
use std::sync::Arc;

use loupe_binding::ExpressionEvaluator;
use loupe_path::{LocationId, ObjectId, ResolveResult, Resolver};

use crate::builder::TreeBuilder;
use crate::config::InspectorConfig;
use crate::error::DrawResult;
use crate::node::{Cx, ViewNode};
use crate::registry::ViewRegistry;
use crate::surface::RenderSurface;

/// How a cached tree is found again.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum CacheKey {
    /// Locations reached only through stored members keep their path.
    Path(String),
    /// Locations behind computed members are found by path and the identity of their value.
    Identity(String, ObjectId),
}

impl CacheKey {
    fn of(resolver: &Resolver, id: LocationId) -> Self {
        match resolver.location(id) {
            Some(loc) if !loc.is_stable() => match loc.identity() {
                Some(identity) => Self::Identity(loc.path().to_owned(), identity),
                None => Self::Path(loc.path().to_owned()),
            },
            Some(loc) => Self::Path(loc.path().to_owned()),
            None => Self::Path(String::new()),
        }
    }
}

#[derive(Debug)]
struct Entry {
    location: LocationId,
    node: Box<dyn ViewNode>,
}

/// Draws and edits one object graph.
///
/// Built trees are cached so per-node state (foldouts, pages, bindings) survives across
/// passes. A cached tree is dropped once its location no longer validates, and rebuilt
/// the next time it is asked for.
#[derive(Debug)]
pub struct Inspector {
    resolver: Resolver,
    builder: TreeBuilder,
    config: InspectorConfig,
    evaluator: Option<Box<dyn ExpressionEvaluator>>,
    trees: HashMap<CacheKey, Entry>,
}

impl Inspector {
    /// Inspector over `resolver` drawing with `views`.
    pub fn new(resolver: Resolver, views: Arc<ViewRegistry>) -> Self {
        Self {
            resolver,
            builder: TreeBuilder::new(views),
            config: InspectorConfig::default(),
            evaluator: None,
            trees: HashMap::new(),
        }
    }

    /// Inspector with the built-in nodes and wrappers.
    pub fn standard(resolver: Resolver) -> Self {
        let views = ViewRegistry::standard(resolver.registry());
        Self::new(resolver, Arc::new(views))
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: InspectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable `@` bindings.
    pub fn with_evaluator(mut self, evaluator: Box<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// The resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// The resolver, for direct reads and writes between passes.
    pub fn resolver_mut(&mut self) -> &mut Resolver {
        &mut self.resolver
    }

    /// The configuration.
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Number of cached trees.
    pub fn cached_trees(&self) -> usize {
        self.trees.len()
    }

    /// Start a new pass: drop per-frame caches and trees whose location went away.
    pub fn new_frame(&mut self) {
        self.resolver.new_frame();
        let resolver = &mut self.resolver;
        let before = self.trees.len();
        self.trees
            .retain(|_, entry| resolver.ensure_valid(entry.location).is_ok());
        let dropped = before - self.trees.len();
        if dropped > 0 {
            tracing::trace!(dropped, "pruned cached trees");
        }
    }

    /// Cached tree for `path`, built on first use.
    pub fn node_at(&mut self, path: &str) -> ResolveResult<&mut dyn ViewNode> {
        let id = self.resolver.resolve(path)?;
        let entry = cached(&mut self.trees, &mut self.resolver, &self.builder, id);
        Ok(&mut *entry.node)
    }

    /// Height the tree at `path` needs this pass.
    pub fn height_at(&mut self, path: &str) -> ResolveResult<f64> {
        let id = self.resolver.resolve(path)?;
        let entry = cached(&mut self.trees, &mut self.resolver, &self.builder, id);
        let mut cx = Cx::new(&mut self.resolver, &self.builder, &self.config);
        cx.evaluator = self.evaluator.as_deref();
        Ok(if entry.node.is_visible(&mut cx) {
            entry.node.element_height(&mut cx)
        } else {
            0.0
        })
    }

    /// Draw the tree at `path`, claiming space from `surface`.
    ///
    /// A path that does not resolve is drawn as an error line.
    pub fn draw_path(&mut self, path: &str, surface: &mut dyn RenderSurface) -> DrawResult {
        let id = match self.resolver.resolve(path) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(path, %err, "cannot draw unresolved path");
                return surface.error_line(None, &format!("{path}: {err}"));
            }
        };
        let entry = cached(&mut self.trees, &mut self.resolver, &self.builder, id);
        let mut cx = Cx::new(&mut self.resolver, &self.builder, &self.config);
        cx.evaluator = self.evaluator.as_deref();
        entry.node.draw(&mut cx, surface, None)
    }

    /// Draw the whole graph.
    pub fn draw_root(&mut self, surface: &mut dyn RenderSurface) -> DrawResult {
        self.draw_path("", surface)
    }
}

fn cached<'t>(
    trees: &'t mut HashMap<CacheKey, Entry>,
    resolver: &mut Resolver,
    builder: &TreeBuilder,
    id: LocationId,
) -> &'t mut Entry {
    let key = CacheKey::of(resolver, id);
    let entry = trees.entry(key).or_insert_with(|| {
        tracing::debug!(?id, "building tree");
        Entry {
            location: id,
            node: builder.build(resolver, id),
        }
    });
    if entry.location != id {
        tracing::debug!(?id, "location replaced, rebuilding tree");
        entry.location = id;
        entry.node = builder.build(resolver, id);
    }
    entry
}
