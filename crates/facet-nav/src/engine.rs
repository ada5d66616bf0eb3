// Copyright 2026 FacetNav Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The virtual tree materializer and the exposed navigation API.
//!
//! A [`FacetNav`] owns the resolved scope, the parsed facet specs and the
//! bucket resolver. Traversal happens through [`NavView`] handles: one view is
//! one memoization namespace, so deriving an overlaid view (inherited
//! constraint or free-text term) starts a fresh lazily-built root and the base
//! view's materialized nodes are never touched.
//!
//! Tree shape, per facet-choice node (the root and every bucket node):
//! one `Facet` child per configured spec, labelled with the spec's node name;
//! each `Facet` child's children are its resolved buckets; every bucket node
//! also carries a `resultset` child with the documents matching its
//! constraint. Appending a `(facet, value)` pair that is already present in
//! the accumulated constraint forces the bucket to an empty leaf, which is
//! what keeps the otherwise-unbounded cross-product finite while still
//! allowing the same facet to be re-sliced at different values deeper down.

use crate::config::NavConfig;
use crate::error::NavError;
use crate::provider::{ProviderRequest, QueryProvider};
use crate::resolve::Resolver;
use crate::spec::FacetSpec;
use crate::tree::{ExpandOpts, NodeBacking, NodeKind, VirtualNode, RESULTSET};
use crate::types::{ConstraintEntry, ConstraintValue, DocBaseQuery, DocumentRef, FacetConstraint};
use serde::Serialize;
use std::sync::Arc;

struct EngineInner {
    resolver: Resolver,
    specs: Vec<FacetSpec>,
    scope: Option<DocBaseQuery>,
    config: NavConfig,
}

/// The faceted navigation engine.
#[derive(Clone)]
pub struct FacetNav {
    inner: Arc<EngineInner>,
    base: NavView,
}

impl FacetNav {
    /// Build an engine over `provider` with an already-parsed spec list.
    ///
    /// An unresolvable docbase is not fatal: the root degrades to an empty
    /// zero-count tree and a warning is logged, so an interactive caller
    /// still gets something to render.
    pub fn new(provider: Arc<dyn QueryProvider>, specs: Vec<FacetSpec>, config: NavConfig) -> Self {
        let scope = match provider.parse_scope(&config.docbase) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(
                    docbase = %config.docbase,
                    error = %e,
                    "docbase scope unresolved; navigation root will be empty"
                );
                None
            }
        };
        let inner = Arc::new(EngineInner {
            resolver: Resolver::new(provider),
            specs,
            scope,
            config,
        });
        let base = NavView::fresh(inner.clone(), FacetConstraint::empty(), None);
        FacetNav { inner, base }
    }

    pub fn specs(&self) -> &[FacetSpec] {
        &self.inner.specs
    }

    /// The unfiltered base view. Cheap to clone; clones share materialized
    /// nodes.
    pub fn view(&self) -> NavView {
        self.base.clone()
    }

    /// Convenience: resolve a path on the base view with the configured
    /// default deadline.
    pub fn get_node(&self, path: &[&str]) -> Result<VirtualNodeView, NavError> {
        self.base.get_node(path, &self.inner.config.expand_opts())
    }
}

/// Snapshot of one node handed to the UI layer.
#[derive(Debug, Clone, Serialize)]
pub struct VirtualNodeView {
    pub name: String,
    pub kind: NodeKind,
    pub count: u64,
    /// `(child name, child count)` in resolved order.
    pub children: Vec<(String, u64)>,
    /// Only present on `resultset` nodes.
    pub documents: Option<Vec<DocumentRef>>,
}

/// One logical view of the tree: the base view, or a re-scoped overlay with
/// an inherited constraint and/or a free-text term. Each view owns its own
/// root, hence its own expansion cache. Clones share materialized nodes.
#[derive(Clone)]
pub struct NavView {
    engine: Arc<EngineInner>,
    inherited: FacetConstraint,
    free_text: Option<String>,
    root: Arc<VirtualNode>,
}

impl NavView {
    fn fresh(
        engine: Arc<EngineInner>,
        inherited: FacetConstraint,
        free_text: Option<String>,
    ) -> NavView {
        // with no resolvable scope the root is committed empty immediately
        let root = VirtualNode::root(inherited.clone(), engine.scope.is_none());
        NavView {
            engine,
            inherited,
            free_text,
            root,
        }
    }

    /// Re-scope this view under an externally imposed constraint (an
    /// enclosing filtered view). The inherited pairs are prepended to every
    /// provider call made while traversing the returned view.
    pub fn with_inherited(&self, inherited: FacetConstraint) -> NavView {
        NavView::fresh(
            self.engine.clone(),
            self.inherited.prepend_to(&inherited),
            self.free_text.clone(),
        )
    }

    /// Re-scope this view under a free-text term. Every count in the
    /// returned view is at most the corresponding count in `self`.
    pub fn with_free_text(&self, term: impl Into<String>) -> NavView {
        NavView::fresh(
            self.engine.clone(),
            self.inherited.clone(),
            Some(term.into()),
        )
    }

    pub fn inherited(&self) -> &FacetConstraint {
        &self.inherited
    }

    pub fn free_text(&self) -> Option<&str> {
        self.free_text.as_deref()
    }

    /// Resolve a path into the tree, expanding nodes on demand. Segments are
    /// a facet's node name, a bucket value, or the literal `resultset`. An
    /// unknown segment is `NotFound`; an empty bucket is a valid node.
    pub fn get_node(&self, path: &[&str], opts: &ExpandOpts) -> Result<VirtualNodeView, NavError> {
        let mut cur = self.root.clone();
        self.expand(&cur, opts)?;
        for (i, seg) in path.iter().enumerate() {
            let next = cur
                .child(seg)
                .ok_or_else(|| NavError::NotFound(path[..=i].join("/")))?;
            self.expand(&next, opts)?;
            cur = next;
        }
        Ok(self.view_of(&cur))
    }

    /// Raw node access for callers that want to walk the tree themselves.
    pub fn root(&self) -> Arc<VirtualNode> {
        self.root.clone()
    }

    /// Expand one node (idempotent; memoized on the node itself).
    pub fn expand(&self, node: &Arc<VirtualNode>, opts: &ExpandOpts) -> Result<(), NavError> {
        node.expand_with(|| self.build_children(node, opts))
    }

    fn request<'a>(
        &'a self,
        scope: &'a DocBaseQuery,
        constraint: &'a FacetConstraint,
    ) -> ProviderRequest<'a> {
        ProviderRequest {
            scope,
            constraint,
            free_text: self.free_text.as_deref(),
        }
    }

    fn provider(&self) -> &Arc<dyn QueryProvider> {
        self.engine.resolver.provider()
    }

    fn build_children(
        &self,
        node: &Arc<VirtualNode>,
        opts: &ExpandOpts,
    ) -> Result<Vec<Arc<VirtualNode>>, NavError> {
        let scope = self.engine.scope.as_ref().ok_or(NavError::MissingScope)?;
        if node.depth() >= self.engine.config.max_depth {
            return Err(NavError::DepthExceeded);
        }
        opts.check()?;
        tracing::debug!(path = %node.path().join("/"), kind = ?node.kind(), "expanding node");

        match node.kind() {
            NodeKind::Root | NodeKind::Bucket => {
                if node.kind() == NodeKind::Root {
                    let req = self.request(scope, node.constraint());
                    let docs = self
                        .provider()
                        .matching_documents(&req)
                        .map_err(NavError::from)?;
                    node.set_count(docs.len() as u64);
                }
                let mut kids = Vec::with_capacity(self.engine.specs.len() + 1);
                for spec in &self.engine.specs {
                    kids.push(VirtualNode::new(
                        spec.node_name.clone(),
                        node.path(),
                        node.depth() + 1,
                        NodeKind::Facet,
                        NodeBacking::Synthetic,
                        node.constraint().clone(),
                        Some(node.count()),
                        false,
                    ));
                }
                kids.push(VirtualNode::new(
                    RESULTSET,
                    node.path(),
                    node.depth() + 1,
                    NodeKind::ResultSet,
                    NodeBacking::Synthetic,
                    node.constraint().clone(),
                    Some(node.count()),
                    false,
                ));
                Ok(kids)
            }
            NodeKind::Facet => {
                let spec = self
                    .engine
                    .specs
                    .iter()
                    .find(|s| s.node_name == node.name())
                    .ok_or_else(|| NavError::NotFound(node.path().join("/")))?;
                opts.check()?;
                let req = self.request(scope, node.constraint());
                let buckets = self
                    .engine
                    .resolver
                    .resolve(spec, &req)
                    .map_err(NavError::from)?;
                let mut kids = Vec::with_capacity(buckets.len());
                for bucket in buckets {
                    let value = match spec.range_named(&bucket.value) {
                        Some(r) => ConstraintValue::Range(r.clone()),
                        None => ConstraintValue::Equals(bucket.value.clone()),
                    };
                    let entry = ConstraintEntry {
                        facet: spec.property.clone(),
                        value,
                    };
                    // leaf-on-repeat: re-selecting an already-applied pair
                    // would leave the constraint set unchanged, so the child
                    // becomes a countable but unexpandable leaf
                    let repeated = node.constraint().contains(&entry);
                    let constraint = if repeated {
                        node.constraint().clone()
                    } else {
                        node.constraint().push(entry)
                    };
                    kids.push(VirtualNode::new(
                        bucket.value,
                        node.path(),
                        node.depth() + 1,
                        NodeKind::Bucket,
                        NodeBacking::Synthetic,
                        constraint,
                        Some(bucket.count),
                        repeated,
                    ));
                }
                Ok(kids)
            }
            NodeKind::ResultSet => {
                let req = self.request(scope, node.constraint());
                let docs = self
                    .provider()
                    .matching_documents(&req)
                    .map_err(NavError::from)?;
                Ok(docs
                    .into_iter()
                    .map(|doc| {
                        VirtualNode::new(
                            doc.id.clone(),
                            node.path(),
                            node.depth() + 1,
                            NodeKind::Document,
                            NodeBacking::Real(doc),
                            node.constraint().clone(),
                            Some(1),
                            true,
                        )
                    })
                    .collect())
            }
            // document nodes are constructed as committed leaves
            NodeKind::Document => Ok(Vec::new()),
        }
    }

    fn view_of(&self, node: &Arc<VirtualNode>) -> VirtualNodeView {
        let children = node
            .children()
            .map(|kids| {
                kids.iter()
                    .map(|c| (c.name().to_string(), c.count()))
                    .collect()
            })
            .unwrap_or_default();
        let documents = if node.kind() == NodeKind::ResultSet {
            Some(
                node.children()
                    .map(|kids| kids.iter().filter_map(|c| c.document().cloned()).collect())
                    .unwrap_or_default(),
            )
        } else {
            None
        };
        VirtualNodeView {
            name: node.name().to_string(),
            kind: node.kind(),
            count: node.count(),
            children,
            documents,
        }
    }
}
