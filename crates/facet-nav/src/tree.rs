//! Virtual navigation nodes.
//!
//! Nodes are created on first access and live only for the view that
//! materialized them; nothing here is persisted. A node's children are
//! populated at most once: the `OnceCell` is the claim-once guard, so
//! concurrent callers of an unexpanded node block on the first initializer
//! instead of issuing duplicate backend calls, and a completed expansion is
//! never replaced. After expansion a node is effectively immutable and can be
//! traversed by any number of readers.

use crate::error::NavError;
use crate::types::{DocumentRef, FacetConstraint};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Reserved path segment selecting a bucket node's terminal result set.
pub const RESULTSET: &str = "resultset";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    /// The tree root: a facet-choice node over the whole scope.
    Root,
    /// One configured facet's container; children are its buckets.
    Facet,
    /// One bucket value/range; a facet-choice node again, plus a result set.
    Bucket,
    /// Terminal node holding the matching documents.
    ResultSet,
    /// One document reference inside a result set.
    Document,
}

/// What a node stands for: a real stored document, or a synthetic in-memory
/// tree position. Dispatched explicitly instead of through a nullable
/// delegate.
#[derive(Debug, Clone)]
pub enum NodeBacking {
    Real(DocumentRef),
    Synthetic,
}

/// Per-call expansion options. Mirrors the searcher-style options struct:
/// callers rendering interactive trees set a deadline so a slow provider
/// fails with `Timeout` instead of hanging the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandOpts {
    pub deadline: Option<Instant>,
}

impl ExpandOpts {
    pub fn with_deadline(budget: Duration) -> Self {
        ExpandOpts {
            deadline: Some(Instant::now() + budget),
        }
    }

    /// Check the deadline before issuing a provider call.
    pub fn check(&self) -> Result<(), NavError> {
        match self.deadline {
            Some(d) if Instant::now() > d => Err(NavError::Timeout),
            _ => Ok(()),
        }
    }
}

/// One lazily materialized node of the navigation tree.
pub struct VirtualNode {
    name: String,
    path: Vec<String>,
    depth: usize,
    kind: NodeKind,
    backing: NodeBacking,
    constraint: FacetConstraint,
    count: OnceCell<u64>,
    children: OnceCell<Vec<Arc<VirtualNode>>>,
}

impl VirtualNode {
    pub(crate) fn new(
        name: impl Into<String>,
        parent_path: &[String],
        depth: usize,
        kind: NodeKind,
        backing: NodeBacking,
        constraint: FacetConstraint,
        count: Option<u64>,
        forced_leaf: bool,
    ) -> Arc<VirtualNode> {
        let name = name.into();
        let mut path = parent_path.to_vec();
        path.push(name.clone());
        let count_cell = match count {
            Some(c) => OnceCell::with_value(c),
            None => OnceCell::new(),
        };
        // forced leaves commit empty children up front; expansion then is a
        // no-op and the leaf stays a leaf
        let children = if forced_leaf {
            OnceCell::with_value(Vec::new())
        } else {
            OnceCell::new()
        };
        Arc::new(VirtualNode {
            name,
            path,
            depth,
            kind,
            backing,
            constraint,
            count: count_cell,
            children,
        })
    }

    pub(crate) fn root(constraint: FacetConstraint, empty: bool) -> Arc<VirtualNode> {
        let children = if empty {
            OnceCell::with_value(Vec::new())
        } else {
            OnceCell::new()
        };
        Arc::new(VirtualNode {
            name: String::new(),
            path: Vec::new(),
            depth: 0,
            kind: NodeKind::Root,
            backing: NodeBacking::Synthetic,
            constraint,
            count: OnceCell::new(),
            children,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root-relative path segments.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn backing(&self) -> &NodeBacking {
        &self.backing
    }

    pub fn constraint(&self) -> &FacetConstraint {
        &self.constraint
    }

    /// Documents matching this node's constraint. Zero until the count has
    /// been established (unexpanded root under a missing scope).
    pub fn count(&self) -> u64 {
        self.count.get().copied().unwrap_or(0)
    }

    pub(crate) fn set_count(&self, n: u64) {
        // first writer wins; a memoized count is never replaced
        let _ = self.count.set(n);
    }

    pub fn expanded(&self) -> bool {
        self.children.get().is_some()
    }

    /// Children, if this node has been expanded.
    pub fn children(&self) -> Option<&[Arc<VirtualNode>]> {
        self.children.get().map(|c| c.as_slice())
    }

    pub fn child(&self, name: &str) -> Option<Arc<VirtualNode>> {
        self.children
            .get()?
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    /// The document behind a `Real`-backed node.
    pub fn document(&self) -> Option<&DocumentRef> {
        match &self.backing {
            NodeBacking::Real(doc) => Some(doc),
            NodeBacking::Synthetic => None,
        }
    }

    /// Run `build` at most once to populate children. Concurrent callers
    /// block on the winning initializer. `DepthExceeded` and `MissingScope`
    /// degrade to a committed empty leaf; `Timeout` and `Backend` leave the
    /// node unexpanded so a later call can retry.
    pub(crate) fn expand_with<F>(&self, build: F) -> Result<(), NavError>
    where
        F: FnOnce() -> Result<Vec<Arc<VirtualNode>>, NavError>,
    {
        self.children
            .get_or_try_init(|| match build() {
                Ok(kids) => Ok(kids),
                Err(NavError::DepthExceeded) | Err(NavError::MissingScope) => {
                    tracing::debug!(path = %self.path.join("/"), "expansion degraded to empty leaf");
                    Ok(Vec::new())
                }
                Err(e) => Err(e),
            })
            .map(|_| ())
    }
}

impl std::fmt::Debug for VirtualNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualNode")
            .field("path", &self.path.join("/"))
            .field("kind", &self.kind)
            .field("count", &self.count())
            .field("expanded", &self.expanded())
            .finish()
    }
}
