//! Faceted navigation engine: turns a facet specification plus a base
//! document scope into a lazy, memoized virtual tree of countable bucket
//! nodes, with terminal result sets.
//!
//! The content store itself is behind the [`provider::QueryProvider`] trait;
//! this crate only implements the tree algebra (bucket resolution, lazy
//! expansion, leaf-on-repeat cycle breaking, constraint inheritance and the
//! free-text overlay). A small in-memory provider is included for tests and
//! demos.

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod provider;
pub mod resolve;
pub mod spec;
pub mod tree;
pub mod types;

pub use crate::config::{load_nav_config, MergeOpts, NavConfig};
pub use crate::engine::{FacetNav, NavView, VirtualNodeView};
pub use crate::error::NavError;
pub use crate::memory::{MemoryDoc, MemoryProvider};
pub use crate::provider::{ProviderRequest, QueryProvider, ScopeError};
pub use crate::resolve::Resolver;
pub use crate::spec::{
    parse_facet_specs, Bound, FacetSpec, ParseError, RangeBucketSpec, Resolution, SortBy,
    SortOrder,
};
pub use crate::tree::{ExpandOpts, NodeBacking, NodeKind, VirtualNode, RESULTSET};
pub use crate::types::{
    Bucket, ConstraintEntry, ConstraintValue, DocBaseQuery, DocumentRef, FacetConstraint,
    TypedValue,
};

/// Convenience for callers who want a one-shot engine over an in-memory
/// corpus: parse the descriptors and point the engine at `docbase`.
pub fn build_memory_nav(
    provider: std::sync::Arc<MemoryProvider>,
    docbase: &str,
    raw_facets: &[String],
    node_names: &[String],
) -> Result<FacetNav, ParseError> {
    let specs = parse_facet_specs(raw_facets, node_names)?;
    let config = NavConfig {
        docbase: docbase.to_string(),
        ..NavConfig::default()
    };
    Ok(FacetNav::new(provider, specs, config))
}
