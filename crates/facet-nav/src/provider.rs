//! The consumed query-provider boundary.
//!
//! The engine never talks to the content store directly; everything goes
//! through [`QueryProvider`]. Every call carries the full accumulated
//! constraint (with any inherited constraint already prepended by the view)
//! and the optional free-text term, so a stricter overlay can only shrink
//! what the provider reports.

use crate::types::{DocBaseQuery, DocumentRef, FacetConstraint, TypedValue};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display};

/// Scope resolution failure. Non-fatal to navigation: the engine degrades to
/// an empty zero-count root and logs a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    UnknownDocbase(String),
    Invalid(String),
}

impl Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::UnknownDocbase(s) => write!(f, "unknown docbase: {}", s),
            ScopeError::Invalid(s) => write!(f, "invalid docbase identifier: {}", s),
        }
    }
}

impl Error for ScopeError {}

/// One provider call's context: the resolved scope, the accumulated
/// constraint path, and the optional free-text overlay term.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRequest<'a> {
    pub scope: &'a DocBaseQuery,
    pub constraint: &'a FacetConstraint,
    pub free_text: Option<&'a str>,
}

/// External query/index collaborator. Assumed stateless and read-only from
/// the engine's perspective; the engine issues no writes through it.
pub trait QueryProvider: Send + Sync {
    /// Resolve a docbase identifier to a scope handle.
    fn parse_scope(&self, docbase: &str) -> Result<DocBaseQuery, ScopeError>;

    /// Value -> document-count histogram for one property under the request's
    /// constraint. Multi-valued properties count once per distinct value per
    /// document; absent values simply do not appear.
    fn count_by_value(
        &self,
        req: &ProviderRequest<'_>,
        property: &str,
    ) -> anyhow::Result<BTreeMap<String, u64>>;

    /// Raw property values for client-side range classification, grouped one
    /// inner list per matching document. The grouping keeps a multi-valued
    /// document from being counted twice into the same bucket; a document
    /// without the property contributes an empty list (it still belongs in
    /// catch-all buckets).
    fn values_for_range(
        &self,
        req: &ProviderRequest<'_>,
        property: &str,
    ) -> anyhow::Result<Vec<Vec<TypedValue>>>;

    /// The terminal result set for the request's constraint, in stable order.
    fn matching_documents(&self, req: &ProviderRequest<'_>) -> anyhow::Result<Vec<DocumentRef>>;
}
