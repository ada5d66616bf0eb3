use crate::provider::{ProviderRequest, QueryProvider, ScopeError};
use crate::types::{ConstraintValue, DocBaseQuery, DocumentRef, FacetConstraint, TypedValue};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// One registered document: multi-valued typed properties plus an optional
/// full-text body for the free-text overlay.
#[derive(Debug, Clone)]
pub struct MemoryDoc {
    pub id: String,
    pub path: String,
    pub props: HashMap<String, Vec<TypedValue>>,
    pub text: Option<String>,
}

impl MemoryDoc {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        MemoryDoc {
            id: id.into(),
            path: path.into(),
            props: HashMap::new(),
            text: None,
        }
    }

    pub fn prop(mut self, name: impl Into<String>, values: Vec<TypedValue>) -> Self {
        self.props.insert(name.into(), values);
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    /// docbase identifier -> documents in registration order
    scopes: HashMap<String, Vec<MemoryDoc>>,
}

/// In-memory [`QueryProvider`] for tests and demos. Not the production
/// content-store adapter; counting and filtering semantics match what the
/// engine expects from a real index provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        MemoryProvider::default()
    }

    pub fn add_doc(&self, docbase: &str, doc: MemoryDoc) {
        self.inner
            .write()
            .scopes
            .entry(docbase.to_string())
            .or_default()
            .push(doc);
    }

    pub fn doc_count(&self, docbase: &str) -> usize {
        self.inner
            .read()
            .scopes
            .get(docbase)
            .map(|d| d.len())
            .unwrap_or(0)
    }

    fn doc_matches(doc: &MemoryDoc, constraint: &FacetConstraint, free_text: Option<&str>) -> bool {
        if let Some(term) = free_text {
            let term = term.to_lowercase();
            let hit = doc
                .text
                .as_ref()
                .map(|t| t.to_lowercase().contains(&term))
                .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        for entry in constraint.entries() {
            let values = doc.props.get(&entry.facet);
            let hit = match &entry.value {
                ConstraintValue::Equals(want) => values
                    .map(|vs| vs.iter().any(|v| v.as_key() == *want))
                    .unwrap_or(false),
                // A catch-all range keeps every document in scope, even ones
                // without the property; bounded ranges need a matching value.
                ConstraintValue::Range(r) if r.is_catch_all() => true,
                ConstraintValue::Range(r) => values
                    .map(|vs| vs.iter().any(|v| r.matches(v)))
                    .unwrap_or(false),
            };
            if !hit {
                return false;
            }
        }
        true
    }

    fn with_matching<T>(
        &self,
        req: &ProviderRequest<'_>,
        mut f: impl FnMut(&MemoryDoc) -> Option<T>,
    ) -> Vec<T> {
        let inner = self.inner.read();
        let docs = match inner.scopes.get(&req.scope.docbase) {
            Some(d) => d,
            None => return Vec::new(),
        };
        docs.iter()
            .filter(|d| Self::doc_matches(d, req.constraint, req.free_text))
            .filter_map(|d| f(d))
            .collect()
    }
}

impl QueryProvider for MemoryProvider {
    fn parse_scope(&self, docbase: &str) -> Result<DocBaseQuery, ScopeError> {
        if docbase.is_empty() {
            return Err(ScopeError::Invalid("empty identifier".into()));
        }
        if self.inner.read().scopes.contains_key(docbase) {
            Ok(DocBaseQuery {
                docbase: docbase.to_string(),
            })
        } else {
            Err(ScopeError::UnknownDocbase(docbase.to_string()))
        }
    }

    fn count_by_value(
        &self,
        req: &ProviderRequest<'_>,
        property: &str,
    ) -> anyhow::Result<BTreeMap<String, u64>> {
        let mut hist: BTreeMap<String, u64> = BTreeMap::new();
        self.with_matching(req, |doc| {
            if let Some(values) = doc.props.get(property) {
                // distinct values only: [a, b, a] counts a once for this doc
                let distinct: BTreeSet<String> = values.iter().map(|v| v.as_key()).collect();
                for key in distinct {
                    *hist.entry(key).or_insert(0) += 1;
                }
            }
            None::<()>
        });
        Ok(hist)
    }

    fn values_for_range(
        &self,
        req: &ProviderRequest<'_>,
        property: &str,
    ) -> anyhow::Result<Vec<Vec<TypedValue>>> {
        Ok(self.with_matching(req, |doc| {
            Some(doc.props.get(property).cloned().unwrap_or_default())
        }))
    }

    fn matching_documents(&self, req: &ProviderRequest<'_>) -> anyhow::Result<Vec<DocumentRef>> {
        Ok(self.with_matching(req, |doc| {
            Some(DocumentRef {
                id: doc.id.clone(),
                path: doc.path.clone(),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req<'a>(
        scope: &'a DocBaseQuery,
        constraint: &'a FacetConstraint,
    ) -> ProviderRequest<'a> {
        ProviderRequest {
            scope,
            constraint,
            free_text: None,
        }
    }

    #[test]
    fn multi_valued_counts_once_per_distinct_value() {
        let p = MemoryProvider::new();
        p.add_doc(
            "cars",
            MemoryDoc::new("d1", "/d1").prop(
                "color",
                vec![
                    TypedValue::Str("red".into()),
                    TypedValue::Str("blue".into()),
                    TypedValue::Str("red".into()),
                ],
            ),
        );
        let scope = p.parse_scope("cars").unwrap();
        let c = FacetConstraint::empty();
        let hist = p.count_by_value(&req(&scope, &c), "color").unwrap();
        assert_eq!(hist.get("red"), Some(&1));
        assert_eq!(hist.get("blue"), Some(&1));
    }

    #[test]
    fn unknown_docbase_is_a_scope_error() {
        let p = MemoryProvider::new();
        assert!(matches!(
            p.parse_scope("nope"),
            Err(ScopeError::UnknownDocbase(_))
        ));
        assert!(matches!(p.parse_scope(""), Err(ScopeError::Invalid(_))));
    }
}
