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

//! Bucket resolution: one `FacetSpec` plus one accumulated constraint path
//! turn into an ordered list of buckets.
//!
//! Plain facets delegate counting to the provider histogram; range facets
//! fetch raw values and classify client-side. Sibling subtrees at the same
//! tree level issue identical histogram calls, so resolved histograms go
//! through a small LRU keyed by `(scope, free text, constraint, property)`.

use crate::provider::{ProviderRequest, QueryProvider};
use crate::spec::{FacetSpec, SortBy, SortOrder};
use crate::types::Bucket;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub struct Resolver {
    provider: Arc<dyn QueryProvider>,
    histograms: Mutex<LruCache<String, BTreeMap<String, u64>>>,
}

impl Resolver {
    pub fn new(provider: Arc<dyn QueryProvider>) -> Self {
        let cap = NonZeroUsize::new(128).unwrap();
        Resolver {
            provider,
            histograms: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn provider(&self) -> &Arc<dyn QueryProvider> {
        &self.provider
    }

    /// Resolve the ordered bucket list for `spec` under the request's
    /// constraint. Deterministic given the spec's sort settings and the
    /// current snapshot of backend counts.
    pub fn resolve(&self, spec: &FacetSpec, req: &ProviderRequest<'_>) -> anyhow::Result<Vec<Bucket>> {
        let buckets = if let Some(ranges) = spec.ranges.as_deref() {
            self.resolve_ranges(spec, ranges, req)?
        } else {
            self.resolve_plain(spec, req)?
        };
        tracing::trace!(
            facet = %spec.property,
            constraint = %req.constraint,
            buckets = buckets.len(),
            "resolved facet buckets"
        );
        Ok(buckets)
    }

    fn resolve_plain(
        &self,
        spec: &FacetSpec,
        req: &ProviderRequest<'_>,
    ) -> anyhow::Result<Vec<Bucket>> {
        let key = format!(
            "{}|{}|{}|{}",
            req.scope.docbase,
            req.free_text.unwrap_or(""),
            req.constraint.cache_key(),
            spec.property
        );
        let hist = {
            let cached = self.histograms.lock().get(&key).cloned();
            match cached {
                Some(h) => h,
                None => {
                    let h = self.provider.count_by_value(req, &spec.property)?;
                    self.histograms.lock().put(key, h.clone());
                    h
                }
            }
        };
        // BTreeMap iteration is ascending by value: the deterministic base
        // order a plain facet has in place of configuration order.
        let mut buckets: Vec<Bucket> = hist
            .into_iter()
            .map(|(value, count)| Bucket { value, count })
            .collect();
        sort_buckets(&mut buckets, spec);
        Ok(buckets)
    }

    fn resolve_ranges(
        &self,
        spec: &FacetSpec,
        ranges: &[crate::spec::RangeBucketSpec],
        req: &ProviderRequest<'_>,
    ) -> anyhow::Result<Vec<Bucket>> {
        let per_doc = self.provider.values_for_range(req, &spec.property)?;
        let mut counts = vec![0u64; ranges.len()];
        for values in &per_doc {
            for (i, range) in ranges.iter().enumerate() {
                // catch-alls take every document in scope, including ones
                // without the property at all
                if range.is_catch_all() || values.iter().any(|v| range.matches(v)) {
                    counts[i] += 1;
                }
            }
        }
        let mut buckets: Vec<Bucket> = ranges
            .iter()
            .zip(counts)
            .filter(|(range, count)| *count > 0 || range.has_explicit_bounds())
            .map(|(range, count)| Bucket {
                value: range.name.clone(),
                count,
            })
            .collect();
        sort_buckets(&mut buckets, spec);
        Ok(buckets)
    }
}

/// Apply the spec's sort settings to a bucket list already in base order
/// (configuration order for ranges, ascending value order for plain facets).
fn sort_buckets(buckets: &mut Vec<Bucket>, spec: &FacetSpec) {
    match (spec.sort_by, spec.effective_sort_order()) {
        (SortBy::Config, SortOrder::Ascending) => {}
        (SortBy::Config, SortOrder::Descending) => buckets.reverse(),
        // stable sort keeps the base order as the tie-break
        (SortBy::Count, SortOrder::Descending) => {
            buckets.sort_by_key(|b| std::cmp::Reverse(b.count))
        }
        (SortBy::Count, SortOrder::Ascending) => buckets.sort_by_key(|b| b.count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_facet_specs;

    fn spec_of(raw: &str) -> FacetSpec {
        parse_facet_specs(&[raw.to_string()], &[]).unwrap().remove(0)
    }

    #[test]
    fn count_sort_defaults_to_descending() {
        let spec = spec_of("price$[{name:'a', end:10}, {name:'b', begin:10}]$sortby:'count'");
        let mut buckets = vec![
            Bucket {
                value: "a".into(),
                count: 2,
            },
            Bucket {
                value: "b".into(),
                count: 7,
            },
        ];
        sort_buckets(&mut buckets, &spec);
        assert_eq!(buckets[0].value, "b");
        assert_eq!(buckets[1].value, "a");
    }

    #[test]
    fn config_descending_reverses() {
        let spec = spec_of("price$[{name:'a', end:10}, {name:'b', begin:10}]$sortorder:'descending'");
        let mut buckets = vec![
            Bucket {
                value: "a".into(),
                count: 2,
            },
            Bucket {
                value: "b".into(),
                count: 7,
            },
        ];
        sort_buckets(&mut buckets, &spec);
        assert_eq!(buckets[0].value, "b");
    }
}
