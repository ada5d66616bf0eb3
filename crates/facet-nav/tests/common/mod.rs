#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use facet_nav::{
    build_memory_nav, ExpandOpts, FacetNav, MemoryDoc, MemoryProvider, ProviderRequest,
    QueryProvider, ScopeError, TypedValue,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const DOCBASE: &str = "cars";

/// Nine cars across three brands; price values straddle the 10000 and 20000
/// bucket edges exactly so bound inclusivity is observable.
pub fn car_provider() -> Arc<MemoryProvider> {
    let p = Arc::new(MemoryProvider::new());
    let cars: &[(&str, &str, &str, i64, (i32, u32, u32), &str)] = &[
        ("p1", "peugeot", "red", 4000, (2023, 1, 15), "small red peugeot city car"),
        ("p2", "peugeot", "blue", 7500, (2023, 3, 2), "blue peugeot hatchback"),
        ("p3", "peugeot", "red", 9999, (2023, 7, 21), "red peugeot almost ten grand"),
        ("p4", "peugeot", "green", 10000, (2024, 2, 11), "green peugeot exactly ten grand"),
        ("f1", "fiat", "red", 12500, (2023, 11, 30), "red fiat panda"),
        ("f2", "fiat", "blue", 18000, (2024, 5, 9), "blue fiat family car"),
        ("f3", "fiat", "white", 20000, (2024, 6, 1), "white fiat exactly twenty"),
        ("b1", "bmw", "black", 25000, (2024, 8, 17), "black bmw sedan"),
        ("b2", "bmw", "blue", 30000, (2025, 1, 5), "blue bmw touring"),
    ];
    for (id, brand, color, price, (y, m, d), text) in cars {
        // mid-morning timestamp so day-resolution buckets must truncate
        let registered = Utc
            .with_ymd_and_hms(*y, *m, *d, 10, 30, 0)
            .single()
            .expect("valid fixture date");
        p.add_doc(
            DOCBASE,
            MemoryDoc::new(*id, format!("/content/cars/{}", id))
                .prop("brand", vec![TypedValue::Str((*brand).into())])
                .prop("color", vec![TypedValue::Str((*color).into())])
                .prop("price", vec![TypedValue::Long(*price)])
                .prop("registered", vec![TypedValue::Date(registered)])
                .text(*text),
        );
    }
    p
}

/// The price descriptor from the observed fixture: three bounded buckets plus
/// a catch-all, in configuration order first..fourth.
pub const PRICE_FACET: &str = "price$[{name:'first', resolution:'long', end:10000}, \
     {name:'second', resolution:'long', begin:10000, end:20000}, \
     {name:'third', resolution:'long', begin:20000}, \
     {name:'fourth'}]";

pub fn nav_with(provider: Arc<MemoryProvider>, facets: &[&str]) -> FacetNav {
    let raw: Vec<String> = facets.iter().map(|s| s.to_string()).collect();
    build_memory_nav(provider, DOCBASE, &raw, &[]).expect("facet descriptors parse")
}

pub fn opts() -> ExpandOpts {
    ExpandOpts::default()
}

/// Provider wrapper counting backend calls, for the idempotent-expansion
/// assertions. `parse_scope` is configuration-time and deliberately not
/// counted.
pub struct CountingProvider {
    inner: Arc<MemoryProvider>,
    calls: AtomicUsize,
}

impl CountingProvider {
    pub fn new(inner: Arc<MemoryProvider>) -> Self {
        CountingProvider {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QueryProvider for CountingProvider {
    fn parse_scope(&self, docbase: &str) -> Result<facet_nav::DocBaseQuery, ScopeError> {
        self.inner.parse_scope(docbase)
    }

    fn count_by_value(
        &self,
        req: &ProviderRequest<'_>,
        property: &str,
    ) -> anyhow::Result<BTreeMap<String, u64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.count_by_value(req, property)
    }

    fn values_for_range(
        &self,
        req: &ProviderRequest<'_>,
        property: &str,
    ) -> anyhow::Result<Vec<Vec<TypedValue>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.values_for_range(req, property)
    }

    fn matching_documents(
        &self,
        req: &ProviderRequest<'_>,
    ) -> anyhow::Result<Vec<facet_nav::DocumentRef>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.matching_documents(req)
    }
}
