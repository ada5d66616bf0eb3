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

use crate::spec::RangeBucketSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a document in the backing store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub id: String,
    /// Store path, for display only.
    pub path: String,
}

/// A property value as reported by the query provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TypedValue {
    Long(i64),
    Double(f64),
    Str(String),
    Date(DateTime<Utc>),
}

impl TypedValue {
    /// Canonical string form used as histogram keys and equality constraints.
    pub fn as_key(&self) -> String {
        match self {
            TypedValue::Long(n) => n.to_string(),
            TypedValue::Double(f) => f.to_string(),
            TypedValue::Str(s) => s.clone(),
            TypedValue::Date(d) => d.to_rfc3339(),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

/// Resolved document scope produced by `QueryProvider::parse_scope`.
/// Opaque to the engine beyond its identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocBaseQuery {
    pub docbase: String,
}

/// One resolved facet bucket: a discovered value or a configured range name,
/// plus the number of documents falling into it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    pub value: String,
    pub count: u64,
}

/// The value side of one constraint pair: an exact discovered value for plain
/// facets, or the full configured range for range facets (the provider needs
/// the bounds to filter, not just the bucket label).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ConstraintValue {
    Equals(String),
    Range(RangeBucketSpec),
}

impl ConstraintValue {
    /// Display label: the value itself, or the range bucket's name.
    pub fn label(&self) -> &str {
        match self {
            ConstraintValue::Equals(v) => v,
            ConstraintValue::Range(r) => &r.name,
        }
    }
}

/// One accumulated `(facet, value)` pair on a tree path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstraintEntry {
    pub facet: String,
    pub value: ConstraintValue,
}

/// Ordered list of constraint pairs accumulated from the tree root down.
///
/// Order matters for display and cache keys; duplicate detection (the
/// leaf-on-repeat rule) treats the list as a set of pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FacetConstraint {
    entries: Vec<ConstraintEntry>,
}

impl FacetConstraint {
    pub fn empty() -> Self {
        FacetConstraint::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ConstraintEntry] {
        &self.entries
    }

    /// True if the exact pair is already present (set-wise).
    pub fn contains(&self, entry: &ConstraintEntry) -> bool {
        self.entries.iter().any(|e| e == entry)
    }

    /// New constraint with `entry` appended.
    pub fn push(&self, entry: ConstraintEntry) -> Self {
        let mut entries = self.entries.clone();
        entries.push(entry);
        FacetConstraint { entries }
    }

    /// New constraint with all of `self`'s entries prepended to `other`'s.
    /// Used to impose an inherited constraint ahead of the path-accumulated one.
    pub fn prepend_to(&self, other: &FacetConstraint) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(other.entries.iter().cloned());
        FacetConstraint { entries }
    }

    /// Stable textual form used for memoization keys and logs.
    pub fn cache_key(&self) -> String {
        let mut out = String::new();
        for e in &self.entries {
            out.push_str(&e.facet);
            match &e.value {
                ConstraintValue::Equals(v) => {
                    out.push('=');
                    out.push_str(v);
                }
                ConstraintValue::Range(r) => {
                    out.push('~');
                    out.push_str(&r.name);
                }
            }
            out.push(';');
        }
        out
    }
}

impl fmt::Display for FacetConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}
