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

//! Facet specification types and range classification.
//!
//! A `FacetSpec` is parsed once from a configuration descriptor (see
//! `parser`) and is immutable afterwards. Range classification is half-open
//! `[begin, end)` for numeric and date resolutions (date values are truncated
//! to the calendar unit first) and half-open ordinal `[lower, upper)` for the
//! string resolution. A bucket with no bounds at all is a catch-all and
//! matches every document; buckets may overlap by design.

mod parser;

pub use parser::{parse_facet_specs, ParseError};

use crate::types::TypedValue;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity a range facet's bounds and values are compared at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Day,
    Month,
    Year,
    #[default]
    Long,
    Double,
    Str,
}

impl Resolution {
    pub fn from_keyword(kw: &str) -> Option<Resolution> {
        match kw {
            "day" => Some(Resolution::Day),
            "month" => Some(Resolution::Month),
            "year" => Some(Resolution::Year),
            "long" => Some(Resolution::Long),
            "double" => Some(Resolution::Double),
            "string" => Some(Resolution::Str),
            _ => None,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Resolution::Day | Resolution::Month | Resolution::Year)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resolution::Day => "day",
            Resolution::Month => "month",
            Resolution::Year => "year",
            Resolution::Long => "long",
            Resolution::Double => "double",
            Resolution::Str => "string",
        };
        f.write_str(s)
    }
}

/// A parsed `begin`/`end` bound for numeric and date resolutions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Bound {
    Long(i64),
    Double(f64),
    Date(DateTime<Utc>),
}

impl Bound {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Bound::Long(n) => Some(*n as f64),
            Bound::Double(f) => Some(*f),
            Bound::Date(_) => None,
        }
    }

    fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Bound::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// One configured, named range bucket. Configuration order is significant:
/// it is the default display order of the resolved buckets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RangeBucketSpec {
    pub name: String,
    pub resolution: Resolution,
    /// Inclusive lower bound (numeric/date resolutions); absent = open.
    pub begin: Option<Bound>,
    /// Exclusive upper bound (numeric/date resolutions); absent = open.
    pub end: Option<Bound>,
    /// Inclusive lower bound, string resolution only.
    pub lower: Option<String>,
    /// Exclusive upper bound, string resolution only.
    pub upper: Option<String>,
}

impl RangeBucketSpec {
    /// A bucket with no bounds at all matches every document ("all" aggregate).
    pub fn is_catch_all(&self) -> bool {
        self.begin.is_none() && self.end.is_none() && self.lower.is_none() && self.upper.is_none()
    }

    /// Bounded buckets stay visible at zero count; catch-alls do not.
    pub fn has_explicit_bounds(&self) -> bool {
        !self.is_catch_all()
    }

    /// Classify one property value against this bucket.
    pub fn matches(&self, value: &TypedValue) -> bool {
        if self.is_catch_all() {
            return true;
        }
        match self.resolution {
            Resolution::Str => {
                let s = match value {
                    TypedValue::Str(s) => s.as_str(),
                    _ => return false,
                };
                if let Some(lower) = &self.lower {
                    if s < lower.as_str() {
                        return false;
                    }
                }
                if let Some(upper) = &self.upper {
                    if s >= upper.as_str() {
                        return false;
                    }
                }
                true
            }
            Resolution::Long | Resolution::Double => {
                let v = match value {
                    TypedValue::Long(n) => *n as f64,
                    TypedValue::Double(f) => *f,
                    _ => return false,
                };
                if let Some(b) = self.begin.as_ref().and_then(Bound::as_f64) {
                    if v < b {
                        return false;
                    }
                } else if self.begin.is_some() {
                    return false;
                }
                if let Some(e) = self.end.as_ref().and_then(Bound::as_f64) {
                    if v >= e {
                        return false;
                    }
                } else if self.end.is_some() {
                    return false;
                }
                true
            }
            Resolution::Day | Resolution::Month | Resolution::Year => {
                let v = match value {
                    TypedValue::Date(d) => truncate(*d, self.resolution),
                    _ => return false,
                };
                if let Some(b) = self.begin.as_ref().and_then(Bound::as_date) {
                    if v < truncate(b, self.resolution) {
                        return false;
                    }
                } else if self.begin.is_some() {
                    return false;
                }
                if let Some(e) = self.end.as_ref().and_then(Bound::as_date) {
                    if v >= truncate(e, self.resolution) {
                        return false;
                    }
                } else if self.end.is_some() {
                    return false;
                }
                true
            }
        }
    }
}

/// Truncate a timestamp to the calendar unit of the resolution: `day` drops
/// the time of day, `month` additionally resets to the first, `year` to Jan 1.
pub(crate) fn truncate(dt: DateTime<Utc>, res: Resolution) -> DateTime<Utc> {
    let d = dt.date_naive();
    let d = match res {
        Resolution::Month => d.with_day(1).unwrap_or(d),
        Resolution::Year => NaiveDate::from_ymd_opt(d.year(), 1, 1).unwrap_or(d),
        _ => d,
    };
    Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    /// Configuration order for range facets, ascending value order for plain
    /// facets.
    #[default]
    Config,
    /// Sort buckets by their document count.
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One configured facet, immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetSpec {
    /// Source property (or pseudo-property such as a primary type).
    pub property: String,
    /// Child-node label in the virtual tree; defaults to `property`.
    pub node_name: String,
    /// Configured range buckets; `None` makes this a plain facet.
    pub ranges: Option<Vec<RangeBucketSpec>>,
    pub sort_by: SortBy,
    /// Explicit sort order, when the descriptor carried one.
    pub sort_order: Option<SortOrder>,
}

impl FacetSpec {
    pub fn is_range(&self) -> bool {
        self.ranges.is_some()
    }

    /// Effective order when none was configured: config/value sorting is
    /// ascending, count sorting is descending (largest bucket first).
    pub fn effective_sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or(match self.sort_by {
            SortBy::Config => SortOrder::Ascending,
            SortBy::Count => SortOrder::Descending,
        })
    }

    /// Look up a configured range bucket by its name.
    pub fn range_named(&self, name: &str) -> Option<&RangeBucketSpec> {
        self.ranges.as_ref()?.iter().find(|r| r.name == name)
    }
}
