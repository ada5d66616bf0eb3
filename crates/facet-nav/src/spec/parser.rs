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

//! Recursive-descent parser for facet descriptor strings.
//!
//! Descriptor syntax, one string per facet:
//!
//! ```text
//! property
//! property$[{name:'cheap', resolution:'long', end:10000}, {begin:10000}, {}]
//! property$[...]$sortorder:'descending'
//! property${sortby:'count'}
//! ```
//!
//! After the property name, each `$`-separated segment is either a bracketed
//! list of range-bucket literals or a sort modifier (braced or bare
//! `key:'value'` pairs). Bucket literals use JSON-like syntax with bare keys
//! and single- or double-quoted strings. A bucket with no bounds at all is a
//! catch-all ("all" aggregate).

use super::{Bound, FacetSpec, RangeBucketSpec, Resolution, SortBy, SortOrder};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use std::error::Error;
use std::fmt::{self, Display};

/// Typed errors for malformed facet configuration. Parse failures are fatal
/// at configuration-load time and surfaced to the administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A bracket or brace was opened but never closed (or input ended early).
    UnbalancedBraces(String),
    /// `resolution:` carried a keyword other than day/month/year/long/double/string.
    UnknownResolution(String),
    /// A bound value does not fit the bucket's resolution (non-numeric bound
    /// for a numeric resolution, unparseable date, string bound on a numeric
    /// bucket, ...).
    InvalidBound(String),
    /// A bucket literal carried a key other than name/resolution/begin/end/lower/upper.
    UnknownKey(String),
    /// A sort modifier carried an unknown key or value.
    InvalidSort(String),
    /// Node-name overrides were supplied but their count does not match the
    /// facet count.
    NodeNameMismatch { facets: usize, names: usize },
    /// Anything else: empty facet name, stray characters, missing `:`.
    Malformed(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnbalancedBraces(s) => write!(f, "unbalanced braces: {}", s),
            ParseError::UnknownResolution(s) => write!(f, "unknown resolution: {}", s),
            ParseError::InvalidBound(s) => write!(f, "invalid bound: {}", s),
            ParseError::UnknownKey(s) => write!(f, "unknown key: {}", s),
            ParseError::InvalidSort(s) => write!(f, "invalid sort modifier: {}", s),
            ParseError::NodeNameMismatch { facets, names } => write!(
                f,
                "node name count mismatch: {} facets but {} node names",
                facets, names
            ),
            ParseError::Malformed(s) => write!(f, "malformed facet descriptor: {}", s),
        }
    }
}

impl Error for ParseError {}

/// Parse an ordered facet descriptor list plus optional node-name overrides.
///
/// An empty `node_names` slice means every facet keeps its property name as
/// its tree label; a non-empty slice must match `raw_facets` in length.
pub fn parse_facet_specs(
    raw_facets: &[String],
    node_names: &[String],
) -> Result<Vec<FacetSpec>, ParseError> {
    if !node_names.is_empty() && node_names.len() != raw_facets.len() {
        return Err(ParseError::NodeNameMismatch {
            facets: raw_facets.len(),
            names: node_names.len(),
        });
    }
    let mut specs = Vec::with_capacity(raw_facets.len());
    for (i, raw) in raw_facets.iter().enumerate() {
        let mut spec = parse_one(raw)?;
        if let Some(name) = node_names.get(i) {
            spec.node_name = name.clone();
        }
        specs.push(spec);
    }
    Ok(specs)
}

fn parse_one(raw: &str) -> Result<FacetSpec, ParseError> {
    let mut cur = Cursor::new(raw);
    cur.skip_ws();
    let property = cur.take_until('$').trim().to_string();
    if property.is_empty() {
        return Err(ParseError::Malformed(format!(
            "empty facet name in {:?}",
            raw
        )));
    }
    let mut spec = FacetSpec {
        node_name: property.clone(),
        property,
        ranges: None,
        sort_by: SortBy::default(),
        sort_order: None,
    };
    while cur.eat('$') {
        cur.skip_ws();
        match cur.peek() {
            Some('[') => {
                if spec.ranges.is_some() {
                    return Err(ParseError::Malformed(format!(
                        "duplicate range list in {:?}",
                        raw
                    )));
                }
                spec.ranges = Some(parse_range_list(&mut cur)?);
            }
            Some('{') => {
                cur.eat('{');
                parse_sort_pairs(&mut cur, &mut spec, Some('}'))?;
            }
            Some(_) => parse_sort_pairs(&mut cur, &mut spec, None)?,
            None => {
                return Err(ParseError::Malformed(format!(
                    "trailing '$' in {:?}",
                    raw
                )))
            }
        }
        cur.skip_ws();
    }
    cur.skip_ws();
    if let Some(c) = cur.peek() {
        return Err(ParseError::Malformed(format!(
            "unexpected {:?} at offset {} in {:?}",
            c, cur.pos, raw
        )));
    }
    Ok(spec)
}

fn parse_range_list(cur: &mut Cursor<'_>) -> Result<Vec<RangeBucketSpec>, ParseError> {
    cur.expect('[')?;
    let mut buckets = Vec::new();
    loop {
        cur.skip_ws();
        match cur.peek() {
            Some(']') => {
                cur.bump();
                break;
            }
            Some('{') => {
                buckets.push(parse_bucket(cur)?);
                cur.skip_ws();
                // trailing comma before ']' is tolerated
                cur.eat(',');
            }
            Some(c) => {
                return Err(ParseError::Malformed(format!(
                    "expected bucket literal, found {:?} at offset {}",
                    c, cur.pos
                )))
            }
            None => return Err(ParseError::UnbalancedBraces("range list not closed".into())),
        }
    }
    Ok(buckets)
}

/// A scanned `key: value` right-hand side, before resolution typing.
enum RawValue {
    Quoted(String),
    Number(String),
}

fn parse_bucket(cur: &mut Cursor<'_>) -> Result<RangeBucketSpec, ParseError> {
    cur.expect('{')?;
    let mut pairs: Vec<(String, RawValue)> = Vec::new();
    loop {
        cur.skip_ws();
        match cur.peek() {
            Some('}') => {
                cur.bump();
                break;
            }
            Some(_) => {
                pairs.push(parse_pair(cur)?);
                cur.skip_ws();
                cur.eat(',');
            }
            None => {
                return Err(ParseError::UnbalancedBraces(
                    "bucket literal not closed".into(),
                ))
            }
        }
    }

    // resolution first, the bound typing depends on it
    let mut resolution = Resolution::default();
    for (k, v) in &pairs {
        if k == "resolution" {
            let kw = match v {
                RawValue::Quoted(s) => s.as_str(),
                RawValue::Number(s) => s.as_str(),
            };
            resolution =
                Resolution::from_keyword(kw).ok_or_else(|| ParseError::UnknownResolution(kw.to_string()))?;
        }
    }

    let mut bucket = RangeBucketSpec {
        name: String::new(),
        resolution,
        begin: None,
        end: None,
        lower: None,
        upper: None,
    };
    for (k, v) in pairs {
        match k.as_str() {
            "resolution" => {}
            "name" => {
                bucket.name = match v {
                    RawValue::Quoted(s) => s,
                    RawValue::Number(s) => s,
                }
            }
            "begin" => bucket.begin = Some(parse_bound(&k, v, resolution)?),
            "end" => bucket.end = Some(parse_bound(&k, v, resolution)?),
            "lower" => bucket.lower = Some(parse_string_bound(&k, v, resolution)?),
            "upper" => bucket.upper = Some(parse_string_bound(&k, v, resolution)?),
            other => return Err(ParseError::UnknownKey(other.to_string())),
        }
    }
    if bucket.name.is_empty() {
        bucket.name = derived_name(&bucket);
    }
    Ok(bucket)
}

fn parse_bound(key: &str, raw: RawValue, resolution: Resolution) -> Result<Bound, ParseError> {
    match resolution {
        Resolution::Str => Err(ParseError::InvalidBound(format!(
            "{}: use lower/upper for string resolution",
            key
        ))),
        Resolution::Long => match raw {
            RawValue::Number(s) => s
                .parse::<i64>()
                .map(Bound::Long)
                .map_err(|_| ParseError::InvalidBound(format!("{}: {:?} is not a long", key, s))),
            RawValue::Quoted(s) => Err(ParseError::InvalidBound(format!(
                "{}: {:?} is not numeric",
                key, s
            ))),
        },
        Resolution::Double => match raw {
            RawValue::Number(s) => s
                .parse::<f64>()
                .map(Bound::Double)
                .map_err(|_| ParseError::InvalidBound(format!("{}: {:?} is not a double", key, s))),
            RawValue::Quoted(s) => Err(ParseError::InvalidBound(format!(
                "{}: {:?} is not numeric",
                key, s
            ))),
        },
        Resolution::Day | Resolution::Month | Resolution::Year => match raw {
            RawValue::Quoted(s) => parse_date(&s)
                .map(Bound::Date)
                .ok_or_else(|| ParseError::InvalidBound(format!("{}: {:?} is not a date", key, s))),
            RawValue::Number(s) => Err(ParseError::InvalidBound(format!(
                "{}: {:?} is not a date",
                key, s
            ))),
        },
    }
}

fn parse_string_bound(
    key: &str,
    raw: RawValue,
    resolution: Resolution,
) -> Result<String, ParseError> {
    if resolution != Resolution::Str {
        return Err(ParseError::InvalidBound(format!(
            "{}: only valid for string resolution",
            key
        )));
    }
    match raw {
        RawValue::Quoted(s) => Ok(s),
        RawValue::Number(s) => Err(ParseError::InvalidBound(format!(
            "{}: expected a quoted string, found {:?}",
            key, s
        ))),
    }
}

/// Accept `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)));
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn derived_name(bucket: &RangeBucketSpec) -> String {
    if bucket.is_catch_all() {
        return "all".to_string();
    }
    let lo = bucket
        .begin
        .as_ref()
        .map(bound_label)
        .or_else(|| bucket.lower.clone())
        .unwrap_or_default();
    let hi = bucket
        .end
        .as_ref()
        .map(bound_label)
        .or_else(|| bucket.upper.clone())
        .unwrap_or_default();
    format!("{}-{}", lo, hi)
}

fn bound_label(b: &Bound) -> String {
    match b {
        Bound::Long(n) => n.to_string(),
        Bound::Double(f) => f.to_string(),
        Bound::Date(d) => d.format("%Y-%m-%d").to_string(),
    }
}

fn parse_sort_pairs(
    cur: &mut Cursor<'_>,
    spec: &mut FacetSpec,
    close: Option<char>,
) -> Result<(), ParseError> {
    loop {
        cur.skip_ws();
        match (cur.peek(), close) {
            (Some('}'), Some('}')) => {
                cur.bump();
                return Ok(());
            }
            (None, Some(_)) => {
                return Err(ParseError::UnbalancedBraces(
                    "sort modifier not closed".into(),
                ))
            }
            // bare pair list runs to the next '$' or end of string
            (None, None) | (Some('$'), None) => return Ok(()),
            _ => {}
        }
        let (key, value) = parse_pair(cur)?;
        let value = match value {
            RawValue::Quoted(s) => s,
            RawValue::Number(s) => s,
        };
        match key.as_str() {
            "sortby" => {
                spec.sort_by = match value.as_str() {
                    "config" => SortBy::Config,
                    "count" => SortBy::Count,
                    other => return Err(ParseError::InvalidSort(format!("sortby:{:?}", other))),
                }
            }
            "sortorder" => {
                spec.sort_order = match value.as_str() {
                    "ascending" => Some(SortOrder::Ascending),
                    "descending" => Some(SortOrder::Descending),
                    other => return Err(ParseError::InvalidSort(format!("sortorder:{:?}", other))),
                }
            }
            other => return Err(ParseError::InvalidSort(format!("unknown key {:?}", other))),
        }
        cur.skip_ws();
        cur.eat(',');
    }
}

fn parse_pair(cur: &mut Cursor<'_>) -> Result<(String, RawValue), ParseError> {
    cur.skip_ws();
    let key = cur.take_ident();
    if key.is_empty() {
        return Err(ParseError::Malformed(format!(
            "expected a key at offset {}",
            cur.pos
        )));
    }
    cur.skip_ws();
    if !cur.eat(':') {
        return Err(ParseError::Malformed(format!(
            "expected ':' after {:?} at offset {}",
            key, cur.pos
        )));
    }
    cur.skip_ws();
    let value = match cur.peek() {
        Some(q @ ('\'' | '"')) => {
            cur.bump();
            let s = cur.take_until(q);
            if !cur.eat(q) {
                return Err(ParseError::UnbalancedBraces(format!(
                    "unterminated string after {:?}",
                    key
                )));
            }
            RawValue::Quoted(s)
        }
        Some(c) if c == '-' || c == '.' || c.is_ascii_digit() => RawValue::Number(cur.take_number()),
        other => {
            return Err(ParseError::Malformed(format!(
                "expected a value after {:?}, found {:?}",
                key, other
            )))
        }
    };
    Ok((key, value))
}

/// Minimal character cursor; descriptors are short so char-vec indexing is fine.
struct Cursor<'a> {
    chars: Vec<char>,
    pos: usize,
    _raw: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Cursor {
            chars: s.chars().collect(),
            pos: 0,
            _raw: s,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(ParseError::Malformed(format!(
                "expected {:?} at offset {}",
                c, self.pos
            )))
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consume up to (not including) `stop` or end of input.
    fn take_until(&mut self, stop: char) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == stop {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn take_ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }

    fn take_number(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '-' || c == '.' || c == 'e' || c == 'E' || c == '+' {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }
}
