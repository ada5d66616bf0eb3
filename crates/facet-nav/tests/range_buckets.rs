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

mod common;

use common::{car_provider, nav_with, opts, PRICE_FACET};

#[test]
fn half_open_bounds_on_the_edges() {
    let nav = nav_with(car_provider(), &[PRICE_FACET]);
    let price = nav.view().get_node(&["price"], &opts()).unwrap();
    let counts: Vec<(String, u64)> = price.children.clone();
    // p4 (exactly 10000) is in `second`, f3 (exactly 20000) is in `third`
    assert_eq!(
        counts,
        vec![
            ("first".to_string(), 3),
            ("second".to_string(), 3),
            ("third".to_string(), 3),
            ("fourth".to_string(), 9),
        ]
    );
}

#[test]
fn catch_all_equals_scope_total() {
    let nav = nav_with(car_provider(), &[PRICE_FACET]);
    let root = nav.view().get_node(&[], &opts()).unwrap();
    let all = nav.view().get_node(&["price", "fourth"], &opts()).unwrap();
    assert_eq!(all.count, root.count);
    assert_eq!(all.count, 9);
}

#[test]
fn buckets_may_overlap() {
    // every document is in the catch-all and also in one bounded bucket
    let nav = nav_with(car_provider(), &[PRICE_FACET]);
    let price = nav.view().get_node(&["price"], &opts()).unwrap();
    let total_bounded: u64 = price
        .children
        .iter()
        .filter(|(n, _)| n != "fourth")
        .map(|(_, c)| c)
        .sum();
    let catch_all = price
        .children
        .iter()
        .find(|(n, _)| n == "fourth")
        .map(|(_, c)| *c)
        .unwrap();
    assert_eq!(total_bounded, 9);
    assert_eq!(catch_all, 9);
}

#[test]
fn zero_count_bounded_bucket_is_kept() {
    let nav = nav_with(
        car_provider(),
        &["price$[{name:'luxury', resolution:'long', begin:100000}, {name:'any'}]"],
    );
    let price = nav.view().get_node(&["price"], &opts()).unwrap();
    assert_eq!(
        price.children,
        vec![("luxury".to_string(), 0), ("any".to_string(), 9)]
    );
}

#[test]
fn zero_count_catch_all_is_dropped() {
    let nav = nav_with(car_provider(), &[PRICE_FACET]);
    // a term matching nothing zeroes every bucket; bounded ones stay visible,
    // the catch-all disappears
    let view = nav.view().with_free_text("zeppelin");
    let price = view.get_node(&["price"], &opts()).unwrap();
    assert_eq!(
        price.children,
        vec![
            ("first".to_string(), 0),
            ("second".to_string(), 0),
            ("third".to_string(), 0),
        ]
    );
}

#[test]
fn string_ranges_partition_lexicographically() {
    let nav = nav_with(
        car_provider(),
        &["brand$[{name:'a-m', resolution:'string', lower:'a', upper:'m'}, \
           {name:'m-z', resolution:'string', lower:'m', upper:'z'}]"],
    );
    let brand = nav.view().get_node(&["brand"], &opts()).unwrap();
    // fiat + bmw docs below 'm', peugeot docs above
    assert_eq!(
        brand.children,
        vec![("a-m".to_string(), 5), ("m-z".to_string(), 4)]
    );
}

#[test]
fn year_resolution_truncates() {
    let nav = nav_with(
        car_provider(),
        &["registered$[{name:'y2023', resolution:'year', begin:'2023-01-01', end:'2024-01-01'}, \
           {name:'y2024', resolution:'year', begin:'2024-01-01', end:'2025-01-01'}, \
           {name:'y2025', resolution:'year', begin:'2025-01-01'}]"],
    );
    let reg = nav.view().get_node(&["registered"], &opts()).unwrap();
    assert_eq!(
        reg.children,
        vec![
            ("y2023".to_string(), 4),
            ("y2024".to_string(), 4),
            ("y2025".to_string(), 1),
        ]
    );
}

#[test]
fn day_resolution_ignores_time_of_day() {
    // f2 is registered 2024-05-09T10:30:00Z; a one-day bucket must match it
    let nav = nav_with(
        car_provider(),
        &["registered$[{name:'that-day', resolution:'day', begin:'2024-05-09', end:'2024-05-10'}]"],
    );
    let reg = nav.view().get_node(&["registered"], &opts()).unwrap();
    assert_eq!(reg.children, vec![("that-day".to_string(), 1)]);
}

#[test]
fn descending_reverses_configuration_order() {
    // observed fixture: reversed configuration order, fourth..first
    let raw = format!("{}$sortorder:'descending'", PRICE_FACET);
    let nav = nav_with(car_provider(), &[raw.as_str()]);
    let price = nav.view().get_node(&["price"], &opts()).unwrap();
    let names: Vec<&str> = price.children.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["fourth", "third", "second", "first"]);
}

#[test]
fn count_sort_is_non_increasing() {
    let raw = format!("{}$sortby:'count'", PRICE_FACET);
    let nav = nav_with(car_provider(), &[raw.as_str()]);
    let price = nav.view().get_node(&["price"], &opts()).unwrap();
    let counts: Vec<u64> = price.children.iter().map(|(_, c)| *c).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    // ties broken by configuration order: first, second, third follow fourth
    let names: Vec<&str> = price.children.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["fourth", "first", "second", "third"]);
}

#[test]
fn plain_facet_count_sort() {
    let nav = nav_with(car_provider(), &["color$sortby:'count'"]);
    let color = nav.view().get_node(&["color"], &opts()).unwrap();
    let counts: Vec<u64> = color.children.iter().map(|(_, c)| *c).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    // blue and red tie at 3; ascending value order breaks the tie
    assert_eq!(color.children[0], ("blue".to_string(), 3));
    assert_eq!(color.children[1], ("red".to_string(), 3));
}
