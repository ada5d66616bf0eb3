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
fn drills_to_a_resultset() {
    let nav = nav_with(car_provider(), &["brand", PRICE_FACET]);
    let rs = nav
        .view()
        .get_node(&["brand", "bmw", "resultset"], &opts())
        .unwrap();
    assert_eq!(rs.count, 2);
    let ids: Vec<&str> = rs
        .documents
        .as_ref()
        .unwrap()
        .iter()
        .map(|d| d.id.as_str())
        .collect();
    assert_eq!(ids, vec!["b1", "b2"]);
}

#[test]
fn engine_level_get_node_uses_configured_defaults() {
    let nav = nav_with(car_provider(), &["brand"]);
    let root = nav.get_node(&[]).unwrap();
    assert_eq!(root.count, 9);
}

#[test]
fn views_serialize_for_the_ui_layer() {
    let nav = nav_with(car_provider(), &["brand"]);
    let brand = nav.view().get_node(&["brand"], &opts()).unwrap();
    let json = serde_json::to_value(&brand).unwrap();
    assert_eq!(json["name"], "brand");
    assert_eq!(json["count"], 9);
    assert_eq!(json["children"][2][0], "peugeot");
    assert_eq!(json["children"][2][1], 4);
    assert!(json["documents"].is_null());
}
