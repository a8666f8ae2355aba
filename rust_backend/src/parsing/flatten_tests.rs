#[cfg(test)]
mod tests {
    use crate::core::domain::Scalar;
    use crate::parsing::flatten::{flatten, Flattener};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn as_json(value: &Value) -> Value {
        flatten(value).records.to_json()
    }

    /// Empty list, empty mapping and null are all "no data", not errors
    #[test]
    fn test_empty_inputs_yield_empty_set() {
        for input in [json!([]), json!({}), Value::Null] {
            let flat = flatten(&input);
            assert!(flat.is_empty(), "expected no records for {}", input);
            assert!(flat.skipped.is_empty(), "expected no errors for {}", input);
            assert!(flat.records.columns().is_empty());
        }
    }

    /// Missing keys are filled with null, input order preserved
    #[test]
    fn test_missing_keys_filled_with_null() {
        let out = as_json(&json!([{"a": 1}, {"b": 2}]));
        assert_eq!(out, json!([{"a": 1, "b": null}, {"a": null, "b": 2}]));
    }

    /// Group-keyed mapping concatenates in key-then-list order
    #[test]
    fn test_group_keyed_mapping() {
        let out = as_json(&json!({"G1": [{"x": 1}], "G2": [{"x": 2}]}));
        assert_eq!(out, json!([{"x": 1}, {"x": 2}]));
    }

    /// Non-record elements are skipped and reported, the rest survive
    #[test]
    fn test_partial_success_on_bad_element() {
        let flat = flatten(&json!([{"a": 1}, "not-a-record", {"a": 2}]));
        assert_eq!(flat.records.to_json(), json!([{"a": 1}, {"a": 2}]));
        assert_eq!(flat.skipped.len(), 1);
        assert_eq!(flat.skipped[0].path, "$[1]");
        assert!(flat.skipped[0].reason.contains("string"));
    }

    #[test]
    fn test_single_record_mapping() {
        let flat = flatten(&json!({"ident": "KPIT", "elevation": 1203, "towered": true}));
        assert_eq!(flat.len(), 1);
        assert_eq!(
            flat.records.columns(),
            &["ident".to_string(), "elevation".to_string(), "towered".to_string()]
        );
        assert_eq!(flat.records.records()[0].get("towered"), Some(&Scalar::Bool(true)));
    }

    /// A single record whose values are all null is still one record
    #[test]
    fn test_all_null_mapping_is_a_record() {
        let flat = flatten(&json!({"metar": null}));
        assert_eq!(flat.len(), 1);
        assert!(flat.records.records()[0].get("metar").unwrap().is_null());
    }

    /// Airport lookup shape: code -> list of airport rows
    #[test]
    fn test_airport_lookup_shape() {
        let response = json!({
            "KPIT": [{"facility_name": "PITTSBURGH INTL", "latitude": "40-29-29.3000N"}],
            "KAGC": [{"facility_name": "ALLEGHENY COUNTY", "latitude": "40-21-14.2000N", "control_tower": "Y"}],
            "KXXX": []
        });
        let flat = flatten(&response);
        assert_eq!(flat.len(), 2);
        assert!(flat.skipped.is_empty());
        assert!(flat.records.records()[0].get("control_tower").unwrap().is_null());
    }

    #[test]
    fn test_nested_groups_recurse() {
        let response = json!({
            "north": {"east": [{"v": 1}], "west": [{"v": 2}]},
            "south": [{"v": 3}]
        });
        assert_eq!(as_json(&response), json!([{"v": 1}, {"v": 2}, {"v": 3}]));
    }

    /// Scalars sitting directly under a group key cannot be records
    #[test]
    fn test_scalar_group_value_reported() {
        let flat = flatten(&json!({"count": 2, "rows": [{"a": 1}, {"a": 2}]}));
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.skipped.len(), 1);
        assert_eq!(flat.skipped[0].path, "$.count");
    }

    #[test]
    fn test_top_level_scalar_reported() {
        let flat = flatten(&json!("oops"));
        assert!(flat.is_empty());
        assert_eq!(flat.skipped.len(), 1);
        assert_eq!(flat.skipped[0].path, "$");
    }

    /// A null inside a list is a missing record, not an empty response
    #[test]
    fn test_null_elements_reported() {
        let flat = flatten(&json!([{"a": 1}, null, {"a": 2}]));
        assert_eq!(flat.records.to_json(), json!([{"a": 1}, {"a": 2}]));
        assert_eq!(flat.skipped.len(), 1);
        assert_eq!(flat.skipped[0].path, "$[1]");
        assert!(flat.skipped[0].reason.contains("null"));
    }

    /// A report with an array field is read as groups, not as one record
    #[test]
    fn test_report_with_array_field_is_group_keyed() {
        let response = json!({
            "KAVP": {
                "station_id": "KAVP",
                "temp": 12,
                "sky_conditions": [
                    {"coverage": "FEW", "base_agl": 2500},
                    {"coverage": "BKN", "base_agl": 9000}
                ]
            }
        });
        let flat = flatten(&response);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.records.columns(), &["coverage".to_string(), "base_agl".to_string()]);
        let paths: Vec<&str> = flat.skipped.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["$.KAVP.station_id", "$.KAVP.temp"]);

        let layers = Flattener::new().select("KAVP", "sky_conditions").flatten(&response);
        assert_eq!(layers.len(), 2);
        assert!(layers.skipped.is_empty());
    }

    /// A dotted key must not overwrite a literal key of the same name
    #[test]
    fn test_dotted_key_collision_reported() {
        let flat = flatten(&json!([
            {"a.b": 1, "a": {"b": 2}},
            {"a": {"b": 3}}
        ]));
        assert_eq!(flat.records.to_json(), json!([{"a.b": 3}]));
        assert_eq!(flat.skipped.len(), 1);
        assert_eq!(flat.skipped[0].path, "$[0]");
        assert!(flat.skipped[0].reason.contains("'a.b'"));
    }

    #[test]
    fn test_dotted_key_collision_in_either_order() {
        let flat = flatten(&json!({"G": [{"a": {"b": 2}, "a.b": 1}]}));
        assert!(flat.is_empty());
        assert_eq!(flat.skipped[0].path, "$.G[0]");
    }

    #[test]
    fn test_nested_array_element_reported() {
        let flat = flatten(&json!({"G": [[1, 2], {"a": 1}]}));
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.skipped[0].path, "$.G[0]");
    }

    /// Nested objects become dotted keys, nested arrays become JSON text
    #[test]
    fn test_nested_record_fields() {
        let response = json!([{
            "callsign": "AAL123",
            "flight_plan": {"departure": "KPIT", "arrival": "KJFK", "remarks": {}},
            "route_points": ["BSV", "ETG"]
        }]);
        let flat = flatten(&response);
        assert_eq!(
            flat.records.columns(),
            &[
                "callsign".to_string(),
                "flight_plan.departure".to_string(),
                "flight_plan.arrival".to_string(),
                "flight_plan.remarks".to_string(),
                "route_points".to_string(),
            ]
        );
        let row = &flat.records.records()[0];
        assert_eq!(row.get("route_points"), Some(&Scalar::Text(r#"["BSV","ETG"]"#.into())));
        assert!(row.get("flight_plan.remarks").unwrap().is_null());
    }

    /// Selectors pick the named sub-category for a group
    #[test]
    fn test_selectors_descend_into_nested_key() {
        let response = json!({
            "1": {"General": [{"state": "home", "value": 3}], "Other": [{"state": "x"}]},
            "7": {"DP": [{"state": "away", "value": 5}]},
            "9": [{"state": "neutral", "value": 1}]
        });
        let flat = Flattener::new()
            .select("1", "General")
            .select("7", "DP")
            .flatten(&response);
        assert!(flat.skipped.is_empty());
        assert_eq!(
            flat.records.to_json(),
            json!([
                {"state": "home", "value": 3},
                {"state": "away", "value": 5},
                {"state": "neutral", "value": 1}
            ])
        );
    }

    /// A group lacking its selector key is skipped and reported
    #[test]
    fn test_missing_selector_key_reported() {
        let response = json!({
            "1": {"Other": [{"state": "x"}]},
            "2": [{"state": "y"}]
        });
        let flat = Flattener::new().select("1", "General").flatten(&response);
        assert_eq!(flat.records.to_json(), json!([{"state": "y"}]));
        assert_eq!(flat.skipped.len(), 1);
        assert_eq!(flat.skipped[0].path, "$.1");
        assert!(flat.skipped[0].reason.contains("General"));
    }

    #[test]
    fn test_select_replaces_existing_selector() {
        let flattener = Flattener::new().select("1", "General").select("1", "DP");
        assert_eq!(flattener.selector_for("1"), Some("DP"));
        assert_eq!(flattener.selector_for("2"), None);
    }

    #[test]
    fn test_flatten_groups_keeps_groups_apart() {
        let response = json!({
            "G1": [{"x": 1}],
            "G2": [{"y": 2}, "bad"]
        });
        let groups = Flattener::new().flatten_groups(&response);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "G1");
        assert_eq!(groups[0].1.records.columns(), &["x".to_string()]);
        assert_eq!(groups[1].1.records.columns(), &["y".to_string()]);
        assert_eq!(groups[1].1.skipped[0].path, "$.G2[1]");
    }

    #[test]
    fn test_flatten_groups_on_list() {
        let groups = Flattener::new().flatten_groups(&json!([{"a": 1}]));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "");
        assert_eq!(groups[0].1.len(), 1);
    }

    fn scalar_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ]
    }

    fn record_strategy() -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[a-e]", scalar_strategy(), 0..5)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    }

    proptest! {
        /// Every record carries exactly the union of input keys
        #[test]
        fn prop_key_sets_equal_union(records in prop::collection::vec(record_strategy(), 0..8)) {
            let mut union: Vec<String> = Vec::new();
            for r in &records {
                for k in r.as_object().unwrap().keys() {
                    if !union.contains(k) {
                        union.push(k.clone());
                    }
                }
            }

            let flat = flatten(&Value::Array(records.clone()));
            prop_assert_eq!(flat.records.len(), records.len());
            prop_assert_eq!(flat.records.columns(), union.as_slice());
            for r in flat.records.iter() {
                let keys: Vec<&str> = r.keys().collect();
                let expected: Vec<&str> = union.iter().map(String::as_str).collect();
                prop_assert_eq!(keys, expected);
            }
        }
    }
}
