//! Mapper ordering and nesting tests
//!
//! - Parameters read from the wire come back in case-insensitive name order
//! - Canonically ordered documents survive to_wire / from_wire unchanged
//! - Group nesting is preserved in both directions

use std::collections::BTreeSet;

use rcsync::mapper::{from_wire, to_wire};
use rcsync::wire::RemoteConfigRead;
use rcsync::{ConfigurationDocument, Parameter, ParameterGroup};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn param(name: &str, value: &str) -> Parameter {
    Parameter::new(name, format!("{} description", name), "STRING", value)
}

fn names(doc: &ConfigurationDocument) -> Vec<&str> {
    doc.parameters.iter().map(|p| p.name.as_str()).collect()
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_read_order_is_case_insensitive() {
    let read: RemoteConfigRead = serde_json::from_value(json!({
        "parameters": {
            "Zeta": {"defaultValue": {"value": "z"}},
            "alpha": {"defaultValue": {"value": "a"}},
            "Beta": {"defaultValue": {"value": "b"}}
        }
    }))
    .unwrap();

    let doc = from_wire("demo", &read);
    assert_eq!(names(&doc), vec!["alpha", "Beta", "Zeta"]);
}

#[test]
fn test_read_order_ignores_insertion_order() {
    let forward = ConfigurationDocument::new("demo")
        .with_parameter(param("min_version", "1"))
        .with_parameter(param("Banner", "on"))
        .with_parameter(param("checkout_v2", "true"));
    let reversed = ConfigurationDocument::new("demo")
        .with_parameter(param("checkout_v2", "true"))
        .with_parameter(param("Banner", "on"))
        .with_parameter(param("min_version", "1"));

    let a = from_wire("demo", &RemoteConfigRead::from(to_wire(&forward)));
    let b = from_wire("demo", &RemoteConfigRead::from(to_wire(&reversed)));
    assert_eq!(a, b);
    assert_eq!(names(&a), vec!["Banner", "checkout_v2", "min_version"]);
}

#[test]
fn test_repeated_reads_are_identical() {
    let body = json!({
        "parameters": {
            "b": {"defaultValue": {"value": "1"}, "valueType": "NUMBER"},
            "A": {"defaultValue": {"value": "2"}, "valueType": "NUMBER"}
        },
        "version": {"versionNumber": "9"}
    })
    .to_string();

    let first = from_wire("demo", &serde_json::from_str(&body).unwrap());
    for _ in 0..50 {
        let again = from_wire("demo", &serde_json::from_str(&body).unwrap());
        assert_eq!(again, first);
    }
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_of_canonical_document() {
    let doc = ConfigurationDocument::new("demo")
        .with_parameter(param("alpha", "1"))
        .with_parameter(param("Beta", "2"))
        .with_parameter(param("gamma", "3"))
        .with_group(
            "checkout",
            ParameterGroup::new("checkout flags")
                .with_parameter(param("express", "true"))
                .with_parameter(param("coupons", "false")),
        );

    let mut back = from_wire("demo", &RemoteConfigRead::from(to_wire(&doc)));
    back.version_metadata = None;
    assert_eq!(back, doc);
}

#[test]
fn test_unsorted_document_round_trips_to_sorted() {
    let doc = ConfigurationDocument::new("demo")
        .with_parameter(param("zz", "1"))
        .with_parameter(param("aa", "2"));

    let back = from_wire("demo", &RemoteConfigRead::from(to_wire(&doc)));
    assert_ne!(back.parameters, doc.parameters);
    assert_eq!(back.parameters, rcsync::mapper::canonicalize(&doc).parameters);
}

// =============================================================================
// Group Nesting Tests
// =============================================================================

#[test]
fn test_two_groups_two_parameters_each() {
    let doc = ConfigurationDocument::new("demo")
        .with_group(
            "onboarding",
            ParameterGroup::new("first run")
                .with_parameter(param("tutorial", "on"))
                .with_parameter(param("skip_button", "off")),
        )
        .with_group(
            "pricing",
            ParameterGroup::new("paywall")
                .with_parameter(param("trial_days", "7"))
                .with_parameter(param("annual_discount", "20")),
        );

    let update = to_wire(&doc);
    assert_eq!(update.parameter_groups.len(), 2);
    for group in update.parameter_groups.values() {
        assert_eq!(group.parameters.len(), 2);
    }

    let wire = serde_json::to_value(&update).unwrap();
    assert_eq!(wire["parameter_groups"].as_object().unwrap().len(), 2);

    let back = from_wire("demo", &RemoteConfigRead::from(update));
    let group_names: BTreeSet<&str> = back.parameter_groups.keys().map(String::as_str).collect();
    assert_eq!(group_names, BTreeSet::from(["onboarding", "pricing"]));

    let pricing: BTreeSet<&str> = back.parameter_groups["pricing"]
        .parameters
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(pricing, BTreeSet::from(["annual_discount", "trial_days"]));
}

#[test]
fn test_group_ordered_view() {
    let read: RemoteConfigRead = serde_json::from_value(json!({
        "parameterGroups": {
            "g": {
                "description": "d",
                "parameters": {
                    "Zed": {"defaultValue": {"value": "1"}},
                    "apple": {"defaultValue": {"value": "2"}}
                }
            }
        }
    }))
    .unwrap();

    let doc = from_wire("demo", &read);
    let ordered: Vec<&str> = doc.parameter_groups["g"]
        .ordered_parameters()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(ordered, vec!["apple", "Zed"]);
}
